use crate::error::{Result, StencilError};
use crate::message::{DistributionMode, MessagePassingOptions};
use crate::partition::GatherMode;
use log::info;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Image used when no name is given on the command line.
pub const DEFAULT_IMAGE: &str = "hoja.jpg";
/// Worker count supplied by the launcher (ranks or threads).
pub const WORKERS_ENV: &str = "SOBEL_WORKERS";
/// Optional JSON file with a [`RunConfig`].
pub const CONFIG_ENV: &str = "SOBEL_CONFIG";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Directory the input image is read from.
    pub input_dir: PathBuf,
    /// Directory the output is written to, under the input's file name.
    pub output_dir: PathBuf,
    /// Input file name; `None` falls back to [`DEFAULT_IMAGE`].
    pub image: Option<String>,
    /// Ranks or threads; `None` uses the available parallelism.
    pub workers: Option<usize>,
    pub distribution: DistributionMode,
    pub gather: GatherMode,
    /// Where to write the JSON run report, if anywhere.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_json: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("../images"),
            output_dir: PathBuf::from("./out"),
            image: None,
            workers: None,
            distribution: DistributionMode::default(),
            gather: GatherMode::default(),
            report_json: None,
        }
    }
}

impl RunConfig {
    pub fn image_name(&self) -> &str {
        self.image.as_deref().unwrap_or(DEFAULT_IMAGE)
    }

    pub fn input_path(&self) -> PathBuf {
        self.input_dir.join(self.image_name())
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(self.image_name())
    }

    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }

    pub fn message_passing(&self) -> MessagePassingOptions {
        MessagePassingOptions {
            distribution: self.distribution,
            gather: self.gather,
        }
    }

    /// Apply the command line (without the program name): at most one
    /// positional argument, the image file name.
    pub fn with_args<I>(mut self, args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = args.into_iter();
        if let Some(name) = args.next() {
            if !name.is_empty() {
                self.image = Some(name);
            }
        }
        if let Some(extra) = args.next() {
            return Err(StencilError::Config(format!(
                "unexpected argument {extra:?}; usage: <program> [image]"
            )));
        }
        if self.image.is_none() {
            info!("No image specified, using default {DEFAULT_IMAGE}");
        }
        Ok(self)
    }

    /// Apply a worker count given as text (e.g. from [`WORKERS_ENV`]).
    pub fn with_workers(mut self, value: Option<&str>) -> Result<Self> {
        if let Some(raw) = value {
            let n: usize = raw.trim().parse().map_err(|_| {
                StencilError::Config(format!("{WORKERS_ENV}={raw:?} is not a worker count"))
            })?;
            if n == 0 {
                return Err(StencilError::Config(format!(
                    "{WORKERS_ENV} must be at least 1"
                )));
            }
            self.workers = Some(n);
        }
        Ok(self)
    }
}

pub fn load_config(path: &Path) -> Result<RunConfig> {
    let data = fs::read_to_string(path).map_err(|source| StencilError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| StencilError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolve the run configuration of a tool: the file named by
/// [`CONFIG_ENV`] (or defaults), then [`WORKERS_ENV`], then `args`.
pub fn from_env<I>(args: I) -> Result<RunConfig>
where
    I: IntoIterator<Item = String>,
{
    let base = match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_config(Path::new(&path))?,
        None => RunConfig::default(),
    };
    let workers = std::env::var(WORKERS_ENV).ok();
    base.with_workers(workers.as_deref())?.with_args(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_follow_the_directory_layout() {
        let cfg = RunConfig::default().with_args(Vec::new()).unwrap();
        assert_eq!(cfg.input_path(), PathBuf::from("../images/hoja.jpg"));
        assert_eq!(cfg.output_path(), PathBuf::from("./out/hoja.jpg"));
    }

    #[test]
    fn positional_argument_names_the_image() {
        let cfg = RunConfig::default()
            .with_args(vec!["leaf.png".to_string()])
            .unwrap();
        assert_eq!(cfg.output_path(), PathBuf::from("./out/leaf.png"));
        assert!(RunConfig::default()
            .with_args(vec!["a.png".to_string(), "b.png".to_string()])
            .is_err());
    }

    #[test]
    fn worker_count_is_validated() {
        let cfg = RunConfig::default().with_workers(Some(" 6 ")).unwrap();
        assert_eq!(cfg.worker_count(), 6);
        assert!(RunConfig::default().with_workers(Some("0")).is_err());
        assert!(RunConfig::default().with_workers(Some("many")).is_err());
        assert!(RunConfig::default().with_workers(None).unwrap().worker_count() >= 1);
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.json");
        fs::write(
            &path,
            r#"{ "image": "grid.png", "workers": 3, "distribution": "halo", "gather": "fixed_chunks" }"#,
        )
        .unwrap();
        let cfg = load_config(&path).unwrap();
        assert_eq!(cfg.image_name(), "grid.png");
        assert_eq!(cfg.workers, Some(3));
        assert_eq!(cfg.distribution, DistributionMode::Halo);
        assert_eq!(cfg.gather, GatherMode::FixedChunks);
        assert_eq!(cfg.output_dir, PathBuf::from("./out"));
    }
}
