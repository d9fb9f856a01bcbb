//! Run configuration of the command-line tools.
pub mod run;

pub use run::{from_env, load_config, RunConfig, CONFIG_ENV, DEFAULT_IMAGE, WORKERS_ENV};
