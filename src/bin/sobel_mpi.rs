use sobel_stencil::config;
use sobel_stencil::image::io::{load_rgba_image, save_rgba_image, write_json_file};
use sobel_stencil::message::filter_message_passing;
use sobel_stencil::StencilFilter;
use std::env;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), sobel_stencil::StencilError> {
    let config = config::from_env(env::args().skip(1))?;
    let workers = config.worker_count();

    let image = load_rgba_image(&config.input_path())?;
    let output = filter_message_passing(
        &image,
        &StencilFilter::sobel(),
        workers,
        config.message_passing(),
    )?;

    let out_path = config.output_path();
    save_rgba_image(&output.image, &out_path)?;
    if let Some(path) = &config.report_json {
        write_json_file(path, &output.report)?;
    }

    println!(
        "Filtered {} ({}x{}) with {} ranks in {:.3} ms -> {}",
        config.image_name(),
        output.report.width,
        output.report.height,
        workers,
        output.report.timings.total_ms,
        out_path.display()
    );
    Ok(())
}
