use sobel_stencil::config;
use sobel_stencil::image::io::{load_rgba_image, save_rgba_image, write_json_file};
use sobel_stencil::shared::filter_shared;
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
    println!("Filtering image");
    let output = filter_shared(&image, &StencilFilter::sobel(), workers)?;
    println!("\tElapsed time: {:.3} ms", output.report.timings.total_ms);

    save_rgba_image(&output.image, &config.output_path())?;
    if let Some(path) = &config.report_json {
        write_json_file(path, &output.report)?;
    }
    Ok(())
}
