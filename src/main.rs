// ivac - an image viewer with pan, zoom and a contrast slider
// Loads one image, shows it in a Wayland window and saves the adjusted result on request

mod app;
mod cli;
mod export;
mod frame;
mod geometry;
mod image_loader;
mod transform;
mod wayland;
mod wgpu_renderer;
mod widget;

use anyhow::Result;
use log::{error, info};
use std::process;

/// Exit status for every startup failure
const EXIT_FAILURE: i32 = -1;

fn main() {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parse command line arguments
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            // --help and --version end up here too
            process::exit(if e.use_stderr() { EXIT_FAILURE } else { 0 });
        }
    };

    if let Err(e) = run(args) {
        error!("{:#}", e);
        process::exit(EXIT_FAILURE);
    }
}

fn run(args: cli::Args) -> Result<()> {
    info!("Starting ivac with image: {:?}", args.image_path);

    // Load the image
    let image_data = image_loader::load_image(&args.image_path)?;

    info!(
        "Image loaded: {}x{} pixels, {} channels",
        image_data.width, image_data.height, image_data.channels
    );

    wayland::run(image_data, args.output)
}
