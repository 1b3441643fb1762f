// Command line interface module
// Handles parsing of command line arguments

use crate::export::DEFAULT_OUTPUT;
use clap::Parser;
use std::path::PathBuf;

/// ivac - pan, zoom and adjust the contrast of an image
#[derive(Parser, Debug)]
#[command(name = "ivac")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the image file
    #[arg(value_name = "IMAGE")]
    pub image_path: PathBuf,

    /// Where the save button writes the adjusted image
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
}

/// Parse command line arguments without exiting on failure
pub fn parse_args() -> Result<Args, clap::Error> {
    Args::try_parse()
}
