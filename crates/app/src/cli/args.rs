pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "cidtrack")]
#[command(about = "Upload files to IPFS, register them with a meta server and fetch them back")]
pub struct Args {
    /// Path to the cidtrack config directory (defaults to ~/.cidtrack)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
