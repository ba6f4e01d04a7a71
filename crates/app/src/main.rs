// CLI modules
mod cli;

use clap::{Parser, Subcommand};
use cli::{args::Args, op::Op, Cids, Download, Info, Init, List, Tree, Upload, Version};
use tracing::Level;

command_enum! {
    (Cids, Cids),
    (Download, Download),
    (Info, Info),
    (Init, Init),
    (List, List),
    (Tree, Tree),
    (Upload, Upload),
    (Version, Version),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let ctx = cli::op::OpContext::new(args.config_path);

    // Log at the configured level once initialized; before that, at info to stderr
    let guards = match ctx.state() {
        Ok(state) => cidtrack::logging::init_logging(
            state.config.tracing_level(),
            state.config.log_dir.as_deref(),
        ),
        Err(_) => cidtrack::logging::init_logging(Level::INFO, None),
    };

    match args.command.execute(&ctx).await {
        Ok(output) => {
            println!("{}", output);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            drop(guards);
            std::process::exit(1);
        }
    }
}
