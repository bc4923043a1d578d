use clap::Parser;
use lfs_ext::cli::{Cli, Commands, filter_command, list_command, verify_command};
use lfs_ext::logging;
use lfs_ext::pipeline::Action;
use tracing::error;

#[tokio::main]
async fn main() {
    let args = Cli::parse();
    logging::init(args.verbose, args.log_dir.as_deref());

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Cli) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match args.cmd {
        Commands::Clean(filter) => filter_command(Action::Clean, filter).await?,
        Commands::Smudge(filter) => filter_command(Action::Smudge, filter).await?,
        Commands::List(source) => list_command(source).await?,
        Commands::Verify {
            results,
            input,
            output,
        } => verify_command(results, input, output).await?,
    }
    Ok(())
}
