//! bget binary entry point.

use clap::Parser;
use tracing::{error, info};

use bget_client::cli::{Cli, Command};
use bget_client::download;
use bget_client::http::HttpResolver;

fn main() {
    let cli = Cli::parse();

    let log_format = cli.log_format.into();
    if let Err(e) = bget_core::init_logging(cli.verbose, cli.log_file.as_deref(), log_format) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "bget starting");

    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(run(&cli));

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("bget: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli) -> bget_core::Result<()> {
    match &cli.command {
        Command::Download(args) => {
            let request = args.validate()?;
            let resolver = HttpResolver::new(cli.gateway.clone())?;
            let bytes = download::run_download(&resolver, &request, !args.no_progress).await?;
            info!(
                bytes,
                local_path = %request.local_path.display(),
                "download complete"
            );
        }
    }
    Ok(())
}
