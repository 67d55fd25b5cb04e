// Entrypoint for the vault client.
// - Keeps `main` small: resolve configuration, build the transport and the
//   input collector, then hand them to the command loop.

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use keeper_cli::api::HttpTransport;
use keeper_cli::config::{Config, DEFAULT_ADDRESS};
use keeper_cli::shell::Shell;
use keeper_cli::shutdown::install_signal_handler;
use keeper_cli::ui::{InputCollector, LineCollector, TerminalCollector};

#[derive(Parser)]
#[command(name = "keeper")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Interactive client for the keeper personal vault", long_about = None)]
struct Cli {
    /// Vault server address (host:port or URL)
    #[arg(short = 'a', long = "address", default_value = DEFAULT_ADDRESS)]
    address: String,

    /// JSON config file; defaults to ./config.json
    #[arg(short, long, env = "CONFIG")]
    config: Option<PathBuf>,

    /// Verbose diagnostics on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Diagnostics go to stderr so they never mix with server responses.
    let default_filter = if cli.verbose { "info,keeper_cli=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref(), &cli.address)?;
    let interactive = std::io::stdin().is_terminal();

    let transport = HttpTransport::new(&config.base_url())?
        .with_progress(std::io::stdout().is_terminal());
    tracing::info!(server = transport.base_url(), interactive, "starting");

    let cancel = install_signal_handler().context("Failed to install signal handler")?;

    if interactive {
        serve(transport, TerminalCollector::new(), &cancel)
    } else {
        serve(transport, LineCollector::stdio(), &cancel)
    }
}

fn serve<C: InputCollector>(
    transport: HttpTransport,
    input: C,
    cancel: &CancellationToken,
) -> anyhow::Result<()> {
    let mut shell = Shell::new(transport, input);
    shell.run(cancel).context("Reading commands failed")?;
    Ok(())
}
