//! Entry point for the `girder` binary.

use anyhow::Result;
use girder::cli::Cli;
use tracing_subscriber::EnvFilter;

// The commands are short sequences of file operations; a single-threaded
// runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse_args();
    cli.execute().await
}

/// Diagnostics go to stderr so that `--json` output on stdout stays
/// machine-parseable. `RUST_LOG` overrides the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("girder=info,girder_jsonl=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
