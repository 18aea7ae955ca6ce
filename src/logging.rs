use anyhow::{Result, anyhow};
use tracing::Level;
use tracing_subscriber::fmt;

/// Send per-request check logs to stderr when `verbose` is set.
///
/// Stdout carries only the status table, so nothing is installed otherwise.
pub fn init(verbose: bool) -> Result<()> {
    if !verbose {
        return Ok(());
    }
    fmt()
        .with_writer(std::io::stderr)
        .with_max_level(Level::DEBUG)
        .with_target(false)
        .without_time()
        .compact()
        .try_init()
        .map_err(|err| anyhow!("failed to install stderr logger: {}", err))
}
