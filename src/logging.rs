//! File-based logging setup. The terminal owns stdout, so everything goes
//! to a log file under the user data dir.

use color_eyre::{eyre::eyre, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing to `<data_dir>/s9s/s9s.log`.
///
/// The returned guard must be kept alive for the lifetime of the program,
/// otherwise buffered log lines are lost on exit. Filtering comes from
/// `S9S_LOG` (then `RUST_LOG`), defaulting to `info`.
pub fn init() -> Result<WorkerGuard> {
  let data_dir = dirs::data_dir()
    .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
    .ok_or_else(|| eyre!("Could not determine data directory"))?
    .join("s9s");

  std::fs::create_dir_all(&data_dir)
    .map_err(|e| eyre!("Failed to create log directory: {}", e))?;

  let appender = tracing_appender::rolling::never(&data_dir, "s9s.log");
  let (writer, guard) = tracing_appender::non_blocking(appender);

  let filter = EnvFilter::try_from_env("S9S_LOG")
    .or_else(|_| EnvFilter::try_from_default_env())
    .unwrap_or_else(|_| EnvFilter::new("info"));

  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}
