mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod logging;
mod query;
mod revenue;
mod session;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "s9s")]
#[command(about = "A terminal admin console for multi-vendor storefronts, inspired by k9s")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/s9s/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Scope order and product lists to one admin/vendor
  #[arg(short, long)]
  admin: Option<String>,

  /// Disable the local cache; every fetch goes to the network
  #[arg(long)]
  no_cache: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Keep the guard alive so buffered log lines flush on exit
  let _log_guard = logging::init()?;

  let config = config::Config::load(args.config.as_deref())?;
  let session = session::Session::load()?;
  let client = api::CachedStoreClient::new(&config, session.clone(), args.no_cache)?;

  let mut app = app::App::new(config, client, session, args.admin);
  app.run().await?;

  Ok(())
}
