use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, info, warn};
use mailaid_lib::store::MailStore;
use std::path::PathBuf;

use mailaid::{
    config::{self, Config},
    notify::{CancellationToken, Hook, Watcher},
};

/// Poll a mailbox and forward matching messages to a web hook during
/// work hours.
#[derive(Parser, Debug)]
#[command(name = "mail2bot", author, version, about)]
struct Cli {
    /// Override the default configuration file path
    #[arg(long, short, value_name = "PATH", value_parser = config::path_parser)]
    config: Option<PathBuf>,

    /// Check at any hour, log notifications instead of sending them
    /// and keep the cursor in memory
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logs
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "info" };
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, default_filter),
    );

    let mut config = Config::from_opt_path(cli.config.as_deref())?;
    config.store.dry_run |= cli.dry_run;
    let dry_run = config.store.dry_run;
    config.server.validate().context("cannot use mail server config")?;
    debug!("server: {:?}", config.server);

    let hook = Hook::new(&config.notify.hook, dry_run).context("cannot build web hook")?;
    let server = &config.server;
    let store = config.store;
    let mut watcher = Watcher::new(
        &config.notify,
        dry_run,
        move || Ok(MailStore::connect(server, store)?),
        hook,
    )?;

    if !dry_run {
        match config.holiday.to_calendar() {
            Ok(calendar) => watcher = watcher.with_gate(calendar),
            Err(err) => warn!("cannot build holiday calendar, checking at any hour: {:?}", err),
        }
    }

    info!("checking new mails every {}s", config.notify.interval().as_secs());
    watcher.run(&CancellationToken::new());

    Ok(())
}
