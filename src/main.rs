use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{debug, warn};
use mailaid_lib::{account::AccountError, store::MailStore};

use mailaid::{cli::Cli, config::Config, printer::StdoutPrinter};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "off" };
    env_logger::init_from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, default_filter),
    );

    let mut config = Config::from_opt_path(cli.config.as_deref())?;
    cli.server.apply(&mut config.server);
    if let Some(batch_size) = cli.batch_size {
        config.store.batch_size = batch_size;
    }
    config.store.dry_run |= cli.dry_run;
    debug!("server: {:?}", config.server);

    config.server.validate().map_err(|err| match err {
        AccountError::MissingHostError => anyhow!("missing host: use --host or MAIL_HOST"),
        AccountError::MissingUserError => anyhow!("missing user: use --user or MAIL_USER"),
        AccountError::MissingPasswdError => anyhow!("missing password: use --passwd or MAIL_PASSWD"),
        err => anyhow!(err),
    })?;

    let mut printer = StdoutPrinter::stdout(cli.output);
    let mut store = MailStore::connect(&config.server, config.store)?;
    store
        .open()
        .with_context(|| format!("cannot connect to {}", config.server.host))?;

    let res = cli.command.execute(&mut printer, &mut store);
    if let Err(err) = store.close() {
        match res {
            Ok(()) => return Err(err).context("cannot close mail store"),
            Err(_) => warn!("cannot close mail store: {}", err),
        }
    }

    res
}
