use anyhow::Result;
use clap::{builder::BoolishValueParser, Args, Parser, Subcommand};
use mailaid_lib::{
    account::{Protocol, ServerConfig},
    backend::Backend,
    store::MailStore,
};
use std::path::PathBuf;

use crate::{
    config,
    mbox::command::MailboxListCommand,
    msg::command::{
        MessageDeleteCommand, MessageDownloadCommand, MessageListCommand, MessageShowCommand,
    },
    output::OutputFmt,
    printer::Printer,
};

#[derive(Parser, Debug)]
#[command(
    name = "mailaid",
    author,
    version,
    about,
    propagate_version = true,
    infer_subcommands = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: MailaidCommand,

    /// Override the default configuration file path
    ///
    /// The given path is shell-expanded then canonicalized (if
    /// applicable). Values given on the command line or through
    /// environment variables win over the ones of the file.
    #[arg(long, short, global = true)]
    #[arg(value_name = "PATH", value_parser = config::path_parser)]
    pub config: Option<PathBuf>,

    /// Customize the output format
    ///
    /// The possible values are:
    ///
    ///  - json: output will be in a form of a JSON-compatible object
    ///
    ///  - plain: output will be in a form of plain text
    #[arg(long, short, global = true)]
    #[arg(value_name = "FORMAT", value_enum, default_value_t = Default::default())]
    pub output: OutputFmt,

    #[command(flatten)]
    pub server: ServerArgs,

    /// Maximum number of messages deleted between two commits
    #[arg(long, global = true, value_name = "SIZE")]
    pub batch_size: Option<usize>,

    /// Log destructive operations instead of performing them
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Enable debug logs
    #[arg(long, global = true)]
    pub debug: bool,
}

/// Connection arguments, overriding the configuration file.
#[derive(Args, Debug, Default, Clone)]
pub struct ServerArgs {
    /// Mail protocol, either pop3 or imap
    #[arg(long, global = true, env = "MAIL_PROTO", value_name = "PROTO")]
    pub proto: Option<Protocol>,

    /// Mail server host name
    #[arg(long, global = true, env = "MAIL_HOST", value_name = "HOST")]
    pub host: Option<String>,

    /// Mail server port, defaults to 995/993 with SSL or 110/143
    /// without
    #[arg(long, global = true, env = "MAIL_PORT", value_name = "PORT")]
    pub port: Option<u16>,

    /// Login
    #[arg(long, global = true, env = "MAIL_USER", value_name = "USER")]
    pub user: Option<String>,

    /// Password
    #[arg(long, global = true, env = "MAIL_PASSWD", value_name = "PASSWD")]
    #[arg(hide_env_values = true)]
    pub passwd: Option<String>,

    /// Connect using implicit TLS
    #[arg(long, global = true, env = "MAIL_SSL", value_name = "BOOL")]
    #[arg(num_args = 0..=1, default_missing_value = "true")]
    #[arg(value_parser = BoolishValueParser::new())]
    pub ssl: Option<bool>,

    /// Mailbox to select (IMAP only), defaults to INBOX
    #[arg(long, short, global = true, value_name = "MAILBOX")]
    pub mailbox: Option<String>,
}

impl ServerArgs {
    /// Overrides the given config with every argument set.
    pub fn apply(&self, server: &mut ServerConfig) {
        if let Some(proto) = self.proto {
            server.proto = proto;
        }
        if let Some(host) = &self.host {
            server.host = host.clone();
        }
        if let Some(port) = self.port {
            server.port = Some(port);
        }
        if let Some(user) = &self.user {
            server.user = user.clone();
        }
        if let Some(passwd) = &self.passwd {
            server.passwd = Some(passwd.clone());
        }
        if let Some(ssl) = self.ssl {
            server.ssl = ssl;
        }
        if let Some(mailbox) = &self.mailbox {
            server.mailbox = Some(mailbox.clone());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum MailaidCommand {
    /// List mailboxes (IMAP only)
    #[command(alias = "mbox", alias = "folders")]
    Mailboxes(MailboxListCommand),

    /// List a page of envelopes, oldest first
    #[command(alias = "envelopes")]
    List(MessageListCommand),

    /// Show one message
    #[command(alias = "read")]
    Show(MessageShowCommand),

    /// Append messages to an mbox file
    #[command(alias = "export")]
    Download(MessageDownloadCommand),

    /// Delete messages according to a retention rule
    #[command(alias = "remove")]
    Delete(MessageDeleteCommand),
}

impl MailaidCommand {
    pub fn execute<B: Backend>(
        self,
        printer: &mut impl Printer,
        store: &mut MailStore<B>,
    ) -> Result<()> {
        match self {
            Self::Mailboxes(cmd) => cmd.execute(printer, store),
            Self::List(cmd) => cmd.execute(printer, store),
            Self::Show(cmd) => cmd.execute(printer, store),
            Self::Download(cmd) => cmd.execute(printer, store),
            Self::Delete(cmd) => cmd.execute(printer, store),
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn it_should_build_valid_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn it_should_parse_global_args_after_subcommand() {
        let cli = Cli::try_parse_from([
            "mailaid", "list", "2", "--proto", "pop3", "--host", "pop.localhost", "--ssl",
            "false", "--dry-run",
        ])
        .unwrap();
        assert_eq!(Some(Protocol::Pop3), cli.server.proto);
        assert_eq!(Some("pop.localhost"), cli.server.host.as_deref());
        assert_eq!(Some(false), cli.server.ssl);
        assert!(cli.dry_run);
        assert!(matches!(cli.command, MailaidCommand::List(_)));

        let cli = Cli::try_parse_from(["mailaid", "mailboxes", "--ssl"]).unwrap();
        assert_eq!(Some(true), cli.server.ssl);
    }
}
