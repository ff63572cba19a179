//! Config module.
//!
//! This module contains the representation of the user configuration
//! file, shared by both binaries.

use anyhow::{anyhow, Context, Result};
use log::{debug, trace};
use mailaid_lib::{account::ServerConfig, store::StoreConfig};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};

use crate::{holiday::HolidayConfig, notify::NotifierConfig};

/// Represents the user config file.
///
/// Connection and store settings sit at the top level, next to the
/// `[notify]` and `[holiday]` sections.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    #[serde(flatten)]
    pub server: ServerConfig,
    #[serde(flatten)]
    pub store: StoreConfig,
    pub notify: NotifierConfig,
    pub holiday: HolidayConfig,
}

impl Config {
    /// Reads the config from the given path, or from the first
    /// default path pointing to a file.
    ///
    /// A missing explicit path is an error, while missing default
    /// paths give an empty config.
    pub fn from_opt_path(path: Option<&Path>) -> Result<Self> {
        debug!("path: {:?}", path);

        let path = match path {
            Some(path) if !path.is_file() => {
                return Err(anyhow!("cannot find config file {:?}", path));
            }
            Some(path) => path.to_owned(),
            None => match Self::default_paths().into_iter().find(|path| path.is_file()) {
                Some(path) => path,
                None => {
                    debug!("no config file found, using default config");
                    return Ok(Self::default());
                }
            },
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("cannot read config file {:?}", path))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("cannot parse config file {:?}", path))?;

        trace!("config: {:?}", config);
        Ok(config)
    }

    /// Default paths, from `$XDG_CONFIG_HOME/mailaid/config.toml` to
    /// `$HOME/.config/mailaid/config.toml`.
    pub fn default_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        if let Ok(dir) = env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(dir).join("mailaid").join("config.toml"));
        }

        let home_var = if cfg!(target_family = "windows") {
            "USERPROFILE"
        } else {
            "HOME"
        };
        if let Ok(dir) = env::var(home_var) {
            paths.push(
                PathBuf::from(dir)
                    .join(".config")
                    .join("mailaid")
                    .join("config.toml"),
            );
        }

        paths
    }
}

/// Parse the given [`str`] as [`PathBuf`].
///
/// The path is first shell expanded, then canonicalized (if
/// applicable).
pub fn path_parser(path: &str) -> Result<PathBuf, String> {
    let path = shellexpand::full(path).map_err(|err| err.to_string())?;
    let path = PathBuf::from(path.as_ref());
    Ok(path.canonicalize().unwrap_or(path))
}

#[cfg(test)]
mod tests {
    use mailaid_lib::account::Protocol;
    use std::io::Write;

    use super::*;
    use crate::{cli::ServerArgs, holiday::HolidayProvider};

    fn config_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    const CONFIG: &str = r#"
        proto = "pop3"
        host = "pop.localhost"
        user = "alice"
        passwd-cmd = "echo secret"
        ssl = false
        batch-size = 20

        [notify]
        interval = 120

        [notify.filter]
        subject-keyword = "[deploy]"
        from-addrs = ["ci@localhost"]

        [notify.hook]
        url = "http://localhost/hook"
        body = "$subject"

        [notify.hook.headers]
        Content-Type = "application/json"

        [holiday]
        provider = "nager-date"
        country-code = "US"
    "#;

    #[test]
    fn it_should_read_every_section() {
        let file = config_file(CONFIG);
        let config = Config::from_opt_path(Some(file.path())).unwrap();

        assert_eq!(Protocol::Pop3, config.server.proto);
        assert_eq!(110, config.server.port());
        assert_eq!(Some("echo secret"), config.server.passwd_cmd.as_deref());
        assert_eq!(20, config.store.batch_size);
        assert!(!config.store.dry_run);
        assert_eq!(120, config.notify.interval);
        assert_eq!(Some("[deploy]"), config.notify.filter.subject_keyword.as_deref());
        assert_eq!(
            Some("application/json"),
            config.notify.hook.headers.get("Content-Type").map(String::as_str)
        );
        assert_eq!("POST", config.notify.hook.method);
        assert_eq!(HolidayProvider::NagerDate, config.holiday.provider);
    }

    #[test]
    fn it_should_let_args_override_file() {
        let file = config_file(CONFIG);
        let mut config = Config::from_opt_path(Some(file.path())).unwrap();
        let args = ServerArgs {
            proto: Some(Protocol::Imap),
            host: Some("imap.localhost".into()),
            ssl: Some(true),
            ..ServerArgs::default()
        };
        args.apply(&mut config.server);

        assert_eq!(Protocol::Imap, config.server.proto);
        assert_eq!("imap.localhost", config.server.host);
        assert_eq!("alice", config.server.user);
        assert_eq!(993, config.server.port());
        assert_eq!("INBOX", config.server.mailbox());
    }

    #[test]
    fn it_should_fail_on_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::from_opt_path(Some(&dir.path().join("missing.toml"))).is_err());
        assert!(Config::from_opt_path(Some(config_file("host = [").path())).is_err());
    }

    #[test]
    fn it_should_expand_paths() {
        let home = env::var("HOME").unwrap_or_default();
        let path = path_parser("~/mailaid-missing-config.toml").unwrap();
        assert_eq!(PathBuf::from(home).join("mailaid-missing-config.toml"), path);
    }
}
