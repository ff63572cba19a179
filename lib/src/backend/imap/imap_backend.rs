//! IMAP backend module.
//!
//! This module contains the definition of the IMAP backend. Message
//! ids are sequence numbers of the selected mailbox: they stay valid
//! until the next expunge, which renumbers the remaining messages.

use imap::types::NameAttribute;
use log::{debug, info, log_enabled, trace, Level};

use crate::{
    account::ServerConfig,
    backend::{
        self, imap::Error, set_timeout, tls_connector, Backend, FetchKind, MailStream,
    },
    mbox::{Mbox, Mboxes},
};

type ImapSess = imap::Session<MailStream>;

const HEADER_QUERY: &str = "BODY.PEEK[HEADER]";
const FULL_QUERY: &str = "BODY[]";
const DELETED_FLAG: &str = "(\\Deleted)";

pub struct ImapBackend {
    config: ServerConfig,
    mbox: String,
    sess: Option<ImapSess>,
}

impl ImapBackend {
    pub fn new(config: ServerConfig) -> Self {
        let mbox = config.mailbox().to_owned();
        Self {
            config,
            mbox,
            sess: None,
        }
    }

    /// Returns the currently selected mailbox.
    pub fn mbox(&self) -> &str {
        &self.mbox
    }

    fn sess(&mut self) -> Result<&mut ImapSess, Error> {
        self.sess.as_mut().ok_or(Error::GetSessionError)
    }

    fn connect(&self) -> Result<ImapSess, Error> {
        let host = self.config.host.as_str();
        let port = self.config.port();
        let timeout = self.config.timeout();

        debug!("host: {}", host);
        debug!("port: {}", port);
        debug!("ssl: {}", self.config.ssl);
        debug!("starttls: {}", self.config.starttls);

        let mut client_builder = imap::ClientBuilder::new(host, port);
        if self.config.starttls {
            client_builder.starttls();
        }

        let client = if self.config.ssl || self.config.starttls {
            let connector =
                tls_connector(self.config.insecure).map_err(Error::CreateTlsConnectorError)?;
            client_builder.connect(|domain, tcp| {
                set_timeout(&tcp, timeout)?;
                Ok(MailStream::Tls(connector.connect(domain, tcp)?))
            })
        } else {
            client_builder.connect(|_, tcp| {
                set_timeout(&tcp, timeout)?;
                Ok(MailStream::Plain(tcp))
            })
        }
        .map_err(|err| Error::ConnectImapServerError(err, host.to_owned(), port))?;

        debug!("login: {}", self.config.user);
        let passwd = self.config.passwd()?;
        let mut sess = client
            .login(&self.config.user, &passwd)
            .map_err(|res| Error::LoginImapServerError(res.0, self.config.user.to_owned()))?;
        sess.debug = log_enabled!(Level::Trace);

        Ok(sess)
    }

    /// Selects the given mailbox and returns the number of messages
    /// it contains.
    pub fn select(&mut self, mbox: &str) -> Result<u32, Error> {
        debug!("select mailbox {:?}", mbox);
        let exists = self
            .sess()?
            .select(mbox)
            .map_err(|err| Error::SelectMboxError(err, mbox.to_owned()))?
            .exists;
        self.mbox = mbox.to_owned();
        debug!("mailbox {:?} contains {} message(s)", mbox, exists);
        Ok(exists)
    }
}

impl Backend for ImapBackend {
    fn name(&self) -> &'static str {
        "imap"
    }

    fn open(&mut self) -> backend::Result<()> {
        trace!(">> imap open");

        let sess = self.connect()?;
        self.sess = Some(sess);
        let mbox = self.mbox.clone();
        self.select(&mbox)?;

        trace!("<< imap open");
        Ok(())
    }

    fn close(&mut self, commit: bool) -> backend::Result<()> {
        trace!(">> imap close");

        if let Some(mut sess) = self.sess.take() {
            // CLOSE silently expunges, LOGOUT alone leaves flags as they are.
            if commit {
                debug!("close mailbox {:?}", self.mbox);
                sess.close()
                    .map_err(|err| Error::CloseMboxError(err, self.mbox.to_owned()))?;
            }
            debug!("logout from imap server");
            sess.logout().map_err(Error::LogoutError)?;
        } else {
            debug!("no session found");
        }

        trace!("<< imap close");
        Ok(())
    }

    fn total_messages(&mut self) -> backend::Result<u32> {
        let mbox = self.mbox.clone();
        Ok(self.select(&mbox)?)
    }

    fn supports(&self, _kind: FetchKind) -> bool {
        true
    }

    fn fetch(&mut self, id: u32, kind: FetchKind) -> backend::Result<Vec<u8>> {
        let query = match kind {
            FetchKind::Header => HEADER_QUERY,
            FetchKind::Full => FULL_QUERY,
        };
        let fetches = self
            .sess()?
            .fetch(id.to_string(), query)
            .map_err(|err| Error::FetchMsgError(err, id))?;
        let fetch = fetches.first().ok_or(Error::FindMsgError(id))?;
        let raw = match kind {
            FetchKind::Header => fetch.header().ok_or(Error::GetMsgPayloadError(id, "header")),
            FetchKind::Full => fetch.body().ok_or(Error::GetMsgPayloadError(id, "body")),
        }?;
        debug!("fetch message {}, response length: {}", id, raw.len());
        Ok(raw.to_vec())
    }

    fn mark_deleted(&mut self, id: u32) -> backend::Result<()> {
        let seq = id.to_string();
        self.sess()?
            .store(&seq, format!("+FLAGS {}", DELETED_FLAG))
            .map_err(|err| Error::AddDeletedFlagError(err, seq.clone()))?;
        Ok(())
    }

    fn unmark_deleted(&mut self, id: u32) -> backend::Result<()> {
        let seq = id.to_string();
        self.sess()?
            .store(&seq, format!("-FLAGS {}", DELETED_FLAG))
            .map_err(|err| Error::DelDeletedFlagError(err, seq.clone()))?;
        Ok(())
    }

    fn unmark_all_deleted(&mut self) -> backend::Result<()> {
        if self.total_messages()? == 0 {
            return Ok(());
        }
        self.sess()?
            .store("1:*", format!("-FLAGS {}", DELETED_FLAG))
            .map_err(|err| Error::DelDeletedFlagError(err, "1:*".to_owned()))?;
        Ok(())
    }

    fn flush(&mut self) -> backend::Result<()> {
        let mbox = self.mbox.clone();
        self.sess()?
            .expunge()
            .map_err(|err| Error::ExpungeError(err, mbox))?;
        info!("expunged mailbox {:?}", self.mbox);
        Ok(())
    }

    fn list_mboxes(&mut self) -> backend::Result<Mboxes> {
        trace!(">> get imap mailboxes");

        let imap_mboxes = self
            .sess()?
            .list(Some(""), Some("*"))
            .map_err(Error::ListMboxesError)?;
        let mboxes = Mboxes {
            mboxes: imap_mboxes
                .iter()
                .map(|imap_mbox| Mbox {
                    delim: imap_mbox.delimiter().unwrap_or_default().into(),
                    name: imap_mbox.name().into(),
                    attrs: imap_mbox
                        .attributes()
                        .iter()
                        .map(|attr| match attr {
                            NameAttribute::Marked => "Marked".to_owned(),
                            NameAttribute::Unmarked => "Unmarked".to_owned(),
                            NameAttribute::NoSelect => "NoSelect".to_owned(),
                            NameAttribute::NoInferiors => "NoInferiors".to_owned(),
                            NameAttribute::Custom(custom) => {
                                custom.trim_start_matches('\\').to_owned()
                            }
                        })
                        .collect(),
                })
                .collect(),
        };

        trace!("imap mailboxes: {:?}", mboxes);
        trace!("<< get imap mailboxes");
        Ok(mboxes)
    }
}
