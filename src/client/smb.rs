//! The smbclient session and its file operations.

use std::io::Write as _;
use std::path::Path;
use std::time::Duration;

use log::{debug, trace, warn};
use tempfile::NamedTempFile;

use super::listing::{self, EntryKind, Listing};
use super::response::{self, CommandKind, Response};
use crate::channel::{patterns, TimeoutKind, TriggerDispatcher};
use crate::error::{ClientError, ProcessError, Result};
use crate::transport::{SmbConfig, SmbProcess};

/// One smbclient session: a spawned process driven through its prompt.
///
/// All operations take `&mut self`, so a session carries exactly one
/// command in flight; concurrent callers need separate sessions. Remote
/// operation failures come back as [`Response`] values — only session
/// establishment, timeouts and process faults are errors.
pub struct Client {
    config: SmbConfig,
    dispatcher: TriggerDispatcher,
    process: Option<SmbProcess>,
    connected: bool,
    current_dir: String,
}

impl Client {
    /// Create an unconnected client from a configuration.
    pub fn new(config: SmbConfig) -> Self {
        Self {
            config,
            dispatcher: TriggerDispatcher::new(),
            process: None,
            connected: false,
            current_dir: "\\".to_string(),
        }
    }

    /// Spawn smbclient and wait for the first prompt.
    ///
    /// An NT status token arriving before the prompt fails the handshake
    /// with that token as the message; the session never becomes
    /// connected. The connection timeout bounds only this handshake.
    pub async fn connect(&mut self) -> Result<()> {
        if self.connected {
            return Err(ClientError::AlreadyConnected.into());
        }
        if self.process.is_none() {
            self.process = Some(SmbProcess::spawn(&self.config, &self.dispatcher)?);
        }

        let timeout_id = self
            .dispatcher
            .add_timeout(self.config.connection_timeout, TimeoutKind::Connection);
        let result = self.dispatcher.wait_for(&patterns::HANDSHAKE).await;
        self.dispatcher.remove_trigger(timeout_id);
        let matched = result?;

        if let Some(status) = response::nt_status(matched.text()) {
            return Err(ClientError::Handshake {
                status: status.to_string(),
            }
            .into());
        }

        self.connected = true;
        self.current_dir = "\\".to_string();
        debug!("connected to {}", self.config.service());
        Ok(())
    }

    /// Send one command line and capture the body before the next prompt.
    ///
    /// A per-command timeout must not exceed the session default; that is
    /// rejected before anything is written. The prompt match also carries
    /// the new current directory.
    pub(crate) async fn ask(&mut self, command: &str, timeout: Option<Duration>) -> Result<String> {
        if let Some(requested) = timeout {
            if requested > self.config.timeout {
                return Err(ClientError::TimeoutExceedsSession {
                    requested,
                    limit: self.config.timeout,
                }
                .into());
            }
        }
        if !self.connected {
            return Err(ClientError::NotConnected.into());
        }
        let process = self.process.as_mut().ok_or(ClientError::NotConnected)?;

        process.write(format!("{command}\n").as_bytes()).await?;

        let timeout_id = self.dispatcher.add_timeout(
            timeout.unwrap_or(self.config.timeout),
            TimeoutKind::Command,
        );
        let result = self.dispatcher.wait_for(&patterns::PROMPT).await;
        self.dispatcher.remove_trigger(timeout_id);
        let matched = result?;

        let body = matched.group(1).unwrap_or_default().to_string();
        if let Some(dir) = matched.group(2) {
            self.current_dir = dir.to_string();
        }
        trace!("command {command:?} answered with {} bytes", body.len());
        Ok(body)
    }

    /// Quote each name and append it to the command, then [`ask`](Self::ask).
    pub(crate) async fn ask_wrapped<I, S>(
        &mut self,
        command: &str,
        names: I,
        timeout: Option<Duration>,
    ) -> Result<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<Path>,
    {
        self.ask(&wrap_filenames(command, names), timeout).await
    }

    /// List the current directory. `pattern` is passed through as the ls
    /// qualifier; `"*"` lists everything.
    pub async fn ls(&mut self, pattern: &str) -> Result<Listing> {
        let body = self.ask_wrapped("ls", [pattern], None).await?;
        Ok(listing::parse_listing(&body))
    }

    /// Whether a file or directory exists at `path`, which may span
    /// multiple `/`-separated segments.
    pub async fn exists(&mut self, path: &str) -> Result<bool> {
        let base = path.rsplit('/').find(|s| !s.is_empty()).unwrap_or(path);
        Ok(self.ls(path).await?.contains_key(base))
    }

    /// Change the remote working directory.
    pub async fn cd(&mut self, dir: &str) -> Result<Response> {
        let body = self.ask(&format!("cd \"{dir}\""), None).await?;
        Ok(Response::classify(CommandKind::Cd, &body))
    }

    /// Download the remote file at `path` to a local destination.
    pub async fn get(&mut self, path: &str, to: impl AsRef<Path>) -> Result<Response> {
        let to = to.as_ref().display().to_string();
        let (leaf, depth) = self.enter_parent(path).await?;
        let result = match self
            .ask_wrapped("get", [leaf.as_str(), to.as_str()], None)
            .await
        {
            Ok(body) => Ok(Response::classify(CommandKind::Get, &body)),
            Err(e) => Err(e),
        };
        self.leave_parent(depth).await;
        result
    }

    /// Upload a local file to the remote destination.
    pub async fn put(&mut self, file: impl AsRef<Path>, destination: &str) -> Result<Response> {
        let local = file.as_ref().display().to_string();
        let body = self
            .ask_wrapped("put", [local.as_str(), destination], None)
            .await?;
        Ok(Response::classify(CommandKind::Put, &body))
    }

    /// Upload raw bytes via a scoped temporary file.
    ///
    /// The temp file is removed when its handle drops, whatever the
    /// outcome of the upload.
    pub async fn put_content(&mut self, content: &[u8], destination: &str) -> Result<Response> {
        let mut temp = NamedTempFile::new().map_err(ProcessError::Io)?;
        temp.write_all(content).map_err(ProcessError::Io)?;
        temp.flush().map_err(ProcessError::Io)?;

        let local = temp.path().display().to_string();
        let body = self
            .ask_wrapped("put", [local.as_str(), destination], None)
            .await?;
        Ok(Response::classify(CommandKind::Put, &body))
    }

    /// Create a remote directory. A blank name fails without touching
    /// the remote side.
    pub async fn mkdir(&mut self, directory: &str) -> Result<Response> {
        if directory.trim().is_empty() {
            return Ok(Response::failure("directory name is empty"));
        }
        let body = self.ask_wrapped("mkdir", [directory], None).await?;
        Ok(Response::classify(CommandKind::Mkdir, &body))
    }

    /// Delete the remote file at `path`, which may span multiple
    /// `/`-separated segments.
    pub async fn del(&mut self, path: &str) -> Result<Response> {
        let (leaf, depth) = self.enter_parent(path).await?;
        let result = match self.ask_wrapped("del", [leaf.as_str()], None).await {
            Ok(body) => Ok(Response::classify(CommandKind::Del, &body)),
            Err(e) => Err(e),
        };
        self.leave_parent(depth).await;
        result
    }

    /// Recursively delete a remote directory.
    ///
    /// The first failing sub-operation aborts the traversal and is
    /// returned as-is; remaining siblings are left untouched.
    pub async fn rmdir(&mut self, dir: &str) -> Result<Response> {
        let response = self.cd(dir).await?;
        if response.is_failure() {
            return Ok(response);
        }

        let entries = self.ls("*").await?;
        for (name, entry) in &entries {
            if name == "." || name == ".." {
                continue;
            }
            let response = match entry.kind {
                EntryKind::File => self.del(name).await?,
                EntryKind::Directory => Box::pin(self.rmdir(name)).await?,
            };
            if response.is_failure() {
                return Ok(response);
            }
        }

        let response = self.cd("..").await?;
        if response.is_failure() {
            return Ok(response);
        }
        let body = self.ask_wrapped("rmdir", [dir], None).await?;
        Ok(Response::new(&body, true))
    }

    /// Kill the underlying process and release the session. Idempotent.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut process) = self.process.take() {
            process.kill().await?;
        }
        self.dispatcher.close();
        self.connected = false;
        Ok(())
    }

    /// The remote working directory as of the last prompt.
    pub fn current_dir(&self) -> &str {
        &self.current_dir
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn config(&self) -> &SmbConfig {
        &self.config
    }

    /// Change into the parent of a multi-segment path, returning the
    /// leaf name and how many levels [`leave_parent`](Self::leave_parent)
    /// must climb back.
    async fn enter_parent(&mut self, path: &str) -> Result<(String, usize)> {
        let parts: Vec<&str> = path.split('/').collect();
        if parts.len() > 1 {
            let leaf = parts[parts.len() - 1].to_string();
            let depth = parts.len() - 1;
            let dir = parts[..parts.len() - 1].join("/");
            self.cd(&dir).await?;
            Ok((leaf, depth))
        } else {
            Ok((path.to_string(), 0))
        }
    }

    /// Climb back up after [`enter_parent`](Self::enter_parent). Runs on
    /// every exit path of the wrapped operation; best-effort so a dead
    /// session does not mask the operation's own error.
    async fn leave_parent(&mut self, depth: usize) {
        for _ in 0..depth {
            if let Err(e) = self.cd("..").await {
                warn!("failed to restore directory: {e}");
                break;
            }
        }
    }
}

/// Append each name to the command, wrapped in double quotes.
fn wrap_filenames<I, S>(command: &str, names: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<Path>,
{
    let mut wrapped = command.to_string();
    for name in names {
        wrapped.push_str(&format!(" \"{}\"", name.as_ref().display()));
    }
    wrapped
}
