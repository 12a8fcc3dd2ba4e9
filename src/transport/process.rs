//! The spawned smbclient child process.

use std::process::Stdio;

use log::{trace, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};

use super::config::SmbConfig;
use crate::channel::TriggerDispatcher;
use crate::error::{ProcessError, Result};

const PROGRAM: &str = "smbclient";

/// One spawned smbclient instance.
///
/// The process owns the write half of the child's stdin; stdout and
/// stderr are drained continuously by background tasks that feed the
/// dispatcher, so output arriving between commands is never dropped.
#[derive(Debug)]
pub struct SmbProcess {
    child: Option<Child>,
    stdin: Option<ChildStdin>,
}

impl SmbProcess {
    /// Spawn smbclient for the given configuration.
    pub fn spawn(config: &SmbConfig, dispatcher: &TriggerDispatcher) -> Result<Self> {
        let mut command = Command::new(PROGRAM);
        command.args(config.command_args());
        command.envs(config.command_env());
        Self::spawn_command(command, dispatcher, PROGRAM)
    }

    /// Spawn an arbitrary interactive command wired to the dispatcher.
    pub(crate) fn spawn_command(
        mut command: Command,
        dispatcher: &TriggerDispatcher,
        program: &str,
    ) -> Result<Self> {
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = command.spawn().map_err(|source| ProcessError::SpawnFailed {
            program: program.to_string(),
            source,
        })?;

        let stdin = child.stdin.take();
        if let Some(stdout) = child.stdout.take() {
            // Only stdout EOF closes the dispatcher; it tracks the
            // process lifetime.
            Self::read_into(stdout, dispatcher.clone(), true);
        }
        if let Some(stderr) = child.stderr.take() {
            Self::read_into(stderr, dispatcher.clone(), false);
        }

        Ok(Self {
            child: Some(child),
            stdin,
        })
    }

    fn read_into<R>(mut reader: R, dispatcher: TriggerDispatcher, close_on_eof: bool)
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let _ = tokio::spawn(async move {
            let mut buf = [0u8; 4096];
            loop {
                match reader.read(&mut buf).await {
                    Ok(0) => break,
                    Ok(n) => {
                        trace!("<-- {:?}", String::from_utf8_lossy(&buf[..n]));
                        dispatcher.feed(&buf[..n]);
                    }
                    Err(e) => {
                        warn!("process read failed: {e}");
                        break;
                    }
                }
            }
            if close_on_eof {
                dispatcher.close();
            }
        });
    }

    /// Append bytes to the child's stdin.
    pub async fn write(&mut self, data: &[u8]) -> Result<()> {
        let stdin = self.stdin.as_mut().ok_or(ProcessError::Terminated)?;
        stdin.write_all(data).await.map_err(ProcessError::Write)?;
        stdin.flush().await.map_err(ProcessError::Write)?;
        trace!("--> {:?}", String::from_utf8_lossy(data));
        Ok(())
    }

    /// Kill the child and release its stdio. Idempotent; the reader
    /// tasks wind down on EOF and fail any pending triggers.
    pub async fn kill(&mut self) -> Result<()> {
        self.stdin.take();
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.kill().await {
                warn!("failed to kill process: {e}");
            }
        }
        Ok(())
    }

    /// Whether the child has not been killed yet.
    pub fn is_running(&self) -> bool {
        self.child.is_some()
    }
}
