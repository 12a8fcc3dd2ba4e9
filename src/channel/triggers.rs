//! Trigger dispatch: racing pattern and elapsed-time watchers.
//!
//! Every chunk of process output and every timer tick is evaluated
//! against the set of pending triggers. The first trigger to resolve
//! wins; its sibling is removed by the caller. A trigger resolves exactly
//! once or is cancelled explicitly; a removed trigger never fires.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{debug, trace, warn};
use regex::bytes::Regex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use super::buffer::OutputBuffer;
use super::patterns::{self, PatternMatch};
use crate::error::{ChannelError, Error, ProcessError, Result};

/// Identifies a registered trigger for later cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerId(u64);

/// Which phase a firing elapsed-time trigger aborts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeoutKind {
    /// The initial handshake.
    Connection,

    /// A single in-flight command.
    Command,
}

impl TimeoutKind {
    fn into_error(self, duration: Duration) -> Error {
        match self {
            TimeoutKind::Connection => ChannelError::ConnectionTimeout(duration).into(),
            TimeoutKind::Command => ChannelError::CommandTimeout(duration).into(),
        }
    }
}

enum TriggerKind {
    Pattern {
        pattern: Regex,
        tx: oneshot::Sender<Result<PatternMatch>>,
    },
    Elapsed {
        duration: Duration,
        label: TimeoutKind,
        timer: JoinHandle<()>,
    },
}

struct DispatcherState {
    buffer: OutputBuffer,
    /// Pending triggers in registration order. Presence means active;
    /// resolution and cancellation both remove the entry.
    triggers: Vec<(TriggerId, TriggerKind)>,
    next_id: u64,
    closed: bool,
}

impl DispatcherState {
    fn alloc_id(&mut self) -> TriggerId {
        self.next_id += 1;
        TriggerId(self.next_id)
    }
}

/// Shared dispatcher evaluating output chunks and timer ticks against
/// the pending trigger set.
#[derive(Clone)]
pub struct TriggerDispatcher {
    state: Arc<Mutex<DispatcherState>>,
}

impl TriggerDispatcher {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(DispatcherState {
                buffer: OutputBuffer::new(),
                triggers: Vec::new(),
                next_id: 0,
                closed: false,
            })),
        }
    }

    /// Deliver a chunk of process output.
    ///
    /// The chunk is buffered and pending pattern triggers are evaluated
    /// in registration order. Data arriving while nothing waits stays in
    /// the buffer for the next registered trigger.
    pub fn feed(&self, data: &[u8]) {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return;
        }
        state.buffer.extend(data);
        trace!("fed {} bytes, buffer now {}", data.len(), state.buffer.len());
        Self::dispatch(&mut state);
    }

    fn dispatch(state: &mut DispatcherState) {
        loop {
            let mut fired = None;
            for (pos, (id, kind)) in state.triggers.iter().enumerate() {
                if let TriggerKind::Pattern { pattern, .. } = kind {
                    if let Some(m) = patterns::capture(pattern, state.buffer.as_slice()) {
                        fired = Some((pos, *id, m));
                        break;
                    }
                }
            }
            let Some((pos, id, m)) = fired else { break };
            state.buffer.consume_to(m.end);
            let (_, kind) = state.triggers.remove(pos);
            if let TriggerKind::Pattern { tx, .. } = kind {
                debug!("trigger {id:?} matched {} bytes", m.text().len());
                let _ = tx.send(Ok(m));
            }
        }
    }

    /// Block until `pattern` matches the output stream.
    ///
    /// Already-buffered output is evaluated first, so a token that
    /// arrived before the wait is never lost. Fails when a racing
    /// elapsed-time trigger fires first or the dispatcher closes.
    pub async fn wait_for(&self, pattern: &Regex) -> Result<PatternMatch> {
        let rx = {
            let mut state = self.state.lock().unwrap();
            // Buffered output outranks termination: a token that arrived
            // before the process died still resolves the wait.
            if let Some(m) = patterns::capture(pattern, state.buffer.as_slice()) {
                state.buffer.consume_to(m.end);
                return Ok(m);
            }
            if state.closed {
                return Err(ProcessError::Terminated.into());
            }
            let (tx, rx) = oneshot::channel();
            let id = state.alloc_id();
            state.triggers.push((
                id,
                TriggerKind::Pattern {
                    pattern: pattern.clone(),
                    tx,
                },
            ));
            rx
        };

        match rx.await {
            Ok(result) => result,
            Err(_) => Err(ChannelError::Closed.into()),
        }
    }

    /// Register an elapsed-time trigger. When it fires, every pending
    /// pattern wait fails with the labelled timeout error.
    pub fn add_timeout(&self, duration: Duration, label: TimeoutKind) -> TriggerId {
        let mut state = self.state.lock().unwrap();
        let id = state.alloc_id();
        let dispatcher = self.clone();
        let timer = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            dispatcher.fire_timeout(id);
        });
        state.triggers.push((
            id,
            TriggerKind::Elapsed {
                duration,
                label,
                timer,
            },
        ));
        id
    }

    fn fire_timeout(&self, id: TriggerId) {
        let mut state = self.state.lock().unwrap();
        // Cancellation removed it already; a removed trigger never fires.
        let Some(pos) = state.triggers.iter().position(|(tid, _)| *tid == id) else {
            return;
        };
        let (_, kind) = state.triggers.remove(pos);
        let TriggerKind::Elapsed {
            duration, label, ..
        } = kind
        else {
            return;
        };

        warn!("{label:?} timeout fired after {duration:?}");
        let mut pos = 0;
        while pos < state.triggers.len() {
            if matches!(state.triggers[pos].1, TriggerKind::Pattern { .. }) {
                let (_, pending) = state.triggers.remove(pos);
                if let TriggerKind::Pattern { tx, .. } = pending {
                    let _ = tx.send(Err(label.into_error(duration)));
                }
            } else {
                pos += 1;
            }
        }
    }

    /// Cancel a trigger. Idempotent: removing an already-resolved or
    /// unknown id is a no-op.
    pub fn remove_trigger(&self, id: TriggerId) {
        let mut state = self.state.lock().unwrap();
        let Some(pos) = state.triggers.iter().position(|(tid, _)| *tid == id) else {
            return;
        };
        let (_, kind) = state.triggers.remove(pos);
        if let TriggerKind::Elapsed { timer, .. } = kind {
            timer.abort();
        }
        trace!("trigger {id:?} removed");
    }

    /// Close the dispatcher: all pending and future waits fail with a
    /// termination error. Called when the process goes away.
    pub fn close(&self) {
        let mut state = self.state.lock().unwrap();
        if state.closed {
            return;
        }
        state.closed = true;
        debug!("dispatcher closed with {} pending triggers", state.triggers.len());
        for (_, kind) in state.triggers.drain(..) {
            match kind {
                TriggerKind::Pattern { tx, .. } => {
                    let _ = tx.send(Err(ProcessError::Terminated.into()));
                }
                TriggerKind::Elapsed { timer, .. } => timer.abort(),
            }
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }
}

impl Default for TriggerDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::patterns::PROMPT;
    use crate::error::{ChannelError, Error, ProcessError};

    fn pattern(s: &str) -> Regex {
        Regex::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_wait_resolves_on_feed() {
        let dispatcher = TriggerDispatcher::new();
        let feeder = dispatcher.clone();
        let _ = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            feeder.feed(b"output body\nsmb: \\dir\\> ");
        });

        let m = dispatcher.wait_for(&PROMPT).await.unwrap();
        assert_eq!(m.group(1), Some("output body\n"));
        assert_eq!(m.group(2), Some("\\dir\\"));
    }

    #[tokio::test]
    async fn test_buffered_output_resolves_next_wait() {
        let dispatcher = TriggerDispatcher::new();
        // No waiter registered yet; the token must not be lost.
        dispatcher.feed(b"early\nsmb: \\> ");
        let m = dispatcher.wait_for(&PROMPT).await.unwrap();
        assert_eq!(m.group(1), Some("early\n"));
    }

    #[tokio::test]
    async fn test_match_spanning_chunks() {
        let dispatcher = TriggerDispatcher::new();
        dispatcher.feed(b"partial smb: ");
        let waiter = dispatcher.clone();
        let handle = tokio::spawn(async move { waiter.wait_for(&PROMPT).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        dispatcher.feed(b"\\share\\> ");

        let m = handle.await.unwrap().unwrap();
        assert_eq!(m.group(2), Some("\\share\\"));
    }

    #[tokio::test]
    async fn test_consumed_output_not_replayed() {
        let dispatcher = TriggerDispatcher::new();
        dispatcher.feed(b"first\nsmb: \\> ");

        let first = dispatcher.wait_for(&PROMPT).await.unwrap();
        assert_eq!(first.group(1), Some("first\n"));
        assert_eq!(first.group(2), Some("\\"));

        // The consumed prompt must not satisfy the next wait.
        dispatcher.feed(b"second\nsmb: \\sub\\> ");
        let second = dispatcher.wait_for(&PROMPT).await.unwrap();
        assert_eq!(second.group(2), Some("\\sub\\"));
        assert!(!second.group(1).unwrap().contains("first"));
    }

    #[tokio::test]
    async fn test_timeout_fails_pending_wait() {
        let dispatcher = TriggerDispatcher::new();
        dispatcher.add_timeout(Duration::from_millis(10), TimeoutKind::Command);

        let err = dispatcher.wait_for(&pattern("never")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Channel(ChannelError::CommandTimeout(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_timeout_label() {
        let dispatcher = TriggerDispatcher::new();
        dispatcher.add_timeout(Duration::from_millis(10), TimeoutKind::Connection);

        let err = dispatcher.wait_for(&pattern("never")).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Channel(ChannelError::ConnectionTimeout(_))
        ));
    }

    #[tokio::test]
    async fn test_pattern_win_then_removed_timeout_never_fires() {
        let dispatcher = TriggerDispatcher::new();
        let timeout_id = dispatcher.add_timeout(Duration::from_millis(20), TimeoutKind::Command);

        dispatcher.feed(b"body\nsmb: \\> ");
        let m = dispatcher.wait_for(&PROMPT).await.unwrap();
        assert_eq!(m.group(2), Some("\\"));
        dispatcher.remove_trigger(timeout_id);

        // Past the deadline; the cancelled trigger must stay silent.
        tokio::time::sleep(Duration::from_millis(40)).await;
        dispatcher.feed(b"later\nsmb: \\> ");
        let m = dispatcher.wait_for(&PROMPT).await.unwrap();
        assert_eq!(m.group(2), Some("\\"));
        assert!(m.group(1).unwrap().contains("later"));
    }

    #[tokio::test]
    async fn test_remove_trigger_idempotent() {
        let dispatcher = TriggerDispatcher::new();
        let id = dispatcher.add_timeout(Duration::from_secs(60), TimeoutKind::Command);
        dispatcher.remove_trigger(id);
        dispatcher.remove_trigger(id);
    }

    #[tokio::test]
    async fn test_close_fails_pending_wait() {
        let dispatcher = TriggerDispatcher::new();
        let waiter = dispatcher.clone();
        let handle = tokio::spawn(async move { waiter.wait_for(&pattern("never")).await });
        tokio::time::sleep(Duration::from_millis(10)).await;

        dispatcher.close();
        let err = handle.await.unwrap().unwrap_err();
        assert!(matches!(err, Error::Process(ProcessError::Terminated)));
    }

    #[tokio::test]
    async fn test_wait_after_close_fails_immediately() {
        let dispatcher = TriggerDispatcher::new();
        dispatcher.close();
        let err = dispatcher.wait_for(&pattern("never")).await.unwrap_err();
        assert!(matches!(err, Error::Process(ProcessError::Terminated)));
    }
}
