//! Response type and per-operation result classification.
//!
//! smbclient reports outcomes as free text. Each operation has one rule
//! deciding success, collected here as a closed table instead of ad hoc
//! string checks at the call sites.

use std::sync::LazyLock;

use regex::Regex;

static NT_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"NT_[A-Z_]+").expect("status token pattern"));

static GETTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^getting file").expect("get pattern"));

static PUTTING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^putting file").expect("put pattern"));

static MKDIR_FAILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"NT_STATUS_OBJECT_NAME_(INVALID|COLLISION)").expect("mkdir pattern")
});

/// Operation tag selecting the classification rule for a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandKind {
    Cd,
    Get,
    Put,
    Mkdir,
    Del,
    /// Any command without a dedicated rule: fails on any NT status line.
    Other,
}

/// Success/failure outcome of one remote operation.
///
/// Ordinary remote failures are carried here, not raised; the success
/// flag is computed once at classification and never changes.
#[derive(Debug, Clone)]
pub struct Response {
    /// The first NT status line of the raw body when one is present,
    /// otherwise the whole body.
    pub message: String,

    /// Whether the operation's rule judged the body a success.
    pub success: bool,
}

impl Response {
    /// Build a response from a raw body and an already-decided outcome.
    pub(crate) fn new(body: &str, success: bool) -> Self {
        let message = body
            .lines()
            .find(|line| line.starts_with("NT_"))
            .unwrap_or(body)
            .to_string();
        Self { message, success }
    }

    /// A failure with a fixed message, for checks that never reach the
    /// remote side.
    pub(crate) fn failure(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }

    /// Classify a raw response body under the rule for `kind`.
    pub(crate) fn classify(kind: CommandKind, body: &str) -> Self {
        let success = match kind {
            CommandKind::Cd => !body.contains("NT_STATUS_OBJECT_NAME_NOT_FOUND"),
            CommandKind::Get => GETTING.is_match(body),
            CommandKind::Put => PUTTING.is_match(body),
            CommandKind::Mkdir => !MKDIR_FAILED.is_match(body),
            CommandKind::Del => !body.contains("NT_STATUS_NO_SUCH_FILE"),
            CommandKind::Other => !body.lines().any(|line| line.starts_with("NT_")),
        };
        Self::new(body, success)
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn is_failure(&self) -> bool {
        !self.success
    }
}

impl std::fmt::Display for Response {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// First NT status token in `text`, if any.
pub(crate) fn nt_status(text: &str) -> Option<&str> {
    NT_TOKEN.find(text).map(|m| m.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cd_rule() {
        let ok = Response::classify(CommandKind::Cd, "");
        assert!(ok.is_success());

        let failed = Response::classify(
            CommandKind::Cd,
            "cd \\missing\\: NT_STATUS_OBJECT_NAME_NOT_FOUND\n",
        );
        assert!(failed.is_failure());
    }

    #[test]
    fn test_get_rule() {
        let ok = Response::classify(
            CommandKind::Get,
            "getting file \\remote.txt of size 5 as /tmp/out.txt\n",
        );
        assert!(ok.is_success());

        // Anything that is not a transfer report is a failure.
        let failed = Response::classify(CommandKind::Get, "NT_STATUS_NO_SUCH_FILE opening remote file\n");
        assert!(failed.is_failure());
    }

    #[test]
    fn test_put_rule() {
        let ok = Response::classify(
            CommandKind::Put,
            "putting file /tmp/in.txt as \\up.txt (1.2 kb/s)\n",
        );
        assert!(ok.is_success());

        let failed = Response::classify(CommandKind::Put, "/tmp/in.txt does not exist\n");
        assert!(failed.is_failure());
    }

    #[test]
    fn test_mkdir_rule() {
        assert!(Response::classify(CommandKind::Mkdir, "").is_success());
        assert!(
            Response::classify(CommandKind::Mkdir, "NT_STATUS_OBJECT_NAME_COLLISION making remote directory\n")
                .is_failure()
        );
        assert!(
            Response::classify(CommandKind::Mkdir, "NT_STATUS_OBJECT_NAME_INVALID making remote directory\n")
                .is_failure()
        );
    }

    #[test]
    fn test_del_rule() {
        assert!(Response::classify(CommandKind::Del, "").is_success());
        assert!(
            Response::classify(CommandKind::Del, "NT_STATUS_NO_SUCH_FILE deleting remote file\n")
                .is_failure()
        );
    }

    #[test]
    fn test_default_rule_fails_on_status_line() {
        assert!(Response::classify(CommandKind::Other, "all fine\n").is_success());
        assert!(
            Response::classify(CommandKind::Other, "some context\nNT_STATUS_ACCESS_DENIED\n")
                .is_failure()
        );
    }

    #[test]
    fn test_message_is_first_status_line() {
        let body = "some noise\nNT_STATUS_NO_SUCH_FILE deleting\nmore noise\n";
        let response = Response::classify(CommandKind::Del, body);
        assert_eq!(response.message, "NT_STATUS_NO_SUCH_FILE deleting");
        assert_eq!(response.message.lines().count(), 1);
    }

    #[test]
    fn test_message_falls_back_to_body() {
        let body = "putting file a as b\n";
        let response = Response::classify(CommandKind::Put, body);
        assert_eq!(response.message, body);
    }

    #[test]
    fn test_nt_status_extraction() {
        assert_eq!(
            nt_status("tree connect failed: NT_STATUS_BAD_NETWORK_NAME\n"),
            Some("NT_STATUS_BAD_NETWORK_NAME")
        );
        assert_eq!(nt_status("no token here"), None);
    }
}
