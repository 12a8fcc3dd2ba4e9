//! Compiled patterns for prompt and status-token recognition.

use std::sync::LazyLock;

use regex::bytes::Regex;

/// The recurring smbclient prompt.
///
/// Group 1 captures everything emitted since the last write (the response
/// body), group 2 the trailing backslash-rooted current directory. The
/// space smbclient prints after `>` is consumed when present so it does
/// not leak into the next response body.
pub static PROMPT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(.*)smb: (.*\\)> ?").expect("prompt pattern"));

/// Handshake pattern: the first prompt, or an NT status token arriving
/// before it (group 3). A token seen here means the connection was
/// refused before a session was established.
pub static HANDSHAKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(.*)smb: (.*\\)> ?|(NT_[A-Z_]+)").expect("handshake pattern")
});

/// An owned regex match: the full matched text plus its capture groups.
///
/// Captures are copied out of the output buffer so the buffer can be
/// consumed as soon as the match resolves.
#[derive(Debug, Clone)]
pub struct PatternMatch {
    text: String,
    groups: Vec<Option<String>>,
    pub(crate) end: usize,
}

impl PatternMatch {
    /// The entire matched text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Capture group `i` (0 is the whole match).
    pub fn group(&self, i: usize) -> Option<&str> {
        self.groups.get(i).and_then(|g| g.as_deref())
    }
}

/// Run `pattern` over `haystack`, extracting owned captures.
pub(crate) fn capture(pattern: &Regex, haystack: &[u8]) -> Option<PatternMatch> {
    let caps = pattern.captures(haystack)?;
    let whole = caps.get(0)?;
    Some(PatternMatch {
        text: String::from_utf8_lossy(whole.as_bytes()).into_owned(),
        groups: caps
            .iter()
            .map(|g| g.map(|m| String::from_utf8_lossy(m.as_bytes()).into_owned()))
            .collect(),
        end: whole.end(),
    })
}
