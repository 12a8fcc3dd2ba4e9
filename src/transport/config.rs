//! smbclient invocation configuration.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

/// Default workgroup/domain sent with the connection.
pub const DEFAULT_DOMAIN: &str = "WORKGROUP";

/// Default account name for shares that allow guest access.
pub const DEFAULT_USERNAME: &str = "guest";

/// Default SMB port.
pub const DEFAULT_PORT: u16 = 445;

/// Default handshake timeout.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Default per-command timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Credential handed to smbclient on the command line.
#[derive(Debug)]
pub enum Auth {
    /// Authenticate with the account password.
    Password(SecretString),

    /// Connect without a password (`--no-pass`).
    NoPassword,
}

/// Connection configuration for one smbclient session.
#[derive(Debug)]
pub struct SmbConfig {
    /// Target host (hostname or IP address).
    pub host: String,

    /// Share name on the host.
    pub share: String,

    /// Account name for authentication.
    pub username: String,

    /// Credential to present.
    pub auth: Auth,

    /// Workgroup/domain.
    pub domain: String,

    /// Local address to bind the connection to.
    pub bind_address: Option<String>,

    /// SMB port (default: 445).
    pub port: u16,

    /// Handshake timeout (bounds only the initial prompt).
    pub connection_timeout: Duration,

    /// Default per-command timeout.
    pub timeout: Duration,
}

impl SmbConfig {
    /// Create a configuration with library defaults for the given host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            share: String::new(),
            username: DEFAULT_USERNAME.to_string(),
            auth: Auth::NoPassword,
            domain: DEFAULT_DOMAIN.to_string(),
            bind_address: None,
            port: DEFAULT_PORT,
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// The UNC-style service path, e.g. `//127.0.0.1/public`.
    pub fn service(&self) -> String {
        format!("//{}/{}", self.host, self.share)
    }

    /// Build the argv for the smbclient invocation.
    ///
    /// The external config file is disabled with `-s /dev/null` so host
    /// configuration cannot change the session's behavior.
    pub fn command_args(&self) -> Vec<String> {
        let mut args = vec![self.service()];

        match &self.auth {
            Auth::Password(password) => args.push(password.expose_secret().to_string()),
            Auth::NoPassword => args.push("--no-pass".to_string()),
        }

        args.push("-W".to_string());
        args.push(self.domain.clone());
        args.push("-U".to_string());
        args.push(self.username.clone());

        if let Some(addr) = &self.bind_address {
            args.push("-I".to_string());
            args.push(addr.clone());
        }

        args.push("-p".to_string());
        args.push(self.port.to_string());
        args.push("-s".to_string());
        args.push("/dev/null".to_string());

        args
    }

    /// Environment forced onto the child: UTF-8 locale and a fixed
    /// terminal type, so output is stable across hosts.
    pub fn command_env(&self) -> Vec<(&'static str, &'static str)> {
        vec![("LC_CTYPE", "en_US.UTF-8"), ("TERM", "xterm-256color")]
    }
}
