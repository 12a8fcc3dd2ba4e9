//! Builder for configuring and opening client sessions.

use std::time::Duration;

use secrecy::SecretString;

use super::smb::Client;
use crate::error::Result;
use crate::transport::config::{Auth, SmbConfig};

/// Builder for constructing [`Client`] sessions.
///
/// # Example
///
/// ```rust,no_run
/// use smbsession::ClientBuilder;
///
/// # async fn example() -> Result<(), smbsession::Error> {
/// let mut client = ClientBuilder::new("192.168.1.10")
///     .share("public")
///     .username("guest")
///     .connect()
///     .await?;
///
/// let listing = client.ls("*").await?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    config: SmbConfig,
}

impl ClientBuilder {
    /// Create a builder for the specified host with library defaults.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            config: SmbConfig::new(host),
        }
    }

    /// Set the share name.
    pub fn share(mut self, share: impl Into<String>) -> Self {
        self.config.share = share.into();
        self
    }

    /// Set the account name (default: `guest`).
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.config.username = username.into();
        self
    }

    /// Authenticate with a password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.config.auth = Auth::Password(SecretString::from(password.into()));
        self
    }

    /// Connect without a password (the default).
    pub fn no_password(mut self) -> Self {
        self.config.auth = Auth::NoPassword;
        self
    }

    /// Set the workgroup/domain (default: `WORKGROUP`).
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.config.domain = domain.into();
        self
    }

    /// Bind the connection to a local address.
    pub fn bind_address(mut self, address: impl Into<String>) -> Self {
        self.config.bind_address = Some(address.into());
        self
    }

    /// Set the SMB port (default: 445).
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Set the handshake timeout (default: 30s).
    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.config.connection_timeout = timeout;
        self
    }

    /// Set the default per-command timeout (default: 60s).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the client without connecting.
    pub fn build(self) -> Client {
        Client::new(self.config)
    }

    /// Build the client and establish the session.
    pub async fn connect(self) -> Result<Client> {
        let mut client = self.build();
        client.connect().await?;
        Ok(client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let client = ClientBuilder::new("127.0.0.1").build();
        let config = client.config();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.username, "guest");
        assert_eq!(config.domain, "WORKGROUP");
        assert_eq!(config.port, 445);
        assert_eq!(config.connection_timeout, Duration::from_secs(30));
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(matches!(config.auth, Auth::NoPassword));
    }

    #[test]
    fn test_setters() {
        let client = ClientBuilder::new("fileserver")
            .share("backups")
            .username("svc")
            .password("secret")
            .domain("CORP")
            .bind_address("10.0.0.2")
            .port(1445)
            .connection_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(10))
            .build();

        let config = client.config();
        assert_eq!(config.service(), "//fileserver/backups");
        assert_eq!(config.username, "svc");
        assert_eq!(config.domain, "CORP");
        assert_eq!(config.bind_address.as_deref(), Some("10.0.0.2"));
        assert_eq!(config.port, 1445);
        assert!(matches!(config.auth, Auth::Password(_)));
    }
}
