//! Signing identity and remote repository credentials.

use std::path::PathBuf;

/// Default signing program.
pub const DEFAULT_SIGNING_PROGRAM: &str = "gpg";

/// Signing tool configuration.
///
/// Every field is optional. Without a key id the tool's default identity
/// signs; without a usable tool every signature becomes a placeholder.
#[derive(Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Key id passed as `--local-user`.
    pub key_id: Option<String>,

    /// Passphrase fed to the signer on stdin.
    pub passphrase: Option<String>,

    /// Signing program name or path.
    ///
    /// Default: "gpg"
    pub program: Option<String>,

    /// Keyring directory exported to the signer as `GNUPGHOME`.
    pub gnupg_home: Option<PathBuf>,
}

impl SigningSettings {
    /// Program to probe and invoke.
    pub fn program(&self) -> &str {
        self.program
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(DEFAULT_SIGNING_PROGRAM)
    }

    /// Configured key id, ignoring blank values.
    pub fn key_id(&self) -> Option<&str> {
        self.key_id.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Configured passphrase, ignoring empty values.
    pub fn passphrase(&self) -> Option<&str> {
        self.passphrase.as_deref().filter(|p| !p.is_empty())
    }
}

impl std::fmt::Debug for SigningSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningSettings")
            .field("key_id", &self.key_id)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("program", &self.program)
            .field("gnupg_home", &self.gnupg_home)
            .finish()
    }
}

/// Remote repository endpoint and credentials.
///
/// Never needed to assemble a bundle; carried so the final report can point
/// at the right upload location.
#[derive(Clone, Default, serde::Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    /// Upload endpoint.
    pub url: Option<url::Url>,
    /// Account name.
    pub username: Option<String>,
    /// Account password or token.
    pub password: Option<String>,
}

impl std::fmt::Debug for RepositorySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepositorySettings")
            .field("url", &self.url.as_ref().map(|u| u.as_str()))
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_redacts_secrets() {
        let signing = SigningSettings {
            key_id: Some("ABCD1234".into()),
            passphrase: Some("hunter2".into()),
            ..Default::default()
        };
        let rendered = format!("{signing:?}");
        assert!(rendered.contains("ABCD1234"));
        assert!(!rendered.contains("hunter2"));

        let repo = RepositorySettings {
            password: Some("token-value".into()),
            ..Default::default()
        };
        assert!(!format!("{repo:?}").contains("token-value"));
    }

    #[test]
    fn blank_values_count_as_unset() {
        let signing = SigningSettings {
            key_id: Some("  ".into()),
            passphrase: Some(String::new()),
            program: Some(String::new()),
            gnupg_home: None,
        };
        assert_eq!(signing.key_id(), None);
        assert_eq!(signing.passphrase(), None);
        assert_eq!(signing.program(), DEFAULT_SIGNING_PROGRAM);
    }
}
