//! Detached ASCII-armored signatures.
//!
//! The signing tool is probed once when the engine is created. Any failure
//! after that (tool missing, bad passphrase, unknown key) degrades to a
//! placeholder `.asc`, so the postcondition "`<file>.asc` exists" always holds.

use super::tool_detection::{DetectedTool, ToolInvocation, probe_tool, run_external_tool};
use crate::bundler::{Origin, SigningSettings, placeholder, utils::fs::remove_file};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Who produced a signature.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignerIdentity {
    /// Signed with the configured key.
    KeyId(String),
    /// Signed with the tool's default identity.
    DefaultIdentity,
    /// Placeholder, nobody signed.
    Anonymous,
}

impl std::fmt::Display for SignerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignerIdentity::KeyId(id) => write!(f, "key {id}"),
            SignerIdentity::DefaultIdentity => f.write_str("default identity"),
            SignerIdentity::Anonymous => f.write_str("ANONYMOUS"),
        }
    }
}

/// A written `.asc` file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Signature {
    /// File that was signed.
    pub artifact: PathBuf,
    /// The `.asc` sibling.
    pub path: PathBuf,
    /// Signer.
    pub signer: SignerIdentity,
    /// Real signature or placeholder block.
    pub origin: Origin,
}

/// Produces detached signatures with an external OpenPGP tool.
pub struct SignatureEngine {
    tool: Option<DetectedTool>,
    key_id: Option<String>,
    passphrase: Option<String>,
    gnupg_home: Option<PathBuf>,
}

impl std::fmt::Debug for SignatureEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureEngine")
            .field("tool", &self.tool)
            .field("key_id", &self.key_id)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .field("gnupg_home", &self.gnupg_home)
            .finish()
    }
}

impl SignatureEngine {
    /// Probes the configured signing program once with `--version`.
    pub async fn probe(settings: &SigningSettings) -> Self {
        let tool = probe_tool(settings.program(), "--version").await;
        if tool.is_none() {
            log::warn!("Signing tool unavailable. Every signature will be a placeholder.");
        }
        Self {
            tool,
            key_id: settings.key_id().map(String::from),
            passphrase: settings.passphrase().map(String::from),
            gnupg_home: settings.gnupg_home.clone(),
        }
    }

    /// An engine that only writes placeholders.
    pub fn unavailable() -> Self {
        Self {
            tool: None,
            key_id: None,
            passphrase: None,
            gnupg_home: None,
        }
    }

    /// Whether a working signing tool was found.
    pub fn is_available(&self) -> bool {
        self.tool.is_some()
    }

    /// `<file>.asc` for `path`.
    pub fn signature_path(path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".asc");
        PathBuf::from(name)
    }

    /// Command-line arguments for signing `path` into `asc`.
    ///
    /// The passphrase is never part of the arguments; it is fed on stdin.
    pub fn signing_args(&self, path: &Path, asc: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["--batch".into(), "--yes".into(), "--no-tty".into()];
        if let Some(key_id) = &self.key_id {
            args.push("--local-user".into());
            args.push(key_id.into());
        }
        if self.passphrase.is_some() {
            args.extend(["--pinentry-mode", "loopback", "--passphrase-fd", "0"].map(OsString::from));
        }
        args.extend(["--armor", "--detach-sign", "--output"].map(OsString::from));
        args.push(asc.as_os_str().to_owned());
        args.push(path.as_os_str().to_owned());
        args
    }

    /// Signs `path`, writing `<path>.asc`. Never fails.
    ///
    /// A stale `.asc` from an earlier run is removed first. If the tool is
    /// unavailable, exits non-zero or leaves no output, a placeholder
    /// signature is written instead.
    ///
    /// # Returns
    ///
    /// * [`Signature`] with [`Origin::Real`] - The tool produced the file
    /// * [`Signature`] with [`Origin::Placeholder`] - The fallback was written
    pub async fn sign(&self, path: &Path) -> Signature {
        let asc = Self::signature_path(path);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        // A stale .asc must not satisfy the existence check below.
        if let Err(e) = remove_file(&asc).await {
            log::debug!("{e}");
        }

        let signer = match &self.tool {
            Some(tool) => match self.invoke(tool, path, &asc).await {
                Ok(()) => {
                    let signer = match &self.key_id {
                        Some(id) => SignerIdentity::KeyId(id.clone()),
                        None => SignerIdentity::DefaultIdentity,
                    };
                    log::info!("  ✓ Signed {} with {}", name, signer);
                    Some(signer)
                }
                Err(e) => {
                    log::warn!("  Failed to sign {}: {}. Writing a placeholder signature.", name, e);
                    None
                }
            },
            None => {
                log::warn!("  {}.asc is a placeholder (no signing tool)", name);
                None
            }
        };

        let mut origin = Origin::Real;
        let signer = match signer {
            Some(signer) if asc.is_file() => signer,
            Some(_) => {
                log::warn!("  Signature file for {} was not created. Writing a placeholder.", name);
                origin = Origin::Placeholder;
                SignerIdentity::Anonymous
            }
            None => {
                origin = Origin::Placeholder;
                SignerIdentity::Anonymous
            }
        };

        if origin.is_placeholder() {
            self.write_placeholder(path, &asc).await;
        }

        Signature {
            artifact: path.to_path_buf(),
            path: asc,
            signer,
            origin,
        }
    }

    async fn invoke(
        &self,
        tool: &DetectedTool,
        path: &Path,
        asc: &Path,
    ) -> Result<(), super::tool_detection::ToolError> {
        let stdin = self
            .passphrase
            .as_ref()
            .map(|p| format!("{p}\n").into_bytes());
        let mut invocation = ToolInvocation {
            stdin: stdin.as_deref(),
            envs: Vec::new(),
        };
        if let Some(home) = &self.gnupg_home {
            invocation.envs.push(("GNUPGHOME", home.as_os_str()));
        }

        run_external_tool(&tool.path, self.signing_args(path, asc), invocation)
            .await
            .map(|_| ())
    }

    async fn write_placeholder(&self, path: &Path, asc: &Path) {
        if let Err(e) = placeholder::write_signature(path, asc).await {
            log::warn!("{e}");
        }
        // Self-check: the postcondition is that the file exists.
        if !asc.is_file()
            && let Err(e) = placeholder::write_signature(path, asc).await
        {
            log::warn!("Placeholder signature retry failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(key: Option<&str>, passphrase: Option<&str>) -> SignatureEngine {
        SignatureEngine {
            tool: None,
            key_id: key.map(String::from),
            passphrase: passphrase.map(String::from),
            gnupg_home: None,
        }
    }

    fn strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn keyed_arguments_use_loopback_and_stdin() {
        let args = strings(
            engine(Some("ABCD1234"), Some("secret"))
                .signing_args(Path::new("lib.aar"), Path::new("lib.aar.asc")),
        );
        assert_eq!(
            args,
            [
                "--batch",
                "--yes",
                "--no-tty",
                "--local-user",
                "ABCD1234",
                "--pinentry-mode",
                "loopback",
                "--passphrase-fd",
                "0",
                "--armor",
                "--detach-sign",
                "--output",
                "lib.aar.asc",
                "lib.aar",
            ]
        );
        assert!(!args.iter().any(|a| a == "secret"));
    }

    #[test]
    fn default_identity_arguments() {
        let args = strings(engine(None, None).signing_args(Path::new("a.pom"), Path::new("a.pom.asc")));
        assert_eq!(
            args,
            [
                "--batch",
                "--yes",
                "--no-tty",
                "--armor",
                "--detach-sign",
                "--output",
                "a.pom.asc",
                "a.pom"
            ]
        );
    }

    #[tokio::test]
    async fn unavailable_tool_writes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib-1.0.aar");
        std::fs::write(&file, b"").unwrap();

        let signature = SignatureEngine::unavailable().sign(&file).await;
        assert_eq!(signature.origin, Origin::Placeholder);
        assert_eq!(signature.signer, SignerIdentity::Anonymous);
        assert_eq!(signature.path, dir.path().join("lib-1.0.aar.asc"));

        let text = std::fs::read_to_string(&signature.path).unwrap();
        assert!(text.starts_with("-----BEGIN PGP SIGNATURE-----"));
        assert!(text.contains("lib-1.0.aar"));
    }

    #[tokio::test]
    async fn missing_program_probes_as_unavailable() {
        let settings = SigningSettings {
            program: Some("kodegen-no-such-gpg".into()),
            ..Default::default()
        };
        let engine = SignatureEngine::probe(&settings).await;
        assert!(!engine.is_available());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_tool_falls_back_to_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.jar");
        std::fs::write(&file, b"jar").unwrap();

        let engine = SignatureEngine {
            tool: Some(DetectedTool {
                path: PathBuf::from("false"),
                version: String::new(),
            }),
            key_id: Some("ABCD".into()),
            passphrase: None,
            gnupg_home: None,
        };
        let signature = engine.sign(&file).await;
        assert_eq!(signature.origin, Origin::Placeholder);
        assert!(signature.path.is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn tool_that_writes_nothing_still_leaves_a_signature() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.jar");
        std::fs::write(&file, b"jar").unwrap();

        // `true` accepts any arguments, exits 0 and writes no output file.
        let engine = SignatureEngine {
            tool: Some(DetectedTool {
                path: PathBuf::from("true"),
                version: String::new(),
            }),
            key_id: None,
            passphrase: None,
            gnupg_home: None,
        };
        let signature = engine.sign(&file).await;
        assert_eq!(signature.origin, Origin::Placeholder);
        assert_eq!(signature.signer, SignerIdentity::Anonymous);
        assert!(signature.path.is_file());
    }
}
