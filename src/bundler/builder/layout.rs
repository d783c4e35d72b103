//! Maven repository layout in the staging directory.

use crate::bundler::{
    Coordinates, Error, Origin, PomSettings, ResolvedArtifact, Result, placeholder,
    utils::fs::{copy_file, create_dir_all},
};
use std::path::{Path, PathBuf};

/// The staging root and the `group/artifact/version` directory inside it.
#[derive(Debug, Clone)]
pub struct RepositoryLayout {
    root: PathBuf,
    version_dir: PathBuf,
}

impl RepositoryLayout {
    /// Computes `root/<group split on '.'>/<artifact_id>/<version>`.
    pub fn new(root: &Path, coordinates: &Coordinates) -> Self {
        Self {
            root: root.to_path_buf(),
            version_dir: root.join(coordinates.repository_path()),
        }
    }

    /// Staging root, wiped by [`prepare`](Self::prepare).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory receiving the artifacts.
    pub fn version_dir(&self) -> &Path {
        &self.version_dir
    }

    /// Deletes everything under the root and recreates the version directory.
    ///
    /// # Errors
    ///
    /// [`Error::Staging`] if the root cannot be removed or the path created.
    /// This is the only fatal condition of a run.
    pub async fn prepare(&self) -> Result<()> {
        create_dir_all(&self.root, true)
            .await
            .map_err(|source| Error::Staging {
                path: self.root.clone(),
                source,
            })?;
        tokio::fs::create_dir_all(&self.version_dir)
            .await
            .map_err(|source| Error::Staging {
                path: self.version_dir.clone(),
                source,
            })?;
        log::info!("Staging layout ready: {}", self.version_dir.display());
        Ok(())
    }

    /// Copies `artifact` into the version directory under its canonical name.
    ///
    /// A failed copy is replaced by the kind's placeholder, and the returned
    /// artifact is marked as such.
    ///
    /// # Arguments
    ///
    /// * `artifact` - Resolved source and its canonical destination name
    /// * `coordinates` - Used when a placeholder POM has to be rendered
    /// * `pom` - POM metadata for that placeholder
    ///
    /// # Returns
    ///
    /// The staged artifact, with `path` inside the version directory.
    pub async fn place(
        &self,
        artifact: &ResolvedArtifact,
        coordinates: &Coordinates,
        pom: &PomSettings,
    ) -> ResolvedArtifact {
        let destination = self.version_dir.join(&artifact.spec.destination);

        let origin = match copy_file(&artifact.path, &destination).await {
            Ok(()) => {
                match artifact.origin {
                    Origin::Real => log::info!(
                        "  ✓ {} <- {}",
                        artifact.spec.destination,
                        artifact.path.display()
                    ),
                    Origin::Placeholder => {
                        log::warn!("  {} (placeholder)", artifact.spec.destination)
                    }
                }
                artifact.origin
            }
            Err(e) => {
                log::warn!(
                    "Failed to copy {} into staging: {}. Writing a placeholder.",
                    artifact.spec.destination,
                    e
                );
                if let Err(e) = placeholder::write_artifact(
                    artifact.spec.kind.placeholder(),
                    &destination,
                    coordinates,
                    pom,
                )
                .await
                {
                    log::warn!("Could not write placeholder {}: {}", destination.display(), e);
                }
                Origin::Placeholder
            }
        };

        ResolvedArtifact {
            spec: artifact.spec.clone(),
            path: destination,
            origin,
        }
    }

    /// Version directory relative to the root with `/` separators and a
    /// trailing slash, for display.
    pub fn display_path(&self) -> String {
        let rel = self
            .version_dir
            .strip_prefix(&self.root)
            .unwrap_or(&self.version_dir);
        let mut path = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        path.push('/');
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{ArtifactKind, ArtifactSpec};

    fn coords() -> Coordinates {
        Coordinates::new("com.telnyx.webrtc.lib", "library", "1.0.1", "aar")
    }

    fn spec(kind: ArtifactKind, source: PathBuf, destination: &str) -> ArtifactSpec {
        ArtifactSpec {
            kind,
            source,
            destination: destination.to_string(),
            required: true,
        }
    }

    #[tokio::test]
    async fn prepare_resets_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("publish");
        std::fs::create_dir_all(root.join("com/old/stuff")).unwrap();
        std::fs::write(root.join("stale.zip"), b"old").unwrap();

        let layout = RepositoryLayout::new(&root, &coords());
        layout.prepare().await.unwrap();

        assert!(layout.version_dir().is_dir());
        assert!(!root.join("stale.zip").exists());
        assert!(!root.join("com/old").exists());
        assert_eq!(layout.display_path(), "com/telnyx/webrtc/lib/library/1.0.1/");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn prepare_fails_fatally_when_root_is_unwritable() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where a directory component is expected.
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"").unwrap();

        let layout = RepositoryLayout::new(&blocker.join("publish"), &coords());
        let err = layout.prepare().await.unwrap_err();
        assert!(err.is_fatal());
    }

    #[tokio::test]
    async fn place_copies_under_canonical_name() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("library-release.aar");
        std::fs::write(&source, b"real").unwrap();

        let layout = RepositoryLayout::new(&dir.path().join("publish"), &coords());
        layout.prepare().await.unwrap();

        let resolved = ResolvedArtifact {
            spec: spec(ArtifactKind::Primary, source.clone(), "library-1.0.1.aar"),
            path: source,
            origin: Origin::Real,
        };
        let placed = layout
            .place(&resolved, &coords(), &PomSettings::default())
            .await;
        assert_eq!(placed.origin, Origin::Real);
        assert_eq!(placed.path, layout.version_dir().join("library-1.0.1.aar"));
        assert_eq!(std::fs::read(&placed.path).unwrap(), b"real");
    }

    #[tokio::test]
    async fn failed_copy_writes_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let layout = RepositoryLayout::new(&dir.path().join("publish"), &coords());
        layout.prepare().await.unwrap();

        let vanished = dir.path().join("gone.pom");
        let resolved = ResolvedArtifact {
            spec: spec(ArtifactKind::Pom, vanished.clone(), "library-1.0.1.pom"),
            path: vanished,
            origin: Origin::Real,
        };
        let placed = layout
            .place(&resolved, &coords(), &PomSettings::default())
            .await;
        assert_eq!(placed.origin, Origin::Placeholder);
        let pom = std::fs::read_to_string(&placed.path).unwrap();
        assert!(pom.contains("<version>1.0.1</version>"));
    }
}
