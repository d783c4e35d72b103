//! Artifact resolution with placeholder substitution.

use crate::bundler::{
    ArtifactSpec, Origin, ResolvedArtifact, Settings, placeholder, utils::fs::is_readable_file,
};
use std::path::Path;

/// Resolves [`ArtifactSpec`]s to files, synthesizing placeholders for
/// anything the build did not produce.
pub struct ArtifactResolver<'a> {
    settings: &'a Settings,
    placeholder_dir: &'a Path,
}

impl<'a> ArtifactResolver<'a> {
    /// Creates a resolver writing placeholders under `placeholder_dir`.
    pub fn new(settings: &'a Settings, placeholder_dir: &'a Path) -> Self {
        Self {
            settings,
            placeholder_dir,
        }
    }

    /// Resolves one spec. Never fails.
    ///
    /// A readable regular file at the source path is used as-is. Otherwise a
    /// placeholder named after the destination is written to the placeholder
    /// directory; if even that write fails the placeholder path is returned
    /// anyway and layout repeats the substitution.
    pub async fn resolve(&self, spec: &ArtifactSpec) -> ResolvedArtifact {
        if is_readable_file(&spec.source).await {
            log::info!(
                "✓ Found {} artifact: {}",
                spec.name(),
                spec.source.display()
            );
            return ResolvedArtifact {
                spec: spec.clone(),
                path: spec.source.clone(),
                origin: Origin::Real,
            };
        }

        if spec.required {
            log::warn!(
                "{} artifact not found at {}. Using a placeholder.",
                spec.name(),
                spec.source.display()
            );
        } else {
            log::info!(
                "Optional {} artifact not found at {}. Using a placeholder.",
                spec.name(),
                spec.source.display()
            );
        }

        let path = self.placeholder_dir.join(&spec.destination);
        if let Err(e) = placeholder::write_artifact(
            spec.kind.placeholder(),
            &path,
            self.settings.coordinates(),
            self.settings.pom(),
        )
        .await
        {
            log::warn!("Could not write placeholder for {}: {}", spec.name(), e);
        }

        ResolvedArtifact {
            spec: spec.clone(),
            path,
            origin: Origin::Placeholder,
        }
    }

    /// Resolves every spec in table order.
    pub async fn resolve_all(&self, specs: &[ArtifactSpec]) -> Vec<ResolvedArtifact> {
        let mut resolved = Vec::with_capacity(specs.len());
        for spec in specs {
            resolved.push(self.resolve(spec).await);
        }
        resolved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundler::{ArtifactKind, Coordinates, SettingsBuilder};

    fn settings(build: &Path) -> Settings {
        SettingsBuilder::new()
            .coordinates(Coordinates::new("com.example", "lib", "1.0", "aar"))
            .build_directory(build)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn existing_source_is_real() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let spec = settings
            .artifact_specs()
            .into_iter()
            .find(|s| s.kind == ArtifactKind::Primary)
            .unwrap();
        std::fs::create_dir_all(spec.source.parent().unwrap()).unwrap();
        std::fs::write(&spec.source, b"aar bytes").unwrap();

        let placeholders = dir.path().join("placeholders");
        let resolved = ArtifactResolver::new(&settings, &placeholders)
            .resolve(&spec)
            .await;
        assert_eq!(resolved.origin, Origin::Real);
        assert_eq!(resolved.path, spec.source);
        assert!(!placeholders.exists());
    }

    #[tokio::test]
    async fn missing_sources_always_become_placeholders() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(&dir.path().join("nothing-here"));
        let placeholders = dir.path().join("placeholders");
        let resolver = ArtifactResolver::new(&settings, &placeholders);

        for _ in 0..2 {
            let resolved = resolver.resolve_all(&settings.artifact_specs()).await;
            assert_eq!(resolved.len(), 4);
            for artifact in &resolved {
                assert_eq!(artifact.origin, Origin::Placeholder);
                assert!(artifact.path.is_file(), "{}", artifact.path.display());
            }
            assert_eq!(std::fs::metadata(&resolved[0].path).unwrap().len(), 0);
            let pom = std::fs::read_to_string(&resolved[1].path).unwrap();
            assert!(pom.contains("<artifactId>lib</artifactId>"));
            assert!(std::fs::metadata(&resolved[2].path).unwrap().len() > 0);
        }
    }

    #[tokio::test]
    async fn directory_at_source_path_is_not_an_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let spec = settings.artifact_specs().remove(0);
        std::fs::create_dir_all(&spec.source).unwrap();

        let resolved = ArtifactResolver::new(&settings, &dir.path().join("p"))
            .resolve(&spec)
            .await;
        assert_eq!(resolved.origin, Origin::Placeholder);
    }
}
