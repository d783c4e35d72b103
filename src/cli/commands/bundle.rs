//! `bundle` command: assemble a release bundle.

use crate::bundler::{ArtifactSources, Bundle, Bundler, Coordinates, Settings, SettingsBuilder};
use crate::cli::{OutputManager, args::BundleArgs};
use crate::error::{CliError, Result};
use crate::metadata::{self, BundleManifest};

/// Packaging used when neither the flags nor the config name one.
const DEFAULT_PACKAGING: &str = "jar";

/// Runs the pipeline and prints its report.
///
/// Returns exit code 0 whenever the pipeline completed, placeholders
/// included. A staging failure is returned as an error.
pub async fn execute(args: &BundleArgs, output: &OutputManager) -> Result<i32> {
    let manifest = load_config(args, output)?;
    let settings = build_settings(args, manifest)?;

    // Stdout carries nothing but the document in JSON mode.
    if !args.json {
        output.section(&format!(
            "Bundling {}",
            settings.coordinates().deployment_name()
        ))?;
        output.verbose(&format!(
            "Staging directory: {}",
            settings.staging_directory().display()
        ))?;
    }

    let bundle = Bundler::new(settings).bundle().await?;

    if args.json {
        output.println(&serde_json::to_string_pretty(&bundle)?)?;
    } else {
        print_summary(&bundle, output)?;
    }

    Ok(0)
}

fn load_config(args: &BundleArgs, output: &OutputManager) -> Result<BundleManifest> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => metadata::default_config_path(),
    };
    match path {
        Some(path) => {
            if !args.json {
                output.verbose(&format!("Using configuration {}", path.display()))?;
            }
            metadata::load_manifest(&path)
        }
        None => Ok(BundleManifest::default()),
    }
}

/// Merges flags over the config file into validated [`Settings`].
pub fn build_settings(args: &BundleArgs, manifest: BundleManifest) -> Result<Settings> {
    let BundleManifest {
        coordinates,
        paths,
        artifacts,
        pom,
        mut signing,
        repository,
        checksums,
        archive,
    } = manifest;

    let require = |flag: Option<&String>, config: Option<String>, argument: &str| {
        flag.cloned()
            .or(config)
            .ok_or_else(|| CliError::MissingArgument {
                argument: argument.to_string(),
            })
    };
    let coordinates = Coordinates::new(
        require(args.group_id.as_ref(), coordinates.group_id, "group-id")?,
        require(args.artifact_id.as_ref(), coordinates.artifact_id, "artifact-id")?,
        require(
            args.release_version.as_ref(),
            coordinates.version,
            "release-version",
        )?,
        args.packaging
            .clone()
            .or(coordinates.packaging)
            .unwrap_or_else(|| DEFAULT_PACKAGING.to_string()),
    );

    let config_sources = artifacts.sources();
    let sources = ArtifactSources {
        primary: args.primary.clone().or(config_sources.primary),
        pom: args.pom.clone().or(config_sources.pom),
        javadoc: args.javadoc.clone().or(config_sources.javadoc),
        sources: args.sources.clone().or(config_sources.sources),
    };

    if args.key_id.is_some() {
        signing.key_id = args.key_id.clone();
    }
    if args.passphrase.is_some() {
        signing.passphrase = args.passphrase.clone();
    }
    if args.gpg.is_some() {
        signing.program = args.gpg.clone();
    }
    if args.gnupg_home.is_some() {
        signing.gnupg_home = args.gnupg_home.clone();
    }

    let algorithms = if args.checksums.is_empty() {
        checksums.algorithms
    } else {
        args.checksums.clone()
    };

    let mut builder = SettingsBuilder::new()
        .coordinates(coordinates)
        .pom(pom)
        .artifact_sources(sources)
        .optional_artifacts(args.optional_artifacts || artifacts.optional)
        .signing(signing)
        .repository(repository)
        .checksum_algorithms(algorithms)
        .checksum_signatures(checksums.include_signatures && !args.no_signature_checksums)
        .archive_format(args.format.unwrap_or(archive.format));

    if let Some(dir) = args.build_dir.clone().or(paths.build_directory) {
        builder = builder.build_directory(dir);
    }
    if let Some(dir) = args.staging_dir.clone().or(paths.staging_directory) {
        builder = builder.staging_directory(dir);
    }
    if let Some(path) = args.archive.clone().or(archive.path) {
        builder = builder.archive_path(path);
    }

    Ok(builder.build()?)
}

fn print_summary(bundle: &Bundle, output: &OutputManager) -> Result<()> {
    for artifact in &bundle.artifacts {
        let line = format!("{} ({})", artifact.spec.destination, artifact.origin);
        if artifact.origin.is_placeholder() {
            output.warn(&line)?;
        } else {
            output.success(&line)?;
        }
    }

    if !bundle.warnings.is_empty() {
        output.section(&format!("{} warning(s)", bundle.warnings.len()))?;
        for warning in &bundle.warnings {
            output.warn(&warning.to_string())?;
        }
    }

    output.println("")?;
    output.println(&bundle.report.to_string())?;
    Ok(())
}
