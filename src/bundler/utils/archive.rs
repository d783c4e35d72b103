//! Final bundle archive creation.

use crate::bundler::{
    Error, Result,
    error::ErrorExt,
};
use flate2::{Compression, write::GzEncoder};
use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Container format of the final bundle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub enum ArchiveFormat {
    /// ZIP, as accepted by the Central Portal upload form.
    #[default]
    #[serde(rename = "zip")]
    Zip,
    /// Gzip-compressed tarball.
    #[serde(rename = "tar.gz", alias = "tar-gz", alias = "tgz")]
    TarGz,
}

impl ArchiveFormat {
    /// File extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            ArchiveFormat::Zip => "zip",
            ArchiveFormat::TarGz => "tar.gz",
        }
    }
}

impl std::str::FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zip" => Ok(ArchiveFormat::Zip),
            "tar.gz" | "tar-gz" | "tgz" => Ok(ArchiveFormat::TarGz),
            other => Err(format!(
                "unknown archive format '{other}' (expected zip or tar.gz)"
            )),
        }
    }
}

impl std::fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// Archives the whole tree under `root` into `archive`.
///
/// Entry names are relative to `root` with `/` separators, in sorted order.
/// An existing file at `archive` is replaced; if `archive` lies inside
/// `root` it is left out of its own contents.
///
/// # Arguments
///
/// * `root` - Staging root whose contents become the archive entries
/// * `archive` - Destination file
/// * `format` - Container format
///
/// # Returns
///
/// * `Ok(usize)` - Number of regular files written
/// * `Err` - If the tree cannot be read or the archive cannot be written.
///   No partial archive is left at `archive` in that case.
pub async fn write_archive(root: &Path, archive: &Path, format: ArchiveFormat) -> Result<usize> {
    super::fs::remove_file(archive).await?;
    if let Some(parent) = archive.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .fs_context("creating archive directory", parent)?;
    }

    let root = root.to_path_buf();
    let target = archive.to_path_buf();

    // Offload blocking work to dedicated thread pool
    let result = tokio::task::spawn_blocking(move || {
        let entries = collect_entries(&root, &target)?;
        let file = File::create(&target).fs_context("creating archive", &target)?;
        let count = match format {
            ArchiveFormat::Zip => write_zip(file, &entries)?,
            ArchiveFormat::TarGz => write_tar_gz(file, &entries)?,
        };
        Ok(count)
    })
    .await
    .map_err(|e| Error::GenericError(format!("Archive task panicked: {}", e)))
    .and_then(|result| result);

    if let Err(e) = &result {
        log::warn!("Removing incomplete archive {}: {}", archive.display(), e);
        if let Err(cleanup) = super::fs::remove_file(archive).await {
            log::warn!("{cleanup}");
        }
    }
    result
}

struct Entry {
    name: String,
    path: PathBuf,
    is_dir: bool,
}

fn collect_entries(root: &Path, archive: &Path) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.path() == archive {
            continue;
        }
        let rel = entry.path().strip_prefix(root)?;
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        entries.push(Entry {
            name,
            path: entry.path().to_path_buf(),
            is_dir: entry.file_type().is_dir(),
        });
    }
    Ok(entries)
}

fn write_zip(file: File, entries: &[Entry]) -> Result<usize> {
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    let mut zip = zip::ZipWriter::new(BufWriter::new(file));
    let mut count = 0;

    for entry in entries {
        if entry.is_dir {
            zip.add_directory(format!("{}/", entry.name), options)?;
        } else {
            zip.start_file(entry.name.clone(), options)?;
            let mut source = File::open(&entry.path).fs_context("reading file", &entry.path)?;
            io::copy(&mut source, &mut zip)?;
            count += 1;
        }
    }

    zip.finish()?.flush()?;
    Ok(count)
}

fn write_tar_gz(file: File, entries: &[Entry]) -> Result<usize> {
    let encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    let mut tar = tar::Builder::new(encoder);
    let mut count = 0;

    for entry in entries {
        if entry.is_dir {
            tar.append_dir(&entry.name, &entry.path)
                .fs_context("archiving directory", &entry.path)?;
        } else {
            tar.append_path_with_name(&entry.path, &entry.name)
                .fs_context("archiving file", &entry.path)?;
            count += 1;
        }
    }

    tar.into_inner()?.finish()?.flush()?;
    Ok(count)
}
