//! Artifact checksum calculation.
//!
//! Writes one `<file>.<ext>` sibling per algorithm containing the bare
//! lowercase hex digest (no file name, no trailing newline), which is the
//! format repository validators compare byte for byte.

use crate::bundler::{
    Origin, Result,
    error::ErrorExt,
};
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// Read size used when streaming a file through the hashers.
const CHUNK_SIZE: usize = 8192;

/// Supported digest algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    /// 128-bit MD5.
    Md5,
    /// 160-bit SHA-1.
    Sha1,
    /// 256-bit SHA-2.
    Sha256,
    /// 512-bit SHA-2.
    Sha512,
}

impl ChecksumAlgorithm {
    /// Algorithms written when none are configured.
    pub const DEFAULT: [ChecksumAlgorithm; 2] = [ChecksumAlgorithm::Md5, ChecksumAlgorithm::Sha1];

    /// Every supported algorithm.
    pub const ALL: [ChecksumAlgorithm; 4] = [
        ChecksumAlgorithm::Md5,
        ChecksumAlgorithm::Sha1,
        ChecksumAlgorithm::Sha256,
        ChecksumAlgorithm::Sha512,
    ];

    /// Sibling file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Md5 => "md5",
            ChecksumAlgorithm::Sha1 => "sha1",
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Sha512 => "sha512",
        }
    }

    /// Digest size in bits.
    pub fn bits(self) -> usize {
        match self {
            ChecksumAlgorithm::Md5 => 128,
            ChecksumAlgorithm::Sha1 => 160,
            ChecksumAlgorithm::Sha256 => 256,
            ChecksumAlgorithm::Sha512 => 512,
        }
    }

    /// Length of the hex digest.
    pub fn hex_len(self) -> usize {
        self.bits() / 4
    }

    /// All-zero digest written when the real one cannot be computed.
    pub fn zero_digest(self) -> String {
        "0".repeat(self.hex_len())
    }

    /// Lowercase hex digest of `bytes`.
    pub fn digest(self, bytes: &[u8]) -> String {
        match self {
            ChecksumAlgorithm::Md5 => format!("{:x}", md5::compute(bytes)),
            ChecksumAlgorithm::Sha1 => hex::encode(Sha1::digest(bytes)),
            ChecksumAlgorithm::Sha256 => hex::encode(Sha256::digest(bytes)),
            ChecksumAlgorithm::Sha512 => hex::encode(Sha512::digest(bytes)),
        }
    }

    fn hasher(self) -> Hasher {
        match self {
            ChecksumAlgorithm::Md5 => Hasher::Md5(md5::Context::new()),
            ChecksumAlgorithm::Sha1 => Hasher::Sha1(Sha1::new()),
            ChecksumAlgorithm::Sha256 => Hasher::Sha256(Sha256::new()),
            ChecksumAlgorithm::Sha512 => Hasher::Sha512(Sha512::new()),
        }
    }

    /// Parses a name such as "sha1" or "SHA-256".
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase().replace(['-', '_'], "");
        Self::ALL
            .into_iter()
            .find(|alg| alg.extension() == normalized)
    }

    /// `<file>.<ext>` for `path`.
    pub fn sibling_of(self, path: &Path) -> PathBuf {
        let mut name = path.as_os_str().to_owned();
        name.push(".");
        name.push(self.extension());
        PathBuf::from(name)
    }
}

impl std::fmt::Display for ChecksumAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChecksumAlgorithm::Md5 => f.write_str("MD5"),
            ChecksumAlgorithm::Sha1 => f.write_str("SHA-1"),
            ChecksumAlgorithm::Sha256 => f.write_str("SHA-256"),
            ChecksumAlgorithm::Sha512 => f.write_str("SHA-512"),
        }
    }
}

/// Incremental state for one algorithm.
enum Hasher {
    Md5(md5::Context),
    Sha1(Sha1),
    Sha256(Sha256),
    Sha512(Sha512),
}

impl Hasher {
    fn update(&mut self, chunk: &[u8]) {
        match self {
            Hasher::Md5(ctx) => ctx.consume(chunk),
            Hasher::Sha1(h) => h.update(chunk),
            Hasher::Sha256(h) => h.update(chunk),
            Hasher::Sha512(h) => h.update(chunk),
        }
    }

    fn finalize(self) -> String {
        match self {
            Hasher::Md5(ctx) => format!("{:x}", ctx.finalize()),
            Hasher::Sha1(h) => hex::encode(h.finalize()),
            Hasher::Sha256(h) => hex::encode(h.finalize()),
            Hasher::Sha512(h) => hex::encode(h.finalize()),
        }
    }
}

/// Hashes a file with every algorithm in a single pass.
///
/// The file is read in 8KB chunks, so memory use does not grow with the
/// artifact size.
///
/// # Arguments
///
/// * `path` - File to hash
/// * `algorithms` - Algorithms to compute, in output order
///
/// # Returns
///
/// * `Ok(Vec<String>)` - Lowercase hex digests, one per algorithm
/// * `Err` - If the file cannot be opened or read
pub async fn digest_file(path: &Path, algorithms: &[ChecksumAlgorithm]) -> Result<Vec<String>> {
    let mut file = tokio::fs::File::open(path)
        .await
        .fs_context("opening file for checksum", path)?;
    let mut hashers: Vec<Hasher> = algorithms.iter().map(|alg| alg.hasher()).collect();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for checksum", path)?;
        if n == 0 {
            break;
        }
        for hasher in &mut hashers {
            hasher.update(&buffer[..n]);
        }
    }

    Ok(hashers.into_iter().map(Hasher::finalize).collect())
}

/// One written checksum file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChecksumRecord {
    /// File that was hashed.
    pub artifact: PathBuf,
    /// Checksum file written.
    pub path: PathBuf,
    /// Algorithm used.
    pub algorithm: ChecksumAlgorithm,
    /// Hex digest (all zeros for a placeholder).
    pub digest: String,
    /// Real digest or zero-filled stand-in.
    pub origin: Origin,
}

/// Returns true when `path` is itself a checksum output.
///
/// Matches every supported extension, not only the configured ones, so a
/// checksum is never hashed again regardless of the current configuration.
pub fn is_checksum_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ChecksumAlgorithm::parse(ext).is_some_and(|a| a.extension() == ext))
}

/// Writes one checksum sibling per algorithm for `path`.
///
/// Never fails: an unreadable file gets zero digests and a warning, a sibling
/// that cannot be written is logged. Checksum files are skipped entirely and
/// yield no records.
///
/// When `content` is [`Origin::Placeholder`] the file is not hashed at all;
/// its siblings get zero digests so a placeholder never carries a checksum
/// that looks legitimate.
///
/// # Arguments
///
/// * `path` - Staged file to checksum
/// * `algorithms` - One sibling is written per algorithm
/// * `content` - Origin of the file's content
///
/// # Returns
///
/// One [`ChecksumRecord`] per algorithm, or none for a checksum file.
pub async fn write_checksums(
    path: &Path,
    algorithms: &[ChecksumAlgorithm],
    content: Origin,
) -> Vec<ChecksumRecord> {
    if is_checksum_file(path) {
        log::debug!("Skipping checksum of checksum file {}", path.display());
        return Vec::new();
    }

    let digests = match content {
        Origin::Placeholder => None,
        Origin::Real => match digest_file(path, algorithms).await {
            Ok(digests) => Some(digests),
            Err(e) => {
                log::warn!("{e}. Writing zero-filled checksums.");
                None
            }
        },
    };

    let mut records = Vec::with_capacity(algorithms.len());
    for (index, &algorithm) in algorithms.iter().enumerate() {
        let (digest, origin) = match &digests {
            Some(digests) => (digests[index].clone(), Origin::Real),
            None => (algorithm.zero_digest(), Origin::Placeholder),
        };

        let sibling = algorithm.sibling_of(path);
        if let Err(e) = write_digest(&sibling, &digest).await {
            log::warn!("{e}");
        }

        let file_name = sibling
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match origin {
            Origin::Real => log::info!("  ✓ {file_name} ({algorithm}: {digest})"),
            Origin::Placeholder => log::warn!("  {file_name} is a zero-filled placeholder"),
        }

        records.push(ChecksumRecord {
            artifact: path.to_path_buf(),
            path: sibling,
            algorithm,
            digest,
            origin,
        });
    }

    records
}

async fn write_digest(path: &Path, digest: &str) -> Result<()> {
    tokio::fs::write(path, digest.as_bytes())
        .await
        .fs_context("writing checksum", path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digests_of_empty_input() {
        assert_eq!(
            ChecksumAlgorithm::Md5.digest(b""),
            "d41d8cd98f00b204e9800998ecf8427e"
        );
        assert_eq!(
            ChecksumAlgorithm::Sha1.digest(b""),
            "da39a3ee5e6b4b0d3255bfef95601890afd80709"
        );
        assert_eq!(
            ChecksumAlgorithm::Sha256.digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn zero_digests_match_algorithm_width() {
        assert_eq!(ChecksumAlgorithm::Md5.zero_digest().len(), 32);
        assert_eq!(ChecksumAlgorithm::Sha1.zero_digest().len(), 40);
        for alg in ChecksumAlgorithm::ALL {
            assert_eq!(alg.digest(b"x").len(), alg.hex_len());
            assert!(alg.zero_digest().chars().all(|c| c == '0'));
        }
    }

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!(ChecksumAlgorithm::parse("SHA-1"), Some(ChecksumAlgorithm::Sha1));
        assert_eq!(ChecksumAlgorithm::parse("sha_256"), Some(ChecksumAlgorithm::Sha256));
        assert_eq!(ChecksumAlgorithm::parse("md5"), Some(ChecksumAlgorithm::Md5));
        assert_eq!(ChecksumAlgorithm::parse("crc32"), None);
    }

    #[test]
    fn checksum_files_are_recognized() {
        assert!(is_checksum_file(Path::new("lib-1.0.jar.md5")));
        assert!(is_checksum_file(Path::new("lib-1.0.jar.asc.sha1")));
        assert!(is_checksum_file(Path::new("lib-1.0.pom.sha512")));
        assert!(!is_checksum_file(Path::new("lib-1.0.jar")));
        assert!(!is_checksum_file(Path::new("lib-1.0.jar.asc")));
        assert!(!is_checksum_file(Path::new("lib-1.0.SHA1")));
    }

    #[tokio::test]
    async fn writes_bare_hex_digests() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib-1.0.jar");
        tokio::fs::write(&file, b"hello").await.unwrap();

        let records = write_checksums(&file, &ChecksumAlgorithm::DEFAULT, Origin::Real).await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.origin == Origin::Real));

        let md5 = std::fs::read(dir.path().join("lib-1.0.jar.md5")).unwrap();
        assert_eq!(md5, b"5d41402abc4b2a76b9719d911017c592");
        let sha1 = std::fs::read(dir.path().join("lib-1.0.jar.sha1")).unwrap();
        assert_eq!(sha1, b"aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d");
    }

    #[tokio::test]
    async fn unreadable_file_gets_zero_digests() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.aar");

        let records = write_checksums(&missing, &ChecksumAlgorithm::DEFAULT, Origin::Real).await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.origin == Origin::Placeholder));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("missing.aar.md5")).unwrap(),
            "0".repeat(32)
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join("missing.aar.sha1")).unwrap(),
            "0".repeat(40)
        );
    }

    #[tokio::test]
    async fn placeholder_content_is_not_hashed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib-1.0.aar");
        tokio::fs::write(&file, b"").await.unwrap();

        let records = write_checksums(&file, &ChecksumAlgorithm::DEFAULT, Origin::Placeholder).await;
        assert!(records.iter().all(|r| r.origin == Origin::Placeholder));
        assert_eq!(
            std::fs::read_to_string(dir.path().join("lib-1.0.aar.md5")).unwrap(),
            "0".repeat(32)
        );
    }

    #[tokio::test]
    async fn streamed_digests_match_in_memory_digests() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.aar");
        // Spans several read chunks and ends mid-chunk.
        let bytes: Vec<u8> = (0..(CHUNK_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
        tokio::fs::write(&file, &bytes).await.unwrap();

        let digests = digest_file(&file, &ChecksumAlgorithm::ALL).await.unwrap();
        for (alg, digest) in ChecksumAlgorithm::ALL.into_iter().zip(&digests) {
            assert_eq!(digest, &alg.digest(&bytes), "{alg}");
        }
    }

    #[tokio::test]
    async fn checksum_files_are_not_hashed_again() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("lib.jar.md5");
        tokio::fs::write(&file, b"abc").await.unwrap();

        assert!(write_checksums(&file, &ChecksumAlgorithm::DEFAULT, Origin::Real).await.is_empty());
        assert!(!dir.path().join("lib.jar.md5.md5").exists());
    }
}
