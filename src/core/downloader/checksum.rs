use std::path::Path;

use md5::Md5;
use sha1::{Digest, Sha1};
use tokio::io::AsyncReadExt;

use crate::core::catalog::{CandidateFile, HashAlgorithm};
use crate::core::error::{ModError, ModResult};

const READ_CHUNK: usize = 64 * 1024;

async fn hash_with<D: Digest>(path: &Path) -> ModResult<String> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| ModError::io(path, e))?;
    let mut hasher = D::new();
    let mut buf = vec![0u8; READ_CHUNK];
    loop {
        let n = file.read(&mut buf).await.map_err(|e| ModError::io(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Lowercase hex digest of the file at `path`.
pub async fn digest_file(path: &Path, algorithm: HashAlgorithm) -> ModResult<String> {
    match algorithm {
        HashAlgorithm::Sha1 => hash_with::<Sha1>(path).await,
        HashAlgorithm::Md5 => hash_with::<Md5>(path).await,
    }
}

/// Check `path` against the first advertised hash we support.
///
/// Returns the algorithm that was checked, or `None` when the file
/// advertises no supported hash and verification was skipped.
pub async fn verify_file(path: &Path, file: &CandidateFile) -> ModResult<Option<HashAlgorithm>> {
    let Some((algorithm, expected)) = file.verifiable_hash() else {
        return Ok(None);
    };

    let actual = digest_file(path, algorithm).await?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ModError::Integrity {
            path: path.to_path_buf(),
            algorithm: algorithm.name(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(Some(algorithm))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{FileHash, ReleaseType};

    // digests of b"hello world"
    const SHA1: &str = "2aae6c35c94fcfb415dbe95f408b9ce91ee846ed";
    const MD5: &str = "5eb63bbbe01eeed093cb22bb8f5acdc3";

    fn candidate(hashes: Vec<FileHash>) -> CandidateFile {
        CandidateFile {
            id: 1,
            mod_id: None,
            file_name: "a.jar".into(),
            display_name: String::new(),
            file_date: String::new(),
            release_type: ReleaseType::Release,
            is_available: true,
            hashes,
            game_versions: vec![],
        }
    }

    async fn fixture() -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.jar");
        tokio::fs::write(&path, b"hello world").await.unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn digests_match_known_values() {
        let (_dir, path) = fixture().await;
        assert_eq!(digest_file(&path, HashAlgorithm::Sha1).await.unwrap(), SHA1);
        assert_eq!(digest_file(&path, HashAlgorithm::Md5).await.unwrap(), MD5);
    }

    #[tokio::test]
    async fn comparison_ignores_case() {
        let (_dir, path) = fixture().await;
        let file = candidate(vec![FileHash { algo: 1, value: SHA1.to_uppercase() }]);
        assert_eq!(verify_file(&path, &file).await.unwrap(), Some(HashAlgorithm::Sha1));
    }

    #[tokio::test]
    async fn mismatch_is_integrity_error() {
        let (_dir, path) = fixture().await;
        let file = candidate(vec![FileHash { algo: 2, value: "00".repeat(16) }]);
        let err = verify_file(&path, &file).await.unwrap_err();
        assert!(matches!(err, ModError::Integrity { algorithm: "md5", .. }));
    }

    #[tokio::test]
    async fn first_supported_hash_decides() {
        let (_dir, path) = fixture().await;
        // unsupported algo 7 is skipped, md5 matches, the bogus sha1 after it is never checked
        let file = candidate(vec![
            FileHash { algo: 7, value: "x".into() },
            FileHash { algo: 2, value: MD5.into() },
            FileHash { algo: 1, value: "bogus".into() },
        ]);
        assert_eq!(verify_file(&path, &file).await.unwrap(), Some(HashAlgorithm::Md5));
    }

    #[tokio::test]
    async fn no_hash_skips_verification() {
        let (_dir, path) = fixture().await;
        assert_eq!(verify_file(&path, &candidate(vec![])).await.unwrap(), None);
    }
}
