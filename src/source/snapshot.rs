use std::path::Path;

use tokio::io::AsyncReadExt;

use super::client::{SourceError, MAX_RESPONSE_SIZE};
use super::normalize::parse_records;
use crate::catalog::CategoryRecord;

/// Load a category snapshot saved from the API (any accepted envelope shape).
///
/// Files larger than the HTTP response limit are refused before parsing.
pub async fn load_snapshot(path: &Path) -> Result<Vec<CategoryRecord>, SourceError> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    if len > MAX_RESPONSE_SIZE as u64 {
        return Err(SourceError::ResponseTooLarge(MAX_RESPONSE_SIZE));
    }

    // Bounded read guards against files that grow after the metadata check
    let mut bytes = Vec::with_capacity(len as usize);
    let mut limited = file.take(MAX_RESPONSE_SIZE as u64 + 1);
    limited.read_to_end(&mut bytes).await?;
    if bytes.len() > MAX_RESPONSE_SIZE {
        return Err(SourceError::ResponseTooLarge(MAX_RESPONSE_SIZE));
    }

    let body = String::from_utf8(bytes).map_err(|_| SourceError::InvalidUtf8)?;
    let records = parse_records(&body)?;
    tracing::info!(path = %path.display(), count = records.len(), "Loaded category snapshot file");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("category_tree_snapshot_{}_{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_load_snapshot() {
        let path = temp_path("ok.json");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"categories":[{{"id":"1","title":"Shoes"}},{{"id":"2","title":"Boots","parentRef":"Shoes"}}]}}"#
        )
        .unwrap();
        drop(file);

        let records = load_snapshot(&path).await.unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent_title(), Some("Shoes"));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = load_snapshot(&temp_path("missing.json")).await;
        assert!(matches!(result, Err(SourceError::Io(_))));
    }

    #[tokio::test]
    async fn test_oversized_file_rejected() {
        let path = temp_path("big.json");
        std::fs::write(&path, vec![b' '; MAX_RESPONSE_SIZE + 1]).unwrap();

        let result = load_snapshot(&path).await;
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(SourceError::ResponseTooLarge(_))));
    }
}
