use std::path::Path;

use anyhow::{anyhow, Context, Result};
use tracing::info;

use crate::models::runbook::ReferenceText;

/// Loads the fixed reference document as plain text.
///
/// Pages are extracted one by one and concatenated in ascending page order with no
/// separator. A missing or unreadable file is an error the caller treats as fatal.
pub async fn load_reference_text(path: &Path) -> Result<ReferenceText> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Reference document not readable: {}", path.display()))?;

    let display = path.display().to_string();
    let pages = tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text_from_mem_by_pages(&bytes)
            .map_err(|e| anyhow!("Failed to extract text from {display}: {e}"))
    })
    .await
    .map_err(|e| anyhow!("spawn_blocking failed during reference extraction: {e}"))??;

    let text = concat_pages(&pages);
    info!(
        "Reference document loaded: {} ({} pages, {} chars)",
        path.display(),
        pages.len(),
        text.chars().count()
    );

    Ok(ReferenceText::new(text))
}

fn concat_pages(pages: &[String]) -> String {
    pages.concat()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_pages_keeps_order_without_separator() {
        let pages = vec!["Page one.".to_string(), "Page two.".to_string()];
        assert_eq!(concat_pages(&pages), "Page one.Page two.");
    }

    #[test]
    fn test_concat_pages_empty_document() {
        assert_eq!(concat_pages(&[]), "");
    }

    #[tokio::test]
    async fn test_missing_reference_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_reference_text(&dir.path().join("missing.pdf"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.pdf"), "Error was {err}");
    }

    #[tokio::test]
    async fn test_non_pdf_reference_document_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        assert!(load_reference_text(&path).await.is_err());
    }
}
