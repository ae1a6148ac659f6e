//! Flat-text view of a single upload. No structure is inferred beyond what each
//! format's parser returns.

use anyhow::anyhow;

use crate::errors::AppError;
use crate::uploads::csv::process_csv;
use crate::uploads::extension_of;

pub async fn extract_text(name: &str, bytes: Vec<u8>) -> Result<String, AppError> {
    match extension_of(name).as_deref() {
        Some("csv") => process_csv(&bytes),
        Some("txt") | Some("md") => Ok(String::from_utf8_lossy(&bytes).into_owned()),
        Some("pdf") => {
            let name = name.to_string();
            tokio::task::spawn_blocking(move || {
                pdf_extract::extract_text_from_mem(&bytes).map_err(|e| {
                    AppError::UnprocessableEntity(format!("Could not read PDF {name}: {e}"))
                })
            })
            .await
            .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in PDF extraction: {e}")))?
        }
        Some("docx") => Err(AppError::UnprocessableEntity(format!(
            "Text preview is not available for {name}"
        ))),
        _ => Err(AppError::Validation(format!("Unsupported file type for {name}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_text_and_markdown_pass_through() {
        let text = extract_text("notes.MD", b"# Rex\nWalk daily".to_vec()).await.unwrap();
        assert_eq!(text, "# Rex\nWalk daily");
    }

    #[tokio::test]
    async fn test_csv_is_flattened() {
        let text = extract_text("qa.csv", b"Question,Answer\nFood?,Kibble\n".to_vec())
            .await
            .unwrap();
        assert_eq!(text, "Food? Kibble");
    }

    #[tokio::test]
    async fn test_docx_is_unprocessable() {
        let err = extract_text("care.docx", Vec::new()).await.unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }

    #[tokio::test]
    async fn test_broken_pdf_is_unprocessable() {
        let err = extract_text("card.pdf", b"garbage".to_vec()).await.unwrap_err();
        assert!(matches!(err, AppError::UnprocessableEntity(_)));
    }
}
