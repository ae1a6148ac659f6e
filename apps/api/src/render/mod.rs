// Output Renderer: completion text -> downloadable artifact.
// The text is treated as an opaque block; headings are not parsed.

pub mod metrics;
pub mod pdf;

use anyhow::anyhow;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::runbook::CompletionText;

pub const PDF_FILE_NAME: &str = "runbook.pdf";
pub const TEXT_FILE_NAME: &str = "runbook.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    #[default]
    Pdf,
    Text,
}

#[derive(Debug, Clone)]
pub struct DownloadableArtifact {
    pub file_name: &'static str,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

pub async fn render(
    text: &CompletionText,
    format: OutputFormat,
) -> Result<DownloadableArtifact, AppError> {
    match format {
        OutputFormat::Text => Ok(DownloadableArtifact {
            file_name: TEXT_FILE_NAME,
            content_type: "text/plain; charset=utf-8",
            bytes: text.as_str().as_bytes().to_vec(),
        }),
        OutputFormat::Pdf => {
            let owned = text.as_str().to_string();
            // Layout and serialization are CPU-bound.
            let bytes = tokio::task::spawn_blocking(move || pdf::render_pdf(&owned))
                .await
                .map_err(|e| AppError::Internal(anyhow!("spawn_blocking failed in PDF render: {e}")))?
                .map_err(AppError::Internal)?;
            Ok(DownloadableArtifact {
                file_name: PDF_FILE_NAME,
                content_type: "application/pdf",
                bytes,
            })
        }
    }
}
