//! Flattens a tabular upload into plain text, one row per line.
//!
//! Rows become `"<question> <answer>"`. When the `Question`/`Answer` header pair is
//! missing, the first two columns are used positionally. Missing cells are empty strings.

use csv::ReaderBuilder;

use crate::errors::AppError;

const QUESTION_COLUMN: &str = "Question";
const ANSWER_COLUMN: &str = "Answer";

pub fn process_csv(bytes: &[u8]) -> Result<String, AppError> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| AppError::UnprocessableEntity(format!("Unreadable CSV header: {e}")))?
        .clone();

    let (question_idx, answer_idx) = match (
        headers.iter().position(|h| h.trim() == QUESTION_COLUMN),
        headers.iter().position(|h| h.trim() == ANSWER_COLUMN),
    ) {
        (Some(q), Some(a)) => (q, a),
        _ if headers.len() >= 2 => {
            tracing::debug!(
                "CSV lacks {QUESTION_COLUMN}/{ANSWER_COLUMN} columns; using first two columns"
            );
            (0, 1)
        }
        _ => {
            return Err(AppError::Validation(format!(
                "CSV needs at least two columns, found {}",
                headers.len()
            )))
        }
    };

    let mut lines = Vec::new();
    for record in reader.records() {
        let record = record
            .map_err(|e| AppError::UnprocessableEntity(format!("Unreadable CSV row: {e}")))?;
        let question = record.get(question_idx).unwrap_or_default();
        let answer = record.get(answer_idx).unwrap_or_default();
        lines.push(format!("{question} {answer}"));
    }

    Ok(lines.join("\n"))
}
