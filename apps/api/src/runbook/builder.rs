//! Turns uploads, reference text and a timeframe into the exact prompt text.
//!
//! Pure and deterministic: no I/O, no ambient state. Every call receives a freshly
//! resolved `TimeframeSelection`, so nothing from an earlier request can leak in.
//!
//! # Assembly
//! 1. Pick a `VariantConfig` by the timeframe tag (exactly one).
//! 2. Fill the skeleton's structural slots with the variant's static text.
//! 3. Substitute request values in a single pass. Inserted values are never re-scanned,
//!    so a reference document or file name containing `{...}` is copied through verbatim.

use crate::models::runbook::{PromptText, ReferenceText, UploadedFileRef};
use crate::runbook::prompts::{
    VariantConfig, GENERAL, RANGED, RUNBOOK_PROMPT_SKELETON, WEEKDAYS, WEEKEND,
};
use crate::runbook::timeframe::{TimeframeMode, TimeframeSelection};

/// Builds the prompt for one generation request.
///
/// Total over well-formed input: an empty upload list or empty reference text yields a
/// prompt with an empty section, not an error. The result is returned untrimmed.
pub fn build_prompt(
    uploads: &[UploadedFileRef],
    reference: &ReferenceText,
    timeframe: &TimeframeSelection,
) -> PromptText {
    let config = select_variant(timeframe);
    let template = compose_template(&config);

    let listing = format_upload_listing(uploads);
    let mut values: Vec<(&str, String)> = vec![
        ("uploads", listing),
        ("reference", reference.as_str().to_string()),
    ];
    if let TimeframeSelection::DateRange { start, end } = timeframe {
        values.push(("start_date", start.format("%Y-%m-%d").to_string()));
        values.push(("end_date", end.format("%Y-%m-%d").to_string()));
    }

    PromptText {
        variant: config.variant,
        text: render_template(&template, &values),
    }
}

/// Maps a timeframe tag to its template variant.
pub fn select_variant(timeframe: &TimeframeSelection) -> VariantConfig {
    match timeframe.mode() {
        TimeframeMode::DateRange => RANGED,
        TimeframeMode::WeekdaysOnly => WEEKDAYS,
        TimeframeMode::WeekendOnly => WEEKEND,
        TimeframeMode::Default => GENERAL,
    }
}

/// Fills the skeleton's structural slots. Value slots are left in place for `render_template`.
fn compose_template(config: &VariantConfig) -> String {
    let sections = join_sections(config.sections);
    let task_line = render_template(
        config.task_line,
        &[("label", config.mode.label().to_string())],
    );
    render_template(
        RUNBOOK_PROMPT_SKELETON,
        &[
            ("task_line", task_line),
            ("tailoring", config.tailoring.to_string()),
            ("sections", sections),
            ("schedule_directive", config.schedule_directive.to_string()),
            ("example_output", config.example_output.to_string()),
        ],
    )
}

/// One `- name` line per upload, in the order given.
fn format_upload_listing(uploads: &[UploadedFileRef]) -> String {
    uploads
        .iter()
        .map(|u| format!("- {}", u.name()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// "a, b, and c" with the serial comma; "a and b" for two items.
fn join_sections(sections: &[&str]) -> String {
    match sections {
        [] => String::new(),
        [only] => only.to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}

/// Single-pass `{key}` substitution.
///
/// Keys without a value and unterminated braces are copied through unchanged.
pub fn render_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let Some(close) = after_open.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key = &after_open[..close];
        match values.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => {
                out.push_str(value);
                rest = &after_open[close + 1..];
            }
            None => {
                // Not a slot; emit the brace and keep scanning right after it.
                out.push('{');
                rest = after_open;
            }
        }
    }

    out.push_str(rest);
    out
}
