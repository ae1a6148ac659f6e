// Prompt templates for runbook generation.
// One shared skeleton; each timeframe variant fills its structural slots from a VariantConfig.

use crate::models::runbook::PromptVariant;
use crate::runbook::timeframe::TimeframeMode;

/// Runbook prompt skeleton.
/// Structural slots (filled from `VariantConfig`): {task_line}, {tailoring}, {sections},
/// {schedule_directive}, {example_output}.
/// Value slots (filled from request data): {uploads}, {reference}, and for the ranged
/// variant {start_date}, {end_date}.
pub const RUNBOOK_PROMPT_SKELETON: &str = r#"{task_line}

User Inputs:
{uploads}

System Input(from PDF):
{reference}

Instructions:
- Create a detailed runbook tailored to the user's pets{tailoring}.
- Include sections for {sections}.
- Adapt the runbook based on the number and types of pets provided.

Output Format:
- Use a clear structure with headings for each pet.
- {schedule_directive}

Example User Input:
- Pet 1:
  - Name: Fluffy
  - Type: Cat
  - ...

Example System Input:
[System input content]

Example Output:
[{example_output}]
"#;

/// Sections requested for variants that cover whole days.
pub const FULL_SECTIONS: &[&str] = &[
    "basic information",
    "health",
    "feeding",
    "grooming",
    "daily routine",
    "emergency contacts",
];

/// Sections requested for weekday/weekend variants.
pub const PARTIAL_WEEK_SECTIONS: &[&str] = &[
    "basic information",
    "health",
    "feeding",
    "grooming",
    "emergency contacts",
];

/// Per-variant wording. Everything here is static text; request data is
/// substituted afterwards and never re-scanned for slots.
///
/// `task_line` carries a `{label}` slot that is filled with `mode.label()`, so the line
/// names its own timeframe mode.
#[derive(Debug, Clone, Copy)]
pub struct VariantConfig {
    pub variant: PromptVariant,
    pub mode: TimeframeMode,
    pub task_line: &'static str,
    pub tailoring: &'static str,
    pub sections: &'static [&'static str],
    pub schedule_directive: &'static str,
    pub example_output: &'static str,
}

pub const RANGED: VariantConfig = VariantConfig {
    variant: PromptVariant::Ranged,
    mode: TimeframeMode::DateRange,
    task_line: "Generate a comprehensive pet sitting runbook for the selected {label}: \
        {start_date} to {end_date}.",
    tailoring: " for the specified dates",
    sections: FULL_SECTIONS,
    schedule_directive: "Provide a schedule, feeding instructions, and individual care routines \
        for the selected dates.",
    example_output: "Provide an example runbook section for the selected dates here",
};

pub const WEEKDAYS: VariantConfig = VariantConfig {
    variant: PromptVariant::Weekdays,
    mode: TimeframeMode::WeekdaysOnly,
    task_line: "Generate a comprehensive pet sitting runbook for {label} only.",
    tailoring: " for weekdays",
    sections: PARTIAL_WEEK_SECTIONS,
    schedule_directive: "Provide a weekly schedule, feeding instructions, and individual care \
        routines for weekdays.",
    example_output: "Provide an example runbook section for weekdays here",
};

pub const WEEKEND: VariantConfig = VariantConfig {
    variant: PromptVariant::Weekend,
    mode: TimeframeMode::WeekendOnly,
    task_line: "Generate a comprehensive pet sitting runbook for the {label} only.",
    tailoring: " for the weekend",
    sections: PARTIAL_WEEK_SECTIONS,
    schedule_directive: "Provide a schedule for the weekend, focusing on pet care tasks.",
    example_output: "Provide an example runbook section for the weekend here",
};

pub const GENERAL: VariantConfig = VariantConfig {
    variant: PromptVariant::General,
    mode: TimeframeMode::Default,
    task_line: "Generate a comprehensive {label} pet sitting runbook based on the following \
        user and system inputs:",
    tailoring: "",
    sections: FULL_SECTIONS,
    schedule_directive: "Provide a weekly schedule, feeding instructions, and individual care \
        routines.",
    example_output: "Provide an example runbook section here",
};
