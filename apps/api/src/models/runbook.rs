use serde::{Deserialize, Serialize};

/// The name of a file known to exist in an upload store.
/// Only the name is modeled; duplicate names overwrite on save.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadedFileRef(pub String);

impl UploadedFileRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Plain text of the fixed reference document, pages concatenated in order.
/// Loaded once at startup and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceText(String);

impl ReferenceText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Which prompt template produced a `PromptText`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptVariant {
    Ranged,
    Weekdays,
    Weekend,
    General,
}

impl PromptVariant {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptVariant::Ranged => "ranged",
            PromptVariant::Weekdays => "weekdays",
            PromptVariant::Weekend => "weekend",
            PromptVariant::General => "general",
        }
    }
}

/// The exact text handed to the inference call. Built fresh on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptText {
    pub variant: PromptVariant,
    pub text: String,
}

impl PromptText {
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Text returned by a successful inference call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionText(pub String);

impl CompletionText {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
