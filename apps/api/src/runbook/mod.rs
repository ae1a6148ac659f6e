// Runbook pipeline: timeframe resolution, prompt assembly, generation handlers.
// All inference goes through llm_client; nothing here talks to a provider directly.

pub mod builder;
pub mod handlers;
pub mod prompts;
pub mod timeframe;
