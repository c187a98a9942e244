// Personality/career analysis: prompt, Gemini call, section parsing, storage.
// Model calls go through llm_client only.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod parser;
pub mod prompts;
