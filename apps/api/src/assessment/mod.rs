// Competency assessment: LLM question generation, JSON repair and scoring.
// Questions are generated once per session and reused until the profile is
// re-mapped to another occupation.

pub mod generator;
pub mod handlers;
pub mod models;
pub mod prompts;
pub mod scoring;
