// Job/training recommendations and the career assistant chat.
// Recommendations unlock once the talent has finished an assessment.

pub mod chat;
pub mod engine;
pub mod handlers;
pub mod prompts;
