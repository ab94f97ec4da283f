// Shared prompt fragments. Each service that needs LLM calls keeps its own
// prompts.rs alongside it; this file holds the cross-cutting pieces.

/// Appended to every prompt that expects structured output.
pub const JSON_ONLY_INSTRUCTION: &str = "\
PENTING: Respons HARUS JSON valid.
Jangan gunakan markdown code fence.
Jangan tambahkan teks apa pun di luar objek JSON.";

/// Persona for structured-output prompts.
pub const ICT_EXPERT_PERSONA: &str = "Anda adalah expert TIK Indonesia.";
