// Prompt templates for assessment generation.

use crate::llm_client::prompts::{ICT_EXPERT_PERSONA, JSON_ONLY_INSTRUCTION};
use crate::models::Occupation;

/// Builds the question-generation prompt for one occupation.
pub fn question_prompt(occupation: &Occupation, count: usize) -> String {
    format!(
        r#"{persona}

Buat TEPAT {count} soal pilihan ganda untuk:

**Okupasi:** {name}
**Unit Kompetensi:** {unit}
**Keterampilan:** {keywords}

**Kriteria:**
1. Relevan dengan kompetensi
2. Tingkat: Menengah-Ahli
3. Skenario praktis
4. TEPAT 4 opsi per soal
5. 1 jawaban benar
6. Bahasa Indonesia
7. HINDARI karakter khusus

**Format JSON:**
{{
  "questions": [
    {{
      "id": "q1",
      "teks": "Pertanyaan...",
      "opsi": ["Opsi A", "Opsi B", "Opsi C", "Opsi D"],
      "jawaban_benar": "Opsi A"
    }}
  ]
}}

ATURAN:
- {count} soal (q1-q{count})
- Pisahkan dengan koma
- jawaban_benar = salah satu opsi, SAMA PERSIS
- Output HANYA JSON

{json_only}"#,
        persona = ICT_EXPERT_PERSONA,
        count = count,
        name = occupation.name,
        unit = occupation.competency_unit,
        keywords = occupation.keywords,
        json_only = JSON_ONLY_INSTRUCTION,
    )
}
