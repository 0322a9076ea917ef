// Shared prompt fragments.
// Each feature that calls the LLM keeps its own prompts.rs alongside it;
// this file holds the cross-cutting pieces.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// System prompt fragment that enforces plain resume text output.
pub const PLAIN_TEXT_SYSTEM: &str = "Respond with the rewritten resume text only. \
    Do NOT add headings, commentary, quotation marks, or markdown formatting. \
    Do NOT invent employers, dates, degrees, or metrics that are not in the input.";
