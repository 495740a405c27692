// Cross-cutting prompt fragments used by the invoker.
// Stage-specific templates live in agents/prompts.rs.

/// System message sent with every chat request.
pub const SYSTEM_INSTRUCTION: &str = "Follow the user's instructions precisely. \
    If asked to return JSON, return ONLY valid JSON with no extra text and no markdown code fences.";

/// Phrases that mark a prompt as expecting a JSON reply. Matched case-insensitively.
pub const JSON_CONTRACT_MARKERS: &[&str] = &[
    "return only valid json",
    "return only json",
    "exact schema",
    "\"skill_vector\"",
    "\"required_skills\"",
    "\"nice_to_have_skills\"",
    "\"gap_report\"",
    "\"rewritten_bullets\"",
    "\"missing_keywords\"",
    "\"interview_questions\"",
];

/// Appended to the error when every recovery step came back empty.
pub const EMPTY_RESPONSE_GUIDANCE: &str = "Try increasing GROQ_MAX_TOKENS, switching GROQ_MODEL_ID, \
    or shortening the resume/job description text.";
