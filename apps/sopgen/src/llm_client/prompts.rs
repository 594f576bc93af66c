// Cross-cutting prompt fragments shared by every structured-output call.
// Stage-specific templates live in pipeline::prompts.

/// Appended to any directive whose reply is parsed as JSON.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    You MUST respond with a single minified JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";
