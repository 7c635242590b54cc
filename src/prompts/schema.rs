//! Declared response schema, in the Gemini `responseSchema` dialect.

use serde_json::{Value, json};

/// Fields the model must always fill in. `homeCareSuggestions` and
/// `questionsToUser` are optional and default to empty on our side.
pub const REQUIRED_FIELDS: &[&str] = &[
    "summary",
    "isVague",
    "generalInformation",
    "suggestedQuestionsForDoctor",
    "redFlags",
];

fn string_array(description: &str) -> Value {
    json!({
        "type": "ARRAY",
        "items": { "type": "STRING" },
        "description": description,
    })
}

/// The JSON object shape a reply must conform to.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "summary": {
                "type": "STRING",
                "description": "The formatted educational summary from Njoki, including mandatory disclaimers.",
            },
            "isVague": {
                "type": "BOOLEAN",
                "description": "True if the Intake Collector needs more details.",
            },
            "questionsToUser": string_array("Exactly 3 follow-up questions from the Intake agent in slang, present when isVague is true."),
            "generalInformation": string_array("Educational insights derived by the Symptom Analyst and Evidence Gatherer."),
            "homeCareSuggestions": string_array("Care and comfort tips from the Formatter."),
            "suggestedQuestionsForDoctor": string_array("Strategic questions planned by the Follow-up Planner."),
            "redFlags": string_array("Critical safety warnings from the Risk & Safety Checker. Empty when none apply."),
        },
        "required": REQUIRED_FIELDS,
    })
}
