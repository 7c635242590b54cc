//! The fixed policy document sent as the system instruction.

/// Sentence the model must place in every summary.
pub const DISCLAIMER: &str = "Just so we're clear, this is non-diagnostic and I'm not a medical pro. I am also not a mental health assistant.";

/// Phrase used to recognise the disclaimer in a reply.
pub const DISCLAIMER_MARKER: &str = "non-diagnostic";

/// Clarifying questions asked when the input is vague.
pub const CLARIFYING_QUESTION_COUNT: usize = 3;

const ROLE: &str = "SYSTEM ROLE: MASTER ORCHESTRATOR (Njoki Persona)";
const PERSONA: &str = "You are the orchestrator of a multi-agent healthcare advisory system, but you present yourself as \"Njoki,\" a wise, chill, and deeply caring urban bestie. You use casual slang, modern urban expressions, and a friendly vibe (e.g., \"Hey bestie,\" \"Pole sana,\" \"I'm vibes-checking your symptoms\").";
const WORKFLOW_HEADER: &str = "INTERNAL WORKFLOW (Process this sequentially for every request):";
const WORKFLOW: &[&str] = &[
    "Intake Collector: Check if the user shared enough context (timeline, severity). If not, flag as 'isVague' and ask exactly 3 follow-up questions in 'questionsToUser'.",
    "Symptom Analyst: Review patterns for potential (non-diagnostic) causes.",
    "Evidence Gatherer: Align findings with reliable medical patterns and educational data.",
    "Risk & Safety Checker: Scan for RED FLAGS (breathing, chest pain, neuro issues, etc.). Leave 'redFlags' empty when none apply.",
    "Recommendation Formatter: Translate everything into Njoki's caring slang.",
    "Follow-up Planner: Decide what the user should ask a doctor and what Njoki needs to know next.",
];
const RULES_HEADER: &str = "CRITICAL RULES:";
const NO_DIAGNOSIS: &str = "NO DIAGNOSIS: Use terms like \"The vibes suggest...\" or \"Usually, this pattern is linked to...\"";
const URGENCY: &str = "URGENCY: If red flags appear, drop the chill vibe slightly to ensure the user knows it's serious.";
const FORMAT: &str = "Format your response as a structured JSON object.";

fn disclaimer_rule() -> String {
    format!("DISCLAIMER: Always include \"{DISCLAIMER}\" in the summary.")
}

fn crisis_rule(emergency_number: &str) -> String {
    format!(
        "CRISIS: If self-harm/crisis is mentioned, stop slang, provide {emergency_number}/emergency info immediately."
    )
}

/// Build the system instruction. The emergency number is the only variable part.
pub fn build_policy(emergency_number: &str) -> String {
    let workflow = WORKFLOW
        .iter()
        .enumerate()
        .map(|(i, step)| format!("{}. {}", i + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    let rules = [
        disclaimer_rule(),
        NO_DIAGNOSIS.to_string(),
        URGENCY.to_string(),
        crisis_rule(emergency_number),
    ]
    .iter()
    .map(|rule| format!("- {rule}"))
    .collect::<Vec<_>>()
    .join("\n");

    format!(
        "{ROLE}\n\n{PERSONA}\n\n{WORKFLOW_HEADER}\n{workflow}\n\n{RULES_HEADER}\n{rules}\n\n{FORMAT}\n"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_carries_disclaimer() {
        let policy = build_policy("119");
        assert!(policy.contains(DISCLAIMER));
        assert!(DISCLAIMER.contains(DISCLAIMER_MARKER));
    }

    #[test]
    fn policy_lists_every_workflow_step_in_order() {
        let policy = build_policy("119");
        let mut last = 0;
        for (i, step) in WORKFLOW.iter().enumerate() {
            let line = format!("{}. {}", i + 1, step);
            let pos = policy.find(&line).expect("workflow step missing");
            assert!(pos >= last);
            last = pos;
        }
    }

    #[test]
    fn policy_fixes_question_count() {
        let policy = build_policy("119");
        assert!(policy.contains(&format!("exactly {CLARIFYING_QUESTION_COUNT}")));
    }

    #[test]
    fn policy_names_emergency_number() {
        assert!(build_policy("999").contains("provide 999/emergency info"));
    }

    #[test]
    fn policy_has_no_diagnosis_and_urgency_rules() {
        let policy = build_policy("119");
        assert!(policy.contains("NO DIAGNOSIS"));
        assert!(policy.contains("URGENCY"));
        assert!(policy.contains("CRISIS"));
    }

    #[test]
    fn policy_has_no_markdown_fences() {
        assert!(!build_policy("119").contains("```"));
    }
}
