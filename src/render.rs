//! Terminal rendering of results, failures, and the fixed safety blocks.

use crate::consts::{EMERGENCY_NUMBER, EMERGENCY_REGION, GENERIC_FAILURE_MESSAGE, NEAREST_ER_URL};
use crate::health::HealthInformationResult;
use crate::session::Failure;

/// One visible block of a result, in display order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Section<'a> {
    Summary(&'a str),
    /// Numbered so they can be picked with `/ask N`.
    ClarifyingQuestions(&'a [String]),
    RedFlags(&'a [String]),
    HomeCare(&'a [String]),
    GeneralInformation(&'a [String]),
    DoctorQuestions(&'a [String]),
}

/// Which blocks to show. Clarifying questions only for vague replies that
/// carry some; red flags only when there are any; the rest always.
pub fn sections(result: &HealthInformationResult) -> Vec<Section<'_>> {
    let mut out = vec![Section::Summary(&result.summary)];

    let questions = result.clarifying_questions();
    if !questions.is_empty() {
        out.push(Section::ClarifyingQuestions(questions));
    }
    if result.has_red_flags() {
        out.push(Section::RedFlags(&result.red_flags));
    }
    out.push(Section::HomeCare(&result.home_care_suggestions));
    out.push(Section::GeneralInformation(&result.general_information));
    out.push(Section::DoctorQuestions(&result.suggested_questions_for_doctor));
    out
}

fn push_list(out: &mut String, heading: &str, marker: &str, items: &[String]) {
    out.push_str(&format!("\n  {heading}\n"));
    for item in items {
        out.push_str(&format!("    {marker} {item}\n"));
    }
}

pub fn render_section(section: &Section<'_>) -> String {
    let mut out = String::new();
    match section {
        Section::Summary(summary) => {
            out.push_str(&format!("\n  {summary}\n"));
        }
        Section::ClarifyingQuestions(questions) => {
            out.push_str("\n  Help me help you, bestie:\n");
            for (i, q) in questions.iter().enumerate() {
                out.push_str(&format!("    [{}] {}\n", i + 1, q));
            }
            out.push_str("    (use /ask N to add a question to your description)\n");
        }
        Section::RedFlags(flags) => {
            push_list(&mut out, "⚠ Real Talk: Watch for these!", "!", flags);
        }
        Section::HomeCare(items) => {
            push_list(&mut out, "Vibes for Recovery at Home", "✓", items);
        }
        Section::GeneralInformation(items) => {
            push_list(&mut out, "The lowdown on what's happening", "•", items);
        }
        Section::DoctorQuestions(questions) => {
            out.push_str("\n  Check-in with a real Doctor\n");
            out.push_str("    Seriously, go see someone. Ask them these:\n");
            for q in questions.iter() {
                out.push_str(&format!("    \"{q}\"\n"));
            }
        }
    }
    out
}

pub fn render_result(result: &HealthInformationResult) -> String {
    sections(result).iter().map(render_section).collect()
}

/// The generic message, plus a short hint at what kind of failure it was.
pub fn render_failure(failure: &Failure) -> String {
    format!("  ✗ {GENERIC_FAILURE_MESSAGE} ({})\n", failure.kind)
}

/// The always-present emergency strip.
pub fn emergency_strip() -> String {
    format!(
        "  MEDICAL EMERGENCY?  Call {EMERGENCY_NUMBER} ({EMERGENCY_REGION})  ·  Find Nearest ER: {NEAREST_ER_URL}\n"
    )
}

pub fn disclaimer() -> String {
    [
        "  Medical & Mental Health Disclaimer",
        "  This assistant is for informational purposes only. This is non-diagnostic and I am not a medical professional.",
        "  I am not a mental health assistant. This tool is not designed to provide support for psychological crises,",
        "  mental health conditions, or emotional distress.",
        "  Information provided should not be considered medical advice or a substitute for professional clinical judgment.",
    ]
    .join("\n")
        + &format!(
            "\n  If you are experiencing a medical or mental health emergency, call {EMERGENCY_NUMBER} or a crisis hotline immediately.\n"
        )
}
