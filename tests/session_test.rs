use std::sync::Arc;
use std::time::Duration;

use njoki::advisor::mock::{MockAdvisor, Scripted};
use njoki::error::{AnalysisError, FailureKind};
use njoki::health::HealthInformationResult;
use njoki::prompts::policy::{CLARIFYING_QUESTION_COUNT, DISCLAIMER, DISCLAIMER_MARKER};
use njoki::render::{Section, sections};
use njoki::retry::RetryPolicy;
use njoki::session::{Outcome, Rejection, Session, SessionConfig};

fn clear_result() -> HealthInformationResult {
    HealthInformationResult {
        summary: format!("Pole sana bestie. {DISCLAIMER}"),
        is_vague: false,
        questions_to_user: vec![],
        general_information: vec!["Tension headaches are common.".to_string()],
        home_care_suggestions: vec!["Drink water.".to_string()],
        suggested_questions_for_doctor: vec!["Could this be stress?".to_string()],
        red_flags: vec![],
    }
}

fn session_with(advisor: &Arc<MockAdvisor>) -> Session {
    Session::new(advisor.clone(), SessionConfig::default())
}

async fn wait_for_call(advisor: &MockAdvisor, n: usize) {
    while advisor.calls() < n {
        tokio::task::yield_now().await;
    }
}

// ── Scenarios ─────────────────────────────────────────────────────

#[tokio::test]
async fn chest_pain_reply_escalates_red_flags() {
    let reply = serde_json::json!({
        "summary": format!("Bestie, this is serious. {DISCLAIMER}"),
        "isVague": false,
        "generalInformation": ["Chest pain with breathlessness needs urgent checks."],
        "homeCareSuggestions": [],
        "suggestedQuestionsForDoctor": ["Do I need an ECG?"],
        "redFlags": ["Chest pain with difficulty breathing", "Call 119 now"]
    });
    let advisor = Arc::new(MockAdvisor::new(vec![Scripted::Text(Some(reply.to_string()))]));
    let session = session_with(&advisor);

    session.edit("my chest hurts and I can't breathe well").await;
    let Outcome::Completed(result) = session.submit().await else {
        panic!("expected a result");
    };

    assert!(!result.red_flags.is_empty());
    assert!(result.summary.contains(DISCLAIMER_MARKER));
    assert!(
        sections(&result)
            .iter()
            .any(|s| matches!(s, Section::RedFlags(_)))
    );
    assert_eq!(
        advisor.queries(),
        vec!["my chest hurts and I can't breathe well"]
    );
}

#[tokio::test]
async fn vague_reply_offers_three_pickable_questions() {
    let vague = HealthInformationResult {
        is_vague: true,
        questions_to_user: vec![
            "When did this start?".to_string(),
            "How bad is it, 1 to 10?".to_string(),
            "Anything else going on?".to_string(),
        ],
        ..clear_result()
    };
    let advisor = Arc::new(MockAdvisor::new(vec![Scripted::Result(vague)]));
    let session = session_with(&advisor);

    session.edit("I feel off").await;
    let Outcome::Completed(result) = session.submit().await else {
        panic!("expected a result");
    };
    assert!(result.is_vague);
    assert_eq!(result.questions_to_user.len(), CLARIFYING_QUESTION_COUNT);
    assert!(result.conformance_issues().is_empty());

    let shown = sections(&result);
    assert!(
        shown
            .iter()
            .any(|s| matches!(s, Section::ClarifyingQuestions(q) if q.len() == 3))
    );

    assert_eq!(
        session.pick_question(3).await.as_deref(),
        Some("Anything else going on?")
    );
    assert_eq!(
        session.pick_question(1).await.as_deref(),
        Some("When did this start?")
    );
    assert_eq!(
        session.snapshot().await.input,
        "I feel off Anything else going on? When did this start? "
    );
}

// ── Boundary rules ────────────────────────────────────────────────

#[tokio::test]
async fn blank_input_makes_no_call_and_keeps_state() {
    let advisor = Arc::new(MockAdvisor::new(vec![Scripted::Result(clear_result())]));
    let session = session_with(&advisor);

    session.edit("headache").await;
    session.submit().await;
    let before = session.snapshot().await;

    session.edit("   \n\t").await;
    assert_eq!(
        session.submit().await,
        Outcome::Rejected(Rejection::EmptyInput)
    );
    assert_eq!(advisor.calls(), 1);

    let after = session.snapshot().await;
    assert_eq!(after.result, before.result);
    assert_eq!(after.error, before.error);
    assert_eq!(after.generation, before.generation);
}

#[tokio::test]
async fn second_submission_while_busy_is_a_no_op() {
    let advisor = Arc::new(MockAdvisor::new(vec![Scripted::Result(clear_result())]).gated());
    let session = Arc::new(session_with(&advisor));
    session.edit("headache").await;

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };
    wait_for_call(&advisor, 1).await;

    assert_eq!(session.submit().await, Outcome::Rejected(Rejection::Busy));
    assert_eq!(advisor.calls(), 1);

    advisor.release();
    assert!(matches!(first.await.unwrap(), Outcome::Completed(_)));
    assert_eq!(advisor.calls(), 1);
    assert!(!session.snapshot().await.busy);
}

#[tokio::test]
async fn failures_clear_stale_result_and_keep_input() {
    for error in [
        AnalysisError::Transport("connection refused".to_string()),
        AnalysisError::EmptyResponse,
        AnalysisError::MalformedResponse {
            reason: "expected value".to_string(),
        },
    ] {
        let kind = error.kind();
        let advisor = Arc::new(MockAdvisor::new(vec![
            Scripted::Result(clear_result()),
            Scripted::Error(error),
        ]));
        let session = session_with(&advisor);

        session.edit("headache").await;
        assert!(matches!(session.submit().await, Outcome::Completed(_)));

        let Outcome::Failed(failure) = session.submit().await else {
            panic!("expected failure");
        };
        assert_eq!(failure.kind, kind);

        let state = session.snapshot().await;
        assert!(state.result.is_none());
        assert_eq!(state.error, Some(failure));
        assert_eq!(state.input, "headache");
    }
}

#[tokio::test]
async fn empty_and_unparseable_text_fail_through_the_parser() {
    let advisor = Arc::new(MockAdvisor::new(vec![
        Scripted::Text(None),
        Scripted::Text(Some("I think you're fine!".to_string())),
    ]));
    let session = session_with(&advisor);
    session.edit("tired").await;

    let Outcome::Failed(first) = session.submit().await else {
        panic!("expected failure");
    };
    assert_eq!(first.kind, FailureKind::EmptyResponse);

    let Outcome::Failed(second) = session.submit().await else {
        panic!("expected failure");
    };
    assert_eq!(second.kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn start_over_clears_everything() {
    let advisor = Arc::new(MockAdvisor::new(vec![Scripted::Result(clear_result())]));
    let session = session_with(&advisor);
    session.edit("headache").await;
    session.submit().await;

    session.reset().await;
    let state = session.snapshot().await;
    assert!(state.input.is_empty());
    assert!(state.result.is_none());
    assert!(state.error.is_none());
    assert!(!state.busy);
}

// ── Timeout, cancellation, retry ──────────────────────────────────

#[tokio::test]
async fn slow_reply_times_out() {
    let advisor = Arc::new(
        MockAdvisor::new(vec![Scripted::Result(clear_result())])
            .with_delay(Duration::from_millis(500)),
    );
    let session = Session::new(
        advisor.clone(),
        SessionConfig {
            timeout: Duration::from_millis(20),
            ..SessionConfig::default()
        },
    );
    session.edit("headache").await;

    let Outcome::Failed(failure) = session.submit().await else {
        panic!("expected failure");
    };
    assert_eq!(failure.kind, FailureKind::Timeout);
    assert!(!session.snapshot().await.busy);
}

#[tokio::test]
async fn reset_during_call_discards_the_late_reply() {
    let advisor = Arc::new(MockAdvisor::new(vec![Scripted::Result(clear_result())]).gated());
    let session = Arc::new(session_with(&advisor));
    session.edit("headache").await;

    let pending = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };
    wait_for_call(&advisor, 1).await;

    session.reset().await;
    assert_eq!(pending.await.unwrap(), Outcome::Superseded);

    let state = session.snapshot().await;
    assert!(state.result.is_none());
    assert!(state.error.is_none());
    assert!(state.input.is_empty());
    assert!(!state.busy);
}

#[tokio::test]
async fn reset_cancels_a_resubmission_made_before_the_old_call_unwinds() {
    let advisor = Arc::new(
        MockAdvisor::new(vec![
            Scripted::Result(clear_result()),
            Scripted::Result(clear_result()),
        ])
        .gated(),
    );
    let session = Arc::new(session_with(&advisor));
    session.edit("headache").await;

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };
    wait_for_call(&advisor, 1).await;
    session.reset().await;

    // Drive the second submission up to the gate before the first task
    // gets to run its cleanup.
    session.edit("fever").await;
    let second = session.submit();
    tokio::pin!(second);
    tokio::select! {
        biased;
        outcome = &mut second => panic!("second call finished early: {outcome:?}"),
        _ = tokio::task::yield_now() => {}
    }
    assert_eq!(advisor.calls(), 2);
    assert!(session.snapshot().await.busy);

    assert_eq!(first.await.unwrap(), Outcome::Superseded);
    assert!(session.snapshot().await.busy);

    session.reset().await;
    let outcome = tokio::time::timeout(Duration::from_secs(5), &mut second)
        .await
        .expect("reset must abandon the second call");
    assert_eq!(outcome, Outcome::Superseded);

    let state = session.snapshot().await;
    assert!(!state.busy);
    assert!(state.input.is_empty());
    assert_eq!(advisor.calls(), 2);
}

#[tokio::test]
async fn cancel_records_failure_and_keeps_input() {
    let advisor = Arc::new(MockAdvisor::new(vec![Scripted::Result(clear_result())]).gated());
    let session = Arc::new(session_with(&advisor));
    session.edit("headache").await;

    let pending = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.submit().await })
    };
    wait_for_call(&advisor, 1).await;

    session.cancel().await;
    let Outcome::Failed(failure) = pending.await.unwrap() else {
        panic!("expected failure");
    };
    assert_eq!(failure.kind, FailureKind::Cancelled);
    assert_eq!(session.snapshot().await.input, "headache");
}

fn fast_retries(max_retries: u32) -> SessionConfig {
    SessionConfig {
        retry: RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
        },
        ..SessionConfig::default()
    }
}

#[tokio::test]
async fn transport_failures_are_retried_when_enabled() {
    let advisor = Arc::new(MockAdvisor::new(vec![
        Scripted::Error(AnalysisError::Transport("reset by peer".to_string())),
        Scripted::Result(clear_result()),
    ]));
    let session = Session::new(advisor.clone(), fast_retries(2));
    session.edit("headache").await;

    assert!(matches!(session.submit().await, Outcome::Completed(_)));
    assert_eq!(advisor.calls(), 2);
}

#[tokio::test]
async fn malformed_replies_are_never_retried() {
    let advisor = Arc::new(MockAdvisor::new(vec![
        Scripted::Text(Some("{\"summary\": 1}".to_string())),
        Scripted::Result(clear_result()),
    ]));
    let session = Session::new(advisor.clone(), fast_retries(2));
    session.edit("headache").await;

    assert!(matches!(session.submit().await, Outcome::Failed(_)));
    assert_eq!(advisor.calls(), 1);
}

#[tokio::test]
async fn default_config_makes_exactly_one_call() {
    let advisor = Arc::new(MockAdvisor::new(vec![
        Scripted::Error(AnalysisError::Transport("down".to_string())),
        Scripted::Result(clear_result()),
    ]));
    let session = session_with(&advisor);
    session.edit("headache").await;

    assert!(matches!(session.submit().await, Outcome::Failed(_)));
    assert_eq!(advisor.calls(), 1);
}
