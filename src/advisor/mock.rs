use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

use super::response::{Strictness, parse_reply};
use super::{Advisor, Analysis, ModelInfo};
use crate::error::AnalysisError;
use crate::health::{HealthInformationResult, SymptomQuery};

/// One scripted reply.
pub enum Scripted {
    /// A ready-made result.
    Result(HealthInformationResult),
    /// Raw model text, run through the response parser.
    Text(Option<String>),
    /// A failure.
    Error(AnalysisError),
}

/// A scripted advisor for tests. Returns pre-defined replies in order.
pub struct MockAdvisor {
    replies: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
    gate: Option<Semaphore>,
    delay: Option<Duration>,
    models: Vec<ModelInfo>,
}

impl MockAdvisor {
    pub fn new(replies: Vec<Scripted>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            gate: None,
            delay: None,
            models: Vec::new(),
        }
    }

    /// Hold every call open until [`MockAdvisor::release`] is called.
    pub fn gated(mut self) -> Self {
        self.gate = Some(Semaphore::new(0));
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_models(mut self, models: Vec<ModelInfo>) -> Self {
        self.models = models;
        self
    }

    /// Let one gated call through.
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Number of outbound calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Query texts received, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Advisor for MockAdvisor {
    async fn analyze(&self, query: &SymptomQuery) -> Result<Analysis, AnalysisError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.as_str().to_string());

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| AnalysisError::Transport(e.to_string()))?
                .forget();
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let next = self.replies.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Result(result)) => Ok(Analysis {
                result,
                usage: None,
            }),
            Some(Scripted::Text(text)) => Ok(Analysis {
                result: parse_reply(text.as_deref(), Strictness::Lenient)?,
                usage: None,
            }),
            Some(Scripted::Error(e)) => Err(e),
            None => Err(AnalysisError::Transport(format!(
                "MockAdvisor: no more replies (called {} times)",
                n + 1
            ))),
        }
    }

    async fn models(&self) -> Result<Vec<ModelInfo>, AnalysisError> {
        Ok(self.models.clone())
    }
}
