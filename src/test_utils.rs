//! Shared test doubles for the completion provider and search rounds.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use sift_search::{ResultSet, SearchRound};

use crate::llm::{CompletionOptions, CompletionProvider, LlmError};

/// One call seen by [`ScriptedProvider`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub system: String,
    pub user: String,
    pub options: CompletionOptions,
}

/// Completion provider that replays canned replies in order.
///
/// Once the script runs out every call fails with a provider error.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<Result<String, LlmError>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub fn with_results<I>(replies: I) -> Self
    where
        I: IntoIterator<Item = Result<String, LlmError>>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("calls lock").len()
    }
}

#[async_trait]
impl CompletionProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &CompletionOptions,
    ) -> Result<String, LlmError> {
        self.calls.lock().expect("calls lock").push(RecordedCall {
            system: system.to_owned(),
            user: user.to_owned(),
            options: options.clone(),
        });
        self.replies
            .lock()
            .expect("replies lock")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::ProviderError("script exhausted".into())))
    }
}

/// Search round that returns `"{query} #{i}: result"` lines and counts calls.
pub struct CountingRound {
    per_round: usize,
    calls: AtomicUsize,
    queries: Mutex<Vec<String>>,
}

impl CountingRound {
    pub fn new(per_round: usize) -> Self {
        Self {
            per_round,
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().expect("queries lock").clone()
    }
}

#[async_trait]
impl SearchRound for CountingRound {
    async fn execute(&self, query: &str) -> ResultSet {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .expect("queries lock")
            .push(query.to_owned());
        (1..=self.per_round)
            .map(|i| format!("{query} #{i}: result"))
            .collect()
    }
}
