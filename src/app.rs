//! The user-facing session loop.
//!
//! Terminal I/O goes through [`Prompter`] so the loop can be driven by a
//! script in tests and by [`DialoguerPrompter`] in the binary.

use std::io;
use std::sync::Arc;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};
use sift_search::ResultCache;

use crate::config::SiftConfig;
use crate::diversity::DiversityGate;
use crate::error::Result;
use crate::interpret::{QueryInterpretation, interpret_query};
use crate::llm::{CompletionProvider, OpenAiCompatClient};
use crate::orchestrator::RefinementOrchestrator;
use crate::progress::RefinementCallback;
use crate::session::SessionState;
use crate::summary::generate_summary;

const RULE: &str = "==================================================";

/// Line-oriented terminal interaction.
pub trait Prompter {
    /// Ask for a line of text.
    fn input(&mut self, prompt: &str) -> io::Result<String>;

    /// Ask a yes/no question.
    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool>;

    /// Show a line of output.
    fn say(&mut self, text: &str);
}

/// [`Prompter`] backed by `dialoguer` on the controlling terminal.
#[derive(Default)]
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Prompter for DialoguerPrompter {
    fn input(&mut self, prompt: &str) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn confirm(&mut self, prompt: &str, default: bool) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| io::Error::other(e.to_string()))
    }

    fn say(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Everything one session produced.
#[derive(Debug, Clone)]
pub struct SessionReport {
    /// The query the session ran (including any addendum).
    pub query: String,
    /// The model's reading of `query`.
    pub interpretation: QueryInterpretation,
    /// Distinct result lines from every round.
    pub results: Vec<String>,
    /// Queries accepted between rounds.
    pub refined_queries: Vec<String>,
    /// The final summary.
    pub summary: String,
    /// Further queries the user might try. Empty if the suggestion call failed.
    pub follow_ups: Vec<String>,
}

/// Interpretation, refinement and summary wired together.
pub struct App {
    llm: Arc<dyn CompletionProvider>,
    orchestrator: RefinementOrchestrator,
}

impl App {
    /// Assemble an app from its parts.
    pub fn new(llm: Arc<dyn CompletionProvider>, orchestrator: RefinementOrchestrator) -> Self {
        Self { llm, orchestrator }
    }

    /// Build every component from `config`.
    ///
    /// Opens the result cache, which sweeps expired records before any
    /// search is served.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid, no API key is
    /// available, or the cache directory cannot be created.
    pub fn from_config(config: &SiftConfig, on_event: Option<RefinementCallback>) -> Result<Self> {
        config.validate()?;

        let cache = Arc::new(ResultCache::open(&config.cache.dir, config.cache.max_age())?);
        let executor = sift_search::build_executor(&config.search.to_search_config(), cache)?;

        let llm: Arc<dyn CompletionProvider> =
            Arc::new(OpenAiCompatClient::new(config.llm_client_config()?)?);
        let gate = DiversityGate::new(Arc::clone(&llm))
            .with_max_attempts(config.refinement.max_proposal_attempts);

        let mut orchestrator =
            RefinementOrchestrator::new(Arc::new(executor), gate, config.refinement.max_rounds);
        if let Some(callback) = on_event {
            orchestrator = orchestrator.with_callback(callback);
        }

        Ok(Self::new(llm, orchestrator))
    }

    /// Run one session for `query`.
    ///
    /// When `interactive` is set the user is offered a chance to extend the
    /// query after seeing its interpretation.
    ///
    /// # Errors
    ///
    /// Completion provider and interpretation parse failures abort the
    /// session. Failing to suggest follow-ups does not.
    pub async fn run_session(
        &self,
        query: &str,
        prompter: &mut dyn Prompter,
        interactive: bool,
    ) -> Result<SessionReport> {
        let mut query = query.trim().to_owned();

        prompter.say("\nAnalyzing your query...");
        let mut interpretation = interpret_query(self.llm.as_ref(), &query).await?;
        show_interpretation(prompter, &interpretation);

        if interactive
            && prompter.confirm(
                "Would you like to add any of these suggested improvements to your query?",
                false,
            )?
        {
            prompter.say(&format!("Your original query was: \"{query}\""));
            let additions = prompter.input("Additional details")?;
            let additions = additions.trim();
            if additions.is_empty() {
                prompter.say("No additions provided, using original query.");
            } else {
                query = format!("{query} {additions}");
                interpretation = interpret_query(self.llm.as_ref(), &query).await?;
                show_interpretation(prompter, &interpretation);
            }
        }

        let mut session = SessionState::new(query.clone());
        let results = self.orchestrator.run(&mut session).await?;

        prompter.say("\nGenerating final summary...");
        let summary = generate_summary(self.llm.as_ref(), &query, &results).await?;

        let mut asked = vec![query.clone()];
        asked.extend(session.used_queries.iter().cloned());
        let follow_ups = match self
            .orchestrator
            .gate()
            .suggest_follow_up_queries(&results, &asked)
            .await
        {
            Ok(follow_ups) => follow_ups,
            Err(e) => {
                tracing::warn!(error = %e, "could not suggest follow-up queries");
                Vec::new()
            }
        };

        Ok(SessionReport {
            query,
            interpretation,
            results,
            refined_queries: session.used_queries,
            summary,
            follow_ups,
        })
    }

    /// Prompt for queries until the user declines another search.
    ///
    /// A failed session is reported and the user is asked for a new query.
    ///
    /// # Errors
    ///
    /// Returns [`SiftError::Io`](crate::error::SiftError::Io) when the
    /// terminal can no longer be read.
    pub async fn run_interactive(&self, prompter: &mut dyn Prompter) -> Result<()> {
        prompter.say("Welcome to sift, the iterative web search assistant!");
        prompter.say(RULE);

        loop {
            let query = prompter.input("Enter your search topic")?;
            let query = query.trim();
            if query.is_empty() {
                prompter.say("Please enter a valid search query.");
                continue;
            }

            match self.run_session(query, prompter, true).await {
                Ok(report) => show_report(prompter, &report),
                Err(e) => {
                    tracing::debug!(error = ?e, "session failed");
                    prompter.say(&format!("\nAn error occurred: {e}"));
                    prompter.say("Please try again.");
                    continue;
                }
            }

            if !prompter.confirm("Would you like to perform another search?", false)? {
                prompter.say("\nThank you for using sift!");
                return Ok(());
            }
        }
    }

    /// Run one non-interactive session and print its report.
    ///
    /// # Errors
    ///
    /// Returns the session's error, if any.
    pub async fn run_once(&self, query: &str, prompter: &mut dyn Prompter) -> Result<SessionReport> {
        let report = self.run_session(query, prompter, false).await?;
        show_report(prompter, &report);
        Ok(report)
    }
}

fn show_interpretation(prompter: &mut dyn Prompter, interpretation: &QueryInterpretation) {
    prompter.say("\nQuery Analysis:");
    prompter.say(&format!(
        "* Interpreted Intent: {}",
        interpretation.interpreted_intent
    ));
    if !interpretation.suggested_improvements.is_empty() {
        prompter.say("\n* Suggested Improvements:");
        for improvement in &interpretation.suggested_improvements {
            prompter.say(&format!("  - {improvement}"));
        }
    }
}

fn show_report(prompter: &mut dyn Prompter, report: &SessionReport) {
    prompter.say("\nFinal Summary:");
    prompter.say(RULE);
    prompter.say(&report.summary);
    prompter.say(RULE);

    if !report.follow_ups.is_empty() {
        prompter.say("\nYou might also search for:");
        for follow_up in &report.follow_ups {
            prompter.say(&format!("  - {follow_up}"));
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

    use super::*;
    use std::collections::VecDeque;

    use sift_search::SearchRound;

    use crate::error::SiftError;
    use crate::test_utils::{CountingRound, ScriptedProvider};

    #[derive(Default)]
    struct ScriptedPrompter {
        inputs: VecDeque<String>,
        confirms: VecDeque<bool>,
        output: Vec<String>,
    }

    impl ScriptedPrompter {
        fn new(inputs: &[&str], confirms: &[bool]) -> Self {
            Self {
                inputs: inputs.iter().map(|s| (*s).to_string()).collect(),
                confirms: confirms.iter().copied().collect(),
                output: Vec::new(),
            }
        }

        fn transcript(&self) -> String {
            self.output.join("\n")
        }
    }

    impl Prompter for ScriptedPrompter {
        fn input(&mut self, _prompt: &str) -> io::Result<String> {
            self.inputs
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
        }

        fn confirm(&mut self, _prompt: &str, _default: bool) -> io::Result<bool> {
            self.confirms
                .pop_front()
                .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "no more input"))
        }

        fn say(&mut self, text: &str) {
            self.output.push(text.to_owned());
        }
    }

    fn interpretation(query: &str) -> String {
        serde_json::json!({
            "original_query": query,
            "interpreted_intent": format!("learn about {query}"),
            "suggested_improvements": ["be specific"],
            "search_keywords": [query],
        })
        .to_string()
    }

    fn app(provider: &Arc<ScriptedProvider>, round: &Arc<CountingRound>, rounds: usize) -> App {
        let llm = Arc::clone(provider) as Arc<dyn CompletionProvider>;
        let gate = DiversityGate::new(Arc::clone(&llm));
        let orchestrator =
            RefinementOrchestrator::new(Arc::clone(round) as Arc<dyn SearchRound>, gate, rounds);
        App::new(llm, orchestrator)
    }

    #[tokio::test]
    async fn run_once_produces_report() {
        let provider = Arc::new(ScriptedProvider::new([
            interpretation("best hiking boots"),
            "waterproof hiking boots".to_string(),
            "Get waterproof boots.".to_string(),
            "boot care\nboot sizing".to_string(),
        ]));
        let round = Arc::new(CountingRound::new(2));
        let mut prompter = ScriptedPrompter::default();

        let report = app(&provider, &round, 2)
            .run_once("best hiking boots", &mut prompter)
            .await
            .unwrap();

        assert_eq!(report.query, "best hiking boots");
        assert_eq!(report.refined_queries, vec!["waterproof hiking boots"]);
        assert_eq!(report.results.len(), 4);
        assert_eq!(report.summary, "Get waterproof boots.");
        assert_eq!(report.follow_ups, vec!["boot care", "boot sizing"]);
        assert!(prompter.transcript().contains("Get waterproof boots."));
        assert!(prompter.transcript().contains("  - boot care"));
    }

    #[tokio::test]
    async fn follow_up_failure_is_not_fatal() {
        let provider = Arc::new(ScriptedProvider::new([
            interpretation("q"),
            "summary".to_string(),
        ]));
        let round = Arc::new(CountingRound::new(1));
        let mut prompter = ScriptedPrompter::default();

        let report = app(&provider, &round, 1)
            .run_once("q", &mut prompter)
            .await
            .unwrap();
        assert_eq!(report.summary, "summary");
        assert!(report.follow_ups.is_empty());
    }

    #[tokio::test]
    async fn addendum_extends_query_and_reinterprets() {
        let provider = Arc::new(ScriptedProvider::new([
            interpretation("best hiking boots"),
            interpretation("best hiking boots for winter"),
            "summary".to_string(),
            String::new(),
        ]));
        let round = Arc::new(CountingRound::new(1));
        let mut prompter = ScriptedPrompter::new(&["best hiking boots", "for winter"], &[true, false]);

        app(&provider, &round, 1)
            .run_interactive(&mut prompter)
            .await
            .unwrap();

        assert_eq!(round.queries(), vec!["best hiking boots for winter"]);
        let transcript = prompter.transcript();
        assert!(transcript.contains("learn about best hiking boots for winter"));
        assert!(transcript.contains("Thank you for using sift!"));
    }

    #[tokio::test]
    async fn blank_addendum_keeps_query() {
        let provider = Arc::new(ScriptedProvider::new([
            interpretation("q"),
            "summary".to_string(),
            String::new(),
        ]));
        let round = Arc::new(CountingRound::new(1));
        let mut prompter = ScriptedPrompter::new(&["q", "   "], &[true, false]);

        app(&provider, &round, 1)
            .run_interactive(&mut prompter)
            .await
            .unwrap();

        assert_eq!(round.queries(), vec!["q"]);
        assert!(prompter.transcript().contains("No additions provided"));
    }

    #[tokio::test]
    async fn empty_query_is_rejected_and_asked_again() {
        let provider = Arc::new(ScriptedProvider::new([
            interpretation("q"),
            "summary".to_string(),
            String::new(),
        ]));
        let round = Arc::new(CountingRound::new(1));
        let mut prompter = ScriptedPrompter::new(&["  ", "q"], &[false, false]);

        app(&provider, &round, 1)
            .run_interactive(&mut prompter)
            .await
            .unwrap();

        assert!(prompter.transcript().contains("Please enter a valid search query."));
        assert_eq!(round.calls(), 1);
    }

    #[tokio::test]
    async fn session_error_is_reported_and_loop_continues() {
        let provider = Arc::new(ScriptedProvider::new(["not json"]));
        let round = Arc::new(CountingRound::new(1));
        // One query, then the input runs dry.
        let mut prompter = ScriptedPrompter::new(&["q"], &[]);

        let result = app(&provider, &round, 1).run_interactive(&mut prompter).await;

        assert!(matches!(result, Err(SiftError::Io(_))));
        assert!(prompter.transcript().contains("An error occurred: parse error"));
        assert_eq!(round.calls(), 0);
    }

    #[tokio::test]
    async fn another_search_runs_second_session() {
        let provider = Arc::new(ScriptedProvider::new([
            interpretation("first"),
            "summary one".to_string(),
            String::new(),
            interpretation("second"),
            "summary two".to_string(),
            String::new(),
        ]));
        let round = Arc::new(CountingRound::new(1));
        let mut prompter = ScriptedPrompter::new(&["first", "second"], &[false, true, false, false]);

        app(&provider, &round, 1)
            .run_interactive(&mut prompter)
            .await
            .unwrap();

        assert_eq!(round.queries(), vec!["first", "second"]);
        let transcript = prompter.transcript();
        assert!(transcript.contains("summary one"));
        assert!(transcript.contains("summary two"));
    }

    #[test]
    fn from_config_requires_api_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiftConfig::default();
        config.cache.dir = dir.path().to_path_buf();
        let err = App::from_config(&config, None).err().unwrap();
        assert!(matches!(err, SiftError::Config(_)));
    }

    #[test]
    fn from_config_builds_with_key() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SiftConfig::default();
        config.cache.dir = dir.path().join("results");
        config.llm.api_key = Some("sk-test".into());
        config.refinement.max_rounds = 2;

        let app = App::from_config(&config, None).unwrap();
        assert_eq!(app.orchestrator.max_rounds(), 2);
        assert!(dir.path().join("results").is_dir());
    }
}
