pub mod completion;
pub mod intent;
pub mod prompt;

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::AgentConfig;
use crate::groq_client::{ChatModel, GroqClient};
use crate::recommender::{SongRecommender, DEFAULT_TOP_N};
use intent::Intent;

pub const DEGRADED_REPLY: &str =
    "I'm sorry, I cannot process your request because the Groq API key is missing or invalid.";

pub const SONG_NOT_FOUND: &str = "Song not found in the database. Please try another song.";

/// Whether the agent can reach a language model.
pub enum AgentState {
    Ready(Arc<dyn ChatModel>),
    /// No credential was configured; every chat gets [`DEGRADED_REPLY`].
    Degraded,
}

/// Music assistant that answers free text with lyric-similarity
/// recommendations or general conversation, phrased by an LLM.
pub struct MusicAgent {
    config: AgentConfig,
    state: AgentState,
    recommender: Arc<dyn SongRecommender>,
}

impl MusicAgent {
    pub fn new(config: AgentConfig, recommender: Arc<dyn SongRecommender>) -> Self {
        info!(provider = %config.provider, model = %config.model_name, "initialising music agent");
        info!("API key set: {}", if config.has_api_key() { "Yes" } else { "No" });

        match &config.api_key {
            Some(key) => {
                let client =
                    GroqClient::with_base_url(key.clone(), &config.model_name, &config.base_url);
                info!(model = %config.model_name, "LLM setup successful");
                Self::with_model(config, recommender, Arc::new(client))
            }
            None => {
                error!("GROQ_API_KEY not found; LLM will not be initialised");
                Self {
                    config,
                    state: AgentState::Degraded,
                    recommender,
                }
            }
        }
    }

    /// Build an agent around an already constructed model.
    pub fn with_model(
        config: AgentConfig,
        recommender: Arc<dyn SongRecommender>,
        model: Arc<dyn ChatModel>,
    ) -> Self {
        Self {
            config,
            state: AgentState::Ready(model),
            recommender,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, AgentState::Ready(_))
    }

    pub fn model_name(&self) -> &str {
        &self.config.model_name
    }

    pub fn provider(&self) -> &str {
        &self.config.provider
    }

    pub fn recommender(&self) -> &Arc<dyn SongRecommender> {
        &self.recommender
    }

    /// Answer one user message. Failures come back as reply text.
    pub async fn chat(&self, user_input: &str) -> String {
        info!(input = user_input, "user input");

        let model = match &self.state {
            AgentState::Ready(model) => model.as_ref(),
            AgentState::Degraded => {
                error!("LLM not initialised; cannot process user input");
                return DEGRADED_REPLY.to_string();
            }
        };

        match intent::detect(user_input) {
            Intent::Recommend { song_name } => {
                info!(song = %song_name, "detected recommendation request");
                self.recommend(model, user_input, &song_name).await
            }
            Intent::General => self.general_chat(model, user_input).await,
        }
    }

    async fn recommend(&self, model: &dyn ChatModel, user_input: &str, song_name: &str) -> String {
        let records = match self.recommender.recommend(song_name, DEFAULT_TOP_N) {
            Ok(Some(records)) if !records.is_empty() => records,
            Ok(_) => {
                warn!(song = song_name, "no recommendations found");
                return SONG_NOT_FOUND.to_string();
            }
            Err(e) => {
                error!(error = %e, "recommendation lookup failed");
                return format!("Error occurred while fetching recommendations: {}", e);
            }
        };

        let list = prompt::render_list(&records);
        info!("recommendations fetched:\n{}", list);

        match model
            .complete(&prompt::format_recommendations(user_input, &list))
            .await
        {
            Ok(raw) => completion::clean(&raw),
            Err(e) => {
                error!(error = %e, "LLM failed to format recommendations");
                format!("Could not format recommendations using LLM: {}", e)
            }
        }
    }

    async fn general_chat(&self, model: &dyn ChatModel, user_input: &str) -> String {
        match model.complete(&prompt::general_chat(user_input)).await {
            Ok(raw) => completion::clean(&raw),
            Err(e) => {
                error!(error = %e, "general chat failed");
                format!("I encountered an error while processing your request: {}", e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tracing_test::traced_test;

    use super::*;
    use crate::groq_client::{LlmError, PromptMessage};
    use crate::recommender::{RecommendError, RecommendationRecord};

    /// Model stub that records every prompt it receives.
    pub(crate) struct ScriptedModel {
        reply: Result<String, u16>,
        pub(crate) prompts: Mutex<Vec<Vec<PromptMessage>>>,
    }

    impl ScriptedModel {
        pub(crate) fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(reply.to_string()),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn failing(status: u16) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(status),
                prompts: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[PromptMessage]) -> Result<String, LlmError> {
            self.prompts.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(reply) => Ok(reply.clone()),
                Err(status) => Err(LlmError::Status {
                    status: *status,
                    body: "rate limited".into(),
                }),
            }
        }
    }

    /// Recommender stub with a fixed answer.
    pub(crate) struct FixedRecommender {
        pub(crate) results: Option<Vec<RecommendationRecord>>,
        pub(crate) fail: bool,
        pub(crate) queries: Mutex<Vec<(String, usize)>>,
    }

    impl FixedRecommender {
        pub(crate) fn with(results: Option<Vec<RecommendationRecord>>) -> Arc<Self> {
            Arc::new(Self {
                results,
                fail: false,
                queries: Mutex::new(Vec::new()),
            })
        }

        pub(crate) fn broken() -> Arc<Self> {
            Arc::new(Self {
                results: None,
                fail: true,
                queries: Mutex::new(Vec::new()),
            })
        }
    }

    impl SongRecommender for FixedRecommender {
        fn recommend(
            &self,
            song_name: &str,
            top_n: usize,
        ) -> Result<Option<Vec<RecommendationRecord>>, RecommendError> {
            self.queries
                .lock()
                .unwrap()
                .push((song_name.to_string(), top_n));
            if self.fail {
                return Err(unavailable());
            }
            Ok(self.results.clone())
        }

        fn song_titles(&self) -> Result<Vec<String>, RecommendError> {
            if self.fail {
                return Err(unavailable());
            }
            Ok(self
                .results
                .iter()
                .flatten()
                .map(|r| r.song.clone())
                .collect())
        }
    }

    fn unavailable() -> RecommendError {
        RecommendError::Io {
            path: "songs.json".into(),
            source: std::io::Error::other("index unavailable"),
        }
    }

    pub(crate) fn record(artist: &str, song: &str) -> RecommendationRecord {
        RecommendationRecord {
            artist: artist.into(),
            song: song.into(),
            link: None,
            text: None,
        }
    }

    fn config(api_key: Option<&str>) -> AgentConfig {
        AgentConfig {
            provider: "Groq (Free)".into(),
            model_name: "qwen/qwen3-32b".into(),
            api_key: api_key.map(str::to_string),
            base_url: "http://127.0.0.1:9".into(),
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn degraded_agent_apologises_without_lookup() {
        let recommender = FixedRecommender::with(Some(vec![record("Queen", "Bicycle")]));
        let agent = MusicAgent::new(config(None), recommender.clone());

        assert!(!agent.is_ready());
        assert_eq!(agent.chat("anything").await, DEGRADED_REPLY);
        assert_eq!(
            agent.chat("recommend something like 'Angie'").await,
            DEGRADED_REPLY
        );
        assert!(recommender.queries.lock().unwrap().is_empty());
        assert!(logs_contain("GROQ_API_KEY not found"));
    }

    #[test]
    fn configured_key_makes_agent_ready() {
        let agent = MusicAgent::new(config(Some("key")), FixedRecommender::with(None));
        assert!(agent.is_ready());
        assert_eq!(agent.model_name(), "qwen/qwen3-32b");
        assert_eq!(agent.provider(), "Groq (Free)");
    }

    #[tokio::test]
    async fn unknown_song_skips_the_model() {
        let model = ScriptedModel::replying("should not be used");
        let recommender = FixedRecommender::with(None);
        let agent = MusicAgent::with_model(config(Some("k")), recommender.clone(), model.clone());

        let reply = agent.chat("recommend something like \"Nope\"").await;

        assert_eq!(reply, SONG_NOT_FOUND);
        assert_eq!(model.calls(), 0);
        assert_eq!(
            recommender.queries.lock().unwrap().as_slice(),
            &[("Nope".to_string(), DEFAULT_TOP_N)]
        );
    }

    #[tokio::test]
    async fn empty_result_counts_as_not_found() {
        let model = ScriptedModel::replying("unused");
        let agent = MusicAgent::with_model(
            config(Some("k")),
            FixedRecommender::with(Some(Vec::new())),
            model.clone(),
        );

        assert_eq!(agent.chat("songs similar to yesterday").await, SONG_NOT_FOUND);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn recommendations_are_formatted_by_the_model() {
        let model = ScriptedModel::replying("<think>list them</think>\n\n\n\nYou'll love Bicycle!");
        let recommender = FixedRecommender::with(Some(vec![
            record("Queen", "Bicycle"),
            record("ABBA", "Angie"),
        ]));
        let agent = MusicAgent::with_model(config(Some("k")), recommender.clone(), model.clone());

        let reply = agent
            .chat("can you recommend something similar to Yesterday?")
            .await;

        assert_eq!(reply, "You'll love Bicycle!");
        assert_eq!(recommender.queries.lock().unwrap()[0].0, "yesterday");

        let prompts = model.prompts.lock().unwrap();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0][1]
            .content
            .ends_with("Recommendations:\n- Bicycle by Queen\n- Angie by ABBA\n"));
    }

    #[tokio::test]
    async fn general_chat_passes_message_through() {
        let model = ScriptedModel::replying("Jazz is great.\n");
        let recommender = FixedRecommender::with(None);
        let agent = MusicAgent::with_model(config(Some("k")), recommender.clone(), model.clone());

        assert_eq!(agent.chat("Tell me about jazz").await, "Jazz is great.");
        assert!(recommender.queries.lock().unwrap().is_empty());
        assert_eq!(model.prompts.lock().unwrap()[0][1].content, "Tell me about jazz");
    }

    #[tokio::test]
    async fn backend_failure_is_reported_as_text() {
        let model = ScriptedModel::replying("unused");
        let agent =
            MusicAgent::with_model(config(Some("k")), FixedRecommender::broken(), model.clone());

        let reply = agent.chat("recommend 'Angie'").await;

        assert!(reply.starts_with("Error occurred while fetching recommendations: "));
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn model_failures_are_reported_as_text() {
        let agent = MusicAgent::with_model(
            config(Some("k")),
            FixedRecommender::with(Some(vec![record("Queen", "Bicycle")])),
            ScriptedModel::failing(429),
        );

        let formatted = agent.chat("recommend 'Angie'").await;
        assert!(formatted.starts_with("Could not format recommendations using LLM: "));
        assert!(formatted.contains("429"));

        let general = agent.chat("hello").await;
        assert!(general.starts_with("I encountered an error while processing your request: "));
    }
}
