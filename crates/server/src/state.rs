use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use reviewscope::{
    AnthropicChat, AppStoreClient, ChatConfig, ChatModel, GooglePlayClient, HfSentimentClient,
    SentimentConfig, SentimentLabeler, SummarizerConfig,
};
use std::sync::Arc;

/// Shared application state.
///
/// Every outbound client is constructed once here and reused across requests,
/// so connection pools are shared and per-request setup cost is zero.
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// App Store review feed client
    pub app_store: AppStoreClient,

    /// Google Play review and metadata client
    pub google_play: GooglePlayClient,

    /// Sentiment labeling backend
    pub labeler: Arc<dyn SentimentLabeler>,

    /// Chat model driving overview generation
    pub chat: Arc<dyn ChatModel>,

    /// Batch fold tuning for the summarizer
    pub summarizer: SummarizerConfig,
}

impl ServerState {
    /// Create new server state, building every outbound client from the
    /// environment. Fails fast on missing model credentials rather than
    /// surfacing the problem on the first request.
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let app_store = AppStoreClient::new()
            .map_err(|e| ServerError::Config(format!("app store client: {e}")))?;
        let google_play = GooglePlayClient::new()
            .map_err(|e| ServerError::Config(format!("google play client: {e}")))?;

        let labeler: Arc<dyn SentimentLabeler> = Arc::new(
            HfSentimentClient::new(SentimentConfig::from_env())
                .map_err(|e| ServerError::Config(format!("sentiment client: {e}")))?,
        );

        let chat_config =
            ChatConfig::from_env().map_err(|e| ServerError::Config(format!("chat model: {e}")))?;
        let chat: Arc<dyn ChatModel> = Arc::new(
            AnthropicChat::new(chat_config)
                .map_err(|e| ServerError::Config(format!("chat model: {e}")))?,
        );

        Ok(Self {
            config: Arc::new(config),
            app_store,
            google_play,
            labeler,
            chat,
            summarizer: SummarizerConfig::from_env(),
        })
    }

    /// Assemble state from pre-built components. Used by tests to swap the
    /// network-backed labeler and chat model for local fakes.
    pub fn with_components(
        config: ServerConfig,
        app_store: AppStoreClient,
        google_play: GooglePlayClient,
        labeler: Arc<dyn SentimentLabeler>,
        chat: Arc<dyn ChatModel>,
        summarizer: SummarizerConfig,
    ) -> Self {
        Self {
            config: Arc::new(config),
            app_store,
            google_play,
            labeler,
            chat,
            summarizer,
        }
    }

    /// Whether requests must carry an API key
    pub fn auth_enabled(&self) -> bool {
        !self.config.api_keys.is_empty()
    }

    /// Check if API key is valid
    pub fn is_valid_api_key(&self, key: &str) -> bool {
        self.config.api_keys.contains(key)
    }
}
