use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub data_dir: PathBuf,
    pub tei_embed_url: String,
    pub tei_sentiment_url: String,
    pub embedding_dim: usize,
    pub cluster_count: usize,
    pub cluster_seed: u64,
    /// Profile whose hashtags and topics get their own trend tables.
    pub focus_profile: Option<String>,
    pub include_relative_dates: bool,
    pub request_timeout_secs: u64,
    pub llm_api_key: Option<String>,
    pub llm_base_url: String,
    pub llm_model: String,
    pub llm_max_tokens: u32,
    pub llm_temperature: f32,
    pub llm_max_retries: u32,
    /// Persona named in generation prompts.
    pub author: String,
}

impl AppConfig {
    #[must_use]
    pub fn posts_path(&self) -> PathBuf {
        self.data_dir.join("posts.csv")
    }

    #[must_use]
    pub fn analyzed_posts_path(&self) -> PathBuf {
        self.data_dir.join("posts_analyzed.csv")
    }

    #[must_use]
    pub fn trends_path(&self) -> PathBuf {
        self.data_dir.join("trends.csv")
    }

    #[must_use]
    pub fn generated_posts_path(&self) -> PathBuf {
        self.data_dir.join("generated_posts.csv")
    }

    #[must_use]
    pub fn feedback_path(&self) -> PathBuf {
        self.data_dir.join("feedback.json")
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("data_dir", &self.data_dir)
            .field("tei_embed_url", &self.tei_embed_url)
            .field("tei_sentiment_url", &self.tei_sentiment_url)
            .field("embedding_dim", &self.embedding_dim)
            .field("cluster_count", &self.cluster_count)
            .field("cluster_seed", &self.cluster_seed)
            .field("focus_profile", &self.focus_profile)
            .field("include_relative_dates", &self.include_relative_dates)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field(
                "llm_api_key",
                &self.llm_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("llm_base_url", &self.llm_base_url)
            .field("llm_model", &self.llm_model)
            .field("llm_max_tokens", &self.llm_max_tokens)
            .field("llm_temperature", &self.llm_temperature)
            .field("llm_max_retries", &self.llm_max_retries)
            .field("author", &self.author)
            .finish()
    }
}
