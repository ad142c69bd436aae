use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;

const MAX_SESSION_IDLE_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub vector_store: VectorStoreSettings,
    pub embedding: EmbeddingConfig,
    pub llm: LlmConfig,
    pub extraction: ExtractionConfig,
    pub gate: GateConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_request_size: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub upload_dir: String,
    pub text_cache_dir: String,
    /// Store uploads under `<upload_dir>/<user_uuid>/`.
    pub per_user_dirs: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorStoreSettings {
    pub path: String,
    pub max_collections: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
    HuggingFace,
    Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub batch_size: usize,
    pub dimensions: usize,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    Parse,
    Ocr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub mode: ExtractionMode,
    pub ocr_dpi: u32,
    pub ocr_workers: usize,
    pub ocr_language: String,
    pub pdftoppm_path: String,
    pub tesseract_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    All,
    Any,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig {
    pub keywords: Vec<String>,
    pub match_mode: MatchMode,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    pub queries: Vec<String>,
    pub top_k: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    pub require_login: bool,
    pub cookie_name: String,
    /// Sessions idle for longer than this are dropped.
    pub session_idle_hours: i64,
    pub users: Vec<UserCredentials>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file_path: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists
        dotenvy::dotenv().ok();

        let defaults = Config::try_from(&AppConfig::default())?;

        let config = Config::builder()
            .add_source(defaults)
            .add_source(File::with_name("config/default").required(false))
            // Add environment-specific config
            .add_source(
                File::with_name(&format!(
                    "config/{}",
                    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into())
                ))
                .required(false),
            )
            // Add local config (gitignored)
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables with IMDG prefix
            .add_source(
                Environment::with_prefix("IMDG")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("gate.keywords")
                    .with_list_parse_key("retrieval.queries")
                    .try_parsing(true),
            );

        let mut app_config: AppConfig = config.build()?.try_deserialize()?;
        app_config.apply_api_key_env();
        app_config.validate()?;
        Ok(app_config)
    }

    /// Fills empty API keys from the conventional provider variables.
    pub fn apply_api_key_env(&mut self) {
        if self.llm.api_key.is_empty() {
            if let Ok(key) = env::var("GROQ_API_KEY") {
                self.llm.api_key = key;
            }
        }
        if self.embedding.api_key.is_empty() {
            if let Ok(key) = env::var("HUGGING_FACE_API_KEY") {
                self.embedding.api_key = key;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Message(msg.to_string()));

        if self.vector_store.max_collections == 0 {
            return invalid("vector_store.max_collections must be at least 1");
        }
        if self.chunking.chunk_size == 0 {
            return invalid("chunking.chunk_size must be at least 1");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return invalid("chunking.chunk_overlap must be smaller than chunking.chunk_size");
        }
        if self.retrieval.top_k == 0 {
            return invalid("retrieval.top_k must be at least 1");
        }
        if self.retrieval.queries.iter().all(|q| q.trim().is_empty()) {
            return invalid("retrieval.queries must contain at least one query");
        }
        if self.extraction.ocr_workers == 0 {
            return invalid("extraction.ocr_workers must be at least 1");
        }
        if self.embedding.batch_size == 0 {
            return invalid("embedding.batch_size must be at least 1");
        }
        if self.gate.keywords.iter().all(|k| k.trim().is_empty()) {
            return invalid("gate.keywords must contain at least one keyword");
        }
        if self.auth.require_login && self.auth.users.is_empty() {
            return invalid("auth.users must not be empty when auth.require_login is set");
        }
        if !(1..=MAX_SESSION_IDLE_HOURS).contains(&self.auth.session_idle_hours) {
            return invalid("auth.session_idle_hours must be between 1 and 8760");
        }
        if self.server.timeout_seconds < self.min_request_timeout_seconds() {
            return invalid(
                "server.timeout_seconds must cover two LLM calls plus one embedding call",
            );
        }
        Ok(())
    }

    /// Smallest request timeout that still fits one full analysis: an
    /// embedding call followed by the extraction and formatting LLM calls.
    pub fn min_request_timeout_seconds(&self) -> u64 {
        2 * self.llm.timeout_seconds + self.embedding.timeout_seconds
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
                max_request_size: 16 * 1024 * 1024, // 16MB
                timeout_seconds: 300,
            },
            storage: StorageConfig {
                upload_dir: "user_pdf".to_string(),
                text_cache_dir: "MSDS_text".to_string(),
                per_user_dirs: true,
            },
            vector_store: VectorStoreSettings {
                path: "MSDS_vectorDB".to_string(),
                max_collections: 10,
            },
            embedding: EmbeddingConfig {
                provider: EmbeddingProvider::HuggingFace,
                api_url: "https://api-inference.huggingface.co".to_string(),
                api_key: String::new(),
                model: "sentence-transformers/all-MiniLM-L12-v2".to_string(),
                batch_size: 32,
                dimensions: 384,
                timeout_seconds: 60,
            },
            llm: LlmConfig {
                api_url: "https://api.groq.com/openai/v1".to_string(),
                api_key: String::new(),
                model: "llama-3.1-70b-versatile".to_string(),
                temperature: 0.7,
                max_tokens: None,
                timeout_seconds: 120,
            },
            extraction: ExtractionConfig {
                mode: ExtractionMode::Parse,
                ocr_dpi: 350,
                ocr_workers: 4,
                ocr_language: "eng".to_string(),
                pdftoppm_path: "pdftoppm".to_string(),
                tesseract_path: "tesseract".to_string(),
            },
            gate: GateConfig {
                keywords: vec!["safety".to_string(), "keselamatan".to_string()],
                match_mode: MatchMode::All,
            },
            chunking: ChunkingConfig {
                chunk_size: 1000,
                chunk_overlap: 300,
            },
            retrieval: RetrievalConfig {
                queries: vec![
                    "product name".to_string(),
                    "hazardous classification".to_string(),
                    "packaging and handling".to_string(),
                    "UN number and description".to_string(),
                ],
                top_k: 2,
            },
            auth: AuthConfig {
                require_login: true,
                cookie_name: "imdg_session".to_string(),
                session_idle_hours: 24,
                users: vec![UserCredentials {
                    username: "user".to_string(),
                    password: "password".to_string(),
                }],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "text".to_string(),
                file_path: None,
            },
        }
    }
}
