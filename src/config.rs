// Runtime configuration, read once at startup from the environment
// (after `.env` has been loaded).

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_KEY_FILE: &str = "service-account.json";

/// How the Google service account key is supplied.
#[derive(Debug, Clone, PartialEq)]
pub enum GoogleCredentials {
    KeyFile(PathBuf),
    InlineJson(String),
}

/// Where documents come from.
#[derive(Debug, Clone, PartialEq)]
pub enum DocsBackend {
    /// A folder of `.txt` files, for offline work.
    Local(PathBuf),
    Google {
        credentials: GoogleCredentials,
        folder_id: Option<String>,
    },
}

impl DocsBackend {
    /// Short description for the diagnostics endpoint. Never includes secrets.
    pub fn describe(&self) -> String {
        match self {
            DocsBackend::Local(dir) => format!("local directory {}", dir.display()),
            DocsBackend::Google { credentials, .. } => match credentials {
                GoogleCredentials::KeyFile(path) => format!("key file {}", path.display()),
                GoogleCredentials::InlineJson(_) => "GOOGLE_SERVICE_ACCOUNT_JSON".to_string(),
            },
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub backend: DocsBackend,
    pub openai_api_key: Option<String>,
    pub embedding_model: String,
    pub embeddings_db: Option<String>,
    pub doc_cache_ttl: Duration,
    pub doc_cache_capacity: usize,
    pub default_page_size: usize,
    /// Empty means any origin is allowed.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Blank values count as unset.
        let var = |name: &str| get(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match var("DOCS_LOCAL_DIR") {
            Some(dir) => DocsBackend::Local(PathBuf::from(dir)),
            None => {
                let credentials = if let Some(json) = var("GOOGLE_SERVICE_ACCOUNT_JSON") {
                    GoogleCredentials::InlineJson(json)
                } else {
                    GoogleCredentials::KeyFile(PathBuf::from(
                        var("GOOGLE_SERVICE_ACCOUNT_KEY")
                            .unwrap_or_else(|| DEFAULT_KEY_FILE.to_string()),
                    ))
                };
                DocsBackend::Google {
                    credentials,
                    folder_id: var("DRIVE_FOLDER_ID"),
                }
            }
        };

        let default_page_size: usize = parse(&var, "DEFAULT_PAGE_SIZE", 50)?;
        if default_page_size == 0 {
            anyhow::bail!("DEFAULT_PAGE_SIZE must be at least 1");
        }

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(&var, "PORT", 8000)?,
            backend,
            openai_api_key: var("OPENAI_API_KEY"),
            embedding_model: var("OPENAI_EMBEDDING_MODEL")
                .unwrap_or_else(|| crate::infra::openai::DEFAULT_MODEL.to_string()),
            embeddings_db: var("EMBEDDINGS_DB"),
            doc_cache_ttl: Duration::from_secs(parse(&var, "DOC_CACHE_TTL_SECS", 300)?),
            doc_cache_capacity: parse(&var, "DOC_CACHE_CAPACITY", 256)?,
            default_page_size,
            cors_origins: var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|o| o.trim().to_string())
                        .filter(|o| !o.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse<T>(var: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match var(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid value for {}: {:?}", name, raw)),
        None => Ok(default),
    }
}
