//! Service settings read from the environment.

use thiserror::Error;

use crate::llm::{api_key_env_var, LLM, DEFAULT_MODEL};
use crate::telemetry::{Collector, DEFAULT_FILTER};

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_SUPABASE_URL: &str = "http://127.0.0.1:54321";
pub const DEFAULT_CORS_ORIGINS: &[&str] = &[
    "http://localhost:5173",
    "http://localhost:3000",
    "http://127.0.0.1:5173",
    "http://127.0.0.1:3000",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got '{value}'")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    /// `provider/model` of the crews' LLM.
    pub llm_model: String,
    pub llm_base_url: Option<String>,
    /// Key for the provider named in `llm_model`.
    pub llm_api_key: Option<String>,
    pub cors_origins: Vec<String>,
    /// Project name attached to traced sessions.
    pub project_name: Option<String>,
    /// OTLP collector (Phoenix) base URL; spans stay local when unset.
    pub collector_endpoint: Option<String>,
    pub log_filter: String,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build settings from any variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match get("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                expected: "a port number",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        let llm_model = get("LEXICREW_LLM").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let provider = llm_model
            .split_once('/')
            .map_or_else(|| "openai".to_string(), |(p, _)| p.to_lowercase());
        let llm_api_key = get(api_key_env_var(&provider));

        let cors_origins = match get("CORS_ORIGINS") {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CORS_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        Ok(Self {
            port,
            supabase_url: get("SUPABASE_URL").unwrap_or_else(|| DEFAULT_SUPABASE_URL.to_string()),
            supabase_anon_key: get("SUPABASE_ANON_KEY").unwrap_or_default(),
            llm_model,
            llm_base_url: get("LEXICREW_LLM_BASE_URL"),
            llm_api_key,
            cors_origins,
            project_name: get("PHOENIX_PROJECT_NAME"),
            collector_endpoint: get("PHOENIX_COLLECTOR_ENDPOINT"),
            log_filter: get("RUST_LOG").unwrap_or_else(|| DEFAULT_FILTER.to_string()),
        })
    }

    /// Where to export traced sessions, if anywhere.
    pub fn collector(&self) -> Option<Collector> {
        self.collector_endpoint.as_ref().map(|endpoint| Collector {
            endpoint: endpoint.clone(),
            project: self.project_name.clone(),
        })
    }

    /// LLM configuration for the crews.
    pub fn llm(&self) -> LLM {
        let mut llm = LLM::new(self.llm_model.clone());
        if let Some(ref key) = self.llm_api_key {
            llm = llm.api_key(key.clone());
        }
        if let Some(ref url) = self.llm_base_url {
            llm = llm.base_url(url.clone());
        }
        llm
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let s = settings(&[]).unwrap();
        assert_eq!(s.port, 8000);
        assert_eq!(s.supabase_url, "http://127.0.0.1:54321");
        assert_eq!(s.supabase_anon_key, "");
        assert_eq!(s.llm_model, "groq/llama-3.3-70b-versatile");
        assert!(s.llm_api_key.is_none());
        assert_eq!(s.cors_origins.len(), 4);
        assert_eq!(s.log_filter, "info,lexicrew=debug");
        assert!(s.project_name.is_none());
        assert!(s.collector().is_none());
    }

    #[test]
    fn test_overrides() {
        let s = settings(&[
            ("PORT", "9001"),
            ("GROQ_API_KEY", "gsk"),
            ("OPENAI_API_KEY", "sk"),
            ("CORS_ORIGINS", "https://app.example.com, ,http://localhost:4000"),
            ("PHOENIX_PROJECT_NAME", "vocab"),
        ])
        .unwrap();
        assert_eq!(s.port, 9001);
        assert_eq!(s.llm_api_key.as_deref(), Some("gsk"));
        assert_eq!(s.cors_origins, ["https://app.example.com", "http://localhost:4000"]);
        assert_eq!(s.project_name.as_deref(), Some("vocab"));
        assert_eq!(s.llm().api_key.as_deref(), Some("gsk"));
    }

    #[test]
    fn test_collector_carries_project() {
        let s = settings(&[
            ("PHOENIX_COLLECTOR_ENDPOINT", "http://localhost:6006"),
            ("PHOENIX_PROJECT_NAME", "vocab"),
        ])
        .unwrap();
        assert_eq!(
            s.collector(),
            Some(Collector {
                endpoint: "http://localhost:6006".to_string(),
                project: Some("vocab".to_string()),
            })
        );
    }

    #[test]
    fn test_key_follows_provider() {
        let s = settings(&[
            ("LEXICREW_LLM", "openai/gpt-4o-mini"),
            ("GROQ_API_KEY", "gsk"),
            ("OPENAI_API_KEY", "sk"),
        ])
        .unwrap();
        assert_eq!(s.llm_api_key.as_deref(), Some("sk"));
    }

    #[test]
    fn test_bad_port() {
        let err = settings(&[("PORT", "http")]).unwrap_err();
        assert_eq!(err.to_string(), "PORT must be a port number, got 'http'");
    }
}
