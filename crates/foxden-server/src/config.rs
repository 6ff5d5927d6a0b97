//! Server configuration, loaded from environment variables at startup.

use std::path::PathBuf;

use foxden_api::kv::{ENV_KV_TOKEN, ENV_KV_URL};
use foxden_core::config::ENV_API_KEY;

/// Runtime configuration for foxden-server.
///
/// Every field has a default so the server starts without any
/// environment set: no auth, no durable store.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// Shared write credential. `None` accepts any writer.
    pub api_key: Option<String>,

    /// REST key-value store. Used only when both are set.
    pub kv_url: Option<String>,
    pub kv_token: Option<String>,

    /// Keep records in process memory when no REST store is configured.
    pub memory_store: bool,

    /// Static site document served at `/data.json`.
    pub data_file: Option<PathBuf>,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        Self {
            bind_address: get("FOXDEN_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_owned()),
            api_key: get(ENV_API_KEY),
            kv_url: get(ENV_KV_URL),
            kv_token: get(ENV_KV_TOKEN),
            memory_store: get("FOXDEN_MEMORY_STORE").is_some_and(|v| is_truthy(&v)),
            data_file: get("FOXDEN_DATA_FILE").map(PathBuf::from),
            log_level: get("FOXDEN_LOG").unwrap_or_else(|| "info".to_owned()),
            log_json: get("FOXDEN_LOG_JSON").is_some_and(|v| is_truthy(&v)),
        }
    }

    /// Whether the REST store is fully configured.
    pub fn kv_configured(&self) -> bool {
        self.kv_url.is_some() && self.kv_token.is_some()
    }
}

fn is_truthy(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.bind_address, "0.0.0.0:3000");
        assert!(cfg.api_key.is_none());
        assert!(!cfg.kv_configured());
        assert!(!cfg.memory_store);
        assert!(cfg.data_file.is_none());
        assert_eq!(cfg.log_level, "info");
        assert!(!cfg.log_json);
    }

    #[test]
    fn test_kv_needs_both_variables() {
        assert!(!config(&[(ENV_KV_URL, "https://kv.example")]).kv_configured());
        assert!(!config(&[(ENV_KV_TOKEN, "t")]).kv_configured());
        assert!(config(&[(ENV_KV_URL, "https://kv.example"), (ENV_KV_TOKEN, "t")]).kv_configured());
    }

    #[test]
    fn test_empty_values_are_unset() {
        let cfg = config(&[(ENV_API_KEY, ""), ("FOXDEN_BIND", "")]);
        assert!(cfg.api_key.is_none());
        assert_eq!(cfg.bind_address, "0.0.0.0:3000");
    }

    #[test]
    fn test_flags() {
        let cfg = config(&[
            ("FOXDEN_MEMORY_STORE", "true"),
            ("FOXDEN_LOG_JSON", "1"),
            ("FOXDEN_DATA_FILE", "public/data.json"),
            (ENV_API_KEY, "secret"),
        ]);
        assert!(cfg.memory_store);
        assert!(cfg.log_json);
        assert_eq!(cfg.data_file, Some(PathBuf::from("public/data.json")));
        assert_eq!(cfg.api_key.as_deref(), Some("secret"));

        assert!(!config(&[("FOXDEN_MEMORY_STORE", "no")]).memory_store);
    }
}
