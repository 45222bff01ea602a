//! Process configuration, read from the environment (and `.env`) at startup.
//! Nothing here is validated eagerly: a missing value only fails the
//! operation that needs it.

use crate::error::StoreError;
use crate::integration::AnalyzerConfig;
use crate::store::pg::PgConnector;
use crate::store::rest::RestConnector;
use crate::store::StoreConnector;

pub const API_BASE_URL: &str = "API_BASE_URL";
pub const API_BEARER_TOKEN: &str = "API_BEARER_TOKEN";
pub const SUPABASE_URL: &str = "SUPABASE_URL";
pub const SUPABASE_ANON_KEY: &str = "SUPABASE_ANON_KEY";
pub const DATABASE_URL: &str = "DATABASE_URL";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: Option<String>,
    pub api_bearer_token: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_anon_key: Option<String>,
    pub database_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup<F>(get: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        Self {
            api_base_url: var(API_BASE_URL),
            api_bearer_token: var(API_BEARER_TOKEN),
            supabase_url: var(SUPABASE_URL),
            supabase_anon_key: var(SUPABASE_ANON_KEY),
            database_url: var(DATABASE_URL),
        }
    }

    /// A `--dsn` flag wins over `DATABASE_URL`.
    pub fn with_dsn(mut self, dsn: Option<String>) -> Self {
        if dsn.is_some() {
            self.database_url = dsn;
        }
        self
    }

    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            base_url: self.api_base_url.clone(),
            bearer_token: self.api_bearer_token.clone(),
            ..AnalyzerConfig::default()
        }
    }

    /// Postgres when a DSN is configured, the hosted REST API otherwise.
    pub fn store_connector(&self) -> Result<Box<dyn StoreConnector>, StoreError> {
        match &self.database_url {
            Some(dsn) => Ok(Box::new(PgConnector::new(dsn)?)),
            None => Ok(Box::new(RestConnector::new(
                self.supabase_url.clone(),
                self.supabase_anon_key.clone(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn reads_all_settings() {
        let cfg = AppConfig::from_lookup(lookup(&[
            (API_BASE_URL, "https://api.example.com"),
            (API_BEARER_TOKEN, "t0k"),
            (SUPABASE_URL, "https://db.example.com"),
            (SUPABASE_ANON_KEY, "anon"),
        ]));
        assert_eq!(cfg.api_base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(cfg.api_bearer_token.as_deref(), Some("t0k"));
        assert_eq!(cfg.supabase_url.as_deref(), Some("https://db.example.com"));
        assert_eq!(cfg.supabase_anon_key.as_deref(), Some("anon"));
        assert!(cfg.database_url.is_none());

        let analyzer = cfg.analyzer_config();
        assert_eq!(analyzer.bearer_token.as_deref(), Some("t0k"));
        assert_eq!(analyzer.timeout.as_secs(), 120);
    }

    #[test]
    fn blank_values_are_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[(API_BEARER_TOKEN, "  "), (SUPABASE_URL, "")]));
        assert_eq!(cfg, AppConfig::default());
    }

    #[test]
    fn missing_store_settings_do_not_fail_startup() {
        let cfg = AppConfig::from_lookup(lookup(&[]));
        let connector = cfg.store_connector().unwrap();
        assert!(connector.connect().is_err());
    }

    #[test]
    fn dsn_flag_overrides_environment() {
        let cfg = AppConfig::from_lookup(lookup(&[(DATABASE_URL, "postgres://env/db")]))
            .with_dsn(Some("postgres://flag/db".into()));
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://flag/db"));

        let kept = AppConfig::from_lookup(lookup(&[(DATABASE_URL, "postgres://env/db")])).with_dsn(None);
        assert_eq!(kept.database_url.as_deref(), Some("postgres://env/db"));
    }
}
