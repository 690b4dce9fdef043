use std::env;

use crate::error::AppError;
use crate::updater::{FailurePolicy, StalePolicy};

// Flask's default port, where the solar app serves `/get_timezone`
const DEFAULT_SERVICE_URL: &str = "http://localhost:5000";

const SERVICE_URL_VAR: &str = "TIMEZONE_SERVICE_URL";
const DISCARD_STALE_VAR: &str = "TIMEZONE_DISCARD_STALE";
const CLEAR_ON_FAILURE_VAR: &str = "TIMEZONE_CLEAR_ON_FAILURE";

/// Runtime settings of the updater.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the service exposing `/get_timezone`
    pub service_url: String,
    pub stale_policy: StalePolicy,
    pub failure_policy: FailurePolicy,
}

impl Config {
    /// Load the configuration from the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service_url = lookup(SERVICE_URL_VAR)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());

        let stale_policy = if flag(&lookup, DISCARD_STALE_VAR)? {
            StalePolicy::LatestRequestWins
        } else {
            StalePolicy::LastResolvedWins
        };

        let failure_policy = if flag(&lookup, CLEAR_ON_FAILURE_VAR)? {
            FailurePolicy::Clear
        } else {
            FailurePolicy::Keep
        };

        Ok(Self {
            service_url,
            stale_policy,
            failure_policy,
        })
    }
}

fn flag<F>(lookup: &F, name: &str) -> Result<bool, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(name) else {
        return Ok(false);
    };

    match value.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(AppError::InvalidConfig {
            name: name.to_string(),
            value,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, AppError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.service_url, "http://localhost:5000");
        assert_eq!(config.stale_policy, StalePolicy::LastResolvedWins);
        assert_eq!(config.failure_policy, FailurePolicy::Keep);
    }

    #[test]
    fn reads_all_variables() {
        let config = load(&[
            ("TIMEZONE_SERVICE_URL", "https://solar.example.com"),
            ("TIMEZONE_DISCARD_STALE", "Yes"),
            ("TIMEZONE_CLEAR_ON_FAILURE", "1"),
        ])
        .unwrap();

        assert_eq!(config.service_url, "https://solar.example.com");
        assert_eq!(config.stale_policy, StalePolicy::LatestRequestWins);
        assert_eq!(config.failure_policy, FailurePolicy::Clear);
    }

    #[test]
    fn blank_url_falls_back_to_default() {
        let config = load(&[("TIMEZONE_SERVICE_URL", "  ")]).unwrap();
        assert_eq!(config.service_url, "http://localhost:5000");
    }

    #[test]
    fn rejects_unknown_flag_value() {
        let err = load(&[("TIMEZONE_DISCARD_STALE", "maybe")]).unwrap_err();
        match err {
            AppError::InvalidConfig { name, value } => {
                assert_eq!(name, "TIMEZONE_DISCARD_STALE");
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
