//! Client-side configuration.
//!
//! Defaults come from the environment:
//! - `PARKVIEW_API_URL` (default `http://127.0.0.1:5000`)
//! - `PARKVIEW_AVAILABILITY`: `local` or `server` (default `server`)
//! - `PARKVIEW_SELECTION_POLICY`: `grey` or `normal` (default `grey`)
//! - `PARKVIEW_FETCH_TIMEOUT_SECS` (default 10)
//! - `PARKVIEW_FOCUS_ZOOM`: zoom when panning to a selection (default: keep
//!   the map's current zoom)

use std::time::Duration;

use crate::availability::AvailabilityMode;
use crate::selection::SelectionPolicy;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:5000";

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub availability_mode: AvailabilityMode,
    pub selection_policy: SelectionPolicy,
    pub request_timeout: Duration,
    /// Zoom level used when panning to a selected lot. `None` keeps the
    /// current zoom.
    pub focus_zoom: Option<u8>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
}

impl ClientConfig {
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: lookup("PARKVIEW_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            availability_mode: parse_or_default(&lookup, "PARKVIEW_AVAILABILITY"),
            selection_policy: parse_or_default(&lookup, "PARKVIEW_SELECTION_POLICY"),
            request_timeout: Duration::from_secs(
                lookup("PARKVIEW_FETCH_TIMEOUT_SECS")
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(10),
            ),
            focus_zoom: lookup("PARKVIEW_FOCUS_ZOOM").and_then(|raw| match raw.parse::<u8>() {
                Ok(zoom) => Some(zoom),
                Err(e) => {
                    tracing::warn!(key = "PARKVIEW_FOCUS_ZOOM", error = %e, "Ignoring invalid configuration value");
                    None
                }
            }),
        }
    }
}

fn parse_or_default<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> T
where
    T: std::str::FromStr<Err = String> + Default,
{
    match lookup(key).map(|raw| raw.parse::<T>()) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            tracing::warn!(key, error = %e, "Ignoring invalid configuration value");
            T::default()
        }
        None => T::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> ClientConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config_from(&[]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.availability_mode, AvailabilityMode::Server);
        assert_eq!(config.selection_policy, SelectionPolicy::GreyOthers);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.focus_zoom, None);
    }

    #[test]
    fn environment_overrides() {
        let config = config_from(&[
            ("PARKVIEW_API_URL", "http://lots.example:8080"),
            ("PARKVIEW_AVAILABILITY", "local"),
            ("PARKVIEW_SELECTION_POLICY", "normal"),
            ("PARKVIEW_FETCH_TIMEOUT_SECS", "3"),
            ("PARKVIEW_FOCUS_ZOOM", "17"),
        ]);
        assert_eq!(config.api_url, "http://lots.example:8080");
        assert_eq!(config.availability_mode, AvailabilityMode::Local);
        assert_eq!(config.selection_policy, SelectionPolicy::KeepOthersNormal);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.focus_zoom, Some(17));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config_from(&[
            ("PARKVIEW_AVAILABILITY", "sometimes"),
            ("PARKVIEW_FETCH_TIMEOUT_SECS", "soon"),
            ("PARKVIEW_FOCUS_ZOOM", "far"),
        ]);
        assert_eq!(config.availability_mode, AvailabilityMode::Server);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.focus_zoom, None);
    }
}
