//! Wire types and configuration shared by the volley client and server.

use chrono::{DateTime, Utc};

/// The unit of data exchanged between client and server: a send timestamp
/// plus a large random text blob. Built fresh for every request attempt and
/// never persisted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Payload {
    #[serde(rename = "sentTime")]
    pub sent_time: DateTime<Utc>,
    pub contents: String,
}

pub mod config {
    use std::env;

    /// Harness settings, overridable through `VOLLEY_*` environment
    /// variables. The defaults are the stock run shape: 100 workers posting
    /// 10 MiB payloads to port 8080.
    #[derive(Debug, Clone)]
    pub struct HarnessConfig {
        pub listen_port: u16,
        pub diag_port: u16,
        pub target_url: String,
        pub payload_mb: usize,
        pub workers: usize,
        pub throttle_secs: u64,
        pub max_backoff_secs: u64,
    }

    impl Default for HarnessConfig {
        fn default() -> Self {
            Self {
                listen_port: 8080,
                diag_port: 6060,
                target_url: String::from("http://localhost:8080/"),
                payload_mb: 10,
                workers: 100,
                throttle_secs: 1,
                max_backoff_secs: 10,
            }
        }
    }

    impl HarnessConfig {
        pub fn load() -> Self {
            let mut cfg = Self::default();
            if let Some(v) = env::var("VOLLEY_LISTEN_PORT").ok().and_then(|v| v.parse().ok()) { cfg.listen_port = v; }
            if let Some(v) = env::var("VOLLEY_DIAG_PORT").ok().and_then(|v| v.parse().ok()) { cfg.diag_port = v; }
            if let Ok(url) = env::var("VOLLEY_TARGET_URL") { cfg.target_url = url; }
            if let Some(v) = env::var("VOLLEY_PAYLOAD_MB").ok().and_then(|v| v.parse().ok()) { cfg.payload_mb = v; }
            if let Some(v) = env::var("VOLLEY_WORKERS").ok().and_then(|v| v.parse().ok()) { cfg.workers = v; }
            if let Some(v) = env::var("VOLLEY_THROTTLE_SECS").ok().and_then(|v| v.parse().ok()) { cfg.throttle_secs = v; }
            if let Some(v) = env::var("VOLLEY_MAX_BACKOFF_SECS").ok().and_then(|v| v.parse().ok()) { cfg.max_backoff_secs = v; }
            cfg
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_through_json() {
        let payload = Payload {
            sent_time: Utc::now(),
            contents: String::from("abcXYZ0123456789"),
        };
        let wire = serde_json::to_string(&payload).unwrap();
        assert!(wire.contains("\"sentTime\""));
        assert!(wire.contains("\"contents\""));

        let back: Payload = serde_json::from_str(&wire).unwrap();
        assert_eq!(back.contents, payload.contents);
        assert_eq!(back.sent_time, payload.sent_time);
    }

    #[test]
    fn config_defaults_match_the_stock_run_shape() {
        let cfg = config::HarnessConfig::default();
        assert_eq!(cfg.listen_port, 8080);
        assert_eq!(cfg.payload_mb, 10);
        assert_eq!(cfg.workers, 100);
        assert_eq!(cfg.throttle_secs, 1);
        assert_eq!(cfg.max_backoff_secs, 10);
    }
}
