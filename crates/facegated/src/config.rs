use facegate_core::{ClassifyMode, GalleryOrder};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Service configuration, loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Inference service credential. Empty if unset; the service call will fail.
    pub api_key: String,
    /// Model name passed to `generateContent`.
    pub model: String,
    /// API root, without trailing slash.
    pub api_base_url: String,
    /// Directory holding one subdirectory per authorized person.
    pub gallery_dir: PathBuf,
    pub gallery_order: GalleryOrder,
    pub classify_mode: ClassifyMode,
    /// Address the HTTP server binds to.
    pub bind: SocketAddr,
    /// Timeout for the inference call.
    pub request_timeout: Duration,
    /// Maximum accepted upload body size in bytes.
    pub max_upload_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            gallery_dir: PathBuf::from("known_faces"),
            gallery_order: GalleryOrder::Sorted,
            classify_mode: ClassifyMode::Substring,
            bind: SocketAddr::from(([127, 0, 0, 1], 8501)),
            request_timeout: Duration::from_secs(60),
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from `FACEGATE_*` environment variables with defaults.
    ///
    /// The credential is read from `FACEGATE_API_KEY`, falling back to `API_KEY`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from any key lookup; `from_env` uses the process env.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_key = lookup("FACEGATE_API_KEY")
            .or_else(|| lookup("API_KEY"))
            .unwrap_or_default();

        Self {
            api_key,
            model: lookup("FACEGATE_MODEL").unwrap_or(defaults.model),
            api_base_url: lookup("FACEGATE_API_BASE_URL")
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            gallery_dir: lookup("FACEGATE_GALLERY_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.gallery_dir),
            gallery_order: parse_or(&lookup, "FACEGATE_GALLERY_ORDER", defaults.gallery_order),
            classify_mode: parse_or(&lookup, "FACEGATE_CLASSIFY_MODE", defaults.classify_mode),
            bind: parse_or(&lookup, "FACEGATE_BIND", defaults.bind),
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "FACEGATE_TIMEOUT_SECS",
                defaults.request_timeout.as_secs(),
            )),
            max_upload_bytes: parse_or(
                &lookup,
                "FACEGATE_MAX_UPLOAD_BYTES",
                defaults.max_upload_bytes,
            ),
        }
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => match raw.parse() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "invalid value; using default");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[]));
        assert_eq!(cfg.model, "gemini-2.5-flash");
        assert_eq!(cfg.gallery_dir, PathBuf::from("known_faces"));
        assert_eq!(cfg.gallery_order, GalleryOrder::Sorted);
        assert_eq!(cfg.classify_mode, ClassifyMode::Substring);
        assert_eq!(cfg.max_upload_bytes, 10 * 1024 * 1024);
        assert!(!cfg.has_api_key());
    }

    #[test]
    fn test_overrides() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("FACEGATE_API_KEY", "primary"),
            ("API_KEY", "legacy"),
            ("FACEGATE_MODEL", "gemini-2.0-pro"),
            ("FACEGATE_API_BASE_URL", "http://localhost:9000/v1/"),
            ("FACEGATE_GALLERY_DIR", "/srv/faces"),
            ("FACEGATE_GALLERY_ORDER", "listing"),
            ("FACEGATE_CLASSIFY_MODE", "exact"),
            ("FACEGATE_BIND", "0.0.0.0:9090"),
            ("FACEGATE_TIMEOUT_SECS", "5"),
            ("FACEGATE_MAX_UPLOAD_BYTES", "2048"),
        ]));
        assert_eq!(cfg.api_key, "primary");
        assert_eq!(cfg.model, "gemini-2.0-pro");
        assert_eq!(cfg.api_base_url, "http://localhost:9000/v1");
        assert_eq!(cfg.gallery_dir, PathBuf::from("/srv/faces"));
        assert_eq!(cfg.gallery_order, GalleryOrder::Listing);
        assert_eq!(cfg.classify_mode, ClassifyMode::Exact);
        assert_eq!(cfg.bind, SocketAddr::from(([0, 0, 0, 0], 9090)));
        assert_eq!(cfg.request_timeout, Duration::from_secs(5));
        assert_eq!(cfg.max_upload_bytes, 2048);
    }

    #[test]
    fn test_api_key_fallback() {
        let cfg = Config::from_lookup(lookup_from(&[("API_KEY", "legacy")]));
        assert_eq!(cfg.api_key, "legacy");
        assert!(cfg.has_api_key());
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("FACEGATE_GALLERY_ORDER", "random"),
            ("FACEGATE_CLASSIFY_MODE", "fuzzy"),
            ("FACEGATE_BIND", "not-an-addr"),
            ("FACEGATE_TIMEOUT_SECS", "-1"),
            ("FACEGATE_MAX_UPLOAD_BYTES", "lots"),
        ]));
        let defaults = Config::default();
        assert_eq!(cfg.gallery_order, defaults.gallery_order);
        assert_eq!(cfg.classify_mode, defaults.classify_mode);
        assert_eq!(cfg.bind, defaults.bind);
        assert_eq!(cfg.request_timeout, defaults.request_timeout);
        assert_eq!(cfg.max_upload_bytes, defaults.max_upload_bytes);
    }
}
