//! Runtime configuration injected into the resolver.

use thiserror::Error;

/// ipinfo.io's "who am I" endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://ipinfo.io/json";

pub const TOKEN_ENV: &str = "IPINFO_TOKEN";
pub const ENDPOINT_ENV: &str = "LOCMAP_ENDPOINT";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid endpoint '{0}': expected an http:// or https:// URL")]
    InvalidEndpoint(String),
}

/// Lookup settings. Read once at startup and handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MapConfig {
    pub ipinfo_token: Option<String>,
    pub endpoint: String,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            ipinfo_token: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }
}

impl MapConfig {
    pub fn new(ipinfo_token: Option<String>, endpoint: Option<String>) -> Result<Self, ConfigError> {
        let endpoint = endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint));
        }
        let ipinfo_token = ipinfo_token
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Ok(Self { ipinfo_token, endpoint })
    }

    /// The full lookup URL. Without a token the request still goes out, just unauthenticated.
    pub fn lookup_url(&self) -> String {
        match &self.ipinfo_token {
            Some(token) => {
                let sep = if self.endpoint.contains('?') { '&' } else { '?' };
                format!("{}{}token={}", self.endpoint, sep, urlencode(token))
            }
            None => self.endpoint.clone(),
        }
    }
}

// ─── URL encoding (minimal, no extra dep) ───────────────────────

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}
