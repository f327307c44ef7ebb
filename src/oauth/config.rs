use std::time::Duration;

/// Default device-flow configuration for GitHub
#[derive(Clone, Debug)]
pub struct Config {
    /// Device authorization endpoint
    pub device_code_url: String,
    /// Token polling endpoint
    pub token_url: String,
    /// OAuth scopes to request
    pub scopes: Vec<String>,
    /// Poll interval used when the host omits one
    pub default_interval: Duration,
    /// Interval increase applied on `slow_down` (RFC 8628 section 3.5)
    pub slow_down_increment: Duration,
}

impl Config {
    /// Build a configuration whose endpoints live on the given host
    pub fn for_host(host: &str) -> Self {
        let host = host.trim_end_matches('/');
        let base = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };

        Self {
            device_code_url: format!("{}/login/device/code", base),
            token_url: format!("{}/login/oauth/access_token", base),
            ..Self::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_code_url: "https://github.com/login/device/code".to_string(),
            token_url: "https://github.com/login/oauth/access_token".to_string(),
            scopes: vec!["repo".to_string(), "read:org".to_string()],
            default_interval: Duration::from_secs(5),
            slow_down_increment: Duration::from_secs(5),
        }
    }
}
