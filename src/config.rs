use std::env;

pub const DEFAULT_API_BASE: &str = "https://api.runpod.ai";
pub const DEFAULT_GRAPHQL_URL: &str = "https://api.runpod.io/graphql";

#[derive(Debug, Clone)]
pub struct RunpodConfig {
    pub api_key: Option<String>,
    pub endpoint_id: Option<String>,
    pub video_endpoint_id: Option<String>,
    pub api_base: Option<String>,
    pub graphql_url: Option<String>,
}

impl Default for RunpodConfig {
    fn default() -> Self {
        RunpodConfig {
            api_key: None,
            endpoint_id: None,
            video_endpoint_id: None,
            api_base: None,
            graphql_url: None,
        }
    }
}

impl RunpodConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("RUNPOD_API_KEY").ok();
        let endpoint_id = env::var("RUNPOD_ENDPOINT_ID").ok();
        let video_endpoint_id = env::var("RUNPOD_VIDEO_ENDPOINT_ID").ok();
        let api_base = env::var("RUNPOD_API_BASE").ok();
        let graphql_url = env::var("RUNPOD_GRAPHQL_URL").ok();

        RunpodConfig {
            api_key,
            endpoint_id,
            video_endpoint_id,
            api_base,
            graphql_url,
        }
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint_id: impl Into<String>) -> Self {
        self.endpoint_id = Some(endpoint_id.into());
        self
    }

    pub fn with_video_endpoint(mut self, endpoint_id: impl Into<String>) -> Self {
        self.video_endpoint_id = Some(endpoint_id.into());
        self
    }

    pub fn with_api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = Some(base.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: Option<u16>,
    pub runpod: Option<RunpodConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: None,
            runpod: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            port,
            runpod: Some(RunpodConfig::from_env()),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_runpod(mut self, config: RunpodConfig) -> Self {
        self.runpod = Some(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let config = RunpodConfig::new()
            .with_credentials("rp_test_key")
            .with_endpoint("abc123")
            .with_video_endpoint("vid456")
            .with_api_base("https://example.test");

        assert_eq!(config.api_key.as_deref(), Some("rp_test_key"));
        assert_eq!(config.endpoint_id.as_deref(), Some("abc123"));
        assert_eq!(config.video_endpoint_id.as_deref(), Some("vid456"));
        assert_eq!(config.api_base.as_deref(), Some("https://example.test"));
    }

    #[test]
    fn test_default_is_empty() {
        let config = RunpodConfig::default();
        assert!(config.api_key.is_none());
        assert!(config.endpoint_id.is_none());
        assert!(config.video_endpoint_id.is_none());
    }

    #[test]
    fn test_top_level_config() {
        let config = Config::new()
            .with_port(3000)
            .with_runpod(RunpodConfig::new().with_credentials("k"));
        assert_eq!(config.port, Some(3000));
        assert!(config.runpod.is_some());
    }
}
