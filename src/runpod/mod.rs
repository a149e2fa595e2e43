pub mod admin_client;
pub mod dispatch;
pub mod image_client;
pub mod normalize;
pub mod payload;
pub mod video_client;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{RunpodConfig, DEFAULT_API_BASE, DEFAULT_GRAPHQL_URL},
    error::{ArtError, Result},
    models::{ArtStyle, GenerationRequest, GenerationResult, MediaKind, PipelineConfig, PipelineInfo},
};

pub use admin_client::AdminClient;
pub use dispatch::{Dispatcher, JobState};
pub use image_client::ImageClient;
pub use video_client::VideoClient;

/// How a generation call reaches the endpoint: one blocking `/runsync` call
/// per attempt, or `/run` followed by status polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    Sync,
    Polling,
}

/// Anything that turns a prompt into one media payload. Lets handler code be
/// written once and parameterized by the concrete client.
#[async_trait]
pub trait MediaGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult>;
    fn media_kind(&self) -> MediaKind;
}

/// The one shared generation path: validate, resolve style and pipeline,
/// compose the payload, dispatch with the bounded retry policy, normalize.
pub(crate) async fn generate_media(
    dispatcher: &Dispatcher,
    endpoint_id: &str,
    request: GenerationRequest,
    kind: MediaKind,
    mode: DispatchMode,
) -> Result<GenerationResult> {
    let prompt = request.validate()?.to_string();
    let style = request
        .style
        .as_deref()
        .map(ArtStyle::from_key)
        .unwrap_or_default();
    let pipeline = PipelineConfig::resolve(request.model.as_deref(), kind);
    let enhanced_prompt = style.enhance(&prompt, kind == MediaKind::Video);

    log::info!(
        "generating {:?} with pipeline '{}', style '{}'",
        kind,
        pipeline.id,
        style.as_str()
    );
    log::debug!("enhanced prompt: '{}'", enhanced_prompt);

    let payload = payload::build_payload(&enhanced_prompt, pipeline);

    let _timer = crate::logger::timer(&format!("runpod {} generation", pipeline.id));
    let body = match mode {
        DispatchMode::Sync => dispatcher.run_sync(endpoint_id, &payload).await?,
        DispatchMode::Polling => dispatcher.run_polling(endpoint_id, &payload).await?,
    };

    let media_data = normalize::extract_media(&body)?;

    Ok(GenerationResult {
        media_data,
        media_kind: kind,
        prompt,
        enhanced_prompt,
        style: style.as_str().to_string(),
        model: pipeline.id.to_string(),
    })
}

#[derive(Clone)]
pub struct RunpodClient {
    image_client: ImageClient,
    video_client: VideoClient,
    admin_client: AdminClient,
}

impl RunpodClient {
    pub fn new(config: RunpodConfig) -> Result<Self> {
        let api_key = required(config.api_key, "RunPod API key")?;
        let endpoint_id = required(config.endpoint_id, "RunPod endpoint id")?;

        // The video workflow may run on its own endpoint; without one it
        // shares the image endpoint.
        let video_endpoint_id = config
            .video_endpoint_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .unwrap_or_else(|| endpoint_id.clone());

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();
        let graphql_url = config
            .graphql_url
            .unwrap_or_else(|| DEFAULT_GRAPHQL_URL.to_string());

        let dispatcher = Dispatcher::new(Client::new(), api_key, api_base, graphql_url);

        Ok(Self {
            image_client: ImageClient::new(dispatcher.clone(), endpoint_id.clone()),
            video_client: VideoClient::new(dispatcher.clone(), video_endpoint_id),
            admin_client: AdminClient::new(dispatcher, endpoint_id),
        })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(RunpodConfig::from_env())
    }

    pub fn image(&self) -> &ImageClient {
        &self.image_client
    }

    pub fn video(&self) -> &VideoClient {
        &self.video_client
    }

    pub fn admin(&self) -> &AdminClient {
        &self.admin_client
    }

    pub fn supported_pipelines() -> Vec<PipelineInfo> {
        PipelineConfig::all().map(|p| p.info()).collect()
    }

    pub fn supported_styles() -> Vec<(&'static str, &'static str)> {
        ArtStyle::all()
            .iter()
            .map(|s| (s.as_str(), s.modifier()))
            .collect()
    }
}

fn required(value: Option<String>, what: &str) -> Result<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .ok_or_else(|| {
            ArtError::ConfigError(format!(
                "{} is required; set it in .env or the environment",
                what
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> RunpodConfig {
        RunpodConfig::new()
            .with_credentials("rp_test_key")
            .with_endpoint("endpoint123")
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let result = RunpodClient::new(RunpodConfig::new().with_endpoint("endpoint123"));
        assert!(matches!(result, Err(ArtError::ConfigError(_))));
    }

    #[test]
    fn test_missing_endpoint_is_config_error() {
        let result = RunpodClient::new(RunpodConfig::new().with_credentials("rp_test_key"));
        assert!(matches!(result, Err(ArtError::ConfigError(_))));
    }

    #[test]
    fn test_whitespace_credentials_are_rejected() {
        let config = RunpodConfig::new()
            .with_credentials("   ")
            .with_endpoint("endpoint123");
        assert!(matches!(
            RunpodClient::new(config),
            Err(ArtError::ConfigError(_))
        ));
    }

    #[test]
    fn test_valid_config_builds_client() {
        assert!(RunpodClient::new(configured()).is_ok());
    }

    #[tokio::test]
    async fn test_empty_prompt_fails_before_any_network_call() {
        // api_base points nowhere routable; validation must fire first.
        let client = RunpodClient::new(
            configured().with_api_base("http://127.0.0.1:1"),
        )
        .unwrap();

        let result = client
            .image()
            .generate(GenerationRequest::new("   "))
            .await;
        assert!(matches!(result, Err(ArtError::ValidationError(_))));
    }

    #[test]
    fn test_supported_listings() {
        let pipelines = RunpodClient::supported_pipelines();
        assert_eq!(pipelines.len(), 2);
        let styles = RunpodClient::supported_styles();
        assert_eq!(styles.len(), 3);
    }
}
