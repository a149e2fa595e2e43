use async_trait::async_trait;

use crate::{
    error::Result,
    models::{GenerationRequest, GenerationResult, MediaKind},
    runpod::{dispatch::Dispatcher, generate_media, DispatchMode, MediaGenerator},
};

/// Video generation runs the same path as images; the pipeline registry
/// supplies the workflow payload and the style layer adds motion text.
#[derive(Clone)]
pub struct VideoClient {
    dispatcher: Dispatcher,
    endpoint_id: String,
}

impl VideoClient {
    pub(crate) fn new(dispatcher: Dispatcher, endpoint_id: String) -> Self {
        Self {
            dispatcher,
            endpoint_id,
        }
    }

    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        generate_media(
            &self.dispatcher,
            &self.endpoint_id,
            request,
            MediaKind::Video,
            DispatchMode::Sync,
        )
        .await
    }

    pub async fn generate_polling(&self, request: GenerationRequest) -> Result<GenerationResult> {
        generate_media(
            &self.dispatcher,
            &self.endpoint_id,
            request,
            MediaKind::Video,
            DispatchMode::Polling,
        )
        .await
    }
}

#[async_trait]
impl MediaGenerator for VideoClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        VideoClient::generate(self, request).await
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Video
    }
}
