use async_trait::async_trait;

use crate::{
    error::Result,
    models::{GenerationRequest, GenerationResult, MediaKind},
    runpod::{dispatch::Dispatcher, generate_media, DispatchMode, MediaGenerator},
};

#[derive(Clone)]
pub struct ImageClient {
    dispatcher: Dispatcher,
    endpoint_id: String,
}

impl ImageClient {
    pub(crate) fn new(dispatcher: Dispatcher, endpoint_id: String) -> Self {
        Self {
            dispatcher,
            endpoint_id,
        }
    }

    /// Generate one image synchronously, with the bounded retry policy.
    pub async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        generate_media(
            &self.dispatcher,
            &self.endpoint_id,
            request,
            MediaKind::Image,
            DispatchMode::Sync,
        )
        .await
    }

    /// Alternative mode: submit to `/run` and poll the job status instead of
    /// holding one long synchronous call open.
    pub async fn generate_polling(&self, request: GenerationRequest) -> Result<GenerationResult> {
        generate_media(
            &self.dispatcher,
            &self.endpoint_id,
            request,
            MediaKind::Image,
            DispatchMode::Polling,
        )
        .await
    }
}

#[async_trait]
impl MediaGenerator for ImageClient {
    async fn generate(&self, request: GenerationRequest) -> Result<GenerationResult> {
        ImageClient::generate(self, request).await
    }

    fn media_kind(&self) -> MediaKind {
        MediaKind::Image
    }
}
