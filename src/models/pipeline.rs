use crate::models::common::{MediaKind, PipelineInfo};

/// How a pipeline's job payload is shaped on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStyle {
    /// Flat `{"input": {"prompt", "num_inference_steps", ...}}` parameters.
    DirectInput,
    /// Full ComfyUI node graph under `{"input": {"workflow": {...}}}`.
    ComfyWorkflow,
}

/// A named, fixed configuration of model and sampling parameters.
/// The set is closed and known at build time.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub id: &'static str,
    pub name: &'static str,
    pub kind: MediaKind,
    pub payload_style: PayloadStyle,
    pub steps: u32,
    pub guidance_scale: f64,
    pub width: u32,
    pub height: u32,
    pub sampler: &'static str,
    pub scheduler: &'static str,
    pub checkpoint: Option<&'static str>,
    pub frames: Option<u32>,
    pub description: &'static str,
}

/// Flux text-to-image, the least resource-intensive pipeline and therefore
/// the fallback for unrecognized model keys.
pub const FLUX: PipelineConfig = PipelineConfig {
    id: "flux",
    name: "Flux",
    kind: MediaKind::Image,
    payload_style: PayloadStyle::DirectInput,
    steps: 25,
    guidance_scale: 7.5,
    width: 1024,
    height: 1024,
    sampler: "euler",
    scheduler: "normal",
    checkpoint: None,
    frames: None,
    description: "Flux text-to-image, 1024x1024",
};

pub const ANIMATEDIFF: PipelineConfig = PipelineConfig {
    id: "animatediff",
    name: "AnimateDiff",
    kind: MediaKind::Video,
    payload_style: PayloadStyle::ComfyWorkflow,
    steps: 25,
    guidance_scale: 7.5,
    width: 512,
    height: 512,
    sampler: "euler",
    scheduler: "normal",
    checkpoint: Some("sd_v15_mm_sd_v15.ckpt"),
    frames: Some(16),
    description: "AnimateDiff text-to-video, 512x512, 16 frames",
};

const REGISTRY: &[&PipelineConfig] = &[&FLUX, &ANIMATEDIFF];

impl PipelineConfig {
    /// Resolve a user-supplied model key. Unknown keys fall back to the
    /// default pipeline for the requested media kind instead of failing,
    /// as does a key naming a pipeline of the wrong kind.
    pub fn resolve(key: Option<&str>, kind: MediaKind) -> &'static PipelineConfig {
        let fallback = Self::default_for(kind);
        match key {
            Some(key) => REGISTRY
                .iter()
                .find(|p| p.id == key.trim().to_lowercase() && p.kind == kind)
                .copied()
                .unwrap_or(fallback),
            None => fallback,
        }
    }

    pub fn default_for(kind: MediaKind) -> &'static PipelineConfig {
        match kind {
            MediaKind::Image => &FLUX,
            MediaKind::Video => &ANIMATEDIFF,
        }
    }

    pub fn all() -> impl Iterator<Item = &'static PipelineConfig> {
        REGISTRY.iter().copied()
    }

    pub fn info(&self) -> PipelineInfo {
        PipelineInfo {
            id: self.id.to_string(),
            name: self.name.to_string(),
            kind: self.kind,
            description: self.description.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_keys_resolve() {
        assert_eq!(PipelineConfig::resolve(Some("flux"), MediaKind::Image).id, "flux");
        assert_eq!(
            PipelineConfig::resolve(Some("animatediff"), MediaKind::Video).id,
            "animatediff"
        );
    }

    #[test]
    fn test_unknown_key_falls_back_to_default() {
        let pipeline = PipelineConfig::resolve(Some("sdxl-turbo"), MediaKind::Image);
        assert_eq!(pipeline.id, "flux");
        let pipeline = PipelineConfig::resolve(None, MediaKind::Image);
        assert_eq!(pipeline.id, "flux");
    }

    #[test]
    fn test_kind_mismatch_falls_back() {
        // "animatediff" names a video pipeline, so the image surface ignores it.
        let pipeline = PipelineConfig::resolve(Some("animatediff"), MediaKind::Image);
        assert_eq!(pipeline.id, "flux");
        let pipeline = PipelineConfig::resolve(Some("flux"), MediaKind::Video);
        assert_eq!(pipeline.id, "animatediff");
    }

    #[test]
    fn test_defaults_per_kind() {
        assert_eq!(PipelineConfig::default_for(MediaKind::Image).id, "flux");
        assert_eq!(PipelineConfig::default_for(MediaKind::Video).id, "animatediff");
    }

    #[test]
    fn test_registry_is_closed_and_consistent() {
        let ids: Vec<&str> = PipelineConfig::all().map(|p| p.id).collect();
        assert_eq!(ids, vec!["flux", "animatediff"]);
        for pipeline in PipelineConfig::all() {
            if pipeline.kind == MediaKind::Video {
                assert!(pipeline.frames.is_some());
                assert!(pipeline.checkpoint.is_some());
            }
        }
    }
}
