use serde_json::{json, Value};

use crate::models::{PayloadStyle, PipelineConfig};

const NEGATIVE_PROMPT: &str = "blurry, low quality, distorted, static, frozen";
const FILENAME_PREFIX: &str = "artmachine";

/// Non-cryptographic seed; collisions across rapid calls are acceptable.
pub fn seed_from_clock() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Compose the upstream job payload for an already-enhanced prompt.
pub fn build_payload(enhanced_prompt: &str, pipeline: &PipelineConfig) -> Value {
    match pipeline.payload_style {
        PayloadStyle::DirectInput => json!({
            "input": {
                "prompt": enhanced_prompt,
                "num_inference_steps": pipeline.steps,
                "guidance_scale": pipeline.guidance_scale,
                "width": pipeline.width,
                "height": pipeline.height,
                "seed": seed_from_clock(),
            }
        }),
        PayloadStyle::ComfyWorkflow => json!({
            "input": {
                "workflow": comfy_workflow(enhanced_prompt, pipeline, seed_from_clock()),
            }
        }),
    }
}

/// Minimal job that spins the endpoint's workers up without doing real work.
pub fn wake_payload() -> Value {
    json!({
        "input": {
            "workflow": {}
        }
    })
}

/// ComfyUI node graph for workflow-style pipelines (text-to-video).
fn comfy_workflow(enhanced_prompt: &str, pipeline: &PipelineConfig, seed: i64) -> Value {
    json!({
        "6": {
            "inputs": {
                "text": enhanced_prompt,
                "clip": ["4", 1]
            },
            "class_type": "CLIPTextEncode",
            "_meta": {"title": "CLIP Text Encode (Positive)"}
        },
        "7": {
            "inputs": {
                "text": NEGATIVE_PROMPT,
                "clip": ["4", 1]
            },
            "class_type": "CLIPTextEncode",
            "_meta": {"title": "CLIP Text Encode (Negative)"}
        },
        "3": {
            "inputs": {
                "seed": seed,
                "steps": pipeline.steps,
                "cfg": pipeline.guidance_scale,
                "sampler_name": pipeline.sampler,
                "scheduler": pipeline.scheduler,
                "denoise": 1.0,
                "model": ["4", 0],
                "positive": ["6", 0],
                "negative": ["7", 0],
                "latent_image": ["5", 0]
            },
            "class_type": "KSampler",
            "_meta": {"title": "KSampler"}
        },
        "4": {
            "inputs": {
                "ckpt_name": pipeline.checkpoint.unwrap_or_default()
            },
            "class_type": "CheckpointLoaderSimple",
            "_meta": {"title": "Load Checkpoint"}
        },
        "5": {
            "inputs": {
                "width": pipeline.width,
                "height": pipeline.height,
                "batch_size": pipeline.frames.unwrap_or(1)
            },
            "class_type": "EmptyLatentImage",
            "_meta": {"title": "Empty Latent Image"}
        },
        "8": {
            "inputs": {
                "samples": ["3", 0],
                "vae": ["4", 2]
            },
            "class_type": "VAEDecode",
            "_meta": {"title": "VAE Decode"}
        },
        "9": {
            "inputs": {
                "filename_prefix": FILENAME_PREFIX,
                "images": ["8", 0]
            },
            "class_type": "SaveImage",
            "_meta": {"title": "Save Video"}
        }
    })
}
