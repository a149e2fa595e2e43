use artmachine::{logger, ArtError, GenerationRequest, RunpodClient};
use std::env;
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    match dotenv::dotenv() {
        Ok(_) => log::info!("✅ .env file loaded successfully"),
        Err(_) => log::warn!("⚠️  No .env file found, using system environment variables"),
    }

    logger::init_with_config(logger::LoggerConfig::development())?;

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || ["-h", "--help", "help"].contains(&args[1].as_str()) {
        show_help();
        return Ok(());
    }

    match args[1].as_str() {
        "wake" => wake().await,
        "workers" => workers(&args).await,
        #[cfg(feature = "server")]
        "serve" => serve(&args).await,
        #[cfg(not(feature = "server"))]
        "serve" => {
            log::error!("❌ The web backend is behind the \"server\" feature.");
            log::error!("💡 Rebuild with: cargo run --features server -- serve");
            Ok(())
        }
        _ => generate(&args).await,
    }
}

async fn generate(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let prompt = args[1].clone();
    let style = args.get(2).cloned();
    let model = args.get(3).cloned();

    log::info!("🎨 Starting the art machine...");
    log::info!("✨ Creating art with prompt: '{}'", prompt);
    if let Some(style) = &style {
        log::info!("🌻 Style: {}", style.to_uppercase());
    }

    let client = match RunpodClient::from_env() {
        Ok(client) => client,
        Err(e) => {
            log::error!("❌ {}", e);
            log::error!("💡 Copy .env.example to .env and fill in your RunPod credentials.");
            return Err(e.into());
        }
    };

    let mut request = GenerationRequest::new(&prompt);
    if let Some(style) = style {
        request = request.with_style(style);
    }
    if let Some(model) = model {
        request = request.with_model(model);
    }

    log::info!("🚀 Sending request to RunPod...");
    log::info!("⏳ Please wait, the GPU is painting your masterpiece...");

    match client.image().generate(request).await {
        Ok(result) => {
            log::info!("✅ Art generated successfully!");
            log::info!("📝 Enhanced prompt: '{}'", result.enhanced_prompt);

            let path = save_image(&result.media_data, &result.prompt)?;
            log::info!("💾 Image saved to: {}", path);
            log::info!("🎉 Success! Open {} to see your masterpiece!", path);
            Ok(())
        }
        Err(e) => {
            log::error!("❌ Error generating art: {}", e);
            if matches!(e, ArtError::TimeoutError(_)) {
                log::warn!(
                    "💡 Tip: the endpoint may be cold. Run `artmachine wake` and try again in a minute!"
                );
            }
            Err(e.into())
        }
    }
}

async fn wake() -> Result<(), Box<dyn std::error::Error>> {
    let client = RunpodClient::from_env()?;

    log::info!("🌟 Sending wake-up request to RunPod endpoint...");
    let report = client.admin().wake().await?;

    match report.job_id {
        Some(id) => log::info!("🎯 Job started! ID: {}", id),
        None if report.queued => log::info!("⏳ Job is in queue - workers are starting up!"),
        None => log::warn!("🤔 Endpoint accepted the request but returned no job id"),
    }
    log::info!("Workers are waking up! This might take 30-60 seconds the first time.");

    Ok(())
}

async fn workers(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let min: u32 = args.get(2).and_then(|v| v.parse().ok()).unwrap_or(1);
    let max: u32 = args.get(3).and_then(|v| v.parse().ok()).unwrap_or(3);

    let client = RunpodClient::from_env()?;

    log::info!("🔧 Setting worker limits to {}..{}...", min, max);
    match client.admin().set_worker_limits(min, max).await {
        Ok(limits) => {
            log::info!("🎉 Workers updated: min={}, max={}", limits.min, limits.max);
            log::info!("Wait 30-60 seconds and try generating!");
            Ok(())
        }
        Err(e) => {
            log::error!("❌ {}", e);
            log::warn!("😞 The API doesn't allow changing workers this way.");
            log::warn!("You'll need to do it in the RunPod console website.");
            Err(e.into())
        }
    }
}

#[cfg(feature = "server")]
async fn serve(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let config = artmachine::Config::from_env();
    logger::log_config_info(&config);

    let port = args
        .get(2)
        .and_then(|v| v.parse().ok())
        .or(config.port)
        .unwrap_or(8080);

    let client = RunpodClient::from_env()?;
    artmachine::server::run_server(client, port).await?;
    Ok(())
}

fn save_image(image_data: &str, prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    let image_bytes = base64::decode(image_data)?;

    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let filename = format!("art_{}_{}.png", safe_filename(prompt), timestamp);

    fs::write(&filename, image_bytes)?;
    Ok(filename)
}

/// Filename-safe slice of the prompt: alphanumerics, spaces, dashes and
/// underscores only, capped at 30 characters.
fn safe_filename(prompt: &str) -> String {
    prompt
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
        .take(30)
        .collect()
}

fn show_help() {
    println!(
        r#"
🎨 artmachine - RunPod art generation client 🌻

Usage:
    artmachine "<your prompt>" [style] [model]
    artmachine wake
    artmachine workers [min] [max]
    artmachine serve [port]        (requires the "server" feature)

Examples:
    artmachine "a garden with butterflies"
    artmachine "self-portrait with sunflowers" frida
    artmachine "Day of the Dead celebration" folk
    artmachine "workers and revolution" mural

Setup:
    1. Copy .env.example to .env
    2. Add your RUNPOD_API_KEY
    3. Add your RUNPOD_ENDPOINT_ID
    4. Run!
"#
    );

    println!("Styles available:");
    for (key, modifier) in RunpodClient::supported_styles() {
        println!("    {:<6} - {}", key, modifier);
    }

    println!("\nPipelines available:");
    for pipeline in RunpodClient::supported_pipelines() {
        println!("    {:<12} - {}", pipeline.id, pipeline.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_filename_strips_special_characters() {
        assert_eq!(
            safe_filename("Day of the Dead: celebration!"),
            "Day of the Dead celebration"
        );
        assert_eq!(safe_filename("self-portrait_1"), "self-portrait_1");
    }

    #[test]
    fn test_safe_filename_caps_length() {
        let long = "x".repeat(100);
        assert_eq!(safe_filename(&long).len(), 30);
    }
}
