use actix_web::http::{Method, StatusCode};
use actix_web::{web, App, HttpResponse, HttpServer};
use serde_json::{json, Value};

use crate::error::ArtError;
use crate::models::GenerationRequest;
use crate::runpod::{MediaGenerator, RunpodClient};

const CORS_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");

/// The one handler body both routes share, parameterized by the generator.
async fn handle_generate<G: MediaGenerator>(
    generator: &G,
    request: GenerationRequest,
) -> HttpResponse {
    match generator.generate(request).await {
        Ok(result) => {
            let mut body = serde_json::Map::new();
            body.insert(
                result.media_kind.response_key().to_string(),
                json!(result.media_data),
            );
            body.insert("prompt".to_string(), json!(result.prompt));
            body.insert("enhanced_prompt".to_string(), json!(result.enhanced_prompt));
            body.insert("style".to_string(), json!(result.style));

            HttpResponse::Ok()
                .insert_header(CORS_ORIGIN)
                .json(Value::Object(body))
        }
        Err(err) => {
            log::error!("generation failed: {}", err);
            error_response(&err)
        }
    }
}

fn error_response(err: &ArtError) -> HttpResponse {
    let status = StatusCode::from_u16(err.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    HttpResponse::build(status)
        .insert_header(CORS_ORIGIN)
        .json(json!({
            "error": err.to_string(),
            "category": err.category(),
        }))
}

async fn generate_image(
    client: web::Data<RunpodClient>,
    request: web::Json<GenerationRequest>,
) -> HttpResponse {
    handle_generate(client.image(), request.into_inner()).await
}

async fn generate_video(
    client: web::Data<RunpodClient>,
    request: web::Json<GenerationRequest>,
) -> HttpResponse {
    handle_generate(client.video(), request.into_inner()).await
}

/// CORS preflight: 200 with permissive headers, no body.
async fn preflight() -> HttpResponse {
    HttpResponse::Ok()
        .insert_header(CORS_ORIGIN)
        .insert_header(("Access-Control-Allow-Methods", "POST, OPTIONS"))
        .insert_header(("Access-Control-Allow-Headers", "Content-Type"))
        .finish()
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        actix_web::error::InternalError::from_response(
            err,
            HttpResponse::BadRequest()
                .insert_header(CORS_ORIGIN)
                .json(json!({
                    "error": "Invalid request format",
                    "category": "validation",
                })),
        )
        .into()
    })
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .route("/api/generate", web::post().to(generate_image))
        .route("/api/generate", web::method(Method::OPTIONS).to(preflight))
        .route("/api/generate-video", web::post().to(generate_video))
        .route(
            "/api/generate-video",
            web::method(Method::OPTIONS).to(preflight),
        );
}

pub async fn run_server(client: RunpodClient, port: u16) -> std::io::Result<()> {
    let data = web::Data::new(client);

    log::info!("🌐 Art backend listening on http://0.0.0.0:{}", port);

    HttpServer::new(move || App::new().app_data(data.clone()).configure(routes))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunpodConfig;
    use actix_web::{body::to_bytes, test};

    fn test_client() -> RunpodClient {
        // Points nowhere routable; only non-network paths are exercised.
        RunpodClient::new(
            RunpodConfig::new()
                .with_credentials("rp_test_key")
                .with_endpoint("endpoint123")
                .with_api_base("http://127.0.0.1:1"),
        )
        .unwrap()
    }

    #[actix_web::test]
    async fn test_preflight_has_permissive_cors() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_client()))
                .configure(routes),
        )
        .await;

        let request = test::TestRequest::with_uri("/api/generate")
            .method(Method::OPTIONS)
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );
        let body = to_bytes(response.into_body()).await.unwrap();
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn test_empty_prompt_is_bad_request_with_cors() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_client()))
                .configure(routes),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/generate")
            .set_json(json!({"prompt": "   "}))
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response
                .headers()
                .get("Access-Control-Allow-Origin")
                .and_then(|v| v.to_str().ok()),
            Some("*")
        );

        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body()).await.unwrap()).unwrap();
        assert_eq!(body["category"].as_str(), Some("validation"));
        assert!(body["error"].as_str().is_some());
    }

    #[actix_web::test]
    async fn test_invalid_json_body_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_client()))
                .configure(routes),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/generate-video")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("{not json")
            .to_request();
        let response = test::call_service(&app, request).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value =
            serde_json::from_slice(&to_bytes(response.into_body()).await.unwrap()).unwrap();
        assert_eq!(body["error"].as_str(), Some("Invalid request format"));
    }
}
