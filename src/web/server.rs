use actix_cors::Cors;
use actix_web::{
    http,
    web,
    App,
    HttpResponse,
    HttpServer,
    Responder,
};
use log::{
    error,
    info,
};
use std::net::Ipv4Addr;
use tokio::sync::Semaphore;

use crate::api::{
    check_version,
    get_execution_timeout,
    get_max_concurrent_executions,
    get_server_port,
    health_check,
    index,
};
use crate::executor::{
    CodeExecutor,
    LocalExecutor,
};
use crate::types::{
    ErrorBody,
    ExecutionError,
    ExecutionPayload,
};

async fn execute_code(
    limiter: web::Data<Semaphore>,
    payload: web::Json<ExecutionPayload>,
) -> impl Responder {
    // Admission control: never spawn more child processes than configured.
    let _permit = match limiter.try_acquire() {
        Ok(permit) => permit,
        Err(_) => {
            return HttpResponse::TooManyRequests().json(ErrorBody {
                error: "Too many concurrent executions.".to_string(),
            });
        }
    };

    info!(
        "Received request to execute {} code ({} bytes)",
        payload.language,
        payload.code.len()
    );

    match LocalExecutor::execute(&payload, get_execution_timeout()).await {
        Ok(result) => HttpResponse::Ok().json(result),
        Err(e) => {
            error!("Error executing code: {}", e);
            error_response(e)
        }
    }
}

fn error_response(error: ExecutionError) -> HttpResponse {
    let body = ErrorBody {
        error: error.to_string(),
    };
    match error {
        ExecutionError::InvalidRequest | ExecutionError::UnsupportedLanguage => {
            HttpResponse::BadRequest().json(body)
        }
        ExecutionError::Timeout => HttpResponse::RequestTimeout().json(body),
        ExecutionError::StagingError(_)
        | ExecutionError::CompileFailed(_)
        | ExecutionError::RuntimeFailed(_) => HttpResponse::InternalServerError().json(body),
    }
}

pub async fn run_server() -> std::io::Result<()> {
    let port = get_server_port();
    let server_address = (Ipv4Addr::UNSPECIFIED, port);
    let limiter = web::Data::new(Semaphore::new(get_max_concurrent_executions()));
    info!("Listening on {}:{}", server_address.0, server_address.1);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin_fn(|origin, _req_head| {
                if let Ok(origin_str) = origin.to_str() {
                    origin_str.ends_with(":5173") || origin_str.ends_with(":3000")
                } else {
                    false
                }
            })
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec![
                http::header::AUTHORIZATION,
                http::header::ACCEPT,
                http::header::CONTENT_TYPE,
            ])
            .max_age(3600);

        App::new()
            .wrap(cors)
            .app_data(limiter.clone())
            .route("/", web::get().to(index))
            .route("/run", web::post().to(execute_code))
            .route("/health", web::get().to(health_check))
            .route("/version", web::get().to(check_version))
    })
    .bind(server_address)?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::test;
    use serde_json::{
        json,
        Value,
    };

    fn limiter(permits: usize) -> web::Data<Semaphore> {
        web::Data::new(Semaphore::new(permits))
    }

    #[actix_web::test]
    async fn test_run_missing_fields() {
        let app = test::init_service(
            App::new()
                .app_data(limiter(4))
                .route("/run", web::post().to(execute_code)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/run")
            .set_json(json!({}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Language and code are required.");
    }

    #[actix_web::test]
    async fn test_run_unsupported_language() {
        let app = test::init_service(
            App::new()
                .app_data(limiter(4))
                .route("/run", web::post().to(execute_code)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/run")
            .set_json(json!({ "language": "ruby", "code": "puts 1" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unsupported language.");
    }

    #[actix_web::test]
    async fn test_run_python() {
        if which::which("python3").is_err() {
            return;
        }
        let app = test::init_service(
            App::new()
                .app_data(limiter(4))
                .route("/run", web::post().to(execute_code)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/run")
            .set_json(json!({ "language": "python", "code": "print('hi')" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["output"], "hi\n");
    }

    #[actix_web::test]
    async fn test_run_rejects_when_saturated() {
        let app = test::init_service(
            App::new()
                .app_data(limiter(0))
                .route("/run", web::post().to(execute_code)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/run")
            .set_json(json!({ "language": "python", "code": "print('hi')" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::TOO_MANY_REQUESTS);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Too many concurrent executions.");
    }

    #[::std::prelude::v1::test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_response(ExecutionError::InvalidRequest).status(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(ExecutionError::UnsupportedLanguage).status(),
            http::StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(ExecutionError::Timeout).status(),
            http::StatusCode::REQUEST_TIMEOUT
        );
        assert_eq!(
            error_response(ExecutionError::CompileFailed("boom".to_string())).status(),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_response(ExecutionError::RuntimeFailed("boom".to_string())).status(),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        assert_eq!(
            error_response(ExecutionError::StagingError(io)).status(),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_health_check() {
        let app = test::init_service(
            App::new().route("/health", web::get().to(health_check)),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(test::read_body(resp).await, "OK");
    }

    #[actix_web::test]
    async fn test_check_version() {
        let app = test::init_service(
            App::new().route("/version", web::get().to(check_version)),
        )
        .await;

        let req = test::TestRequest::get().uri("/version").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), http::StatusCode::OK);
        assert_eq!(test::read_body(resp).await, env!("CARGO_PKG_VERSION"));
    }
}
