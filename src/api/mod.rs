use actix_web::{
    HttpResponse,
    Responder,
};

use std::env;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_MS: u64 = 5000;
const DEFAULT_MAX_CONCURRENT: usize = 16;

pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Crucible code execution API")
}

pub async fn health_check() -> impl Responder {
    HttpResponse::Ok().body("OK")
}

pub async fn check_version() -> impl Responder {
    HttpResponse::Ok().body(env!("CARGO_PKG_VERSION"))
}

pub fn get_server_port() -> u16 {
    env::var("APP_PORT")
        .unwrap_or_else(|_| DEFAULT_PORT.to_string())
        .parse()
        .unwrap_or(DEFAULT_PORT)
}

/// Wall-clock budget for one execution, compile time included.
pub fn get_execution_timeout() -> Duration {
    let ms = env::var("EXECUTION_TIMEOUT_MS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    Duration::from_millis(ms)
}

pub fn get_max_concurrent_executions() -> usize {
    env::var("MAX_CONCURRENT_EXECUTIONS")
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(DEFAULT_MAX_CONCURRENT)
}
