mod api;
mod executor;
mod types;
mod web;

use log::info;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();
    info!("Starting crucible v{}", env!("CARGO_PKG_VERSION"));
    web::server::run_server().await
}
