use std::net::SocketAddr;
use std::sync::Arc;

use ssecast::config::load_config;
use ssecast::hub::BroadcastHub;
use ssecast::transport::http;
use ssecast::utils::logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logging::init("info");

    let config = load_config().expect("Failed to load configuration");
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .expect("Invalid listen address");

    let hub = Arc::new(BroadcastHub::new(config.hub.session_buffer));
    if let Err(err) = http::serve(addr, hub, &config).await {
        tracing::error!(error = %err, "server exited with error");
        std::process::exit(1);
    }
}
