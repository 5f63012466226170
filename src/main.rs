use std::sync::Arc;

mod auth;
mod config;
mod content;
mod geo;
mod handler;
mod http;
mod logger;
mod server;
mod store;

/// Config file used when none is given on the command line (extension optional)
const DEFAULT_CONFIG: &str = "config";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG.to_string());
    let cfg = config::Config::load_from(&config_path)?;
    logger::init(&cfg)?;

    // Worker threads from config, CPU cores otherwise
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;
    let state = Arc::new(config::AppState::from_config(&cfg)?);

    logger::log_server_start(&addr, &cfg);
    if state.config.auth.sessions.is_empty() {
        logger::log_warning("No sessions configured under [auth.sessions]; every POST will redirect to login");
    }

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local.run_until(server::start_server_loop(listener, state)).await;
    Ok(())
}
