mod analytics;
mod api;
mod app;
mod config;
mod content;
mod data;
mod error;
mod feedback;
mod gemini;
mod history;
mod models;
mod progression;
mod quests;
mod review;
mod srs;

use anyhow::Result;
use log::info;

use api::{app_router, ApiState};
use app::App;
use config::Config;
use content::ContentService;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    let content = ContentService::from_config(&config);
    let state = ApiState::new(App::new(), content);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    info!("LearnScape listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        log::warn!("Could not listen for Ctrl-C, running until killed");
        std::future::pending::<()>().await;
    }
}
