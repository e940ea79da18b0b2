use std::sync::Arc;

use catalog::proxy::CardProxy;
use catalog::transport::ReqwestTransport;
use gallery::videos::VideoLookup;
use models::settings::Settings;
use tcp::router::{AppState, Router};
use tcp::server::ServerInstance;
use utils::errors::ServerError;
use utils::logger::Logger;

mod catalog;
mod gallery;
mod models;
mod tcp;
mod utils;

#[tokio::main]
async fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(error) => {
            logger!(ERROR, "[SERVER] {error}");
            std::process::exit(1);
        }
    };

    if let Ok(level) = settings.log_level() {
        Logger::set_level(level);
    }

    if let Err(error) = serve(settings).await {
        logger!(ERROR, "[SERVER] {error}");
        std::process::exit(1);
    }
}

async fn serve(settings: Settings) -> Result<(), ServerError> {
    let credential = settings.credential();
    if credential.resolve().is_none() {
        logger!(
            WARN,
            "[SERVER] `{}` is not set; /api/cards will answer 500 until it is",
            &settings.api_key_env
        );
    }

    let videos = VideoLookup::builtin();
    logger!(DEBUG, "[SERVER] Loaded {} preview videos", videos.len());

    let router = Router::new(AppState {
        proxy: CardProxy::new(ReqwestTransport::new(), settings.catalog_url.clone(), credential),
        videos,
        background_url: settings.background_url.clone(),
    });

    let server = ServerInstance::create_instance(&settings.host, settings.port, router).await?;
    Arc::new(server).run().await;
    Ok(())
}
