//! Portal entry-point: reads settings, wires adapters and serves HTTP.

use std::io;
use std::sync::Arc;

use mockable::{DefaultClock, DefaultEnv};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use portal::domain::ports::FixtureLoginService;
use portal::inbound::http::state::HttpState;
use portal::inbound::http::views::Views;
use portal::outbound::DiskPhotoStore;
use portal::server::{AppSettings, ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::from_env(&DefaultEnv::new()).map_err(io::Error::other)?;
    let config = ServerConfig::from_settings(&settings).map_err(io::Error::other)?;
    let photos = DiskPhotoStore::open(&settings.upload_dir).map_err(io::Error::other)?;
    let views = Views::load(&settings.views_dir).map_err(io::Error::other)?;

    let http_state = HttpState::new(
        Arc::new(FixtureLoginService),
        Arc::new(photos),
        Arc::new(DefaultClock),
    );
    create_server(http_state, Arc::new(views), config)?.await
}
