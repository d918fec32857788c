//! Design desk server entry point.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use design_desk::inbound::http::health::HealthState;
use design_desk::inbound::http::session_config::{BuildMode, session_settings_from_env};
use design_desk::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use server::{AppSettings, ServerConfig, create_server};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load_from_iter(std::env::args_os())
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::current())
        .map_err(std::io::Error::other)?;
    info!(
        key_fingerprint = %session.key_fingerprint(),
        cookie_secure = session.cookie_secure,
        "session settings loaded"
    );

    let mut config = ServerConfig::new(
        session.key,
        session.cookie_secure,
        session.same_site,
        bind_addr,
    )
    .with_media_root(settings.media_root.clone());

    if let Some(url) = settings.database_url() {
        if settings.run_migrations {
            let owned = url.to_owned();
            let applied = tokio::task::spawn_blocking(move || run_migrations(&owned))
                .await
                .map_err(std::io::Error::other)?
                .map_err(std::io::Error::other)?;
            info!(count = applied.len(), "database migrations applied");
        }
        let pool = DbPool::new(
            PoolConfig::new(url).with_max_size(settings.db_max_connections()),
        )
        .await
        .map_err(std::io::Error::other)?;
        config = config.with_db_pool(pool);
    }

    #[cfg(feature = "metrics")]
    let config = match server::build_metrics() {
        Ok(metrics) => config.with_metrics(Some(metrics)),
        Err(error) => {
            warn!(%error, "metrics disabled");
            config
        }
    };

    let health_state = web::Data::new(HealthState::new());
    info!(%bind_addr, "starting server");
    create_server(health_state, config)?.await
}
