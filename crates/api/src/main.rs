use std::sync::Arc;

use talentbridge_infra::config::AppConfig;
use talentbridge_infra::sweep::spawn_deactivation_sweep;
use talentbridge_infra::tasks::{WorkerConfig, spawn_notification_worker};

#[tokio::main]
async fn main() {
    talentbridge_observability::init();

    // Configuration is validated once; an incomplete environment refuses to
    // start rather than limping along.
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "refusing to start");
            std::process::exit(1);
        }
    };

    let services = match talentbridge_api::app::services::build_services(&config).await {
        Ok(services) => Arc::new(services),
        Err(error) => {
            tracing::error!(%error, "failed to initialize services");
            std::process::exit(1);
        }
    };

    let _notifications = spawn_notification_worker(
        services.notifications.clone(),
        services.mailer.clone(),
        WorkerConfig::default(),
    );
    let _sweep = spawn_deactivation_sweep(services.jobs.clone(), config.sweep_interval);

    let app = talentbridge_api::app::build_app(services, config.jwt_secret.clone());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {e}", config.bind_addr));

    tracing::info!("listening on {}", listener.local_addr().unwrap());

    axum::serve(listener, app).await.unwrap();
}
