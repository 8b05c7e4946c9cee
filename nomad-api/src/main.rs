use std::net::SocketAddr;
use std::sync::Arc;

use nomad_api::{app, state::{AppState, AuthConfig}};
use nomad_availability::AvailabilityIndex;
use nomad_store::{InMemoryReservationRepository, InMemoryTripRepository};
use nomad_trips::{ReservationCoordinator, TripLifecycleManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nomad_api=debug,tower_http=debug,axum::rejection=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = nomad_store::app_config::Config::load().expect("Failed to load config");
    tracing::info!("Starting Nomad API on port {}", config.server.port);

    let index = Arc::new(AvailabilityIndex::new());
    let reservations = Arc::new(InMemoryReservationRepository::new());
    let trips = Arc::new(InMemoryTripRepository::new());
    let coordinator = ReservationCoordinator::new(index.clone(), reservations);
    let manager = Arc::new(TripLifecycleManager::new(trips, coordinator, index));

    let app_state = AppState {
        trips: manager,
        auth: AuthConfig {
            secret: config.auth.jwt_secret.clone(),
            expiration: config.auth.jwt_expiration_seconds,
        },
        business_rules: config.business_rules.clone(),
    };

    let app = app(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
