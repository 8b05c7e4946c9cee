use std::sync::Arc;

use nomad_store::app_config::BusinessRules;
use nomad_trips::TripLifecycleManager;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub trips: Arc<TripLifecycleManager>,
    pub auth: AuthConfig,
    pub business_rules: BusinessRules,
}
