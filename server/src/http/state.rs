use crate::storage::Provider;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub provider: Provider,
}
