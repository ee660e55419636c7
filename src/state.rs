use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn},
    notify::{EventEmitter, Notifier},
};

/// Shared application state. The notification and realtime collaborators are
/// injected here so tests can substitute recording implementations.
#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: Arc<AppConfig>,
    pub notifier: Arc<dyn Notifier>,
    pub events: Arc<dyn EventEmitter>,
}
