use std::sync::Arc;

use crate::auth::SessionManager;
use crate::config::Config;
use crate::gateway::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Gateway,
    pub config: Arc<Config>,
    pub sessions: Arc<SessionManager>,
}
