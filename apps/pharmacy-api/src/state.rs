//! Process-wide state shared by the non-domain routes.

use mongodb::Client;

/// Cloned into each handler; the client shares one connection pool
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
}
