use std::sync::Arc;

use crate::auth::TokenService;
use crate::config::Config;
use crate::store::{TaskStore, UserStore};

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tasks: Arc<dyn TaskStore>,
    pub tokens: Arc<TokenService>,
    pub config: Config,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, tasks: Arc<dyn TaskStore>, config: Config) -> Self {
        let tokens = Arc::new(TokenService::new(&config.access_token_secret));
        AppState {
            users,
            tasks,
            tokens,
            config,
        }
    }
}
