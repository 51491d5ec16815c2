use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::web;
use serde_json::{json, Map};

use crate::app_state::AppState;
use crate::auth::TOKEN_COOKIE;
use crate::config::Config;
use crate::store::memory::MemoryStore;

pub fn test_config() -> Config {
    Config::for_tests()
}

pub fn state_with(config: Config) -> (web::Data<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let state = AppState::new(store.clone(), store.clone(), config);
    (web::Data::new(state), store)
}

/// A signed `token` cookie for `email`.
pub fn session_cookie(state: &AppState, email: &str) -> Cookie<'static> {
    let mut claims = Map::new();
    claims.insert("email".to_string(), json!(email));
    let token = state.tokens.issue(claims).unwrap();
    Cookie::new(TOKEN_COOKIE, token)
}
