//! Builders wiring adapters into the HTTP state.

use std::sync::Arc;

use accounts::domain::AccountService;
use accounts::domain::ports::UserRepository;
use accounts::inbound::http::state::HttpState;
use accounts::outbound::memory::InMemoryUserRepository;
use accounts::outbound::persistence::DieselUserRepository;
use accounts::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};
use tracing::warn;

use super::ServerConfig;

fn state_with_repository<R>(users: R, config: &ServerConfig) -> HttpState
where
    R: UserRepository + 'static,
{
    let service = AccountService::new(
        Arc::new(users),
        Arc::new(Argon2PasswordHasher::default()),
        Arc::new(JwtTokenIssuer::new(&config.token_secret, config.token_ttl)),
    );
    HttpState::from_service(service)
}

/// Build handler state using PostgreSQL when a pool is configured, otherwise
/// the process-local store.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    match &config.db_pool {
        Some(pool) => state_with_repository(DieselUserRepository::new(pool.clone()), config),
        None => {
            warn!("no database configured; accounts are kept in memory and lost on restart");
            state_with_repository(InMemoryUserRepository::new(), config)
        }
    }
}
