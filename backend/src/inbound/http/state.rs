//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{AccountQuery, LoginService, RegistrationService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub registration: Arc<dyn RegistrationService>,
    pub login: Arc<dyn LoginService>,
    pub account: Arc<dyn AccountQuery>,
}

impl HttpState {
    /// Construct state from individual ports.
    pub fn new(
        registration: Arc<dyn RegistrationService>,
        login: Arc<dyn LoginService>,
        account: Arc<dyn AccountQuery>,
    ) -> Self {
        Self {
            registration,
            login,
            account,
        }
    }

    /// Construct state from one service implementing every driving port.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use accounts::domain::AccountService;
    /// use accounts::inbound::http::state::HttpState;
    /// use accounts::outbound::memory::InMemoryUserRepository;
    /// use accounts::outbound::security::{Argon2PasswordHasher, JwtTokenIssuer};
    ///
    /// let service = AccountService::new(
    ///     Arc::new(InMemoryUserRepository::default()),
    ///     Arc::new(Argon2PasswordHasher::default()),
    ///     Arc::new(JwtTokenIssuer::new(b"secret", chrono::TimeDelta::hours(1))),
    /// );
    /// let state = HttpState::from_service(service);
    /// let _login = state.login.clone();
    /// ```
    pub fn from_service<S>(service: S) -> Self
    where
        S: RegistrationService + LoginService + AccountQuery + 'static,
    {
        let service = Arc::new(service);
        Self {
            registration: service.clone(),
            login: service.clone(),
            account: service,
        }
    }
}
