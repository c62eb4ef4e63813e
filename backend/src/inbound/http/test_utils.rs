//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::{App, web};
use chrono::{TimeZone, Utc};

use crate::Trace;
use crate::domain::ports::{MockAccountQuery, MockLoginService, MockRegistrationService};
use crate::domain::{EmailAddress, PersonName, PhoneNumber, User, UserId, Username};
use crate::inbound::http::auth::auth_scope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::json_config;

/// Mocks for every driving port, with no expectations set.
#[derive(Default)]
pub struct MockPorts {
    pub registration: MockRegistrationService,
    pub login: MockLoginService,
    pub account: MockAccountQuery,
}

impl MockPorts {
    pub fn into_state(self) -> HttpState {
        HttpState::new(
            Arc::new(self.registration),
            Arc::new(self.login),
            Arc::new(self.account),
        )
    }
}

/// App with the auth routes, JSON error handling, and trace middleware.
pub fn auth_app(
    state: HttpState,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .wrap(Trace)
        .service(auth_scope())
}

/// The seeded account used across handler tests.
pub fn sample_user() -> User {
    User::builder(
        UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("user id"),
        Username::new("agustin").expect("username"),
        EmailAddress::new("agustineduran@gmail.com").expect("email"),
    )
    .name(PersonName::new("Agustín").expect("name"))
    .surname(PersonName::new("Durán").expect("surname"))
    .phone(PhoneNumber::new("2964547877").expect("phone"))
    .created_at(
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0)
            .single()
            .expect("timestamp"),
    )
    .build()
    .expect("user")
}
