//! Account API handlers.
//!
//! ```text
//! POST /auth/register {"username":"vbuterin","password":"123456","password-confirmation":"123456",...}
//! POST /auth/login {"username":"vbuterin","password":"123456"}
//! GET /auth/me  (Authorization: Bearer <token>)
//! ```

use actix_web::{HttpResponse, Scope, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{LoginCredentials, Registration, RegistrationForm, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::bearer::BearerToken;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::validation_error;

/// Registration request body for `POST /auth/register`.
///
/// Every field is optional at the wire level so missing fields surface as
/// `required` violations instead of a body parse failure.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "vbuterin")]
    pub username: Option<String>,
    #[schema(example = "123456")]
    pub password: Option<String>,
    #[schema(example = "123456")]
    #[serde(rename = "password-confirmation")]
    pub password_confirmation: Option<String>,
    #[schema(example = "Vitalik")]
    pub name: Option<String>,
    #[schema(example = "Buterin")]
    pub surname: Option<String>,
    #[schema(example = "vitalik-buterin@gmail.com")]
    pub email: Option<String>,
    #[schema(example = "5349546546387")]
    pub phone: Option<String>,
}

impl From<RegisterRequest> for RegistrationForm {
    fn from(value: RegisterRequest) -> Self {
        Self {
            username: value.username.unwrap_or_default(),
            password: value.password.unwrap_or_default(),
            password_confirmation: value.password_confirmation.unwrap_or_default(),
            name: value.name.unwrap_or_default(),
            surname: value.surname.unwrap_or_default(),
            email: value.email.unwrap_or_default(),
            phone: value.phone.unwrap_or_default(),
        }
    }
}

/// Login request body for `POST /auth/login`.
///
/// `username` accepts either a username or an email address.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "agustin")]
    pub username: Option<String>,
    #[schema(example = "123456")]
    pub password: Option<String>,
}

/// Public view of a user; never carries credential material.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
    pub phone: String,
    /// RFC 3339 creation timestamp.
    #[schema(example = "2024-05-01T12:00:00Z")]
    pub created_at: String,
}

impl From<&User> for UserBody {
    fn from(user: &User) -> Self {
        Self {
            id: user.id().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            name: user.name().to_string(),
            surname: user.surname().to_string(),
            phone: user.phone().to_string(),
            created_at: user.created_at().to_rfc3339(),
        }
    }
}

/// Success envelope carrying a user.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = true)]
    pub success: bool,
    pub user: UserBody,
}

impl UserResponse {
    fn new(user: &User) -> Self {
        Self {
            success: true,
            user: user.into(),
        }
    }
}

/// Success envelope carrying a bearer token.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginResponse {
    #[schema(example = true)]
    pub success: bool,
    pub token: String,
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid input or username/email already taken", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let form = RegistrationForm::from(payload.into_inner());
    let registration = Registration::try_from_form(&form).map_err(|err| validation_error(&err))?;
    let user = state.registration.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::new(&user)))
}

/// Exchange a username or email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 201, description = "Login success", body = LoginResponse),
        (status = 400, description = "Missing username or password", body = ErrorEnvelope),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope),
        (status = 503, description = "Storage unavailable", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let LoginRequest { username, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(
        username.as_deref().unwrap_or_default(),
        password.as_deref().unwrap_or_default(),
    )
    .map_err(|err| validation_error(&err))?;
    let token = state.login.login(&credentials).await?;
    Ok(HttpResponse::Created().json(LoginResponse {
        success: true,
        token: token.into(),
    }))
}

/// Return the account a bearer token belongs to.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 500, description = "Internal server error", body = ErrorEnvelope)
    ),
    tags = ["auth"],
    operation_id = "me",
    security(("BearerToken" = []))
)]
#[get("/me")]
pub async fn me(state: web::Data<HttpState>, token: BearerToken) -> ApiResult<HttpResponse> {
    let user = state.account.authenticated_user(token.as_str()).await?;
    Ok(HttpResponse::Ok().json(UserResponse::new(&user)))
}

/// Routes mounted under `/auth`.
pub fn auth_scope() -> Scope {
    web::scope("/auth")
        .service(register)
        .service(login)
        .service(me)
}
