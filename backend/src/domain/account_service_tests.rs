//! Tests for the account service.

use std::sync::Arc;

use super::*;
use crate::domain::ports::{MockPasswordHasher, MockTokenIssuer, MockUserRepository};
use crate::domain::{ErrorCode, PasswordHash, PersonName, PhoneNumber, RegistrationForm};
use mockall::predicate::eq;
use rstest::rstest;
use serde_json::json;

type Service = AccountService<MockUserRepository, MockPasswordHasher, MockTokenIssuer>;

fn make_service(
    repo: MockUserRepository,
    hasher: MockPasswordHasher,
    tokens: MockTokenIssuer,
) -> Service {
    AccountService::new(Arc::new(repo), Arc::new(hasher), Arc::new(tokens))
}

fn registration() -> Registration {
    Registration::try_from_form(&RegistrationForm {
        username: "vbuterin".into(),
        password: "123456".into(),
        password_confirmation: "123456".into(),
        name: "Vitalik".into(),
        surname: "Buterin".into(),
        email: "Vitalik-Buterin@gmail.com".into(),
        phone: "5349546546387".into(),
    })
    .expect("valid registration")
}

fn stored_account() -> UserAccount {
    let user = User::builder(
        UserId::random(),
        Username::new("agustin").expect("username"),
        EmailAddress::new("agustineduran@gmail.com").expect("email"),
    )
    .name(PersonName::new("Agustín").expect("name"))
    .surname(PersonName::new("Durán").expect("surname"))
    .phone(PhoneNumber::new("2964547877").expect("phone"))
    .build()
    .expect("user");
    UserAccount {
        user,
        password_hash: PasswordHash::new("$argon2id$stored"),
    }
}

fn credentials(identifier: &str, password: &str) -> LoginCredentials {
    LoginCredentials::try_from_parts(identifier, password).expect("credentials")
}

#[tokio::test]
async fn register_hashes_password_and_inserts_user() {
    let mut repo = MockUserRepository::new();
    repo.expect_username_exists().times(1).return_once(|_| Ok(false));
    repo.expect_email_exists()
        .withf(|email| email.as_ref() == "vitalik-buterin@gmail.com")
        .times(1)
        .return_once(|_| Ok(false));
    repo.expect_insert()
        .withf(|user, hash| user.username().as_ref() == "vbuterin" && hash.as_str() == "hashed")
        .times(1)
        .return_once(|_, _| Ok(()));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .withf(|password| password == "123456")
        .times(1)
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let service = make_service(repo, hasher, MockTokenIssuer::new());
    let user = service.register(registration()).await.expect("registered");

    assert_eq!(user.username().as_ref(), "vbuterin");
    assert_eq!(user.email().as_ref(), "vitalik-buterin@gmail.com");
    assert_eq!(user.phone().as_ref(), "5349546546387");
}

#[rstest]
#[case::username(true, false, "username")]
#[case::email(false, true, "email")]
#[tokio::test]
async fn register_rejects_taken_identity(
    #[case] username_taken: bool,
    #[case] email_taken: bool,
    #[case] field: &str,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_username_exists()
        .return_once(move |_| Ok(username_taken));
    repo.expect_email_exists()
        .return_once(move |_| Ok(email_taken));
    repo.expect_insert().never();
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_hash().never();

    let service = make_service(repo, hasher, MockTokenIssuer::new());
    let error = service.register(registration()).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), format!("{field} is already taken"));
    assert_eq!(
        error.details(),
        Some(&json!([{
            "field": field,
            "code": "taken",
            "message": format!("{field} is already taken"),
        }]))
    );
}

#[rstest]
#[case::username(UserPersistenceError::username_taken(), "username")]
#[case::email(UserPersistenceError::email_taken(), "email")]
#[tokio::test]
async fn register_maps_racing_insert_to_conflict(
    #[case] failure: UserPersistenceError,
    #[case] field: &str,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_username_exists().return_once(|_| Ok(false));
    repo.expect_email_exists().return_once(|_| Ok(false));
    repo.expect_insert().return_once(move |_, _| Err(failure));
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_hash()
        .return_once(|_| Ok(PasswordHash::new("hashed")));

    let service = make_service(repo, hasher, MockTokenIssuer::new());
    let error = service.register(registration()).await.expect_err("conflict");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(error.message(), format!("{field} is already taken"));
}

#[rstest]
#[case::connection(UserPersistenceError::connection("refused"), ErrorCode::ServiceUnavailable)]
#[case::query(UserPersistenceError::query("syntax"), ErrorCode::InternalError)]
#[tokio::test]
async fn register_maps_repository_failures(
    #[case] failure: UserPersistenceError,
    #[case] expected: ErrorCode,
) {
    let mut repo = MockUserRepository::new();
    repo.expect_username_exists()
        .return_once(move |_| Err(failure));

    let service = make_service(repo, MockPasswordHasher::new(), MockTokenIssuer::new());
    let error = service.register(registration()).await.expect_err("failure");

    assert_eq!(error.code(), expected);
}

#[tokio::test]
async fn login_by_username_issues_token() {
    let account = stored_account();
    let user_id = account.user.id().clone();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .withf(|username| username.as_ref() == "agustin")
        .return_once(move |_| Ok(Some(account)));
    repo.expect_find_by_email().never();
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify()
        .withf(|password, hash| password == "123456" && hash.as_str() == "$argon2id$stored")
        .return_once(|_, _| Ok(true));
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .with(eq(user_id))
        .return_once(|_| Ok(AuthToken::new("signed.jwt.token")));

    let service = make_service(repo, hasher, tokens);
    let token = service
        .login(&credentials("agustin", "123456"))
        .await
        .expect("login");

    assert_eq!(token.as_str(), "signed.jwt.token");
}

#[tokio::test]
async fn login_falls_back_to_email() {
    let account = stored_account();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    repo.expect_find_by_email()
        .withf(|email| email.as_ref() == "agustineduran@gmail.com")
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().return_once(|_, _| Ok(true));
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_issue()
        .return_once(|_| Ok(AuthToken::new("token")));

    let service = make_service(repo, hasher, tokens);
    let result = service
        .login(&credentials("AgustinEDuran@gmail.com", "123456"))
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn login_unknown_user_runs_decoy_and_fails_uniformly() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    repo.expect_find_by_email().never();
    let mut hasher = MockPasswordHasher::new();
    hasher
        .expect_verify_decoy()
        .times(1)
        .return_once(|_| Ok(()));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().never();

    let service = make_service(repo, hasher, tokens);
    let error = service
        .login(&credentials("satoshi-nakamoto", "123456"))
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_CREDENTIALS);
}

#[tokio::test]
async fn login_wrong_password_fails_uniformly() {
    let account = stored_account();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username()
        .return_once(move |_| Ok(Some(account)));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify().return_once(|_, _| Ok(false));
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_issue().never();

    let service = make_service(repo, hasher, tokens);
    let error = service
        .login(&credentials("agustin", "12345678"))
        .await
        .expect_err("wrong password");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_CREDENTIALS);
}

#[tokio::test]
async fn login_with_injection_shaped_identifier_is_unknown_user() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_username().return_once(|_| Ok(None));
    let mut hasher = MockPasswordHasher::new();
    hasher.expect_verify_decoy().return_once(|_| Ok(()));

    let service = make_service(repo, hasher, MockTokenIssuer::new());
    let error = service
        .login(&credentials("' OR '1'='1", "' OR '1'='1"))
        .await
        .expect_err("unknown user");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
}

#[tokio::test]
async fn authenticated_user_resolves_token_subject() {
    let account = stored_account();
    let user = account.user.clone();
    let user_id = user.id().clone();
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(user_id.clone()))
        .return_once(move |_| Ok(Some(user)));
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .withf(|token| token == "token")
        .return_once(move |_| Ok(user_id));

    let service = make_service(repo, MockPasswordHasher::new(), tokens);
    let resolved = service.authenticated_user("token").await.expect("user");

    assert_eq!(resolved, account.user);
}

#[rstest]
#[case::expired(TokenError::expired())]
#[case::forged(TokenError::invalid("InvalidSignature"))]
#[tokio::test]
async fn authenticated_user_rejects_bad_tokens(#[case] failure: TokenError) {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().never();
    let mut tokens = MockTokenIssuer::new();
    tokens.expect_verify().return_once(move |_| Err(failure));

    let service = make_service(repo, MockPasswordHasher::new(), tokens);
    let error = service
        .authenticated_user("token")
        .await
        .expect_err("rejected");

    assert_eq!(error.code(), ErrorCode::Unauthorized);
    assert_eq!(error.message(), INVALID_TOKEN);
}

#[tokio::test]
async fn authenticated_user_rejects_deleted_accounts() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().return_once(|_| Ok(None));
    let mut tokens = MockTokenIssuer::new();
    tokens
        .expect_verify()
        .return_once(|_| Ok(UserId::random()));

    let service = make_service(repo, MockPasswordHasher::new(), tokens);
    let error = service
        .authenticated_user("token")
        .await
        .expect_err("missing user");

    assert_eq!(error.message(), INVALID_TOKEN);
}
