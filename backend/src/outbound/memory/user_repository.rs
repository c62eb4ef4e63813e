//! `UserRepository` backed by a mutex-guarded map.
//!
//! Data lives only as long as the process. The uniqueness check and the
//! insert happen under one lock, matching the guarantees of the database
//! constraints.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{EmailAddress, PasswordHash, User, UserAccount, UserId, Username};

/// Volatile user store for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<Uuid, UserAccount>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, UserAccount>>, UserPersistenceError> {
        self.accounts
            .lock()
            .map_err(|_| UserPersistenceError::query("user store lock poisoned"))
    }

    fn find<P>(&self, predicate: P) -> Result<Option<UserAccount>, UserPersistenceError>
    where
        P: Fn(&UserAccount) -> bool,
    {
        let accounts = self.lock()?;
        Ok(accounts.values().find(|account| predicate(account)).cloned())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(
        &self,
        user: &User,
        password_hash: &PasswordHash,
    ) -> Result<(), UserPersistenceError> {
        let mut accounts = self.lock()?;
        for existing in accounts.values() {
            if existing.user.username() == user.username() {
                return Err(UserPersistenceError::username_taken());
            }
            if existing.user.email() == user.email() {
                return Err(UserPersistenceError::email_taken());
            }
        }
        if accounts.contains_key(user.id().as_uuid()) {
            return Err(UserPersistenceError::query("duplicate user id"));
        }

        accounts.insert(
            *user.id().as_uuid(),
            UserAccount {
                user: user.clone(),
                password_hash: password_hash.clone(),
            },
        );
        debug!(user_id = %user.id(), total = accounts.len(), "stored user in memory");
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let accounts = self.lock()?;
        Ok(accounts
            .get(id.as_uuid())
            .map(|account| account.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        self.find(|account| account.user.username() == username)
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<UserAccount>, UserPersistenceError> {
        self.find(|account| account.user.email() == email)
    }

    async fn username_exists(&self, username: &Username) -> Result<bool, UserPersistenceError> {
        Ok(self.find_by_username(username).await?.is_some())
    }

    async fn email_exists(&self, email: &EmailAddress) -> Result<bool, UserPersistenceError> {
        Ok(self.find_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::{PersonName, PhoneNumber};
    use rstest::{fixture, rstest};

    fn user(username: &str, email: &str) -> User {
        User::builder(
            UserId::random(),
            Username::new(username).expect("username"),
            EmailAddress::new(email).expect("email"),
        )
        .name(PersonName::new("Satoshi").expect("name"))
        .surname(PersonName::new("Nakamoto").expect("surname"))
        .phone(PhoneNumber::new("5349546546387").expect("phone"))
        .build()
        .expect("user")
    }

    #[fixture]
    fn hash() -> PasswordHash {
        PasswordHash::new("$argon2id$stored")
    }

    #[rstest]
    #[tokio::test]
    async fn stores_and_finds_accounts(hash: PasswordHash) {
        let repo = InMemoryUserRepository::new();
        let stored = user("snakamoto", "satoshi-nakamoto@gmail.com");
        repo.insert(&stored, &hash).await.expect("insert");

        let by_id = repo.find_by_id(stored.id()).await.expect("lookup");
        let by_name = repo
            .find_by_username(stored.username())
            .await
            .expect("lookup")
            .expect("present");
        let by_email = repo
            .find_by_email(stored.email())
            .await
            .expect("lookup")
            .expect("present");

        assert_eq!(by_id, Some(stored.clone()));
        assert_eq!(by_name.user, stored);
        assert_eq!(by_name.password_hash, hash);
        assert_eq!(by_email.user, stored);
        assert!(repo.username_exists(stored.username()).await.expect("exists"));
        assert!(repo.email_exists(stored.email()).await.expect("exists"));
    }

    #[rstest]
    #[tokio::test]
    async fn usernames_are_case_sensitive(hash: PasswordHash) {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("snakamoto", "satoshi@gmail.com"), &hash)
            .await
            .expect("insert");

        let other = Username::new("SNakamoto").expect("username");
        assert!(!repo.username_exists(&other).await.expect("exists"));
    }

    #[rstest]
    #[case::username("snakamoto", "other@gmail.com", UserPersistenceError::username_taken())]
    #[case::email("other", "satoshi@gmail.com", UserPersistenceError::email_taken())]
    #[tokio::test]
    async fn rejects_duplicates(
        hash: PasswordHash,
        #[case] username: &str,
        #[case] email: &str,
        #[case] expected: UserPersistenceError,
    ) {
        let repo = InMemoryUserRepository::new();
        repo.insert(&user("snakamoto", "satoshi@gmail.com"), &hash)
            .await
            .expect("insert");

        let error = repo
            .insert(&user(username, email), &hash)
            .await
            .expect_err("duplicate");

        assert_eq!(error, expected);
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inserts_admit_one_winner(hash: PasswordHash) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = Arc::clone(&repo);
                let hash = hash.clone();
                tokio::spawn(async move {
                    repo.insert(&user("vbuterin", "vitalik@gmail.com"), &hash)
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.expect("task").is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
    }

    #[rstest]
    #[tokio::test]
    async fn missing_accounts_are_none() {
        let repo = InMemoryUserRepository::new();

        assert_eq!(repo.find_by_id(&UserId::random()).await.expect("lookup"), None);
        let email = EmailAddress::new("nobody@gmail.com").expect("email");
        assert!(repo.find_by_email(&email).await.expect("lookup").is_none());
    }
}
