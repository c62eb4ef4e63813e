//! Argon2id implementation of the `PasswordHasher` port.
//!
//! Hashes are PHC strings (`$argon2id$v=19$...`) carrying their own salt and
//! parameters, so verification works across parameter changes. All hashing
//! runs on the blocking pool with the caller's trace id in scope.

use std::sync::{Arc, OnceLock};

use argon2::password_hash::{self, PasswordHash as PhcHash, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, PasswordVerifier as _, Version};
use async_trait::async_trait;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{PasswordHashError, PasswordHasher};
use crate::domain::{PasswordHash, TraceId};

const SALT_LEN: usize = 16;

/// Argon2id hasher with a lazily computed decoy hash for unknown users.
#[derive(Debug, Clone)]
pub struct Argon2PasswordHasher {
    params: Params,
    decoy: Arc<OnceLock<String>>,
}

impl Default for Argon2PasswordHasher {
    /// Argon2id v19 with the crate's recommended parameters.
    fn default() -> Self {
        Self {
            params: Params::default(),
            decoy: Arc::new(OnceLock::new()),
        }
    }
}

impl Argon2PasswordHasher {
    /// Hasher with explicit cost parameters.
    ///
    /// # Errors
    ///
    /// Returns [`PasswordHashError::Hashing`] when Argon2 rejects the
    /// parameters.
    ///
    /// # Examples
    /// ```
    /// use accounts::outbound::security::Argon2PasswordHasher;
    ///
    /// let cheap = Argon2PasswordHasher::with_cost(1024, 1, 1).expect("valid parameters");
    /// # let _ = cheap;
    /// assert!(Argon2PasswordHasher::with_cost(0, 0, 0).is_err());
    /// ```
    pub fn with_cost(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordHashError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
        Ok(Self {
            params,
            decoy: Arc::new(OnceLock::new()),
        })
    }

    fn argon2(params: Params) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
    }
}

fn hash_with(params: Params, password: &[u8]) -> Result<String, PasswordHashError> {
    let mut salt_bytes = [0_u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
    let hash = Argon2PasswordHasher::argon2(params)
        .hash_password(password, &salt)
        .map_err(|err| PasswordHashError::hashing(err.to_string()))?;
    Ok(hash.to_string())
}

fn verify_with(params: Params, password: &[u8], encoded: &str) -> Result<bool, PasswordHashError> {
    let parsed =
        PhcHash::new(encoded).map_err(|err| PasswordHashError::malformed(err.to_string()))?;
    match Argon2PasswordHasher::argon2(params).verify_password(password, &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(PasswordHashError::hashing(err.to_string())),
    }
}

/// Run CPU heavy work on the blocking pool, keeping the trace id in scope.
async fn blocking<F, R>(work: F) -> Result<R, PasswordHashError>
where
    F: FnOnce() -> Result<R, PasswordHashError> + Send + 'static,
    R: Send + 'static,
{
    let trace_id = TraceId::current();
    tokio::task::spawn_blocking(move || match trace_id {
        Some(id) => TraceId::sync_scope(id, work),
        None => work(),
    })
    .await
    .map_err(|err| PasswordHashError::hashing(format!("hashing task failed: {err}")))?
}

#[async_trait]
impl PasswordHasher for Argon2PasswordHasher {
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHashError> {
        let params = self.params.clone();
        let password = Zeroizing::new(password.to_owned());
        let encoded = blocking(move || hash_with(params, password.as_bytes())).await?;
        Ok(PasswordHash::new(encoded))
    }

    async fn verify(
        &self,
        password: &str,
        hash: &PasswordHash,
    ) -> Result<bool, PasswordHashError> {
        let params = self.params.clone();
        let password = Zeroizing::new(password.to_owned());
        let encoded = hash.as_str().to_owned();
        blocking(move || verify_with(params, password.as_bytes(), &encoded)).await
    }

    async fn verify_decoy(&self, password: &str) -> Result<(), PasswordHashError> {
        let params = self.params.clone();
        let password = Zeroizing::new(password.to_owned());
        let decoy = Arc::clone(&self.decoy);
        blocking(move || {
            let encoded = match decoy.get() {
                Some(encoded) => encoded.clone(),
                None => {
                    let mut seed = Zeroizing::new([0_u8; 32]);
                    rand::thread_rng().fill_bytes(seed.as_mut_slice());
                    let encoded = hash_with(params.clone(), seed.as_slice())?;
                    debug!("computed decoy password hash");
                    decoy.get_or_init(|| encoded).clone()
                }
            };
            verify_with(params, password.as_bytes(), &encoded).map(|_| ())
        })
        .await
    }
}
