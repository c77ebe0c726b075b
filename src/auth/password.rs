use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::{error, warn};

use crate::config::PasswordConfig;

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("invalid argon2 parameters: {0}")]
    InvalidParams(String),
    #[error("password hashing failed: {0}")]
    HashingFailed(String),
}

const DUMMY_PASSWORD: &str = "trossets-unknown-account";

/// Argon2id hasher with a fixed work factor taken from `PasswordConfig`.
#[derive(Debug, Clone)]
pub struct Hasher {
    params: Params,
    // hashed with `params`
    dummy_hash: Arc<str>,
}

impl Hasher {
    pub fn new(config: &PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;
        let mut hasher = Self {
            params,
            dummy_hash: Arc::from(""),
        };
        hasher.dummy_hash = hasher.hash(DUMMY_PASSWORD)?.into();
        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    pub fn hash(&self, plain: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|e| {
                error!(error = %e, "argon2 hash_password error");
                PasswordError::HashingFailed(e.to_string())
            })?
            .to_string();
        Ok(hash)
    }

    /// Checks `plain` against a stored PHC hash. A malformed stored hash
    /// counts as a mismatch.
    pub fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "stored password hash is malformed");
                return false;
            }
        };
        // params come from the PHC string, so hashes made under older
        // settings still verify
        self.argon2()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok()
    }

    pub async fn hash_password(&self, plain: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&plain))
            .await
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?
    }

    /// Runs a full verification against a throwaway hash and always fails.
    /// Used when there is no stored hash to check, so the caller's timing
    /// matches a real mismatch.
    pub async fn compare_password_unknown_account(&self, plain: String) -> bool {
        self.compare_password(plain, self.dummy_hash.to_string()).await;
        false
    }

    pub async fn compare_password(&self, plain: String, hash: String) -> bool {
        let hasher = self.clone();
        match tokio::task::spawn_blocking(move || hasher.verify(&plain, &hash)).await {
            Ok(matches) => matches,
            Err(e) => {
                error!(error = %e, "password verification task failed");
                false
            }
        }
    }
}

#[cfg(test)]
pub(crate) fn test_hasher() -> Hasher {
    Hasher::new(&PasswordConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("cheap test params are valid")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hasher = test_hasher();
        let password = "Secur3P@ssw0rd!";
        let hash = hasher.hash(password).expect("hashing should succeed");
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify(password, &hash));
    }

    #[test]
    fn verify_rejects_wrong_password() {
        let hasher = test_hasher();
        let hash = hasher.hash("correct-horse-battery-staple").unwrap();
        assert!(!hasher.verify("wrong-password", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let hasher = test_hasher();
        let a = hasher.hash("Passw0rd").unwrap();
        let b = hasher.hash("Passw0rd").unwrap();
        assert_ne!(a, b);
        assert!(hasher.verify("Passw0rd", &a));
        assert!(hasher.verify("Passw0rd", &b));
    }

    #[test]
    fn verify_treats_malformed_hash_as_mismatch() {
        let hasher = test_hasher();
        assert!(!hasher.verify("anything", "not-a-valid-hash"));
        assert!(!hasher.verify("anything", ""));
    }

    #[test]
    fn verify_accepts_hash_from_other_params() {
        let strong = Hasher::new(&PasswordConfig {
            memory_kib: 2048,
            iterations: 2,
            parallelism: 1,
        })
        .unwrap();
        let hash = strong.hash("Passw0rd").unwrap();
        assert!(test_hasher().verify("Passw0rd", &hash));
    }

    #[test]
    fn invalid_params_are_rejected() {
        let err = Hasher::new(&PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        })
        .unwrap_err();
        assert!(matches!(err, PasswordError::InvalidParams(_)));
    }

    #[tokio::test]
    async fn async_helpers_run_on_blocking_pool() {
        let hasher = test_hasher();
        let hash = hasher.hash_password("Passw0rd".into()).await.unwrap();
        assert!(hasher.compare_password("Passw0rd".into(), hash.clone()).await);
        assert!(!hasher.compare_password("passw0rd".into(), hash).await);
    }

    #[tokio::test]
    async fn unknown_account_check_uses_live_params_and_fails() {
        let hasher = test_hasher();
        let parsed = PasswordHash::new(&hasher.dummy_hash).unwrap();
        assert_eq!(parsed.algorithm.as_str(), "argon2id");
        assert_eq!(Params::try_from(&parsed).unwrap().m_cost(), 1024);
        assert!(hasher.verify(DUMMY_PASSWORD, &hasher.dummy_hash));

        assert!(!hasher.compare_password_unknown_account("Passw0rd".into()).await);
        assert!(!hasher.compare_password_unknown_account(DUMMY_PASSWORD.into()).await);
    }
}
