//! Argon2id password hashing.
//!
//! Hashes are stored as PHC strings, so the salt and parameters travel with
//! the hash and can change without a migration.

use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use tokio::task;

use crate::{EngineError, ResultEngine};

/// Hashes a password on the blocking pool.
pub(crate) async fn hash_password(password: &str) -> ResultEngine<String> {
    let password = password.to_string();
    task::spawn_blocking(move || hash(&password))
        .await
        .map_err(|err| EngineError::PasswordHash(err.to_string()))?
}

/// Checks a password against a stored PHC string on the blocking pool.
pub(crate) async fn verify_password(password: &str, stored_hash: &str) -> ResultEngine<bool> {
    let password = password.to_string();
    let stored_hash = stored_hash.to_string();
    task::spawn_blocking(move || verify(&password, &stored_hash))
        .await
        .map_err(|err| EngineError::PasswordHash(err.to_string()))?
}

fn hash(password: &str) -> ResultEngine<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| EngineError::PasswordHash(err.to_string()))
}

/// Returns `Ok(false)` on a mismatch; errors only when the stored hash is unusable.
fn verify(password: &str, stored_hash: &str) -> ResultEngine<bool> {
    let parsed =
        PasswordHash::new(stored_hash).map_err(|err| EngineError::PasswordHash(err.to_string()))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(EngineError::PasswordHash(err.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_verifies_only_the_hashed_password() {
        let hash = hash("password123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify("password123", &hash).unwrap());
        assert!(!verify("password124", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let a = hash("secret").unwrap();
        let b = hash("secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(matches!(
            verify("x", "not-a-phc-string"),
            Err(EngineError::PasswordHash(_))
        ));
    }

    #[tokio::test]
    async fn blocking_pool_round_trip_matches_sync_helpers() {
        let hash = hash_password("password123").await.unwrap();
        assert!(verify_password("password123", &hash).await.unwrap());
        assert!(!verify_password("password124", &hash).await.unwrap());
        assert!(matches!(
            verify_password("x", "not-a-phc-string").await,
            Err(EngineError::PasswordHash(_))
        ));
    }
}
