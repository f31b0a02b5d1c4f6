//! Credential handling: signup, signin, password hashing.
//!
//! A missing username and a wrong password produce the same error, and the
//! duplicate-username message does not echo the attempted name.

pub mod token;

use anyhow::Result;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use std::sync::Arc;

use crate::storage::{Storage, UserRow};
use token::TokenKeys;

/// Errors surfaced by auth operations. The display strings are part of the
/// API contract; they are returned verbatim to clients.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Username already exists")]
    UsernameTaken,
    #[error("Please check your credentials")]
    InvalidCredentials,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Clone)]
pub struct AuthService {
    storage: Arc<Storage>,
    tokens: Arc<TokenKeys>,
}

impl AuthService {
    pub fn new(storage: Arc<Storage>, tokens: Arc<TokenKeys>) -> Self {
        Self { storage, tokens }
    }

    /// Register a new user. The password is stored only as an argon2 hash.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<UserRow, AuthError> {
        let hash = hash_password(password)?;
        match self.storage.create_user(username, &hash).await? {
            Some(user) => Ok(user),
            None => Err(AuthError::UsernameTaken),
        }
    }

    /// Validate credentials and issue a bearer token carrying the user's
    /// identity. Unknown username and wrong password are indistinguishable.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<String, AuthError> {
        let Some(user) = self.storage.get_user_by_username(username).await? else {
            return Err(AuthError::InvalidCredentials);
        };
        if !verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(self.tokens.issue(&user.id, &user.username)?)
    }
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {e}"))?;
    Ok(hash.to_string())
}

fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_service() -> AuthService {
        let dir = tempfile::tempdir().unwrap().keep();
        let storage = Arc::new(Storage::new(&dir).await.unwrap());
        let tokens = Arc::new(TokenKeys::from_data_dir(&dir, 3600).unwrap());
        AuthService::new(storage, tokens)
    }

    #[test]
    fn test_hash_round_trip() {
        let hash = hash_password("password2").unwrap();
        assert_ne!(hash, "password2");
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("password2", &hash));
        assert!(!verify_password("444", &hash));
        assert!(!verify_password("password2", "not a hash"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let a = hash_password("same").unwrap();
        let b = hash_password("same").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_sign_up_then_in() {
        let svc = test_service().await;
        let user = svc.sign_up("user2", "password2").await.unwrap();
        assert_eq!(user.username, "user2");
        assert!(user.password_hash.starts_with("$argon2"));

        let token = svc.sign_in("user2", "password2").await.unwrap();
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let svc = test_service().await;
        svc.sign_up("user2", "password2").await.unwrap();
        let second = svc.sign_up("user2", "other").await;
        assert!(matches!(second, Err(AuthError::UsernameTaken)));
    }

    #[tokio::test]
    async fn test_sign_in_failures_are_uniform() {
        let svc = test_service().await;
        svc.sign_up("user2", "password2").await.unwrap();

        let wrong_password = svc.sign_in("user2", "444").await.unwrap_err();
        let unknown_user = svc.sign_in("nobody", "password2").await.unwrap_err();
        assert_eq!(wrong_password.to_string(), "Please check your credentials");
        assert_eq!(unknown_user.to_string(), wrong_password.to_string());
    }
}
