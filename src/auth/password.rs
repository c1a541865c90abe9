use secrecy::{ExposeSecret, SecretBox};

use crate::error::{AppError, AppResult};

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Hash on the blocking pool; bcrypt is deliberately slow.
pub async fn hash_password(password: &SecretBox<String>) -> AppResult<String> {
    hash_with_cost(password, bcrypt::DEFAULT_COST).await
}

pub(crate) async fn hash_with_cost(password: &SecretBox<String>, cost: u32) -> AppResult<String> {
    let plain = password.expose_secret().clone();
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await?
        .map_err(|e| AppError::InternalServerError(format!("Password hashing failed: {}", e)))
}

/// A malformed stored hash counts as a mismatch.
pub async fn verify_password(password: &SecretBox<String>, hash: &str) -> AppResult<bool> {
    let plain = password.expose_secret().clone();
    let hash = hash.to_string();
    let verified = tokio::task::spawn_blocking(move || bcrypt::verify(plain, &hash)).await?;

    Ok(verified.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Stored password hash could not be checked");
        false
    }))
}

pub fn check_password_strength(password: &SecretBox<String>) -> AppResult<()> {
    if password.expose_secret().chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AppError::Validation(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(value: &str) -> SecretBox<String> {
        SecretBox::new(Box::new(value.to_string()))
    }

    #[tokio::test]
    async fn hash_then_verify() {
        let hash = hash_with_cost(&secret("hunter22"), 4).await.unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password(&secret("hunter22"), &hash).await.unwrap());
        assert!(!verify_password(&secret("hunter23"), &hash).await.unwrap());
    }

    #[tokio::test]
    async fn garbage_hash_does_not_verify() {
        assert!(!verify_password(&secret("anything"), "not-a-hash").await.unwrap());
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert!(check_password_strength(&secret("12345")).is_err());
        assert!(check_password_strength(&secret("123456")).is_ok());
    }
}
