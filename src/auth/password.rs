use thiserror::Error;

/// Work factor matching the original deployment; high enough that a single
/// verification costs hundreds of milliseconds on commodity hardware.
pub const DEFAULT_COST: u32 = 12;

/// Minimum accepted password length, enforced at the API surface.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("bcrypt failure: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("hashing task was cancelled")]
    TaskCancelled,
}

/// Hash a plaintext password with a per-call random salt. Runs on the
/// blocking pool; the calling task suspends instead of stalling the executor.
pub async fn hash(plain: &str, cost: u32) -> Result<String, PasswordError> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::hash(plain, cost))
        .await
        .map_err(|_| PasswordError::TaskCancelled)?
        .map_err(PasswordError::from)
}

/// Verify a plaintext password against a stored digest.
pub async fn verify(plain: &str, digest: &str) -> Result<bool, PasswordError> {
    let plain = plain.to_owned();
    let digest = digest.to_owned();
    tokio::task::spawn_blocking(move || bcrypt::verify(plain, &digest))
        .await
        .map_err(|_| PasswordError::TaskCancelled)?
        .map_err(PasswordError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    // bcrypt's minimum cost; the tests do not need the production work factor
    const TEST_COST: u32 = 4;

    #[tokio::test]
    async fn hash_and_verify_round_trip() {
        let digest = hash("correct horse", TEST_COST).await.unwrap();
        assert!(verify("correct horse", &digest).await.unwrap());
        assert!(!verify("wrong horse", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn hashing_is_salted() {
        let a = hash("same input", TEST_COST).await.unwrap();
        let b = hash("same input", TEST_COST).await.unwrap();
        assert_ne!(a, b);
    }
}
