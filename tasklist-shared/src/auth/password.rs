/// Password hashing module using Argon2id
///
/// Passwords are stored only as Argon2id PHC strings. The merge logic talks
/// to the hasher through the [`CredentialHasher`] trait so tests and local
/// runs can lower the cost without touching the services.
///
/// # Default cost
///
/// - **Memory**: 64 MB (65536 KiB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// # Example
///
/// ```
/// use tasklist_shared::auth::password::{Argon2Hasher, CredentialHasher};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Argon2Hasher::with_cost(1024, 1, 1)?;
/// let hash = hasher.hash("password123")?;
///
/// assert!(hasher.matches("password123", &hash)?);
/// assert!(!hasher.matches("password124", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// One-way credential hashing provider
///
/// `hash` produces an opaque string; `matches` compares a plaintext against
/// such a string. Implementations must be usable from any request task.
pub trait CredentialHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;

    /// Returns `Ok(false)` for a wrong password, `Err` only for unusable hashes
    fn matches(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id hasher with configurable cost
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub const DEFAULT_MEMORY_KIB: u32 = 65536;
    pub const DEFAULT_ITERATIONS: u32 = 3;
    pub const DEFAULT_PARALLELISM: u32 = 4;

    /// Creates a hasher with explicit cost parameters
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashError` if Argon2 rejects the parameters
    /// (e.g. memory below 8 KiB per lane)
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(memory_kib)
            .t_cost(iterations)
            .p_cost(parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

        Ok(Self { params })
    }

    /// Default cost with a custom memory size
    pub fn with_memory(memory_kib: u32) -> Result<Self, PasswordError> {
        Self::with_cost(memory_kib, Self::DEFAULT_ITERATIONS, Self::DEFAULT_PARALLELISM)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self {
            params: Params::new(
                Self::DEFAULT_MEMORY_KIB,
                Self::DEFAULT_ITERATIONS,
                Self::DEFAULT_PARALLELISM,
                Some(32),
            )
            .unwrap_or_default(),
        }
    }
}

impl std::fmt::Debug for Argon2Hasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(password_hash.to_string())
    }

    fn matches(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        verify_password(plaintext, hash)
    }
}

/// Hashes a password with the default cost
///
/// # Returns
///
/// PHC string, e.g.
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    Argon2Hasher::default().hash(password)
}

/// Verifies a password against a PHC hash
///
/// The cost parameters are read from the hash itself, so hashes produced with
/// any cost verify correctly. Comparison is constant-time.
///
/// A PHC string without a salt or hash segment is `InvalidHash`, not a
/// mismatch.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;
    if parsed_hash.salt.is_none() || parsed_hash.hash.is_none() {
        return Err(PasswordError::InvalidHash(
            "missing salt or hash segment".to_string(),
        ));
    }

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> Argon2Hasher {
        Argon2Hasher::with_cost(1024, 1, 1).expect("valid test parameters")
    }

    #[test]
    fn test_hash_password_default_cost() {
        let hash = hash_password("password123").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_custom_cost_is_embedded() {
        let hash = fast_hasher().hash("password123").expect("Hash should succeed");
        assert!(hash.contains("m=1024,t=1,p=1"));
    }

    #[test]
    fn test_hash_produces_different_salts() {
        let hasher = fast_hasher();
        let hash1 = hasher.hash("same_password").expect("Hash 1 should succeed");
        let hash2 = hasher.hash("same_password").expect("Hash 2 should succeed");

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_matches_correct_and_incorrect() {
        let hasher = fast_hasher();
        let hash = hasher.hash("admin123").expect("Hash should succeed");

        assert!(hasher.matches("admin123", &hash).expect("Verify should succeed"));
        assert!(!hasher.matches("admin124", &hash).expect("Verify should succeed"));
        assert!(!hasher.matches("", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_default_hash_verifies_with_fast_hasher() {
        let hash = hash_password("joseKpo777").expect("Hash should succeed");
        assert!(fast_hasher().matches("joseKpo777", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_matches_invalid_hash() {
        assert!(matches!(
            fast_hasher().matches("password", "invalid_hash"),
            Err(PasswordError::InvalidHash(_))
        ));
        assert!(matches!(
            verify_password("password", "$argon2id$invalid"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_matches_truncated_hash() {
        let hash = fast_hasher().hash("password").expect("Hash should succeed");
        let truncated = &hash[..hash.rfind('$').expect("PHC separator")];

        assert!(matches!(
            fast_hasher().matches("password", truncated),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_invalid_cost_rejected() {
        assert!(Argon2Hasher::with_cost(1, 1, 1).is_err());
    }

    #[test]
    fn test_debug_shows_cost_only() {
        let debug = format!("{:?}", fast_hasher());
        assert!(debug.contains("m_cost: 1024"));
    }
}
