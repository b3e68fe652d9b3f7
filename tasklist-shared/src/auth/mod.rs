/// Authentication and authorization utilities
///
/// # Modules
///
/// - [`password`]: Argon2id credential hashing behind the `CredentialHasher` trait
/// - [`jwt`]: JWT token generation and validation
/// - [`middleware`]: Axum layers that turn bearer tokens into an `AuthContext`
/// - [`authorization`]: admin checks and ownership scoping
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations by default
/// - **JWT Tokens**: HS256 signing with configurable expiration
/// - **Fresh Identity**: every request re-loads the user named by its token
///
/// # Example
///
/// ```no_run
/// use tasklist_shared::auth::password::{hash_password, verify_password};
/// use tasklist_shared::auth::jwt::{create_token, Claims};
/// use tasklist_shared::models::user::Authority;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("password123")?;
/// assert!(verify_password("password123", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "armando@email.com", Authority::User);
/// let token = create_token(&claims, "secret-key-at-least-32-bytes-long!!")?;
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
