use parrot_core::AppResult;

/// Port for password hashing applied to password fields before persistence.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;
}
