//! Argon2id hashing for password fields.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHasher, Version};
use parrot_application::PasswordHasher as PasswordHasherPort;
use parrot_core::{AppError, AppResult};

/// Memory cost in KiB used by [`Argon2PasswordHasher::new`].
pub const DEFAULT_MEMORY_KIB: u32 = 19_456;

/// Iteration count used by [`Argon2PasswordHasher::new`].
pub const DEFAULT_ITERATIONS: u32 = 2;

/// Argon2id hasher producing PHC strings stored in password fields.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the default cost.
    #[must_use]
    pub fn new() -> Self {
        let params = Params::new(DEFAULT_MEMORY_KIB, DEFAULT_ITERATIONS, 1, None)
            .unwrap_or_else(|_| Params::default());
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Creates a hasher with an explicit memory and time cost.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, 1, None).map_err(|error| {
            AppError::Configuration(format!("invalid argon2 cost parameters: {error}"))
        })?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash password field: {error}")))
    }
}
