//! Password hashing and strength policy.
//!
//! Hashing is treated as an opaque one-way function (scrypt through the
//! `password_hash` API); nothing else in the workspace inspects hash
//! internals.

use scrypt::{
    Scrypt,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use fintrack_core::Issue;

/// Minimum password length.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password with a fresh random salt.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Scrypt.hash_password(plain.as_bytes(), &salt)?.to_string();
    Ok(hash)
}

/// Verify a password against a stored hash. Malformed hashes verify false.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Check password strength, returning one issue per violated rule.
pub fn check_password_strength(password: &str) -> Vec<Issue> {
    let mut issues = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LEN {
        issues.push(Issue::new(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        ));
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        issues.push(Issue::new(
            "password",
            "password must contain an uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        issues.push(Issue::new(
            "password",
            "password must contain a lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        issues.push(Issue::new("password", "password must contain a digit"));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        issues.push(Issue::new(
            "password",
            "password must contain a special character",
        ));
    }

    issues
}
