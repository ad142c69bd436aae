//! Login accounts and salted password hashes.
//!
//! Hashes are stored as `sha256$<rounds>$<salt>$<digest>` where `digest` is the
//! hex encoded SHA-256 of `salt || password`, re-hashed `rounds` times.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use validator::Validate;

pub const DEFAULT_HASH_ROUNDS: u32 = 10_000;
const HASH_SCHEME: &str = "sha256";

/// A login account. Accounts live in memory only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    pub id: u32,
    #[validate(length(min = 1, max = 64, message = "Username must be between 1 and 64 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password hash is required"))]
    pub password_hash: String,
}

impl User {
    /// Creates a user from a plain-text password.
    pub fn new(id: u32, username: impl Into<String>, password: &str) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: generate_password_hash(password),
        }
    }

    /// Creates a user from an existing password hash.
    pub fn with_hash(id: u32, username: impl Into<String>, password_hash: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
        }
    }

    pub fn check_password(&self, password: &str) -> bool {
        check_password_hash(&self.password_hash, password)
    }
}

pub fn generate_password_hash(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    hash_with_salt(password, &salt, DEFAULT_HASH_ROUNDS)
}

pub fn check_password_hash(stored: &str, password: &str) -> bool {
    let mut parts = stored.splitn(4, '$');
    let (Some(scheme), Some(rounds), Some(salt), Some(digest)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if scheme != HASH_SCHEME {
        return false;
    }
    let Ok(rounds) = rounds.parse::<u32>() else {
        return false;
    };
    if rounds == 0 {
        return false;
    }

    let candidate = digest_hex(password, salt, rounds);
    constant_time_eq(candidate.as_bytes(), digest.as_bytes())
}

fn hash_with_salt(password: &str, salt: &str, rounds: u32) -> String {
    format!(
        "{}${}${}${}",
        HASH_SCHEME,
        rounds,
        salt,
        digest_hex(password, salt, rounds)
    )
}

fn digest_hex(password: &str, salt: &str, rounds: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..rounds {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(digest);
        digest = hasher.finalize();
    }

    hex::encode(digest)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
