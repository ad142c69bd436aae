//! # IMDG Analyzer Domain Models
//!
//! Core domain types shared by the vector store and the MSDS analyzer service.
//!
//! ## Key Models
//!
//! - **Session**: anonymous per-browser session carrying the user UUID
//! - **User**: login account with a salted password hash
//! - **DocumentChunk**: a span of extracted MSDS text stored as one vector record
//! - **CollectionName / CollectionInfo**: per-user record grouping in the vector store

pub mod document;
pub mod session;
pub mod user;

#[cfg(test)]
pub mod property_tests;

pub use document::*;
pub use session::*;
pub use user::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Invalid collection name: {0:?}")]
    InvalidCollectionName(String),
}
