//! Vaultsift Core Library
//!
//! Domain logic for reviewing a vault of markdown notes: scanning,
//! assessment, preservation checks and resumable traversal.

pub mod assess;
pub mod checkpoint;
pub mod concepts;
pub mod config;
pub mod error;
pub mod guard;
pub mod logging;
pub mod note;
pub mod traversal;
pub mod vault;
