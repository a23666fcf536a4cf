//! Shared utilities and common types for the PackTrack backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Cryptographic utilities (photo hashing)
//! - Password hashing with Argon2id
//! - JWT token generation and validation
//! - Common validation logic
//! - Great-circle distance computation

pub mod crypto;
pub mod geo;
pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
