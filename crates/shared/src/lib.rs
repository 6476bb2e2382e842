//! Shared utilities and common types for the Momo backend.
//!
//! This crate provides common functionality used across all other crates:
//! - JWT access tokens
//! - Password hashing with Argon2id
//! - Page-based pagination
//! - Common validation logic

pub mod jwt;
pub mod pagination;
pub mod password;
pub mod validation;
