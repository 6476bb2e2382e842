//! Domain layer for the Momo backend.
//!
//! This crate contains:
//! - Domain models and request/response DTOs (users, meetings, reservations,
//!   payments, settlements, questions)
//! - Business rules: reservation validation, pricing, settlement grouping
//! - The payment gateway abstraction

pub mod models;
pub mod services;
