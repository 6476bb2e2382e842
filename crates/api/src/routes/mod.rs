//! HTTP route handlers.

pub mod auth;
pub mod health;
pub mod meetings;
pub mod payments;
pub mod questions;
pub mod reservations;
pub mod settlements;
pub mod users;
