//! Domain services for Momo.
//!
//! Services contain business logic that operates on domain models.

pub mod payment_gateway;
pub mod reservation_validation;
pub mod settlement;

pub use payment_gateway::{GatewayError, PaymentConfirmation, PaymentGateway};
pub use reservation_validation::{
    check_availability, check_capacity, compute_amount, validate_reservation, ReservationAttempt,
    ReservationRejection,
};
pub use settlement::group_by_host;
