//! Application services and external integrations.

pub mod auth;
pub mod meeting;
pub mod payment;
pub mod question;
pub mod reservation;
pub mod settlement;

pub use auth::AuthService;
pub use meeting::{MeetingError, MeetingService};
pub use payment::{build_gateway, ConsolePaymentGateway, TossPaymentsClient};
pub use question::QuestionService;
pub use reservation::{ReservationError, ReservationService};
pub use settlement::SettlementService;
