//! Repository implementations for database operations.

pub mod meeting;
pub mod payment;
pub mod question;
pub mod reservation;
pub mod settlement;
pub mod user;

pub use meeting::{MeetingRepository, MeetingSearch};
pub use payment::PaymentRepository;
pub use question::QuestionRepository;
pub use reservation::{NewReservation, ReservationRepository};
pub use settlement::SettlementRepository;
pub use user::UserRepository;
