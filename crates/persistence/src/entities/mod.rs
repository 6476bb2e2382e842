//! Database entity definitions.
//!
//! Entities are direct mappings to database rows.

pub mod meeting;
pub mod payment;
pub mod question;
pub mod reservation;
pub mod settlement;
pub mod user;

pub use meeting::{CategoryDb, DatePolicyDb, MeetingEntity, MeetingStateDb};
pub use payment::{NewPayment, PayStateDb, PayTypeDb, PaymentEntity};
pub use question::QuestionEntity;
pub use reservation::{
    ApplicationEntity, OccupiedSlotEntity, ReservationEntity, ReservationStateDb,
};
pub use settlement::{SettlementCandidateEntity, SettlementEntity};
pub use user::UserEntity;
