//! Domain models for Momo.

pub mod meeting;
pub mod payment;
pub mod question;
pub mod reservation;
pub mod settlement;
pub mod user;

pub use meeting::{Category, DatePolicy, DateTimeInfo, Meeting, MeetingState};
pub use payment::{PayState, PayType};
pub use reservation::{Reservation, ReservationSlot, ReservationState};
pub use settlement::{HostSettlement, SettlementCandidate, SettlementRunSummary};
pub use user::User;
