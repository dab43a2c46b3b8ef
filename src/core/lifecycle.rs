//! Reservation state machine - Pure transition rules.
//!
//! ```text
//! pending --confirm--> confirmed --check_in--> checked_in --check_out--> checked_out
//!                        |  ^ assign_room          |
//!                        |  +----------------------+--cancel--> cancelled
//!                        +--no_show--> no_show
//! ```
//!
//! Persisted operations in `core::reservation` call [`ReservationStatus::apply`] before
//! touching the database, so the rules here are the single point of enforcement.

use crate::{
    entities::ReservationStatus,
    errors::{Error, Result},
};
use sea_orm::ActiveEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Something that can happen to a reservation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationEvent {
    /// Pending booking accepted
    Confirm,
    /// Room matched and claimed
    AssignRoom,
    /// Guest arrived
    CheckIn,
    /// Guest left
    CheckOut,
    /// Booking cancelled
    Cancel,
    /// Guest did not arrive
    NoShow,
}

impl ReservationEvent {
    /// Snake-case name used in errors and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Confirm => "confirm",
            Self::AssignRoom => "assign_room",
            Self::CheckIn => "check_in",
            Self::CheckOut => "check_out",
            Self::Cancel => "cancel",
            Self::NoShow => "no_show",
        }
    }
}

impl fmt::Display for ReservationEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ReservationStatus {
    /// `checked_out`, `cancelled` and `no_show` accept no further events.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::CheckedOut | Self::Cancelled | Self::NoShow)
    }

    /// Returns the status reached by applying `event`, or
    /// [`Error::InvalidTransition`] if the event is not allowed from `self`.
    pub fn apply(self, event: ReservationEvent) -> Result<Self> {
        use ReservationEvent as E;

        let next = match (self, event) {
            (Self::Pending, E::Confirm) | (Self::Confirmed, E::AssignRoom) => Self::Confirmed,
            (Self::Confirmed, E::CheckIn) => Self::CheckedIn,
            (Self::CheckedIn, E::CheckOut) => Self::CheckedOut,
            (Self::Confirmed | Self::CheckedIn, E::Cancel) => Self::Cancelled,
            (Self::Confirmed, E::NoShow) => Self::NoShow,
            _ => {
                let reason = if self.is_terminal() {
                    "reservation is closed"
                } else {
                    "transition not allowed"
                };
                return Err(invalid(self, event, reason));
            }
        };
        Ok(next)
    }

    /// Check-out guard: the transition must be legal and the folio fully settled.
    pub fn check_out(self, folio_balance: i64) -> Result<Self> {
        let next = self.apply(ReservationEvent::CheckOut)?;
        if folio_balance > 0 {
            return Err(invalid(
                self,
                ReservationEvent::CheckOut,
                &format!("balance due {folio_balance}"),
            ));
        }
        Ok(next)
    }

    /// Events accepted from this status, for clients that render actions.
    #[must_use]
    pub fn allowed_events(self) -> Vec<ReservationEvent> {
        use ReservationEvent as E;

        [
            E::Confirm,
            E::AssignRoom,
            E::CheckIn,
            E::CheckOut,
            E::Cancel,
            E::NoShow,
        ]
        .into_iter()
        .filter(|event| self.apply(*event).is_ok())
        .collect()
    }
}

fn invalid(from: ReservationStatus, event: ReservationEvent, reason: &str) -> Error {
    Error::InvalidTransition {
        from: from.to_value(),
        event: event.to_string(),
        reason: reason.to_string(),
    }
}
