//! RSVP persistence.
//!
//! Every write is a single atomic statement inside its own transaction, so a
//! failed request never leaves a half-applied change behind.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::AppError;
use crate::models::rsvp::{NewRsvp, Rsvp, SubmitOutcome};

#[derive(Clone)]
pub enum RsvpStore {
    Postgres(PgStore),
    Memory(MemoryStore),
}

impl RsvpStore {
    /// Insert a new RSVP or overwrite the attendance of the one with the same name.
    pub async fn submit(&self, rsvp: &NewRsvp) -> Result<SubmitOutcome, AppError> {
        let outcome = match self {
            Self::Postgres(s) => s.submit(rsvp).await,
            Self::Memory(s) => s.submit(rsvp),
        }?;

        tracing::info!(
            id = outcome.id(),
            attendance = rsvp.attendance.as_str(),
            "RSVP {}",
            outcome.status()
        );
        Ok(outcome)
    }

    /// Names of everyone attending, in byte-wise ascending order.
    pub async fn list_confirmed(&self) -> Result<Vec<String>, AppError> {
        match self {
            Self::Postgres(s) => s.list_confirmed().await,
            Self::Memory(s) => s.list_confirmed(),
        }
    }

    /// All RSVPs, most recently written first.
    pub async fn list_all(&self) -> Result<Vec<Rsvp>, AppError> {
        match self {
            Self::Postgres(s) => s.list_all().await,
            Self::Memory(s) => s.list_all(),
        }
    }

    /// Idempotent: deleting an unknown id succeeds. Returns whether a row was removed.
    pub async fn delete(&self, id: i32) -> Result<bool, AppError> {
        let removed = match self {
            Self::Postgres(s) => s.delete(id).await,
            Self::Memory(s) => s.delete(id),
        }?;

        if removed {
            tracing::info!(id, "RSVP deleted");
        } else {
            tracing::debug!(id, "RSVP delete was a no-op");
        }
        Ok(removed)
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        match self {
            Self::Postgres(s) => s.ping().await,
            Self::Memory(_) => Ok(()),
        }
    }
}
