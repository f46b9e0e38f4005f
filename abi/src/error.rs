use std::fmt;

use chrono::NaiveTime;
use thiserror::Error;

use crate::utils::{format_time, is_brunch_slot};

/// The aggregation key the capacity ceiling is enforced against.
///
/// A booking at one of the fixed brunch times competes only with bookings for
/// that exact (date, time) turn; every other booking on a date shares the
/// single evening bucket, whatever its time (or lack of one).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    BrunchTurn(NaiveTime),
    Evening,
}

impl Bucket {
    pub fn for_time(time: Option<NaiveTime>) -> Self {
        match time {
            Some(t) if is_brunch_slot(t) => Self::BrunchTurn(t),
            _ => Self::Evening,
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BrunchTurn(t) => write!(f, "per il turno delle {}", format_time(*t)),
            Self::Evening => write!(f, "per la serata"),
        }
    }
}

// guest-facing strings are Italian, matching what the frontend shows verbatim
#[derive(Debug, Error)]
pub enum Error {
    #[error("Hai già una prenotazione per questo specifico evento con la stessa email.")]
    DuplicateBooking,

    #[error("{}", capacity_message(.bucket, .remaining))]
    NoCapacity { bucket: Bucket, remaining: i64 },

    #[error("Le prenotazioni per questo evento sono chiuse.")]
    BookingsClosed,

    #[error("Token di cancellazione non valido o prenotazione già cancellata.")]
    UnknownToken,

    #[error("Evento non trovato")]
    EventNotFound,

    #[error("record not found")]
    NotFound,

    #[error("Indirizzo email non valido: {0}")]
    InvalidEmail(String),

    #[error("Numero di ospiti non valido: {0}")]
    InvalidGuests(i32),

    #[error("Campo obbligatorio mancante: {0}")]
    MissingField(&'static str),

    #[error("missing required environment variable {0}")]
    MissingConfig(&'static str),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("database error: {0}")]
    Db(sqlx::Error),
}

fn capacity_message(bucket: &Bucket, remaining: &i64) -> String {
    if *remaining > 0 {
        format!(
            "Spiacenti, non c'è abbastanza posto {}. Posti rimasti: {}.",
            bucket, remaining
        )
    } else {
        format!("Spiacenti, siamo al completo {}.", bucket)
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::RowNotFound => Error::NotFound,
            _ => Error::Db(e),
        }
    }
}

// sqlx::Error is not PartialEq; compare database errors by their message so
// tests can assert on whole Error values.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Self::NoCapacity {
                    bucket: b1,
                    remaining: r1,
                },
                Self::NoCapacity {
                    bucket: b2,
                    remaining: r2,
                },
            ) => b1 == b2 && r1 == r2,
            (Self::InvalidEmail(a), Self::InvalidEmail(b)) => a == b,
            (Self::InvalidGuests(a), Self::InvalidGuests(b)) => a == b,
            (Self::MissingField(a), Self::MissingField(b)) => a == b,
            (Self::MissingConfig(a), Self::MissingConfig(b)) => a == b,
            (Self::InvalidConfig(a), Self::InvalidConfig(b)) => a == b,
            (Self::Db(a), Self::Db(b)) => a.to_string() == b.to_string(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::brunch_slots;

    #[test]
    fn capacity_error_reports_remaining_seats() {
        let [noon, _] = brunch_slots();
        let err = Error::NoCapacity {
            bucket: Bucket::BrunchTurn(noon),
            remaining: 5,
        };
        assert_eq!(
            err.to_string(),
            "Spiacenti, non c'è abbastanza posto per il turno delle 12:00. Posti rimasti: 5."
        );
    }

    #[test]
    fn capacity_error_switches_to_fully_booked() {
        let err = Error::NoCapacity {
            bucket: Bucket::Evening,
            remaining: 0,
        };
        assert_eq!(err.to_string(), "Spiacenti, siamo al completo per la serata.");

        let err = Error::NoCapacity {
            bucket: Bucket::Evening,
            remaining: -3,
        };
        assert_eq!(err.to_string(), "Spiacenti, siamo al completo per la serata.");
    }

    #[test]
    fn bucket_for_time_picks_brunch_turns() {
        let [noon, half_past_one] = brunch_slots();
        assert_eq!(Bucket::for_time(Some(noon)), Bucket::BrunchTurn(noon));
        assert_eq!(
            Bucket::for_time(Some(half_past_one)),
            Bucket::BrunchTurn(half_past_one)
        );
        assert_eq!(
            Bucket::for_time(NaiveTime::from_hms_opt(20, 0, 0)),
            Bucket::Evening
        );
        assert_eq!(Bucket::for_time(None), Bucket::Evening);
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        assert_eq!(Error::from(sqlx::Error::RowNotFound), Error::NotFound);
    }
}
