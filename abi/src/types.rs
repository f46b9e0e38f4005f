use chrono::{NaiveDate, NaiveTime};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Error;
use crate::utils::format_day_month;

/// A persisted guest reservation.
///
/// `event_id` set means the booking belongs to a curated special event;
/// absent means a generated slot (sunday brunch) keyed by date+time alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: i64,
    pub event_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booking_date: NaiveDate,
    pub booking_time: Option<NaiveTime>,
    pub guests: i32,
    pub cancellation_token: Uuid,
    pub notes: Option<String>,
}

/// A booking request as submitted by the frontend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBooking {
    pub event_id: Option<i64>,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub booking_date: NaiveDate,
    pub booking_time: Option<NaiveTime>,
    pub guests: i32,
    pub notes: Option<String>,
}

impl NewBooking {
    pub fn validate(&self) -> Result<(), Error> {
        if self.name.trim().is_empty() {
            return Err(Error::MissingField("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(Error::MissingField("phone"));
        }
        if self.guests < 1 {
            return Err(Error::InvalidGuests(self.guests));
        }
        let well_formed = match self.email.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };
        if !well_formed {
            return Err(Error::InvalidEmail(self.email.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct SpecialEvent {
    pub id: i64,
    pub display_name: String,
    pub booking_date: NaiveDate,
    pub booking_time: Option<NaiveTime>,
    pub is_closed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpecialEvent {
    pub display_name: String,
    pub booking_date: NaiveDate,
    pub booking_time: Option<NaiveTime>,
    #[serde(default)]
    pub is_closed: bool,
}

/// One entry of the public catalog: either a stored special event or a
/// generated brunch sunday offering the two fixed turns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BookableEvent {
    Special {
        id: i64,
        display_name: String,
        booking_date: NaiveDate,
        booking_time: Option<NaiveTime>,
    },
    Brunch {
        display_name: String,
        booking_date: NaiveDate,
        available_slots: Vec<NaiveTime>,
    },
}

impl BookableEvent {
    pub fn special(event: SpecialEvent) -> Self {
        Self::Special {
            display_name: format!(
                "{} - {}",
                event.display_name,
                format_day_month(event.booking_date)
            ),
            id: event.id,
            booking_date: event.booking_date,
            booking_time: event.booking_time,
        }
    }

    pub fn brunch(sunday: NaiveDate, slots: Vec<NaiveTime>) -> Self {
        Self::Brunch {
            display_name: format!("Brunch - {}", format_day_month(sunday)),
            booking_date: sunday,
            available_slots: slots,
        }
    }

    pub fn booking_date(&self) -> NaiveDate {
        match self {
            Self::Special { booking_date, .. } | Self::Brunch { booking_date, .. } => *booking_date,
        }
    }

    /// Effective time used for ordering: a brunch entry sorts by its first
    /// offered turn, an entry with no time at all by a midnight placeholder.
    pub fn sort_time(&self) -> NaiveTime {
        match self {
            Self::Special { booking_time, .. } => booking_time.unwrap_or(NaiveTime::MIN),
            Self::Brunch {
                available_slots, ..
            } => available_slots.first().copied().unwrap_or(NaiveTime::MIN),
        }
    }
}

fn default_page_limit() -> i64 {
    10
}

fn default_export_limit() -> i64 {
    crate::MAX_EXPORT_ROWS
}

/// Admin listing parameters. Filter priority: `event_id`, then the
/// (`event_date`, `event_time`) pair, then everything.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct BookingQuery {
    #[builder(setter(into, strip_option), default)]
    pub event_id: Option<i64>,
    #[builder(setter(into, strip_option), default)]
    pub event_date: Option<NaiveDate>,
    #[builder(setter(into, strip_option), default)]
    pub event_time: Option<NaiveTime>,
    #[builder(setter(into), default)]
    #[serde(default)]
    pub skip: i64,
    #[builder(setter(into), default = "10")]
    #[serde(default = "default_page_limit")]
    pub limit: i64,
}

impl Default for BookingQuery {
    fn default() -> Self {
        Self {
            event_id: None,
            event_date: None,
            event_time: None,
            skip: 0,
            limit: default_page_limit(),
        }
    }
}

/// Export parameters: same filters as [`BookingQuery`], no pagination, a cap
/// instead.
#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct BookingFilter {
    #[builder(setter(into, strip_option), default)]
    pub event_id: Option<i64>,
    #[builder(setter(into, strip_option), default)]
    pub event_date: Option<NaiveDate>,
    #[builder(setter(into, strip_option), default)]
    pub event_time: Option<NaiveTime>,
    #[builder(setter(into), default = "crate::MAX_EXPORT_ROWS")]
    #[serde(default = "default_export_limit")]
    pub limit: i64,
}

impl Default for BookingFilter {
    fn default() -> Self {
        Self {
            event_id: None,
            event_date: None,
            event_time: None,
            limit: crate::MAX_EXPORT_ROWS,
        }
    }
}

/// One page of the admin listing plus the filtered total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingPage {
    pub total: i64,
    pub bookings: Vec<Booking>,
}
