mod catalog;
mod manager;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

pub use catalog::bookable_events;

pub type BookingId = i64;
pub type EventId = i64;

#[derive(Debug, Clone)]
pub struct BookingManager {
    pool: PgPool,
}

#[async_trait]
pub trait Rsvp {
    /// admit a booking (duplicate + capacity rules) and persist it
    async fn reserve(&self, booking: abi::NewBooking) -> Result<abi::Booking, abi::Error>;
    /// delete the booking holding this cancellation token
    async fn cancel(&self, token: &str) -> Result<abi::Booking, abi::Error>;
    /// admin listing: filtered, newest first, paginated, with the filtered total
    async fn query(&self, query: abi::BookingQuery) -> Result<abi::BookingPage, abi::Error>;
    /// same filters as query, oldest first, capped for export
    async fn export(&self, filter: abi::BookingFilter) -> Result<Vec<abi::Booking>, abi::Error>;
}

#[async_trait]
pub trait SpecialEvents {
    /// create a curated event
    async fn create_event(
        &self,
        event: abi::NewSpecialEvent,
    ) -> Result<abi::SpecialEvent, abi::Error>;
    /// every stored event, ordered by date then time
    async fn list_events(&self) -> Result<Vec<abi::SpecialEvent>, abi::Error>;
    /// get one event by id
    async fn get_event(&self, id: EventId) -> Result<abi::SpecialEvent, abi::Error>;
    /// delete an event together with every booking referencing it
    async fn delete_event(&self, id: EventId) -> Result<abi::SpecialEvent, abi::Error>;
    /// the public catalog for `today`: open future specials + generated brunches
    async fn bookable(&self, today: NaiveDate) -> Result<Vec<abi::BookableEvent>, abi::Error>;
}

impl BookingManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
