use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use abi::{brunch_slots, Bucket, MAX_EXPORT_ROWS, MAX_GUESTS};

use crate::{catalog, BookingManager, EventId, Rsvp, SpecialEvents};

#[async_trait]
impl Rsvp for BookingManager {
    async fn reserve(&self, booking: abi::NewBooking) -> Result<abi::Booking, abi::Error> {
        booking.validate()?;

        // duplicate check, capacity check and insert share one transaction;
        // no bucket lock beyond that, concurrent requests may transiently
        // overshoot the ceiling
        let mut tx = self.pool.begin().await?;

        if let Some(event_id) = booking.event_id {
            let event: Option<abi::SpecialEvent> =
                sqlx::query_as("SELECT * FROM special_events WHERE id = $1")
                    .bind(event_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            match event {
                None => return Err(abi::Error::EventNotFound),
                Some(e) if e.is_closed => return Err(abi::Error::BookingsClosed),
                Some(_) => {}
            }
        }

        let duplicate: Option<i64> = match booking.event_id {
            Some(event_id) => {
                sqlx::query_scalar(
                    "SELECT id FROM bookings WHERE email = $1 AND event_id = $2 LIMIT 1",
                )
                .bind(&booking.email)
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_scalar(
                    "SELECT id FROM bookings WHERE email = $1 AND booking_date = $2 \
                     AND booking_time IS NOT DISTINCT FROM $3 LIMIT 1",
                )
                .bind(&booking.email)
                .bind(booking.booking_date)
                .bind(booking.booking_time)
                .fetch_optional(&mut *tx)
                .await?
            }
        };
        if duplicate.is_some() {
            return Err(abi::Error::DuplicateBooking);
        }

        let bucket = Bucket::for_time(booking.booking_time);
        let [first_turn, second_turn] = brunch_slots();
        let booked: i64 = match bucket {
            Bucket::BrunchTurn(turn) => {
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(guests), 0) FROM bookings \
                     WHERE booking_date = $1 AND booking_time = $2",
                )
                .bind(booking.booking_date)
                .bind(turn)
                .fetch_one(&mut *tx)
                .await?
            }
            Bucket::Evening => {
                // everything on the date that is not a brunch turn, untimed
                // bookings included
                sqlx::query_scalar(
                    "SELECT COALESCE(SUM(guests), 0) FROM bookings \
                     WHERE booking_date = $1 \
                     AND (booking_time IS NULL OR booking_time NOT IN ($2, $3))",
                )
                .bind(booking.booking_date)
                .bind(first_turn)
                .bind(second_turn)
                .fetch_one(&mut *tx)
                .await?
            }
        };
        if booked + i64::from(booking.guests) > MAX_GUESTS {
            return Err(abi::Error::NoCapacity {
                bucket,
                remaining: MAX_GUESTS - booked,
            });
        }

        let persisted: abi::Booking = sqlx::query_as(
            "INSERT INTO bookings \
             (event_id, name, email, phone, booking_date, booking_time, guests, cancellation_token, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING *",
        )
        .bind(booking.event_id)
        .bind(&booking.name)
        .bind(&booking.email)
        .bind(&booking.phone)
        .bind(booking.booking_date)
        .bind(booking.booking_time)
        .bind(booking.guests)
        .bind(Uuid::new_v4())
        .bind(&booking.notes)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            booking_id = persisted.id,
            date = %persisted.booking_date,
            guests = persisted.guests,
            "booking accepted"
        );
        Ok(persisted)
    }

    async fn cancel(&self, token: &str) -> Result<abi::Booking, abi::Error> {
        // a malformed token and an unknown one are indistinguishable on purpose
        let token = Uuid::parse_str(token).map_err(|_| abi::Error::UnknownToken)?;
        let deleted: Option<abi::Booking> =
            sqlx::query_as("DELETE FROM bookings WHERE cancellation_token = $1 RETURNING *")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;
        deleted.ok_or(abi::Error::UnknownToken)
    }

    async fn query(&self, query: abi::BookingQuery) -> Result<abi::BookingPage, abi::Error> {
        let skip = query.skip.max(0);
        let limit = query.limit.max(0);

        let (total, bookings) = if let Some(event_id) = query.event_id {
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE event_id = $1")
                    .bind(event_id)
                    .fetch_one(&self.pool)
                    .await?;
            let rows = sqlx::query_as(
                "SELECT * FROM bookings WHERE event_id = $1 \
                 ORDER BY booking_date DESC, booking_time DESC OFFSET $2 LIMIT $3",
            )
            .bind(event_id)
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            (total, rows)
        } else if let (Some(date), Some(time)) = (query.event_date, query.event_time) {
            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM bookings WHERE booking_date = $1 AND booking_time = $2",
            )
            .bind(date)
            .bind(time)
            .fetch_one(&self.pool)
            .await?;
            let rows = sqlx::query_as(
                "SELECT * FROM bookings WHERE booking_date = $1 AND booking_time = $2 \
                 ORDER BY booking_date DESC, booking_time DESC OFFSET $3 LIMIT $4",
            )
            .bind(date)
            .bind(time)
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            (total, rows)
        } else {
            let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings")
                .fetch_one(&self.pool)
                .await?;
            let rows = sqlx::query_as(
                "SELECT * FROM bookings \
                 ORDER BY booking_date DESC, booking_time DESC OFFSET $1 LIMIT $2",
            )
            .bind(skip)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            (total, rows)
        };

        Ok(abi::BookingPage { total, bookings })
    }

    async fn export(&self, filter: abi::BookingFilter) -> Result<Vec<abi::Booking>, abi::Error> {
        let limit = filter.limit.clamp(0, MAX_EXPORT_ROWS);

        let rows = if let Some(event_id) = filter.event_id {
            sqlx::query_as(
                "SELECT * FROM bookings WHERE event_id = $1 \
                 ORDER BY booking_date ASC, booking_time ASC LIMIT $2",
            )
            .bind(event_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else if let (Some(date), Some(time)) = (filter.event_date, filter.event_time) {
            sqlx::query_as(
                "SELECT * FROM bookings WHERE booking_date = $1 AND booking_time = $2 \
                 ORDER BY booking_date ASC, booking_time ASC LIMIT $3",
            )
            .bind(date)
            .bind(time)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as(
                "SELECT * FROM bookings ORDER BY booking_date ASC, booking_time ASC LIMIT $1",
            )
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows)
    }
}

#[async_trait]
impl SpecialEvents for BookingManager {
    async fn create_event(
        &self,
        event: abi::NewSpecialEvent,
    ) -> Result<abi::SpecialEvent, abi::Error> {
        let created: abi::SpecialEvent = sqlx::query_as(
            "INSERT INTO special_events (display_name, booking_date, booking_time, is_closed) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(&event.display_name)
        .bind(event.booking_date)
        .bind(event.booking_time)
        .bind(event.is_closed)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn list_events(&self) -> Result<Vec<abi::SpecialEvent>, abi::Error> {
        let events = sqlx::query_as(
            "SELECT * FROM special_events ORDER BY booking_date, booking_time",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }

    async fn get_event(&self, id: EventId) -> Result<abi::SpecialEvent, abi::Error> {
        let event: Option<abi::SpecialEvent> =
            sqlx::query_as("SELECT * FROM special_events WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        event.ok_or(abi::Error::EventNotFound)
    }

    async fn delete_event(&self, id: EventId) -> Result<abi::SpecialEvent, abi::Error> {
        // the FK cascades too; deleting explicitly keeps the count observable
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM bookings WHERE event_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted: Option<abi::SpecialEvent> =
            sqlx::query_as("DELETE FROM special_events WHERE id = $1 RETURNING *")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let deleted = deleted.ok_or(abi::Error::EventNotFound)?;
        tx.commit().await?;

        tracing::info!(
            event_id = deleted.id,
            bookings_removed = removed,
            "special event deleted"
        );
        Ok(deleted)
    }

    async fn bookable(&self, today: NaiveDate) -> Result<Vec<abi::BookableEvent>, abi::Error> {
        let specials: Vec<abi::SpecialEvent> = sqlx::query_as(
            "SELECT * FROM special_events \
             WHERE booking_date >= $1 AND NOT is_closed \
             ORDER BY booking_date, booking_time",
        )
        .bind(today)
        .fetch_all(&self.pool)
        .await?;
        Ok(catalog::bookable_events(today, specials))
    }
}
