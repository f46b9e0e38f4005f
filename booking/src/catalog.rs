use chrono::NaiveDate;

use abi::{brunch_slots, next_sundays, BookableEvent, SpecialEvent};

/// How many sundays of brunch the catalog offers ahead.
const BRUNCH_SUNDAYS: usize = 8;

/// Build the list of currently bookable occasions for `today`.
///
/// Pure function of the date and the stored special events: the caller passes
/// whatever `special_events` rows it wants offered; past or closed ones are
/// filtered out here regardless. Recomputed on every call, never cached.
pub fn bookable_events(today: NaiveDate, specials: Vec<SpecialEvent>) -> Vec<BookableEvent> {
    let mut events: Vec<BookableEvent> = specials
        .into_iter()
        .filter(|e| e.booking_date >= today && !e.is_closed)
        .map(BookableEvent::special)
        .collect();

    for sunday in next_sundays(today, BRUNCH_SUNDAYS) {
        events.push(BookableEvent::brunch(sunday, brunch_slots().to_vec()));
    }

    events.sort_by_key(|e| (e.booking_date(), e.sort_time()));
    events
}
