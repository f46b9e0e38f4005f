use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};

/// The two fixed sunday brunch turns, in serving order.
pub fn brunch_slots() -> [NaiveTime; 2] {
    [turn(12, 0), turn(13, 30)]
}

pub fn is_brunch_slot(time: NaiveTime) -> bool {
    brunch_slots().contains(&time)
}

// total on purpose: the arguments are compile-time constants
fn turn(hour: u32, min: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, min, 0).unwrap_or(NaiveTime::MIN)
}

/// The next `n` sundays counting from `from` (inclusive when it is a sunday).
pub fn next_sundays(from: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut sundays = Vec::with_capacity(n);
    let mut day = from;
    while sundays.len() < n {
        if day.weekday() == Weekday::Sun {
            sundays.push(day);
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    sundays
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

pub fn format_day_month(date: NaiveDate) -> String {
    date.format("%d/%m").to_string()
}

pub fn format_time(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// "N/D" (non disponibile) when the booking carries no time.
pub fn format_time_or_na(time: Option<NaiveTime>) -> String {
    time.map(format_time).unwrap_or_else(|| "N/D".to_string())
}
