//! Working-time slot model.
//!
//! Time is discretized into 30-minute slots on a working-hours calendar:
//! 20 slots per working day (09:00-18:00), with slots 8-9 covering the
//! 13:00-14:00 lunch hour. Slot indices are contiguous across working
//! days only; weekends are not represented as slots.
//!
//! # Weekend approximation
//!
//! [`is_weekend_slot`] treats every 6th and 7th working day of a 7-day
//! cycle (counted from the base date) as a weekend. This matches real
//! calendars only when the base date is a Monday, which is why the
//! problem builder defaults the base date to one. The simplification is
//! intentional and preserved from the system this crate models.

use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};

/// Number of 30-minute slots in one working day (09:00-18:00).
pub const SLOTS_PER_DAY: i64 = 20;

/// Length of one slot in minutes.
pub const SLOT_MINUTES: i64 = 30;

/// Hour of day at which slot 0 of each working day starts.
pub const DAY_START_HOUR: i64 = 9;

/// First slot-in-day of the lunch hour (13:00-13:30).
pub const LUNCH_FIRST_SLOT: i64 = 8;

/// Last slot-in-day of the lunch hour (13:30-14:00).
pub const LUNCH_LAST_SLOT: i64 = 9;

/// Working-day index (0 = first day) for a slot.
#[inline]
pub fn working_day(slot: i64) -> i64 {
    slot.div_euclid(SLOTS_PER_DAY)
}

/// Position of a slot within its working day (0..20).
#[inline]
pub fn slot_in_day(slot: i64) -> i64 {
    slot.rem_euclid(SLOTS_PER_DAY)
}

/// Calendar date of a slot relative to the base date.
#[inline]
pub fn slot_date(slot: i64, base_date: NaiveDate) -> NaiveDate {
    base_date + Duration::days(working_day(slot))
}

/// Converts a slot index to the wall-clock start of that slot.
pub fn slot_to_datetime(slot: i64, base_date: NaiveDate) -> NaiveDateTime {
    let date = slot_date(slot, base_date);
    let minutes = DAY_START_HOUR * 60 + slot_in_day(slot) * SLOT_MINUTES;
    let midnight = date.and_hms_opt(0, 0, 0).unwrap();
    midnight + Duration::minutes(minutes)
}

/// Converts a wall-clock time to a slot index, rounding to the nearest
/// 30-minute boundary and clamping to slot 0.
///
/// The day offset is the raw calendar-day difference from the base date,
/// not a working-day count: pinned tasks carry their true calendar date,
/// and this inverse must reproduce the slot that [`slot_to_datetime`]
/// would map back to that date.
pub fn datetime_to_slot(dt: NaiveDateTime, base_date: NaiveDate) -> i64 {
    let days = (dt.date() - base_date).num_days();
    let minutes_into_day =
        i64::from(dt.hour()) * 60 + i64::from(dt.minute()) - DAY_START_HOUR * 60;
    let slot_in_day = (minutes_into_day * 2 + SLOT_MINUTES).div_euclid(SLOT_MINUTES * 2);
    (days * SLOTS_PER_DAY + slot_in_day).max(0)
}

/// Whether a task occupying `duration_slots` slots from `start_slot`
/// touches the lunch hour of its starting day.
pub fn spans_lunch(start_slot: i64, duration_slots: i64) -> bool {
    let start = slot_in_day(start_slot);
    let end = start + duration_slots - 1;
    start <= LUNCH_LAST_SLOT && end >= LUNCH_FIRST_SLOT
}

/// Whether a slot falls on the simplified weekend cycle.
#[inline]
pub fn is_weekend_slot(slot: i64) -> bool {
    working_day(slot) % 7 >= 5
}
