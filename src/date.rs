// MIT License - Copyright (c) 2026 Peter Wright
// CM11A wire codec

//! Compact calendar representation shared by the clock and status frames.
//!
//! The interface keeps time as five bytes with no year:
//!
//! ```text
//! [seconds 0-59][minutes 0-119][hours/2 0-11][yday bits 0-7][yday bit 8 | SMTWTFS]
//! ```
//!
//! Odd hours are folded into the minutes byte (minute + 60). The year day is
//! 1-based and nine bits wide; its top bit shares the last byte with a
//! one-hot weekday mask, Sunday at bit 6 down to Saturday at bit 0.
//!
//! Reading the date back needs a reference date to pick the year, see
//! [`nearest_date`].

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use tracing::warn;

use crate::error::{ProtocolError, Result};

/// Length of the packed timestamp.
pub const COMPACT_DATE_LEN: usize = 5;

/// One-hot SMTWTFS mask for a weekday.
pub fn weekday_mask(weekday: Weekday) -> u8 {
    1 << (6 - weekday.num_days_from_sunday())
}

fn days_in_year(year: i32) -> u32 {
    NaiveDate::from_ymd_opt(year, 12, 31).map_or(365, |d| d.ordinal())
}

/// The `day_of_year`-th day (1-366) of the year nearest to `reference`.
///
/// Candidates are taken from the year before, the year of and the year after
/// the reference; a day 366 in a common year becomes December 31. The
/// candidate with the smallest absolute distance wins. When two candidates
/// are equally far away the earlier one is returned.
pub fn nearest_date(reference: NaiveDate, day_of_year: u16) -> Result<NaiveDate> {
    if !(1..=366).contains(&day_of_year) {
        return Err(ProtocolError::invalid(format!(
            "day of year {} outside 1-366",
            day_of_year
        )));
    }

    let year = reference.year();
    let mut best: Option<(i64, NaiveDate)> = None;
    for candidate_year in [year - 1, year, year + 1] {
        let ordinal = (day_of_year as u32).min(days_in_year(candidate_year));
        let Some(candidate) = NaiveDate::from_yo_opt(candidate_year, ordinal) else {
            continue;
        };
        let distance = (candidate - reference).num_days().abs();
        // Strictly less keeps the earliest candidate on a tie
        if best.map_or(true, |(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, date)| date)
        .ok_or_else(|| ProtocolError::invalid(format!("no calendar date near {}", reference)))
}

/// Pack a timestamp into the five-byte interface format.
pub fn pack_timestamp(timestamp: &NaiveDateTime) -> [u8; COMPACT_DATE_LEN] {
    let hour = timestamp.hour();
    let yday = timestamp.ordinal();
    [
        timestamp.second().min(59) as u8,
        (timestamp.minute() + 60 * (hour % 2)) as u8,
        (hour / 2) as u8,
        (yday & 0xFF) as u8,
        (((yday >> 8) & 0x01) << 7) as u8 | weekday_mask(timestamp.weekday()),
    ]
}

/// Unpack a five-byte timestamp, taking the year from the one nearest to
/// `reference`.
///
/// A weekday mask that disagrees with the reconstructed date is logged but
/// not rejected; the year day is authoritative.
pub fn unpack_timestamp(bytes: &[u8], reference: NaiveDate) -> Result<NaiveDateTime> {
    let [seconds, minutes, half_hours, yday_low, yday_high] = match bytes {
        [a, b, c, d, e] => [*a, *b, *c, *d, *e],
        _ => {
            return Err(ProtocolError::invalid(format!(
                "timestamp must be {} bytes, got {}",
                COMPACT_DATE_LEN,
                bytes.len()
            )))
        }
    };
    if seconds > 59 || minutes > 119 || half_hours > 11 {
        return Err(ProtocolError::invalid(format!(
            "time out of range: {:02X} {:02X} {:02X}",
            seconds, minutes, half_hours
        )));
    }

    let yday = yday_low as u16 | (((yday_high & 0x80) as u16) << 1);
    let date = nearest_date(reference, yday)?;

    let mask = yday_high & 0x7F;
    if mask != weekday_mask(date.weekday()) {
        warn!(
            "Weekday mask {:#09b} does not match {} ({})",
            mask,
            date,
            date.weekday()
        );
    }

    let hour = half_hours as u32 * 2 + minutes as u32 / 60;
    let time = NaiveTime::from_hms_opt(hour, minutes as u32 % 60, seconds as u32)
        .ok_or_else(|| ProtocolError::invalid("time out of range"))?;
    Ok(date.and_time(time))
}
