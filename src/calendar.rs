use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::limits::*;

/// Calendar date with no time-of-day; the only date type.
pub type Date = NaiveDate;

pub fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

pub fn days_in_month(month: u32, year: i32) -> u32 {
    match month {
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 31,
    }
}

/// True when `day/month/year` names a real Gregorian date inside the accepted year window.
pub fn is_valid(day: u32, month: u32, year: i32) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&year)
        && (1..=12).contains(&month)
        && day >= 1
        && day <= days_in_month(month, year)
}

/// Validate primitive day/month/year input into a date.
pub fn date(day: u32, month: u32, year: i32) -> Result<Date, EngineError> {
    if !is_valid(day, month, year) {
        return Err(EngineError::InvalidDate { day, month, year });
    }
    NaiveDate::from_ymd_opt(year, month, day).ok_or(EngineError::InvalidDate { day, month, year })
}

/// Re-check a date that arrived already typed.
pub fn check(d: Date) -> Result<Date, EngineError> {
    date(d.day(), d.month(), d.year())
}

/// Parse `YYYY-MM-DD` (or `DD/MM/YYYY`) and validate it.
pub fn parse(s: &str) -> Result<Date, EngineError> {
    let bad = || EngineError::InvalidInput("date must be YYYY-MM-DD or DD/MM/YYYY");
    let parts: Vec<&str> = if s.contains('-') {
        s.split('-').collect()
    } else {
        s.split('/').rev().collect()
    };
    if parts.len() != 3 {
        return Err(bad());
    }
    let year: i32 = parts[0].parse().map_err(|_| bad())?;
    let month: u32 = parts[1].parse().map_err(|_| bad())?;
    let day: u32 = parts[2].parse().map_err(|_| bad())?;
    date(day, month, year)
}

pub fn today() -> Date {
    chrono::Local::now().date_naive()
}

/// A check-in/check-out pair with check-in strictly before check-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stay {
    pub check_in: Date,
    pub check_out: Date,
}

impl Stay {
    pub fn new(check_in: Date, check_out: Date) -> Result<Self, EngineError> {
        let check_in = check(check_in)?;
        let check_out = check(check_out)?;
        if check_out <= check_in {
            return Err(EngineError::InvalidStay { check_in, check_out });
        }
        if (check_out - check_in).num_days() > MAX_STAY_NIGHTS {
            return Err(EngineError::InvalidInput("stay too long"));
        }
        Ok(Self { check_in, check_out })
    }

    /// Single-day use (facility bookings): `[day, day + 1)`.
    pub fn single_day(day: Date) -> Result<Self, EngineError> {
        let day = check(day)?;
        let next = day
            .succ_opt()
            .ok_or(EngineError::InvalidInput("date has no successor"))?;
        Ok(Self { check_in: day, check_out: next })
    }

    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }

    pub fn contains(&self, day: Date) -> bool {
        self.check_in <= day && day < self.check_out
    }
}
