//! MS-DOS timestamps as stored in ZIP headers.
//!
//! ZIP records the last-modified time of each entry as two 16-bit words:
//!
//! - time: `hhhhhmmmmmmsssss` (seconds stored halved)
//! - date: `yyyyyyymmmmddddd` (years since 1980)
//!
//! The format carries no time zone. This crate reads and writes the fields as
//! UTC so that baked archives do not depend on the machine's locale.
//!
//! # Example
//!
//! ```rust
//! use prebake::DosDateTime;
//! use std::time::{Duration, UNIX_EPOCH};
//!
//! // 2016-06-05 12:34:56 UTC
//! let ts = DosDateTime::from_system_time(UNIX_EPOCH + Duration::from_secs(1_465_130_096));
//! assert_eq!((ts.year(), ts.month(), ts.day()), (2016, 6, 5));
//! assert_eq!((ts.hour(), ts.minute(), ts.second()), (12, 34, 56));
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

const SECS_PER_DAY: i64 = 86_400;

/// Earliest representable instant: 1980-01-01 00:00:00.
const DOS_EPOCH_UNIX_SECS: i64 = 315_532_800;

/// A ZIP last-modified timestamp with 2-second precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DosDateTime {
    date: u16,
    time: u16,
}

impl Default for DosDateTime {
    /// 1980-01-01 00:00:00, the DOS epoch.
    fn default() -> Self {
        Self {
            date: (1 << 5) | 1,
            time: 0,
        }
    }
}

impl DosDateTime {
    /// Wraps the raw header words.
    #[inline]
    pub const fn from_raw(date: u16, time: u16) -> Self {
        Self { date, time }
    }

    /// Returns the raw `(date, time)` words for a header.
    #[inline]
    pub const fn to_raw(self) -> (u16, u16) {
        (self.date, self.time)
    }

    /// Converts a `SystemTime` to DOS format.
    ///
    /// Instants before 1980 clamp to the DOS epoch, instants after 2107 clamp
    /// to the last representable second. Odd seconds round down.
    pub fn from_system_time(time: SystemTime) -> Self {
        let secs = match time.duration_since(UNIX_EPOCH) {
            Ok(d) => i64::try_from(d.as_secs()).unwrap_or(i64::MAX),
            Err(_) => return Self::default(),
        };
        if secs < DOS_EPOCH_UNIX_SECS {
            return Self::default();
        }

        let days = secs.div_euclid(SECS_PER_DAY);
        let rem = secs.rem_euclid(SECS_PER_DAY);
        let (year, month, day) = civil_from_days(days);
        if year > 2107 {
            return Self::from_fields(2107, 12, 31, 23, 59, 58);
        }

        Self::from_fields(
            year as u16,
            month,
            day,
            (rem / 3600) as u8,
            ((rem % 3600) / 60) as u8,
            (rem % 60) as u8,
        )
    }

    /// The current time in DOS format.
    pub fn now() -> Self {
        Self::from_system_time(SystemTime::now())
    }

    fn from_fields(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8) -> Self {
        let date = ((year - 1980) << 9) | (u16::from(month) << 5) | u16::from(day);
        let time = (u16::from(hour) << 11) | (u16::from(minute) << 5) | u16::from(second / 2);
        Self { date, time }
    }

    /// Calendar year (1980-2107).
    pub fn year(&self) -> u16 {
        1980 + (self.date >> 9)
    }

    /// Month (1-12 for valid values).
    pub fn month(&self) -> u8 {
        ((self.date >> 5) & 0x0F) as u8
    }

    /// Day of month (1-31 for valid values).
    pub fn day(&self) -> u8 {
        (self.date & 0x1F) as u8
    }

    /// Hour (0-23).
    pub fn hour(&self) -> u8 {
        (self.time >> 11) as u8
    }

    /// Minute (0-59).
    pub fn minute(&self) -> u8 {
        ((self.time >> 5) & 0x3F) as u8
    }

    /// Second, always even.
    pub fn second(&self) -> u8 {
        ((self.time & 0x1F) * 2) as u8
    }

    /// Converts back to a `SystemTime`, interpreting the fields as UTC.
    ///
    /// Out-of-range month/day values (which some tools write) are clamped.
    pub fn as_system_time(&self) -> SystemTime {
        let month = self.month().clamp(1, 12);
        let day = self.day().max(1);
        let days = days_from_civil(i64::from(self.year()), month, day);
        let secs = days * SECS_PER_DAY
            + i64::from(self.hour()) * 3600
            + i64::from(self.minute()) * 60
            + i64::from(self.second());
        UNIX_EPOCH + Duration::from_secs(secs.max(0) as u64)
    }
}

impl From<SystemTime> for DosDateTime {
    fn from(time: SystemTime) -> Self {
        Self::from_system_time(time)
    }
}

/// Days since 1970-01-01 to a proleptic Gregorian `(year, month, day)`.
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn days_from_civil(year: i64, month: u8, day: u8) -> i64 {
    let year = year - i64::from(month <= 2);
    let era = year.div_euclid(400);
    let yoe = year.rem_euclid(400);
    let m = i64::from(month);
    let doy = (153 * (if m > 2 { m - 3 } else { m + 9 }) + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}
