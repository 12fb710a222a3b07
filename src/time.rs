//! RFC 3339 style temporal literals.

use std::fmt;

#[cfg(test)]
#[path = "./time_tests.rs"]
mod tests;

/// A calendar date.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    /// Years outside `0..=9999` only arise from normalizing an [`Instant`].
    pub year: i32,
    pub month: u8,
    pub day: u8,
}

/// A wall-clock time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
    precision: u8,
}

impl Time {
    pub fn new(hour: u8, minute: u8, second: u8) -> Time {
        Time {
            hour,
            minute,
            second,
            nanosecond: 0,
            precision: 0,
        }
    }

    /// Number of fractional second digits written in the source, at most 9.
    pub fn subsecond_precision(&self) -> u8 {
        self.precision
    }
}

/// A date and time without an offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct DateTime {
    pub date: Date,
    pub time: Time,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeOffset {
    /// `Z`, a UTC offset of 00:00.
    Z,
    /// Offset between local time and UTC.
    Custom { minutes: i16 },
}

impl TimeOffset {
    pub fn minutes(&self) -> i16 {
        match self {
            TimeOffset::Z => 0,
            TimeOffset::Custom { minutes } => *minutes,
        }
    }
}

/// A point in time, normalized to UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Instant {
    utc: DateTime,
    offset: TimeOffset,
}

impl Instant {
    /// Builds an instant from a local date-time and the offset it was written with.
    pub fn from_local(local: DateTime, offset: TimeOffset) -> Instant {
        Instant {
            utc: shift_minutes(local, -(offset.minutes() as i64)),
            offset,
        }
    }

    /// The UTC date and time.
    pub fn utc(&self) -> DateTime {
        self.utc
    }

    /// The offset as written in the source, before normalization.
    pub fn original_offset(&self) -> TimeOffset {
        self.offset
    }
}

/// Result of scanning a temporal literal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Temporal {
    Instant(Instant),
    LocalDateTime(DateTime),
    LocalDate(Date),
    LocalTime(Time),
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i32, month: u8) -> u8 {
    const DAYS: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS[month as usize]
    }
}

// Proleptic Gregorian day counting relative to 1970-01-01.
fn days_from_civil(year: i32, month: u8, day: u8) -> i64 {
    let y = if month <= 2 { year as i64 - 1 } else { year as i64 };
    let era = (if y >= 0 { y } else { y - 399 }) / 400;
    let yoe = y - era * 400;
    let mp = (month as i64 + 9) % 12;
    let doy = (153 * mp + 2) / 5 + day as i64 - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * 146_097 + doe - 719_468
}

fn civil_from_days(days: i64) -> Date {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + if month <= 2 { 1 } else { 0 };
    Date {
        year: year as i32,
        month,
        day,
    }
}

fn shift_minutes(value: DateTime, delta: i64) -> DateTime {
    if delta == 0 {
        return value;
    }
    let days = days_from_civil(value.date.year, value.date.month, value.date.day);
    let minutes = days * 1440 + value.time.hour as i64 * 60 + value.time.minute as i64 + delta;
    let day_minutes = minutes.rem_euclid(1440);
    DateTime {
        date: civil_from_days(minutes.div_euclid(1440)),
        time: Time {
            hour: (day_minutes / 60) as u8,
            minute: (day_minutes % 60) as u8,
            ..value.time
        },
    }
}

/// Scans a date, time or date-time from the start of `input`.
///
/// Returns the number of bytes consumed. A date may be separated from its
/// time by `T`, `t` or a single space; an offset is only accepted when a
/// date is present.
pub(crate) fn munch(input: &[u8]) -> Option<(usize, Temporal)> {
    enum State {
        Year,
        Month,
        Day,
        Hour,
        Minute,
        Second,
        Frac,
        OffHour,
        OffMin,
    }
    let mut state = match input {
        [_, _, b':', _, _, ..] => State::Hour,
        [_, _, _, _, b'-', _, _, b'-', ..] => State::Year,
        _ => return None,
    };

    let mut date: Option<Date> = None;
    let mut partial = Date {
        year: 0,
        month: 0,
        day: 0,
    };
    let mut time: Option<Time> = None;
    let mut clock = Time::new(0, 0, 0);
    let mut offset: Option<TimeOffset> = None;

    let mut current = 0u32;
    let mut len = 0u32;
    let mut off_sign: i16 = 1;
    let mut off_hour: u8 = 0;
    let mut i = 0usize;
    let mut valid = false;

    'outer: loop {
        let byte = input.get(i).copied().unwrap_or(0);
        if byte.is_ascii_digit() {
            len += 1;
            if len <= 9 {
                current = current * 10 + (byte - b'0') as u32;
            }
            i += 1;
            continue;
        }
        'next: {
            match state {
                State::Year => {
                    if len != 4 || byte != b'-' {
                        break 'outer;
                    }
                    partial.year = current as i32;
                    state = State::Month;
                    break 'next;
                }
                State::Month => {
                    let m = current as u8;
                    if len != 2 || byte != b'-' || m < 1 || m > 12 {
                        break 'outer;
                    }
                    partial.month = m;
                    state = State::Day;
                    break 'next;
                }
                State::Day => {
                    let d = current as u8;
                    if len != 2 || d < 1 || d > days_in_month(partial.year, partial.month) {
                        break 'outer;
                    }
                    partial.day = d;
                    date = Some(partial);
                    if byte == b'T' || byte == b't' {
                        state = State::Hour;
                        break 'next;
                    } else if byte == b' ' && input.get(i + 1).is_some_and(|b| b.is_ascii_digit())
                    {
                        state = State::Hour;
                        break 'next;
                    } else {
                        valid = true;
                        break 'outer;
                    }
                }
                State::Hour => {
                    let h = current as u8;
                    if len != 2 || byte != b':' || h > 23 {
                        break 'outer;
                    }
                    clock.hour = h;
                    state = State::Minute;
                    break 'next;
                }
                State::Minute => {
                    if len != 2 || current > 59 {
                        break 'outer;
                    }
                    clock.minute = current as u8;
                    time = Some(clock);
                    if byte == b':' {
                        state = State::Second;
                        break 'next;
                    }
                }
                State::Second => {
                    // 60 is allowed for leap seconds.
                    if len != 2 || current > 60 {
                        break 'outer;
                    }
                    clock.second = current as u8;
                    time = Some(clock);
                    if byte == b'.' {
                        state = State::Frac;
                        break 'next;
                    }
                }
                State::Frac => {
                    if len == 0 {
                        break 'outer;
                    }
                    let digits = len.min(9) as u8;
                    let mut nanos = current;
                    for _ in digits..9 {
                        nanos *= 10;
                    }
                    clock.nanosecond = nanos;
                    clock.precision = digits;
                    time = Some(clock);
                }
                State::OffHour => {
                    let h = current as u8;
                    if len != 2 || byte != b':' || h > 23 {
                        break 'outer;
                    }
                    off_hour = h;
                    state = State::OffMin;
                    break 'next;
                }
                State::OffMin => {
                    if len != 2 || current > 59 {
                        break 'outer;
                    }
                    offset = Some(TimeOffset::Custom {
                        minutes: off_sign * (off_hour as i16 * 60 + current as i16),
                    });
                    valid = true;
                    break 'outer;
                }
            }
            match byte {
                b'Z' | b'z' => {
                    offset = Some(TimeOffset::Z);
                    i += 1;
                    valid = true;
                    break 'outer;
                }
                b'+' => {
                    off_sign = 1;
                    state = State::OffHour;
                }
                b'-' => {
                    off_sign = -1;
                    state = State::OffHour;
                }
                _ => {
                    valid = true;
                    break 'outer;
                }
            }
        }
        i += 1;
        current = 0;
        len = 0;
    }
    if !valid {
        return None;
    }
    let temporal = match (date, time, offset) {
        (Some(date), Some(time), Some(offset)) => {
            Temporal::Instant(Instant::from_local(DateTime { date, time }, offset))
        }
        (Some(date), Some(time), None) => Temporal::LocalDateTime(DateTime { date, time }),
        (Some(date), None, None) => Temporal::LocalDate(date),
        (None, Some(time), None) => Temporal::LocalTime(time),
        _ => return None,
    };
    Some((i, temporal))
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.year < 0 {
            f.write_str("-")?;
        }
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.year.unsigned_abs(),
            self.month,
            self.day
        )
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.precision > 0 {
            let digits = format!("{:09}", self.nanosecond);
            write!(f, ".{}", &digits[..self.precision as usize])?;
        }
        Ok(())
    }
}

impl fmt::Display for DateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}Z", self.utc)
    }
}
