//! Date/time parsing
//!
//! ISO9660 has two datetime formats: 7-byte and 17-byte.
//! Both carry a GMT offset in 15-minute units and both have an "unset"
//! form, which decodes to `None` rather than a calendar time.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike};

use crate::error::FormatError;

/// Zoned calendar time as recorded on disc
pub type ZonedTime = DateTime<FixedOffset>;

/// Which clock a short-form time is expressed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBasis {
    /// Normalised to UTC using the recorded GMT offset
    Utc,
    /// Wall-clock time as recorded, offset discarded
    Local,
}

const GMT_OFFSET_RANGE: core::ops::RangeInclusive<i8> = -48..=52;

fn zone(gmt_offset: i8) -> Result<FixedOffset, FormatError> {
    if !GMT_OFFSET_RANGE.contains(&gmt_offset) {
        return Err(FormatError::InvalidTimestamp);
    }
    FixedOffset::east_opt(gmt_offset as i32 * 15 * 60).ok_or(FormatError::InvalidTimestamp)
}

fn gmt_units(offset: &FixedOffset) -> Result<i8, FormatError> {
    let secs = offset.local_minus_utc();
    if secs % (15 * 60) != 0 {
        return Err(FormatError::InvalidTimestamp);
    }
    let units = secs / (15 * 60);
    i8::try_from(units)
        .ok()
        .filter(|u| GMT_OFFSET_RANGE.contains(u))
        .ok_or(FormatError::InvalidTimestamp)
}

/// 7-byte directory record datetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime7 {
    /// Years since 1900
    pub year: u8,

    /// Month (1-12)
    pub month: u8,

    /// Day (1-31)
    pub day: u8,

    /// Hour (0-23)
    pub hour: u8,

    /// Minute (0-59)
    pub minute: u8,

    /// Second (0-59)
    pub second: u8,

    /// GMT offset in 15-minute intervals (-48 to +52)
    pub gmt_offset: i8,
}

impl DateTime7 {
    /// Parse from 7-byte array
    pub fn from_bytes(bytes: &[u8; 7]) -> Self {
        Self {
            year: bytes[0],
            month: bytes[1],
            day: bytes[2],
            hour: bytes[3],
            minute: bytes[4],
            second: bytes[5],
            gmt_offset: bytes[6] as i8,
        }
    }

    /// Serialize to 7 bytes
    pub fn to_bytes(&self) -> [u8; 7] {
        [
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
            self.gmt_offset as u8,
        ]
    }

    /// Get full year (1900 + year)
    pub fn full_year(&self) -> u16 {
        1900 + self.year as u16
    }

    /// All fields zero
    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    /// Convert to a zoned time, `None` when unset
    pub fn to_datetime(&self) -> Result<Option<ZonedTime>, FormatError> {
        if self.is_unset() {
            return Ok(None);
        }
        let year = self.full_year() as i32;
        let naive = NaiveDate::from_ymd_opt(year, self.month as u32, self.day as u32)
            .and_then(|d| d.and_hms_opt(self.hour as u32, self.minute as u32, self.second as u32))
            .ok_or(FormatError::InvalidTimestamp)?;
        zone(self.gmt_offset)?
            .from_local_datetime(&naive)
            .single()
            .map(Some)
            .ok_or(FormatError::InvalidTimestamp)
    }

    /// Build from a zoned time; years 1900 through 2155 are representable
    pub fn from_datetime(time: &ZonedTime) -> Result<Self, FormatError> {
        let year = u8::try_from(time.year() - 1900).map_err(|_| FormatError::InvalidTimestamp)?;
        Ok(Self {
            year,
            month: time.month() as u8,
            day: time.day() as u8,
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second().min(59) as u8,
            gmt_offset: gmt_units(time.offset())?,
        })
    }
}

/// 17-byte ASCII datetime (volume descriptors)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DateTime17 {
    /// Year (4 ASCII digits)
    pub year: u16,

    /// Month (2 ASCII digits, 1-12)
    pub month: u8,

    /// Day (2 ASCII digits, 1-31)
    pub day: u8,

    /// Hour (2 ASCII digits, 0-23)
    pub hour: u8,

    /// Minute (2 ASCII digits, 0-59)
    pub minute: u8,

    /// Second (2 ASCII digits, 0-59)
    pub second: u8,

    /// Hundredths (2 ASCII digits)
    pub hundredths: u8,

    /// GMT offset in 15-minute intervals
    pub gmt_offset: i8,
}

fn digits(bytes: &[u8]) -> Result<u32, FormatError> {
    bytes.iter().try_fold(0u32, |acc, &b| {
        if b.is_ascii_digit() {
            Ok(acc * 10 + (b - b'0') as u32)
        } else {
            Err(FormatError::InvalidTimestamp)
        }
    })
}

fn put_digits(out: &mut [u8], mut value: u32) {
    for slot in out.iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
}

impl DateTime17 {
    /// The "not specified" encoding: sixteen '0' digits and a zero offset
    pub const UNSET: [u8; 17] = *b"0000000000000000\0";

    /// Parse from 17-byte ASCII string
    ///
    /// Returns `Ok(None)` for the unset form. All-NUL fields, which some
    /// mastering tools write, are treated as unset too.
    pub fn from_bytes(bytes: &[u8; 17]) -> Result<Option<Self>, FormatError> {
        if bytes[..16].iter().all(|&b| b == b'0' || b == 0) {
            return Ok(None);
        }
        Ok(Some(Self {
            year: digits(&bytes[0..4])? as u16,
            month: digits(&bytes[4..6])? as u8,
            day: digits(&bytes[6..8])? as u8,
            hour: digits(&bytes[8..10])? as u8,
            minute: digits(&bytes[10..12])? as u8,
            second: digits(&bytes[12..14])? as u8,
            hundredths: digits(&bytes[14..16])? as u8,
            gmt_offset: bytes[16] as i8,
        }))
    }

    /// Serialize to 17 bytes
    pub fn to_bytes(&self) -> [u8; 17] {
        let mut out = [0u8; 17];
        put_digits(&mut out[0..4], self.year as u32);
        put_digits(&mut out[4..6], self.month as u32);
        put_digits(&mut out[6..8], self.day as u32);
        put_digits(&mut out[8..10], self.hour as u32);
        put_digits(&mut out[10..12], self.minute as u32);
        put_digits(&mut out[12..14], self.second as u32);
        put_digits(&mut out[14..16], self.hundredths as u32);
        out[16] = self.gmt_offset as u8;
        out
    }

    /// Convert to a zoned time
    pub fn to_datetime(&self) -> Result<ZonedTime, FormatError> {
        let naive = NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)
            .and_then(|d| {
                d.and_hms_milli_opt(
                    self.hour as u32,
                    self.minute as u32,
                    self.second as u32,
                    self.hundredths as u32 * 10,
                )
            })
            .ok_or(FormatError::InvalidTimestamp)?;
        zone(self.gmt_offset)?
            .from_local_datetime(&naive)
            .single()
            .ok_or(FormatError::InvalidTimestamp)
    }

    /// Build from a zoned time; years 1 through 9999 are representable
    pub fn from_datetime(time: &ZonedTime) -> Result<Self, FormatError> {
        if !(1..=9999).contains(&time.year()) {
            return Err(FormatError::InvalidTimestamp);
        }
        Ok(Self {
            year: time.year() as u16,
            month: time.month() as u8,
            day: time.day() as u8,
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second().min(59) as u8,
            hundredths: (time.timestamp_subsec_millis().min(999) / 10) as u8,
            gmt_offset: gmt_units(time.offset())?,
        })
    }
}

/// Decode a directory record time, keeping its zone
pub fn decode_short_time_zoned(bytes: &[u8; 7]) -> Result<Option<ZonedTime>, FormatError> {
    DateTime7::from_bytes(bytes).to_datetime()
}

/// Decode a directory record time as UTC or as recorded local time
pub fn decode_short_time(
    bytes: &[u8; 7],
    basis: TimeBasis,
) -> Result<Option<NaiveDateTime>, FormatError> {
    Ok(decode_short_time_zoned(bytes)?.map(|t| match basis {
        TimeBasis::Utc => t.naive_utc(),
        TimeBasis::Local => t.naive_local(),
    }))
}

/// Encode a directory record time
pub fn encode_short_time(time: &ZonedTime) -> Result<[u8; 7], FormatError> {
    DateTime7::from_datetime(time).map(|d| d.to_bytes())
}

/// Decode a volume descriptor time, `None` when unset
pub fn decode_long_time(bytes: &[u8; 17]) -> Result<Option<ZonedTime>, FormatError> {
    DateTime17::from_bytes(bytes)?.map(|d| d.to_datetime()).transpose()
}

/// Encode a volume descriptor time, writing the unset form for `None`
pub fn encode_long_time(time: Option<&ZonedTime>) -> Result<[u8; 17], FormatError> {
    match time {
        Some(t) => DateTime17::from_datetime(t).map(|d| d.to_bytes()),
        None => Ok(DateTime17::UNSET),
    }
}
