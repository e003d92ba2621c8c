//! Timestamp helpers: RFC 3339 parsing, the fixed local offset used for hour-of-day
//! bucketing, and the `Window` every aggregate filters through.

use time::format_description::well_known::Rfc3339;
use time::macros::{datetime, offset};
use time::{Duration, OffsetDateTime, UtcOffset};

/// Local offset of the community the feed serves (UTC-4, no DST adjustment).
pub const DEFAULT_OFFSET: UtcOffset = offset!(-4);

/// First instant the archive holds data for; the default window start.
pub const ARCHIVE_EPOCH: OffsetDateTime = datetime!(2022-10-13 0:00 -4);

/// Parse a remote timestamp. Accepts RFC 3339 and the `YYYY-MM-DD HH:MM:SS+hh:mm`
/// variant (space instead of `T`) some endpoints emit.
pub fn parse_timestamp(s: &str) -> Result<OffsetDateTime, time::error::Parse> {
    let s = s.trim();
    match OffsetDateTime::parse(s, &Rfc3339) {
        Ok(dt) => Ok(dt),
        Err(e) => {
            if s.len() > 10 && s.as_bytes()[10] == b' ' {
                let fixed = format!("{}T{}", &s[..10], &s[11..]);
                OffsetDateTime::parse(&fixed, &Rfc3339)
            } else {
                Err(e)
            }
        }
    }
}

/// Half-open time window `[start, end)` plus the offset used to derive local hours.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Window {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
    pub offset: UtcOffset,
}

impl Default for Window {
    fn default() -> Self {
        Self { start: ARCHIVE_EPOCH, end: OffsetDateTime::now_utc(), offset: DEFAULT_OFFSET }
    }
}

impl Window {
    pub fn new(start: OffsetDateTime, end: OffsetDateTime) -> Self {
        Self { start, end, offset: DEFAULT_OFFSET }
    }

    /// From `start` until now.
    pub fn since(start: OffsetDateTime) -> Self {
        Self { start, ..Self::default() }
    }

    pub fn with_start(mut self, start: OffsetDateTime) -> Self { self.start = start; self }
    pub fn with_end(mut self, end: OffsetDateTime) -> Self { self.end = end; self }
    pub fn with_offset(mut self, offset: UtcOffset) -> Self { self.offset = offset; self }

    #[inline]
    pub fn contains(&self, t: OffsetDateTime) -> bool {
        self.start <= t && t < self.end
    }

    #[inline]
    pub fn local_hour(&self, t: OffsetDateTime) -> u8 {
        t.to_offset(self.offset).hour()
    }

    /// How many times each local hour-of-day occurs inside the window: every whole
    /// elapsed day counts once for all 24 hours, and the trailing partial day adds one
    /// for each hour it touches. Never returns 0 for any hour.
    pub fn hour_occurrences(&self) -> [u32; 24] {
        if self.end <= self.start {
            return [1; 24];
        }
        let span = self.end - self.start;
        let full_days = span.whole_days();
        let mut occ = [u32::try_from(full_days).unwrap_or(u32::MAX); 24];

        let mut t = self.start + Duration::days(full_days);
        while t < self.end {
            let local = t.to_offset(self.offset);
            occ[local.hour() as usize] = occ[local.hour() as usize].saturating_add(1);
            let into_hour = Duration::minutes(local.minute().into())
                + Duration::seconds(local.second().into())
                + Duration::nanoseconds(local.nanosecond().into());
            t = t - into_hour + Duration::HOUR;
        }

        for n in occ.iter_mut() {
            if *n == 0 { *n = 1; }
        }
        occ
    }
}
