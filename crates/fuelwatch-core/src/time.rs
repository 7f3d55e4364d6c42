//! Transaction timestamps.
//!
//! The upstream API reports UTC. Everything stored is shifted to a fixed
//! `+10:00` offset (Queensland observes no daylight saving) and serialised as
//! `YYYY-MM-DDTHH:MM:SS+10:00`, truncated to whole seconds.

use chrono::{DateTime, FixedOffset, Offset as _, SubsecRound as _, Utc};

use crate::{Error, Result};

/// Seconds east of UTC for stored timestamps.
pub const LOCAL_OFFSET_SECS: i32 = 10 * 3600;

/// `strftime` pattern for the stored representation.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

pub fn local_offset() -> FixedOffset {
  FixedOffset::east_opt(LOCAL_OFFSET_SECS).unwrap_or_else(|| Utc.fix())
}

/// Shift a UTC instant to the local offset, dropping sub-second precision.
pub fn to_local(utc: DateTime<Utc>) -> DateTime<FixedOffset> {
  utc.trunc_subsecs(0).with_timezone(&local_offset())
}

pub fn encode_local(ts: DateTime<FixedOffset>) -> String {
  ts.with_timezone(&local_offset())
    .format(TIMESTAMP_FORMAT)
    .to_string()
}

pub fn decode_local(s: &str) -> Result<DateTime<FixedOffset>> {
  DateTime::parse_from_rfc3339(s).map_err(|_| Error::Timestamp(s.to_owned()))
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone as _;

  use super::*;

  #[test]
  fn midnight_utc_is_ten_am_local() {
    let utc = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    assert_eq!(encode_local(to_local(utc)), "2024-01-01T10:00:00+10:00");
  }

  #[test]
  fn late_utc_rolls_into_next_local_day() {
    let utc = Utc.with_ymd_and_hms(2024, 3, 5, 15, 30, 0).unwrap();
    let local = to_local(utc);
    assert_eq!(encode_local(local), "2024-03-06T01:30:00+10:00");
    assert_eq!(local.date_naive().to_string(), "2024-03-06");
  }

  #[test]
  fn decode_accepts_stored_form() {
    let ts = decode_local("2024-01-01T10:00:00+10:00").unwrap();
    assert_eq!(encode_local(ts), "2024-01-01T10:00:00+10:00");
  }

  #[test]
  fn encode_normalises_foreign_offsets() {
    let ts = decode_local("2024-01-01T00:00:00+00:00").unwrap();
    assert_eq!(encode_local(ts), "2024-01-01T10:00:00+10:00");
  }

  #[test]
  fn decode_rejects_garbage() {
    assert!(matches!(decode_local("yesterday"), Err(Error::Timestamp(_))));
  }
}
