//! Wall-clock timestamp shared by every component.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::time::SystemTime;

/// Milliseconds since the Unix epoch.
///
/// Stored in the database as RFC-3339 text (per the data model) but kept as
/// an `i64` offset in memory for cheap comparisons and arithmetic.
/// Millisecond rather than second resolution matters for `createdAt`
/// ordering: §5 requires the queue to drain in `createdAt` order, and
/// several operations can be enqueued within the same second (e.g. three
/// rapid `createDocumentOffline` calls ahead of one debounced drain).
#[derive(Clone, Copy, Debug, Default)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(res.as_millis() as i64)
	}

	/// `now() + delta_ms`, used by the queue's backoff scheduling.
	pub fn from_now_ms(delta_ms: i64) -> Timestamp {
		Timestamp(Self::now().0 + delta_ms)
	}

	pub fn is_past(&self) -> bool {
		*self <= Timestamp::now()
	}

	pub fn to_rfc3339(&self) -> String {
		DateTime::<Utc>::from_timestamp_millis(self.0)
			.unwrap_or_else(Utc::now)
			.to_rfc3339_opts(SecondsFormat::Millis, true)
	}

	pub fn parse_rfc3339(s: &str) -> Option<Timestamp> {
		DateTime::parse_from_rfc3339(s).ok().map(|dt| Timestamp(dt.timestamp_millis()))
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.to_rfc3339())
	}
}

impl PartialEq for Timestamp {
	fn eq(&self, other: &Self) -> bool {
		self.0 == other.0
	}
}
impl Eq for Timestamp {}

impl PartialOrd for Timestamp {
	fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}
impl Ord for Timestamp {
	fn cmp(&self, other: &Self) -> std::cmp::Ordering {
		self.0.cmp(&other.0)
	}
}

impl Serialize for Timestamp {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		serializer.serialize_str(&self.to_rfc3339())
	}
}

impl<'de> Deserialize<'de> for Timestamp {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let s = String::deserialize(deserializer)?;
		Timestamp::parse_rfc3339(&s)
			.ok_or_else(|| serde::de::Error::custom(format!("invalid RFC-3339 timestamp: {}", s)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_epoch() {
		let ts = Timestamp(0);
		assert_eq!(ts.to_rfc3339(), "1970-01-01T00:00:00.000Z");
		assert_eq!(Timestamp::parse_rfc3339(&ts.to_rfc3339()), Some(Timestamp(0)));
	}

	#[test]
	fn round_trips_sub_second_precision() {
		let ts = Timestamp(1_700_000_123_456);
		assert_eq!(Timestamp::parse_rfc3339(&ts.to_rfc3339()), Some(Timestamp(1_700_000_123_456)));
	}

	#[test]
	fn orders_chronologically() {
		assert!(Timestamp(1) < Timestamp(2));
	}

	#[test]
	fn distinguishes_timestamps_within_the_same_second() {
		// Two operations enqueued a few milliseconds apart within the same
		// wall-clock second must still compare distinctly, so a `createdAt`
		// ordering sort recovers their real enqueue order.
		assert!(Timestamp(1_700_000_000_010) < Timestamp(1_700_000_000_090));
	}

	#[test]
	fn from_now_ms_adds_delta() {
		let base = Timestamp::now();
		let later = Timestamp::from_now_ms(5_000);
		assert!(later.0 >= base.0 + 4_990 && later.0 <= base.0 + 5_010);
	}
}

// vim: ts=4
