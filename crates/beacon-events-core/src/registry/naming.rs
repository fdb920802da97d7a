// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::{EventsError, Result};

/// Canonical form of a category or event name: trimmed and lowercased.
pub fn normalize_name(name: &str) -> String {
	name.trim().to_lowercase()
}

/// Values accepted wherever a declaration takes a timestamp.
pub trait IntoTimestamp {
	fn into_timestamp(self) -> Result<DateTime<Utc>>;
}

impl<Tz: TimeZone> IntoTimestamp for DateTime<Tz> {
	fn into_timestamp(self) -> Result<DateTime<Utc>> {
		Ok(self.with_timezone(&Utc))
	}
}

impl IntoTimestamp for NaiveDate {
	fn into_timestamp(self) -> Result<DateTime<Utc>> {
		self
			.and_hms_opt(0, 0, 0)
			.map(|midnight| Utc.from_utc_datetime(&midnight))
			.ok_or_else(|| EventsError::configuration(format!("invalid date {self}")))
	}
}

impl IntoTimestamp for &str {
	fn into_timestamp(self) -> Result<DateTime<Utc>> {
		parse_timestamp(self)
	}
}

impl IntoTimestamp for String {
	fn into_timestamp(self) -> Result<DateTime<Utc>> {
		parse_timestamp(&self)
	}
}

impl IntoTimestamp for &String {
	fn into_timestamp(self) -> Result<DateTime<Utc>> {
		parse_timestamp(self)
	}
}

/// Parses a declaration timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` (both taken
/// as UTC), and a bare `YYYY-MM-DD` (UTC midnight).
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
	let text = text.trim();

	if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
		return Ok(ts.with_timezone(&Utc));
	}

	for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
		if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
			return Ok(Utc.from_utc_datetime(&naive));
		}
	}

	if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
		return date.into_timestamp();
	}

	Err(EventsError::configuration(format!(
		"unrecognized timestamp {text:?}; expected YYYY-MM-DD or an RFC 3339 time"
	)))
}

/// Rejects blank strings for a named field.
pub(crate) fn require_non_blank(field: &str, value: &str) -> Result<String> {
	let trimmed = value.trim();
	if trimmed.is_empty() {
		return Err(EventsError::configuration(format!("{field} must not be blank")));
	}
	Ok(trimmed.to_string())
}
