// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Normalization of single property values into wire-safe scalars.
//!
//! Every value sent to a receiver is one of: boolean, null, number, string,
//! or a homogeneous array of those. Values that are not floating-point
//! representable (NaN, infinities) become sentinel strings; timestamps become
//! UTC strings with seconds precision; IP addresses become their canonical
//! text form.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Number, Value};

use crate::value::PropertyValue;

/// Sent in place of a NaN float.
pub const NAN_SENTINEL: &str = "NaN";
/// Sent in place of positive infinity.
pub const POSITIVE_INFINITY_SENTINEL: &str = "+infinity";
/// Sent in place of negative infinity.
pub const NEGATIVE_INFINITY_SENTINEL: &str = "-infinity";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Normalizes a single value into its wire form.
///
/// Returns `None` when the value is not a scalar: maps, property bundles,
/// opaque values, and arrays containing any of those. The merger decides what
/// to do with non-scalars; this function never fails.
pub fn normalize(value: &PropertyValue) -> Option<Value> {
	match value {
		PropertyValue::Null => Some(Value::Null),
		PropertyValue::Bool(b) => Some(Value::Bool(*b)),
		PropertyValue::Float(f) => Some(normalize_float(*f)),
		PropertyValue::Integer(i) => Some(Value::from(*i)),
		PropertyValue::Unsigned(u) => Some(Value::from(*u)),
		PropertyValue::Duration(d) => Some(Value::from(d.as_secs())),
		PropertyValue::String(s) => Some(Value::String(s.trim().to_string())),
		PropertyValue::Symbol(s) => Some(Value::String(s.trim().to_string())),
		PropertyValue::Timestamp(ts) => Some(Value::String(format_timestamp(ts))),
		PropertyValue::Ip(ip) => Some(Value::String(ip.to_string())),
		PropertyValue::Array(values) => values
			.iter()
			.map(normalize)
			.collect::<Option<Vec<_>>>()
			.map(Value::Array),
		PropertyValue::Map(_) | PropertyValue::Bundle(_) | PropertyValue::Opaque(_) => None,
	}
}

/// Returns true if `value` normalizes to a scalar.
pub fn is_scalar(value: &PropertyValue) -> bool {
	normalize(value).is_some()
}

/// Formats a timestamp as UTC `YYYY-MM-DDTHH:MM:SS`.
///
/// The conversion produces a new value; the input and its time zone are left
/// as they were.
pub fn format_timestamp<Tz: TimeZone>(ts: &DateTime<Tz>) -> String {
	ts.with_timezone(&Utc).format(TIMESTAMP_FORMAT).to_string()
}

fn normalize_float(f: f64) -> Value {
	if f.is_nan() {
		Value::String(NAN_SENTINEL.to_string())
	} else if f == f64::INFINITY {
		Value::String(POSITIVE_INFINITY_SENTINEL.to_string())
	} else if f == f64::NEG_INFINITY {
		Value::String(NEGATIVE_INFINITY_SENTINEL.to_string())
	} else {
		// Finite floats always have a JSON representation.
		Number::from_f64(f).map_or(Value::Null, Value::Number)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::{PropertyBundle, PropertySource};
	use chrono::FixedOffset;
	use proptest::prelude::*;
	use std::net::{IpAddr, Ipv6Addr};
	use std::time::Duration;

	#[derive(Debug)]
	struct Empty;

	impl PropertyBundle for Empty {
		fn to_property_bundle(&self) -> PropertySource {
			PropertySource::new()
		}
	}

	fn norm(value: impl Into<PropertyValue>) -> Option<Value> {
		normalize(&value.into())
	}

	#[test]
	fn test_booleans_and_null_pass_through() {
		assert_eq!(norm(true), Some(Value::Bool(true)));
		assert_eq!(norm(false), Some(Value::Bool(false)));
		assert_eq!(normalize(&PropertyValue::Null), Some(Value::Null));
		assert_eq!(norm(None::<i32>), Some(Value::Null));
	}

	#[test]
	fn test_float_sentinels() {
		assert_eq!(norm(f64::NAN), Some(Value::String("NaN".to_string())));
		assert_eq!(
			norm(f64::INFINITY),
			Some(Value::String("+infinity".to_string()))
		);
		assert_eq!(
			norm(f64::NEG_INFINITY),
			Some(Value::String("-infinity".to_string()))
		);
		assert_eq!(norm(2.5), Some(serde_json::json!(2.5)));
	}

	#[test]
	fn test_numbers() {
		assert_eq!(norm(27), Some(serde_json::json!(27)));
		assert_eq!(norm(-3i64), Some(serde_json::json!(-3)));
		assert_eq!(norm(u64::MAX), Some(serde_json::json!(u64::MAX)));
	}

	#[test]
	fn test_duration_becomes_seconds() {
		assert_eq!(
			norm(Duration::from_millis(90_500)),
			Some(serde_json::json!(90))
		);
	}

	#[test]
	fn test_strings_and_symbols_are_trimmed() {
		assert_eq!(norm("  Hello World \n"), Some(serde_json::json!("Hello World")));
		assert_eq!(
			normalize(&PropertyValue::symbol(" premium ")),
			Some(serde_json::json!("premium"))
		);
	}

	#[test]
	fn test_timestamp_formatted_as_utc() {
		let offset = FixedOffset::west_opt(8 * 3600).unwrap();
		let ts = offset.with_ymd_and_hms(2014, 2, 4, 20, 15, 30).unwrap();
		assert_eq!(norm(ts), Some(serde_json::json!("2014-02-05T04:15:30")));
	}

	#[test]
	fn test_timestamp_drops_fractional_seconds() {
		let ts = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 1).unwrap()
			+ chrono::Duration::milliseconds(999);
		assert_eq!(norm(ts), Some(serde_json::json!("2020-01-01T00:00:01")));
	}

	#[test]
	fn test_timestamp_is_not_mutated() {
		let offset = FixedOffset::east_opt(3600).unwrap();
		let ts = offset.with_ymd_and_hms(2014, 2, 4, 1, 0, 0).unwrap();
		let value = PropertyValue::from(ts);
		let _ = normalize(&value);
		match value {
			PropertyValue::Timestamp(stored) => {
				assert_eq!(stored, ts);
				assert_eq!(stored.offset().local_minus_utc(), 3600);
			}
			other => panic!("expected timestamp, got {other:?}"),
		}
	}

	#[test]
	fn test_float_edge_cases_are_not_mutated() {
		let value = PropertyValue::Float(f64::NAN);
		let _ = normalize(&value);
		assert!(matches!(value, PropertyValue::Float(f) if f.is_nan()));

		let value = PropertyValue::Float(f64::NEG_INFINITY);
		let _ = normalize(&value);
		assert!(matches!(value, PropertyValue::Float(f) if f == f64::NEG_INFINITY));
	}

	#[test]
	fn test_ip_addresses() {
		assert_eq!(
			normalize(&PropertyValue::ip("127.0.0.1").unwrap()),
			Some(serde_json::json!("127.0.0.1"))
		);
		assert_eq!(
			normalize(&PropertyValue::ip("2607:f0d0:1002:0051:0000:0000:0000:0004").unwrap()),
			Some(serde_json::json!("2607:f0d0:1002:51::4"))
		);
		assert_eq!(
			normalize(&PropertyValue::ip_from_u32(0x7f00_0001)),
			Some(serde_json::json!("127.0.0.1"))
		);
		assert_eq!(
			norm(IpAddr::V6(Ipv6Addr::LOCALHOST)),
			Some(serde_json::json!("::1"))
		);
	}

	#[test]
	fn test_arrays_normalize_elementwise() {
		assert_eq!(
			norm(vec![PropertyValue::from(" a "), PropertyValue::from(1), PropertyValue::Float(f64::NAN)]),
			Some(serde_json::json!(["a", 1, "NaN"]))
		);
	}

	#[test]
	fn test_array_with_non_scalar_fails() {
		let value = PropertyValue::Array(vec![
			PropertyValue::from(1),
			PropertyValue::Map(PropertySource::new()),
		]);
		assert_eq!(normalize(&value), None);
	}

	#[test]
	fn test_non_scalars() {
		assert_eq!(normalize(&PropertyValue::Map(PropertySource::new())), None);
		assert_eq!(normalize(&PropertyValue::bundle(Empty)), None);
		assert_eq!(normalize(&PropertyValue::Opaque("/foo/".to_string())), None);
		assert!(!is_scalar(&PropertyValue::Opaque("/foo/".to_string())));
	}

	fn scalar_strategy() -> impl Strategy<Value = PropertyValue> {
		let leaf = prop_oneof![
			Just(PropertyValue::Null),
			any::<bool>().prop_map(PropertyValue::Bool),
			any::<i64>().prop_map(PropertyValue::Integer),
			any::<u64>().prop_map(PropertyValue::Unsigned),
			any::<f64>().prop_map(PropertyValue::Float),
			"[ a-zA-Z0-9]{0,20}".prop_map(PropertyValue::String),
			any::<u32>().prop_map(PropertyValue::ip_from_u32),
			(0i64..4_000_000_000).prop_map(|secs| {
				PropertyValue::from(Utc.timestamp_opt(secs, 0).unwrap())
			}),
		];
		leaf.prop_recursive(2, 16, 4, |inner| {
			prop::collection::vec(inner, 0..4).prop_map(PropertyValue::Array)
		})
	}

	proptest! {
		#[test]
		fn normalization_is_idempotent(value in scalar_strategy()) {
			let once = normalize(&value).expect("scalar strategy only yields scalars");
			let twice = normalize(&PropertyValue::from(once.clone()));
			prop_assert_eq!(twice, Some(once));
		}

		#[test]
		fn normalized_strings_have_no_outer_whitespace(s in "\\s{0,3}[a-z]{0,10}\\s{0,3}") {
			let normalized = normalize(&PropertyValue::String(s.clone())).unwrap();
			prop_assert_eq!(normalized, Value::String(s.trim().to_string()));
		}
	}
}
