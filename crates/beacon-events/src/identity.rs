// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use beacon_events_core::EventsError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Property key that overrides the tracker's distinct ID for one event.
pub const DISTINCT_ID_PROPERTY: &str = "distinct_id";

/// Identifies who an event is about. Always a string or an integer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistinctId {
	Integer(i64),
	String(String),
}

impl DistinctId {
	/// Converts a normalized property value into an identity.
	///
	/// `null` clears the identity; composite or fractional values are rejected.
	pub fn from_property(value: Value) -> Result<Option<Self>, EventsError> {
		match value {
			Value::Null => Ok(None),
			Value::String(s) => Ok(Some(DistinctId::String(s))),
			Value::Number(n) => n
				.as_i64()
				.map(|i| Some(DistinctId::Integer(i)))
				.ok_or_else(|| EventsError::type_mismatch(DISTINCT_ID_PROPERTY, "a string or an integer", n.to_string())),
			other => Err(EventsError::type_mismatch(
				DISTINCT_ID_PROPERTY,
				"a string or an integer",
				other.to_string(),
			)),
		}
	}
}

impl fmt::Display for DistinctId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			DistinctId::Integer(i) => write!(f, "{i}"),
			DistinctId::String(s) => write!(f, "{s}"),
		}
	}
}

impl From<&str> for DistinctId {
	fn from(value: &str) -> Self {
		DistinctId::String(value.to_string())
	}
}

impl From<String> for DistinctId {
	fn from(value: String) -> Self {
		DistinctId::String(value)
	}
}

impl From<i64> for DistinctId {
	fn from(value: i64) -> Self {
		DistinctId::Integer(value)
	}
}

impl From<i32> for DistinctId {
	fn from(value: i32) -> Self {
		DistinctId::Integer(i64::from(value))
	}
}

impl From<u32> for DistinctId {
	fn from(value: u32) -> Self {
		DistinctId::Integer(i64::from(value))
	}
}

impl From<DistinctId> for Value {
	fn from(id: DistinctId) -> Self {
		match id {
			DistinctId::Integer(i) => Value::from(i),
			DistinctId::String(s) => Value::String(s),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use serde_json::json;

	#[test]
	fn test_from_property() {
		assert_eq!(
			DistinctId::from_property(json!("abc")).unwrap(),
			Some(DistinctId::from("abc"))
		);
		assert_eq!(
			DistinctId::from_property(json!(483123)).unwrap(),
			Some(DistinctId::Integer(483123))
		);
		assert_eq!(DistinctId::from_property(Value::Null).unwrap(), None);
	}

	#[test]
	fn test_composite_values_rejected() {
		assert!(matches!(
			DistinctId::from_property(json!(["a"])),
			Err(EventsError::TypeMismatch { .. })
		));
		assert!(matches!(
			DistinctId::from_property(json!(1.5)),
			Err(EventsError::TypeMismatch { .. })
		));
		assert!(DistinctId::from_property(json!(true)).is_err());
	}

	#[test]
	fn test_serializes_untagged() {
		assert_eq!(serde_json::to_value(DistinctId::Integer(7)).unwrap(), json!(7));
		assert_eq!(serde_json::to_value(DistinctId::from("u")).unwrap(), json!("u"));
		assert_eq!(DistinctId::Integer(483123).to_string(), "483123");
	}

	proptest! {
		#[test]
		fn prop_scalar_identities_survive_properties(i in any::<i64>(), s in ".*") {
			let id = DistinctId::Integer(i);
			prop_assert_eq!(DistinctId::from_property(Value::from(id.clone())).unwrap(), Some(id));

			let id = DistinctId::String(s);
			prop_assert_eq!(DistinctId::from_property(Value::from(id.clone())).unwrap(), Some(id));
		}
	}
}
