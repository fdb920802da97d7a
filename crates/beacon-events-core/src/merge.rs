// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Flattening nested property sources into a single property map.
//!
//! Nested maps and property bundles are expanded by joining keys with a
//! separator: `{user: {name: "A"}}` becomes `{user_name: "A"}` with the default
//! separator. Two different paths that flatten to the same key are an error;
//! a value is never silently overwritten.

use serde_json::Value;

use crate::error::{EventsError, Result};
use crate::scalar::normalize;
use crate::value::{PropertyMap, PropertySource, PropertyValue};

/// Maximum nesting depth accepted by the merger.
///
/// This bounds recursion through self-referential bundles; it is not cycle
/// detection.
pub const MAX_DEPTH: usize = 10;

/// Default separator between nested property keys.
pub const DEFAULT_SEPARATOR: &str = "_";

/// Merges a property source into `target`, flattening nested maps and bundles.
pub fn merge_properties(
	target: &mut PropertyMap,
	source: &PropertySource,
	separator: &str,
) -> Result<()> {
	merge_at(target, source, separator, "", 0)
}

/// Merges a dynamically-typed source into `target`.
///
/// The source must be a map at the top level; anything else is rejected.
pub fn merge_value(target: &mut PropertyMap, source: &PropertyValue, separator: &str) -> Result<()> {
	match source {
		PropertyValue::Map(map) => merge_properties(target, map, separator),
		other => Err(EventsError::InvalidPropertyValue {
			key: String::new(),
			value: format!("properties must be a map, got {}", other.describe()),
		}),
	}
}

/// Flattens a single source into a fresh map.
pub fn flatten(source: &PropertySource, separator: &str) -> Result<PropertyMap> {
	let mut target = PropertyMap::new();
	merge_properties(&mut target, source, separator)?;
	Ok(target)
}

/// Recursive step, also usable to merge under an explicit prefix.
pub fn merge_at(
	target: &mut PropertyMap,
	source: &PropertySource,
	separator: &str,
	prefix: &str,
	depth: usize,
) -> Result<()> {
	if depth > MAX_DEPTH {
		return Err(EventsError::ExcessiveNesting {
			prefix: prefix.to_string(),
			max_depth: MAX_DEPTH,
		});
	}

	for (key, value) in source {
		let prefixed_key = format!("{prefix}{key}");

		if target.contains_key(&prefixed_key) {
			return Err(EventsError::PropertyCollision { key: prefixed_key });
		}

		if let Some(normalized) = normalize(value) {
			target.insert(prefixed_key, normalized);
			continue;
		}

		let nested_prefix = format!("{prefixed_key}{separator}");
		match value {
			PropertyValue::Map(nested) => {
				merge_at(target, nested, separator, &nested_prefix, depth + 1)?;
			}
			PropertyValue::Bundle(bundle) => {
				let expanded = bundle.to_property_bundle();
				merge_at(target, &expanded, separator, &nested_prefix, depth + 1)?;
			}
			other => {
				return Err(EventsError::InvalidPropertyValue {
					key: prefixed_key,
					value: other.describe(),
				});
			}
		}
	}

	Ok(())
}

/// Overlays `overlay` on top of `base`; keys in `overlay` win.
///
/// Unlike [`merge_properties`] this never reports collisions. It is the
/// override point between implicit and explicit properties.
pub fn overlay(base: &PropertyMap, overlay: PropertyMap) -> PropertyMap {
	let mut merged = base.clone();
	for (key, value) in overlay {
		merged.insert(key, value);
	}
	merged
}

/// Returns true if a property is absent, null, or a blank string.
///
/// Numbers, booleans and arrays are never blank.
pub fn is_blank(value: Option<&Value>) -> bool {
	match value {
		None | Some(Value::Null) => true,
		Some(Value::String(s)) => s.trim().is_empty(),
		Some(_) => false,
	}
}
