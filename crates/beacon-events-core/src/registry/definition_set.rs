// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::event::Event;
use super::naming::IntoTimestamp;
use super::version::{Version, VersionBuilder, VersionOptions};
use crate::error::{EventsError, RegistryLevel, Result};

/// The root of the event registry.
///
/// Built once through [`DefinitionSetBuilder`] and immutable afterwards, so a
/// single instance can be shared (behind an `Arc`) by any number of trackers.
#[derive(Debug, Clone, Serialize)]
pub struct DefinitionSet {
	global_prefix: String,
	versions: BTreeMap<u32, Version>,
}

impl DefinitionSet {
	pub fn builder() -> DefinitionSetBuilder {
		DefinitionSetBuilder::default()
	}

	pub fn global_prefix(&self) -> &str {
		&self.global_prefix
	}

	pub fn versions(&self) -> impl Iterator<Item = &Version> {
		self.versions.values()
	}

	pub fn fetch_version(&self, number: u32) -> Result<&Version> {
		self.versions.get(&number).ok_or_else(|| {
			EventsError::not_found(
				RegistryLevel::Version,
				number.to_string(),
				self.versions.keys().map(u32::to_string),
			)
		})
	}

	/// Resolves `version` → `category` → `event`.
	pub fn fetch_event(&self, version: u32, category: &str, event: &str) -> Result<&Event> {
		self.fetch_version(version)?.fetch_event(category, event)
	}
}

/// Declares a definition set.
///
/// # Example
///
/// ```
/// use beacon_events_core::DefinitionSet;
///
/// let definitions = DefinitionSet::builder()
///     .global_prefix("ab")
///     .version(1, "2014-02-04", |v| {
///         v.category("user", |c| {
///             c.event("signed_up", "2014-02-04", "user creates an account");
///         });
///     })
///     .build()
///     .unwrap();
///
/// let event = definitions.fetch_event(1, "user", "signed_up").unwrap();
/// assert_eq!(event.full_name(), "ab1_user_signed_up");
/// ```
#[derive(Debug, Default)]
pub struct DefinitionSetBuilder {
	global_prefix: Option<String>,
	versions: Vec<VersionBuilder>,
	error: Option<EventsError>,
}

impl DefinitionSetBuilder {
	fn record(&mut self, e: EventsError) {
		self.error.get_or_insert(e);
	}

	/// Sets the prefix every event's full name starts with. May be set once.
	pub fn global_prefix(mut self, prefix: impl Into<String>) -> Self {
		let prefix = prefix.into();
		if prefix.trim().is_empty() {
			self.record(EventsError::configuration("global prefix must not be blank"));
		} else if let Some(existing) = &self.global_prefix {
			let msg = format!("global prefix is already set to {existing:?}");
			self.record(EventsError::configuration(msg));
		} else {
			self.global_prefix = Some(prefix.trim().to_string());
		}
		self
	}

	/// Declares a version with its introduction time.
	pub fn version<F>(self, number: u32, introduced: impl IntoTimestamp, declare: F) -> Self
	where
		F: FnOnce(&mut VersionBuilder),
	{
		let mut builder = VersionBuilder::new(number);
		builder.introduced(introduced);
		declare(&mut builder);
		self.push_version(builder)
	}

	/// Declares a version from an option map such as
	/// `{"introduced": "2014-02-04", "property_separator": "~"}`.
	pub fn version_with_options<F>(mut self, number: u32, options: Value, declare: F) -> Self
	where
		F: FnOnce(&mut VersionBuilder),
	{
		match VersionOptions::from_value(options) {
			Ok(options) => self.version_from(number, options, declare),
			Err(e) => {
				self.record(e);
				self
			}
		}
	}

	/// Declares a version from already-parsed options.
	pub fn version_from<F>(self, number: u32, options: VersionOptions, declare: F) -> Self
	where
		F: FnOnce(&mut VersionBuilder),
	{
		let mut builder = VersionBuilder::new(number);
		builder.options(options);
		declare(&mut builder);
		self.push_version(builder)
	}

	fn push_version(mut self, builder: VersionBuilder) -> Self {
		let number = builder.number();
		if self.versions.iter().any(|v| v.number() == number) {
			self.record(EventsError::DuplicateDeclaration {
				level: RegistryLevel::Version,
				name: number.to_string(),
				scope: "this definition set".to_string(),
			});
		} else {
			self.versions.push(builder);
		}
		self
	}

	/// Validates every declaration and seals the registry.
	pub fn build(self) -> Result<DefinitionSet> {
		if let Some(e) = self.error {
			return Err(e);
		}

		let global_prefix = self
			.global_prefix
			.ok_or_else(|| EventsError::configuration("a global prefix is required"))?;

		let mut versions = BTreeMap::new();
		for builder in self.versions {
			let version = builder.build(&global_prefix)?;
			versions.insert(version.number(), version);
		}

		tracing::debug!(
			global_prefix = %global_prefix,
			versions = versions.len(),
			"built event definition set"
		);

		Ok(DefinitionSet {
			global_prefix,
			versions,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn sample() -> DefinitionSet {
		DefinitionSet::builder()
			.global_prefix("ab")
			.version(1, "2014-02-04", |v| {
				v.category("user", |c| {
					c.event("signed_up", "2014-02-04", "user creates an account");
				});
			})
			.version_with_options(
				2,
				json!({"introduced": "2015-01-01", "property_separator": "~"}),
				|v| {
					v.category("user", |c| {
						c.event("signed_up", "2015-01-01", "user creates an account, v2");
					});
				},
			)
			.build()
			.unwrap()
	}

	#[test]
	fn test_full_names_include_version() {
		let definitions = sample();
		assert_eq!(
			definitions.fetch_event(1, "user", "signed_up").unwrap().full_name(),
			"ab1_user_signed_up"
		);
		assert_eq!(
			definitions.fetch_event(2, " User ", "SIGNED_UP").unwrap().full_name(),
			"ab2_user_signed_up"
		);
	}

	#[test]
	fn test_missing_version_lists_known() {
		match sample().fetch_version(3).unwrap_err() {
			EventsError::NotFound { level, key, known } => {
				assert_eq!(level, RegistryLevel::Version);
				assert_eq!(key, "3");
				assert_eq!(known, vec!["1".to_string(), "2".to_string()]);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}

	#[test]
	fn test_duplicate_version_cites_number() {
		let err = DefinitionSet::builder()
			.global_prefix("ab")
			.version(1, "2014-02-04", |_| {})
			.version(1, "2014-03-01", |_| {})
			.build()
			.unwrap_err();
		assert!(matches!(
			err,
			EventsError::DuplicateDeclaration { level: RegistryLevel::Version, ref name, .. } if name == "1"
		));
		assert!(err.to_string().contains("\"1\""));
	}

	#[test]
	fn test_global_prefix_is_required_and_set_once() {
		assert!(matches!(
			DefinitionSet::builder().version(1, "2014-02-04", |_| {}).build(),
			Err(EventsError::Configuration(_))
		));
		assert!(matches!(
			DefinitionSet::builder().global_prefix("ab").global_prefix("cd").build(),
			Err(EventsError::Configuration(ref m)) if m.contains("already set")
		));
		assert!(DefinitionSet::builder().global_prefix("  ").build().is_err());
	}

	#[test]
	fn test_unknown_version_option_rejected() {
		let err = DefinitionSet::builder()
			.global_prefix("ab")
			.version_with_options(1, json!({"introduced": "2014-02-04", "seperator": "~"}), |_| {})
			.build()
			.unwrap_err();
		assert!(err.to_string().contains("seperator"));
	}

	#[test]
	fn test_nested_errors_surface_from_build() {
		let err = DefinitionSet::builder()
			.global_prefix("ab")
			.version(1, "2014-02-04", |v| {
				v.category("user", |c| {
					c.event("signed_up", "2014-02-04", "x")
						.event("signed_up", "2014-02-04", "y");
				});
			})
			.build()
			.unwrap_err();
		assert!(matches!(
			err,
			EventsError::DuplicateDeclaration { level: RegistryLevel::Event, .. }
		));
	}

	#[test]
	fn test_definition_set_is_send_and_sync() {
		fn assert_send_sync<T: Send + Sync>() {}
		assert_send_sync::<DefinitionSet>();
	}
}
