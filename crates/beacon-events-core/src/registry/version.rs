// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::category::{Category, CategoryBuilder, CategoryOptions};
use super::event::Event;
use super::naming::{normalize_name, IntoTimestamp};
use crate::error::{EventsError, RegistryLevel, Result};
use crate::merge::DEFAULT_SEPARATOR;

/// A complete, independently versioned event vocabulary.
#[derive(Debug, Clone, Serialize)]
pub struct Version {
	number: u32,
	prefix: String,
	introduced_at: DateTime<Utc>,
	retired_at: Option<DateTime<Utc>>,
	property_separator: String,
	categories: BTreeMap<String, Category>,
}

impl Version {
	pub fn number(&self) -> u32 {
		self.number
	}

	/// `{global_prefix}{number}_`
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Documentation only; never compared against the clock.
	pub fn introduced_at(&self) -> DateTime<Utc> {
		self.introduced_at
	}

	pub fn retired_at(&self) -> Option<DateTime<Utc>> {
		self.retired_at
	}

	/// Separator used when flattening nested properties fired against this
	/// version.
	pub fn property_separator(&self) -> &str {
		&self.property_separator
	}

	pub fn categories(&self) -> impl Iterator<Item = &Category> {
		self.categories.values()
	}

	/// Looks up a category by name, ignoring case and surrounding whitespace.
	pub fn fetch_category(&self, name: &str) -> Result<&Category> {
		let key = normalize_name(name);
		self.categories.get(&key).ok_or_else(|| {
			EventsError::not_found(RegistryLevel::Category, key, self.categories.keys().cloned())
		})
	}

	pub fn fetch_event(&self, category: &str, event: &str) -> Result<&Event> {
		self.fetch_category(category)?.fetch_event(event)
	}
}

/// Version fields keyed by name, as accepted from option maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionOptions {
	pub introduced: Option<String>,
	pub retired_at: Option<String>,
	pub property_separator: Option<String>,
}

impl VersionOptions {
	pub fn from_value(value: Value) -> Result<Self> {
		serde_json::from_value(value)
			.map_err(|e| EventsError::configuration(format!("invalid version options: {e}")))
	}
}

/// Collects a version's categories inside a definition set declaration.
#[derive(Debug)]
pub struct VersionBuilder {
	number: u32,
	introduced: Option<DateTime<Utc>>,
	retired_at: Option<DateTime<Utc>>,
	property_separator: String,
	categories: Vec<CategoryBuilder>,
	error: Option<EventsError>,
}

impl VersionBuilder {
	pub(crate) fn new(number: u32) -> Self {
		Self {
			number,
			introduced: None,
			retired_at: None,
			property_separator: DEFAULT_SEPARATOR.to_string(),
			categories: Vec::new(),
			error: None,
		}
	}

	pub(crate) fn number(&self) -> u32 {
		self.number
	}

	fn record(&mut self, e: EventsError) {
		self.error.get_or_insert(e);
	}

	pub fn introduced(&mut self, when: impl IntoTimestamp) -> &mut Self {
		match when.into_timestamp() {
			Ok(ts) => self.introduced = Some(ts),
			Err(e) => self.record(e),
		}
		self
	}

	pub fn retired_at(&mut self, when: impl IntoTimestamp) -> &mut Self {
		match when.into_timestamp() {
			Ok(ts) => self.retired_at = Some(ts),
			Err(e) => self.record(e),
		}
		self
	}

	pub fn property_separator(&mut self, separator: impl Into<String>) -> &mut Self {
		let separator = separator.into();
		if separator.is_empty() {
			self.record(EventsError::configuration("property_separator must not be empty"));
		} else {
			self.property_separator = separator;
		}
		self
	}

	pub fn options(&mut self, options: VersionOptions) -> &mut Self {
		if let Some(introduced) = options.introduced {
			self.introduced(introduced);
		}
		if let Some(retired_at) = options.retired_at {
			self.retired_at(retired_at);
		}
		if let Some(separator) = options.property_separator {
			self.property_separator(separator);
		}
		self
	}

	/// Declares a category and its events.
	pub fn category<F>(&mut self, name: &str, declare: F) -> &mut Self
	where
		F: FnOnce(&mut CategoryBuilder),
	{
		let mut builder = CategoryBuilder::new(name);
		declare(&mut builder);
		self.push_category(builder)
	}

	/// Declares a category with options such as `{"retired_at": "..."}`.
	pub fn category_with_options<F>(&mut self, name: &str, options: Value, declare: F) -> &mut Self
	where
		F: FnOnce(&mut CategoryBuilder),
	{
		match CategoryOptions::from_value(options) {
			Ok(options) => {
				let mut builder = CategoryBuilder::new(name);
				builder.options(options);
				declare(&mut builder);
				self.push_category(builder)
			}
			Err(e) => {
				self.record(e);
				self
			}
		}
	}

	pub(crate) fn push_category(&mut self, builder: CategoryBuilder) -> &mut Self {
		if builder.key().is_empty() {
			self.record(EventsError::configuration("category name must not be blank"));
		} else if self.categories.iter().any(|c| c.key() == builder.key()) {
			self.record(EventsError::DuplicateDeclaration {
				level: RegistryLevel::Category,
				name: builder.key().to_string(),
				scope: format!("version {}", self.number),
			});
		} else {
			self.categories.push(builder);
		}
		self
	}

	pub(crate) fn build(self, global_prefix: &str) -> Result<Version> {
		if let Some(e) = self.error {
			return Err(e);
		}

		let introduced_at = self.introduced.ok_or_else(|| {
			EventsError::configuration(format!(
				"version {} must declare when it was introduced",
				self.number
			))
		})?;

		let prefix = format!("{global_prefix}{}_", self.number);
		let mut categories = BTreeMap::new();
		for builder in self.categories {
			let category = builder.build(self.number, &prefix, self.retired_at)?;
			categories.insert(category.name().to_string(), category);
		}

		Ok(Version {
			number: self.number,
			prefix,
			introduced_at,
			retired_at: self.retired_at,
			property_separator: self.property_separator,
			categories,
		})
	}
}
