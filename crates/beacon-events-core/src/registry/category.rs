// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::event::{earliest, Event, EventBuilder, EventOptions, Lineage};
use super::naming::{normalize_name, IntoTimestamp};
use crate::error::{EventsError, RegistryLevel, Result};

/// A named group of events within a version.
#[derive(Debug, Clone, Serialize)]
pub struct Category {
	name: String,
	version: u32,
	retired_at: Option<DateTime<Utc>>,
	/// Retirement of the owning version.
	inherited_retired_at: Option<DateTime<Utc>>,
	events: BTreeMap<String, Event>,
}

impl Category {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn version_number(&self) -> u32 {
		self.version
	}

	pub fn retired_at(&self) -> Option<DateTime<Utc>> {
		self.retired_at
	}

	/// Earliest of the category's own retirement and its version's.
	pub fn effective_retired_at(&self) -> Option<DateTime<Utc>> {
		earliest(self.retired_at, self.inherited_retired_at)
	}

	pub fn events(&self) -> impl Iterator<Item = &Event> {
		self.events.values()
	}

	/// Looks up an event by name, ignoring case and surrounding whitespace.
	pub fn fetch_event(&self, name: &str) -> Result<&Event> {
		let key = normalize_name(name);
		self.events.get(&key).ok_or_else(|| {
			EventsError::not_found(RegistryLevel::Event, key, self.events.keys().cloned())
		})
	}
}

/// Category fields keyed by name, as accepted from option maps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryOptions {
	pub retired_at: Option<String>,
}

impl CategoryOptions {
	pub fn from_value(value: Value) -> Result<Self> {
		serde_json::from_value(value)
			.map_err(|e| EventsError::configuration(format!("invalid category options: {e}")))
	}
}

/// Collects a category's events inside a version declaration.
#[derive(Debug)]
pub struct CategoryBuilder {
	name: String,
	retired_at: Option<DateTime<Utc>>,
	events: Vec<EventBuilder>,
	error: Option<EventsError>,
}

impl CategoryBuilder {
	pub(crate) fn new(name: &str) -> Self {
		Self {
			name: normalize_name(name),
			retired_at: None,
			events: Vec::new(),
			error: None,
		}
	}

	pub(crate) fn key(&self) -> &str {
		&self.name
	}

	pub fn retired_at(&mut self, when: impl IntoTimestamp) -> &mut Self {
		match when.into_timestamp() {
			Ok(ts) => self.retired_at = Some(ts),
			Err(e) => {
				self.error.get_or_insert(e);
			}
		}
		self
	}

	pub fn options(&mut self, options: CategoryOptions) -> &mut Self {
		if let Some(retired_at) = options.retired_at {
			self.retired_at(retired_at);
		}
		self
	}

	/// Declares an event with its introduction time and description.
	pub fn event(
		&mut self,
		name: &str,
		introduced: impl IntoTimestamp,
		description: impl Into<String>,
	) -> &mut Self {
		self.event_with(name, |e| {
			e.introduced(introduced).desc(description);
		})
	}

	/// Declares an event from an option map such as
	/// `{"introduced": "2014-02-04", "desc": "..."}`.
	pub fn event_from_options(&mut self, name: &str, options: Value) -> &mut Self {
		match EventOptions::from_value(options) {
			Ok(options) => self.event_with(name, |e| {
				e.options(options);
			}),
			Err(e) => {
				self.error.get_or_insert(e);
				self
			}
		}
	}

	/// Declares an event, setting its fields in `declare`.
	pub fn event_with<F>(&mut self, name: &str, declare: F) -> &mut Self
	where
		F: FnOnce(&mut EventBuilder),
	{
		let mut builder = EventBuilder::new(name);
		declare(&mut builder);

		if builder.key().is_empty() {
			self.error
				.get_or_insert_with(|| EventsError::configuration("event name must not be blank"));
		} else if self.events.iter().any(|e| e.key() == builder.key()) {
			self.error.get_or_insert_with(|| EventsError::DuplicateDeclaration {
				level: RegistryLevel::Event,
				name: builder.key().to_string(),
				scope: format!("category {}", self.name),
			});
		} else {
			self.events.push(builder);
		}
		self
	}

	pub(crate) fn build(
		self,
		version: u32,
		version_prefix: &str,
		version_retired_at: Option<DateTime<Utc>>,
	) -> Result<Category> {
		if let Some(e) = self.error {
			return Err(e);
		}

		let lineage = Lineage {
			version,
			category: self.name.clone(),
			prefix: format!("{version_prefix}{}_", self.name),
			retired_at: earliest(self.retired_at, version_retired_at),
		};

		let mut events = BTreeMap::new();
		for builder in self.events {
			let event = builder.build(&lineage)?;
			events.insert(event.name().to_string(), event);
		}

		Ok(Category {
			name: self.name,
			version,
			retired_at: self.retired_at,
			inherited_retired_at: version_retired_at,
			events,
		})
	}
}
