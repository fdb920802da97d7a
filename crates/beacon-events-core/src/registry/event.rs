// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Event definitions: the leaves of the registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::naming::{normalize_name, require_non_blank, IntoTimestamp};
use super::note::{Note, NoteOptions};
use crate::error::{EventsError, Result};
use crate::merge::is_blank;
use crate::value::PropertyMap;

/// A single declared, documented, trackable event.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
	name: String,
	category: String,
	version: u32,
	full_name: String,
	introduced_at: DateTime<Utc>,
	description: String,
	external_name: Option<String>,
	retired_at: Option<DateTime<Utc>>,
	/// Effective retirement of the owning category.
	inherited_retired_at: Option<DateTime<Utc>>,
	required_properties: Vec<String>,
	notes: Vec<Note>,
}

impl Event {
	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn category_name(&self) -> &str {
		&self.category
	}

	pub fn version_number(&self) -> u32 {
		self.version
	}

	/// `{global_prefix}{version}_{category}_{event}`.
	pub fn full_name(&self) -> &str {
		&self.full_name
	}

	pub fn introduced_at(&self) -> DateTime<Utc> {
		self.introduced_at
	}

	pub fn description(&self) -> &str {
		&self.description
	}

	/// The explicit external name override, if one was declared.
	pub fn external_name(&self) -> Option<&str> {
		self.external_name.as_deref()
	}

	/// The event's own retirement time, ignoring its category and version.
	pub fn retired_at(&self) -> Option<DateTime<Utc>> {
		self.retired_at
	}

	/// Earliest of the event's own retirement and its category's.
	pub fn effective_retired_at(&self) -> Option<DateTime<Utc>> {
		earliest(self.retired_at, self.inherited_retired_at)
	}

	pub fn is_retired(&self) -> bool {
		self.effective_retired_at().is_some()
	}

	pub fn required_properties(&self) -> &[String] {
		&self.required_properties
	}

	pub fn notes(&self) -> &[Note] {
		&self.notes
	}

	/// Checks that this event may be fired with `properties`.
	///
	/// Retirement is checked first and fails regardless of the properties.
	pub fn validate(&self, properties: &PropertyMap) -> Result<()> {
		if let Some(retired_at) = self.effective_retired_at() {
			return Err(EventsError::RetiredEvent {
				event: self.full_name.clone(),
				retired_at,
			});
		}

		for required in &self.required_properties {
			if is_blank(properties.get(required)) {
				return Err(EventsError::RequiredPropertyMissing {
					event: self.full_name.clone(),
					property: required.clone(),
				});
			}
		}

		Ok(())
	}
}

/// Earliest of two optional timestamps; `None` means "never".
pub(crate) fn earliest(
	a: Option<DateTime<Utc>>,
	b: Option<DateTime<Utc>>,
) -> Option<DateTime<Utc>> {
	match (a, b) {
		(Some(a), Some(b)) => Some(a.min(b)),
		(a, None) => a,
		(None, b) => b,
	}
}

/// What an event inherits from its category when the registry is sealed.
#[derive(Debug, Clone)]
pub(crate) struct Lineage {
	pub version: u32,
	pub category: String,
	/// `{global_prefix}{version}_{category}_`
	pub prefix: String,
	pub retired_at: Option<DateTime<Utc>>,
}

/// Event fields keyed by name, as accepted from option maps.
///
/// Unknown keys are rejected so that typos fail at declaration time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventOptions {
	pub introduced: Option<String>,
	#[serde(alias = "description")]
	pub desc: Option<String>,
	pub external_name: Option<String>,
	pub retired_at: Option<String>,
	#[serde(default)]
	pub required_properties: Vec<String>,
	#[serde(default)]
	pub notes: Vec<NoteOptions>,
}

impl EventOptions {
	/// Reads options from a JSON object.
	pub fn from_value(value: Value) -> Result<Self> {
		serde_json::from_value(value)
			.map_err(|e| EventsError::configuration(format!("invalid event options: {e}")))
	}
}

/// Collects an event's fields.
///
/// Fields may be set positionally by the category's `event` helper, from
/// [`EventOptions`], or by calling setters in a declaration closure. However
/// they were set, the event is checked once, when the registry is built.
#[derive(Debug)]
pub struct EventBuilder {
	name: String,
	introduced: Option<DateTime<Utc>>,
	description: Option<String>,
	external_name: Option<String>,
	retired_at: Option<DateTime<Utc>>,
	required_properties: Vec<String>,
	notes: Vec<Note>,
	error: Option<EventsError>,
}

impl EventBuilder {
	pub(crate) fn new(name: &str) -> Self {
		Self {
			name: normalize_name(name),
			introduced: None,
			description: None,
			external_name: None,
			retired_at: None,
			required_properties: Vec::new(),
			notes: Vec::new(),
			error: None,
		}
	}

	pub(crate) fn key(&self) -> &str {
		&self.name
	}

	fn record<T>(&mut self, result: Result<T>) -> Option<T> {
		match result {
			Ok(value) => Some(value),
			Err(e) => {
				self.error.get_or_insert(e);
				None
			}
		}
	}

	pub fn introduced(&mut self, when: impl IntoTimestamp) -> &mut Self {
		if let Some(ts) = self.record(when.into_timestamp()) {
			self.introduced = Some(ts);
		}
		self
	}

	pub fn desc(&mut self, text: impl Into<String>) -> &mut Self {
		self.description = Some(text.into());
		self
	}

	pub fn external_name(&mut self, name: impl Into<String>) -> &mut Self {
		let name = name.into();
		if let Some(name) = self.record(require_non_blank("external_name", &name)) {
			self.external_name = Some(name);
		}
		self
	}

	pub fn retired_at(&mut self, when: impl IntoTimestamp) -> &mut Self {
		if let Some(ts) = self.record(when.into_timestamp()) {
			self.retired_at = Some(ts);
		}
		self
	}

	pub fn required_properties<I, S>(&mut self, names: I) -> &mut Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		for name in names {
			if let Some(name) = self.record(require_non_blank("required property", name.as_ref())) {
				self.required_properties.push(name);
			}
		}
		self
	}

	pub fn note(&mut self, when: impl IntoTimestamp, author: &str, text: &str) -> &mut Self {
		if let Some(note) = self.record(Note::new(when, author, text)) {
			self.notes.push(note);
		}
		self
	}

	/// Applies every field present in `options`.
	pub fn options(&mut self, options: EventOptions) -> &mut Self {
		let EventOptions {
			introduced,
			desc,
			external_name,
			retired_at,
			required_properties,
			notes,
		} = options;

		if let Some(introduced) = introduced {
			self.introduced(introduced);
		}
		if let Some(desc) = desc {
			self.desc(desc);
		}
		if let Some(external_name) = external_name {
			self.external_name(external_name);
		}
		if let Some(retired_at) = retired_at {
			self.retired_at(retired_at);
		}
		self.required_properties(required_properties);
		for note in notes {
			if let Some(note) = self.record(note.into_note()) {
				self.notes.push(note);
			}
		}
		self
	}

	/// The completion check shared by every way of declaring an event.
	pub(crate) fn build(self, lineage: &Lineage) -> Result<Event> {
		if let Some(e) = self.error {
			return Err(e);
		}

		let full_name = format!("{}{}", lineage.prefix, self.name);
		let introduced_at = self.introduced.ok_or_else(|| {
			EventsError::configuration(format!("event {full_name} must declare when it was introduced"))
		})?;
		let description = self
			.description
			.as_deref()
			.map(|d| require_non_blank("description", d))
			.transpose()?
			.ok_or_else(|| {
				EventsError::configuration(format!("event {full_name} must have a description"))
			})?;

		Ok(Event {
			name: self.name,
			category: lineage.category.clone(),
			version: lineage.version,
			full_name,
			introduced_at,
			description,
			external_name: self.external_name,
			retired_at: self.retired_at,
			inherited_retired_at: lineage.retired_at,
			required_properties: self.required_properties,
			notes: self.notes,
		})
	}
}
