// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading a definition set from a TOML or JSON document.
//!
//! ```toml
//! global_events_prefix = "ab"
//!
//! [[versions]]
//! number = 1
//! introduced = "2014-02-04"
//!
//! [versions.categories.user.events.signed_up]
//! introduced = "2014-02-04"
//! desc = "user creates an account"
//! required_properties = ["user_age"]
//! ```
//!
//! Every table rejects unknown keys.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EventsError, Result};
use crate::registry::{
	CategoryOptions, DefinitionSet, DefinitionSetBuilder, EventOptions, VersionOptions,
};

/// Serialized form of a definition set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefinitionDocument {
	pub global_events_prefix: String,
	#[serde(default)]
	pub versions: Vec<VersionDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionDocument {
	pub number: u32,
	pub introduced: Option<String>,
	pub retired_at: Option<String>,
	pub property_separator: Option<String>,
	#[serde(default)]
	pub categories: BTreeMap<String, CategoryDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDocument {
	pub retired_at: Option<String>,
	#[serde(default)]
	pub events: BTreeMap<String, EventOptions>,
}

/// Document formats understood by [`DefinitionSet::from_reader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
	Toml,
	Json,
}

impl DocumentFormat {
	/// Picks a format from a file extension; anything but `.json` is TOML.
	pub fn from_path(path: &Path) -> Self {
		match path.extension().and_then(|ext| ext.to_str()) {
			Some(ext) if ext.eq_ignore_ascii_case("json") => DocumentFormat::Json,
			_ => DocumentFormat::Toml,
		}
	}
}

impl DefinitionDocument {
	pub fn from_toml_str(text: &str) -> Result<Self> {
		toml::from_str(text).map_err(|e| EventsError::DefinitionParse(e.to_string()))
	}

	pub fn from_json_str(text: &str) -> Result<Self> {
		serde_json::from_str(text).map_err(|e| EventsError::DefinitionParse(e.to_string()))
	}

	/// Feeds every declaration in the document through the registry builder.
	pub fn into_builder(self) -> DefinitionSetBuilder {
		let mut builder = DefinitionSet::builder().global_prefix(self.global_events_prefix);

		for version in self.versions {
			let options = VersionOptions {
				introduced: version.introduced,
				retired_at: version.retired_at,
				property_separator: version.property_separator,
			};
			let categories = version.categories;
			builder = builder.version_from(version.number, options, |v| {
				for (name, CategoryDocument { retired_at, events }) in categories {
					v.category(&name, |c| {
						c.options(CategoryOptions { retired_at });
						for (event_name, event) in events {
							c.event_with(&event_name, |e| {
								e.options(event);
							});
						}
					});
				}
			});
		}

		builder
	}

	pub fn into_definition_set(self) -> Result<DefinitionSet> {
		self.into_builder().build()
	}
}

impl DefinitionSet {
	pub fn from_toml_str(text: &str) -> Result<Self> {
		DefinitionDocument::from_toml_str(text)?.into_definition_set()
	}

	pub fn from_json_str(text: &str) -> Result<Self> {
		DefinitionDocument::from_json_str(text)?.into_definition_set()
	}

	pub fn from_reader<R: Read>(mut reader: R, format: DocumentFormat) -> Result<Self> {
		let mut text = String::new();
		reader.read_to_string(&mut text)?;
		match format {
			DocumentFormat::Toml => Self::from_toml_str(&text),
			DocumentFormat::Json => Self::from_json_str(&text),
		}
	}

	#[tracing::instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
	pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let file = std::fs::File::open(path)?;
		let definitions = Self::from_reader(file, DocumentFormat::from_path(path))?;
		tracing::debug!("loaded event definitions");
		Ok(definitions)
	}
}
