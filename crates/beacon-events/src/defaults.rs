// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Process-level defaults that trackers are built from.

use std::fmt;
use std::sync::Arc;

use beacon_events_core::{DefinitionSet, ExternalNameProvider};

use crate::config::EventsConfig;
use crate::error::Result;
use crate::receiver::{EventReceiver, TracingReceiver};

/// Version a tracker binds to unless told otherwise.
pub const DEFAULT_VERSION: u32 = 1;

/// Defaults shared by every tracker built from them.
///
/// Build one per process (or per test) and hand it to
/// [`Tracker::builder`](crate::Tracker::builder). Each tracker copies what it
/// needs at construction time; changing the defaults afterwards does not
/// affect existing trackers.
#[derive(Clone)]
pub struct TrackerDefaults {
	pub definitions: Option<Arc<DefinitionSet>>,
	pub version: u32,
	pub receivers: Vec<Arc<dyn EventReceiver>>,
	pub external_name: Option<ExternalNameProvider>,
}

impl Default for TrackerDefaults {
	fn default() -> Self {
		Self {
			definitions: None,
			version: DEFAULT_VERSION,
			receivers: Vec::new(),
			external_name: None,
		}
	}
}

impl fmt::Debug for TrackerDefaults {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("TrackerDefaults")
			.field("definitions", &self.definitions.as_ref().map(|d| d.global_prefix()))
			.field("version", &self.version)
			.field(
				"receivers",
				&self.receivers.iter().map(|r| r.name()).collect::<Vec<_>>(),
			)
			.field("external_name", &self.external_name.is_some())
			.finish()
	}
}

impl TrackerDefaults {
	pub fn new(definitions: Arc<DefinitionSet>) -> Self {
		Self {
			definitions: Some(definitions),
			..Self::default()
		}
	}

	pub fn with_version(mut self, version: u32) -> Self {
		self.version = version;
		self
	}

	pub fn with_receiver<R: EventReceiver + 'static>(mut self, receiver: R) -> Self {
		self.receivers.push(Arc::new(receiver));
		self
	}

	pub fn with_shared_receiver(mut self, receiver: Arc<dyn EventReceiver>) -> Self {
		self.receivers.push(receiver);
		self
	}

	pub fn with_external_name(mut self, provider: ExternalNameProvider) -> Self {
		self.external_name = Some(provider);
		self
	}

	/// Builds defaults from finalized configuration.
	///
	/// Loads the definitions file, if configured, and adds a
	/// [`TracingReceiver`] when event logging is enabled.
	#[tracing::instrument(level = "debug", skip(config))]
	pub fn from_config(config: &EventsConfig) -> Result<Self> {
		let mut defaults = Self::default().with_version(config.version);

		if let Some(path) = &config.definitions_path {
			let definitions = DefinitionSet::from_path(path)?;
			defaults.definitions = Some(Arc::new(definitions));
		}

		if config.log_events {
			defaults = defaults.with_receiver(TracingReceiver);
		}

		Ok(defaults)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::receiver::MemoryReceiver;

	#[test]
	fn test_default_version_is_one() {
		let defaults = TrackerDefaults::default();
		assert_eq!(defaults.version, 1);
		assert!(defaults.definitions.is_none());
		assert!(defaults.receivers.is_empty());
	}

	#[test]
	fn test_builder_methods() {
		let definitions = Arc::new(
			DefinitionSet::builder()
				.global_prefix("ab")
				.build()
				.unwrap(),
		);
		let defaults = TrackerDefaults::new(definitions)
			.with_version(2)
			.with_receiver(MemoryReceiver::new())
			.with_receiver(TracingReceiver);
		assert_eq!(defaults.version, 2);
		assert_eq!(defaults.receivers.len(), 2);
		assert!(format!("{defaults:?}").contains("\"ab\""));
	}

	#[test]
	fn test_from_config_without_definitions() {
		let config = EventsConfig {
			definitions_path: None,
			version: 3,
			log_events: true,
			log_format: Default::default(),
		};
		let defaults = TrackerDefaults::from_config(&config).unwrap();
		assert_eq!(defaults.version, 3);
		assert_eq!(defaults.receivers.len(), 1);
		assert_eq!(defaults.receivers[0].name(), "tracing");
	}

	#[test]
	fn test_from_config_loads_definitions() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("events.toml");
		std::fs::write(
			&path,
			"global_events_prefix = \"ab\"\n\n[[versions]]\nnumber = 1\nintroduced = \"2014-02-04\"\n",
		)
		.unwrap();

		let config = EventsConfig {
			definitions_path: Some(path),
			version: 1,
			log_events: false,
			log_format: Default::default(),
		};
		let defaults = TrackerDefaults::from_config(&config).unwrap();
		assert!(defaults.receivers.is_empty());
		assert_eq!(
			defaults.definitions.unwrap().fetch_version(1).unwrap().prefix(),
			"ab1_"
		);
	}
}
