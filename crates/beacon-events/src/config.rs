// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Layered configuration for trackers.
//!
//! Layers are merged in order of precedence: built-in defaults, then a TOML
//! file, then environment variables (`BEACON_EVENTS_<FIELD>`).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::defaults::DEFAULT_VERSION;
use crate::error::{Result, TrackerError};

pub const DEFINITIONS_PATH_ENV: &str = "BEACON_EVENTS_DEFINITIONS_PATH";
pub const VERSION_ENV: &str = "BEACON_EVENTS_VERSION";
pub const LOG_EVENTS_ENV: &str = "BEACON_EVENTS_LOG_EVENTS";
pub const LOG_FORMAT_ENV: &str = "BEACON_EVENTS_LOG_FORMAT";

/// Output format for the tracing subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
	#[default]
	Plain,
	Json,
}

impl std::str::FromStr for LogFormat {
	type Err = TrackerError;

	fn from_str(s: &str) -> Result<Self> {
		match s.trim().to_ascii_lowercase().as_str() {
			"plain" | "text" => Ok(LogFormat::Plain),
			"json" => Ok(LogFormat::Json),
			other => Err(TrackerError::config(format!(
				"invalid log format {other:?}; expected \"plain\" or \"json\""
			))),
		}
	}
}

/// A partial configuration from one source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsConfigLayer {
	pub definitions_path: Option<PathBuf>,
	pub version: Option<u32>,
	pub log_events: Option<bool>,
	pub log_format: Option<LogFormat>,
}

impl EventsConfigLayer {
	/// Overwrites fields that are set in `other`.
	pub fn merge(&mut self, other: Self) {
		if other.definitions_path.is_some() {
			self.definitions_path = other.definitions_path;
		}
		if other.version.is_some() {
			self.version = other.version;
		}
		if other.log_events.is_some() {
			self.log_events = other.log_events;
		}
		if other.log_format.is_some() {
			self.log_format = other.log_format;
		}
	}

	pub fn finalize(self) -> EventsConfig {
		EventsConfig {
			definitions_path: self.definitions_path,
			version: self.version.unwrap_or(DEFAULT_VERSION),
			log_events: self.log_events.unwrap_or(false),
			log_format: self.log_format.unwrap_or_default(),
		}
	}

	pub fn from_toml_str(text: &str) -> Result<Self> {
		toml::from_str(text).map_err(|e| TrackerError::config(format!("TOML parse error: {e}")))
	}

	/// Reads a layer from a TOML file; a missing file is an empty layer.
	pub fn from_toml_path(path: &Path) -> Result<Self> {
		if !path.exists() {
			debug!(path = %path.display(), "config file not found, skipping");
			return Ok(Self::default());
		}

		debug!(path = %path.display(), "loading config file");
		let content = std::fs::read_to_string(path).map_err(|e| {
			TrackerError::config(format!("failed to read {}: {e}", path.display()))
		})?;
		let layer = Self::from_toml_str(&content)?;
		trace!("parsed config layer from TOML");
		Ok(layer)
	}

	/// Reads a layer from the process environment.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|key| std::env::var(key).ok())
	}

	/// Reads a layer through `lookup`, which maps variable names to values.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

		let version = get(VERSION_ENV)
			.map(|v| {
				v.trim()
					.parse::<u32>()
					.map_err(|e| TrackerError::config(format!("{VERSION_ENV}: {e}")))
			})
			.transpose()?;

		let log_events = get(LOG_EVENTS_ENV)
			.map(|v| parse_bool(LOG_EVENTS_ENV, &v))
			.transpose()?;

		let log_format = get(LOG_FORMAT_ENV).map(|v| v.parse()).transpose()?;

		Ok(Self {
			definitions_path: get(DEFINITIONS_PATH_ENV).map(PathBuf::from),
			version,
			log_events,
			log_format,
		})
	}
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
	match value.trim().to_ascii_lowercase().as_str() {
		"1" | "true" | "yes" | "on" => Ok(true),
		"0" | "false" | "no" | "off" => Ok(false),
		other => Err(TrackerError::config(format!(
			"{key}: expected a boolean, got {other:?}"
		))),
	}
}

/// Finalized tracker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
	pub definitions_path: Option<PathBuf>,
	pub version: u32,
	pub log_events: bool,
	pub log_format: LogFormat,
}

impl Default for EventsConfig {
	fn default() -> Self {
		EventsConfigLayer::default().finalize()
	}
}

/// Loads configuration from an optional TOML file and the environment.
pub fn load_config(path: Option<&Path>) -> Result<EventsConfig> {
	let mut layer = EventsConfigLayer::default();
	if let Some(path) = path {
		layer.merge(EventsConfigLayer::from_toml_path(path)?);
	}
	layer.merge(EventsConfigLayer::from_env()?);
	Ok(layer.finalize())
}
