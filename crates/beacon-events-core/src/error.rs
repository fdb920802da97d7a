// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for event definitions and property merging.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::scalar::format_timestamp;

/// Result type alias for event definition and property operations.
pub type Result<T> = std::result::Result<T, EventsError>;

/// The level of the registry a lookup or declaration failed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryLevel {
	Version,
	Category,
	Event,
}

impl std::fmt::Display for RegistryLevel {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			RegistryLevel::Version => write!(f, "version"),
			RegistryLevel::Category => write!(f, "category"),
			RegistryLevel::Event => write!(f, "event"),
		}
	}
}

/// Errors raised while declaring, resolving, or firing events.
#[derive(Debug, Error)]
pub enum EventsError {
	/// Invalid or unknown construction options, or missing required fields.
	#[error("configuration error: {0}")]
	Configuration(String),

	/// A version, category, or event does not exist.
	#[error("no {level} named {key:?}; known: [{}]", .known.join(", "))]
	NotFound {
		level: RegistryLevel,
		key: String,
		known: Vec<String>,
	},

	/// A version number, category name, or event name was declared twice.
	#[error("{level} {name:?} is already declared in {scope}")]
	DuplicateDeclaration {
		level: RegistryLevel,
		name: String,
		scope: String,
	},

	/// The event, or its category or version, has been retired.
	#[error("event {event} was retired at {}; it can no longer be fired", format_timestamp(.retired_at))]
	RetiredEvent {
		event: String,
		retired_at: DateTime<Utc>,
	},

	/// A declared required property is absent or blank.
	#[error("event {event} requires property {property:?}, which is missing or blank")]
	RequiredPropertyMissing { event: String, property: String },

	/// Two property sources flatten to the same key.
	#[error("multiple properties flatten to the key {key:?}")]
	PropertyCollision { key: String },

	/// A property value has no wire form and cannot be expanded.
	#[error("invalid property value at {key:?}: {value}")]
	InvalidPropertyValue { key: String, value: String },

	/// Property nesting went deeper than the merge depth limit.
	#[error("properties nested more than {max_depth} levels deep at {prefix:?}; is there a circular reference?")]
	ExcessiveNesting { prefix: String, max_depth: usize },

	/// A value had the wrong type for where it was used.
	#[error("{what} must be {expected}, got {found}")]
	TypeMismatch {
		what: String,
		expected: &'static str,
		found: String,
	},

	/// A definition document could not be parsed.
	#[error("failed to parse definitions: {0}")]
	DefinitionParse(String),

	/// A definition document could not be read.
	#[error("I/O error reading definitions: {0}")]
	Io(#[from] std::io::Error),
}

impl EventsError {
	/// Creates a configuration error.
	pub fn configuration(msg: impl Into<String>) -> Self {
		Self::Configuration(msg.into())
	}

	/// Creates a not-found error listing the keys known at that level.
	pub fn not_found<I, S>(level: RegistryLevel, key: impl Into<String>, known: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		Self::NotFound {
			level,
			key: key.into(),
			known: known.into_iter().map(Into::into).collect(),
		}
	}

	/// Creates a type mismatch error.
	pub fn type_mismatch(
		what: impl Into<String>,
		expected: &'static str,
		found: impl Into<String>,
	) -> Self {
		Self::TypeMismatch {
			what: what.into(),
			expected,
			found: found.into(),
		}
	}
}
