// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for the tracker.

use beacon_events_core::EventsError;
use thiserror::Error;

use crate::receiver::ReceiverError;

/// Tracker errors.
#[derive(Debug, Error)]
pub enum TrackerError {
	/// Resolving, merging, or validating the event failed.
	#[error(transparent)]
	Events(#[from] EventsError),

	/// A receiver failed; later receivers were not called.
	#[error("receiver {receiver} failed: {source}")]
	Receiver {
		receiver: String,
		#[source]
		source: ReceiverError,
	},

	/// Tracker configuration is incomplete or invalid.
	#[error("invalid tracker configuration: {0}")]
	Config(String),
}

impl TrackerError {
	pub fn config(msg: impl Into<String>) -> Self {
		Self::Config(msg.into())
	}

	/// Returns the underlying registry or property error, if any.
	pub fn as_events_error(&self) -> Option<&EventsError> {
		match self {
			TrackerError::Events(e) => Some(e),
			_ => None,
		}
	}
}

/// Result type alias for tracker operations.
pub type Result<T> = std::result::Result<T, TrackerError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_events_error_is_transparent() {
		let err = TrackerError::from(EventsError::PropertyCollision {
			key: "foo_bar".to_string(),
		});
		assert_eq!(
			err.to_string(),
			"multiple properties flatten to the key \"foo_bar\""
		);
		assert!(err.as_events_error().is_some());
	}

	#[test]
	fn test_receiver_error_names_receiver() {
		let err = TrackerError::Receiver {
			receiver: "MemoryReceiver".to_string(),
			source: "connection refused".into(),
		};
		assert!(err.to_string().contains("MemoryReceiver"));
		assert!(err.as_events_error().is_none());
	}
}
