// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::naming::{require_non_blank, IntoTimestamp};
use crate::error::Result;

/// A dated, attributed remark attached to an event definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Note {
	at: DateTime<Utc>,
	author: String,
	text: String,
}

impl Note {
	/// Creates a note; author and text must not be blank.
	pub fn new(at: impl IntoTimestamp, author: &str, text: &str) -> Result<Self> {
		Ok(Self {
			at: at.into_timestamp()?,
			author: require_non_blank("note author", author)?,
			text: require_non_blank("note text", text)?,
		})
	}

	pub fn at(&self) -> DateTime<Utc> {
		self.at
	}

	pub fn author(&self) -> &str {
		&self.author
	}

	pub fn text(&self) -> &str {
		&self.text
	}
}

/// Note fields as they appear in option maps and definition documents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoteOptions {
	pub when: String,
	pub author: String,
	pub text: String,
}

impl NoteOptions {
	pub fn into_note(self) -> Result<Note> {
		Note::new(self.when.as_str(), &self.author, &self.text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::EventsError;

	#[test]
	fn test_note_requires_all_fields() {
		assert!(Note::new("2014-02-04", "jane", "added for onboarding funnel").is_ok());
		assert!(matches!(
			Note::new("2014-02-04", " ", "text"),
			Err(EventsError::Configuration(_))
		));
		assert!(matches!(
			Note::new("2014-02-04", "jane", ""),
			Err(EventsError::Configuration(_))
		));
		assert!(Note::new("not a date", "jane", "text").is_err());
	}

	#[test]
	fn test_note_options_reject_unknown_keys() {
		let result: std::result::Result<NoteOptions, _> = serde_json::from_value(serde_json::json!({
			"when": "2014-02-04",
			"author": "jane",
			"text": "hi",
			"mood": "happy",
		}));
		assert!(result.is_err());
	}
}
