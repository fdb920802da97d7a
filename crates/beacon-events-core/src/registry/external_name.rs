// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::event::Event;
use crate::error::{EventsError, Result};

/// Computes the name sent to receivers for events without an explicit
/// `external_name`.
///
/// Providers may build names from any event metadata; whatever they return
/// must be a string.
#[derive(Clone)]
pub struct ExternalNameProvider(Arc<dyn Fn(&Event) -> Value + Send + Sync>);

impl ExternalNameProvider {
	pub fn new<F, V>(provider: F) -> Self
	where
		F: Fn(&Event) -> V + Send + Sync + 'static,
		V: Into<Value>,
	{
		Self(Arc::new(move |event| provider(event).into()))
	}

	/// Computes the external name for `event`.
	pub fn resolve(&self, event: &Event) -> Result<String> {
		match (self.0)(event) {
			Value::String(name) => Ok(name),
			other => Err(EventsError::type_mismatch(
				format!("external name for {}", event.full_name()),
				"a string",
				other.to_string(),
			)),
		}
	}
}

impl fmt::Debug for ExternalNameProvider {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ExternalNameProvider").finish_non_exhaustive()
	}
}
