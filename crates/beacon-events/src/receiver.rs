// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Receivers: where fired events go.
//!
//! A receiver gets each event synchronously, in the order receivers were
//! configured. Anything asynchronous (batching, network delivery, retries)
//! belongs inside a receiver implementation.

use beacon_events_core::PropertyMap;
use parking_lot::Mutex;
use serde::Serialize;

use crate::identity::DistinctId;

/// Error type receivers may return.
pub type ReceiverError = Box<dyn std::error::Error + Send + Sync>;

/// A sink for fired events.
pub trait EventReceiver: Send + Sync {
	/// Name used in error messages.
	fn name(&self) -> &str {
		std::any::type_name::<Self>()
	}

	fn track(
		&self,
		distinct_id: Option<&DistinctId>,
		event_name: &str,
		properties: &PropertyMap,
	) -> Result<(), ReceiverError>;
}

impl<F> EventReceiver for F
where
	F: Fn(Option<&DistinctId>, &str, &PropertyMap) -> Result<(), ReceiverError> + Send + Sync,
{
	fn track(
		&self,
		distinct_id: Option<&DistinctId>,
		event_name: &str,
		properties: &PropertyMap,
	) -> Result<(), ReceiverError> {
		self(distinct_id, event_name, properties)
	}
}

/// One call recorded by [`MemoryReceiver`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedEvent {
	pub distinct_id: Option<DistinctId>,
	pub event_name: String,
	pub properties: PropertyMap,
}

/// Keeps every tracked event in memory.
#[derive(Debug, Default)]
pub struct MemoryReceiver {
	events: Mutex<Vec<TrackedEvent>>,
}

impl MemoryReceiver {
	pub fn new() -> Self {
		Self::default()
	}

	/// A snapshot of everything tracked so far, oldest first.
	pub fn events(&self) -> Vec<TrackedEvent> {
		self.events.lock().clone()
	}

	pub fn len(&self) -> usize {
		self.events.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.events.lock().is_empty()
	}

	/// Removes and returns everything tracked so far.
	pub fn drain(&self) -> Vec<TrackedEvent> {
		std::mem::take(&mut *self.events.lock())
	}
}

impl EventReceiver for MemoryReceiver {
	fn name(&self) -> &str {
		"memory"
	}

	fn track(
		&self,
		distinct_id: Option<&DistinctId>,
		event_name: &str,
		properties: &PropertyMap,
	) -> Result<(), ReceiverError> {
		self.events.lock().push(TrackedEvent {
			distinct_id: distinct_id.cloned(),
			event_name: event_name.to_string(),
			properties: properties.clone(),
		});
		Ok(())
	}
}

/// Writes each tracked event as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReceiver;

impl EventReceiver for TracingReceiver {
	fn name(&self) -> &str {
		"tracing"
	}

	fn track(
		&self,
		distinct_id: Option<&DistinctId>,
		event_name: &str,
		properties: &PropertyMap,
	) -> Result<(), ReceiverError> {
		let properties = serde_json::to_string(properties)?;
		tracing::info!(
			target: "beacon_events::track",
			distinct_id = distinct_id.map(tracing::field::display),
			event = %event_name,
			properties = %properties,
			"event tracked"
		);
		Ok(())
	}
}
