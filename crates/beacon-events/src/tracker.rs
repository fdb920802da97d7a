// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The tracker: resolves, merges, validates and dispatches events.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use beacon_events_core::merge::{merge_properties, merge_value, overlay};
use beacon_events_core::{
	DefinitionSet, Event, EventsError, ExternalNameProvider, PropertyMap, PropertySource, PropertyValue,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::defaults::TrackerDefaults;
use crate::error::{Result, TrackerError};
use crate::identity::{DistinctId, DISTINCT_ID_PROPERTY};
use crate::receiver::EventReceiver;

/// Property holding the event time in epoch seconds.
pub const TIME_PROPERTY: &str = "time";

/// Implicit property holding the client IP address.
pub const IP_PROPERTY: &str = "ip";

/// An event after resolution, merging and validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectiveEvent {
	pub distinct_id: Option<DistinctId>,
	/// The event's full registry name.
	pub event_name: String,
	/// The name receivers see.
	pub external_name: String,
	pub properties: PropertyMap,
}

/// Fires events from one logical context (a request, a job, a user session).
///
/// A tracker binds one identity, one set of implicit properties and one
/// definition version. Implicit properties are computed once, when the
/// tracker is built; explicit properties passed to [`Tracker::fire`] override
/// them key by key.
pub struct Tracker {
	distinct_id: Option<DistinctId>,
	implicit_properties: PropertyMap,
	definitions: Arc<DefinitionSet>,
	version: u32,
	receivers: Vec<Arc<dyn EventReceiver>>,
	external_name: Option<ExternalNameProvider>,
	fire_count: AtomicU64,
}

impl fmt::Debug for Tracker {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Tracker")
			.field("distinct_id", &self.distinct_id)
			.field("implicit_properties", &self.implicit_properties)
			.field("global_prefix", &self.definitions.global_prefix())
			.field("version", &self.version)
			.field(
				"receivers",
				&self.receivers.iter().map(|r| r.name()).collect::<Vec<_>>(),
			)
			.field("fire_count", &self.fire_count())
			.finish()
	}
}

impl Tracker {
	/// Starts a tracker from `defaults`.
	pub fn builder(defaults: &TrackerDefaults) -> TrackerBuilder {
		TrackerBuilder {
			distinct_id: None,
			ip: None,
			implicit: Vec::new(),
			definitions: defaults.definitions.clone(),
			version: defaults.version,
			receivers: defaults.receivers.clone(),
			external_name: None,
			default_external_name: defaults.external_name.clone(),
		}
	}

	pub fn distinct_id(&self) -> Option<&DistinctId> {
		self.distinct_id.as_ref()
	}

	/// Replaces the identity used by later events.
	pub fn set_distinct_id(&mut self, distinct_id: Option<DistinctId>) {
		self.distinct_id = distinct_id;
	}

	pub fn implicit_properties(&self) -> &PropertyMap {
		&self.implicit_properties
	}

	pub fn version(&self) -> u32 {
		self.version
	}

	pub fn definitions(&self) -> &Arc<DefinitionSet> {
		&self.definitions
	}

	/// Number of events successfully dispatched to every receiver.
	pub fn fire_count(&self) -> u64 {
		self.fire_count.load(Ordering::Relaxed)
	}

	/// Computes what [`fire`](Self::fire) would send, without the automatic
	/// `time` property and without calling any receiver.
	pub fn effective_properties(
		&self,
		category: &str,
		event: &str,
		additional: impl Into<PropertyValue>,
	) -> Result<EffectiveEvent> {
		self.prepare(category, event, &additional.into())
	}

	/// Fires an event.
	///
	/// The event must exist in the bound version, must not be retired, and
	/// every required property must be present and non-blank after merging.
	/// Receivers are called in order; the first failing receiver stops the
	/// dispatch and its error is returned.
	///
	/// A `time` property is added with the current epoch seconds unless the
	/// caller passed one. An explicit `time: null` suppresses it, and the
	/// `time` key is then absent from what receivers see.
	#[tracing::instrument(level = "debug", skip(self, additional), fields(version = self.version))]
	pub fn fire(
		&self,
		category: &str,
		event: &str,
		additional: impl Into<PropertyValue>,
	) -> Result<EffectiveEvent> {
		let mut effective = self.prepare(category, event, &additional.into())?;
		stamp_time(&mut effective.properties);

		for receiver in &self.receivers {
			trace!(receiver = receiver.name(), "dispatching event");
			receiver
				.track(
					effective.distinct_id.as_ref(),
					&effective.external_name,
					&effective.properties,
				)
				.map_err(|source| TrackerError::Receiver {
					receiver: receiver.name().to_string(),
					source,
				})?;
		}

		self.fire_count.fetch_add(1, Ordering::Relaxed);
		debug!(
			event = %effective.event_name,
			external_name = %effective.external_name,
			receivers = self.receivers.len(),
			"event fired"
		);
		Ok(effective)
	}

	fn prepare(
		&self,
		category: &str,
		event: &str,
		additional: &PropertyValue,
	) -> Result<EffectiveEvent> {
		let version = self.definitions.fetch_version(self.version)?;
		let event = version.fetch_event(category, event)?;

		let mut explicit = PropertyMap::new();
		merge_value(&mut explicit, additional, version.property_separator())?;

		let mut properties = overlay(&self.implicit_properties, explicit);

		let distinct_id = match properties.remove(DISTINCT_ID_PROPERTY) {
			Some(value) => DistinctId::from_property(value)?,
			None => self.distinct_id.clone(),
		};

		event.validate(&properties)?;

		Ok(EffectiveEvent {
			distinct_id,
			event_name: event.full_name().to_string(),
			external_name: self.resolve_external_name(event)?,
			properties,
		})
	}

	fn resolve_external_name(&self, event: &Event) -> Result<String> {
		if let Some(name) = event.external_name() {
			return Ok(name.to_string());
		}
		match &self.external_name {
			Some(provider) => Ok(provider.resolve(event)?),
			None => Ok(event.full_name().to_string()),
		}
	}
}

/// Adds the current time unless the caller supplied one.
///
/// An explicit `null` suppresses the timestamp and is itself dropped.
fn stamp_time(properties: &mut PropertyMap) {
	match properties.get(TIME_PROPERTY) {
		None => {
			properties.insert(TIME_PROPERTY.to_string(), Value::from(Utc::now().timestamp()));
		}
		Some(Value::Null) => {
			properties.remove(TIME_PROPERTY);
		}
		Some(_) => {}
	}
}

/// Converts an `ip` input into an address.
fn normalize_ip(value: PropertyValue) -> Result<PropertyValue> {
	let ip = match value {
		PropertyValue::Ip(_) => value,
		PropertyValue::String(text) => PropertyValue::ip(&text)?,
		PropertyValue::Symbol(text) => PropertyValue::ip(&text)?,
		PropertyValue::Integer(bits) => match u32::try_from(bits) {
			Ok(bits) => PropertyValue::ip_from_u32(bits),
			Err(_) => return Err(invalid_ip(&value)),
		},
		PropertyValue::Unsigned(bits) => match u32::try_from(bits) {
			Ok(bits) => PropertyValue::ip_from_u32(bits),
			Err(_) => return Err(invalid_ip(&value)),
		},
		other => return Err(invalid_ip(&other)),
	};
	Ok(ip)
}

fn invalid_ip(value: &PropertyValue) -> TrackerError {
	EventsError::InvalidPropertyValue {
		key: IP_PROPERTY.to_string(),
		value: format!("expected an IP address, got {}", value.describe()),
	}
	.into()
}

/// Collects a tracker's identity, implicit properties and overrides.
pub struct TrackerBuilder {
	distinct_id: Option<DistinctId>,
	ip: Option<PropertyValue>,
	implicit: Vec<PropertyValue>,
	definitions: Option<Arc<DefinitionSet>>,
	version: u32,
	receivers: Vec<Arc<dyn EventReceiver>>,
	external_name: Option<ExternalNameProvider>,
	default_external_name: Option<ExternalNameProvider>,
}

impl TrackerBuilder {
	pub fn distinct_id(mut self, distinct_id: impl Into<DistinctId>) -> Self {
		self.distinct_id = Some(distinct_id.into());
		self
	}

	/// Sets the implicit `ip` property.
	///
	/// Accepts an address, its text form, or an IPv4 address as a 32-bit
	/// integer. Anything else fails when the tracker is built.
	pub fn ip(mut self, ip: impl Into<PropertyValue>) -> Self {
		self.ip = Some(ip.into());
		self
	}

	/// Adds a source of implicit properties.
	///
	/// Sources are flattened together when the tracker is built; two sources
	/// producing the same key are a collision.
	pub fn implicit(mut self, source: impl Into<PropertyValue>) -> Self {
		self.implicit.push(source.into());
		self
	}

	pub fn definitions(mut self, definitions: Arc<DefinitionSet>) -> Self {
		self.definitions = Some(definitions);
		self
	}

	pub fn version(mut self, version: u32) -> Self {
		self.version = version;
		self
	}

	/// Adds a receiver after those inherited from the defaults.
	pub fn receiver<R: EventReceiver + 'static>(mut self, receiver: R) -> Self {
		self.receivers.push(Arc::new(receiver));
		self
	}

	pub fn shared_receiver(mut self, receiver: Arc<dyn EventReceiver>) -> Self {
		self.receivers.push(receiver);
		self
	}

	/// Replaces every receiver, including those inherited from the defaults.
	pub fn receivers(mut self, receivers: Vec<Arc<dyn EventReceiver>>) -> Self {
		self.receivers = receivers;
		self
	}

	/// Sets this tracker's external name provider, which takes precedence over
	/// the provider in the defaults.
	pub fn external_name(mut self, provider: ExternalNameProvider) -> Self {
		self.external_name = Some(provider);
		self
	}

	#[tracing::instrument(level = "debug", skip(self), fields(version = self.version))]
	pub fn build(self) -> Result<Tracker> {
		let definitions = self
			.definitions
			.ok_or_else(|| TrackerError::config("no event definitions configured"))?;
		let version = definitions.fetch_version(self.version)?;
		let separator = version.property_separator();

		let mut implicit_properties = PropertyMap::new();
		if let Some(ip) = self.ip.map(normalize_ip).transpose()? {
			let mut source = PropertySource::new();
			source.insert(IP_PROPERTY.to_string(), ip);
			merge_properties(&mut implicit_properties, &source, separator)?;
		}
		for source in &self.implicit {
			merge_value(&mut implicit_properties, source, separator)?;
		}

		debug!(
			distinct_id = ?self.distinct_id,
			implicit = implicit_properties.len(),
			receivers = self.receivers.len(),
			"tracker built"
		);

		Ok(Tracker {
			distinct_id: self.distinct_id,
			implicit_properties,
			version: self.version,
			definitions,
			receivers: self.receivers,
			external_name: self.external_name.or(self.default_external_name),
			fire_count: AtomicU64::new(0),
		})
	}
}
