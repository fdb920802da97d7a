// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Input property values and the property-bundle extension point.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, TimeZone, Utc};
use serde_json::Value;

use crate::error::{EventsError, Result};

/// A nested, not-yet-flattened source of properties.
pub type PropertySource = BTreeMap<String, PropertyValue>;

/// A flattened property map, as sent to receivers.
pub type PropertyMap = serde_json::Map<String, Value>;

/// Anything that can describe itself as a map of properties.
///
/// Domain objects implement this so they can be passed directly as a property
/// value; the merger expands the returned map under the key the object was
/// given, exactly as if the map had been passed in its place.
pub trait PropertyBundle: fmt::Debug + Send + Sync {
	fn to_property_bundle(&self) -> PropertySource;
}

/// A single property value supplied by a caller, before normalization.
#[derive(Debug, Clone)]
pub enum PropertyValue {
	Null,
	Bool(bool),
	Integer(i64),
	Unsigned(u64),
	Float(f64),
	/// Sent as a whole number of seconds.
	Duration(Duration),
	String(String),
	/// A symbol-like atom (enum label, static identifier).
	Symbol(Cow<'static, str>),
	Timestamp(DateTime<FixedOffset>),
	Ip(IpAddr),
	Array(Vec<PropertyValue>),
	Map(PropertySource),
	Bundle(Arc<dyn PropertyBundle>),
	/// A value with no wire form, such as a compiled pattern. Carries a
	/// rendering used in error messages.
	Opaque(String),
}

impl PropertyValue {
	/// Wraps a property bundle.
	pub fn bundle<B: PropertyBundle + 'static>(bundle: B) -> Self {
		Self::Bundle(Arc::new(bundle))
	}

	/// Creates a symbol-like atom.
	pub fn symbol(name: impl Into<Cow<'static, str>>) -> Self {
		Self::Symbol(name.into())
	}

	/// Parses an IP address from dotted-quad or IPv6 text.
	pub fn ip(text: &str) -> Result<Self> {
		text
			.trim()
			.parse::<IpAddr>()
			.map(Self::Ip)
			.map_err(|e| EventsError::InvalidPropertyValue {
				key: "ip".to_string(),
				value: format!("{text:?} ({e})"),
			})
	}

	/// Builds an IPv4 address from its 32-bit integer form.
	pub fn ip_from_u32(bits: u32) -> Self {
		Self::Ip(IpAddr::V4(Ipv4Addr::from(bits)))
	}

	pub fn is_map(&self) -> bool {
		matches!(self, PropertyValue::Map(_))
	}

	/// A short description used in error messages.
	pub fn describe(&self) -> String {
		match self {
			PropertyValue::Bundle(bundle) => format!("{bundle:?}"),
			PropertyValue::Opaque(rendering) => rendering.clone(),
			PropertyValue::Map(map) => format!("map with {} entries", map.len()),
			other => format!("{other:?}"),
		}
	}
}

impl From<bool> for PropertyValue {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

macro_rules! impl_from_signed {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for PropertyValue {
				fn from(value: $ty) -> Self {
					Self::Integer(i64::from(value))
				}
			}
		)*
	};
}

macro_rules! impl_from_unsigned {
	($($ty:ty),*) => {
		$(
			impl From<$ty> for PropertyValue {
				fn from(value: $ty) -> Self {
					Self::Unsigned(u64::from(value))
				}
			}
		)*
	};
}

impl_from_signed!(i8, i16, i32, i64);
impl_from_unsigned!(u8, u16, u32, u64);

impl From<usize> for PropertyValue {
	fn from(value: usize) -> Self {
		Self::Unsigned(value as u64)
	}
}

impl From<f32> for PropertyValue {
	fn from(value: f32) -> Self {
		Self::Float(f64::from(value))
	}
}

impl From<f64> for PropertyValue {
	fn from(value: f64) -> Self {
		Self::Float(value)
	}
}

impl From<Duration> for PropertyValue {
	fn from(value: Duration) -> Self {
		Self::Duration(value)
	}
}

impl From<&str> for PropertyValue {
	fn from(value: &str) -> Self {
		Self::String(value.to_string())
	}
}

impl From<String> for PropertyValue {
	fn from(value: String) -> Self {
		Self::String(value)
	}
}

impl<Tz: TimeZone> From<DateTime<Tz>> for PropertyValue {
	fn from(value: DateTime<Tz>) -> Self {
		let offset = value.offset().fix();
		Self::Timestamp(value.with_timezone(&offset))
	}
}

/// Naive date-times are taken to be UTC.
impl From<NaiveDateTime> for PropertyValue {
	fn from(value: NaiveDateTime) -> Self {
		Self::from(Utc.from_utc_datetime(&value))
	}
}

impl From<IpAddr> for PropertyValue {
	fn from(value: IpAddr) -> Self {
		Self::Ip(value)
	}
}

impl From<Ipv4Addr> for PropertyValue {
	fn from(value: Ipv4Addr) -> Self {
		Self::Ip(IpAddr::V4(value))
	}
}

impl From<Ipv6Addr> for PropertyValue {
	fn from(value: Ipv6Addr) -> Self {
		Self::Ip(IpAddr::V6(value))
	}
}

impl<T: Into<PropertyValue>> From<Vec<T>> for PropertyValue {
	fn from(values: Vec<T>) -> Self {
		Self::Array(values.into_iter().map(Into::into).collect())
	}
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Null, Into::into)
	}
}

impl From<PropertySource> for PropertyValue {
	fn from(map: PropertySource) -> Self {
		Self::Map(map)
	}
}

impl From<Arc<dyn PropertyBundle>> for PropertyValue {
	fn from(bundle: Arc<dyn PropertyBundle>) -> Self {
		Self::Bundle(bundle)
	}
}

impl From<Value> for PropertyValue {
	fn from(value: Value) -> Self {
		match value {
			Value::Null => Self::Null,
			Value::Bool(b) => Self::Bool(b),
			Value::Number(n) => {
				if let Some(i) = n.as_i64() {
					Self::Integer(i)
				} else if let Some(u) = n.as_u64() {
					Self::Unsigned(u)
				} else {
					Self::Float(n.as_f64().unwrap_or(f64::NAN))
				}
			}
			Value::String(s) => Self::String(s),
			Value::Array(values) => Self::Array(values.into_iter().map(Self::from).collect()),
			Value::Object(map) => Self::Map(
				map
					.into_iter()
					.map(|(k, v)| (k, Self::from(v)))
					.collect(),
			),
		}
	}
}

/// A builder for call-site property sources.
///
/// # Example
///
/// ```
/// use beacon_events_core::Properties;
///
/// let props = Properties::new()
///     .insert("button_name", "checkout")
///     .insert("page", "/cart")
///     .insert("price", 99.99)
///     .insert("is_premium", true);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Properties {
	inner: PropertySource,
}

impl Properties {
	/// Creates a new empty Properties builder.
	pub fn new() -> Self {
		Self {
			inner: PropertySource::new(),
		}
	}

	/// Inserts a key-value pair.
	///
	/// Values may be scalars, nested maps, other `Properties`, or property
	/// bundles; nesting is flattened when the properties are merged.
	pub fn insert<K, V>(mut self, key: K, value: V) -> Self
	where
		K: Into<String>,
		V: Into<PropertyValue>,
	{
		self.inner.insert(key.into(), value.into());
		self
	}

	/// Inserts a property bundle under `key`.
	pub fn insert_bundle<K, B>(self, key: K, bundle: B) -> Self
	where
		K: Into<String>,
		B: PropertyBundle + 'static,
	{
		self.insert(key, PropertyValue::bundle(bundle))
	}

	pub fn is_empty(&self) -> bool {
		self.inner.is_empty()
	}

	pub fn len(&self) -> usize {
		self.inner.len()
	}

	pub fn get(&self, key: &str) -> Option<&PropertyValue> {
		self.inner.get(key)
	}

	pub fn as_source(&self) -> &PropertySource {
		&self.inner
	}

	pub fn into_source(self) -> PropertySource {
		self.inner
	}
}

impl From<Properties> for PropertyValue {
	fn from(props: Properties) -> Self {
		Self::Map(props.inner)
	}
}

impl From<PropertySource> for Properties {
	fn from(inner: PropertySource) -> Self {
		Self { inner }
	}
}

impl TryFrom<Value> for Properties {
	type Error = EventsError;

	fn try_from(value: Value) -> Result<Self> {
		match PropertyValue::from(value) {
			PropertyValue::Map(inner) => Ok(Self { inner }),
			other => Err(EventsError::InvalidPropertyValue {
				key: String::new(),
				value: format!("properties must be a map, got {}", other.describe()),
			}),
		}
	}
}
