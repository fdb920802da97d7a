// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core types for Beacon structured events.
//!
//! This crate holds everything that does not touch a receiver:
//!
//! - [`scalar`]: normalization of single values into wire-safe scalars
//! - [`merge`]: flattening nested property sources with collision detection
//! - [`registry`]: the versioned event registry and its builders
//! - [`document`]: loading a registry from TOML or JSON
//!
//! The tracker that ties these together lives in `beacon-events`.
//!
//! # Example
//!
//! ```
//! use beacon_events_core::{merge, DefinitionSet, Properties};
//!
//! let definitions = DefinitionSet::builder()
//!     .global_prefix("ab")
//!     .version(1, "2014-02-04", |v| {
//!         v.category("user", |c| {
//!             c.event_with("signed_up", |e| {
//!                 e.introduced("2014-02-04")
//!                     .desc("user creates an account")
//!                     .required_properties(["user_age"]);
//!             });
//!         });
//!     })
//!     .build()
//!     .unwrap();
//!
//! let props = Properties::new()
//!     .insert("user", Properties::new().insert("age", 27).insert("gender", "female"));
//! let flat = merge::flatten(props.as_source(), "_").unwrap();
//!
//! let event = definitions.fetch_event(1, "user", "signed_up").unwrap();
//! event.validate(&flat).unwrap();
//! ```

pub mod document;
pub mod error;
pub mod merge;
pub mod registry;
pub mod scalar;
pub mod value;

pub use document::{DefinitionDocument, DocumentFormat};
pub use error::{EventsError, RegistryLevel, Result};
pub use registry::{
	Category, CategoryBuilder, DefinitionSet, DefinitionSetBuilder, Event, EventBuilder,
	EventOptions, ExternalNameProvider, IntoTimestamp, Note, Version, VersionBuilder,
};
pub use value::{Properties, PropertyBundle, PropertyMap, PropertySource, PropertyValue};
