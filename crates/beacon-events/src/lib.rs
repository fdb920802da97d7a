// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Structured event tracking for Beacon.
//!
//! A [`Tracker`] fires events declared in a versioned
//! [`DefinitionSet`]. Each fire resolves the event, merges the tracker's
//! implicit properties with the caller's, validates the result and hands it
//! to every configured [`EventReceiver`].
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use beacon_events::{DefinitionSet, MemoryReceiver, Properties, Tracker, TrackerDefaults};
//!
//! let definitions = DefinitionSet::builder()
//!     .global_prefix("ab")
//!     .version(1, "2014-02-04", |v| {
//!         v.category("user", |c| {
//!             c.event("signed_up", "2014-02-04", "user creates an account");
//!         });
//!     })
//!     .build()
//!     .unwrap();
//!
//! let receiver = Arc::new(MemoryReceiver::new());
//! let defaults = TrackerDefaults::new(Arc::new(definitions)).with_shared_receiver(receiver.clone());
//!
//! let tracker = Tracker::builder(&defaults).distinct_id(483123).build().unwrap();
//! tracker
//!     .fire("user", "signed_up", Properties::new().insert("plan", "free"))
//!     .unwrap();
//!
//! assert_eq!(receiver.events()[0].event_name, "ab1_user_signed_up");
//! ```

pub mod config;
pub mod defaults;
pub mod error;
pub mod identity;
pub mod logging;
pub mod receiver;
pub mod tracker;

pub use config::{load_config, EventsConfig, EventsConfigLayer, LogFormat};
pub use defaults::{TrackerDefaults, DEFAULT_VERSION};
pub use error::{Result, TrackerError};
pub use identity::{DistinctId, DISTINCT_ID_PROPERTY};
pub use logging::init_tracing;
pub use receiver::{EventReceiver, MemoryReceiver, ReceiverError, TrackedEvent, TracingReceiver};
pub use tracker::{EffectiveEvent, Tracker, TrackerBuilder, IP_PROPERTY, TIME_PROPERTY};

pub use beacon_events_core::{
	DefinitionSet, Event, EventsError, ExternalNameProvider, Properties, PropertyBundle,
	PropertyMap, PropertySource, PropertyValue,
};
