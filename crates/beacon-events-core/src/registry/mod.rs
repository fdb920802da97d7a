// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The event registry: definition set → version → category → event.
//!
//! Declarations go through builders; nothing is validated for completeness
//! until [`DefinitionSetBuilder::build`] seals the tree. After that the
//! registry is read-only. Each child carries what it inherits from its parents
//! (name prefixes, separator, retirement) so there are no back-references.

mod category;
mod definition_set;
mod event;
mod external_name;
mod naming;
mod note;
mod version;

pub use category::{Category, CategoryBuilder, CategoryOptions};
pub use definition_set::{DefinitionSet, DefinitionSetBuilder};
pub use event::{Event, EventBuilder, EventOptions};
pub use external_name::ExternalNameProvider;
pub use naming::{normalize_name, parse_timestamp, IntoTimestamp};
pub use note::{Note, NoteOptions};
pub use version::{Version, VersionBuilder, VersionOptions};
