// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Tracing subscriber setup for binaries and tests that embed the tracker.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LogFormat;
use crate::error::{Result, TrackerError};

/// Environment variable holding the log filter directives.
pub const LOG_FILTER_ENV: &str = "BEACON_EVENTS_LOG";

const DEFAULT_FILTER: &str = "info";

/// Builds the filter from `BEACON_EVENTS_LOG`, falling back to `info`.
pub fn env_filter() -> EnvFilter {
	EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs a global subscriber writing to stdout.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(format: LogFormat) -> Result<()> {
	let registry = tracing_subscriber::registry().with(env_filter());

	let installed = match format {
		LogFormat::Plain => registry.with(tracing_subscriber::fmt::layer()).try_init(),
		LogFormat::Json => registry
			.with(tracing_subscriber::fmt::layer().json())
			.try_init(),
	};

	installed.map_err(|e| TrackerError::config(format!("failed to install tracing subscriber: {e}")))
}
