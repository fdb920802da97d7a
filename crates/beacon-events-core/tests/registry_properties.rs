// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use beacon_events_core::merge::{flatten, merge_properties};
use beacon_events_core::registry::parse_timestamp;
use beacon_events_core::{
	DefinitionSet, EventsError, Properties, PropertyBundle, PropertyMap, PropertySource,
};
use serde_json::{json, Value};

fn definitions() -> DefinitionSet {
	DefinitionSet::builder()
		.global_prefix("ab")
		.version(1, "2014-02-04", |v| {
			v.category("user", |c| {
				c.event_with("signed_up", |e| {
					e.introduced("2014-02-04")
						.desc("user creates an account")
						.required_properties(["foo"]);
				});
				c.event("Foo", "2014-02-04", "declared with a capitalized name");
			});
			v.category_with_options("billing", json!({"retired_at": "2013-06-01"}), |c| {
				c.event("paid", "2012-01-01", "invoice paid");
				c.event_with("refunded", |e| {
					e.introduced("2012-01-01")
						.desc("invoice refunded")
						.retired_at("2013-09-01");
				});
			});
		})
		.version_with_options(
			2,
			json!({"introduced": "2015-01-01", "retired_at": "2016-01-01"}),
			|v| {
				v.category("user", |c| {
					c.event_from_options(
						"signed_up",
						json!({"introduced": "2015-01-01", "desc": "user creates an account"}),
					);
				});
			},
		)
		.build()
		.unwrap()
}

fn props(value: Value) -> PropertyMap {
	match value {
		Value::Object(map) => map,
		other => panic!("expected an object, got {other}"),
	}
}

#[test]
fn test_category_retirement_reaches_events() {
	let definitions = definitions();
	let event = definitions.fetch_event(1, "billing", "paid").unwrap();
	assert!(event.retired_at().is_none());

	match event.validate(&PropertyMap::new()) {
		Err(EventsError::RetiredEvent { retired_at, .. }) => {
			assert_eq!(retired_at, parse_timestamp("2013-06-01").unwrap());
		}
		other => panic!("expected RetiredEvent, got {other:?}"),
	}
}

#[test]
fn test_earliest_retirement_wins() {
	let definitions = definitions();
	let event = definitions.fetch_event(1, "billing", "refunded").unwrap();
	assert_eq!(
		event.effective_retired_at(),
		Some(parse_timestamp("2013-06-01").unwrap())
	);
}

#[test]
fn test_version_retirement_reaches_events() {
	let definitions = definitions();
	let event = definitions.fetch_event(2, "user", "signed_up").unwrap();
	assert!(event.is_retired());
	assert!(matches!(
		event.validate(&PropertyMap::new()),
		Err(EventsError::RetiredEvent { .. })
	));
}

#[test]
fn test_required_properties_must_be_non_blank() {
	let definitions = definitions();
	let event = definitions.fetch_event(1, "user", "signed_up").unwrap();

	for missing in [json!({}), json!({"foo": ""}), json!({"foo": "   "}), json!({"foo": null})] {
		match event.validate(&props(missing.clone())) {
			Err(EventsError::RequiredPropertyMissing { property, .. }) => assert_eq!(property, "foo"),
			other => panic!("{missing} should be rejected, got {other:?}"),
		}
	}

	for present in [json!({"foo": "x"}), json!({"foo": 0}), json!({"foo": false})] {
		assert!(event.validate(&props(present)).is_ok());
	}
}

#[test]
fn test_lookup_is_case_and_whitespace_insensitive() {
	let definitions = definitions();
	let declared = definitions.fetch_event(1, "user", "Foo").unwrap();
	let looked_up = definitions.fetch_event(1, " USER", " fOO ").unwrap();
	assert_eq!(declared.full_name(), looked_up.full_name());
	assert_eq!(looked_up.full_name(), "ab1_user_foo");
}

#[test]
fn test_declaration_styles_converge() {
	let definitions = definitions();
	let positional = definitions.fetch_event(1, "user", "foo").unwrap();
	let from_options = definitions.fetch_event(2, "user", "signed_up").unwrap();

	assert_eq!(positional.description(), "declared with a capitalized name");
	assert_eq!(from_options.description(), "user creates an account");
	assert_eq!(from_options.full_name(), "ab2_user_signed_up");
}

#[test]
fn test_missing_description_fails_build() {
	let err = DefinitionSet::builder()
		.global_prefix("ab")
		.version(1, "2014-02-04", |v| {
			v.category("user", |c| {
				c.event_with("signed_up", |e| {
					e.introduced("2014-02-04");
				});
			});
		})
		.build()
		.unwrap_err();
	assert!(matches!(err, EventsError::Configuration(_)));
}

#[test]
fn test_unknown_option_key_fails_build() {
	let err = DefinitionSet::builder()
		.global_prefix("ab")
		.version(1, "2014-02-04", |v| {
			v.category("user", |c| {
				c.event_from_options(
					"signed_up",
					json!({"introduced": "2014-02-04", "desc": "x", "requried_properties": ["a"]}),
				);
			});
		})
		.build()
		.unwrap_err();
	assert!(matches!(err, EventsError::Configuration(_)));
}

#[test]
fn test_duplicate_names_after_normalization() {
	let err = DefinitionSet::builder()
		.global_prefix("ab")
		.version(1, "2014-02-04", |v| {
			v.category("user", |c| {
				c.event("signed_up", "2014-02-04", "first");
				c.event(" Signed_Up", "2014-02-04", "second");
			});
		})
		.build()
		.unwrap_err();
	assert!(matches!(err, EventsError::DuplicateDeclaration { .. }));
}

#[derive(Debug)]
struct Pair;

impl PropertyBundle for Pair {
	fn to_property_bundle(&self) -> PropertySource {
		Properties::new().insert("a", 1).insert("b", Properties::new().insert("c", 2)).into_source()
	}
}

#[test]
fn test_merging_into_shared_target() {
	let mut target = PropertyMap::new();
	merge_properties(
		&mut target,
		Properties::new().insert_bundle("obj", Pair).as_source(),
		"~",
	)
	.unwrap();
	merge_properties(&mut target, Properties::new().insert("other", true).as_source(), "~")
		.unwrap();
	assert_eq!(
		Value::Object(target.clone()),
		json!({"obj~a": 1, "obj~b~c": 2, "other": true})
	);

	let err = merge_properties(&mut target, Properties::new().insert("obj~a", 3).as_source(), "~")
		.unwrap_err();
	assert!(matches!(err, EventsError::PropertyCollision { key } if key == "obj~a"));
}

#[test]
fn test_flattened_properties_validate() {
	let definitions = definitions();
	let event = definitions.fetch_event(1, "user", "signed_up").unwrap();
	let flat = flatten(Properties::new().insert("foo", " bar ").as_source(), "_").unwrap();
	assert_eq!(flat["foo"], json!("bar"));
	assert!(event.validate(&flat).is_ok());
}
