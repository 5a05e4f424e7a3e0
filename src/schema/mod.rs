//! Schema validation module
//!
//! Guards the system against malformed or hand-crafted specifications before
//! any graph semantics are applied.
//!
//! # Overview
//!
//! - `validate_spec` - validate raw bytes against the schema registered for a
//!   claimed `spec_version`
//! - `validate_value` - the same, for an already-parsed document
//! - `schema_document` - the embedded JSON Schema (draft 2020-12) per version
//!
//! Failures name the document path and the schema rule that rejected it:
//!
//! ```text
//! "/connectors/0/plugin_type" field fails /properties/connectors/items/properties/plugin_type/enum validation: value must be one of "source", "destination"
//! ```

mod validator;

pub use validator::{is_valid, schema_document, validate_spec, validate_value};
