//! Loader module
//!
//! Read serialized specifications from disk or memory.
//!
//! # Overview
//!
//! The loader module provides:
//! - `VersionedSpec` - one variant per supported wire generation
//! - `load_spec*` - schema-validate, deserialize and upgrade into the
//!   canonical `DeploymentSpec`
//! - `detect_spec_version` - read the declared `spec_version`
//!
//! Field renames between generations:
//!
//! | 0.1.1        | 0.3.0                      | v3              |
//! |--------------|----------------------------|-----------------|
//! | `id`         | `uuid`                     | `uuid`          |
//! | `type`       | `plugin_type`              | `plugin_type`   |
//! | `resource`   | `plugin_name`              | `plugin_name`   |
//! | `collection` | `collection`               | `plugin_config` |
//! | `from_id`    | `from_uuid`                | `from_uuid`     |

mod parser;
mod types;

pub use parser::{
    detect_spec_version, load_spec, load_spec_from_slice, load_spec_from_str,
    load_spec_from_value, parse_versioned, read_document,
};
pub use types::{
    ConnectorV1, ConnectorV2, FunctionV1, FunctionV2, SpecV1, SpecV2, StreamV1, VersionedSpec,
};

#[cfg(test)]
mod tests;
