//! Entity model module
//!
//! Connectors, functions, streams and the `DeploymentSpec` aggregate,
//! plus its JSON wire serialization.
//!
//! # Overview
//!
//! The spec module provides:
//! - `Connector`, `Function`, `Stream` - the entities of a topology
//! - `DeploymentSpec` - the aggregate handed off to the deploying platform
//! - `marshal` / `unmarshal` - the canonical JSON encoding
//!
//! Entities are never mutated after being added to a spec, except for
//! stamping the resolved execution image onto the functions.

mod types;

pub use types::{Connector, Definition, DeploymentSpec, Function, Metadata, RuntimeInfo, Stream};

use crate::dag::Dag;
use crate::error::{Error, Result};
use crate::types::{SpecVersion, StringMap};

impl DeploymentSpec {
    /// Create an empty specification for the given definition
    pub fn new(definition: Definition) -> Self {
        Self {
            secrets: StringMap::new(),
            connectors: Vec::new(),
            functions: Vec::new(),
            streams: Vec::new(),
            definition,
        }
    }

    /// Declared spec version string
    pub fn spec_version(&self) -> &str {
        &self.definition.metadata.spec_version
    }

    /// Parse the declared spec version
    pub fn parsed_spec_version(&self) -> Result<SpecVersion> {
        self.spec_version().parse()
    }

    /// Look up a connector by id
    pub fn connector(&self, uuid: &str) -> Option<&Connector> {
        self.connectors.iter().find(|c| c.uuid == uuid)
    }

    /// Look up a function by id
    pub fn function(&self, uuid: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.uuid == uuid)
    }

    /// Source connectors, in declaration order
    pub fn sources(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.iter().filter(|c| c.is_source())
    }

    /// Destination connectors, in declaration order
    pub fn destinations(&self) -> impl Iterator<Item = &Connector> {
        self.connectors.iter().filter(|c| c.is_destination())
    }

    /// Whether any function stage has been declared
    pub fn has_functions(&self) -> bool {
        !self.functions.is_empty()
    }

    /// Stamp the resolved execution image onto every function
    pub fn set_image_for_functions(&mut self, image: &str) -> Result<()> {
        if self.functions.is_empty() {
            return Err(Error::NoFunctions);
        }
        for function in &mut self.functions {
            function.image = image.to_string();
        }
        Ok(())
    }

    /// Assemble the graph from the flat lists and validate it
    pub fn build_dag(&self) -> Result<Dag> {
        let dag = Dag::assemble(self)?;
        dag.validate()?;
        Ok(dag)
    }

    /// Encode as compact JSON
    pub fn marshal(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Encode as pretty-printed JSON
    pub fn marshal_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode canonical JSON
    ///
    /// Only the canonical field names are accepted; use
    /// [`crate::loader::load_spec_from_slice`] for older generations.
    pub fn unmarshal(data: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(data)?)
    }
}

#[cfg(test)]
mod tests;
