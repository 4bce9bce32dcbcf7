//! # Handler Reference
//!
//! The textual `<module>:<callable>` identifier that selects which component a
//! process serves.

use crate::error::ResolveError;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerReference {
    module: String,
    callable: String,
}

impl HandlerReference {
    /// Parse a reference, requiring exactly one `:` with non-empty halves
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        let (module, callable) = reference.split_once(':').ok_or_else(|| {
            ResolveError::configuration(reference, "expected '<module>:<callable>'")
        })?;

        if callable.contains(':') {
            return Err(ResolveError::configuration(
                reference,
                "expected exactly one ':' separator",
            ));
        }

        let module = module.trim();
        let callable = callable.trim();
        if module.is_empty() {
            return Err(ResolveError::configuration(reference, "module path is empty"));
        }
        if callable.is_empty() {
            return Err(ResolveError::configuration(reference, "callable name is empty"));
        }

        Ok(Self {
            module: module.to_string(),
            callable: callable.to_string(),
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn callable(&self) -> &str {
        &self.callable
    }
}

impl fmt::Display for HandlerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.callable)
    }
}

impl FromStr for HandlerReference {
    type Err = ResolveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for HandlerReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
