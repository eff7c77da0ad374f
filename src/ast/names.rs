use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Identifies one declared property or association slot on a domain type.
///
/// Rendered and parsed as `Type:member`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QualifiedName {
    /// Declaring type name.
    pub type_name: String,
    /// Member name within the declaring type.
    pub member: String,
}

impl QualifiedName {
    pub fn new(type_name: impl Into<String>, member: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            member: member.into(),
        }
    }
}

impl std::fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.type_name, self.member)
    }
}

impl FromStr for QualifiedName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.rsplit_once(':') {
            Some((ty, member)) if !ty.is_empty() && !member.is_empty() => {
                Ok(Self::new(ty, member))
            }
            _ => Err(format!("expected 'Type:member', got '{}'", s)),
        }
    }
}
