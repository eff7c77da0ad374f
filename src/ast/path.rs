use serde::{Deserialize, Serialize};

use crate::ast::QualifiedName;
use crate::error::{EavError, EavResult};

/// One navigation hop in a [`Path`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PathStep {
    /// Property slot (scalar, value composite or collection).
    Property(QualifiedName),
    /// To-one association to another entity.
    Association(QualifiedName),
    /// To-many association to other entities.
    ManyAssociation(QualifiedName),
}

impl PathStep {
    pub fn name(&self) -> &QualifiedName {
        match self {
            PathStep::Property(qn)
            | PathStep::Association(qn)
            | PathStep::ManyAssociation(qn) => qn,
        }
    }

    /// True for association hops, which land on another entity row.
    pub fn is_association(&self) -> bool {
        !matches!(self, PathStep::Property(_))
    }
}

impl std::fmt::Display for PathStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathStep::Property(qn) => write!(f, "{}", qn.member),
            PathStep::Association(qn) => write!(f, "{}->", qn.member),
            PathStep::ManyAssociation(qn) => write!(f, "{}=>", qn.member),
        }
    }
}

/// Navigation chain from the queried entity to a slot.
///
/// Always holds at least one step; steps are stored root-first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PathSteps")]
pub struct Path {
    steps: Vec<PathStep>,
}

/// Unchecked wire form of a [`Path`].
#[derive(Deserialize)]
struct PathSteps {
    steps: Vec<PathStep>,
}

impl TryFrom<PathSteps> for Path {
    type Error = EavError;

    fn try_from(raw: PathSteps) -> EavResult<Self> {
        if raw.steps.is_empty() {
            return Err(EavError::EmptyPath);
        }
        Ok(Self { steps: raw.steps })
    }
}

impl Path {
    pub fn property(name: QualifiedName) -> Self {
        Self { steps: vec![PathStep::Property(name)] }
    }

    pub fn association(name: QualifiedName) -> Self {
        Self { steps: vec![PathStep::Association(name)] }
    }

    pub fn many_association(name: QualifiedName) -> Self {
        Self { steps: vec![PathStep::ManyAssociation(name)] }
    }

    /// Descend into a property of the current slot or target entity.
    pub fn then_property(mut self, name: QualifiedName) -> Self {
        self.steps.push(PathStep::Property(name));
        self
    }

    pub fn then_association(mut self, name: QualifiedName) -> Self {
        self.steps.push(PathStep::Association(name));
        self
    }

    pub fn then_many_association(mut self, name: QualifiedName) -> Self {
        self.steps.push(PathStep::ManyAssociation(name));
        self
    }

    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }

    pub fn leaf(&self) -> &PathStep {
        // Constructors guarantee a first step.
        &self.steps[self.steps.len() - 1]
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 && !self.steps[i - 1].is_association() {
                write!(f, ".")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_display() {
        let path = Path::association(QualifiedName::new("Order", "customer"))
            .then_property(QualifiedName::new("Person", "address"))
            .then_property(QualifiedName::new("Address", "city"));
        assert_eq!(path.to_string(), "customer->address.city");
        assert_eq!(path.leaf().name().member, "city");
        assert_eq!(path.steps().len(), 3);
    }

    #[test]
    fn test_path_requires_a_step() {
        let err = serde_json::from_str::<Path>(r#"{"steps":[]}"#).unwrap_err();
        assert!(err.to_string().contains("Path must contain at least one step"));

        let path: Path = serde_json::from_str(
            r#"{"steps":[{"Property":{"type_name":"Person","member":"age"}}]}"#,
        )
        .unwrap();
        assert_eq!(path, Path::property(QualifiedName::new("Person", "age")));
    }
}
