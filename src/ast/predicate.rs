use serde::{Deserialize, Serialize};

use crate::ast::{ComparisonOp, Path, SortOrder, Value};

/// Filter over the properties, associations and collections of an entity.
///
/// The set of tags is closed: the compiler matches on every variant, so a new
/// predicate kind fails to build until it has a handler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Predicate {
    /// All children hold.
    And(Vec<Predicate>),
    /// At least one child holds.
    Or(Vec<Predicate>),
    /// The operand does not hold.
    Not(Box<Predicate>),
    /// `path <op> value`
    Comparison {
        op: ComparisonOp,
        path: Path,
        value: Value,
    },
    /// `path` matches a regular expression.
    Matches { path: Path, regex: String },
    /// The collection at `path` holds `value`.
    Contains { path: Path, value: Value },
    /// The collection at `path` holds every one of `values`.
    ContainsAll { path: Path, values: Vec<Value> },
    /// The property at `path` has no value.
    PropertyNull(Path),
    /// The property at `path` has a value.
    PropertyNotNull(Path),
    /// The association at `path` is unset.
    AssociationNull(Path),
    /// The association at `path` is set.
    AssociationNotNull(Path),
    /// The many-association at `path` references the entity with this identity.
    ManyAssociationContains { path: Path, identity: String },
}

impl Predicate {
    /// Short tag used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Predicate::And(_) => "and",
            Predicate::Or(_) => "or",
            Predicate::Not(_) => "not",
            Predicate::Comparison { .. } => "comparison",
            Predicate::Matches { .. } => "matches",
            Predicate::Contains { .. } => "contains",
            Predicate::ContainsAll { .. } => "contains_all",
            Predicate::PropertyNull(_) => "property_null",
            Predicate::PropertyNotNull(_) => "property_not_null",
            Predicate::AssociationNull(_) => "association_null",
            Predicate::AssociationNotNull(_) => "association_not_null",
            Predicate::ManyAssociationContains { .. } => "many_association_contains",
        }
    }
}

/// What an ORDER BY entry sorts on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SortKey {
    /// The entity identity pseudo-property.
    Identity,
    /// A property (or association) reached through a path.
    Path(Path),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBy {
    pub key: SortKey,
    #[serde(default)]
    pub order: SortOrder,
}

impl OrderBy {
    pub fn asc(path: Path) -> Self {
        Self { key: SortKey::Path(path), order: SortOrder::Asc }
    }

    pub fn desc(path: Path) -> Self {
        Self { key: SortKey::Path(path), order: SortOrder::Desc }
    }

    pub fn identity(order: SortOrder) -> Self {
        Self { key: SortKey::Identity, order }
    }
}

/// Everything a single compile call needs besides metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Name of the queried entity type; subtypes match too.
    pub result_type: String,
    /// `None` selects every entity of the result type.
    #[serde(default)]
    pub predicate: Option<Predicate>,
    #[serde(default)]
    pub order_by: Vec<OrderBy>,
    #[serde(default)]
    pub offset: Option<usize>,
    #[serde(default)]
    pub limit: Option<usize>,
    /// Produce `SELECT COUNT(..)` instead of the entity rows.
    #[serde(default)]
    pub count_only: bool,
}

impl QueryRequest {
    pub fn new(result_type: impl Into<String>) -> Self {
        Self {
            result_type: result_type.into(),
            predicate: None,
            order_by: Vec::new(),
            offset: None,
            limit: None,
            count_only: false,
        }
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn offset(mut self, n: usize) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn count(mut self) -> Self {
        self.count_only = true;
        self
    }
}
