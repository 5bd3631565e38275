use crate::config::ResolvedTable;
use crate::error::AppError;
use crate::query::QueryBuilder;
use serde::Serialize;
use std::fmt;

/// Prefix on a sort token that flips it to descending.
pub const DESCENDING_MARKER: char = '-';

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl OrderDirection {
    pub fn as_sql(self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct OrderClause {
    pub field: String,
    pub direction: OrderDirection,
}

impl OrderClause {
    /// One token of a sort spec, taken as-is: no trimming, no validation.
    pub fn parse_token(token: &str) -> Self {
        match token.strip_prefix(DESCENDING_MARKER) {
            Some(field) => OrderClause {
                field: field.to_string(),
                direction: OrderDirection::Desc,
            },
            None => OrderClause {
                field: token.to_string(),
                direction: OrderDirection::Asc,
            },
        }
    }
}

/// Sort keys in precedence order: the first clause is the primary key of the sort.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OrderSpec {
    clauses: Vec<OrderClause>,
}

impl OrderSpec {
    /// Lenient parse of a comma-separated sort spec. Empty tokens come through as empty fields
    /// and are rejected by the builder when applied.
    pub fn parse(raw: &str) -> Self {
        raw.split(',').map(OrderClause::parse_token).collect()
    }

    /// Parse and check every field against `table`'s columns. Empty or unknown fields fail with
    /// `InvalidField` before any query is built.
    pub fn parse_for(raw: &str, table: &ResolvedTable) -> Result<Self, AppError> {
        let spec = Self::parse(raw);
        for clause in &spec.clauses {
            table.require_column(&clause.field)?;
        }
        Ok(spec)
    }

    pub fn clauses(&self) -> &[OrderClause] {
        &self.clauses
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Add every clause to `qb`, left to right. Stops at the first field the builder rejects.
    pub fn apply<Q: QueryBuilder>(&self, qb: &mut Q) -> Result<(), AppError> {
        for clause in &self.clauses {
            qb.order_by(&clause.field, clause.direction)?;
        }
        Ok(())
    }
}

impl FromIterator<OrderClause> for OrderSpec {
    fn from_iter<I: IntoIterator<Item = OrderClause>>(iter: I) -> Self {
        OrderSpec {
            clauses: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a OrderSpec {
    type Item = &'a OrderClause;
    type IntoIter = std::slice::Iter<'a, OrderClause>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.iter()
    }
}

pub fn parse_order(raw: &str) -> OrderSpec {
    OrderSpec::parse(raw)
}

/// Parse `raw` and apply it to `qb` in one step.
pub fn handle_order_by<'q, Q: QueryBuilder>(qb: &'q mut Q, raw: &str) -> Result<&'q mut Q, AppError> {
    OrderSpec::parse(raw).apply(qb)?;
    Ok(qb)
}
