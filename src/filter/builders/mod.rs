pub mod equality;
pub mod ordered;
pub mod pattern;
pub mod range;

use super::{FilterConfig, Operator};
use crate::core::{Column, DbError, EntityDescriptor, Result};
use crate::expression::{CompareOp, Predicate};
use std::collections::HashMap;
use std::sync::Arc;

/// What a builder may consult besides the attribute and raw value.
pub struct BuildContext<'a> {
    pub descriptor: &'a EntityDescriptor,
    pub config: &'a FilterConfig,
}

/// Turns `attribute <operator> value` into a store predicate.
pub trait PredicateBuilder: Send + Sync {
    /// Builder name (for logs)
    fn name(&self) -> &'static str;

    /// Operators this builder handles
    fn operators(&self) -> &'static [Operator];

    fn build(
        &self,
        operator: Operator,
        column: &Column,
        raw: &str,
        context: &BuildContext<'_>,
    ) -> Result<Predicate>;
}

/// Operator → builder dispatch table
pub struct BuilderRegistry {
    builders: HashMap<Operator, Arc<dyn PredicateBuilder>>,
}

impl BuilderRegistry {
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Register `builder` for each of its operators, replacing earlier entries.
    pub fn register(&mut self, builder: Arc<dyn PredicateBuilder>) {
        for operator in builder.operators() {
            tracing::trace!(builder = builder.name(), %operator, "registered predicate builder");
            self.builders.insert(*operator, Arc::clone(&builder));
        }
    }

    pub fn with_default_builders() -> Self {
        let mut registry = Self::new();

        registry.register(Arc::new(equality::EqualityBuilder));
        registry.register(Arc::new(pattern::PatternBuilder));
        registry.register(Arc::new(ordered::OrderedBuilder));
        registry.register(Arc::new(range::RangeBuilder));

        registry
    }

    pub fn get(&self, operator: Operator) -> Option<&Arc<dyn PredicateBuilder>> {
        self.builders.get(&operator)
    }

    pub fn supports(&self, operator: Operator) -> bool {
        self.builders.contains_key(&operator)
    }

    pub fn build(
        &self,
        operator: Operator,
        column: &Column,
        raw: &str,
        context: &BuildContext<'_>,
    ) -> Result<Predicate> {
        let builder = self.get(operator).ok_or_else(|| {
            DbError::UnsupportedOperator(format!("Operator '{}' is not supported", operator))
        })?;
        builder.build(operator, column, raw, context)
    }
}

impl Default for BuilderRegistry {
    fn default() -> Self {
        Self::with_default_builders()
    }
}

/// Operator reached a builder that does not handle it.
pub(crate) fn not_handled(operator: Operator, builder: &dyn PredicateBuilder) -> DbError {
    DbError::UnsupportedOperator(format!(
        "Operator '{}' is not handled by the {} builder",
        operator,
        builder.name()
    ))
}

/// Store comparison for `operator`, or `UnsupportedOperator` when it has none.
pub(crate) fn comparison_for(operator: Operator, builder: &dyn PredicateBuilder) -> Result<CompareOp> {
    operator
        .compare_op()
        .ok_or_else(|| not_handled(operator, builder))
}

/// `UnsupportedOperator` for an operator/attribute-type pair.
pub(crate) fn unsupported_for(operator: Operator, column: &Column, expected: &str) -> DbError {
    DbError::UnsupportedOperator(format!(
        "Operator '{}' requires {} attribute; '{}' is {}",
        operator, expected, column.name, column.data_type
    ))
}
