use super::{BuildContext, PredicateBuilder, comparison_for, not_handled};
use crate::core::{Column, DbError, Result};
use crate::expression::{CompareOp, Predicate};
use crate::filter::Operator;

/// `=` and `!`: the raw value is read as the attribute's own type.
pub struct EqualityBuilder;

impl PredicateBuilder for EqualityBuilder {
    fn name(&self) -> &'static str {
        "equality"
    }

    fn operators(&self) -> &'static [Operator] {
        &[Operator::Eq, Operator::NotEq]
    }

    fn build(
        &self,
        operator: Operator,
        column: &Column,
        raw: &str,
        context: &BuildContext<'_>,
    ) -> Result<Predicate> {
        let op = comparison_for(operator, self)?;
        if !matches!(op, CompareOp::Eq | CompareOp::NotEq) {
            return Err(not_handled(operator, self));
        }

        let value = column.data_type.parse_literal(raw).ok_or_else(|| {
            DbError::InvalidValueFormat(format!(
                "'{}' is not a valid {} for attribute '{}' of '{}'",
                raw,
                column.data_type,
                column.name,
                context.descriptor.name()
            ))
        })?;

        Ok(Predicate::compare(column.name.clone(), op, value))
    }
}
