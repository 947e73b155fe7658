use super::super::{EvaluationContext, PredicateEvaluator};
use crate::core::{EntityDescriptor, Result, Row};
use crate::expression::Predicate;

pub struct IsNullEvaluator;

impl PredicateEvaluator for IsNullEvaluator {
    fn name(&self) -> &'static str {
        "IS_NULL"
    }

    fn can_evaluate(&self, predicate: &Predicate) -> bool {
        matches!(predicate, Predicate::IsNull { .. })
    }

    fn evaluate(
        &self,
        predicate: &Predicate,
        row: &Row,
        descriptor: &EntityDescriptor,
        context: &EvaluationContext<'_>,
    ) -> Result<bool> {
        let Predicate::IsNull { column, negated } = predicate else {
            unreachable!();
        };

        let is_null = context.column_value(column, row, descriptor)?.is_null();
        Ok(if *negated { !is_null } else { is_null })
    }
}
