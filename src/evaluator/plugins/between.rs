use super::super::{EvaluationContext, PredicateEvaluator};
use crate::core::{EntityDescriptor, Result, Row};
use crate::evaluator::plugins::comparison::ComparisonEvaluator;
use crate::expression::{CompareOp, Predicate};

pub struct BetweenEvaluator;

impl PredicateEvaluator for BetweenEvaluator {
    fn name(&self) -> &'static str {
        "BETWEEN"
    }

    fn can_evaluate(&self, predicate: &Predicate) -> bool {
        matches!(predicate, Predicate::Between { .. })
    }

    fn evaluate(
        &self,
        predicate: &Predicate,
        row: &Row,
        descriptor: &EntityDescriptor,
        context: &EvaluationContext<'_>,
    ) -> Result<bool> {
        let Predicate::Between { column, low, high } = predicate else {
            unreachable!();
        };

        let val = context.column_value(column, row, descriptor)?;

        // Reuse the comparison evaluator for both bounds
        let comparator = ComparisonEvaluator;

        let ge_low = comparator.compare(val, low, &CompareOp::GtEq)?;
        let le_high = comparator.compare(val, high, &CompareOp::LtEq)?;
        Ok(ge_low && le_high)
    }
}
