use super::super::{EvaluationContext, PredicateEvaluator};
use crate::core::{EntityDescriptor, Result, Row};
use crate::expression::Predicate;

pub struct LogicalEvaluator;

impl PredicateEvaluator for LogicalEvaluator {
    fn name(&self) -> &'static str {
        "LOGICAL"
    }

    fn can_evaluate(&self, predicate: &Predicate) -> bool {
        matches!(predicate, Predicate::And(_))
    }

    fn evaluate(
        &self,
        predicate: &Predicate,
        row: &Row,
        descriptor: &EntityDescriptor,
        context: &EvaluationContext<'_>,
    ) -> Result<bool> {
        let Predicate::And(parts) = predicate else {
            unreachable!();
        };

        // Short-circuit on the first false conjunct
        for part in parts {
            if !context.evaluate(part, row, descriptor)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
