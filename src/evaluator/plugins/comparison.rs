use super::super::{EvaluationContext, PredicateEvaluator};
use crate::core::{EntityDescriptor, Result, Row, Value};
use crate::expression::{CompareOp, Predicate};
use std::cmp::Ordering;

pub struct ComparisonEvaluator;

impl PredicateEvaluator for ComparisonEvaluator {
    fn name(&self) -> &'static str {
        "COMPARISON"
    }

    fn can_evaluate(&self, predicate: &Predicate) -> bool {
        matches!(predicate, Predicate::Compare { .. })
    }

    fn evaluate(
        &self,
        predicate: &Predicate,
        row: &Row,
        descriptor: &EntityDescriptor,
        context: &EvaluationContext<'_>,
    ) -> Result<bool> {
        let Predicate::Compare { column, op, value } = predicate else {
            unreachable!();
        };

        let left = context.column_value(column, row, descriptor)?;
        self.compare(left, value, op)
    }
}

impl ComparisonEvaluator {
    /// SQL comparison: anything compared with NULL is false.
    pub fn compare(&self, left: &Value, right: &Value, op: &CompareOp) -> Result<bool> {
        if left.is_null() || right.is_null() {
            return Ok(false);
        }

        if matches!(op, CompareOp::Eq | CompareOp::NotEq) {
            let equal = left == right;
            return Ok(if *op == CompareOp::Eq { equal } else { !equal });
        }

        let ordering = left.compare(right)?;
        Ok(match op {
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::LtEq => ordering != Ordering::Greater,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::GtEq => ordering != Ordering::Less,
            CompareOp::Eq | CompareOp::NotEq => unreachable!(),
        })
    }
}
