//! Deferred transmissibility modifiers.
//!
//! Base transmissibilities depend on geometry owned by the simulator, so
//! `TRANX`/`TRANY`/`TRANZ` input is stored as a list of actions, each
//! pointing at a scratch field holding the per-cell argument.

use super::FieldPropsError;
use super::field_data::FieldData;
use super::keywords::KeywordInfo;
use super::operations::ScalarOperation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranAction {
    pub op: ScalarOperation,
    /// Scratch field holding the argument of this action.
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranCalculator {
    name: String,
    actions: Vec<TranAction>,
}

impl TranCalculator {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            actions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Name for the scratch field of the next action, e.g. `TRANX2`.
    pub fn next_name(&self) -> String {
        format!("{}{}", self.name, self.actions.len())
    }

    pub fn add_action(&mut self, op: ScalarOperation, field: impl Into<String>) {
        self.actions.push(TranAction {
            op,
            field: field.into(),
        });
    }

    pub fn actions(&self) -> &[TranAction] {
        &self.actions
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Initial scratch values: cells an operation does not reach must leave
    /// the transmissibility unchanged.
    pub fn make_kw_info(op: ScalarOperation) -> KeywordInfo<f64> {
        match op {
            ScalarOperation::Mul => KeywordInfo::init(1.0),
            ScalarOperation::Add => KeywordInfo::init(0.0),
            _ => KeywordInfo::plain(),
        }
    }
}

/// Applies every action of `calculator`, in input order, to `values`.
/// `lookup` resolves a scratch field by name.
pub fn apply_tran<'a>(
    calculator: &TranCalculator,
    lookup: impl Fn(&str) -> Option<&'a FieldData<f64>>,
    values: &mut [f64],
) -> Result<(), FieldPropsError> {
    for action in calculator.actions() {
        let field = lookup(&action.field)
            .ok_or_else(|| FieldPropsError::NotFound(action.field.clone()))?;
        if field.len() != values.len() {
            return Err(FieldPropsError::SizeMismatch {
                keyword: calculator.name().to_string(),
                expected: field.len(),
                actual: values.len(),
            });
        }
        for (index, value) in values.iter_mut().enumerate() {
            if let Some(argument) = field.value(index) {
                *value = action.op.combine(*value, argument);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{TranCalculator, apply_tran};
    use crate::fieldprops::FieldPropsError;
    use crate::fieldprops::field_data::{FieldData, ValueStatus};
    use crate::fieldprops::operations::ScalarOperation;
    use std::collections::HashMap;

    #[test]
    fn scratch_names_count_actions() {
        let mut calculator = TranCalculator::new("TRANX");
        assert!(calculator.is_empty());
        assert_eq!(calculator.next_name(), "TRANX0");
        calculator.add_action(ScalarOperation::Mul, "TRANX0");
        assert_eq!(calculator.next_name(), "TRANX1");
        assert_eq!(
            TranCalculator::make_kw_info(ScalarOperation::Mul).init_value,
            Some(1.0)
        );
        assert_eq!(
            TranCalculator::make_kw_info(ScalarOperation::Equal).init_value,
            None
        );
    }

    #[test]
    fn actions_apply_in_order_where_assigned() {
        let mut calculator = TranCalculator::new("TRANZ");
        calculator.add_action(ScalarOperation::Mul, "TRANZ0");
        calculator.add_action(ScalarOperation::Equal, "TRANZ1");

        let mut fields = HashMap::new();
        fields.insert("TRANZ0".to_string(), FieldData::with_default(3, 2.0));
        let mut assigned = FieldData::new(3);
        assigned.set(1, 0.5, ValueStatus::DeckValue);
        fields.insert("TRANZ1".to_string(), assigned);

        let mut tran = vec![1.0, 2.0, 3.0];
        apply_tran(&calculator, |name| fields.get(name), &mut tran).expect("sizes match");
        assert_eq!(tran, vec![2.0, 0.5, 6.0]);

        let mut short = vec![1.0];
        assert!(matches!(
            apply_tran(&calculator, |name| fields.get(name), &mut short),
            Err(FieldPropsError::SizeMismatch { expected: 3, actual: 1, .. })
        ));
    }
}
