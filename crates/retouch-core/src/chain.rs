//! Ordered, replayable sequence of operations.
//!
//! A [`FilterChain`] pairs the operation list with a slot registry that
//! records where each continuous kind lives. The registry is what lets
//! a continuous adjustment be replaced in place: changing brightness
//! twice leaves one brightness step at its original position instead
//! of stacking two.
//!
//! Neutral values are kept. Setting brightness back to zero leaves an
//! identity step in its slot until the chain is reset.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::operation::{Operation, OperationKind};
use crate::types::EditError;

/// Operations in application order plus the continuous-kind slot registry.
///
/// Serialized as the bare list of operations. Deserialization rebuilds
/// the registry and rejects lists that repeat a continuous kind or carry
/// out-of-domain parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct FilterChain {
    operations: Vec<Operation>,
    slots: BTreeMap<OperationKind, usize>,
}

impl FilterChain {
    /// Create an empty chain.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            operations: Vec::new(),
            slots: BTreeMap::new(),
        }
    }

    /// Append `op` to the end of the chain and return its index.
    ///
    /// A continuous operation claims its kind's slot.
    ///
    /// # Errors
    ///
    /// Returns [`EditError::SlotOccupied`] if `op` is continuous and its
    /// kind is already present. The chain is left unchanged; use
    /// [`replace_or_append`](Self::replace_or_append) instead.
    pub fn append(&mut self, op: Operation) -> Result<usize, EditError> {
        let kind = op.kind();
        if kind.is_continuous() && self.slots.contains_key(&kind) {
            return Err(EditError::SlotOccupied(kind));
        }
        Ok(self.push(op))
    }

    /// Overwrite the slot of a continuous `op` in place, or append it.
    ///
    /// Discrete operations and first occurrences of a continuous kind
    /// are appended. Returns the index the operation now occupies.
    pub fn replace_or_append(&mut self, op: Operation) -> usize {
        if let Some(&index) = self.slots.get(&op.kind())
            && let Some(slot) = self.operations.get_mut(index)
        {
            *slot = op;
            return index;
        }
        self.push(op)
    }

    /// Remove every operation and slot.
    pub fn reset(&mut self) {
        self.operations.clear();
        self.slots.clear();
    }

    /// Number of operations in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the chain has no operations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Operations in application order.
    #[must_use]
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Iterate over operations in application order.
    pub fn iter(&self) -> std::slice::Iter<'_, Operation> {
        self.operations.iter()
    }

    /// Index of the slot held by a continuous `kind`, if present.
    #[must_use]
    pub fn slot(&self, kind: OperationKind) -> Option<usize> {
        self.slots.get(&kind).copied()
    }

    /// The operation occupying `kind`'s slot, if present.
    #[must_use]
    pub fn get(&self, kind: OperationKind) -> Option<&Operation> {
        self.slot(kind).and_then(|index| self.operations.get(index))
    }

    fn push(&mut self, op: Operation) -> usize {
        let index = self.operations.len();
        let kind = op.kind();
        self.operations.push(op);
        if kind.is_continuous() {
            self.slots.insert(kind, index);
        }
        index
    }
}

impl<'a> IntoIterator for &'a FilterChain {
    type Item = &'a Operation;
    type IntoIter = std::slice::Iter<'a, Operation>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl TryFrom<Vec<Operation>> for FilterChain {
    type Error = EditError;

    fn try_from(operations: Vec<Operation>) -> Result<Self, Self::Error> {
        let mut chain = Self::new();
        for op in operations {
            op.validate()?;
            chain.append(op)?;
        }
        Ok(chain)
    }
}

impl From<FilterChain> for Vec<Operation> {
    fn from(chain: FilterChain) -> Self {
        chain.operations
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn brightness(value: f32) -> Operation {
        Operation::Brightness { value }
    }

    /// Every registry entry points at an operation of its kind, and no
    /// continuous kind appears outside its slot.
    fn assert_registry_consistent(chain: &FilterChain) {
        for (index, op) in chain.iter().enumerate() {
            if op.kind().is_continuous() {
                assert_eq!(chain.slot(op.kind()), Some(index), "{op:?}");
            }
        }
        for kind in OperationKind::ALL {
            if let Some(index) = chain.slot(kind) {
                assert_eq!(chain.operations()[index].kind(), kind);
            }
        }
    }

    #[test]
    fn new_chain_is_empty() {
        let chain = FilterChain::new();
        assert!(chain.is_empty());
        assert_eq!(chain.len(), 0);
        assert_eq!(chain.slot(OperationKind::Brightness), None);
    }

    #[test]
    fn append_records_continuous_slot() {
        let mut chain = FilterChain::new();
        chain.append(Operation::Rotate90).unwrap();
        let index = chain.append(brightness(20.0)).unwrap();
        assert_eq!(index, 1);
        assert_eq!(chain.slot(OperationKind::Brightness), Some(1));
        assert_eq!(chain.slot(OperationKind::Rotate90), None);
        assert_registry_consistent(&chain);
    }

    #[test]
    fn append_rejects_occupied_continuous_slot() {
        let mut chain = FilterChain::new();
        chain.append(brightness(20.0)).unwrap();
        let before = chain.clone();

        let result = chain.append(brightness(-10.0));
        assert!(matches!(
            result,
            Err(EditError::SlotOccupied(OperationKind::Brightness))
        ));
        assert_eq!(chain, before);
    }

    #[test]
    fn append_repeats_discrete_operations() {
        let mut chain = FilterChain::new();
        for _ in 0..3 {
            chain.append(Operation::FlipVertical).unwrap();
        }
        assert_eq!(chain.len(), 3);
    }

    #[test]
    fn replace_keeps_position_and_length() {
        let mut chain = FilterChain::new();
        chain.replace_or_append(Operation::Grayscale);
        chain.replace_or_append(brightness(20.0));
        chain.replace_or_append(Operation::FlipHorizontal);

        let index = chain.replace_or_append(brightness(-10.0));

        assert_eq!(index, 1);
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.get(OperationKind::Brightness), Some(&brightness(-10.0)));
        assert_eq!(
            chain.operations(),
            &[
                Operation::Grayscale,
                brightness(-10.0),
                Operation::FlipHorizontal
            ]
        );
        assert_registry_consistent(&chain);
    }

    #[test]
    fn replace_appends_discrete_operations() {
        let mut chain = FilterChain::new();
        chain.replace_or_append(Operation::Rotate90);
        chain.replace_or_append(Operation::Rotate90);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn neutral_value_keeps_its_slot() {
        let mut chain = FilterChain::new();
        chain.replace_or_append(brightness(35.0));
        chain.replace_or_append(brightness(0.0));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.slot(OperationKind::Brightness), Some(0));
    }

    #[test]
    fn reset_clears_operations_and_slots() {
        let mut chain = FilterChain::new();
        chain.replace_or_append(brightness(10.0));
        chain.replace_or_append(Operation::Rotate90);
        chain.reset();
        assert!(chain.is_empty());
        assert_eq!(chain.slot(OperationKind::Brightness), None);

        // The slot is free again after a reset.
        chain.append(brightness(5.0)).unwrap();
        assert_eq!(chain.slot(OperationKind::Brightness), Some(0));
    }

    #[test]
    fn serializes_as_operation_list() {
        let mut chain = FilterChain::new();
        chain.replace_or_append(Operation::Hue { value: 30.0 });
        chain.replace_or_append(Operation::FlipVertical);
        let json = serde_json::to_value(&chain).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                { "kind": "hue", "value": 30.0 },
                { "kind": "flip_vertical" },
            ])
        );
    }

    #[test]
    fn deserialization_rebuilds_slots() {
        let chain: FilterChain = serde_json::from_str(
            r#"[{"kind":"rotate90"},{"kind":"sepia","value":40.0},{"kind":"rotate90"}]"#,
        )
        .unwrap();
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.slot(OperationKind::Sepia), Some(1));
        assert_registry_consistent(&chain);
    }

    #[test]
    fn deserialization_rejects_duplicate_continuous_kind() {
        let result: Result<FilterChain, _> = serde_json::from_str(
            r#"[{"kind":"blur","radius":1.0},{"kind":"blur","radius":2.0}]"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn deserialization_rejects_out_of_domain_parameters() {
        let result: Result<FilterChain, _> =
            serde_json::from_str(r#"[{"kind":"resize","width":0,"height":10}]"#);
        assert!(result.is_err());
    }
}
