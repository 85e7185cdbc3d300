// SPDX-License-Identifier: MIT OR Apache-2.0
//! Slot migration when a node is reconfigured.

use crate::node::NodeKind;
use crate::slot::Slot;

/// Build the slot list for `new_kind`, carrying over wiring from `old_slots`.
///
/// A slot's name is its semantic position: a new slot whose name matches an
/// edited old slot keeps that slot's expression and pinned flag. Every other
/// slot starts at the new variant's default, so an untouched default never
/// masks the new one. Old slots with no counterpart are dropped.
pub fn reshape(old_slots: &[Slot], new_kind: &NodeKind) -> Vec<Slot> {
    new_kind
        .slot_specs()
        .iter()
        .map(|spec| {
            let mut slot = spec.instantiate();
            if let Some(old) = old_slots
                .iter()
                .find(|old| old.name == spec.name && old.is_edited())
            {
                slot.expression = old.expression;
                slot.pinned = old.pinned;
            }
            slot
        })
        .collect()
}
