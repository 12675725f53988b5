//! Ordering maintenance for draft graphs.
//!
//! The thin CRUD layer delegates the two mutations that touch graph-level
//! ordering invariants here: form required-slot positions must stay a
//! contiguous 1-based sequence, and alternation-group steps must be
//! deleted as one unit.

use crate::error::{KernelError, KernelResult};
use crate::store::StoreTx;
use crate::types::{FormRequiredSlotRow, RowId, VersionId};

/// Add a required slot to a form.
///
/// With `position: None` the slot is appended. An explicit position shifts
/// every row at or after it one place down, keeping the sequence
/// contiguous.
pub async fn add_required_slot(
    tx: &mut dyn StoreTx,
    version_id: &VersionId,
    form_name: &str,
    slot_name: &str,
    position: Option<u32>,
    required: bool,
) -> KernelResult<FormRequiredSlotRow> {
    let form = tx
        .form_by_name(version_id, form_name)
        .await?
        .ok_or_else(|| KernelError::not_found(format!("form '{form_name}'")))?;
    let slot = tx
        .slot_by_name(version_id, slot_name)
        .await?
        .ok_or_else(|| KernelError::not_found(format!("slot '{slot_name}' in this version")))?;

    let existing = tx.required_slots_for_form(&form.id).await?;
    if existing.iter().any(|r| r.slot_id == slot.id) {
        return Err(KernelError::conflict(format!(
            "slot '{slot_name}' already added to form '{form_name}'"
        )));
    }

    let next = existing.len() as u32 + 1;
    let order = position.unwrap_or(next).clamp(1, next);

    for mut row in existing {
        if row.order >= order {
            row.order += 1;
            tx.update_required_slot(&row).await?;
        }
    }

    let row = FormRequiredSlotRow {
        id: RowId::fresh(),
        form_id: form.id,
        slot_id: slot.id,
        order,
        required,
    };
    tx.insert_required_slot(&row).await?;
    Ok(row)
}

/// Remove a required slot from a form, deleting its mappings and re-packing
/// the remaining positions to a contiguous ascending sequence starting at 1.
pub async fn remove_required_slot(
    tx: &mut dyn StoreTx,
    version_id: &VersionId,
    form_name: &str,
    slot_name: &str,
) -> KernelResult<()> {
    let form = tx
        .form_by_name(version_id, form_name)
        .await?
        .ok_or_else(|| KernelError::not_found(format!("form '{form_name}'")))?;
    let slot = tx
        .slot_by_name(version_id, slot_name)
        .await?
        .ok_or_else(|| KernelError::not_found(format!("slot '{slot_name}' in this version")))?;

    let existing = tx.required_slots_for_form(&form.id).await?;
    let target = existing
        .iter()
        .find(|r| r.slot_id == slot.id)
        .cloned()
        .ok_or_else(|| {
            KernelError::not_found(format!(
                "slot '{slot_name}' is not required by form '{form_name}'"
            ))
        })?;

    tx.delete_mappings_for_required_slot(&target.id).await?;
    tx.delete_required_slot(&target.id).await?;

    let mut order = 1;
    for mut row in existing {
        if row.id == target.id {
            continue;
        }
        if row.order != order {
            row.order = order;
            tx.update_required_slot(&row).await?;
        }
        order += 1;
    }
    Ok(())
}

/// Delete a story step.
///
/// A step belonging to an alternation group takes the whole group with it:
/// the group is one logical either/or unit and must not survive partially.
/// Returns the number of steps removed.
pub async fn delete_story_step(tx: &mut dyn StoreTx, step_id: &RowId) -> KernelResult<usize> {
    let step = tx
        .story_step(step_id)
        .await?
        .ok_or_else(|| KernelError::not_found(format!("story step {step_id}")))?;

    let members = match step.alternation_group {
        Some(group) => tx.alternation_group_steps(&group).await?,
        None => vec![step],
    };

    let removed = members.len();
    for member in members {
        tx.delete_story_step_children(&member.id).await?;
        tx.delete_story_step(&member.id).await?;
    }
    Ok(removed)
}
