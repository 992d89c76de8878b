use std::sync::Arc;

use log::warn;

use crate::matrix::row::{Row, RowId, RowList};
use crate::model::{Stop, TimingStatus};

/// one step of an edit script aligning an existing sequence with an incoming
/// one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// element present in both sequences, with their respective indices.
    Keep(usize, usize),
    /// element only in the existing sequence.
    Delete(usize),
    /// element only in the incoming sequence.
    Insert(usize),
}

/// longest-common-subsequence edit script between two sequences. at a
/// divergence, deletions are emitted before insertions.
pub fn edit_script<T: PartialEq>(existing: &[T], incoming: &[T]) -> Vec<EditOp> {
    // lengths[i][j] holds the LCS length of existing[i..] and incoming[j..]
    let existing_len = existing.len();
    let incoming_len = incoming.len();
    let mut lengths = vec![vec![0usize; incoming_len + 1]; existing_len + 1];
    for i in (0..existing_len).rev() {
        for j in (0..incoming_len).rev() {
            lengths[i][j] = if existing[i] == incoming[j] {
                lengths[i + 1][j + 1] + 1
            } else {
                lengths[i + 1][j].max(lengths[i][j + 1])
            };
        }
    }
    let mut script = Vec::with_capacity(existing_len + incoming_len);
    let (mut i, mut j) = (0, 0);
    while i < existing_len && j < incoming_len {
        if existing[i] == incoming[j] {
            script.push(EditOp::Keep(i, j));
            i += 1;
            j += 1;
        } else if lengths[i + 1][j] >= lengths[i][j + 1] {
            script.push(EditOp::Delete(i));
            i += 1;
        } else {
            script.push(EditOp::Insert(j));
            j += 1;
        }
    }
    while i < existing_len {
        script.push(EditOp::Delete(i));
        i += 1;
    }
    while j < incoming_len {
        script.push(EditOp::Insert(j));
        j += 1;
    }
    script
}

/// result of merging one pattern's stop visits into a grouping's rows.
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// the row bound to each visit, in visit order.
    pub bindings: Vec<RowId>,
    /// count of visits whose stop already had a row elsewhere in the list,
    /// meaning two patterns disagree about stop order and a duplicate row
    /// was created.
    pub conflicts: u32,
}

/// aligns a pattern's visit sequence against the accumulated rows. matched
/// visits bind to their existing rows; unmatched ones get new rows inserted
/// after the previously bound position, so the pattern's own stop order is
/// preserved within the merged list.
pub fn merge_visits(rows: &mut RowList, visits: &[(Arc<Stop>, TimingStatus)]) -> MergeOutcome {
    let existing: Vec<String> = rows
        .iter()
        .map(|row| row.stop.atco_code.clone())
        .collect();
    let incoming: Vec<String> = visits
        .iter()
        .map(|(stop, _)| stop.atco_code.clone())
        .collect();
    let script = edit_script(&existing, &incoming);
    let existing_order: Vec<RowId> = rows.order().to_vec();
    let mut bindings: Vec<Option<RowId>> = vec![None; visits.len()];
    let mut conflicts = 0u32;
    let mut previous: Option<usize> = None;
    for op in script {
        match op {
            EditOp::Keep(at, visit) => {
                let id = existing_order[at];
                bindings[visit] = Some(id);
                previous = rows.position(id);
            }
            EditOp::Insert(visit) => {
                let (stop, timing_status) = &visits[visit];
                if existing.iter().any(|code| code == &stop.atco_code) {
                    warn!(
                        "stop {} appears in conflicting positions across journey patterns",
                        stop.atco_code
                    );
                    conflicts += 1;
                }
                let position = previous.map_or(0, |p| p + 1);
                let id = rows.insert_at(position, Row::new(Arc::clone(stop), *timing_status));
                bindings[visit] = Some(id);
                previous = Some(position);
            }
            EditOp::Delete(_) => {}
        }
    }
    MergeOutcome {
        bindings: bindings.into_iter().flatten().collect(),
        conflicts,
    }
}
