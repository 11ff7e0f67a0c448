//! The populator: rebuilds `lookup[0..M)` from `active[0..N)`.
//!
//! This is the streaming/round-robin Maglev algorithm. Active slots take turns, in ascending slot
//! order, claiming one lookup entry per turn; a slot's turn probes its own permutation starting
//! from wherever it left off last time it claimed an entry, so no target ever re-examines a
//! candidate it has already tried this `populate` call. That "wherever it left off" position is
//! exactly what `next[j]` holds (not a count, but the running permutation *value* itself), which is
//! what makes each probe an `O(1)` successor step (`crate::perm::Permutation::advance`'s
//! recurrence, inlined here against the scratch arrays directly rather than through a constructed
//! `Permutation`, since the running value has to live in the wire-format `next[]` array between
//! turns, not in a temporary on this function's stack).

use std::sync::atomic::Ordering;

use crate::layout::MagView;
use crate::perm::offset_skip_for_slot;

/// Recomputes `lookup[]` from `active[]`.
///
/// Pure computation: never allocates, never performs I/O, cannot fail on a well-formed view.
/// Deterministic: depends only on `(m, n, active[])`, regardless of the prior contents of
/// `lookup[]` or the scratch arrays (all of which are fully overwritten before being read).
pub fn populate(view: &mut MagView<'_>) {
    let m = view.m();
    let n = view.n();
    let _span = tracing::debug_span!("maglev_populate", m, n).entered();

    let active_count = view.active.iter().filter(|&&v| v >= 0).count();
    if active_count == 0 {
        for entry in view.lookup.iter() {
            entry.store(-1, Ordering::Release);
        }
        tracing::trace!(filled = 0, "no active targets; lookup table cleared");
        return;
    }

    // Derive each active target's permutation parameters and seed its running value at its own
    // offset. `perm_offset`/`perm_skip` stay fixed for the rest of this call; `next` is what
    // advances turn by turn.
    for j in 0..n as usize {
        if view.active[j] >= 0 {
            let (offset, skip) = offset_skip_for_slot(j as u32, m);
            view.perm_offset[j] = offset as i32;
            view.perm_skip[j] = skip as i32;
            view.next[j] = offset as i32;
        }
    }

    for entry in view.lookup.iter() {
        entry.store(-1, Ordering::Release);
    }

    let mut filled = 0u32;
    'rounds: loop {
        for j in 0..n as usize {
            if view.active[j] < 0 {
                continue;
            }

            let skip = view.perm_skip[j] as u32;
            let mut candidate = view.next[j] as u32;
            loop {
                // Relaxed: we are the only writer touching `lookup` for the duration of this
                // call, so we only need to observe our own prior stores, which program order
                // already guarantees. The `Release` store below is what matters to readers.
                if view.lookup[candidate as usize].load(Ordering::Relaxed) == -1 {
                    view.lookup[candidate as usize].store(j as i32, Ordering::Release);
                    view.next[j] = ((candidate + skip) % m) as i32;
                    filled += 1;
                    break;
                }
                candidate = (candidate + skip) % m;
            }

            if filled == m {
                break 'rounds;
            }
        }
    }

    tracing::trace!(filled, active = active_count, "lookup table populated");
}
