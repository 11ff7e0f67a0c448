//! Per-target permutation generation.
//!
//! Maglev assigns every active target a permutation of `{0..M-1}`: `p(i) = (offset + i*skip) mod
//! M`. Because `M` is prime this is a bijection on `[0,M)` for any `skip` in `[1,M)`, regardless of
//! `offset`. The populator (`crate::populate`) walks each target's permutation one element at a
//! time until it lands on a free lookup slot; it never materializes the permutation as a table.

use rustc_hash::FxHasher;
use std::hash::Hasher;

/// Two independent salts used to derive `(offset, skip)` from a slot index.
///
/// Any two sufficiently different odd constants work here: we only need the two hash values to be
/// uncorrelated with each other and with the slot index, not cryptographically secure (the
/// fingerprint hash, not this one, is the piece explicitly kept out of scope for cryptographic
/// hardening). `rustc_hash::FxHasher` gives a fast, deterministic, non-cryptographic hash of the
/// slot index, which is all that's required here.
const OFFSET_SALT: u64 = 0x5bd1_e995_51a1_6f37;
const SKIP_SALT: u64 = 0x9e37_79b9_7f4a_7c15;

/// Derives the `(offset, skip)` pair a slot uses for its Maglev permutation.
///
/// `offset` is in `[0, m)`, `skip` is in `[1, m)`. This is deterministic and depends only on
/// `(slot, m)`, part of the cross-instance reproducibility contract documented in the crate
/// root: any two processes computing `offset_skip_for_slot(j, m)` for the same `j` and `m` get the
/// same pair, which is what lets independently-populated regions agree on `lookup[]`.
pub fn offset_skip_for_slot(slot: u32, m: u32) -> (u32, u32) {
    debug_assert!(m >= 2, "m must be a prime >= 2");

    let offset = (hash_with_salt(slot, OFFSET_SALT) % u64::from(m)) as u32;
    // skip must satisfy 1 <= skip < m; m - 1 >= 1 since m >= 2.
    let skip = 1 + (hash_with_salt(slot, SKIP_SALT) % u64::from(m - 1)) as u32;

    (offset, skip)
}

fn hash_with_salt(slot: u32, salt: u64) -> u64 {
    let mut hasher = FxHasher::default();
    hasher.write_u64(salt);
    hasher.write_u32(slot);
    hasher.finish()
}

/// Lazily walks a slot's Maglev permutation, one element per [`Permutation::advance`] call,
/// without ever materializing the full table.
///
/// `Permutation::new(offset, skip, m).current()` is `p(0) = offset`; each `advance()` moves to
/// `p(1)`, `p(2)`, ... `next^k(offset) = (offset + k*skip) mod m` holds for every `k`, which is the
/// property `tests/properties.rs` checks against the table-materialization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permutation {
    value: u32,
    // skip_bar = m - skip; advancing computes (value + (m - skip_bar)) mod m, which is
    // numerically (value + skip) mod m. Kept as its own field, rather than folded away, to mirror
    // the `skip_bar` formulation the wire-format documentation calls out by name.
    skip_bar: u32,
    m: u32,
}

impl Permutation {
    /// Creates a generator for the permutation `p(i) = (offset + i*skip) mod m`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `offset >= m`, `skip == 0`, or `skip >= m`; these are internal
    /// invariants established by `offset_skip_for_slot`, not caller input.
    pub fn new(offset: u32, skip: u32, m: u32) -> Self {
        debug_assert!(m >= 2);
        debug_assert!(offset < m);
        debug_assert!(skip >= 1 && skip < m);

        Permutation {
            value: offset,
            skip_bar: m - skip,
            m,
        }
    }

    /// The current element of the permutation, `p(i)` for however many times `advance` has been
    /// called since construction.
    pub fn current(&self) -> u32 {
        self.value
    }

    /// Advances to the next element of the permutation.
    pub fn advance(&mut self) {
        let skip = self.m - self.skip_bar;
        self.value = (self.value + skip) % self.m;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_every_index_exactly_once() {
        let m = 997;
        let (offset, skip) = offset_skip_for_slot(0, m);
        let mut perm = Permutation::new(offset, skip, m);

        let mut seen = vec![false; m as usize];
        for _ in 0..m {
            let v = perm.current();
            assert!(!seen[v as usize], "index {v} visited twice");
            seen[v as usize] = true;
            perm.advance();
        }
        assert!(seen.iter().all(|&b| b), "not every index was visited");
        // after M steps we should be back at the start
        assert_eq!(perm.current(), offset);
    }

    #[test]
    fn matches_table_materialization() {
        let m = 37;
        for offset in 0..m {
            for skip in 1..m {
                let table: Vec<u32> = (0..m).map(|i| (offset + i * skip) % m).collect();

                let mut perm = Permutation::new(offset, skip, m);
                for &expected in &table {
                    assert_eq!(perm.current(), expected);
                    perm.advance();
                }
            }
        }
    }

    #[test]
    fn offset_skip_is_deterministic_and_in_range() {
        let m = 997;
        for slot in 0..256u32 {
            let (offset, skip) = offset_skip_for_slot(slot, m);
            assert!(offset < m);
            assert!((1..m).contains(&skip));
            assert_eq!(offset_skip_for_slot(slot, m), (offset, skip));
        }
    }
}
