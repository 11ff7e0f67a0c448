//! Property tests for the invariants in the core specification: primality, permutation/table
//! equivalence, coverage, balance, and determinism.

use maglevdyn::perm::Permutation;
use maglevdyn::{layout_init, layout_len, layout_map_mut, populate, prime_below};
use proptest::prelude::*;

fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        return true;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut d = 3u32;
    while d.saturating_mul(d) <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property 1: `prime_below(n)` is prime, and no prime lies strictly between it and `n`.
    #[test]
    fn prime_below_is_prime_and_tight(n in 2u32..10_000) {
        let p = prime_below(n).unwrap();
        prop_assert!(is_prime(p));
        for q in (p + 1)..=n {
            prop_assert!(!is_prime(q));
        }
    }

    /// Property 2: the incremental generator matches the table-materialization formula exactly,
    /// for every step of a full period.
    #[test]
    fn permutation_matches_table_materialization(
        m0 in 2u32..10_000,
        raw_offset in any::<u32>(),
        raw_skip in any::<u32>(),
    ) {
        let m = prime_below(m0).unwrap();
        let offset = raw_offset % m;
        let skip = 1 + raw_skip % (m - 1);

        let mut perm = Permutation::new(offset, skip, m);
        let mut i: u32 = 0;
        while i < m {
            let expected = (offset + i * skip) % m;
            prop_assert_eq!(perm.current(), expected);
            perm.advance();
            i += 1;
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Properties 3 & 4: after `populate`, every entry names an active slot (coverage), and no
    /// two active slots' entry counts differ by more than one (balance).
    #[test]
    fn populate_covers_and_balances(active_mask in prop::collection::vec(any::<bool>(), 20)) {
        let len = layout_len(1009, 20).unwrap();
        let mut region = vec![0u8; len];
        layout_init(1009, 20, &mut region).unwrap();
        let mut view = layout_map_mut(&mut region).unwrap();
        for (slot, &on) in active_mask.iter().enumerate() {
            view.set_active(slot as u32, if on { 1 } else { -1 });
        }
        populate(&mut view);

        let active_count = active_mask.iter().filter(|&&b| b).count();
        if active_count == 0 {
            prop_assert!((0..view.m()).all(|i| view.lookup(i) == -1));
            return Ok(());
        }

        let mut counts = vec![0u32; 20];
        for i in 0..view.m() {
            let slot = view.lookup(i);
            prop_assert!(slot >= 0);
            prop_assert!(view.active()[slot as usize] >= 0);
            counts[slot as usize] += 1;
        }

        let active_counts: Vec<u32> = (0..20)
            .filter(|&j| view.active()[j] >= 0)
            .map(|j| counts[j])
            .collect();
        let max = *active_counts.iter().max().unwrap();
        let min = *active_counts.iter().min().unwrap();
        prop_assert!(max - min <= 1);
    }

    /// Property 5: `populate` on an equal `(M, N, active[])` yields an equal `lookup[]`,
    /// regardless of whatever garbage was left in `lookup`/the scratch arrays beforehand.
    #[test]
    fn populate_is_deterministic(active_mask in prop::collection::vec(any::<bool>(), 20)) {
        let len = layout_len(1009, 20).unwrap();

        let clean: Vec<i32> = {
            let mut region = vec![0u8; len];
            layout_init(1009, 20, &mut region).unwrap();
            let mut view = layout_map_mut(&mut region).unwrap();
            for (slot, &on) in active_mask.iter().enumerate() {
                view.set_active(slot as u32, if on { 1 } else { -1 });
            }
            populate(&mut view);
            (0..view.m()).map(|i| view.lookup(i)).collect()
        };

        let churned: Vec<i32> = {
            let mut region = vec![0u8; len];
            layout_init(1009, 20, &mut region).unwrap();
            let mut view = layout_map_mut(&mut region).unwrap();
            // Churn lookup/scratch contents with an unrelated population first.
            view.set_active(19, 9999);
            populate(&mut view);
            view.set_active(19, -1);

            for (slot, &on) in active_mask.iter().enumerate() {
                view.set_active(slot as u32, if on { 1 } else { -1 });
            }
            populate(&mut view);
            (0..view.m()).map(|i| view.lookup(i)).collect()
        };

        prop_assert_eq!(clean, churned);
    }
}
