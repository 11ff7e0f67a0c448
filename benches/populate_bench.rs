//! Benchmarks `populate` at the three `(M, N)` shapes exercised by the disruption-bound test
//! scenarios, to keep an eye on the worst-case `O(M log M)` tail as a table fills up.

use divan::Bencher;
use maglevdyn::{layout_init, layout_len, layout_map_mut, populate};

fn main() {
    divan::main();
}

fn fresh_half_full_region(m0: u32, n: u32) -> Vec<u8> {
    let len = layout_len(m0, n).unwrap();
    let mut region = vec![0u8; len];
    layout_init(m0, n, &mut region).unwrap();
    let mut view = layout_map_mut(&mut region).unwrap();
    for slot in 0..n / 2 {
        view.set_active(slot, slot as i32);
    }
    populate(&mut view);
    region
}

#[divan::bench]
fn populate_small(bencher: Bencher) {
    bencher
        .with_inputs(|| fresh_half_full_region(109, 20))
        .bench_local_values(|mut region| {
            let mut view = layout_map_mut(&mut region).unwrap();
            view.set_active(19, 1);
            populate(&mut view);
        });
}

#[divan::bench]
fn populate_medium(bencher: Bencher) {
    bencher
        .with_inputs(|| fresh_half_full_region(1009, 20))
        .bench_local_values(|mut region| {
            let mut view = layout_map_mut(&mut region).unwrap();
            view.set_active(19, 1);
            populate(&mut view);
        });
}

#[divan::bench]
fn populate_large(bencher: Bencher) {
    bencher
        .with_inputs(|| fresh_half_full_region(10009, 100))
        .bench_local_values(|mut region| {
            let mut view = layout_map_mut(&mut region).unwrap();
            view.set_active(99, 1);
            populate(&mut view);
        });
}
