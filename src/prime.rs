//! Largest-prime-not-exceeding utility.
//!
//! Used once, at init, to pin down the lookup table size `M` from a caller-supplied bound `M0`.
//! There are no stability requirements beyond correctness; trial division to `sqrt(n)` is plenty
//! fast for the sizes this crate deals with (`M0` in the thousands, called once per region).

use crate::error::Error;

/// Returns the largest prime `p <= n`.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `n < 2` (there is no prime `<= 1`).
pub fn prime_below(n: u32) -> Result<u32, Error> {
    if n < 2 {
        return Err(Error::InvalidArgument {
            reason: "prime_below requires n >= 2",
        });
    }

    let mut candidate = n;
    loop {
        if is_prime(candidate) {
            return Ok(candidate);
        }
        candidate -= 1;
    }
}

fn is_prime(n: u32) -> bool {
    if n < 2 {
        return false;
    }
    if n < 4 {
        // 2 and 3
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
