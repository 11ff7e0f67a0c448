//! A dynamic Maglev consistent-hashing lookup table over a shared-memory region.
//!
//! This crate is the core of a stateless Layer-4 load balancer: given a pool of up to `N` backend
//! targets, some active and some absent, it deterministically maps every connection fingerprint to
//! exactly one active target such that each active target gets ≈ the same share of the key space,
//! and adding or removing one target remaps only ≈ `1/A` of the keys (`A` = active target count).
//!
//! # What this crate is
//!
//! Two things: (1) the Maglev permutation and lookup-table population algorithm
//! ([`populate`]), operating over (2) a fixed-capacity memory layout
//! ([`layout_len`]/[`layout_init`]/[`layout_map`]/[`layout_map_mut`]) that a control-plane writer
//! and many data-plane readers can attach to independently, in the same process, across threads,
//! or (given a caller-supplied region backed by real shared memory) across processes.
//!
//! # Example
//!
//! ```
//! use maglevdyn::{layout_init, layout_len, layout_map_mut, populate};
//!
//! let len = layout_len(1000, 100).unwrap();
//! let mut region = vec![0u8; len];
//! layout_init(1000, 100, &mut region).unwrap();
//!
//! let mut view = layout_map_mut(&mut region).unwrap();
//! assert_eq!(view.m(), 997); // largest prime <= 1000
//!
//! view.set_active(0, 42); // slot 0 now holds target id 42
//! populate(&mut view);
//!
//! // every one of the 997 lookup entries now names slot 0, the only active target
//! assert!((0..view.m()).all(|i| view.lookup(i) == 0));
//! ```
//!
//! # What this crate is *not*
//!
//! Packet capture, flow reassembly, CLI parsing, daemon lifecycle, and rate limiting are all
//! out of scope; they're external collaborators that consume this crate's `lookup()`/`active()`
//! surface. Weighted backends, runtime resizing of `M`/`N`, and cryptographic hashing of the
//! packet fingerprint are explicit non-goals: add a target by vacating and reoccupying a slot
//! within the fixed capacity, not by growing the region.
//!
//! # Soundness: single writer, many lock-free readers
//!
//! [`MagView`](layout::MagView) (the writer's handle) holds `&mut` access to `active[]` and the
//! scratch arrays, but only ever touches `lookup[]` through [`AtomicI32`](std::sync::atomic::AtomicI32)
//! stores. [`MagReader`](layout::MagReader) (a reader's handle) only ever touches `lookup[]`
//! through atomic loads, and never sees `active[]` or the scratch arrays at all: there is no
//! accessor for them. This means:
//!
//! - A reader's `lookup(i)` call is a single aligned atomic load. It is never torn: it observes
//!   either the value from before the writer's most recent [`populate`] call, or the value after
//!   it, never a mix of the two's bytes.
//! - The writer's `populate` call is a sequence of aligned atomic stores, one per slot it
//!   reassigns, each independently visible to readers as soon as it's issued (`Release`, paired
//!   with the reader's `Acquire` load).
//! - There is no global "populate is in progress" flag and no lock. A reader that calls `lookup(i)`
//!   mid-`populate` simply gets whichever of the two values the store for slot `i` has reached so
//!   far, a momentary mix of old and new assignments across different `i` is expected and
//!   harmless for a stateless dispatcher (the transport layer recovers from a handful of
//!   misrouted packets during the transition window).
//! - Nothing here prevents two processes from both calling `layout_map_mut` on the same region and
//!   racing as writers; that would corrupt `active[]`/the scratch arrays, which are *not* atomic.
//!   Single-writer discipline is enforced by the control plane, not by this crate; `&mut self` on
//!   `MagView`'s mutating methods only prevents *accidental* concurrent-writer misuse within one
//!   process.
//!
//! # Determinism
//!
//! `populate` depends only on `(M, N, active[])`. There is no wall-clock read, no random number
//! generation, and no allocation once [`layout_init`] has returned: every array `populate`
//! touches already exists in the region. Two independent regions initialized with the same
//! `(M0, N)` and driven through the same sequence of `active[]` mutations converge on bit-identical
//! `lookup[]` contents; this is what lets multiple balancer workers (or a restarted one) compute
//! the same routing table from the same inputs without coordinating over the network.

#![deny(missing_docs)]

pub mod error;
pub mod layout;
pub mod perm;
pub mod populate;
mod prime;

pub use error::Error;
pub use layout::{layout_init, layout_len, layout_map, layout_map_mut, MagLayout, MagReader, MagView};
pub use populate::populate;
pub use prime::prime_below;
