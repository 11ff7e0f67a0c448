//! Shared-memory layout: overlay a fixed header and five arrays onto a caller-supplied byte
//! region, at known, documented offsets.
//!
//! The region is position-independent: nothing stored in it is a machine pointer, only offsets
//! derived from the header's `m`/`n` fields. A [`MagView`] (writer) or [`MagReader`] (reader) is a
//! thin set of typed slices computed from those offsets at `layout_map`/`layout_map_mut` time and
//! borrowed for the lifetime of the caller's byte slice, so attaching a second, independent view
//! to the same bytes (from another process mapping the same physical pages, or sequentially in
//! the same process) is exactly how cross-process agreement on `lookup[]` works: a second,
//! independent read-only attach sees the same `lookup[]` a writer just published.

use std::mem::{align_of, size_of};
use std::slice;
use std::sync::atomic::{AtomicI32, Ordering};

use crate::error::Error;
use crate::prime::prime_below;

/// Header stored at byte offset 0 of every Maglev region.
///
/// `reserved` pads the header to 16 bytes (8-byte aligned), which keeps every downstream `i32`
/// array naturally 4-byte aligned as long as the caller's region itself starts at an 8-byte
/// boundary (true of any heap allocation and of every `mmap`-backed region).
#[repr(C)]
struct Header {
    m: u32,
    n: u32,
    reserved: u64,
}

const HEADER_LEN: usize = size_of::<Header>();

/// Resolved sizing for a Maglev region.
///
/// Bundles the prime-resolved table size, the slot capacity, and the total byte length, so
/// callers (and this crate's own `layout_init`/`layout_map`) never have to recompute
/// `prime_below` or re-derive offsets redundantly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MagLayout {
    /// Resolved prime lookup-table size (`largest prime <= m0`).
    pub m: u32,
    /// Slot capacity, as supplied by the caller.
    pub n: u32,
    /// Total region length in bytes.
    pub len: usize,
}

impl MagLayout {
    /// Resolves `(m0, n)` into the sizing a region actually needs, picking `m = prime_below(m0)`.
    fn compute(m0: u32, n: u32) -> Result<Self, Error> {
        if n == 0 {
            return Err(Error::InvalidArgument {
                reason: "n must be >= 1",
            });
        }
        let m = prime_below(m0)?;
        Ok(Self::for_resolved(m, n))
    }

    /// Builds the offset geometry for an already-resolved `(m, n)`, as read back out of an
    /// existing region's header.
    fn for_resolved(m: u32, n: u32) -> Self {
        let word = size_of::<i32>();
        let len = HEADER_LEN + (n as usize) * word + (m as usize) * word + 3 * (n as usize) * word;
        MagLayout { m, n, len }
    }

    fn active_offset(&self) -> usize {
        HEADER_LEN
    }

    fn lookup_offset(&self) -> usize {
        self.active_offset() + self.n as usize * size_of::<i32>()
    }

    fn next_offset(&self) -> usize {
        self.lookup_offset() + self.m as usize * size_of::<i32>()
    }

    fn perm_offset_offset(&self) -> usize {
        self.next_offset() + self.n as usize * size_of::<i32>()
    }

    fn perm_skip_offset(&self) -> usize {
        self.perm_offset_offset() + self.n as usize * size_of::<i32>()
    }
}

/// Returns the exact region size, in bytes, required for a table sized with the largest prime
/// `<= m0` and `n` target slots.
///
/// # Errors
///
/// [`Error::InvalidArgument`] if `m0 < 2` or `n == 0`.
pub fn layout_len(m0: u32, n: u32) -> Result<usize, Error> {
    MagLayout::compute(m0, n).map(|layout| layout.len)
}

fn check_alignment(ptr: *const u8) -> Result<(), Error> {
    if (ptr as usize) % align_of::<Header>() != 0 {
        return Err(Error::InvalidArgument {
            reason: "region is not 8-byte aligned",
        });
    }
    Ok(())
}

/// Writes the header and zeroes `active[]`/`lookup[]` (to `-1`, "empty") into `region`.
///
/// `region` must be at least `layout_len(m0, n)` bytes and 8-byte aligned (true of any heap
/// allocation and any `mmap`-backed buffer). Scratch arrays are left zeroed; `populate` always
/// overwrites them fully before reading, so their initial contents do not matter.
///
/// # Errors
///
/// - [`Error::InvalidArgument`] if `m0 < 2`, `n == 0`, or `region` is misaligned.
/// - [`Error::BufferTooSmall`] if `region` is shorter than `layout_len(m0, n)`.
pub fn layout_init(m0: u32, n: u32, region: &mut [u8]) -> Result<MagLayout, Error> {
    let layout = MagLayout::compute(m0, n)?;
    check_alignment(region.as_ptr())?;
    if region.len() < layout.len {
        return Err(Error::BufferTooSmall {
            needed: layout.len,
            got: region.len(),
        });
    }

    region[0..4].copy_from_slice(&layout.m.to_ne_bytes());
    region[4..8].copy_from_slice(&layout.n.to_ne_bytes());
    region[8..16].copy_from_slice(&0u64.to_ne_bytes());

    let neg_one = (-1i32).to_ne_bytes();
    for i in 0..layout.n as usize {
        let off = layout.active_offset() + i * size_of::<i32>();
        region[off..off + 4].copy_from_slice(&neg_one);
    }
    for i in 0..layout.m as usize {
        let off = layout.lookup_offset() + i * size_of::<i32>();
        region[off..off + 4].copy_from_slice(&neg_one);
    }
    // Scratch arrays (next, perm_offset, perm_skip): zero is as good a sentinel as any, since
    // `populate` always fully repopulates them before consulting them.
    let scratch_start = layout.next_offset();
    let scratch_len = 3 * layout.n as usize * size_of::<i32>();
    for b in &mut region[scratch_start..scratch_start + scratch_len] {
        *b = 0;
    }

    tracing::debug!(m0, resolved_m = layout.m, n, region_len = region.len(), "maglev region initialized");

    Ok(layout)
}

fn read_header(region: &[u8]) -> Result<(u32, u32), Error> {
    if region.len() < HEADER_LEN {
        return Err(Error::BufferTooSmall {
            needed: HEADER_LEN,
            got: region.len(),
        });
    }
    check_alignment(region.as_ptr())?;
    let m = u32::from_ne_bytes(region[0..4].try_into().unwrap());
    let n = u32::from_ne_bytes(region[4..8].try_into().unwrap());
    Ok((m, n))
}

/// Read-only view over an initialized region, as attached by a data-plane reader.
///
/// Exposes exactly what the dispatch rule needs: `m()` and `lookup(i)`. Readers never touch
/// `active[]` or the scratch arrays, since [`MagReader`] has no accessor for them at all, so
/// they stay writer-private by construction, not merely by convention.
pub struct MagReader<'a> {
    m: u32,
    n: u32,
    lookup: &'a [AtomicI32],
}

impl<'a> MagReader<'a> {
    /// The resolved lookup-table size.
    pub fn m(&self) -> u32 {
        self.m
    }

    /// The slot capacity (exposed for diagnostics; readers dispatch only on `m()`/`lookup()`).
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Reads `lookup[i]`: a slot index `>= 0`, or `-1` if no target was active at population
    /// time. A single aligned atomic load, never torn, never blocks.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.m()`, the same contract `[T]::index` has.
    pub fn lookup(&self, i: u32) -> i32 {
        self.lookup[i as usize].load(Ordering::Acquire)
    }
}

/// Mutable view over an initialized region, as attached by the control-plane writer.
///
/// Holds exclusive (`&mut`) access to `active[]` and the scratch arrays, and shared
/// (interior-mutable) access to `lookup[]` via [`AtomicI32`] so that concurrent lock-free readers
/// elsewhere in the same process (if any) can keep loading it while `populate` stores into it.
pub struct MagView<'a> {
    m: u32,
    n: u32,
    pub(crate) active: &'a mut [i32],
    pub(crate) lookup: &'a [AtomicI32],
    pub(crate) next: &'a mut [i32],
    pub(crate) perm_offset: &'a mut [i32],
    pub(crate) perm_skip: &'a mut [i32],
}

impl<'a> MagView<'a> {
    /// The resolved lookup-table size.
    pub fn m(&self) -> u32 {
        self.m
    }

    /// The slot capacity.
    pub fn n(&self) -> u32 {
        self.n
    }

    /// Read-only access to `active[]`.
    pub fn active(&self) -> &[i32] {
        self.active
    }

    /// Mutable access to `active[]`, for the control plane to occupy or vacate slots before the
    /// next `populate`.
    pub fn active_mut(&mut self) -> &mut [i32] {
        self.active
    }

    /// Convenience wrapper: sets `active[slot] = value`.
    ///
    /// # Panics
    ///
    /// Panics if `slot >= self.n()`.
    pub fn set_active(&mut self, slot: u32, value: i32) {
        self.active[slot as usize] = value;
    }

    /// Reads `lookup[i]` (same contract as [`MagReader::lookup`]).
    pub fn lookup(&self, i: u32) -> i32 {
        self.lookup[i as usize].load(Ordering::Acquire)
    }
}

/// Overlays a read-only typed view onto an already-initialized region.
///
/// Idempotent and cheap: this is how independent data-plane readers attach to a region a writer
/// already called [`layout_init`]/[`layout_map_mut`] on.
///
/// # Errors
///
/// [`Error::BufferTooSmall`] if `region` is shorter than its own header reports;
/// [`Error::InvalidArgument`] if `region` is misaligned.
pub fn layout_map(region: &[u8]) -> Result<MagReader<'_>, Error> {
    let (m, n) = read_header(region)?;
    let layout = MagLayout::for_resolved(m, n);
    if region.len() < layout.len {
        return Err(Error::BufferTooSmall {
            needed: layout.len,
            got: region.len(),
        });
    }

    // SAFETY: `lookup_offset()..+4*m` is within `region` (checked above), 4-byte aligned (checked
    // via `check_alignment` inside `read_header`, and every offset in `MagLayout` is a multiple of
    // 4), and `AtomicI32` has the same size, alignment and bit-validity as `i32`. The resulting
    // slice borrows `region` immutably for `'_`, matching the borrow this function takes.
    let lookup = unsafe {
        let ptr = region.as_ptr().add(layout.lookup_offset()) as *const AtomicI32;
        slice::from_raw_parts(ptr, m as usize)
    };

    Ok(MagReader { m, n, lookup })
}

/// Overlays a mutable typed view onto an already-initialized region, for the control-plane
/// writer.
///
/// # Errors
///
/// Same as [`layout_map`].
pub fn layout_map_mut(region: &mut [u8]) -> Result<MagView<'_>, Error> {
    let (m, n) = read_header(region)?;
    let layout = MagLayout::for_resolved(m, n);
    if region.len() < layout.len {
        return Err(Error::BufferTooSmall {
            needed: layout.len,
            got: region.len(),
        });
    }

    let base = region.as_mut_ptr();

    // SAFETY: each range below is disjoint from every other (they tile `region` in the order
    // documented on `layout_len`'s offsets table) and within bounds (checked above). All offsets
    // are multiples of 4, and the base pointer is 4-byte aligned (checked via `check_alignment`
    // inside `read_header`, against the stronger 8-byte `Header` alignment), so every cast below
    // is to a validly-aligned `i32`/`AtomicI32` pointer. Because the ranges are disjoint, forming
    // one `&mut` slice per range (plus one shared slice for `lookup`) does not alias, even though
    // they are all carved out of the single `region: &mut [u8]` borrow.
    let (active, lookup, next, perm_offset, perm_skip) = unsafe {
        let active = slice::from_raw_parts_mut(base.add(layout.active_offset()) as *mut i32, n as usize);
        let lookup = slice::from_raw_parts(base.add(layout.lookup_offset()) as *const AtomicI32, m as usize);
        let next = slice::from_raw_parts_mut(base.add(layout.next_offset()) as *mut i32, n as usize);
        let perm_offset =
            slice::from_raw_parts_mut(base.add(layout.perm_offset_offset()) as *mut i32, n as usize);
        let perm_skip = slice::from_raw_parts_mut(base.add(layout.perm_skip_offset()) as *mut i32, n as usize);
        (active, lookup, next, perm_offset, perm_skip)
    };

    Ok(MagView {
        m,
        n,
        active,
        lookup,
        next,
        perm_offset,
        perm_skip,
    })
}
