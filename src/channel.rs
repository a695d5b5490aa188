//! Ring descriptors and the byte arenas behind them.
//!
//! # Memory ordering
//! The producer writes frame bytes into the arena, then publishes `wr` with a
//! release fence before and a full fence after the store. A consumer that
//! acquires `wr` therefore sees every byte of every frame before it. The
//! consumer publishes `rd` with release after copying bytes out; the producer
//! acquires `rd` before computing free space, so it never overwrites unread data.
//!
//! # Notes
//! - Arena bytes are only touched through raw pointers, never through `&mut [u8]`,
//!   so producer writes and consumer reads on disjoint regions do not alias.
//! - The descriptor's `buffer` pointer is for external tooling. The crate itself
//!   always goes through the owning [`Arena`].

use core::cell::UnsafeCell;
use core::ffi::CStr;
use core::marker::PhantomData;
use core::ptr;

use crate::accounting;
use crate::atomic::{AtomicPtr, AtomicU32, Ordering, fence};
use crate::framing::RingSink;

/// One channel entry of the shared control block.
///
/// Field order and widths are part of the host contract:
/// `name`, `buffer`, `size`, `wr`, `rd`, `flags`.
#[repr(C)]
pub struct RingDescriptor {
    name: AtomicPtr<u8>,
    buffer: AtomicPtr<u8>,
    size: AtomicU32,
    wr: AtomicU32,
    rd: AtomicU32,
    flags: AtomicU32,
}

impl RingDescriptor {
    pub const fn new() -> Self {
        Self {
            name: AtomicPtr::new(ptr::null_mut()),
            buffer: AtomicPtr::new(ptr::null_mut()),
            size: AtomicU32::new(0),
            wr: AtomicU32::new(0),
            rd: AtomicU32::new(0),
            flags: AtomicU32::new(0),
        }
    }

    /// Point the descriptor at `buffer` and reset both offsets.
    pub(crate) fn mount(&self, name: &'static CStr, buffer: *mut u8, size: u32) {
        self.size.store(0, Ordering::Relaxed);
        self.wr.store(0, Ordering::Relaxed);
        self.rd.store(0, Ordering::Relaxed);
        self.flags.store(0, Ordering::Relaxed);
        self.name.store(name.as_ptr() as *mut u8, Ordering::Relaxed);
        self.buffer.store(buffer, Ordering::Relaxed);
        fence(Ordering::Release);
        // A non-zero size marks the channel live for both sides.
        self.size.store(size, Ordering::Release);
    }

    #[inline]
    pub fn capacity(&self) -> u32 {
        self.size.load(Ordering::Acquire)
    }

    #[inline]
    pub fn write_offset(&self) -> u32 {
        self.wr.load(Ordering::Acquire)
    }

    #[inline]
    pub fn read_offset(&self) -> u32 {
        self.rd.load(Ordering::Acquire)
    }

    #[inline]
    pub fn flags(&self) -> u32 {
        self.flags.load(Ordering::Relaxed)
    }

    pub fn name(&self) -> Option<&'static CStr> {
        let p = self.name.load(Ordering::Relaxed);
        if p.is_null() {
            return None;
        }
        // SAFETY: only `mount` stores here, always from a `&'static CStr`.
        Some(unsafe { CStr::from_ptr(p as *const core::ffi::c_char) })
    }

    pub fn buffer_ptr(&self) -> *const u8 {
        self.buffer.load(Ordering::Relaxed)
    }

    pub fn stats(&self) -> ChannelStats {
        let capacity = self.capacity();
        let wr = self.write_offset();
        let rd = self.read_offset();
        ChannelStats {
            capacity,
            wr,
            rd,
            used: accounting::used(wr, rd, capacity),
            free: accounting::free(wr, rd, capacity),
        }
    }

    /// Make everything written before this call visible, then expose `wr`.
    #[inline]
    pub(crate) fn publish_write(&self, wr: u32) {
        fence(Ordering::Release);
        self.wr.store(wr, Ordering::Release);
        fence(Ordering::SeqCst);
    }

    #[inline]
    pub(crate) fn publish_read(&self, rd: u32) {
        fence(Ordering::Release);
        self.rd.store(rd, Ordering::Release);
        fence(Ordering::SeqCst);
    }
}

impl Default for RingDescriptor {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of a channel's offsets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ChannelStats {
    pub capacity: u32,
    pub wr: u32,
    pub rd: u32,
    pub used: u32,
    pub free: u32,
}

/// Fixed-capacity byte storage owned for the lifetime of the transport.
pub struct Arena<const N: usize> {
    bytes: UnsafeCell<[u8; N]>,
}

// Access is partitioned by the ring offsets plus the per-channel claims held
// by the transport; the arena itself hands out only raw pointers.
unsafe impl<const N: usize> Sync for Arena<N> {}

impl<const N: usize> Arena<N> {
    pub const CAPACITY: u32 = {
        assert!(N <= u32::MAX as usize);
        N as u32
    };

    pub const fn new() -> Self {
        Self {
            bytes: UnsafeCell::new([0; N]),
        }
    }

    #[inline]
    pub(crate) fn as_mut_ptr(&self) -> *mut u8 {
        self.bytes.get().cast::<u8>()
    }

    /// Window over the whole arena.
    ///
    /// # Safety
    /// The caller must be the only party writing the slots it will touch
    /// through the window for the window's lifetime.
    #[inline]
    pub(crate) unsafe fn window(&self) -> ArenaWindow<'_> {
        ArenaWindow {
            base: self.as_mut_ptr(),
            cap: Self::CAPACITY,
            _arena: PhantomData,
        }
    }
}

impl<const N: usize> Default for Arena<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Raw, bounds-checked access into an [`Arena`].
pub(crate) struct ArenaWindow<'a> {
    base: *mut u8,
    cap: u32,
    _arena: PhantomData<&'a UnsafeCell<[u8]>>,
}

impl ArenaWindow<'_> {
    #[inline]
    pub(crate) fn get(&self, index: u32) -> u8 {
        if index >= self.cap {
            return 0;
        }
        // SAFETY: in bounds; the consumer only reads slots the producer published.
        unsafe { self.base.add(index as usize).read() }
    }

    pub(crate) fn fill(&mut self, byte: u8) {
        // SAFETY: `cap` is the arena length.
        unsafe { ptr::write_bytes(self.base, byte, self.cap as usize) }
    }
}

impl RingSink for ArenaWindow<'_> {
    #[inline]
    fn capacity(&self) -> u32 {
        self.cap
    }

    #[inline]
    fn put(&mut self, index: u32, byte: u8) {
        if index >= self.cap {
            return;
        }
        // SAFETY: in bounds; the producer only writes slots outside the published range.
        unsafe { self.base.add(index as usize).write(byte) }
    }
}
