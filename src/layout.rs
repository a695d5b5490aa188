//! Discovery layouts: the control block external tooling finds by scanning
//! target memory for a signature.
//!
//! Two interchangeable providers share the same [`RingDescriptor`] entries:
//! - [`RttLayout`]: SEGGER RTT compatible, so stock debug probes and viewers
//!   can attach (`"SEGGER RTT"` id, up/down counts, then the descriptors).
//! - [`NativeLayout`]: the self-defined block (`"RAT_V1"` magic, then the
//!   descriptors).
//!
//! Both are `#[repr(C)]`; reordering or resizing any field breaks host tooling.

use core::ffi::CStr;

use crate::atomic::{AtomicI32, AtomicU8, Ordering, fence};
use crate::channel::RingDescriptor;
use crate::config::{CHANNEL_COUNT, Context};

pub const SIGNATURE_LEN: usize = 16;

/// Fixed 16-byte, zero-padded signature field.
#[repr(transparent)]
pub struct Signature([AtomicU8; SIGNATURE_LEN]);

impl Signature {
    pub const fn new() -> Self {
        Self([const { AtomicU8::new(0) }; SIGNATURE_LEN])
    }

    fn clear(&self) {
        for b in &self.0 {
            b.store(0, Ordering::Relaxed);
        }
    }

    fn write(&self, sig: &[u8]) {
        for (slot, &b) in self.0.iter().zip(sig) {
            slot.store(b, Ordering::Relaxed);
        }
    }

    /// Current bytes, padding included.
    pub fn bytes(&self) -> [u8; SIGNATURE_LEN] {
        core::array::from_fn(|i| self.0[i].load(Ordering::Relaxed))
    }
}

impl Default for Signature {
    fn default() -> Self {
        Self::new()
    }
}

/// A control block strategy: where the channel descriptors live and how the
/// block announces itself.
pub trait ChannelProvider: Sync + Sized {
    /// Signature bytes written into the discovery field (at most 16).
    const SIGNATURE: &'static [u8];
    const UPLINK_NAMES: [&'static CStr; CHANNEL_COUNT];
    const DOWNLINK_NAMES: [&'static CStr; CHANNEL_COUNT];

    /// Zeroed block, used to build a transport in `const` context.
    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Self;

    fn uplink(&self, ctx: Context) -> &RingDescriptor;

    fn downlink(&self, ctx: Context) -> &RingDescriptor;

    /// Hide the block from scanners while it is being rebuilt.
    fn retract(&self);

    /// Write the header and signature once every descriptor is mounted.
    fn announce(&self);

    fn signature(&self) -> [u8; SIGNATURE_LEN];
}

/// SEGGER RTT compatible control block.
#[repr(C)]
pub struct RttLayout {
    id: Signature,
    max_up: AtomicI32,
    max_down: AtomicI32,
    up: [RingDescriptor; CHANNEL_COUNT],
    down: [RingDescriptor; CHANNEL_COUNT],
}

impl RttLayout {
    pub fn max_up(&self) -> i32 {
        self.max_up.load(Ordering::Relaxed)
    }

    pub fn max_down(&self) -> i32 {
        self.max_down.load(Ordering::Relaxed)
    }
}

impl ChannelProvider for RttLayout {
    const SIGNATURE: &'static [u8] = b"SEGGER RTT";
    const UPLINK_NAMES: [&'static CStr; CHANNEL_COUNT] = [c"RatMain", c"RatISR"];
    const DOWNLINK_NAMES: [&'static CStr; CHANNEL_COUNT] = [c"RatDownMain", c"RatDownISR"];

    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Self = Self {
        id: Signature::new(),
        max_up: AtomicI32::new(0),
        max_down: AtomicI32::new(0),
        up: [const { RingDescriptor::new() }; CHANNEL_COUNT],
        down: [const { RingDescriptor::new() }; CHANNEL_COUNT],
    };

    #[inline]
    fn uplink(&self, ctx: Context) -> &RingDescriptor {
        &self.up[ctx.index()]
    }

    #[inline]
    fn downlink(&self, ctx: Context) -> &RingDescriptor {
        &self.down[ctx.index()]
    }

    fn retract(&self) {
        self.id.clear();
        fence(Ordering::SeqCst);
    }

    fn announce(&self) {
        self.max_up.store(CHANNEL_COUNT as i32, Ordering::Relaxed);
        self.max_down.store(CHANNEL_COUNT as i32, Ordering::Relaxed);
        fence(Ordering::Release);
        // The id goes last: a scanner that matches it finds a complete block.
        self.id.write(Self::SIGNATURE);
        fence(Ordering::SeqCst);
    }

    fn signature(&self) -> [u8; SIGNATURE_LEN] {
        self.id.bytes()
    }
}

/// Self-defined control block.
#[repr(C)]
pub struct NativeLayout {
    magic: Signature,
    up: [RingDescriptor; CHANNEL_COUNT],
    down: [RingDescriptor; CHANNEL_COUNT],
}

impl ChannelProvider for NativeLayout {
    const SIGNATURE: &'static [u8] = b"RAT_V1";
    const UPLINK_NAMES: [&'static CStr; CHANNEL_COUNT] = [c"Main", c"ISR"];
    const DOWNLINK_NAMES: [&'static CStr; CHANNEL_COUNT] = [c"DownMain", c"DownISR"];

    #[allow(clippy::declare_interior_mutable_const)]
    const EMPTY: Self = Self {
        magic: Signature::new(),
        up: [const { RingDescriptor::new() }; CHANNEL_COUNT],
        down: [const { RingDescriptor::new() }; CHANNEL_COUNT],
    };

    #[inline]
    fn uplink(&self, ctx: Context) -> &RingDescriptor {
        &self.up[ctx.index()]
    }

    #[inline]
    fn downlink(&self, ctx: Context) -> &RingDescriptor {
        &self.down[ctx.index()]
    }

    fn retract(&self) {
        self.magic.clear();
        fence(Ordering::SeqCst);
    }

    fn announce(&self) {
        fence(Ordering::Release);
        self.magic.write(Self::SIGNATURE);
        fence(Ordering::SeqCst);
    }

    fn signature(&self) -> [u8; SIGNATURE_LEN] {
        self.magic.bytes()
    }
}
