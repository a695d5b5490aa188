//! The transport: a control block plus the arenas its descriptors point at.
//!
//! # Overview
//! - `emit` frames `[packet_id] + payload` straight into the uplink picked by
//!   the caller's [`Context`], then publishes the new write offset.
//! - Nothing of a packet is visible before that publication and all of it is
//!   visible after. A rejected packet leaves the channel untouched.
//! - Rejection is backpressure, not failure: `emit` returns `0` and the caller
//!   decides whether to drop or retry.
//!
//! # Concurrency
//! Each context is the only producer of its own uplink, so normal code and an
//! interrupt handler never contend. Within one uplink a claim flag is taken with
//! a single swap for the duration of an emit; a re-entrant or concurrent emit on
//! the same uplink is rejected as [`EmitError::Busy`] rather than racing. No
//! call ever waits or retries.
//!
//! # Placement
//! Host tooling locates the control block by address, so `init` must run once
//! the value sits at its final location, typically a `static`:
//!
//! ```
//! use rat_link::{Config, Context, Rat, RttLayout};
//!
//! static RAT: Rat<RttLayout, 256, 128, 16> = Rat::new(Config::new());
//!
//! RAT.init();
//! let written = RAT.emit(0x10, &[1, 2, 3], Context::Normal);
//! assert!(written > 0);
//! ```

use core::fmt;

use crate::accounting;
use crate::atomic::{AtomicBool, Claim};
use crate::channel::{Arena, ArenaWindow, ChannelStats, RingDescriptor};
use crate::config::{CHANNEL_COUNT, Config, Context};
use crate::error::EmitError;
use crate::framing::{FrameEncoder, max_encoded_len};
use crate::layout::{ChannelProvider, RttLayout, SIGNATURE_LEN};
use crate::text::TextBuf;

/// Telemetry transport with two uplinks and two downlinks.
///
/// `UP_MAIN` and `UP_ISR` size the normal and interrupt uplinks, `DOWN` sizes
/// each downlink. A capacity of `0` leaves that channel disabled.
pub struct Rat<
    L: ChannelProvider = RttLayout,
    const UP_MAIN: usize = 1024,
    const UP_ISR: usize = 1024,
    const DOWN: usize = 16,
> {
    block: L,
    up_main: Arena<UP_MAIN>,
    up_isr: Arena<UP_ISR>,
    down_main: Arena<DOWN>,
    down_isr: Arena<DOWN>,
    producing: [AtomicBool; CHANNEL_COUNT],
    draining: [AtomicBool; CHANNEL_COUNT],
    initializing: AtomicBool,
    config: Config,
}

impl<L: ChannelProvider, const UP_MAIN: usize, const UP_ISR: usize, const DOWN: usize>
    Rat<L, UP_MAIN, UP_ISR, DOWN>
{
    /// Build an unmounted transport. Every channel reports zero capacity, and
    /// so rejects every packet, until [`Rat::init`] runs.
    pub const fn new(config: Config) -> Self {
        Self {
            block: L::EMPTY,
            up_main: Arena::new(),
            up_isr: Arena::new(),
            down_main: Arena::new(),
            down_isr: Arena::new(),
            producing: [const { AtomicBool::new(false) }; CHANNEL_COUNT],
            draining: [const { AtomicBool::new(false) }; CHANNEL_COUNT],
            initializing: AtomicBool::new(false),
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The control block host tooling reads.
    #[inline]
    pub fn control_block(&self) -> &L {
        &self.block
    }

    pub fn signature(&self) -> [u8; SIGNATURE_LEN] {
        self.block.signature()
    }

    fn uplink_arena(&self, ctx: Context) -> (*mut u8, u32) {
        match ctx {
            Context::Normal => (self.up_main.as_mut_ptr(), Arena::<UP_MAIN>::CAPACITY),
            Context::Interrupt => (self.up_isr.as_mut_ptr(), Arena::<UP_ISR>::CAPACITY),
        }
    }

    fn downlink_arena(&self, ctx: Context) -> (*mut u8, u32) {
        match ctx {
            Context::Normal => (self.down_main.as_mut_ptr(), Arena::<DOWN>::CAPACITY),
            Context::Interrupt => (self.down_isr.as_mut_ptr(), Arena::<DOWN>::CAPACITY),
        }
    }

    /// # Safety
    /// The caller holds the producer or drain claim for `ctx`'s uplink, or is
    /// `init` holding both.
    unsafe fn uplink_window(&self, ctx: Context) -> ArenaWindow<'_> {
        // SAFETY: forwarded to the caller.
        unsafe {
            match ctx {
                Context::Normal => self.up_main.window(),
                Context::Interrupt => self.up_isr.window(),
            }
        }
    }

    /// Zero every buffer, mount every descriptor, then publish the signature.
    ///
    /// Call once, before the first emit, with interrupts that emit still
    /// masked. A second call resets all channels and discards unread data.
    /// An uplink that is mid-emit or mid-drain is left untouched.
    pub fn init(&self) {
        let Some(_init) = Claim::try_take(&self.initializing) else {
            log::warn!("rat: init already in progress");
            return;
        };

        self.block.retract();

        for ctx in Context::ALL {
            let i = ctx.index();
            let Some(_producer) = Claim::try_take(&self.producing[i]) else {
                log::warn!("rat: {:?} uplink busy during init, left as is", ctx);
                continue;
            };
            let Some(_drain) = Claim::try_take(&self.draining[i]) else {
                log::warn!("rat: {:?} uplink draining during init, left as is", ctx);
                continue;
            };

            // SAFETY: both claims on this uplink are held.
            let mut window = unsafe { self.uplink_window(ctx) };
            window.fill(0);
            let (ptr, cap) = self.uplink_arena(ctx);
            self.block.uplink(ctx).mount(L::UPLINK_NAMES[i], ptr, cap);
        }

        // Downlinks are written by the host only; the device never consumes them.
        for ctx in Context::ALL {
            let i = ctx.index();
            let (ptr, cap) = self.downlink_arena(ctx);
            // SAFETY: nothing in the crate reads or writes downlink arenas
            // besides this loop, which runs under the init claim.
            unsafe { core::ptr::write_bytes(ptr, 0, cap as usize) };
            self.block.downlink(ctx).mount(L::DOWNLINK_NAMES[i], ptr, cap);
        }

        self.block.announce();

        log::debug!(
            "rat: control block {:?} ready, up={}/{} down={} bytes",
            core::str::from_utf8(L::SIGNATURE).unwrap_or("?"),
            UP_MAIN,
            UP_ISR,
            DOWN
        );
    }

    /// Emit a packet. Returns the framed byte count, or `0` if the packet was
    /// rejected (channel full, disabled, busy, or the packet can never fit).
    #[inline]
    pub fn emit(&self, packet_id: u8, payload: &[u8], ctx: Context) -> usize {
        self.try_emit(packet_id, payload, ctx).unwrap_or(0)
    }

    /// [`Rat::emit`] with the rejection reason.
    pub fn try_emit(&self, packet_id: u8, payload: &[u8], ctx: Context) -> Result<usize, EmitError> {
        let desc = self.block.uplink(ctx);
        let Some(_claim) = Claim::try_take(&self.producing[ctx.index()]) else {
            return Err(EmitError::Busy);
        };

        let capacity = desc.capacity();
        if capacity == 0 {
            return Err(EmitError::Disabled);
        }

        let needed = max_encoded_len(payload.len() + 1);
        let wr = desc.write_offset();
        let rd = desc.read_offset();
        let free = accounting::free(wr, rd, capacity) as usize;
        if needed > free {
            let usable = capacity as usize - 1;
            return Err(if needed > usable {
                EmitError::Oversize {
                    needed,
                    capacity: capacity as usize,
                }
            } else {
                EmitError::Full { needed, free }
            });
        }

        // SAFETY: we hold this uplink's producer claim, and the encoder only
        // touches the `needed` free slots starting at `wr`.
        let mut window = unsafe { self.uplink_window(ctx) };
        let mut enc = FrameEncoder::begin(&mut window, wr);
        enc.write_byte(packet_id);
        enc.write_all(payload);
        let done = enc.finish();

        desc.publish_write(done.end);
        Ok(done.written)
    }

    /// Format a text log and emit it on the normal uplink under the configured
    /// text packet id. Text longer than [`crate::TEXT_MAX_LEN`] bytes is cut at
    /// a character boundary; empty text is not sent. Returns what `emit` does.
    pub fn info(&self, args: fmt::Arguments<'_>) -> usize {
        let text = TextBuf::format(args);
        if text.is_empty() {
            return 0;
        }
        self.emit(self.config.text_packet_id, text.as_bytes(), Context::Normal)
    }

    pub fn stats(&self, ctx: Context) -> ChannelStats {
        self.block.uplink(ctx).stats()
    }

    pub fn downlink_stats(&self, ctx: Context) -> ChannelStats {
        self.block.downlink(ctx).stats()
    }

    pub fn uplink(&self, ctx: Context) -> &RingDescriptor {
        self.block.uplink(ctx)
    }

    /// Act as the external reader of an uplink: copy up to `out.len()` published
    /// bytes in ring order and release them to the producer. Frames are not
    /// decoded. Returns the number of bytes copied, `0` if the uplink is empty,
    /// disabled, or already being drained.
    pub fn drain_uplink(&self, ctx: Context, out: &mut [u8]) -> usize {
        let Some(_claim) = Claim::try_take(&self.draining[ctx.index()]) else {
            return 0;
        };

        let desc = self.block.uplink(ctx);
        let capacity = desc.capacity();
        let wr = desc.write_offset();
        let mut rd = desc.read_offset();
        let n = (accounting::used(wr, rd, capacity) as usize).min(out.len());
        if n == 0 {
            return 0;
        }

        // SAFETY: we hold the drain claim and read only slots in [rd, wr),
        // which the producer does not touch until `rd` moves past them.
        let window = unsafe { self.uplink_window(ctx) };
        for slot in &mut out[..n] {
            *slot = window.get(rd);
            rd = accounting::advance(rd, 1, capacity);
        }
        desc.publish_read(rd);

        log::trace!("rat: drained {} bytes from {:?} uplink", n, ctx);
        n
    }
}

impl<L: ChannelProvider, const UP_MAIN: usize, const UP_ISR: usize, const DOWN: usize> Default
    for Rat<L, UP_MAIN, UP_ISR, DOWN>
{
    fn default() -> Self {
        Self::new(Config::new())
    }
}
