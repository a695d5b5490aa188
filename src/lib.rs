//! Device-side telemetry uplink over shared-memory ring buffers.
//!
//! # Highlights
//! - Packets are COBS framed straight into a ring; no staging copy.
//! - Lock-free: publication is a single offset store between memory barriers.
//! - No allocation, no blocking, no retries. A full channel rejects the packet.
//! - Separate uplinks for normal and interrupt context, so both can emit
//!   without masking each other.
//! - Control block discoverable by signature scan: SEGGER RTT compatible or the
//!   native `RAT_V1` layout.
//!
//! # Quick start
//! ```
//! use rat_link::{Config, Context, Rat};
//!
//! let rat: Rat = Rat::new(Config::new());
//! rat.init();
//!
//! let written = rat.emit(0x42, &[0x11, 0x00, 0x22], Context::Normal);
//! assert_eq!(written, 6);
//!
//! let mut host = [0u8; 16];
//! let n = rat.drain_uplink(Context::Normal, &mut host);
//! assert_eq!(&host[..n], &[0x03, 0x42, 0x11, 0x02, 0x22, 0x00]);
//! ```
//!
//! # No-std
//! The crate is `#![no_std]` outside of tests. Enable one of the
//! `portable-atomic*` features on cores without native compare-and-swap.
//!
//! # Safety and concurrency
//! Each uplink has exactly one producer (its context) and one consumer (the
//! host). A second producer on the same uplink, such as a nested interrupt
//! emitting on [`Context::Interrupt`] while another emit there is in flight,
//! is turned away with [`EmitError::Busy`].
//!
//! # Semantics
//! - `emit` returns the framed byte count, `0` when rejected.
//! - A frame is `COBS([packet_id] + payload)` followed by a `0` delimiter.
//! - At most `capacity - 1` bytes of a channel are ever in use.
#![cfg_attr(not(test), no_std)]

pub mod accounting;
mod atomic;
pub mod channel;
pub mod config;
pub mod error;
pub mod framing;
pub mod layout;
pub mod rat;
pub mod text;

pub use channel::{ChannelStats, RingDescriptor};
pub use config::{CHANNEL_COUNT, Config, Context, DEFAULT_TEXT_PACKET_ID, TEXT_MAX_LEN};
pub use error::EmitError;
pub use framing::{Encoded, FrameEncoder, RingSink, max_encoded_len};
pub use layout::{ChannelProvider, NativeLayout, RttLayout};
pub use rat::Rat;
pub use text::TextBuf;
