//! Runtime configuration and execution contexts.

/// Uplinks and downlinks per direction: one per [`Context`].
pub const CHANNEL_COUNT: usize = 2;

/// Longest text payload a log packet carries, in bytes.
pub const TEXT_MAX_LEN: usize = 127;

/// Packet id reserved for text logs unless configured otherwise.
pub const DEFAULT_TEXT_PACKET_ID: u8 = 0xFF;

/// Execution domain a producer call originates from.
///
/// Each context owns its own uplink and downlink, so the two never contend for
/// a channel: an interrupt handler emits on [`Context::Interrupt`], everything
/// else on [`Context::Normal`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    Normal,
    Interrupt,
}

impl Context {
    pub const ALL: [Context; CHANNEL_COUNT] = [Context::Normal, Context::Interrupt];

    #[inline]
    pub const fn from_isr(in_isr: bool) -> Self {
        if in_isr {
            Context::Interrupt
        } else {
            Context::Normal
        }
    }

    /// Slot of this context in the control block's channel arrays.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Context::Normal => 0,
            Context::Interrupt => 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub text_packet_id: u8,
}

impl Config {
    pub const fn new() -> Self {
        Self {
            text_packet_id: DEFAULT_TEXT_PACKET_ID,
        }
    }

    /// Use `id` for packets produced by [`crate::Rat::info`]. Must match the
    /// host decoder's text id.
    pub const fn with_text_packet_id(mut self, id: u8) -> Self {
        self.text_packet_id = id;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{Config, Context, DEFAULT_TEXT_PACKET_ID};

    #[test]
    fn contexts_map_to_distinct_slots() {
        assert_eq!(Context::from_isr(false), Context::Normal);
        assert_eq!(Context::from_isr(true), Context::Interrupt);
        assert_ne!(Context::Normal.index(), Context::Interrupt.index());
    }

    #[test]
    fn text_id_defaults_and_overrides() {
        assert_eq!(Config::default().text_packet_id, DEFAULT_TEXT_PACKET_ID);
        assert_eq!(Config::new().with_text_packet_id(0x7E).text_packet_id, 0x7E);
    }
}
