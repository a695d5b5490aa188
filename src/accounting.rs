//! Ring offset arithmetic. Every modulo/wraparound computation on channel
//! offsets lives here.
//!
//! A channel of capacity `C` holds at most `C - 1` bytes: the spare slot tells a
//! full ring apart from an empty one when `wr == rd`. A zero-capacity channel is
//! disabled and reports nothing used and nothing free.

/// Bytes written by the producer and not yet consumed.
#[inline]
pub const fn used(wr: u32, rd: u32, capacity: u32) -> u32 {
    if capacity == 0 {
        return 0;
    }
    if wr >= rd {
        wr - rd
    } else {
        capacity.wrapping_sub(rd - wr)
    }
}

/// Bytes the producer may still write without overtaking the consumer.
#[inline]
pub const fn free(wr: u32, rd: u32, capacity: u32) -> u32 {
    if capacity == 0 {
        return 0;
    }
    // Offsets come from shared memory; a bogus `rd` must not underflow.
    capacity
        .saturating_sub(used(wr, rd, capacity))
        .saturating_sub(1)
}

/// Position `by` bytes past `pos`, wrapped into `[0, capacity)`.
#[inline]
pub const fn advance(pos: u32, by: u32, capacity: u32) -> u32 {
    if capacity == 0 {
        return 0;
    }
    ((pos as u64 + by as u64) % capacity as u64) as u32
}

#[cfg(test)]
mod tests {
    use super::{advance, free, used};

    #[test]
    fn empty_ring_has_one_spare_slot() {
        assert_eq!(used(0, 0, 16), 0);
        assert_eq!(free(0, 0, 16), 15);
        assert_eq!(used(9, 9, 16), 0);
        assert_eq!(free(9, 9, 16), 15);
    }

    #[test]
    fn used_wraps_when_writer_is_behind_reader() {
        assert_eq!(used(3, 10, 16), 9);
        assert_eq!(free(3, 10, 16), 6);
        assert_eq!(used(9, 10, 16), 15);
        assert_eq!(free(9, 10, 16), 0);
    }

    #[test]
    fn zero_capacity_is_disabled() {
        assert_eq!(used(0, 0, 0), 0);
        assert_eq!(free(0, 0, 0), 0);
        assert_eq!(advance(5, 3, 0), 0);
    }

    #[test]
    fn queries_are_idempotent() {
        let (wr, rd) = (13, 4);
        let first = (used(wr, rd, 32), free(wr, rd, 32));
        for _ in 0..8 {
            assert_eq!((used(wr, rd, 32), free(wr, rd, 32)), first);
        }
    }

    #[test]
    fn corrupt_read_offset_does_not_underflow() {
        assert_eq!(free(0, 40, 16), 0);
    }

    #[test]
    fn advance_wraps_to_start() {
        assert_eq!(advance(14, 1, 16), 15);
        assert_eq!(advance(15, 1, 16), 0);
        assert_eq!(advance(10, 20, 16), 14);
        assert_eq!(advance(u32::MAX - 1, 3, u32::MAX), 2);
    }
}
