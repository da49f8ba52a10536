//! Input buffering for lockstep synchronization
//!
//! Holds one participant's inputs keyed by the tick they apply to. Entries
//! are write-once: the first value stored for a tick is the one every later
//! reader sees, regardless of how often or in which order the tick arrives.

use lockstep_core::{InputState, Tick};
use std::collections::BTreeMap;

/// Outcome of an [`InputBuffer::insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insert {
    /// The tick had no entry and now holds the new value
    Inserted,
    /// The tick already held the same value
    Duplicate,
    /// The tick already held a different value, which was kept
    Conflict {
        /// The value already stored for the tick
        kept: InputState,
    },
    /// The tick was already consumed and discarded
    Stale,
}

/// Tick-keyed input storage for one participant
///
/// Ticks below the floor have been consumed and are no longer accepted.
/// Ticks more than `capacity` past the floor are rejected so a misbehaving
/// peer cannot grow the buffer without bound.
#[derive(Debug)]
pub struct InputBuffer {
    /// Inputs by tick (ordered)
    inputs: BTreeMap<Tick, InputState>,
    /// Lowest tick still accepted
    floor: Tick,
    /// Maximum distance between the floor and an accepted tick
    capacity: usize,
}

impl InputBuffer {
    /// Create a new input buffer with the given capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            inputs: BTreeMap::new(),
            floor: 0,
            capacity,
        }
    }

    /// Create a buffer whose first `ticks` ticks already hold neutral input
    ///
    /// Used for input delay: ticks before the first polled input start
    /// neutral on every participant.
    pub fn with_neutral_prefix(capacity: usize, ticks: Tick) -> Self {
        let mut buffer = Self::new(capacity);
        buffer
            .inputs
            .extend((0..ticks).map(|tick| (tick, InputState::NEUTRAL)));
        buffer
    }

    /// Store `state` for `tick` unless the tick already has a value
    ///
    /// Returns `Err` if the tick is too far ahead of the floor.
    pub fn insert(&mut self, tick: Tick, state: InputState) -> crate::Result<Insert> {
        if tick < self.floor {
            return Ok(Insert::Stale);
        }
        if tick - self.floor >= self.capacity as u64 {
            return Err(crate::Error::InputBufferFull {
                tick,
                floor: self.floor,
                capacity: self.capacity,
            });
        }
        match self.inputs.get(&tick) {
            Some(kept) if *kept == state => Ok(Insert::Duplicate),
            Some(kept) => Ok(Insert::Conflict { kept: *kept }),
            None => {
                self.inputs.insert(tick, state);
                Ok(Insert::Inserted)
            }
        }
    }

    /// Get the input stored for `tick`
    pub fn get(&self, tick: Tick) -> Option<InputState> {
        self.inputs.get(&tick).copied()
    }

    /// Check whether `tick` has an input
    pub fn contains(&self, tick: Tick) -> bool {
        self.inputs.contains_key(&tick)
    }

    /// Drop every entry below `tick` and stop accepting those ticks
    pub fn discard_before(&mut self, tick: Tick) {
        if tick <= self.floor {
            return;
        }
        self.inputs = self.inputs.split_off(&tick);
        self.floor = tick;
    }

    /// Get all inputs from `tick` onwards, in tick order
    pub fn inputs_from(&self, tick: Tick) -> impl Iterator<Item = (Tick, InputState)> + '_ {
        self.inputs.range(tick..).map(|(t, s)| (*t, *s))
    }

    /// Get the oldest buffered tick
    pub fn oldest_tick(&self) -> Option<Tick> {
        self.inputs.keys().next().copied()
    }

    /// Get the newest buffered tick
    pub fn newest_tick(&self) -> Option<Tick> {
        self.inputs.keys().next_back().copied()
    }

    /// Get the lowest tick still accepted
    pub fn floor(&self) -> Tick {
        self.floor
    }

    /// Get the number of buffered inputs
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Clear all inputs
    pub fn clear(&mut self) {
        self.inputs.clear();
    }

    /// Get the capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_core::Button;

    fn pressed(button: Button) -> InputState {
        InputState::NEUTRAL.with(button)
    }

    #[test]
    fn test_insert_and_len() {
        let mut buffer = InputBuffer::new(10);

        assert_eq!(buffer.insert(2, pressed(Button::A)).unwrap(), Insert::Inserted);
        assert_eq!(buffer.insert(0, pressed(Button::B)).unwrap(), Insert::Inserted);
        assert_eq!(buffer.insert(1, pressed(Button::X)).unwrap(), Insert::Inserted);

        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.oldest_tick(), Some(0));
        assert_eq!(buffer.newest_tick(), Some(2));
        assert_eq!(buffer.get(1), Some(pressed(Button::X)));
    }

    #[test]
    fn test_first_write_wins() {
        let mut buffer = InputBuffer::new(10);

        buffer.insert(5, pressed(Button::A)).unwrap();
        assert_eq!(buffer.insert(5, pressed(Button::A)).unwrap(), Insert::Duplicate);
        assert_eq!(
            buffer.insert(5, pressed(Button::B)).unwrap(),
            Insert::Conflict {
                kept: pressed(Button::A)
            }
        );
        assert_eq!(buffer.get(5), Some(pressed(Button::A)));
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_discard_before() {
        let mut buffer = InputBuffer::new(10);
        for tick in 0..4 {
            buffer.insert(tick, InputState::NEUTRAL).unwrap();
        }

        buffer.discard_before(2);

        assert_eq!(buffer.floor(), 2);
        assert_eq!(buffer.len(), 2);
        assert_eq!(buffer.oldest_tick(), Some(2));
        assert_eq!(buffer.insert(1, pressed(Button::L)).unwrap(), Insert::Stale);
        assert!(!buffer.contains(1));

        // Floor never moves backwards
        buffer.discard_before(1);
        assert_eq!(buffer.floor(), 2);
    }

    #[test]
    fn test_capacity() {
        let mut buffer = InputBuffer::new(3);

        buffer.insert(0, InputState::NEUTRAL).unwrap();
        buffer.insert(2, InputState::NEUTRAL).unwrap();
        assert!(buffer.insert(3, InputState::NEUTRAL).is_err());

        buffer.discard_before(1);
        assert!(buffer.insert(3, InputState::NEUTRAL).is_ok());
    }

    #[test]
    fn test_neutral_prefix() {
        let buffer = InputBuffer::with_neutral_prefix(8, 3);
        assert_eq!(buffer.len(), 3);
        assert!(buffer.inputs_from(0).all(|(_, s)| s.is_neutral()));
        assert!(!buffer.contains(3));
    }

    #[test]
    fn test_inputs_from() {
        let mut buffer = InputBuffer::new(10);
        for tick in 0..4 {
            buffer.insert(tick, InputState::from_bits(tick as u16)).unwrap();
        }

        let from_2: Vec<_> = buffer.inputs_from(2).collect();
        assert_eq!(
            from_2,
            vec![(2, InputState::from_bits(2)), (3, InputState::from_bits(3))]
        );
    }
}
