//! Packed line state
//!
//! The state carried from one line to the next is a single `u64` holding
//! four 8-bit fields. Field `i` (bits `8i..8i+8`) stores the index + 1 of
//! the rule open at nesting level `i`, or 0 when nothing is open there.
//! The layout is stable so hosts can persist states alongside their lines.
//!
//! Four levels is a hard limit: grammars nesting deeper than that cannot
//! be resumed, and the tokenizer refuses to enter a fifth level.

/// Number of nesting levels a `LineState` can describe
pub const MAX_DEPTH: usize = 4;

/// Highest rule index a field can hold
pub const MAX_RULE_INDEX: u8 = 254;

const FIELD_BITS: usize = 8;
const FIELD_MASK: u64 = 0xFF;

/// Line state for resuming tokenization mid-grammar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct LineState(u64);

impl LineState {
    /// State of the first line of a document
    pub const NORMAL: LineState = LineState(0);

    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Check if no rule is open at any level
    pub fn is_normal(self) -> bool {
        self.0 == 0
    }

    /// Raw field at `level` (0 = inactive)
    pub fn field(self, level: usize) -> u8 {
        if level >= MAX_DEPTH {
            return 0;
        }
        ((self.0 >> (level * FIELD_BITS)) & FIELD_MASK) as u8
    }

    /// Index of the rule open at `level`
    pub fn active_rule(self, level: usize) -> Option<usize> {
        match self.field(level) {
            0 => None,
            field => Some(field as usize - 1),
        }
    }

    /// Mark `rule` open at `level`
    ///
    /// Levels at or beyond `MAX_DEPTH` and indices above `MAX_RULE_INDEX`
    /// can't be represented; the state is returned unchanged.
    pub fn with_active(self, level: usize, rule: usize) -> Self {
        debug_assert!(level < MAX_DEPTH, "nesting level {level} out of range");
        debug_assert!(rule <= MAX_RULE_INDEX as usize, "rule index {rule} out of range");
        if level >= MAX_DEPTH || rule > MAX_RULE_INDEX as usize {
            return self;
        }
        let shift = level * FIELD_BITS;
        Self((self.0 & !(FIELD_MASK << shift)) | ((rule as u64 + 1) << shift))
    }

    /// Clear `level` and every level below it
    ///
    /// Bits beyond the last field are always cleared.
    pub fn truncated(self, level: usize) -> Self {
        let kept_bits = level.min(MAX_DEPTH) * FIELD_BITS;
        if kept_bits == 0 {
            return Self::NORMAL;
        }
        Self(self.0 & ((1u64 << kept_bits) - 1))
    }

    /// Encode `(level, rule index)` pairs, outermost first
    ///
    /// Levels are expected to be consecutive from 0; everything past the
    /// last given level is cleared.
    pub fn encode(levels: &[(usize, u8)]) -> Self {
        levels
            .iter()
            .fold(Self::NORMAL, |state, &(level, rule)| state.with_active(level, rule as usize))
    }

    /// Decode the open levels, stopping at the first inactive one
    pub fn decode(self) -> Vec<(usize, u8)> {
        (0..MAX_DEPTH)
            .map_while(|level| self.active_rule(level).map(|rule| (level, rule as u8)))
            .collect()
    }
}

impl From<u64> for LineState {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

impl From<LineState> for u64 {
    fn from(state: LineState) -> Self {
        state.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_state() {
        let normal = LineState::default();
        assert!(normal.is_normal());
        assert_eq!(normal.active_rule(0), None);

        let inside = LineState::NORMAL.with_active(0, 2);
        assert!(!inside.is_normal());
        assert_eq!(inside.bits(), 3);
        assert_eq!(inside.active_rule(0), Some(2));
    }

    #[test]
    fn test_field_layout() {
        let state = LineState::encode(&[(0, 0), (1, 4), (2, 9)]);
        assert_eq!(state.bits(), 0x0A_05_01);
        assert_eq!(state.field(1), 5);
        assert_eq!(state.field(3), 0);
        assert_eq!(state.field(7), 0);
    }

    #[test]
    fn test_decode_stops_at_first_gap() {
        // level 2 is set but level 1 is not
        let state = LineState::new(0x03_00_01);
        assert_eq!(state.decode(), vec![(0, 0)]);
    }

    #[test]
    fn test_truncated() {
        let state = LineState::encode(&[(0, 1), (1, 2), (2, 3), (3, 4)]);
        assert_eq!(state.truncated(2), LineState::encode(&[(0, 1), (1, 2)]));
        assert_eq!(state.truncated(0), LineState::NORMAL);
        assert_eq!(state.truncated(MAX_DEPTH), state);
        assert_eq!(LineState::new(0xFF00_0000_0000_0001).truncated(MAX_DEPTH).bits(), 1);
    }

    #[test]
    fn test_with_active_replaces_field() {
        let state = LineState::encode(&[(0, 1), (1, 2)]).with_active(1, 7);
        assert_eq!(state.decode(), vec![(0, 1), (1, 7)]);
    }

    #[test]
    fn test_u64_conversion() {
        let state = LineState::from(0x0102u64);
        assert_eq!(u64::from(state), 0x0102);
        assert_eq!(state.decode(), vec![(0, 1), (1, 0)]);
    }
}
