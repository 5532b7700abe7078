//! Modifier flags for a single extraction call.

use bitflags::bitflags;

bitflags! {
    /// Modifiers applied to one extraction.
    ///
    /// Kept separate from the target type so new types never collide with
    /// flag bits.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ArgFlags: u32 {
        /// Reject values `<= 0`.
        const POSITIVE = 1 << 0;
        /// Reject values `< 0`.
        const NON_NEGATIVE = 1 << 1;
        /// Read the value without consuming the token.
        const NO_ADVANCE = 1 << 2;
        /// Non-numeric or fractional input falls back instead of failing.
        ///
        /// Fractional numbers are truncated toward zero for integer targets;
        /// non-numeric text yields the cursor's configured default.
        const COALESCE = 1 << 3;
    }
}
