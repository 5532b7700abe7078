//! Configuration types for the cursor.

/// Values substituted for non-numeric tokens when [`ArgFlags::COALESCE`] is set.
///
/// Every field defaults to zero.
///
/// [`ArgFlags::COALESCE`]: crate::ArgFlags::COALESCE
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CoalesceDefaults {
    /// Default for signed 64-bit targets.
    pub i64: i64,
    /// Default for unsigned 64-bit targets.
    pub u64: u64,
    /// Default for unsigned 32-bit targets.
    pub u32: u32,
    /// Default for signed 32-bit targets.
    pub i32: i32,
    /// Default for double targets.
    pub f64: f64,
}

impl CoalesceDefaults {
    /// Use `value` for every integer target and as the double default.
    ///
    /// Negative values saturate to zero for unsigned targets; values too wide
    /// for 32-bit targets saturate at the type's bounds.
    pub fn uniform(value: i64) -> Self {
        Self {
            i64: value,
            u64: u64::try_from(value).unwrap_or(0),
            u32: u32::try_from(value.max(0)).unwrap_or(u32::MAX),
            i32: i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX }),
            f64: value as f64,
        }
    }
}
