//! High-level runtime engine settings
//!
//! Selects the turn length, slice granularity and whether collisions are
//! simulated when running a `Scenario`

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engine {
    pub seconds: i64,     // simulated seconds per run
    pub granularity: i64, // slices per run
    pub collisions: bool, // false = pure drift, true = detect and resolve impacts
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            seconds: 1,
            granularity: 1,
            collisions: true,
        }
    }
}
