// -----------------------------------------------------------------------------
// Constants & Configuration
// -----------------------------------------------------------------------------

/// Machines with at most this many buttons are solved by plain subset enumeration.
pub const BRUTE_FORCE_BUTTONS: usize = 20;

/// Largest number of free GF(2) columns we are willing to walk (2^25 assignments).
pub const MAX_FREE_BITS: usize = 25;

/// Ceiling on the number of free-value combinations tried by the counter solver.
pub const MAX_CANDIDATES: u128 = 1 << 32;

/// Search limits shared by both solvers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub brute_force_buttons: usize,
    pub max_free_bits: usize,
    pub max_candidates: u128,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            brute_force_buttons: BRUTE_FORCE_BUTTONS,
            max_free_bits: MAX_FREE_BITS,
            max_candidates: MAX_CANDIDATES,
        }
    }
}
