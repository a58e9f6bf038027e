//! Verification-time configuration.
//!
//! A handful of documented defaults the caller can override, rather than a
//! sprawling builder.

/// Limits applied while validating a single program.
///
/// None of these change the typing rules; they only bound how large an
/// input the verifier is willing to scan, which is a deployment concern
/// (the scan itself already terminates in time bounded by `len`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Programs longer than this are rejected before any byte is scanned.
    pub max_program_len: usize,
}

impl Limits {
    /// The filter VM's documented default: generous enough for any realistic
    /// probe filter, small enough to bound worst-case validation time.
    pub const DEFAULT_MAX_PROGRAM_LEN: usize = 64 * 1024;
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_program_len: Self::DEFAULT_MAX_PROGRAM_LEN,
        }
    }
}
