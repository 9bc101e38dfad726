//! Domain-level constants
//!
//! Centralized location for all scheduling constants used throughout the
//! application.

// Reschedule token configuration
pub const DEFAULT_TOKEN_VALIDITY_DAYS: u32 = 30;
pub const TOKEN_VALUE_BYTES: usize = 32;

// Follow-up stamping (entering the claimed state)
pub const DEFAULT_FOLLOW_UP_MONTHS: u32 = 6;

// Conflict detection is scoped to a single civil day, so an appointment plus
// its buffers must never span one. Enforced at booking time.
pub const MAX_OCCUPANCY_MINUTES: u32 = 24 * 60;

// Policy cache defaults
pub const DEFAULT_POLICY_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_POLICY_CACHE_CAPACITY: u64 = 1024;

// Day-of-week contract: Monday = 0 .. Sunday = 6
pub const DAYS_PER_WEEK: u8 = 7;
