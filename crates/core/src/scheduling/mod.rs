//! Appointment scheduling engine
//!
//! Resolves whether a proposed appointment time is legally bookable against a
//! provider's recurring availability, existing commitments, and configured
//! buffers, all expressed in the provider's civil timezone. Also issues and
//! redeems single-use reschedule tokens.

pub mod availability;
pub mod booking;
pub mod civil;
pub mod conflict;
pub mod ports;
pub mod reschedule;
