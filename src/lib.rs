//! Starholm faction AI library.
//!
//! Exposes the galaxy data model, the world-operations boundary, and the
//! per-faction decision engine for use by a tick scheduler and the
//! integration tests.

pub mod ai;
pub mod galaxy;
pub mod world;
