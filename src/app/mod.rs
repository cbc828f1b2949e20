//! Application core: the node's domain logic, with every hardware
//! touchpoint behind a port trait.
//!
//! Lifecycle orchestration, sampling cadence, telemetry framing and the
//! button UI all live here or in the modules it drives.  Interaction with
//! the board happens only through [`ports`], so the whole core runs in
//! host tests against mocks.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
