//! # Communications interface crate.
//!
//! Provides all common communications interfaces for the software.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telecommands accepted by the follow executable
pub mod tc;

/// Message definitions for equipment (pose source and vehicle)
pub mod eqpt;

/// Network module
pub mod net;
