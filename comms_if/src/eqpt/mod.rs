//! # Equipment Interface
//!
//! This module defines the interface structures exchanged with equipment: the perception system
//! which observes the leader, and the vehicle which executes the commands.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod car;
pub mod pose;
