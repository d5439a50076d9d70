//! Small string helpers shared by the routing subsystem.

pub mod strings;
