//! Event types published to the host application.
//!
//! All types derive `serde::Serialize` + `serde::Deserialize` so hosts can
//! forward them over their own IPC or logging channels unchanged.

pub mod events;
