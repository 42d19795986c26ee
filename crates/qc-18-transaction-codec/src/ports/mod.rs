//! # Ports Layer
//!
//! Trait definitions for the hexagonal architecture.
//! - **Inbound (Driving)**: API that external callers use
//!
//! The codec has no outbound dependencies.

pub mod inbound;
