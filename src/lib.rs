//! # respwire
//!
//! A blocking client for the RESP request/response protocol with:
//! - Binary-safe command encoding from printf-like templates or builders
//! - Recursive reply decoding with bounded lengths and nesting
//! - Distinct nil, empty-bulk and empty-array replies
//! - Bounded connect retries over pluggable byte streams
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Client Session                          │
//! │            (one command in flight, lock-step)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Command    │          │   Reply     │
//!   │  Encoder    │          │  Decoder    │
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌─────────────────────────────────────┐
//!   │   Byte Stream  (TCP / Connector)    │
//!   └─────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{RespError, Result};
pub use config::Config;
pub use network::{Client, SharedClient};
pub use protocol::{Arg, Command, Reply};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of respwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
