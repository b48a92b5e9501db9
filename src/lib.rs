//! # slotstore
//!
//! A small embedded string store whose disk I/O runs on a background worker
//! thread, driven entirely by message passing:
//! - Fixed-width (256-byte) record file, append-only
//! - Linear-scan, case-sensitive substring lookup
//! - Single worker thread serializing all file access
//! - Request/reply correlation by request id
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Store (caller thread)                     │
//! │        add_entry → PendingWrite     find → Matches           │
//! └──────────────┬──────────────────────────────▲───────────────┘
//!                │ Message{id, Add/Query}        │ resolve(id)
//!                ▼                               │
//!   ┌────────────────────────┐        ┌─────────┴──────────┐
//!   │   Worker (own thread)  │───────▶│ Dispatcher thread  │
//!   │  one message at a time │  Ack / │  (pending registry)│
//!   └───────────┬────────────┘ Result/└────────────────────┘
//!               │              Done
//!               ▼
//!        ┌─────────────┐
//!        │ RecordFile  │
//!        │ (256 B/rec) │
//!        └─────────────┘
//! ```
//!
//! ```no_run
//! use slotstore::Store;
//!
//! # fn main() -> slotstore::Result<()> {
//! let store = Store::open("notes.db")?;
//! store.add_entry("flutter").wait()?;
//! store.add_entry("dart").wait()?;
//!
//! for found in store.find("t") {
//!     println!("{}", found?);
//! }
//! store.shutdown()
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod storage;
pub mod protocol;
pub mod host;
pub mod worker;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{StoreError, Result};
pub use config::{Config, SyncStrategy};
pub use host::{CapabilityToken, Host, LocalHost};
pub use client::{Matches, PendingWrite, Store};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slotstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
