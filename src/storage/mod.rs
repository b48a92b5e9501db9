//! Storage Module
//!
//! Append-only record file with linear-scan substring lookup.
//!
//! ## Responsibilities
//! - Encode each stored string into one fixed-width record
//! - Append records in insertion order
//! - Scan every record, yielding the ones containing a query
//!
//! ## File Format
//! ```text
//! ┌────────────────────────────────────────┐
//! │ Record 0 (256 bytes)                   │
//! │ ┌──────────────────────┬─────────────┐ │
//! │ │ UTF-8 bytes          │ 0x00 pad... │ │
//! │ └──────────────────────┴─────────────┘ │
//! ├────────────────────────────────────────┤
//! │ Record 1 (256 bytes)                   │
//! ├────────────────────────────────────────┤
//! │ ...                                    │
//! └────────────────────────────────────────┘
//! ```
//!
//! No header, no count, no deletion marker. Record `n` starts at byte
//! `n * RECORD_SIZE`. Values longer than a record are cut at the record size.
//!
//! There is no locking here: the worker thread is the only caller, and it
//! never runs an append and a scan at the same time.

pub mod record;
mod file;

pub use file::{RecordFile, Scan};
pub use record::RECORD_SIZE;
