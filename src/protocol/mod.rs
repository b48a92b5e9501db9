//! Protocol Module
//!
//! Defines the messages exchanged between the client handle and the worker.
//!
//! ## Message Format
//! ```text
//! ┌──────────────┬──────────┬─────────────────────────────┐
//! │ RequestId    │  Kind    │         Payload             │
//! └──────────────┴──────────┴─────────────────────────────┘
//! ```
//!
//! ### Kinds
//! - 0x01: INIT     - worker→client: worker address; client→worker: path
//! - 0x02: ADD      - value to store
//! - 0x03: QUERY    - substring to look for
//! - 0x04: ACK      - outcome of Init/Add/Shutdown
//! - 0x05: RESULT   - one matched string
//! - 0x06: DONE     - outcome of a Query, closes its stream
//! - 0x07: SHUTDOWN - empty
//!
//! ### Handshake
//! ```text
//! worker ── Init(address) ──▶ client
//! worker ◀── Init(path) ───── client      (id 0)
//! worker ── Ack ────────────▶ client      (id 0)
//! ```
//!
//! Messages travel over in-process channels only; they are never serialized.
//! Replies are matched to requests by id.

mod command;

pub use command::{Command, CommandKind, Init, Message, Outcome, RequestId};
