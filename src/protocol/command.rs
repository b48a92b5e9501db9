//! Command definitions
//!
//! Messages exchanged between the client handle and the worker thread.

use std::fmt;
use std::path::PathBuf;

use crossbeam::channel::Sender;

use crate::error::StoreError;

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CommandKind {
    Init = 0x01,
    Add = 0x02,
    Query = 0x03,
    Ack = 0x04,
    Result = 0x05,
    Done = 0x06,
    Shutdown = 0x07,
}

impl CommandKind {
    /// Lowercase name used in log lines
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::Init => "init",
            CommandKind::Add => "add",
            CommandKind::Query => "query",
            CommandKind::Ack => "ack",
            CommandKind::Result => "result",
            CommandKind::Done => "done",
            CommandKind::Shutdown => "shutdown",
        }
    }

    /// Whether the worker produces this kind (as opposed to the client)
    pub fn is_reply(self) -> bool {
        matches!(
            self,
            CommandKind::Ack | CommandKind::Result | CommandKind::Done
        )
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome carried by Ack and Done
pub type Outcome = std::result::Result<(), StoreError>;

/// Handshake payloads; Init means something different in each direction
#[derive(Debug)]
pub enum Init {
    /// Worker → client: where to send commands
    Worker(Sender<Message>),

    /// Client → worker: which file to serve
    Client { path: PathBuf },
}

/// A command, tagged by kind
#[derive(Debug)]
pub enum Command {
    /// Handshake
    Init(Init),

    /// Store a string
    Add(String),

    /// Search for a substring
    Query(String),

    /// An Init, Add or Shutdown finished
    Ack(Outcome),

    /// One match of an in-flight Query
    Result(String),

    /// An in-flight Query finished
    Done(Outcome),

    /// Drain queued commands, acknowledge, exit
    Shutdown,
}

impl Command {
    /// Get the command kind
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Init(_) => CommandKind::Init,
            Command::Add(_) => CommandKind::Add,
            Command::Query(_) => CommandKind::Query,
            Command::Ack(_) => CommandKind::Ack,
            Command::Result(_) => CommandKind::Result,
            Command::Done(_) => CommandKind::Done,
            Command::Shutdown => CommandKind::Shutdown,
        }
    }
}

/// Identifies a request; replies carry the id of the request they answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Reserved for the Init exchange
    pub const HANDSHAKE: RequestId = RequestId(0);

    /// First id handed to a regular request
    pub const FIRST: RequestId = RequestId(1);
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Channel payload: a command plus the id it belongs to
#[derive(Debug)]
pub struct Message {
    pub id: RequestId,
    pub command: Command,
}

impl Message {
    pub fn new(id: RequestId, command: Command) -> Self {
        Self { id, command }
    }

    /// Shorthand for `self.command.kind()`
    pub fn kind(&self) -> CommandKind {
        self.command.kind()
    }
}
