//! Reply dispatcher
//!
//! Owns the client's inbound channel and routes every worker reply to the
//! pending request with the same id.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::Receiver;
use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::protocol::{Command, Message};

use super::registry::{CloseReason, Registry};

/// Spawn the dispatcher thread. It exits once the worker drops its sender.
///
/// Whatever is still pending at that point can never be answered and is
/// failed with `StoreError::Disconnected`.
pub(crate) fn spawn(
    inbound: Receiver<Message>,
    registry: Arc<Mutex<Registry>>,
    name: String,
) -> Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(name)
        .spawn(move || {
            for message in inbound.iter() {
                dispatch(&registry, message);
            }

            let stranded = registry.lock().close_with(CloseReason::Disconnected);
            if stranded > 0 {
                tracing::warn!("Worker gone with {} requests pending", stranded);
            }
            tracing::debug!("Dispatcher exiting");
        })
        .map_err(StoreError::Spawn)
}

fn dispatch(registry: &Mutex<Registry>, message: Message) {
    let Message { id, command } = message;
    let kind = command.kind();
    tracing::trace!("Client received {} {}", kind, id);

    let mut registry = registry.lock();
    let known = match command {
        Command::Ack(outcome) => registry.resolve_operation(id, outcome),
        Command::Result(value) => registry.push_match(id, value),
        Command::Done(outcome) => registry.finish_query(id, outcome),
        Command::Init(_) => {
            tracing::warn!("Unexpected Init {} after handshake", id);
            true
        }
        Command::Add(_) | Command::Query(_) | Command::Shutdown => {
            tracing::warn!("Client ignoring {} {}", kind, id);
            true
        }
    };

    // Late replies after stop land here
    if !known {
        tracing::debug!("No pending request for {} {}", kind, id);
    }
}
