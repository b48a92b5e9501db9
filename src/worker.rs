//! Worker Module
//!
//! The background side of the store. A dedicated thread owns the record file
//! and processes one message at a time, strictly in arrival order.
//!
//! ## Lifecycle
//! 1. Spawned with the client's inbound sender, the halt signal, the host and
//!    its capability token
//! 2. Creates its own bounded inbound channel and sends `Init(address)`
//! 3. Receives `Init(path)`, installs the token, replies `Ack`
//! 4. Serves Add/Query until `Shutdown`, a halt, or the client going away
//!
//! A panic while handling a message (typically from a `Host` callback) is
//! answered with `StoreError::ThreadPanicked` for that request, then the
//! worker exits.
//!
//! Because only this thread touches the file, appends and scans never
//! overlap and the file needs no lock.

use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Receiver, Sender, TryRecvError};
use crossbeam::select;

use crate::config::{Config, SyncStrategy};
use crate::error::{Result, StoreError};
use crate::host::{CapabilityToken, Host};
use crate::protocol::{Command, CommandKind, Init, Message, Outcome, RequestId};
use crate::storage::RecordFile;

/// Worker actor state, owned by the worker thread
pub struct Worker {
    /// Client's inbound channel (all replies go here)
    client: Sender<Message>,

    /// Commands from the client
    inbound: Receiver<Message>,

    /// Never carries a value; disconnects when the client stops the store
    halt: Receiver<()>,

    host: Arc<dyn Host>,
    token: CapabilityToken,
    sync_strategy: SyncStrategy,

    /// Thread name, reported in ThreadPanicked
    name: String,

    /// Set by a successful Init
    storage: Option<RecordFile>,
}

impl Worker {
    /// Spawn the worker thread
    ///
    /// The first message the client receives on `client` is the worker's
    /// `Init(address)`.
    pub fn spawn(
        client: Sender<Message>,
        halt: Receiver<()>,
        host: Arc<dyn Host>,
        token: CapabilityToken,
        config: &Config,
    ) -> Result<JoinHandle<()>> {
        let capacity = config.channel_capacity;
        let sync_strategy = config.sync_strategy;
        let name = config.worker_name.clone();

        thread::Builder::new()
            .name(name.clone())
            .spawn(move || {
                let (address, inbound) = channel::bounded(capacity);
                let worker = Worker {
                    client,
                    inbound,
                    halt,
                    host,
                    token,
                    sync_strategy,
                    name,
                    storage: None,
                };

                let hello = Message::new(RequestId::HANDSHAKE, Command::Init(Init::Worker(address)));
                if worker.client.send(hello).is_err() {
                    tracing::warn!("Client went away before the handshake");
                    return;
                }

                worker.run();
            })
            .map_err(StoreError::Spawn)
    }

    /// Receive loop: one message at a time until told to stop
    fn run(mut self) {
        tracing::debug!("Worker started");

        loop {
            // None: halted, or every command sender is gone
            let next = select! {
                recv(self.halt) -> _ => None,
                recv(self.inbound) -> message => message.ok(),
            };

            let message = match next {
                Some(message) => message,
                None => {
                    tracing::debug!("Worker halted or command channel closed");
                    break;
                }
            };

            // select! picks at random when both are ready
            if self.halted() {
                tracing::debug!("Worker halted with {} queued", self.inbound.len() + 1);
                break;
            }

            if self.handle_guarded(message).is_break() {
                break;
            }
        }

        tracing::debug!("Worker exiting");
    }

    /// `handle`, turning a panic into a failed reply for the same request
    fn handle_guarded(&mut self, message: Message) -> ControlFlow<()> {
        let id = message.id;
        let kind = message.kind();

        match panic::catch_unwind(AssertUnwindSafe(|| self.handle(message))) {
            Ok(flow) => flow,
            Err(_) => {
                tracing::error!("Worker panicked handling {} {}", kind, id);
                let error = StoreError::ThreadPanicked(self.name.clone());
                let reply = match kind {
                    CommandKind::Query => Command::Done(Err(error)),
                    _ => Command::Ack(Err(error)),
                };
                let _ = self.reply(id, reply);
                ControlFlow::Break(())
            }
        }
    }

    /// Dispatch a single message
    fn handle(&mut self, message: Message) -> ControlFlow<()> {
        let Message { id, command } = message;
        tracing::debug!("Worker handling {} {}", command.kind(), id);

        match command {
            Command::Init(Init::Client { path }) => {
                let outcome = self.init(path);
                self.reply(id, Command::Ack(outcome))
            }
            Command::Add(value) => {
                let outcome = self.add(&value);
                self.reply(id, Command::Ack(outcome))
            }
            Command::Query(query) => self.query(id, &query),
            Command::Shutdown => {
                let _ = self.reply(id, Command::Ack(Ok(())));
                ControlFlow::Break(())
            }
            other if other.kind().is_reply() => {
                tracing::warn!("Worker ignoring reply-only {} {}", other.kind(), id);
                ControlFlow::Continue(())
            }
            other => {
                tracing::warn!("Worker ignoring unexpected {} {}", other.kind(), id);
                ControlFlow::Continue(())
            }
        }
    }

    /// Store the path and install the capability token
    fn init(&mut self, path: PathBuf) -> Outcome {
        if self.storage.is_some() {
            tracing::warn!("Repeated Init; switching to {}", path.display());
        }

        self.host.install(&self.token).map_err(|e| {
            tracing::error!("Capability install failed: {}", e);
            e
        })?;

        let storage = RecordFile::new(path, self.sync_strategy);
        tracing::debug!("Serving {}", storage.path().display());
        self.storage = Some(storage);
        Ok(())
    }

    fn add(&self, value: &str) -> Outcome {
        self.storage()?.append(value).map_err(|e| {
            tracing::error!("Append failed: {}", e);
            e
        })
    }

    /// Stream one Result per match, then Done
    fn query(&self, id: RequestId, query: &str) -> ControlFlow<()> {
        let halt = &self.halt;
        let mut scan = match self.storage().and_then(|storage| storage.scan(query)) {
            // Checked before every record, matching or not
            Ok(scan) => scan.interrupt_if(move || is_halted(halt)),
            Err(e) => return self.reply(id, Command::Done(Err(e))),
        };

        let mut matches = 0usize;
        for item in scan.by_ref() {
            match item {
                Ok(value) => {
                    matches += 1;
                    if self.reply(id, Command::Result(value)).is_break() {
                        return ControlFlow::Break(());
                    }
                }
                Err(e) => {
                    tracing::error!("Scan failed after {} matches: {}", matches, e);
                    return self.reply(id, Command::Done(Err(e)));
                }
            }
        }

        if scan.was_interrupted() {
            tracing::debug!("Worker halted mid-scan for {}", id);
            return ControlFlow::Break(());
        }

        tracing::debug!("Query {} matched {} records", id, matches);
        self.reply(id, Command::Done(Ok(())))
    }

    /// The record file, once Init succeeded and the host allows access
    fn storage(&self) -> Result<&RecordFile> {
        let storage = self.storage.as_ref().ok_or(StoreError::NotInitialized)?;
        self.host.authorize(&self.token)?;
        Ok(storage)
    }

    fn reply(&self, id: RequestId, command: Command) -> ControlFlow<()> {
        let kind = command.kind();
        match self.client.send(Message::new(id, command)) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => {
                tracing::warn!("Client gone; dropping {} {}", kind, id);
                ControlFlow::Break(())
            }
        }
    }

    fn halted(&self) -> bool {
        is_halted(&self.halt)
    }
}

/// The halt channel never carries a value; anything but Empty means stop
fn is_halted(halt: &Receiver<()>) -> bool {
    !matches!(halt.try_recv(), Err(TryRecvError::Empty))
}
