//! Client Module
//!
//! The foreground handle to a store. Every operation becomes a message to the
//! worker thread; replies come back on a dispatcher thread that resolves the
//! matching pending request.
//!
//! ## Request flow
//! ```text
//!  caller ──track(id)──▶ Registry ◀──resolve(id)── dispatcher
//!    │                                                 ▲
//!    └──── Message{id, Add/Query} ──▶ worker ──────────┘
//!                                     Message{id, Ack/Result/Done}
//! ```
//!
//! A request is tracked before its command is sent, so a reply can never
//! arrive for an id the registry has not seen yet.

mod dispatch;
mod pending;
mod registry;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam::channel::{self, Sender};
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::host::{Host, LocalHost};
use crate::protocol::{Command, CommandKind, Init, Message, RequestId};
use crate::worker::Worker;

pub use pending::{Matches, PendingWrite};

use registry::Registry;

/// Handle to an open store
///
/// ## Termination
/// - `shutdown`: the worker finishes every command sent before it, then exits
/// - `stop` (and `Drop`): the worker exits before its next command, and every
///   request still pending resolves as `StoreError::Stopped`
pub struct Store {
    config: Config,

    /// Worker's inbound channel, learned during the handshake
    commands: Sender<Message>,

    /// Pending requests, shared with the dispatcher thread
    registry: Arc<Mutex<Registry>>,

    next_id: AtomicU64,

    /// Never sent on; dropping it halts the worker
    halt: Option<Sender<()>>,

    worker: Option<JoinHandle<()>>,
    dispatcher: Option<JoinHandle<()>>,
}

impl Store {
    /// Open a store at `path` with the default config and a local host
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let config = Config::builder().path(path).build()?;
        Self::open_with(config, Arc::new(LocalHost))
    }

    /// Open a store, spawning its worker
    ///
    /// Steps:
    /// 1. Take a capability token from the host (this thread)
    /// 2. Spawn the worker with our inbound sender and the token
    /// 3. Receive the worker's address (Init)
    /// 4. Start the dispatcher
    /// 5. Send Init(path) and wait for its Ack
    pub fn open_with(config: Config, host: Arc<dyn Host>) -> Result<Self> {
        let (client_tx, inbound) = channel::unbounded();
        let (halt, halt_rx) = channel::bounded::<()>(0);

        let token = host.capability();
        let worker = Worker::spawn(client_tx, halt_rx, host, token, &config)?;

        let commands = match inbound.recv() {
            Ok(Message {
                command: Command::Init(Init::Worker(address)),
                ..
            }) => address,
            Ok(other) => {
                return Err(StoreError::Protocol(format!(
                    "expected init from worker, got {}",
                    other.kind()
                )))
            }
            Err(_) => return Err(StoreError::Disconnected),
        };
        tracing::debug!("Worker attached");

        let registry = Arc::new(Mutex::new(Registry::default()));
        let dispatcher = dispatch::spawn(
            inbound,
            Arc::clone(&registry),
            format!("{}-client", config.worker_name),
        )?;

        let store = Self {
            config,
            commands,
            registry,
            next_id: AtomicU64::new(RequestId::FIRST.0),
            halt: Some(halt),
            worker: Some(worker),
            dispatcher: Some(dispatcher),
        };

        let handshake = store.registry.lock().track_operation(RequestId::HANDSHAKE);
        let path = store.config.path.clone();
        store.send(RequestId::HANDSHAKE, Command::Init(Init::Client { path }));
        handshake.wait()?;

        tracing::info!("Store opened at {}", store.config.path.display());
        Ok(store)
    }

    /// Append a value
    ///
    /// Returns immediately; the write resolves when the worker acknowledges it.
    /// Values longer than a record are truncated by the worker.
    pub fn add_entry(&self, value: impl Into<String>) -> PendingWrite {
        let id = self.next_request_id();
        let pending = self.registry.lock().track_operation(id);
        self.send(id, Command::Add(value.into()));
        pending
    }

    /// Look for every stored value containing `query` (case-sensitive)
    ///
    /// Returns immediately; matches stream in as the worker scans.
    pub fn find(&self, query: impl Into<String>) -> Matches {
        let id = self.next_request_id();
        let matches = self.registry.lock().track_query(id);
        self.send(id, Command::Query(query.into()));
        matches
    }

    /// Terminate the worker without draining
    ///
    /// Returns immediately. Requests still pending resolve as
    /// `StoreError::Stopped`, even if the worker is in the middle of one.
    pub fn stop(mut self) {
        self.halt_now();
    }

    /// Let the worker finish everything already sent, then exit
    pub fn shutdown(mut self) -> Result<()> {
        let id = self.next_request_id();
        let pending = self.registry.lock().track_operation(id);
        self.send(id, Command::Shutdown);
        let outcome = pending.wait();

        let abandoned = self.registry.lock().close();
        if abandoned > 0 {
            tracing::warn!("{} requests still pending at shutdown", abandoned);
        }
        self.halt.take();

        if let Some(worker) = self.worker.take() {
            worker
                .join()
                .map_err(|_| StoreError::ThreadPanicked(self.config.worker_name.clone()))?;
        }
        if let Some(dispatcher) = self.dispatcher.take() {
            dispatcher
                .join()
                .map_err(|_| StoreError::ThreadPanicked(format!("{}-client", self.config.worker_name)))?;
        }

        tracing::info!("Store at {} shut down", self.config.path.display());
        outcome
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Get the record file path
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// (pending writes, pending queries)
    pub fn in_flight(&self) -> (usize, usize) {
        self.registry.lock().in_flight()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn next_request_id(&self) -> RequestId {
        RequestId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Send to the worker; on failure, fail the tracked request instead
    fn send(&self, id: RequestId, command: Command) {
        let kind = command.kind();
        if self.commands.send(Message::new(id, command)).is_ok() {
            return;
        }

        tracing::warn!("Worker unreachable; failing {} {}", kind, id);
        let mut registry = self.registry.lock();
        if kind == CommandKind::Query {
            registry.finish_query(id, Err(StoreError::Disconnected));
        } else {
            registry.resolve_operation(id, Err(StoreError::Disconnected));
        }
    }

    fn halt_now(&mut self) {
        if let Some(halt) = self.halt.take() {
            let abandoned = self.registry.lock().close();
            drop(halt);
            tracing::debug!("Store stopped; {} requests abandoned", abandoned);
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.halt_now();
    }
}
