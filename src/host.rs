//! Host platform collaborator
//!
//! The worker may only call into host-provided services after installing a
//! capability token obtained in the caller's context. This module defines
//! the token and the trait a host implements; the store only carries the token
//! across the thread boundary.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// Opaque capability handed from the caller's context to the worker
#[derive(Clone)]
pub struct CapabilityToken(Arc<dyn Any + Send + Sync>);

impl CapabilityToken {
    /// Wrap a host-specific value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(value))
    }

    /// Borrow the host-specific value, if it has type `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }
}

impl fmt::Debug for CapabilityToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CapabilityToken(..)")
    }
}

/// Host platform services seen by the store
pub trait Host: Send + Sync + 'static {
    /// Issue a token. Called on the caller's thread in `Store::open`.
    fn capability(&self) -> CapabilityToken;

    /// Register the token in the worker's context. Called once, on the worker
    /// thread, when the client's Init arrives.
    fn install(&self, token: &CapabilityToken) -> Result<()>;

    /// Checked on the worker thread before every storage operation.
    fn authorize(&self, _token: &CapabilityToken) -> Result<()> {
        Ok(())
    }
}

/// Host for a plain process: the file system needs no registration
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalHost;

impl Host for LocalHost {
    fn capability(&self) -> CapabilityToken {
        CapabilityToken::new(std::process::id())
    }

    fn install(&self, token: &CapabilityToken) -> Result<()> {
        tracing::debug!(
            "Installed local capability (pid {:?})",
            token.downcast_ref::<u32>()
        );
        Ok(())
    }
}
