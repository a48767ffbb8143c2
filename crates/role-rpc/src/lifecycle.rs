//! # Component Lifecycle
//!
//! Services and clients move through the same states:
//!
//! ```text
//! Created ──configure──▶ Configured ──set_references──▶ ReferencesBound ──open──▶ Open
//!                                                               ▲                  │
//!                                                               └──── close ◀──────┘ (Closed)
//! ```
//!
//! `configure` may come before or after `set_references`; the state only records the
//! furthest step reached. `open` on an open component does nothing, and a failed `open`
//! leaves the state where it was.

use crate::error::RpcResult;
use crate::references::References;
use async_trait::async_trait;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleState {
    Created,
    Configured,
    ReferencesBound,
    Open,
    Closed,
}

impl LifecycleState {
    /// State after `configure`.
    pub(crate) fn configured(self) -> Self {
        match self {
            LifecycleState::Created => LifecycleState::Configured,
            other => other,
        }
    }

    /// State after `set_references`.
    pub(crate) fn bound(self) -> Self {
        match self {
            LifecycleState::Created | LifecycleState::Configured => LifecycleState::ReferencesBound,
            other => other,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Configured => "configured",
            LifecycleState::ReferencesBound => "references_bound",
            LifecycleState::Open => "open",
            LifecycleState::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// A component a [`Plugin`](crate::container::Plugin) can host.
#[async_trait]
pub trait Component: Send {
    fn set_references(&mut self, references: &References) -> RpcResult<()>;

    async fn open(&mut self, correlation_id: &str) -> RpcResult<()>;

    async fn close(&mut self, correlation_id: &str) -> RpcResult<()>;

    fn is_open(&self) -> bool;
}
