//! Option slots with stale-response discarding.
//!
//! # Responsibility
//! - Track items and load status for one option level (colleges, programs,
//!   subjects, notes).
//! - Decide whether a completed load may still be applied.
//!
//! # Invariants
//! - Each `begin` bumps the slot generation; only the newest ticket can apply.
//! - A ticket also applies only while its scope equals the scope derived
//!   from the currently committed filter state.
//! - Failed loads leave an empty item list.

use log::{debug, warn};
use std::fmt::{Debug, Display};

/// Load lifecycle of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadStatus {
    /// Never loaded.
    #[default]
    Idle,
    Loading,
    Ready,
    /// Last applied load failed; items are empty.
    Failed,
}

impl LoadStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

/// Proof of one issued load, carried back on completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket<P> {
    generation: u64,
    scope: P,
}

impl<P> LoadTicket<P> {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Scope (parent selection) the load was issued for.
    pub fn scope(&self) -> &P {
        &self.scope
    }
}

/// What happened to a completed load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { count: usize },
    Failed,
    Stale,
}

/// Items for one option level plus load bookkeeping.
#[derive(Debug, Clone)]
pub struct OptionSlot<T, P> {
    name: &'static str,
    generation: u64,
    status: LoadStatus,
    scope: Option<P>,
    items: Vec<T>,
}

impl<T, P> OptionSlot<T, P>
where
    P: Clone + PartialEq + Debug,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: 0,
            status: LoadStatus::Idle,
            scope: None,
            items: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Scope of the most recently issued load.
    pub fn scope(&self) -> Option<&P> {
        self.scope.as_ref()
    }

    /// Registers a new in-flight load and supersedes every older ticket.
    pub fn begin(&mut self, scope: P) -> LoadTicket<P> {
        self.generation += 1;
        self.status = LoadStatus::Loading;
        self.scope = Some(scope.clone());
        debug!(
            "event=load_options module=loader status=start slot={} generation={} scope={:?}",
            self.name, self.generation, scope
        );
        LoadTicket {
            generation: self.generation,
            scope,
        }
    }

    /// Applies `result` unless the ticket is stale.
    ///
    /// `current_scope` is the scope derived from the committed filter state
    /// at completion time.
    pub fn complete<E: Display>(
        &mut self,
        ticket: LoadTicket<P>,
        result: Result<Vec<T>, E>,
        current_scope: &P,
    ) -> LoadOutcome {
        if ticket.generation != self.generation || ticket.scope != *current_scope {
            debug!(
                "event=stale_response module=loader status=discarded slot={} generation={} current_generation={} scope={:?} current_scope={:?}",
                self.name, ticket.generation, self.generation, ticket.scope, current_scope
            );
            return LoadOutcome::Stale;
        }

        match result {
            Ok(items) => {
                let count = items.len();
                self.items = items;
                self.status = LoadStatus::Ready;
                debug!(
                    "event=load_options module=loader status=ok slot={} generation={} count={}",
                    self.name, ticket.generation, count
                );
                LoadOutcome::Applied { count }
            }
            Err(err) => {
                self.items.clear();
                self.status = LoadStatus::Failed;
                warn!(
                    "event=load_options module=loader status=error slot={} generation={} error={}",
                    self.name, ticket.generation, err
                );
                LoadOutcome::Failed
            }
        }
    }
}
