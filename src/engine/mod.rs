//! Execution engine module
//!
//! Drives the stream forest from its roots down.
//!
//! # Overview
//!
//! - `SyncEngine` - runs a `Catalog` against an `AdsApi`, writing to a
//!   `RecordSink`
//! - `SyncConfig` - failure policy and record limits
//! - `RunReport` - what ran, what was emitted, what failed
//!
//! Execution is sequential and depth first. Each node invocation drains its
//! API rows completely before any child runs. Distinct child contexts are
//! visited in the order they were first derived, and for each context the
//! children run in catalog order. A `(node, context)` pair runs at most
//! once per run.
//!
//! A failed invocation derives no contexts, so its whole subtree is starved
//! while unrelated subtrees carry on. Auth and configuration errors abort
//! the run, as does any failure when `fail_fast` is set.

mod types;

pub use types::{IdentityFailure, Message, NodeFailure, RunReport, StreamStats, SyncConfig};

use crate::api::AdsApi;
use crate::config::TapConfig;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::output::RecordSink;
use crate::record::Record;
use crate::stream::{Catalog, NodeId};
use chrono::{NaiveDate, Utc};
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Source of "today" for date windows
pub type Clock = Arc<dyn Fn() -> NaiveDate + Send + Sync>;

/// Which nodes run, and which of those emit records
#[derive(Debug, Clone, PartialEq, Eq)]
struct Plan {
    run: Vec<bool>,
    emit: Vec<bool>,
}

/// Sync engine for orchestrating extraction over the stream forest
pub struct SyncEngine {
    catalog: Arc<Catalog>,
    api: Arc<dyn AdsApi>,
    config: Arc<TapConfig>,
    sync: SyncConfig,
    clock: Clock,
}

impl SyncEngine {
    /// Create an engine using the UTC date as "today"
    pub fn new(catalog: Arc<Catalog>, api: Arc<dyn AdsApi>, config: Arc<TapConfig>) -> Self {
        Self {
            catalog,
            api,
            config,
            sync: SyncConfig::default(),
            clock: Arc::new(|| Utc::now().date_naive()),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Replace the clock
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDate + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// The catalog being executed
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Sync configuration
    pub fn sync_config(&self) -> &SyncConfig {
        &self.sync
    }

    /// Resolve a stream selection; empty means every stream
    fn plan(&self, selection: &[String]) -> Result<Plan> {
        let n = self.catalog.len();
        if selection.is_empty() {
            return Ok(Plan {
                run: vec![true; n],
                emit: vec![true; n],
            });
        }

        let mut plan = Plan {
            run: vec![false; n],
            emit: vec![false; n],
        };
        for name in selection {
            let id = self.catalog.get(name)?;
            plan.run[id] = true;
            plan.emit[id] = true;
            for ancestor in self.catalog.ancestors(id) {
                plan.run[ancestor] = true;
            }
        }
        Ok(plan)
    }

    /// Run the selected streams, writing every message to `sink`
    ///
    /// Returns the report even when individual nodes failed; use
    /// `RunReport::into_result` to turn those into an error.
    pub async fn run(&self, selection: &[String], sink: &mut dyn RecordSink) -> Result<RunReport> {
        let started = Instant::now();
        let plan = self.plan(selection)?;
        let mut report = RunReport::new();
        let mut seen: HashSet<(NodeId, Context)> = HashSet::new();
        let mut keys = EmittedKeys::default();

        let roots: Vec<NodeId> = self.catalog.roots().filter(|id| plan.run[*id]).collect();
        let mut pending: Vec<(NodeId, Context)> = Vec::with_capacity(roots.len());
        for &root in roots.iter().rev() {
            seen.insert((root, Context::empty()));
            pending.push((root, Context::empty()));
        }

        info!(
            streams = plan.emit.iter().filter(|e| **e).count(),
            fail_fast = self.sync.fail_fast,
            "starting run"
        );

        while let Some((id, context)) = pending.pop() {
            let children: Vec<NodeId> = self
                .catalog
                .children(id)
                .iter()
                .copied()
                .filter(|child| plan.run[*child])
                .collect();

            let outcome = self
                .invoke(
                    id,
                    &context,
                    plan.emit[id],
                    !children.is_empty(),
                    sink,
                    &mut report,
                    &mut keys,
                )
                .await;

            match outcome {
                Ok(contexts) => {
                    let mut next = Vec::new();
                    for derived in contexts {
                        for &child in &children {
                            if seen.insert((child, derived.clone())) {
                                next.push((child, derived.clone()));
                            } else {
                                debug!(
                                    stream = %self.catalog.node(child).name(),
                                    context = %derived,
                                    "context already used, skipping"
                                );
                            }
                        }
                    }
                    pending.extend(next.into_iter().rev());
                }
                Err(err @ Error::Output { .. }) => return Err(err),
                Err(err) => {
                    self.record_failure(id, &context, &err, sink, &mut report)
                        .await?;
                    if err.is_fatal_for_run() || self.sync.fail_fast {
                        error!(error = %err, "aborting run");
                        return Err(err);
                    }
                }
            }
        }

        sink.flush().await?;
        report.duration = started.elapsed();
        info!(
            records = report.total_records(),
            failures = report.failures.len(),
            skipped_rows = report.identity_failures.len(),
            duration_ms = report.duration.as_millis(),
            "run finished"
        );
        Ok(report)
    }

    /// One node invocation: drain rows, emit records, collect child contexts
    #[allow(clippy::too_many_arguments)]
    async fn invoke(
        &self,
        id: NodeId,
        context: &Context,
        emit: bool,
        wants_contexts: bool,
        sink: &mut dyn RecordSink,
        report: &mut RunReport,
        keys: &mut EmittedKeys,
    ) -> Result<Vec<Context>> {
        let node = self.catalog.node(id);
        let name = node.name();
        let request = node.request(&self.config, context, (self.clock)())?;
        report.stream_mut(name).invocations += 1;

        info!(stream = %name, context = %context, request = %request, "starting stream");
        sink.emit(Message::info(format!(
            "Starting stream {name} with context {context}"
        )))
        .await?;

        let mut rows = self.api.submit(&request);
        let mut contexts: Vec<Context> = Vec::new();
        let mut row_index = 0;
        let mut emitted = 0;

        while let Some(row) = rows.next().await {
            let row = row?;
            row_index += 1;

            match node.to_record(&row, context) {
                Ok(None) => debug!(stream = %name, row = row_index, "row filtered out"),
                Ok(Some(record)) => {
                    if wants_contexts {
                        if let Some(child) = node.child_context(&record, context) {
                            if !contexts.contains(&child) {
                                contexts.push(child);
                            }
                        }
                    }
                    if emit && !self.sync.limit_reached(report.records(name)) {
                        if self.sync.check_duplicate_keys && !keys.insert(id, &record) {
                            let key = record.primary_key().canonical();
                            warn!(stream = %name, key = %key, "duplicate primary key");
                            sink.emit(Message::warn(format!(
                                "Stream {name} emitted primary key {key} more than once"
                            )))
                            .await?;
                            report.stream_mut(name).duplicate_keys += 1;
                        }
                        sink.emit(Message::record(name, node.schema(), record)).await?;
                        report.stream_mut(name).records += 1;
                        emitted += 1;
                    }
                }
                Err(row_error) => {
                    let message = match row_error.field() {
                        Some(field) => Error::identity(name, field).to_string(),
                        None => format!("Row in stream '{name}' rejected: {row_error}"),
                    };
                    warn!(stream = %name, row = row_index, error = %row_error, "skipping row");
                    sink.emit(Message::warn(format!("{message} (row {row_index})")))
                        .await?;
                    report.identity_failures.push(IdentityFailure {
                        stream: name.to_string(),
                        row: row_index,
                        error: row_error,
                    });
                }
            }

            if !wants_contexts && (!emit || self.sync.limit_reached(report.records(name))) {
                debug!(stream = %name, "record limit reached");
                break;
            }
        }

        info!(
            stream = %name,
            rows = row_index,
            records = emitted,
            contexts = contexts.len(),
            "stream finished"
        );
        sink.emit(Message::info(format!(
            "Finished stream {name}: {emitted} records"
        )))
        .await?;
        Ok(contexts)
    }

    async fn record_failure(
        &self,
        id: NodeId,
        context: &Context,
        err: &Error,
        sink: &mut dyn RecordSink,
        report: &mut RunReport,
    ) -> Result<()> {
        let name = self.catalog.node(id).name();
        let kind = err.kind();
        error!(stream = %name, context = %context, kind = %kind, error = %err, "stream failed");

        report.failures.push(NodeFailure {
            stream: name.to_string(),
            kind,
            message: err.to_string(),
            context: context.to_string(),
        });
        sink.emit(Message::error(format!("Stream {name} failed ({kind}): {err}")))
            .await
    }
}

/// Canonical primary keys already emitted, per node
#[derive(Debug, Default)]
struct EmittedKeys(HashMap<NodeId, HashSet<String>>);

impl EmittedKeys {
    /// Remember a record's key; false when the node already emitted it
    fn insert(&mut self, id: NodeId, record: &Record) -> bool {
        self.0
            .entry(id)
            .or_default()
            .insert(record.primary_key().canonical())
    }
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("streams", &self.catalog.len())
            .field("customer_id", &self.config.customer_id)
            .field("sync", &self.sync)
            .finish_non_exhaustive()
    }
}
