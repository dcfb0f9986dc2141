use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info, warn};

use crate::client::{FetchError, InventoryClient};
use crate::inventory::{InventoryDocument, SUBNET_COLUMNS, VPC_COLUMNS};
use crate::render::{escape_html, render_table};

pub const LOADING_TEXT: &str = "Loading…";

/// What the output region currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "content", rename_all = "lowercase")]
pub enum DisplayContent {
    #[default]
    Empty,
    Loading,
    Markup(String),
    Message(String),
}

impl DisplayContent {
    pub fn to_html(&self) -> String {
        match self {
            DisplayContent::Empty => String::new(),
            DisplayContent::Loading => escape_html(LOADING_TEXT),
            DisplayContent::Markup(markup) => markup.clone(),
            DisplayContent::Message(text) => escape_html(text),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DisplayContent::Loading)
    }
}

pub fn compose(doc: &InventoryDocument) -> String {
    let mut content = format!("<p>Fetched at: {}</p>", escape_html(&doc.timestamp));
    content.push_str(&render_table(&doc.vpcs, &VPC_COLUMNS, "VPCs"));
    content.push_str(&render_table(&doc.subnets, &SUBNET_COLUMNS, "Subnets"));
    content
}

pub fn error_message(err: &FetchError) -> String {
    format!("Error fetching inventory: {err}")
}

pub fn resolve(outcome: &Result<InventoryDocument, FetchError>) -> DisplayContent {
    match outcome {
        Ok(doc) => DisplayContent::Markup(compose(doc)),
        Err(err) => DisplayContent::Message(error_message(err)),
    }
}

/// How resolutions of overlapping fetches are applied to the region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SequencingPolicy {
    /// Every resolution overwrites the region; the last to resolve wins.
    #[default]
    LastResolved,
    /// Only the newest trigger's resolution is shown; older ones are dropped.
    LatestRequest,
}

impl SequencingPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "last-resolved" | "last_resolved" | "resolved" => Some(Self::LastResolved),
            "latest-request" | "latest_request" | "latest" => Some(Self::LatestRequest),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SequencingPolicy::LastResolved => "last-resolved",
            SequencingPolicy::LatestRequest => "latest-request",
        }
    }
}

#[derive(Debug)]
pub struct Resolution {
    pub generation: u64,
    pub outcome: Result<InventoryDocument, FetchError>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Update {
    Shown { generation: u64 },
    Stale { generation: u64 },
    /// The fetch task ended without an outcome (it panicked or was aborted).
    Lost { generation: u64 },
}

enum TaskReport {
    Resolved(Resolution),
    Lost { generation: u64 },
}

/// Held by a fetch task for its whole life. Whatever way the task ends, the
/// dashboard hears back exactly once for its generation.
struct ReportGuard {
    generation: u64,
    tx: Option<mpsc::UnboundedSender<TaskReport>>,
}

impl ReportGuard {
    fn resolve(mut self, outcome: Result<InventoryDocument, FetchError>) {
        if let Some(tx) = self.tx.take() {
            // the receiver only goes away with the dashboard itself
            let _ = tx.send(TaskReport::Resolved(Resolution {
                generation: self.generation,
                outcome,
            }));
        }
    }
}

impl Drop for ReportGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(TaskReport::Lost {
                generation: self.generation,
            });
        }
    }
}

/// Owns the output region. Fetches run as independent tasks and hand their
/// outcome back over a channel; only the owner of the dashboard writes the
/// region.
pub struct Dashboard {
    client: Arc<InventoryClient>,
    policy: SequencingPolicy,
    region: DisplayContent,
    issued: u64,
    in_flight: usize,
    tx: mpsc::UnboundedSender<TaskReport>,
    rx: mpsc::UnboundedReceiver<TaskReport>,
}

impl Dashboard {
    pub fn new(client: InventoryClient, policy: SequencingPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            client: Arc::new(client),
            policy,
            region: DisplayContent::Empty,
            issued: 0,
            in_flight: 0,
            tx,
            rx,
        }
    }

    pub fn region(&self) -> &DisplayContent {
        &self.region
    }

    pub fn policy(&self) -> SequencingPolicy {
        self.policy
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Shows the loading placeholder and starts a new fetch.
    ///
    /// Earlier fetches are not cancelled. Must be called from within a tokio
    /// runtime.
    pub fn trigger(&mut self) -> u64 {
        self.issued += 1;
        let generation = self.issued;
        self.region = DisplayContent::Loading;
        self.in_flight += 1;

        let client = Arc::clone(&self.client);
        let guard = self.report_guard(generation);
        task::spawn(async move {
            guard.resolve(client.fetch_inventory().await);
        });
        debug!(generation, in_flight = self.in_flight, "fetch triggered");
        generation
    }

    /// Waits for the next outstanding fetch and applies it to the region.
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_update(&mut self) -> Option<Update> {
        if self.in_flight == 0 {
            return None;
        }
        let report = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(match report {
            TaskReport::Resolved(resolution) => self.apply(resolution),
            TaskReport::Lost { generation } => self.lose(generation),
        })
    }

    /// Waits for every outstanding fetch, returning the updates in the order
    /// they resolved.
    pub async fn settle(&mut self) -> Vec<Update> {
        let mut updates = Vec::new();
        while let Some(update) = self.next_update().await {
            updates.push(update);
        }
        updates
    }

    fn report_guard(&self, generation: u64) -> ReportGuard {
        ReportGuard {
            generation,
            tx: Some(self.tx.clone()),
        }
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.policy == SequencingPolicy::LatestRequest && generation < self.issued
    }

    pub fn apply(&mut self, resolution: Resolution) -> Update {
        let generation = resolution.generation;
        if self.is_stale(generation) {
            debug!(generation, newest = self.issued, "discarding stale inventory");
            return Update::Stale { generation };
        }
        match &resolution.outcome {
            Ok(doc) => info!(
                generation,
                vpcs = doc.vpcs.len(),
                subnets = doc.subnets.len(),
                "inventory fetched"
            ),
            Err(err) => info!(generation, error = %err, "inventory fetch failed"),
        }
        self.region = resolve(&resolution.outcome);
        Update::Shown { generation }
    }

    fn lose(&mut self, generation: u64) -> Update {
        warn!(generation, "fetch task ended without a response");
        if self.is_stale(generation) {
            return Update::Stale { generation };
        }
        self.region = DisplayContent::Message(format!(
            "Error fetching inventory: fetch #{generation} ended without a response"
        ));
        Update::Lost { generation }
    }
}
