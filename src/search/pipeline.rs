//! Spawned search pipeline: typed input in, ranked results out.
//!
//! Wires the query channel through the debounce combinator into the
//! matcher. Sub-threshold queries bypass the quiet period and clear the
//! results immediately; everything else waits out the debounce, then
//! evaluates under a generation guard so an in-flight lookup superseded
//! by newer input is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use futures::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{MIN_QUERY_LEN, SearchMatcher};
use crate::stream::DebounceExt;
use crate::types::{Coordinate, SearchHit};

/// Current result set for the most recently evaluated query.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchResults {
    pub query: String,
    pub hits: Vec<SearchHit>,
}

/// Outcome of picking a result: the map focuses here and the input field
/// shows the label. Produced outside the query channel so selection never
/// re-enters the debounce cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub label: String,
    pub coords: Coordinate,
}

/// Live search task plus its input/output endpoints.
pub struct SearchPipeline {
    query_tx: mpsc::Sender<(u64, String)>,
    immediate_tx: mpsc::Sender<(u64, String)>,
    results: watch::Receiver<SearchResults>,
    seq: AtomicU64,
    cancel: CancellationToken,
}

impl SearchPipeline {
    /// Spawn the pipeline task over a matcher.
    pub fn spawn(matcher: SearchMatcher, quiet: Duration) -> Self {
        let (query_tx, query_rx) = mpsc::channel::<(u64, String)>(16);
        let (immediate_tx, immediate_rx) = mpsc::channel::<(u64, String)>(16);
        let (results_tx, results_rx) = watch::channel(SearchResults::default());
        let cancel = CancellationToken::new();
        let cancel_task = cancel.clone();

        tokio::spawn(async move {
            Self::pipeline_task(matcher, query_rx, immediate_rx, results_tx, quiet, cancel_task)
                .await;
        });

        Self { query_tx, immediate_tx, results: results_rx, seq: AtomicU64::new(0), cancel }
    }

    /// Submit the current text-field contents.
    ///
    /// Queries below the length threshold clear the results right away
    /// and supersede any pending evaluation; the rest enter the debounce
    /// window.
    pub fn submit(&self, text: impl Into<String>) {
        let text = text.into();
        let seq = self.seq.fetch_add(1, Ordering::SeqCst) + 1;
        let channel = if text.trim().chars().count() < MIN_QUERY_LEN {
            &self.immediate_tx
        } else {
            &self.query_tx
        };
        // A full channel means the task is gone or hopelessly behind;
        // dropping keystrokes is the correct degradation either way
        let _ = channel.try_send((seq, text));
    }

    /// Watch endpoint for the current result set.
    pub fn results(&self) -> watch::Receiver<SearchResults> {
        self.results.clone()
    }

    /// Resolve a picked hit into a selection.
    ///
    /// Deliberately does not touch the query channel: replacing the text
    /// field with the label is caller-side feedback, not a new search.
    pub fn select(&self, hit: &SearchHit) -> Selection {
        Selection { label: hit.label.clone(), coords: hit.coords }
    }

    async fn pipeline_task(
        matcher: SearchMatcher,
        query_rx: mpsc::Receiver<(u64, String)>,
        mut immediate_rx: mpsc::Receiver<(u64, String)>,
        results_tx: watch::Sender<SearchResults>,
        quiet: Duration,
        cancel: CancellationToken,
    ) {
        info!("Search pipeline started");
        let matcher = Arc::new(matcher);
        let mut debounced = std::pin::pin!(ReceiverStream::new(query_rx).debounce(quiet));
        let mut latest_seq = 0u64;

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("Search pipeline cancelled");
                    break;
                }
                short = immediate_rx.recv() => {
                    let Some((seq, text)) = short else { break };
                    latest_seq = latest_seq.max(seq);
                    // Invalidate any in-flight evaluation, then clear
                    matcher.supersede(seq);
                    let _ = results_tx.send(SearchResults { query: text, hits: Vec::new() });
                }
                debounced_query = debounced.next() => {
                    let Some((seq, text)) = debounced_query else { break };
                    if seq < latest_seq {
                        // A later submission (e.g. the field was cleared)
                        // already superseded this pending query
                        debug!(query = %text, "Skipping stale debounced query");
                        continue;
                    }
                    latest_seq = seq;

                    // Evaluate off the select loop so a newer query can
                    // supersede a slow external lookup
                    let matcher = matcher.clone();
                    let results_tx = results_tx.clone();
                    tokio::spawn(async move {
                        if let Some(hits) = matcher.execute(&text, seq).await {
                            let _ = results_tx.send(SearchResults { query: text, hits });
                        }
                    });
                }
            }
        }
        info!("Search pipeline ended");
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
