//! Place search matcher.
//!
//! Merges local substring matching over the itinerary's own places with a
//! debounced, region-bounded external lookup. Internal hits always rank
//! before external ones, an external failure never discards the internal
//! hits already gathered, and only the result of the latest query
//! generation is ever applied.

mod index;
mod pipeline;

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tracing::{debug, warn};

use crate::Result;
use crate::types::{BoundingRegion, ExternalPlace, SearchHit};

pub use index::LocalIndex;
pub use pipeline::{SearchPipeline, SearchResults, Selection};

/// Queries shorter than this produce an empty result immediately, with no
/// external call.
pub const MIN_QUERY_LEN: usize = 2;

/// Quiet period before a typed query is evaluated.
pub const DEBOUNCE_QUIET: Duration = Duration::from_millis(500);

/// External place-lookup collaborator.
///
/// Failures are treated as "no external results", never as fatal.
#[async_trait::async_trait]
pub trait PlaceLookup: Send + Sync + 'static {
    async fn search(&self, text: &str, region: &BoundingRegion) -> Result<Vec<ExternalPlace>>;
}

/// Generation-guarded query evaluator.
pub struct SearchMatcher {
    index: LocalIndex,
    lookup: Option<Arc<dyn PlaceLookup>>,
    region: BoundingRegion,
    /// Highest query generation that has started evaluating (or been
    /// short-circuited). Results from older generations are discarded.
    active: AtomicU64,
}

impl SearchMatcher {
    pub fn new(
        index: LocalIndex,
        lookup: Option<Arc<dyn PlaceLookup>>,
        region: BoundingRegion,
    ) -> Self {
        Self { index, lookup, region, active: AtomicU64::new(0) }
    }

    /// Mark `generation` as started, superseding anything older.
    pub(crate) fn supersede(&self, generation: u64) {
        self.active.fetch_max(generation, Ordering::SeqCst);
    }

    pub(crate) fn is_current(&self, generation: u64) -> bool {
        self.active.load(Ordering::SeqCst) == generation
    }

    /// Evaluate one query under a generation guard.
    ///
    /// Returns `None` when a newer generation superseded this one while
    /// the external lookup was in flight; the stale result is discarded,
    /// not surfaced as an error.
    pub async fn execute(&self, query: &str, generation: u64) -> Option<Vec<SearchHit>> {
        self.supersede(generation);

        let trimmed = query.trim();
        if trimmed.chars().count() < MIN_QUERY_LEN {
            return Some(Vec::new());
        }

        let mut hits = self.index.matches(trimmed);

        if let Some(lookup) = &self.lookup {
            match lookup.search(trimmed, &self.region).await {
                Ok(places) => {
                    let externals: Vec<SearchHit> = places
                        .into_iter()
                        .map(SearchHit::from)
                        .filter(|ext| {
                            // Dedup against internal hits by label
                            !hits.iter().any(|h| h.label.eq_ignore_ascii_case(&ext.label))
                        })
                        .collect();
                    hits.extend(externals);
                }
                Err(e) => {
                    // Partial results stand
                    warn!(query = trimmed, error = %e, "External lookup failed, keeping internal matches");
                }
            }
        }

        if !self.is_current(generation) {
            debug!(query = trimmed, generation, "Discarding superseded search result");
            return None;
        }
        Some(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TrackingError;
    use crate::types::{Coordinate, FixedPoint, SearchOrigin};
    use std::sync::atomic::AtomicUsize;

    struct FixedLookup {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait::async_trait]
    impl PlaceLookup for FixedLookup {
        async fn search(&self, _text: &str, _region: &BoundingRegion) -> Result<Vec<ExternalPlace>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TrackingError::lookup("503 from provider"));
            }
            Ok(vec![ExternalPlace {
                label: "Caffè Gilli".into(),
                coords: Coordinate::new(43.7714, 11.2542),
                address_fragment: "Via Roma 1".into(),
            }])
        }
    }

    fn region() -> BoundingRegion {
        BoundingRegion::around(Coordinate::new(43.77, 11.25), 0.1)
    }

    fn index() -> LocalIndex {
        LocalIndex::new(
            Vec::new(),
            vec![FixedPoint::new("Caffè storico", 43.7712, 11.2540)],
            Vec::new(),
        )
    }

    #[tokio::test]
    async fn short_query_is_empty_with_no_external_call() {
        let lookup = Arc::new(FixedLookup { calls: AtomicUsize::new(0), fail: false });
        let matcher = SearchMatcher::new(index(), Some(lookup.clone()), region());

        let hits = matcher.execute("c", 1).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn internal_hits_rank_before_external() {
        let lookup = Arc::new(FixedLookup { calls: AtomicUsize::new(0), fail: false });
        let matcher = SearchMatcher::new(index(), Some(lookup), region());

        let hits = matcher.execute("caffè", 1).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].origin, SearchOrigin::Poi);
        assert_eq!(hits[1].origin, SearchOrigin::External);
    }

    #[tokio::test]
    async fn external_failure_keeps_internal_matches() {
        let lookup = Arc::new(FixedLookup { calls: AtomicUsize::new(0), fail: true });
        let matcher = SearchMatcher::new(index(), Some(lookup), region());

        let hits = matcher.execute("caffè", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].origin, SearchOrigin::Poi);
    }

    #[tokio::test]
    async fn superseded_generation_is_discarded() {
        let matcher = SearchMatcher::new(index(), None, region());
        // generation 2 starts before generation 1's result is applied
        matcher.supersede(2);
        assert!(matcher.execute("caffè", 1).await.is_none());
        assert!(matcher.execute("caffè", 2).await.is_some());
    }

    #[tokio::test]
    async fn works_without_external_lookup() {
        let matcher = SearchMatcher::new(index(), None, region());
        let hits = matcher.execute("storico", 1).await.unwrap();
        assert_eq!(hits.len(), 1);
    }
}
