//! Batch driver over many events.

use crate::aggregate::DifferenceAggregator;
use crate::engine::{EventSummary, InterpolationEngine};
use meshinterp_core::{EventHits, LayerTableProvider, Result};
use rayon::prelude::*;
use rayon::ThreadPool;

/// Runs every event on `pool` and folds the results into an aggregator.
///
/// Results are folded in the order of `events`, independent of the number
/// of threads. An event that fails with a non-fatal error is logged and
/// recorded in [`DifferenceAggregator::failures`]; the remaining events are
/// still aggregated.
///
/// # Errors
/// Returns the first fatal error (see [`meshinterp_core::Error::is_fatal`])
/// in event order.
pub fn run_events<P>(
    engine: &InterpolationEngine<'_, P>,
    events: &[EventHits],
    pool: &ThreadPool,
) -> Result<DifferenceAggregator>
where
    P: LayerTableProvider + ?Sized,
{
    let results: Vec<(u64, Result<EventSummary>)> = pool.install(|| {
        events
            .par_iter()
            .map(|event| (event.event_id, engine.process_event(event)))
            .collect()
    });

    let mut aggregator = DifferenceAggregator::new();
    for (event_id, result) in results {
        match result {
            Ok(summary) => aggregator.record(&summary),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => {
                log::warn!("event {event_id} failed: {e}");
                aggregator.record_failure(event_id, &e);
            }
        }
    }
    Ok(aggregator)
}
