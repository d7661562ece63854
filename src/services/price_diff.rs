//! Timestamp-based change detection
//!
//! The snapshot feed returns every tracked item on every fetch, so the
//! naive approach of rewriting the whole prices table each cycle would
//! explode write volume. Instead an item counts as changed only when
//! one of its per-side trade timestamps strictly advanced past what is
//! stored. Pure function, no I/O.

use std::collections::HashMap;

use crate::services::feed::PriceQuote;
use crate::services::repository::CurrentPrice;

/// Return the subset of `latest` whose high or low timestamp strictly
/// exceeds the stored one. Missing timestamps on either side compare
/// as 0, so an item with no stored price row is included as soon as the
/// feed reports any trade for it. Items present only in `current` are
/// ignored (no deletions).
pub fn detect_price_changes(
    current: &HashMap<i32, CurrentPrice>,
    latest: &HashMap<i32, PriceQuote>,
) -> HashMap<i32, PriceQuote> {
    let mut changed = HashMap::new();

    for (item_id, quote) in latest {
        let latest_high = quote.high_time.unwrap_or(0);
        let latest_low = quote.low_time.unwrap_or(0);

        let (current_high, current_low) = match current.get(item_id) {
            Some(row) => (row.high_time.unwrap_or(0), row.low_time.unwrap_or(0)),
            None => (0, 0),
        };

        if latest_high > current_high || latest_low > current_low {
            changed.insert(*item_id, quote.clone());
        }
    }

    changed
}
