use crate::query::TimeQuery;
use core::time::Duration;

/// Partitions `query`'s `[start, end)` into consecutive sub-ranges no longer
/// than `interval`.
///
/// Sub-ranges are returned in ascending time order. They are contiguous and
/// non-overlapping and their union is exactly the original range; only the
/// last one may be shorter than `interval`. An empty or inverted range, or a
/// zero interval, yields no sub-ranges.
pub fn split_by_time(query: &TimeQuery, interval: Duration) -> Vec<TimeQuery> {
    if interval.is_zero() || query.start >= query.end {
        return Vec::new();
    }

    let total = query.span();
    let capacity = total.as_nanos().div_ceil(interval.as_nanos());
    let mut sub_ranges = Vec::with_capacity(usize::try_from(capacity).unwrap_or(0));

    let mut start = query.start;
    while start < query.end {
        // Saturate at the query end if the clock would overflow.
        let end = start
            .checked_add(interval)
            .map_or(query.end, |end| end.min(query.end));
        sub_ranges.push(query.with_range(start, end));
        start = end;
    }

    sub_ranges
}
