//! Static partitioning of the keyspace into contiguous index ranges.

/// A half-open slice `[start, end)` of the keyspace assigned to a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexRange {
    pub start: u64,
    pub end: u64,
}

impl IndexRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Split `[0, total)` into at most `parts` contiguous ranges of
/// `ceil(total / parts)` indices, the last one truncated to `total`.
///
/// Empty ranges are never produced: when `parts > total` only `total`
/// single-index ranges come back. Oversplitting into more ranges than
/// worker threads is the normal configuration; spare ranges sit in the
/// dispatch queue and shorten the reaction time to the stop signal.
pub fn partition(total: u64, parts: usize) -> Vec<IndexRange> {
    if total == 0 || parts == 0 {
        return Vec::new();
    }
    let chunk = (total + parts as u64 - 1) / parts as u64;
    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0u64;
    while start < total {
        let end = total.min(start + chunk);
        ranges.push(IndexRange { start, end });
        start = end;
    }
    ranges
}
