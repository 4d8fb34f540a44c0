use std::ops::Range;
use std::sync::{Mutex, PoisonError};
use std::thread;

use tracing::debug;

use super::{Money, Payment};

/// Sum payment amounts in a single pass. Returns `None` on overflow.
pub fn sum_amounts(payments: &[Payment]) -> Option<Money> {
    payments
        .iter()
        .try_fold(0 as Money, |total, payment| total.checked_add(payment.amount))
}

/// Split `len` records into `workers` contiguous ranges.
///
/// The first `workers - 1` ranges each hold `len / workers` records and the
/// last range takes the remainder. Returns no ranges when `workers` is 0.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    if workers == 0 {
        return Vec::new();
    }

    let block = len / workers;
    (0..workers)
        .map(|i| {
            let start = i * block;
            let end = if i + 1 == workers { len } else { start + block };
            start..end
        })
        .collect()
}

/// Sum payment amounts using `workers` scoped threads over disjoint,
/// read-only partitions. A worker count of 0 falls back to a single pass.
///
/// Partial sums are folded into one shared accumulator; the call returns once
/// every worker has joined. Returns `None` if any partial or the total
/// overflows.
pub fn sum_payments(payments: &[Payment], workers: usize) -> Option<Money> {
    if workers == 0 {
        return sum_amounts(payments);
    }

    let total = Mutex::new(Some(0 as Money));

    thread::scope(|scope| {
        for range in partition(payments.len(), workers) {
            let chunk = &payments[range.clone()];
            let total = &total;
            scope.spawn(move || {
                let partial = sum_amounts(chunk);
                debug!(start = range.start, end = range.end, ?partial, "partition summed");
                let mut total = total.lock().unwrap_or_else(PoisonError::into_inner);
                *total = total.zip(partial).and_then(|(sum, part)| sum.checked_add(part));
            });
        }
    });

    total.into_inner().unwrap_or_else(PoisonError::into_inner)
}
