//! In-place quicksort used to make equal keys adjacent before the merge pass
//!
//! Middle-element pivot with a Lomuto partition. The smaller partition is
//! sorted recursively and the larger one in the loop, which keeps the stack
//! depth logarithmic even when many partials share a key.

use crate::aggregate::Aggregate;

/// Sort aggregates ascending by key
pub fn sort_aggregates(aggregates: &mut [Aggregate]) {
    quicksort_by_key(aggregates, |a| a.key);
}

pub fn quicksort_by_key<T, K, F>(items: &mut [T], key: F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    quicksort_range(items, 0, items.len(), &key);
}

/// Sort `items[lo..hi]`
fn quicksort_range<T, K, F>(items: &mut [T], mut lo: usize, mut hi: usize, key: &F)
where
    K: Ord,
    F: Fn(&T) -> K,
{
    while hi - lo > 1 {
        let pivot = partition(items, lo, hi, key);
        if pivot - lo < hi - pivot - 1 {
            quicksort_range(items, lo, pivot, key);
            lo = pivot + 1;
        } else {
            quicksort_range(items, pivot + 1, hi, key);
            hi = pivot;
        }
    }
}

/// Partition `items[lo..hi]` around its middle element and return the
/// pivot's final position.
fn partition<T, K, F>(items: &mut [T], lo: usize, hi: usize, key: &F) -> usize
where
    K: Ord,
    F: Fn(&T) -> K,
{
    let last = hi - 1;
    items.swap(lo + (hi - lo) / 2, last);
    let pivot = key(&items[last]);

    let mut store = lo;
    for i in lo..last {
        if key(&items[i]) < pivot {
            items.swap(i, store);
            store += 1;
        }
    }
    items.swap(store, last);
    store
}
