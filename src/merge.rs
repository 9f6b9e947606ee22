use std::iter::Peekable;

use crate::aggregate::Aggregate;

/// Coalesces adjacent aggregates with equal keys.
///
/// On key-sorted input this yields exactly one final aggregate per key.
pub struct Coalesce<I: Iterator<Item = Aggregate>> {
    inner: Peekable<I>,
}

pub fn coalesce_sorted<I>(aggregates: I) -> Coalesce<I::IntoIter>
where
    I: IntoIterator<Item = Aggregate>,
{
    Coalesce {
        inner: aggregates.into_iter().peekable(),
    }
}

impl<I: Iterator<Item = Aggregate>> Iterator for Coalesce<I> {
    type Item = Aggregate;

    fn next(&mut self) -> Option<Aggregate> {
        let mut acc = self.inner.next()?;
        while let Some(next) = self.inner.next_if(|a| a.key == acc.key) {
            acc.merge(&next);
        }
        Some(acc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn agg(key: i32, value: f32) -> Aggregate {
        Aggregate::from_record(&Record::new(key, &[value]))
    }

    #[test]
    fn test_coalesce_adjacent_keys() {
        let merged: Vec<Aggregate> =
            coalesce_sorted(vec![agg(1, 2.0), agg(1, 4.0), agg(2, 1.0), agg(3, 5.0), agg(3, 1.0)])
                .collect();

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].key, 1);
        assert_eq!(merged[0].count, 2);
        assert_eq!(merged[0].values[0].sum, 6.0);
        assert_eq!(merged[2].values[0].min, 1.0);
        assert_eq!(merged[2].values[0].max, 5.0);
    }

    #[test]
    fn test_coalesce_empty() {
        assert_eq!(coalesce_sorted(Vec::new()).count(), 0);
    }

    #[test]
    fn test_coalesce_does_not_merge_separated_keys() {
        let keys: Vec<i32> = coalesce_sorted(vec![agg(1, 1.0), agg(2, 1.0), agg(1, 1.0)])
            .map(|a| a.key)
            .collect();
        assert_eq!(keys, vec![1, 2, 1]);
    }
}
