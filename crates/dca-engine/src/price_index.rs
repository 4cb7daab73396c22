//! Price Series Index
//!
//! Buckets raw samples into one price per UTC calendar day and answers
//! "what did it cost on day X" with last-known-price carry-forward.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::model::PriceSample;

/// Immutable day -> price lookup built from a raw sample sequence.
///
/// Samples are sorted by timestamp (stable, so identical timestamps keep
/// input order) and the first price seen for each day wins.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PriceIndex {
    days: Vec<(NaiveDate, Decimal)>,
}

impl PriceIndex {
    pub fn new(samples: &[PriceSample]) -> Self {
        let mut sorted: Vec<&PriceSample> = samples.iter().collect();
        sorted.sort_by_key(|s| s.timestamp_ms);

        let mut days: Vec<(NaiveDate, Decimal)> = Vec::with_capacity(sorted.len());
        for sample in sorted {
            let Some(day) = sample.day() else {
                tracing::warn!(timestamp_ms = sample.timestamp_ms, "dropping sample with out-of-range timestamp");
                continue;
            };
            if days.last().is_some_and(|(last, _)| *last == day) {
                continue;
            }
            days.push((day, sample.price));
        }

        Self { days }
    }

    /// Day buckets in ascending order
    pub fn days(&self) -> &[(NaiveDate, Decimal)] {
        &self.days
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Number of distinct days
    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn first_price(&self) -> Option<Decimal> {
        self.days.first().map(|(_, p)| *p)
    }

    pub fn last_price(&self) -> Option<Decimal> {
        self.days.last().map(|(_, p)| *p)
    }

    pub fn first_day(&self) -> Option<NaiveDate> {
        self.days.first().map(|(d, _)| *d)
    }

    pub fn last_day(&self) -> Option<NaiveDate> {
        self.days.last().map(|(d, _)| *d)
    }

    /// Price recorded for exactly `day`
    pub fn exact(&self, day: NaiveDate) -> Option<Decimal> {
        self.days
            .binary_search_by_key(&day, |(d, _)| *d)
            .ok()
            .map(|i| self.days[i].1)
    }

    /// First bucket on or after `day`
    pub fn first_at_or_after(&self, day: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        let i = self.days.partition_point(|(d, _)| *d < day);
        self.days.get(i).copied()
    }

    /// Last bucket on or before `day`
    pub fn last_at_or_before(&self, day: NaiveDate) -> Option<(NaiveDate, Decimal)> {
        let i = self.days.partition_point(|(d, _)| *d <= day);
        i.checked_sub(1).map(|i| self.days[i])
    }

    /// Buckets within `[from, to]`
    pub fn range(&self, from: NaiveDate, to: NaiveDate) -> &[(NaiveDate, Decimal)] {
        let lo = self.days.partition_point(|(d, _)| *d < from);
        let hi = self.days.partition_point(|(d, _)| *d <= to);
        if lo >= hi { &[] } else { &self.days[lo..hi] }
    }

    /// Forward-sweeping lookup that returns `seed` until a sample is reached
    pub fn cursor(&self, seed: Decimal) -> PriceCursor<'_> {
        PriceCursor {
            index: self,
            seed,
            position: 0,
            last_known: seed,
            last_query: None,
        }
    }
}

/// Running "last known price" over monotonically advancing dates.
///
/// Each query consumes every bucket up to and including the requested day,
/// so a full simulation costs O(days + steps). A query earlier than the
/// previous one restarts the sweep.
#[derive(Debug)]
pub struct PriceCursor<'a> {
    index: &'a PriceIndex,
    seed: Decimal,
    position: usize,
    last_known: Decimal,
    last_query: Option<NaiveDate>,
}

impl PriceCursor<'_> {
    pub fn price_on(&mut self, day: NaiveDate) -> Decimal {
        if self.last_query.is_some_and(|prev| day < prev) {
            self.position = 0;
            self.last_known = self.seed;
        }

        let days = &self.index.days;
        while let Some((bucket, price)) = days.get(self.position) {
            if *bucket > day {
                break;
            }
            self.last_known = *price;
            self.position += 1;
        }

        self.last_query = Some(day);
        self.last_known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample(day: u32, price: Decimal) -> PriceSample {
        PriceSample::at_date(date(2020, 1, day), price)
    }

    #[test]
    fn test_sorts_and_keeps_first_per_day() {
        let later_same_day = PriceSample::new(sample(2, dec!(0)).timestamp_ms + 3_600_000, dec!(250));
        let index = PriceIndex::new(&[
            sample(3, dec!(300)),
            later_same_day,
            sample(2, dec!(200)),
            sample(3, dec!(999)),
        ]);

        assert_eq!(index.len(), 2);
        assert_eq!(index.exact(date(2020, 1, 2)), Some(dec!(200)));
        assert_eq!(index.exact(date(2020, 1, 3)), Some(dec!(300)));
        assert_eq!(index.first_price(), Some(dec!(200)));
        assert_eq!(index.last_price(), Some(dec!(300)));
    }

    #[test]
    fn test_cursor_carries_forward() {
        let index = PriceIndex::new(&[sample(1, dec!(100)), sample(10, dec!(200))]);
        let mut cursor = index.cursor(dec!(1));

        assert_eq!(cursor.price_on(date(2019, 12, 31)), dec!(1));
        assert_eq!(cursor.price_on(date(2020, 1, 1)), dec!(100));
        assert_eq!(cursor.price_on(date(2020, 1, 9)), dec!(100));
        assert_eq!(cursor.price_on(date(2020, 1, 10)), dec!(200));
        assert_eq!(cursor.price_on(date(2020, 2, 1)), dec!(200));
    }

    #[test]
    fn test_cursor_sees_samples_between_steps() {
        let index = PriceIndex::new(&[sample(1, dec!(100)), sample(5, dec!(150))]);
        let mut cursor = index.cursor(dec!(100));

        assert_eq!(cursor.price_on(date(2020, 1, 1)), dec!(100));
        assert_eq!(cursor.price_on(date(2020, 1, 8)), dec!(150));
    }

    #[test]
    fn test_cursor_restarts_when_moved_backwards() {
        let index = PriceIndex::new(&[sample(1, dec!(100)), sample(10, dec!(200))]);
        let mut cursor = index.cursor(dec!(7));

        assert_eq!(cursor.price_on(date(2020, 1, 15)), dec!(200));
        assert_eq!(cursor.price_on(date(2020, 1, 2)), dec!(100));
    }

    #[test]
    fn test_empty_index_returns_seed() {
        let index = PriceIndex::new(&[]);
        let mut cursor = index.cursor(dec!(42000));
        assert!(index.is_empty());
        assert_eq!(cursor.price_on(date(2020, 1, 1)), dec!(42000));
        assert_eq!(index.first_at_or_after(date(2020, 1, 1)), None);
    }

    #[test]
    fn test_range_queries() {
        let index = PriceIndex::new(&[sample(1, dec!(1)), sample(5, dec!(5)), sample(9, dec!(9))]);
        assert_eq!(index.first_at_or_after(date(2020, 1, 2)), Some((date(2020, 1, 5), dec!(5))));
        assert_eq!(index.last_at_or_before(date(2020, 1, 8)), Some((date(2020, 1, 5), dec!(5))));
        assert_eq!(index.last_at_or_before(date(2019, 1, 1)), None);
        assert_eq!(index.range(date(2020, 1, 2), date(2020, 1, 9)).len(), 2);
        assert!(index.range(date(2020, 1, 6), date(2020, 1, 2)).is_empty());
    }
}
