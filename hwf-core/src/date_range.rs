use chrono::NaiveDate;

/// A date range iterator that yields each date from the start date
/// through the end date (inclusive), in increasing order.
#[derive(Clone, Eq, PartialEq, Copy, Debug)]
pub struct DateRange(pub NaiveDate, pub NaiveDate);

impl DateRange {
    /// Number of days the range will yield; zero when start is after end.
    pub fn num_days(&self) -> usize {
        let days = (self.1 - self.0).num_days() + 1;
        usize::try_from(days).unwrap_or(0)
    }
}

impl Iterator for DateRange {
    type Item = NaiveDate;
    fn next(&mut self) -> Option<Self::Item> {
        if self.0 > self.1 {
            return None;
        }
        let current = self.0;
        match current.succ_opt() {
            Some(next) => self.0 = next,
            // end of the calendar: close the range behind us
            None => self.1 = current.pred_opt().unwrap_or(NaiveDate::MIN),
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let days = self.num_days();
        (days, Some(days))
    }
}

impl ExactSizeIterator for DateRange {}
