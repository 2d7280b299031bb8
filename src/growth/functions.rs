//! The impls and functions
//!
use regex::Regex;
use crate::growth::{Census, GrowthEntry, GrowthReport, PeakTable};

/// Compare a census with the peaks an observer has seen before.
///
/// Every type whose current count is higher than its recorded peak (a missing peak counts as 0)
/// gets an entry with the difference, and its peak is raised to the current count.
/// Counts equal to or lower than the peak are skipped, a peak never goes down.
///
/// The entries are sorted by growth, biggest first. The sort is stable, so entries with the same
/// growth keep the census order. `prior_peaks` is not changed; the new peaks are returned and it's up
/// to the caller to store them.
pub fn compute_growth(
    census: &Census,
    prior_peaks: &PeakTable,
) -> (GrowthReport, PeakTable)
{
    let mut updated_peaks = prior_peaks.clone();
    let mut entries: Vec<GrowthEntry> = Vec::new();

    for (name, count) in census
    {
        let old_count = updated_peaks.get(name).copied().unwrap_or_default();
        if *count > old_count
        {
            entries.push(GrowthEntry {
                type_name: name.clone(),
                delta: count - old_count,
            });
            updated_peaks.insert(name.clone(), *count);
        }
    }

    entries.sort_by(|a, b| b.delta.cmp(&a.delta));

    (GrowthReport { entries }, updated_peaks)
}

impl GrowthReport {
    pub fn new() -> Self { Default::default() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
    pub fn len(&self) -> usize { self.entries.len() }
    /// Sum of all deltas in the report.
    pub fn total_growth(&self) -> u64 {
        self.entries.iter().map(|entry| entry.delta).sum()
    }
    /// Keep the entries with a type name matching `type_name_filter`, in the same order.
    pub fn filtered(
        &self,
        type_name_filter: &Regex,
    ) -> GrowthReport
    {
        GrowthReport {
            entries: self.entries
                .iter()
                .filter(|entry| type_name_filter.is_match(&entry.type_name))
                .cloned()
                .collect(),
        }
    }
    /// The first `number` entries, which are the ones with the biggest growth.
    pub fn top(
        &self,
        number: usize,
    ) -> GrowthReport
    {
        GrowthReport {
            entries: self.entries.iter().take(number).cloned().collect(),
        }
    }
}
