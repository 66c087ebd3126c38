//! Cost outlier classification
//!
//! Flags every item whose cost is at or above the mean cost of its set and
//! orders the set by descending cost.

use crate::services::plan_analyzer::models::CostedItem;

pub struct CostClassifier;

impl CostClassifier {
    /// Arithmetic mean of the costs, `None` for an empty set.
    ///
    /// Accumulated as a running mean, so a set of identical costs has exactly
    /// that cost as its mean.
    pub fn mean_cost<T: CostedItem>(items: &[T]) -> Option<f64> {
        if items.is_empty() {
            return None;
        }
        let mean = items
            .iter()
            .enumerate()
            .fold(0.0, |mean, (i, item)| mean + (item.cost() - mean) / (i + 1) as f64);
        Some(mean)
    }

    /// Rebuild the set with the above-average flag filled in, sorted by
    /// descending cost. Equal costs keep their input order.
    pub fn classify<T: CostedItem>(items: Vec<T>) -> Vec<T> {
        let Some(mean) = Self::mean_cost(&items) else {
            return items;
        };

        let mut classified: Vec<T> = items
            .into_iter()
            .map(|item| {
                let above = item.cost() >= mean;
                item.with_above_average(above)
            })
            .collect();

        classified.sort_by(|a, b| b.cost().total_cmp(&a.cost()));
        classified
    }
}
