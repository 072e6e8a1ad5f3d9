use serde::Serialize;

/// Descriptive statistics over the valid entries of a numeric series
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStatistics {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divisor `count`)
    pub standard_deviation: f64,
}

/// Compute statistics, ignoring `None` and NaN entries.
///
/// Returns `None` when no valid entry remains. Values are full precision;
/// rounding is left to [`SummaryStatistics::report`] or the caller.
pub fn compute_statistics(values: &[Option<f64>]) -> Option<SummaryStatistics> {
    let valid: Vec<f64> = values
        .iter()
        .filter_map(|v| *v)
        .filter(|v| !v.is_nan())
        .collect();
    if valid.is_empty() {
        return None;
    }

    let count = valid.len();
    let n = count as f64;
    let min = valid.iter().copied().fold(f64::INFINITY, f64::min);
    let max = valid.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = valid.iter().sum::<f64>() / n;

    let mut sorted = valid.clone();
    sorted.sort_by(f64::total_cmp);
    let mid = count / 2;
    let median = if count % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    };

    let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(SummaryStatistics {
        count,
        min,
        max,
        mean,
        median,
        standard_deviation: variance.sqrt(),
    })
}

impl SummaryStatistics {
    /// Format as a multi-line report with two decimals.
    pub fn report(&self, field: &str) -> String {
        format!(
            "Variable: {}\nCount (N): {}\nMin: {:.2}\nMax: {:.2}\nMean: {:.2}\nMedian: {:.2}\nStd. Deviation: {:.2}\n",
            field, self.count, self.min, self.max, self.mean, self.median, self.standard_deviation
        )
    }
}
