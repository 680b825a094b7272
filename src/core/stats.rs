//! Summary statistics for length distributions.

use serde::Serialize;

use crate::utils::text::count_to_f64;

/// Descriptive statistics over a set of lengths
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub min: u64,
    pub max: u64,
    pub size: usize,
    pub mean: f64,
    /// Population standard deviation
    pub sd: f64,
    pub median: f64,
    pub first_quartile: u64,
    pub third_quartile: u64,
}

impl SummaryStats {
    /// Compute statistics over `values`, returns `None` when empty
    #[must_use]
    pub fn new(values: &[u64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let mut sorted = values.to_vec();
        sorted.sort_unstable();
        let n = sorted.len();

        let total: f64 = sorted.iter().map(|&v| count_to_f64(v)).sum();
        let mean = total / count_to_f64(n as u64);
        let variance = sorted
            .iter()
            .map(|&v| (count_to_f64(v) - mean).powi(2))
            .sum::<f64>()
            / count_to_f64(n as u64);

        let median = if n % 2 == 1 {
            count_to_f64(sorted[n / 2])
        } else {
            (count_to_f64(sorted[n / 2 - 1]) + count_to_f64(sorted[n / 2])) / 2.0
        };

        Some(Self {
            title: None,
            min: sorted[0],
            max: sorted[n - 1],
            size: n,
            mean,
            sd: variance.sqrt(),
            median,
            first_quartile: sorted[n / 4],
            third_quartile: sorted[n * 3 / 4],
        })
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl std::fmt::Display for SummaryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(title) = &self.title {
            write!(f, "{title}: ")?;
        }
        write!(
            f,
            "Min={} Max={} N={} Mean={:.5} SD={:.5} Median={:.5}",
            self.min, self.max, self.size, self.mean, self.sd, self.median
        )
    }
}

/// N50 and L50 of a set of sequence lengths.
///
/// N50 is the length of the shortest sequence in the smallest set of
/// longest sequences covering at least half of the total; L50 is the size
/// of that set. Returns `None` for an empty input.
///
/// ```
/// use genokit::core::stats::n50;
///
/// assert_eq!(n50(&[2, 2, 2, 3, 3, 4, 8, 8]), Some((8, 2)));
/// ```
#[must_use]
pub fn n50(lengths: &[u64]) -> Option<(u64, usize)> {
    let total: u64 = lengths.iter().sum();
    if lengths.is_empty() || total == 0 {
        return None;
    }

    let mut sorted = lengths.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));

    let mut cumulative = 0;
    for (i, &len) in sorted.iter().enumerate() {
        cumulative += len;
        if cumulative * 2 >= total {
            return Some((len, i + 1));
        }
    }
    None
}
