//! Metric extraction from captured benchmark output.
//!
//! The benchmark's output is scanned line by line for four labeled numeric
//! fields; the first line matching a label wins. The four fields are
//! independent: a missing label leaves only that field unset. Matched
//! values pass through as text, no unit conversion.

/// Labels the extractor scans for. The latency label is configurable
/// because real benchmark output carries several similarly labeled latency
/// lines (Median/AVG/MIN/MAX) and their order is not stable across toolkit
/// versions.
#[derive(Debug, Clone)]
pub struct MetricLabels {
    pub count: String,
    pub duration: String,
    pub latency: String,
    pub throughput: String,
}

impl MetricLabels {
    pub fn with_latency(latency: impl Into<String>) -> Self {
        Self {
            latency: latency.into(),
            ..Self::default()
        }
    }
}

impl Default for MetricLabels {
    fn default() -> Self {
        Self {
            count: "Count:".to_string(),
            duration: "Duration:".to_string(),
            latency: "AVG:".to_string(),
            throughput: "Throughput:".to_string(),
        }
    }
}

/// The four extracted fields of one run, each independently optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metrics {
    pub count: Option<String>,
    pub duration: Option<String>,
    pub latency: Option<String>,
    pub throughput: Option<String>,
}

/// Scans one run's captured text for all four fields.
pub fn extract_metrics(text: &str, labels: &MetricLabels) -> Metrics {
    Metrics {
        count: find_metric(text, &labels.count),
        duration: find_metric(text, &labels.duration),
        latency: find_metric(text, &labels.latency),
        throughput: find_metric(text, &labels.throughput),
    }
}

/// First-match-wins scan for `label` followed by whitespace and a numeric
/// token.
fn find_metric(text: &str, label: &str) -> Option<String> {
    text.lines().find_map(|line| value_after_label(line, label))
}

/// Looks for `label` in `line`; a hit needs at least one whitespace
/// character after the label and then a token of digits and dots. Label
/// occurrences without such a suffix are skipped in favor of later
/// occurrences on the same line.
fn value_after_label(line: &str, label: &str) -> Option<String> {
    if label.is_empty() {
        return None;
    }

    let mut search_from = 0;
    while let Some(found) = line[search_from..].find(label) {
        let after = search_from + found + label.len();
        let rest = &line[after..];

        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() {
            let numeric: String = trimmed
                .chars()
                .take_while(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            if !numeric.is_empty() {
                return Some(numeric);
            }
        }

        search_from = after;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
[ INFO ] First inference took 12.34 ms
Count:          1000 iterations
Duration:       5123.45 ms
Latency:
    Median:     4.90 ms
    AVG:        5.12 ms
    MIN:        4.50 ms
    MAX:        9.80 ms
Throughput:     195.18 FPS
";

    #[test]
    fn extracts_all_four_fields() {
        let metrics = extract_metrics(SAMPLE, &MetricLabels::default());
        assert_eq!(metrics.count.as_deref(), Some("1000"));
        assert_eq!(metrics.duration.as_deref(), Some("5123.45"));
        assert_eq!(metrics.latency.as_deref(), Some("5.12"));
        assert_eq!(metrics.throughput.as_deref(), Some("195.18"));
    }

    #[test]
    fn fields_are_independent() {
        let text = "Throughput:   88.5 FPS\n";
        let metrics = extract_metrics(text, &MetricLabels::default());
        assert_eq!(metrics.throughput.as_deref(), Some("88.5"));
        assert_eq!(metrics.count, None);
        assert_eq!(metrics.duration, None);
        assert_eq!(metrics.latency, None);
    }

    #[test]
    fn first_matching_line_wins() {
        let text = "Count:  10\nCount:  20\n";
        assert_eq!(find_metric(text, "Count:").as_deref(), Some("10"));
    }

    #[test]
    fn label_without_numeric_suffix_is_not_a_match() {
        let text = "Count: pending\nCount:   42\n";
        assert_eq!(find_metric(text, "Count:").as_deref(), Some("42"));
    }

    #[test]
    fn whitespace_after_label_is_required() {
        assert_eq!(value_after_label("Count:42", "Count:"), None);
        assert_eq!(
            value_after_label("Count: 42", "Count:").as_deref(),
            Some("42")
        );
    }

    #[test]
    fn alternate_latency_label() {
        let labels = MetricLabels::with_latency("Median:");
        let metrics = extract_metrics(SAMPLE, &labels);
        assert_eq!(metrics.latency.as_deref(), Some("4.90"));
    }

    #[test]
    fn later_occurrence_on_the_same_line_can_match() {
        let line = "AVG:, then the value AVG:   7.5 ms";
        assert_eq!(value_after_label(line, "AVG:").as_deref(), Some("7.5"));
    }

    #[test]
    fn empty_text_matches_nothing() {
        assert_eq!(extract_metrics("", &MetricLabels::default()), Metrics::default());
    }
}
