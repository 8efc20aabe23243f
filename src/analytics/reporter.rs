//! Usage report over the interaction log.
//!
//! Summarizes how often each output was computed, how often it came back
//! empty, and its average compute time.

use std::collections::HashMap;

use crate::analytics::events::InteractionEvent;

/// Per-output usage statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputUsage {
    pub dashboard: String,
    pub output: String,
    pub count: usize,
    /// Invocations that had nothing to show.
    pub empty: usize,
    pub avg_duration_us: f64,
}

impl OutputUsage {
    /// Share of invocations that had nothing to show, as a percentage.
    pub fn empty_pct(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.empty as f64 / self.count as f64) * 100.0
        }
    }
}

/// Group events by (dashboard, output).
///
/// Returns sorted by invocation count (descending), then output id.
pub fn usage_by_output(events: &[InteractionEvent]) -> Vec<OutputUsage> {
    let mut groups: HashMap<(&str, &str), Vec<&InteractionEvent>> = HashMap::new();
    for event in events {
        groups
            .entry((event.dashboard.as_str(), event.output.as_str()))
            .or_default()
            .push(event);
    }

    let mut usage: Vec<OutputUsage> = groups
        .into_iter()
        .map(|((dashboard, output), group)| {
            let count = group.len();
            let total_us: u64 = group.iter().map(|e| e.duration_us).sum();
            OutputUsage {
                dashboard: dashboard.to_string(),
                output: output.to_string(),
                count,
                empty: group.iter().filter(|e| e.empty).count(),
                avg_duration_us: if count == 0 {
                    0.0
                } else {
                    total_us as f64 / count as f64
                },
            }
        })
        .collect();

    usage.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.output.cmp(&b.output)));
    usage
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::ControlValues;

    fn event(output: &str, charts: usize, empty: bool, duration_us: u64) -> InteractionEvent {
        InteractionEvent {
            timestamp: "2025-01-15T10:00:00+00:00".to_string(),
            dashboard: "sales".to_string(),
            output: output.to_string(),
            values: ControlValues::new(),
            charts,
            empty,
            duration_us,
        }
    }

    #[test]
    fn groups_and_sorts_by_count() {
        let events = vec![
            event("output-container", 4, false, 100),
            event("select-year-disabled", 0, false, 2),
            event("output-container", 0, true, 50),
            event("output-container", 4, false, 150),
        ];
        let usage = usage_by_output(&events);

        assert_eq!(usage.len(), 2);
        assert_eq!(usage[0].output, "output-container");
        assert_eq!(usage[0].count, 3);
        assert_eq!(usage[0].empty, 1);
        assert!((usage[0].avg_duration_us - 100.0).abs() < f64::EPSILON);
        assert!((usage[0].empty_pct() - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn control_state_outputs_are_not_empty() {
        let events = vec![
            event("select-year-disabled", 0, false, 2),
            event("select-year-disabled", 0, false, 3),
        ];
        let usage = usage_by_output(&events);
        assert_eq!(usage[0].empty, 0);
        assert_eq!(usage[0].empty_pct(), 0.0);
    }

    #[test]
    fn pointless_charts_count_as_empty() {
        let events = vec![
            event("success-pie-chart", 1, true, 10),
            event("success-pie-chart", 1, false, 10),
        ];
        assert_eq!(usage_by_output(&events)[0].empty, 1);
    }

    #[test]
    fn empty_log_gives_no_usage() {
        assert!(usage_by_output(&[]).is_empty());
    }
}
