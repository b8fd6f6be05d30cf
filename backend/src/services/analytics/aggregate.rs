//! Folding of score records into the analytics dashboard.
//!
//! Pure over its input: the handler loads the course's records, this module
//! only does arithmetic. `today` is passed in so the 7-day window is
//! deterministic under test.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use common::model::analytics::{
    AnalyticsData, PerformanceItem, StudentMetric, StudentTrend, TopicItem,
};
use std::collections::HashMap;

const PERFORMANCE_DAYS: i64 = 7;
const MAX_TOPICS: usize = 8;
const TOPIC_PENALTY: f64 = 45.0;
const TREND_WINDOW: usize = 3;
const TREND_THRESHOLD: f64 = 2.0;
const REGULAR_SUBMISSIONS: usize = 3;

/// One scored attempt: a quiz result or a scored assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreRecord {
    pub student_name: String,
    pub score: f64,
    pub date: DateTime<Utc>,
    pub weak_topics: Vec<String>,
}

pub fn aggregate(records: &[ScoreRecord], today: NaiveDate) -> AnalyticsData {
    let mut chronological: Vec<&ScoreRecord> = records.iter().collect();
    chronological.sort_by_key(|r| r.date);

    AnalyticsData {
        performance: performance(&chronological, today),
        topics: topics(&chronological),
        students: students(&chronological),
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

fn color_key(score: i64) -> &'static str {
    if score >= 80 {
        "green"
    } else if score >= 60 {
        "yellow"
    } else {
        "red"
    }
}

fn performance(records: &[&ScoreRecord], today: NaiveDate) -> Vec<PerformanceItem> {
    (0..PERFORMANCE_DAYS)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let scores: Vec<f64> = records
                .iter()
                .filter(|r| r.date.date_naive() == day)
                .map(|r| r.score)
                .collect();
            PerformanceItem {
                name: day.format("%Y-%m-%d").to_string(),
                value: mean(&scores).map_or(0, |m| m.round_ties_even() as i64),
            }
        })
        .collect()
}

fn topics(records: &[&ScoreRecord]) -> Vec<TopicItem> {
    if records.is_empty() {
        return Vec::new();
    }

    let mut counts: HashMap<&str, usize> = HashMap::new();
    for topic in records.iter().flat_map(|r| r.weak_topics.iter()) {
        let topic = topic.trim();
        if !topic.is_empty() {
            *counts.entry(topic).or_default() += 1;
        }
    }

    if counts.is_empty() {
        let scores: Vec<f64> = records.iter().map(|r| r.score).collect();
        let average = mean(&scores).map_or(0, |m| m.round_ties_even() as i64).clamp(0, 100);
        let regularity = (records.len() as i64 * 5).min(100);
        return vec![
            TopicItem {
                name: "Overall average".to_string(),
                score: average,
                color_key: color_key(average).to_string(),
            },
            TopicItem {
                name: "Regularity".to_string(),
                score: regularity,
                color_key: color_key(regularity).to_string(),
            },
        ];
    }

    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.truncate(MAX_TOPICS);
    let max_count = ranked.first().map_or(1, |(_, count)| *count) as f64;

    ranked
        .into_iter()
        .map(|(name, count)| {
            let score = (100.0 - count as f64 / max_count * TOPIC_PENALTY)
                .round_ties_even()
                .clamp(0.0, 100.0) as i64;
            TopicItem {
                name: name.to_string(),
                score,
                color_key: color_key(score).to_string(),
            }
        })
        .collect()
}

fn trend(scores: &[f64]) -> StudentTrend {
    let split = scores.len().saturating_sub(TREND_WINDOW);
    let (earlier, latest) = scores.split_at(split);
    let previous = &earlier[earlier.len().saturating_sub(TREND_WINDOW)..];
    match (mean(latest), mean(previous)) {
        (Some(latest), Some(previous)) => {
            let delta = latest - previous;
            if delta >= TREND_THRESHOLD {
                StudentTrend::Up
            } else if delta <= -TREND_THRESHOLD {
                StudentTrend::Down
            } else {
                StudentTrend::Neutral
            }
        }
        _ => StudentTrend::Neutral,
    }
}

/// Status label and display color for an average score.
fn classify(average: f64, regular: bool) -> (String, &'static str) {
    let (label, color, annotate) = if average >= 85.0 {
        ("excellent", "green", true)
    } else if average >= 70.0 {
        ("good", "blue", true)
    } else if average >= 50.0 {
        ("satisfactory", "yellow", false)
    } else {
        ("needs attention", "red", false)
    };
    if regular && annotate {
        (format!("{} (regular)", label), color)
    } else {
        (label.to_string(), color)
    }
}

fn students(records: &[&ScoreRecord]) -> Vec<StudentMetric> {
    // Display name is the first spelling seen; grouping ignores case.
    let mut order: Vec<(String, String)> = Vec::new();
    let mut scores: HashMap<String, Vec<f64>> = HashMap::new();
    for record in records {
        let display = record.student_name.trim();
        let key = display.to_lowercase();
        if !scores.contains_key(&key) {
            order.push((key.clone(), display.to_string()));
        }
        scores.entry(key).or_default().push(record.score);
    }

    let mut metrics: Vec<StudentMetric> = order
        .into_iter()
        .map(|(key, name)| {
            let history = scores.remove(&key).unwrap_or_default();
            let average = mean(&history).unwrap_or(0.0);
            let regular = history.len() >= REGULAR_SUBMISSIONS;
            let (status, color) = classify(average, regular);
            StudentMetric {
                id: 0,
                name,
                status,
                progress: (average * 10.0).round_ties_even() / 10.0,
                trend: trend(&history),
                color: color.to_string(),
                submissions: history.len(),
                regular,
            }
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.progress
            .total_cmp(&a.progress)
            .then_with(|| a.name.cmp(&b.name))
    });
    for (index, metric) in metrics.iter_mut().enumerate() {
        metric.id = index + 1;
    }
    metrics
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0).unwrap()
    }

    fn record(name: &str, score: f64, date: DateTime<Utc>, topics: &[&str]) -> ScoreRecord {
        ScoreRecord {
            student_name: name.to_string(),
            score,
            date,
            weak_topics: topics.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 10).unwrap()
    }

    #[test]
    fn empty_input_still_has_seven_days() {
        let data = aggregate(&[], today());
        assert_eq!(data.performance.len(), 7);
        assert!(data.performance.iter().all(|p| p.value == 0));
        assert_eq!(data.performance[0].name, "2024-05-04");
        assert_eq!(data.performance[6].name, "2024-05-10");
        assert!(data.topics.is_empty());
        assert!(data.students.is_empty());
    }

    #[test]
    fn performance_buckets_by_day_and_ignores_older_records() {
        let records = vec![
            record("a", 80.0, at(10, 9), &[]),
            record("b", 91.0, at(10, 15), &[]),
            record("c", 40.0, at(8, 12), &[]),
            record("d", 100.0, at(1, 12), &[]),
        ];
        let data = aggregate(&records, today());
        let values: Vec<i64> = data.performance.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![0, 0, 0, 0, 40, 0, 86]);
    }

    #[test]
    fn daily_means_round_half_to_even() {
        let records = vec![
            record("a", 80.0, at(10, 9), &[]),
            record("b", 85.0, at(10, 10), &[]),
            record("c", 70.0, at(9, 9), &[]),
            record("d", 71.0, at(9, 10), &[]),
        ];
        let data = aggregate(&records, today());
        assert_eq!(data.performance[6].value, 82);
        assert_eq!(data.performance[5].value, 70);
    }

    #[test]
    fn topics_rank_by_frequency_and_penalise_the_most_common() {
        let records = vec![
            record("a", 50.0, at(9, 9), &["Fractions", "Decimals"]),
            record("b", 60.0, at(9, 10), &["Fractions"]),
            record("c", 70.0, at(9, 11), &["Fractions", "Angles"]),
            record("d", 70.0, at(9, 12), &["Decimals"]),
        ];
        let data = aggregate(&records, today());
        let names: Vec<&str> = data.topics.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Fractions", "Decimals", "Angles"]);
        assert_eq!(data.topics[0].score, 55);
        assert_eq!(data.topics[0].color_key, "red");
        assert_eq!(data.topics[1].score, 70);
        assert_eq!(data.topics[1].color_key, "yellow");
        assert_eq!(data.topics[2].score, 85);
        assert_eq!(data.topics[2].color_key, "green");
    }

    #[test]
    fn topics_are_capped_at_eight() {
        let topics: Vec<String> = (0..12).map(|i| format!("Topic {:02}", i)).collect();
        let refs: Vec<&str> = topics.iter().map(String::as_str).collect();
        let data = aggregate(&[record("a", 10.0, at(9, 9), &refs)], today());
        assert_eq!(data.topics.len(), 8);
        assert_eq!(data.topics[0].name, "Topic 00");
    }

    #[test]
    fn no_topic_data_falls_back_to_average_and_regularity() {
        let records = vec![
            record("a", 90.0, at(9, 9), &[]),
            record("b", 70.0, at(9, 10), &[]),
        ];
        let data = aggregate(&records, today());
        assert_eq!(data.topics.len(), 2);
        assert_eq!(data.topics[0].name, "Overall average");
        assert_eq!(data.topics[0].score, 80);
        assert_eq!(data.topics[0].color_key, "green");
        assert_eq!(data.topics[1].name, "Regularity");
        assert_eq!(data.topics[1].score, 10);
        assert_eq!(data.topics[1].color_key, "red");
    }

    #[test]
    fn students_group_case_insensitively_and_sort_by_average() {
        let records = vec![
            record("  Alice ", 90.0, at(5, 9), &[]),
            record("ALICE", 80.0, at(6, 9), &[]),
            record("Bob", 95.0, at(6, 10), &[]),
            record("alice", 100.0, at(7, 9), &[]),
            record("Carol", 40.0, at(7, 10), &[]),
        ];
        let data = aggregate(&records, today());
        let names: Vec<&str> = data.students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Alice", "Carol"]);

        let alice = &data.students[1];
        assert_eq!(alice.id, 2);
        assert_eq!(alice.submissions, 3);
        assert!(alice.regular);
        assert_eq!(alice.progress, 90.0);
        assert_eq!(alice.status, "excellent (regular)");
        assert_eq!(alice.trend, StudentTrend::Neutral);

        assert_eq!(data.students[0].status, "excellent");
        assert!(!data.students[0].regular);
        assert_eq!(data.students[2].status, "needs attention");
        assert_eq!(data.students[2].color, "red");
    }

    #[test]
    fn trend_compares_latest_three_with_the_three_before() {
        assert_eq!(trend(&[50.0]), StudentTrend::Neutral);
        assert_eq!(trend(&[50.0, 60.0, 70.0]), StudentTrend::Neutral);
        assert_eq!(trend(&[50.0, 60.0, 70.0, 80.0]), StudentTrend::Up);
        assert_eq!(trend(&[90.0, 90.0, 90.0, 80.0, 80.0, 80.0]), StudentTrend::Down);
        assert_eq!(trend(&[10.0, 80.0, 80.0, 80.0, 81.0, 81.0, 81.0]), StudentTrend::Neutral);
        assert_eq!(trend(&[70.0, 72.0]), StudentTrend::Neutral);
        assert_eq!(trend(&[70.0, 72.0, 72.0, 72.0]), StudentTrend::Up);
        assert_eq!(trend(&[70.0, 71.0, 71.0, 71.0]), StudentTrend::Neutral);
    }

    #[test]
    fn satisfactory_regular_students_keep_the_plain_label() {
        let records: Vec<ScoreRecord> = (1..=4)
            .map(|d| record("Dan", 60.0, at(d, 9), &[]))
            .collect();
        let data = aggregate(&records, today());
        assert_eq!(data.students[0].status, "satisfactory");
        assert!(data.students[0].regular);
        assert_eq!(data.students[0].progress, 60.0);
    }
}
