//! Statistics over every stored analysis.
//!
//! Pure and read-only: the caller loads the records, `aggregate` only counts.
//! The same input always yields the same summary, ordering included.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::analysis::{AnalysisRecord, AtsVerdict};

/// Ranking cut-offs and readability band edges.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregationLimits {
    pub top_missing_keywords: usize,
    pub top_grammar_issues: usize,
    /// Readability at or below this is "Low".
    pub readability_low_max: i32,
    /// Readability above `readability_low_max` and at or below this is "Medium".
    pub readability_medium_max: i32,
}

impl Default for AggregationLimits {
    fn default() -> Self {
        Self {
            top_missing_keywords: 10,
            top_grammar_issues: 5,
            readability_low_max: 40,
            readability_medium_max: 70,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadabilityBand {
    Low,
    Medium,
    High,
}

impl ReadabilityBand {
    const ALL: [ReadabilityBand; 3] = [
        ReadabilityBand::Low,
        ReadabilityBand::Medium,
        ReadabilityBand::High,
    ];

    pub fn classify(readability_score: i32, limits: &AggregationLimits) -> Self {
        if readability_score <= limits.readability_low_max {
            ReadabilityBand::Low
        } else if readability_score <= limits.readability_medium_max {
            ReadabilityBand::Medium
        } else {
            ReadabilityBand::High
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBucket {
    /// `ceil(score / 10)`: band 1 covers 1–10, band 10 covers 91–100, band 0 holds zeros.
    pub band: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadabilityBucket {
    pub bucket: ReadabilityBand,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AtsCount {
    pub value: AtsVerdict,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarIssueCount {
    pub issue: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub total_resumes: usize,
    pub score_distribution: Vec<ScoreBucket>,
    pub readability_distribution: Vec<ReadabilityBucket>,
    pub ats_friendly_count: Vec<AtsCount>,
    pub top_missing_keywords: Vec<KeywordCount>,
    pub top_grammar_issues: Vec<GrammarIssueCount>,
}

pub fn aggregate(records: &[AnalysisRecord]) -> StatsSummary {
    aggregate_with(records, &AggregationLimits::default())
}

pub fn aggregate_with(records: &[AnalysisRecord], limits: &AggregationLimits) -> StatsSummary {
    StatsSummary {
        total_resumes: records.len(),
        score_distribution: score_distribution(records),
        readability_distribution: readability_distribution(records, limits),
        ats_friendly_count: ats_friendly_count(records),
        top_missing_keywords: rank(
            records
                .iter()
                .flat_map(|r| r.analysis.missing_keywords.iter().map(String::as_str)),
            limits.top_missing_keywords,
        )
        .into_iter()
        .map(|(keyword, count)| KeywordCount { keyword, count })
        .collect(),
        top_grammar_issues: rank(
            records
                .iter()
                .map(|r| r.analysis.grammar_issues.trim())
                .filter(|issue| !issue.is_empty()),
            limits.top_grammar_issues,
        )
        .into_iter()
        .map(|(issue, count)| GrammarIssueCount { issue, count })
        .collect(),
    }
}

/// Ceiling of `score / 10` for the stored score range.
pub fn score_band(score: i32) -> i32 {
    (score + 9).div_euclid(10)
}

fn score_distribution(records: &[AnalysisRecord]) -> Vec<ScoreBucket> {
    let mut counts: HashMap<i32, usize> = HashMap::new();
    for record in records {
        *counts.entry(score_band(record.analysis.score)).or_insert(0) += 1;
    }

    let mut buckets: Vec<ScoreBucket> = counts
        .into_iter()
        .map(|(band, count)| ScoreBucket { band, count })
        .collect();
    buckets.sort_by_key(|b| b.band);
    buckets
}

fn readability_distribution(
    records: &[AnalysisRecord],
    limits: &AggregationLimits,
) -> Vec<ReadabilityBucket> {
    ReadabilityBand::ALL
        .iter()
        .map(|band| ReadabilityBucket {
            bucket: *band,
            count: records
                .iter()
                .filter(|r| ReadabilityBand::classify(r.analysis.readability_score, limits) == *band)
                .count(),
        })
        .collect()
}

fn ats_friendly_count(records: &[AnalysisRecord]) -> Vec<AtsCount> {
    [AtsVerdict::Friendly, AtsVerdict::NotFriendly]
        .into_iter()
        .map(|value| AtsCount {
            value,
            count: records
                .iter()
                .filter(|r| r.analysis.ats_friendly == value)
                .count(),
        })
        .collect()
}

/// Counts exact-string occurrences and keeps the `limit` most frequent.
/// Equal counts keep first-encountered order.
fn rank<'a>(items: impl Iterator<Item = &'a str>, limit: usize) -> Vec<(String, usize)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut tallies: Vec<(String, usize)> = Vec::new();

    for item in items {
        match index.get(item) {
            Some(&i) => tallies[i].1 += 1,
            None => {
                index.insert(item, tallies.len());
                tallies.push((item.to_string(), 1));
            }
        }
    }

    // sort_by is stable
    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies.truncate(limit);
    tallies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::analysis::ResumeAnalysis;
    use uuid::Uuid;

    fn record(analysis: ResumeAnalysis) -> AnalysisRecord {
        AnalysisRecord::new(
            Uuid::new_v4(),
            "s3://resumes/test.pdf".to_string(),
            String::new(),
            analysis,
        )
    }

    fn with_score(score: i32) -> AnalysisRecord {
        record(ResumeAnalysis {
            score,
            ..Default::default()
        })
    }

    fn with_readability(readability_score: i32) -> AnalysisRecord {
        record(ResumeAnalysis {
            readability_score,
            ..Default::default()
        })
    }

    fn with_keywords(keywords: &[&str]) -> AnalysisRecord {
        record(ResumeAnalysis {
            missing_keywords: keywords.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        })
    }

    fn with_grammar(issue: &str) -> AnalysisRecord {
        record(ResumeAnalysis {
            grammar_issues: issue.to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_empty_collection() {
        let summary = aggregate(&[]);
        assert_eq!(summary.total_resumes, 0);
        assert!(summary.score_distribution.is_empty());
        assert!(summary.readability_distribution.iter().all(|b| b.count == 0));
        assert!(summary.ats_friendly_count.iter().all(|c| c.count == 0));
        assert!(summary.top_missing_keywords.is_empty());
        assert!(summary.top_grammar_issues.is_empty());
    }

    #[test]
    fn test_score_bands() {
        let records: Vec<_> = [5, 15, 25, 85, 92].into_iter().map(with_score).collect();
        let summary = aggregate(&records);
        let bands: Vec<(i32, usize)> = summary
            .score_distribution
            .iter()
            .map(|b| (b.band, b.count))
            .collect();
        assert_eq!(bands, vec![(1, 1), (2, 1), (3, 1), (9, 1), (10, 1)]);
    }

    #[test]
    fn test_score_band_edges() {
        assert_eq!(score_band(0), 0);
        assert_eq!(score_band(1), 1);
        assert_eq!(score_band(10), 1);
        assert_eq!(score_band(11), 2);
        assert_eq!(score_band(100), 10);
    }

    #[test]
    fn test_score_distribution_is_sorted_and_counts_duplicates() {
        let records: Vec<_> = [95, 12, 18, 95, 100].into_iter().map(with_score).collect();
        let summary = aggregate(&records);
        assert_eq!(
            summary.score_distribution,
            vec![
                ScoreBucket { band: 2, count: 2 },
                ScoreBucket { band: 10, count: 3 },
            ]
        );
    }

    #[test]
    fn test_readability_buckets() {
        let records: Vec<_> = [10, 40, 41, 70, 71, 99]
            .into_iter()
            .map(with_readability)
            .collect();
        let summary = aggregate(&records);
        let counts: Vec<(ReadabilityBand, usize)> = summary
            .readability_distribution
            .iter()
            .map(|b| (b.bucket, b.count))
            .collect();
        assert_eq!(
            counts,
            vec![
                (ReadabilityBand::Low, 2),
                (ReadabilityBand::Medium, 2),
                (ReadabilityBand::High, 2),
            ]
        );
    }

    #[test]
    fn test_ats_counts() {
        let records = vec![
            record(ResumeAnalysis {
                ats_friendly: AtsVerdict::Friendly,
                ..Default::default()
            }),
            record(ResumeAnalysis::default()),
            record(ResumeAnalysis::default()),
        ];
        let summary = aggregate(&records);
        assert_eq!(
            summary.ats_friendly_count,
            vec![
                AtsCount {
                    value: AtsVerdict::Friendly,
                    count: 1
                },
                AtsCount {
                    value: AtsVerdict::NotFriendly,
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_missing_keywords_ranked_by_occurrence() {
        let records = vec![
            with_keywords(&["SQL", "Agile"]),
            with_keywords(&["SQL"]),
            with_keywords(&["Agile", "Agile"]),
        ];
        let summary = aggregate(&records);
        assert_eq!(
            summary.top_missing_keywords,
            vec![
                KeywordCount {
                    keyword: "Agile".to_string(),
                    count: 3
                },
                KeywordCount {
                    keyword: "SQL".to_string(),
                    count: 2
                },
            ]
        );
    }

    #[test]
    fn test_keyword_ties_keep_first_encountered_order() {
        let records = vec![with_keywords(&["Docker", "AWS"]), with_keywords(&["Go"])];
        let summary = aggregate(&records);
        let keywords: Vec<&str> = summary
            .top_missing_keywords
            .iter()
            .map(|k| k.keyword.as_str())
            .collect();
        assert_eq!(keywords, vec!["Docker", "AWS", "Go"]);
    }

    #[test]
    fn test_keywords_are_grouped_by_exact_string() {
        let records = vec![with_keywords(&["sql", "SQL", "SQL"])];
        let summary = aggregate(&records);
        assert_eq!(summary.top_missing_keywords[0].keyword, "SQL");
        assert_eq!(summary.top_missing_keywords[0].count, 2);
        assert_eq!(summary.top_missing_keywords[1].keyword, "sql");
    }

    #[test]
    fn test_keyword_limit_is_ten() {
        let keywords: Vec<String> = (0..15).map(|i| format!("kw{i}")).collect();
        let refs: Vec<&str> = keywords.iter().map(String::as_str).collect();
        let summary = aggregate(&[with_keywords(&refs)]);
        assert_eq!(summary.top_missing_keywords.len(), 10);
        assert_eq!(summary.top_missing_keywords[9].keyword, "kw9");
    }

    #[test]
    fn test_grammar_issues_top_five_with_repeat_first() {
        let records = vec![
            with_grammar("Passive voice"),
            with_grammar("Missing commas"),
            with_grammar("Tense shifts"),
            with_grammar("Run-on sentences"),
            with_grammar("Spelling errors"),
            with_grammar("Tense shifts"),
        ];
        let summary = aggregate(&records);
        assert!(summary.top_grammar_issues.len() <= 5);
        assert_eq!(summary.top_grammar_issues.len(), 5);
        assert_eq!(summary.top_grammar_issues[0].issue, "Tense shifts");
        assert_eq!(summary.top_grammar_issues[0].count, 2);
        assert_eq!(summary.top_grammar_issues[1].issue, "Passive voice");
    }

    #[test]
    fn test_grammar_issue_limit_drops_least_frequent() {
        let records: Vec<_> = ["a", "b", "c", "d", "e", "f", "f"]
            .into_iter()
            .map(with_grammar)
            .collect();
        let summary = aggregate(&records);
        let issues: Vec<&str> = summary
            .top_grammar_issues
            .iter()
            .map(|g| g.issue.as_str())
            .collect();
        assert_eq!(issues, vec!["f", "a", "b", "c", "d"]);
    }

    #[test]
    fn test_blank_grammar_issues_are_not_ranked() {
        let records = vec![with_grammar(""), with_grammar("  "), with_grammar("Typos")];
        let summary = aggregate(&records);
        assert_eq!(summary.top_grammar_issues.len(), 1);
        assert_eq!(summary.top_grammar_issues[0].issue, "Typos");
    }

    #[test]
    fn test_custom_limits() {
        let limits = AggregationLimits {
            top_missing_keywords: 1,
            top_grammar_issues: 1,
            readability_low_max: 50,
            readability_medium_max: 60,
        };
        let records = vec![
            with_keywords(&["Rust", "Go", "Go"]),
            with_readability(50),
            with_readability(55),
        ];
        let summary = aggregate_with(&records, &limits);
        assert_eq!(summary.top_missing_keywords.len(), 1);
        assert_eq!(summary.top_missing_keywords[0].keyword, "Go");
        // the keyword record carries the default readability of 50
        assert_eq!(summary.readability_distribution[0].count, 2);
        assert_eq!(summary.readability_distribution[1].count, 1);
    }

    #[test]
    fn test_reaggregation_is_identical() {
        let records = vec![
            with_keywords(&["SQL", "Agile"]),
            with_score(73),
            with_grammar("Typos"),
            with_readability(88),
        ];
        let first = serde_json::to_string(&aggregate(&records)).unwrap();
        let second = serde_json::to_string(&aggregate(&records)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_summary_serializes_camel_case() {
        let value = serde_json::to_value(aggregate(&[with_score(55)])).unwrap();
        assert_eq!(value["totalResumes"], 1);
        assert_eq!(value["scoreDistribution"][0]["band"], 6);
        assert_eq!(value["readabilityDistribution"][1]["bucket"], "Medium");
        assert_eq!(value["atsFriendlyCount"][1]["value"], "false");
        assert!(value["topMissingKeywords"].as_array().unwrap().is_empty());
    }
}
