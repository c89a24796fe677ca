//! Resume ↔ job description alignment metrics.
//!
//! Deliberately heuristic and stable: marker vocabularies and fuzzy matching, no model calls.

use std::collections::BTreeSet;

use rapidfuzz::fuzz;
use serde::{Deserialize, Serialize};

use crate::analysis::keywords::{extract_keywords, DEFAULT_MAX_KEYWORDS};
use crate::analysis::text::{extract_resume_items, strip_latex_commands};

/// Fuzzy similarity at or above which a keyword counts as present.
const KEYWORD_MATCH_THRESHOLD: f64 = 0.90;
const MAX_POINTS_PER_BULLET: usize = 4;

const TECH_MARKERS: &[&str] = &[
    "implemented", "designed", "built", "integrated", "debugged", "validated", "tested",
    "deployed", "docker", "linux", "kernel", "driver", "fastapi", "postgresql", "jwt", "oauth",
    "alembic", "openapi", "api", "rest", "ci", "cd", "pipeline", "cache", "rate", "limit",
    "schema", "migration", "auth", "memory", "mapped", "interrupt", "timer", "latency",
    "throughput", "gdb", "gcc", "clang",
];

const VALIDATION_MARKERS: &[&str] = &[
    "test", "tested", "testing", "validated", "verification", "benchmark", "unit", "integration",
    "regression", "coverage", "assert", "gtest", "pytest", "ci",
];

const SOFT_FLUFF: &[&str] = &[
    "collaborated", "cross-functional", "stakeholders", "communication", "team", "worked with",
];

const CONSTRAINT_MARKERS: &[&str] = &[
    "latency", "throughput", "ms", "hz", "kb", "mb", "gb", "%", "can", "ethernet", "tcp", "udp",
];

const ARCHITECTURE_MARKERS: &[&str] = &[
    "schema", "migration", "driver", "kernel", "device", "api", "rate limit", "auth",
    "ownership", "memory-mapped", "interrupt", "pipeline",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Low,
    Med,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// 0–10, one decimal.
    pub signal_density: f64,
    pub technical_specificity: Level,
    /// Percentage of job description keywords found in the resume, one decimal.
    pub keyword_alignment: f64,
    pub redundancy: Level,
    pub matched_keywords: Vec<String>,
    pub missing_keywords: Vec<String>,
    pub bullet_count: usize,
    pub avg_bullet_length: f64,
    pub word_count: usize,
}

/// Full metric set for a LaTeX resume against a job description.
pub fn compute_metrics(resume_latex: &str, job_description: &str) -> Metrics {
    let bullets: Vec<String> = extract_resume_items(resume_latex)
        .iter()
        .map(|b| strip_latex_commands(b))
        .collect();
    let keywords = extract_keywords(job_description, DEFAULT_MAX_KEYWORDS);
    let resume_plain = strip_latex_commands(resume_latex);

    let (keyword_alignment, matched_keywords, missing_keywords) =
        keyword_alignment(&resume_plain, &keywords);

    let total_words: usize = bullets.iter().map(|b| b.split_whitespace().count()).sum();
    let avg_bullet_length = round1(total_words as f64 / bullets.len().max(1) as f64);

    Metrics {
        signal_density: signal_density_score(&bullets),
        technical_specificity: technical_specificity_level(&bullets),
        keyword_alignment,
        redundancy: redundancy_level(&bullets),
        matched_keywords,
        missing_keywords,
        bullet_count: bullets.len(),
        avg_bullet_length,
        word_count: resume_plain.split_whitespace().count(),
    }
}

/// Percentage of `keywords` present in `resume_text`, plus the matched and missing lists.
/// Multi-word keywords match on containment; everything else on fuzzy partial similarity.
pub fn keyword_alignment(
    resume_text: &str,
    keywords: &[String],
) -> (f64, Vec<String>, Vec<String>) {
    let resume = resume_text.to_lowercase();
    let mut matched = Vec::new();
    let mut missing = Vec::new();

    for keyword in keywords {
        let k = keyword.trim().to_lowercase();
        if k.is_empty() {
            continue;
        }
        if (k.contains(' ') && resume.contains(&k))
            || partial_similarity(&k, &resume) >= KEYWORD_MATCH_THRESHOLD
        {
            matched.push(keyword.clone());
        } else {
            missing.push(keyword.clone());
        }
    }

    let pct = matched.len() as f64 / keywords.len().max(1) as f64 * 100.0;
    (round1(pct), matched, missing)
}

/// Mean pairwise token-set similarity between bullets.
pub fn redundancy_level(bullets: &[String]) -> Level {
    if bullets.len() < 2 {
        return Level::Low;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in bullets.iter().enumerate() {
        for b in &bullets[i + 1..] {
            total += token_set_similarity(a, b);
            pairs += 1;
        }
    }
    let avg = total / pairs.max(1) as f64;

    if avg >= 0.70 {
        Level::High
    } else if avg >= 0.55 {
        Level::Med
    } else {
        Level::Low
    }
}

/// Technical and validation markers per bullet, minus soft-skill filler.
pub fn technical_specificity_level(bullets: &[String]) -> Level {
    if bullets.is_empty() {
        return Level::Low;
    }

    let total: i64 = bullets
        .iter()
        .map(|b| {
            let low = b.to_lowercase();
            count_markers(&low, TECH_MARKERS) + count_markers(&low, VALIDATION_MARKERS)
                - count_markers(&low, SOFT_FLUFF)
        })
        .sum();
    let avg = total as f64 / bullets.len() as f64;

    if avg >= 2.0 {
        Level::High
    } else if avg >= 0.8 {
        Level::Med
    } else {
        Level::Low
    }
}

/// 0–10 score. Each bullet earns up to four points: technology, constraints or numbers,
/// validation, and architecture vocabulary.
pub fn signal_density_score(bullets: &[String]) -> f64 {
    if bullets.is_empty() {
        return 0.0;
    }

    let total: usize = bullets
        .iter()
        .map(|b| {
            let low = b.to_lowercase();
            let has_constraint =
                low.chars().any(|c| c.is_ascii_digit()) || contains_any(&low, CONSTRAINT_MARKERS);
            [
                contains_any(&low, TECH_MARKERS),
                has_constraint,
                contains_any(&low, VALIDATION_MARKERS),
                contains_any(&low, ARCHITECTURE_MARKERS),
            ]
            .into_iter()
            .filter(|hit| *hit)
            .count()
            .min(MAX_POINTS_PER_BULLET)
        })
        .sum();

    round1(total as f64 / (bullets.len() * MAX_POINTS_PER_BULLET) as f64 * 10.0)
}

/// Best Indel ratio between the shorter string and any alignment of it inside the
/// longer one, in 0..=1. Alignments include the partial overlaps at both ends.
pub fn partial_similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let (short, long) = if a.len() <= b.len() { (&a, &b) } else { (&b, &a) };
    let best = best_alignment(short, long);
    if short.len() == long.len() && best < 1.0 {
        return best.max(best_alignment(long, short));
    }
    best
}

fn best_alignment(short: &[char], long: &[char]) -> f64 {
    let width = short.len();
    let heads = (1..width).map(|end| &long[..end]);
    let tails = (long.len() + 1 - width..long.len()).map(|start| &long[start..]);

    let mut best: f64 = 0.0;
    for window in heads.chain(long.windows(width)).chain(tails) {
        best = best.max(indel_ratio(short, window));
        if best >= 1.0 {
            break;
        }
    }
    best
}

/// Token-set similarity: compares the shared vocabulary against each side's remainder,
/// so reordered or subset sentences score high. Case-sensitive.
pub fn token_set_similarity(a: &str, b: &str) -> f64 {
    let ta: BTreeSet<&str> = a.split_whitespace().collect();
    let tb: BTreeSet<&str> = b.split_whitespace().collect();
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }

    let intersection = join(ta.intersection(&tb));
    let only_a = join(ta.difference(&tb));
    let only_b = join(tb.difference(&ta));

    if !intersection.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 1.0;
    }

    let combined_a = format!("{intersection} {only_a}").trim().to_string();
    let combined_b = format!("{intersection} {only_b}").trim().to_string();

    let mut best = fuzz::ratio(combined_a.chars(), combined_b.chars());
    if !intersection.is_empty() {
        best = best
            .max(fuzz::ratio(intersection.chars(), combined_a.chars()))
            .max(fuzz::ratio(intersection.chars(), combined_b.chars()));
    }
    best
}

/// Normalized Indel similarity, `2 * lcs / (|a| + |b|)`.
fn indel_ratio(a: &[char], b: &[char]) -> f64 {
    fuzz::ratio(a.iter().copied(), b.iter().copied())
}

fn join<'a, 'b: 'a>(tokens: impl Iterator<Item = &'a &'b str>) -> String {
    tokens.copied().collect::<Vec<_>>().join(" ")
}

fn count_markers(text: &str, markers: &[&str]) -> i64 {
    markers.iter().filter(|m| text.contains(*m)).count() as i64
}

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| text.contains(m))
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
