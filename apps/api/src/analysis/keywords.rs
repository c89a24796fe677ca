//! Heuristic keyword extraction from job descriptions.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_MAX_KEYWORDS: usize = 30;

const STOPWORDS: &[&str] = &[
    "and", "or", "the", "a", "an", "to", "of", "in", "for", "with", "on", "as", "at", "by",
    "from", "be", "is", "are", "was", "were", "this", "that", "it", "their", "our", "you",
    "your", "we", "will", "work", "within", "more", "use", "using", "including", "etc", "plus",
];

/// Technology terms always pulled forward when the job description mentions them.
const BOOST_TERMS: &[&str] = &[
    "fastapi", "postgresql", "docker", "linux", "git", "github", "jwt", "oauth", "rest", "api",
    "typescript", "react", "tauri", "rust", "ci/cd", "kubernetes", "grpc", "redis", "alembic",
    "openapi", "swagger", "pytest", "gtest", "c++", "c", "python", "sql", "firebase",
];

/// Multi-word phrases recognised verbatim.
const PHRASES: &[&str] = &[
    "embedded linux", "device drivers", "real-time", "real time", "memory mapped", "rest api",
    "openapi", "unit test", "integration test", "continuous integration", "agile", "sprint",
    "jwt", "oauth", "git", "github", "docker", "postgresql", "c test", "g test", "gtest",
    "python", "c++", "linux",
];

static TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-zA-Z][a-zA-Z0-9+#/.\-]+").expect("valid regex"));

/// Lowercases and spells out symbol-heavy language names.
pub fn normalize_token(token: &str) -> String {
    token
        .trim()
        .to_lowercase()
        .replace("c++", "cpp")
        .replace("c#", "csharp")
}

/// Ordered keyword list: recognised phrases, then boosted terms, then remaining tokens.
/// Duplicates keep their first position; the list is cut at `max_keywords`.
pub fn extract_keywords(job_description: &str, max_keywords: usize) -> Vec<String> {
    let jd = job_description.to_lowercase();

    let tokens: Vec<String> = TOKEN
        .find_iter(&jd)
        .map(|m| normalize_token(m.as_str()))
        .filter(|t| t.len() >= 3 && !STOPWORDS.contains(&t.as_str()))
        .collect();

    let phrases = PHRASES
        .iter()
        .filter(|p| jd.contains(*p))
        .map(|p| normalize_token(p));

    let boosted = BOOST_TERMS.iter().filter_map(|term| {
        let normalized = normalize_token(term);
        (tokens.contains(&normalized) || jd.contains(normalized.as_str())).then_some(normalized)
    });

    let mut seen = HashSet::new();
    phrases
        .chain(boosted)
        .chain(tokens.iter().cloned())
        .filter(|k| seen.insert(k.clone()))
        .take(max_keywords)
        .collect()
}
