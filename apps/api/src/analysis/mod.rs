// Resume ↔ job description alignment metrics. Pure text heuristics; no model calls.

pub mod handlers;
pub mod keywords;
pub mod metrics;
pub mod text;
