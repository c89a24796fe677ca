//! Page-fit refinement: tailor, compile, measure, and regenerate until the resume
//! fits one page, then pick the strongest pass by its alignment metrics.
//!
//! Flow: default draft → tighten while over one page → expand if underfilled →
//!       metrics → optional technical-depth pass → choose best.
//!
//! `/api/tailor` stays a single round trip; this loop lives behind its own endpoint.

use serde::{Deserialize, Serialize};

pub mod handlers;
pub mod pipeline;
pub mod prompts;
pub mod schema;

/// Which rewrite the model is asked for on a given generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefineMode {
    Default,
    IncreaseTechnicalDepth,
    TightenToOnePage,
    ExpandToFillOnePage,
}

impl RefineMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RefineMode::Default => "default",
            RefineMode::IncreaseTechnicalDepth => "increase_technical_depth",
            RefineMode::TightenToOnePage => "tighten_to_one_page",
            RefineMode::ExpandToFillOnePage => "expand_to_fill_one_page",
        }
    }
}
