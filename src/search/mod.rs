//! Search helpers: classification and relevance ranking

mod classify;
mod relevance;

pub use classify::{Classification, RULES, Rule, Subject, classify, classify_with};
pub use relevance::{BoostPolicy, Scored, prioritize, query_terms, rank};
