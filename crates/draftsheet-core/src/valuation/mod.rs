// Valuation engine: schema normalization, consensus, scoring, VORP, tiers,
// ADP and draft priority.

pub mod adp;
pub mod boards;
pub mod consensus;
pub mod priority;
pub mod projections;
pub mod schema;
pub mod scoring;
pub mod tiers;
pub mod vorp;
