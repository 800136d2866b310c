//! The dashboard figures: monthly and lifetime spending, per-category budget
//! progress and savings goal progress.

mod aggregation;
mod core;
mod handlers;

pub use handlers::{get_goals_overview_endpoint, get_summary_endpoint};
