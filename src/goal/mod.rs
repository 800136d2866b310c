//! Savings goals and the money put towards them.

mod core;
mod endpoints;

pub use self::core::{
    FinancialGoal, NewGoal, add_savings, create_goal, create_goal_table, query_goals,
};
pub use endpoints::{
    add_savings_endpoint, create_goal_endpoint, delete_goal_endpoint, list_goals_endpoint,
    update_goal_endpoint,
};
