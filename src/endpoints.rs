//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/api/expenses/{expense_id}', use [format_endpoint].

/// The root route which redirects to the dashboard summary.
pub const ROOT: &str = "/";
/// The dashboard summary: monthly and lifetime totals, budgets and goals.
pub const SUMMARY: &str = "/api/summary";
/// The goals overview with per-goal progress.
pub const GOALS_OVERVIEW: &str = "/api/goals/overview";
/// The route for registering users.
pub const USERS: &str = "/api/users";
/// The route for the requesting user's profile.
pub const PROFILE: &str = "/api/profile";
/// The route to list and create expenses.
pub const EXPENSES: &str = "/api/expenses";
/// The route to delete an expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";
/// The route to list and create incomes.
pub const INCOMES: &str = "/api/incomes";
/// The route to delete an income.
pub const DELETE_INCOME: &str = "/api/incomes/{income_id}";
/// The route to list and create budgets.
pub const BUDGETS: &str = "/api/budgets";
/// The route to delete a budget.
pub const DELETE_BUDGET: &str = "/api/budgets/{budget_id}";
/// The route to list and create goals.
pub const GOALS: &str = "/api/goals";
/// The route to edit or delete a goal.
pub const GOAL: &str = "/api/goals/{goal_id}";
/// The route to add money to a goal's saved amount.
pub const GOAL_SAVINGS: &str = "/api/goals/{goal_id}/savings";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/api/goals/{goal_id}', '{goal_id}' is the parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some(param_start) = endpoint_path.find('{') else {
        return endpoint_path.to_owned();
    };

    let param_end = endpoint_path[param_start..]
        .find('}')
        .map(|offset| param_start + offset + 1)
        .unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
