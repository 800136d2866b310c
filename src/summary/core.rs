//! Queries a user's records and turns them into the dashboard figures.

use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    Error,
    budget::query_budgets,
    expense::{Expense, query_expenses},
    goal::query_goals,
    income::query_incomes,
    money::total,
    profile::get_or_create_profile,
    summary::aggregation::{
        BudgetTotals, CategorySummary, GoalProgress, PeriodSummary, budget_portfolio_value,
        budget_totals, category_breakdown, goal_portfolio_value, goal_progress, period_summary,
    },
    timezone::month_start,
    user::UserID,
};

/// Everything the dashboard shows for one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    /// The first day of the month containing the reference date.
    pub month_start: Date,
    pub monthly: PeriodSummary,
    pub lifetime: PeriodSummary,
    pub categories: Vec<CategorySummary>,
    pub budget_totals: BudgetTotals,
    pub goal_count: usize,
    /// The monthly budget minus this month's spending.
    pub portfolio_value: Decimal,
}

/// Progress towards each of a user's goals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalsOverview {
    pub goals: Vec<GoalProgress>,
    pub goal_count: usize,
    pub total_target: Decimal,
    /// The total saved across all goals.
    pub portfolio_value: Decimal,
}

/// Build the dashboard for `user_id` as of `today`.
///
/// The monthly window starts on the first day of `today`'s month and has no
/// end date, so records dated later in the month (or later months) count too.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the queries fail.
pub fn build_dashboard_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<DashboardSummary, Error> {
    let month_start = month_start(today);

    let profile = get_or_create_profile(user_id, connection)?;
    let all_expenses = query_expenses(user_id, None, connection)?;
    let all_incomes = query_incomes(user_id, None, connection)?;
    let budgets = query_budgets(user_id, Some(month_start), connection)?;
    let goals = query_goals(user_id, connection)?;

    let monthly_expenses: Vec<Expense> = all_expenses
        .iter()
        .filter(|expense| expense.date >= month_start)
        .cloned()
        .collect();

    let monthly_spent = total(monthly_expenses.iter().map(|expense| expense.amount));
    let monthly_income = total(
        all_incomes
            .iter()
            .filter(|income| income.date >= month_start)
            .map(|income| income.amount),
    );
    let lifetime_spent = total(all_expenses.iter().map(|expense| expense.amount));
    let lifetime_income = total(all_incomes.iter().map(|income| income.amount));

    let categories = category_breakdown(&budgets, &monthly_expenses);
    let budget_totals = budget_totals(&categories);

    Ok(DashboardSummary {
        month_start,
        monthly: period_summary(profile.monthly_budget, monthly_spent, monthly_income),
        lifetime: period_summary(profile.lifetime_budget, lifetime_spent, lifetime_income),
        categories,
        budget_totals,
        goal_count: goals.len(),
        portfolio_value: budget_portfolio_value(profile.monthly_budget, monthly_spent),
    })
}

/// Build the goals overview for `user_id`, with goals ordered by name.
///
/// # Errors
/// Returns an [Error::SqlError] if the goals cannot be queried.
pub fn build_goals_overview(user_id: UserID, connection: &Connection) -> Result<GoalsOverview, Error> {
    let goals = query_goals(user_id, connection)?;

    let total_target = total(goals.iter().map(|goal| goal.target));
    let portfolio_value = goal_portfolio_value(&goals);
    let goal_count = goals.len();

    Ok(GoalsOverview {
        goals: goals.into_iter().map(goal_progress).collect(),
        goal_count,
        total_target,
        portfolio_value,
    })
}
