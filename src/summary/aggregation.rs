//! Pure calculations behind the dashboard and goals overview.
//!
//! Nothing in here touches the database: every function takes records that
//! have already been queried, so the figures can be tested in isolation.

use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

use crate::{
    budget::Budget,
    expense::Expense,
    goal::FinancialGoal,
    money::{capped_percentage, percentage, to_money, total},
};

/// Spending against one budget row in the current month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySummary {
    pub budget_id: i64,
    pub category: String,
    pub month: Date,
    pub limit: Decimal,
    pub spent: Decimal,
    /// `limit - spent`, negative when over budget.
    pub remaining: Decimal,
    pub is_over: bool,
    /// Capped at 100.
    pub percent: i64,
}

/// The sum over every row of a category breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetTotals {
    pub total_budget: Decimal,
    pub spent_total: Decimal,
    pub remaining_total: Decimal,
    /// Not capped.
    pub percent: i64,
}

/// Spending and income against a budget over some period.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    pub budget: Decimal,
    pub spent: Decimal,
    pub income: Decimal,
    /// `budget - spent + income`.
    pub remaining: Decimal,
    /// Not capped, so overspending gives more than 100.
    pub percent: i64,
}

/// A goal together with how far along it is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    #[serde(flatten)]
    pub goal: FinancialGoal,
    pub percent: i64,
    /// What is left to save, never below zero.
    pub remaining: Decimal,
}

/// Compare each budget against the expenses in its category.
///
/// `expenses` should already be limited to the current month. Categories are
/// matched exactly, so a "food" budget does not count "Food" expenses. The
/// output keeps the order of `budgets`.
pub fn category_breakdown(budgets: &[Budget], expenses: &[Expense]) -> Vec<CategorySummary> {
    budgets
        .iter()
        .map(|budget| {
            let spent = total(
                expenses
                    .iter()
                    .filter(|expense| expense.category.as_str() == budget.category)
                    .map(|expense| expense.amount),
            );

            CategorySummary {
                budget_id: budget.id,
                category: budget.category.clone(),
                month: budget.month,
                limit: budget.limit,
                spent,
                remaining: budget.limit - spent,
                is_over: spent > budget.limit,
                percent: capped_percentage(spent, budget.limit),
            }
        })
        .collect()
}

pub fn budget_totals(categories: &[CategorySummary]) -> BudgetTotals {
    let total_budget = total(categories.iter().map(|category| category.limit));
    let spent_total = total(categories.iter().map(|category| category.spent));

    BudgetTotals {
        total_budget,
        spent_total,
        remaining_total: total_budget - spent_total,
        percent: percentage(spent_total, total_budget),
    }
}

/// Summarise a period given its budget and the amounts spent and received.
///
/// Income is added back onto what remains.
pub fn period_summary(budget: Decimal, spent: Decimal, income: Decimal) -> PeriodSummary {
    PeriodSummary {
        budget,
        spent,
        income,
        remaining: to_money(budget - spent + income),
        percent: percentage(spent, budget),
    }
}

/// The total saved across all goals.
pub fn goal_portfolio_value(goals: &[FinancialGoal]) -> Decimal {
    total(goals.iter().map(|goal| goal.saved))
}

/// What is left of the monthly budget, ignoring income.
pub fn budget_portfolio_value(monthly_budget: Decimal, monthly_spent: Decimal) -> Decimal {
    to_money(monthly_budget - monthly_spent)
}

pub fn goal_progress(goal: FinancialGoal) -> GoalProgress {
    let percent = goal.percent();
    let remaining = to_money((goal.target - goal.saved).max(Decimal::ZERO));

    GoalProgress {
        goal,
        percent,
        remaining,
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use time::{OffsetDateTime, macros::date};

    use crate::{
        budget::Budget,
        expense::{Expense, ExpenseCategory},
        goal::FinancialGoal,
        summary::aggregation::{
            budget_portfolio_value, budget_totals, category_breakdown, goal_portfolio_value,
            goal_progress, period_summary,
        },
        user::UserID,
    };

    fn budget(id: i64, category: &str, limit: i64) -> Budget {
        Budget {
            id,
            user_id: UserID::new(1),
            category: category.to_owned(),
            limit: Decimal::from(limit),
            month: date!(2025 - 03 - 01),
        }
    }

    fn expense(category: ExpenseCategory, amount: i64) -> Expense {
        Expense {
            id: 0,
            user_id: UserID::new(1),
            description: "test".to_owned(),
            category,
            amount: Decimal::from(amount),
            date: date!(2025 - 03 - 10),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    fn goal(target: i64, saved: i64) -> FinancialGoal {
        FinancialGoal {
            id: 0,
            user_id: UserID::new(1),
            name: "Holiday".to_owned(),
            icon: "🎯".to_owned(),
            target: Decimal::from(target),
            saved: Decimal::from(saved),
            created_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn overspent_category_is_capped_and_flagged() {
        let budgets = [budget(1, "Food", 100)];
        let expenses = [
            expense(ExpenseCategory::Food, 30),
            expense(ExpenseCategory::Food, 90),
        ];

        let categories = category_breakdown(&budgets, &expenses);

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].spent, Decimal::from(120));
        assert_eq!(categories[0].remaining, Decimal::from(-20));
        assert!(categories[0].is_over);
        assert_eq!(categories[0].percent, 100);
    }

    #[test]
    fn spending_exactly_the_limit_is_not_over() {
        let categories = category_breakdown(
            &[budget(1, "Food", 100)],
            &[expense(ExpenseCategory::Food, 100)],
        );

        assert!(!categories[0].is_over);
        assert_eq!(categories[0].percent, 100);
    }

    #[test]
    fn category_only_counts_matching_expenses() {
        let categories = category_breakdown(
            &[budget(1, "Food", 100), budget(2, "food", 100)],
            &[
                expense(ExpenseCategory::Food, 25),
                expense(ExpenseCategory::Transport, 60),
            ],
        );

        assert_eq!(categories[0].spent, Decimal::from(25));
        assert_eq!(categories[0].percent, 25);
        assert_eq!(categories[1].spent, Decimal::ZERO);
    }

    #[test]
    fn non_positive_limit_has_zero_percent() {
        let categories = category_breakdown(
            &[budget(1, "Food", 0), budget(2, "Games", -10)],
            &[
                expense(ExpenseCategory::Food, 5),
                expense(ExpenseCategory::Games, 5),
            ],
        );

        assert_eq!(categories[0].percent, 0);
        assert!(categories[0].is_over);
        assert_eq!(categories[1].percent, 0);
        assert!(categories[1].is_over);
    }

    #[test]
    fn duplicate_budget_rows_each_count_the_same_spending() {
        let categories = category_breakdown(
            &[budget(1, "Food", 100), budget(2, "Food", 50)],
            &[expense(ExpenseCategory::Food, 40)],
        );

        assert_eq!(categories.len(), 2);
        assert_eq!(categories[0].spent, Decimal::from(40));
        assert_eq!(categories[1].spent, Decimal::from(40));
    }

    #[test]
    fn totals_are_not_capped() {
        let categories = category_breakdown(
            &[budget(1, "Food", 100), budget(2, "Bills", 100)],
            &[
                expense(ExpenseCategory::Food, 300),
                expense(ExpenseCategory::Bills, 50),
            ],
        );

        let totals = budget_totals(&categories);

        assert_eq!(totals.total_budget, Decimal::from(200));
        assert_eq!(totals.spent_total, Decimal::from(350));
        assert_eq!(totals.remaining_total, Decimal::from(-150));
        assert_eq!(totals.percent, 175);
    }

    #[test]
    fn totals_of_no_budgets_are_zero() {
        let totals = budget_totals(&[]);

        assert_eq!(totals.total_budget, Decimal::ZERO);
        assert_eq!(totals.percent, 0);
    }

    #[test]
    fn period_adds_income_back() {
        let summary = period_summary(Decimal::from(500), Decimal::from(200), Decimal::from(50));

        assert_eq!(summary.remaining, Decimal::from(350));
        assert_eq!(summary.percent, 40);
    }

    #[test]
    fn period_percent_is_not_capped() {
        let summary = period_summary(Decimal::from(100), Decimal::from(250), Decimal::ZERO);

        assert_eq!(summary.percent, 250);
        assert_eq!(summary.remaining, Decimal::from(-150));
    }

    #[test]
    fn period_without_budget_has_zero_percent() {
        let summary = period_summary(Decimal::ZERO, Decimal::from(20), Decimal::ZERO);

        assert_eq!(summary.percent, 0);
    }

    #[test]
    fn portfolio_values() {
        let goals = [goal(1000, 250), goal(500, 100)];

        assert_eq!(goal_portfolio_value(&goals), Decimal::from(350));
        assert_eq!(goal_portfolio_value(&[]), Decimal::ZERO);
        assert_eq!(
            budget_portfolio_value(Decimal::from(500), Decimal::from(200)),
            Decimal::from(300)
        );
    }

    #[test]
    fn goal_with_zero_target_has_zero_percent() {
        let progress = goal_progress(goal(0, 50));

        assert_eq!(progress.percent, 0);
        assert_eq!(progress.remaining, Decimal::ZERO);
    }

    #[test]
    fn goal_remaining_is_floored_at_zero() {
        let progress = goal_progress(goal(100, 150));

        assert_eq!(progress.percent, 150);
        assert_eq!(progress.remaining, Decimal::ZERO);
    }
}
