use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use rust_decimal::Decimal;
use time::{Duration, OffsetDateTime};

use cashly_rs::{
    ExpenseCategory, IncomeSource, NewBudget, NewExpense, NewGoal, NewIncome, add_savings,
    create_budget, create_expense, create_goal, create_income, initialize_db, register_user,
    update_profile_budgets,
};

/// A utility for creating a test database for the Cashly API server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");
    let user = register_user("test", "test@example.com", &conn)?;
    update_profile_budgets(user.id, Decimal::from(2000), Decimal::from(50_000), &conn)?;

    println!("Creating records...");
    let today = OffsetDateTime::now_utc().date();
    let month_start = today.replace_day(1)?;
    let last_month = today - Duration::days(i64::from(today.day()) + 3);

    let expenses = [
        ("Groceries", ExpenseCategory::Food, Decimal::new(8450, 2), today),
        ("Bus pass", ExpenseCategory::Transport, Decimal::from(60), month_start),
        ("Cinema", ExpenseCategory::Entertainment, Decimal::new(1850, 2), today),
        ("Power bill", ExpenseCategory::Bills, Decimal::new(14299, 2), last_month),
    ];
    for (description, category, amount, date) in expenses {
        create_expense(
            user.id,
            NewExpense {
                description: description.to_owned(),
                category,
                amount,
                date,
            },
            &conn,
        )?;
    }

    for (description, source, amount, date) in [
        ("Pay", IncomeSource::Salary, Decimal::from(3200), month_start),
        ("Logo design", IncomeSource::Freelance, Decimal::from(450), last_month),
    ] {
        create_income(
            user.id,
            NewIncome {
                description: description.to_owned(),
                source,
                amount,
                date,
            },
            &conn,
        )?;
    }

    for (category, limit) in [("Food", 400), ("Transport", 50), ("Entertainment", 100)] {
        create_budget(
            user.id,
            NewBudget {
                category: category.to_owned(),
                limit: Decimal::from(limit),
                month: month_start,
            },
            &conn,
        )?;
    }

    let goal = create_goal(
        user.id,
        NewGoal {
            name: "Emergency fund".to_owned(),
            icon: "🛟".to_owned(),
            target: Decimal::from(5000),
        },
        &conn,
    )?;
    add_savings(user.id, goal.id, Decimal::new(120_000, 2), &conn)?;

    println!("Success! Send requests with the header x-authenticated-user: {}", user.id);

    Ok(())
}
