//! Interactive menu
//!
//! One action per top-level choice. Actions may ask follow-up questions;
//! cancelling one of those returns to the menu, cancelling the menu itself
//! ends the session.

pub mod prompt;

use chrono::{DateTime, Months, Utc};
use crossterm::{execute, style::{Color, Print, ResetColor, SetForegroundColor}};
use std::io::Write;
use tracing::info;

pub use prompt::{LinePrompter, Prompter};

use crate::config::Config;
use crate::error::{LedgerError, Result};
use crate::rating::{self, Direction};
use crate::report::{self, FactRow};
use crate::store::FactStore;
use crate::types::{Employee, Rating};

/// Top-level menu entries, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    AddEmployee,
    AddFact,
    ListFacts,
    ListEmployees,
    ShowRatings,
    ShowChart,
    ExportCsv,
    RecentFacts,
    DeleteFact,
    DeleteAllFacts,
    DeleteAllEmployees,
    TopPositive,
    TopNegative,
    Exit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 14] = [
        MenuAction::AddEmployee,
        MenuAction::AddFact,
        MenuAction::ListFacts,
        MenuAction::ListEmployees,
        MenuAction::ShowRatings,
        MenuAction::ShowChart,
        MenuAction::ExportCsv,
        MenuAction::RecentFacts,
        MenuAction::DeleteFact,
        MenuAction::DeleteAllFacts,
        MenuAction::DeleteAllEmployees,
        MenuAction::TopPositive,
        MenuAction::TopNegative,
        MenuAction::Exit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::AddEmployee => "Add employee",
            MenuAction::AddFact => "Add fact",
            MenuAction::ListFacts => "List facts",
            MenuAction::ListEmployees => "List employees",
            MenuAction::ShowRatings => "Show employee ratings",
            MenuAction::ShowChart => "Rating chart",
            MenuAction::ExportCsv => "Export facts to CSV",
            MenuAction::RecentFacts => "Show an employee's facts for the last month",
            MenuAction::DeleteFact => "Delete an employee's fact",
            MenuAction::DeleteAllFacts => "Delete all facts",
            MenuAction::DeleteAllEmployees => "Delete all employees",
            MenuAction::TopPositive => "Top employees by positive rating",
            MenuAction::TopNegative => "Top employees by negative rating",
            MenuAction::Exit => "Exit",
        }
    }

    /// Position in the menu
    pub fn index(&self) -> usize {
        MenuAction::ALL.iter().position(|a| a == self).unwrap_or(0)
    }
}

/// A running menu session over one store
pub struct Session<P: Prompter, W: Write> {
    store: FactStore,
    config: Config,
    prompter: P,
    out: W,
}

impl<P: Prompter, W: Write> Session<P, W> {
    pub fn new(store: FactStore, config: Config, prompter: P, out: W) -> Self {
        Self { store, config, prompter, out }
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Run the menu until Exit or a cancelled top-level prompt.
    ///
    /// Fatal errors are returned; cancellations inside an action are not.
    pub async fn run(&mut self) -> Result<()> {
        let labels: Vec<String> = MenuAction::ALL.iter().map(|a| a.label().to_string()).collect();

        loop {
            let action = match self.prompter.select("Choose an action", &labels) {
                Ok(index) => MenuAction::ALL.get(index).copied().unwrap_or(MenuAction::Exit),
                Err(e) if e.is_cancellation() => {
                    self.print_dim(&format!("{}, exiting.\n", e));
                    return Ok(());
                }
                Err(e) => return Err(e),
            };

            if action == MenuAction::Exit {
                return Ok(());
            }

            match self.perform(action).await {
                Ok(()) => {}
                Err(e) if e.is_cancellation() => self.print_dim(&format!("{}.\n", e)),
                Err(e) => return Err(e),
            }
        }
    }

    /// Run a single menu action
    pub async fn perform(&mut self, action: MenuAction) -> Result<()> {
        tracing::debug!(?action, "Menu action");
        match action {
            MenuAction::AddEmployee => self.add_employee().await,
            MenuAction::AddFact => self.add_fact().await,
            MenuAction::ListFacts => self.list_facts().await,
            MenuAction::ListEmployees => self.list_employees().await,
            MenuAction::ShowRatings => self.show_ratings().await,
            MenuAction::ShowChart => self.show_chart().await,
            MenuAction::ExportCsv => self.export_csv().await,
            MenuAction::RecentFacts => self.recent_facts().await,
            MenuAction::DeleteFact => self.delete_fact().await,
            MenuAction::DeleteAllFacts => self.delete_all_facts().await,
            MenuAction::DeleteAllEmployees => self.delete_all_employees().await,
            MenuAction::TopPositive => self.show_top(Direction::Highest).await,
            MenuAction::TopNegative => self.show_top(Direction::Lowest).await,
            MenuAction::Exit => Ok(()),
        }
    }

    async fn add_employee(&mut self) -> Result<()> {
        let full_name = self.prompter.input("Employee full name")?;
        let position = self.prompter.input("Employee position")?;

        let employee = self.store.create_employee(&full_name, &position).await?;
        info!(id = employee.id, "Added employee");
        self.print_success(&format!("Added employee: {}\n", employee.full_name));
        Ok(())
    }

    async fn add_fact(&mut self) -> Result<()> {
        let employees = self.store.list_employees().await?;
        if employees.is_empty() {
            self.print_info("No employees available to attach a fact to.\n");
            return Ok(());
        }

        let employee = self.pick_employee(&employees)?;
        let text = self.prompter.input("Fact text")?;

        let ratings: Vec<String> = Rating::ALL.iter().map(|r| r.to_string()).collect();
        let index = self.prompter.select("Choose the fact rating", &ratings)?;
        let rating = *Rating::ALL
            .get(index)
            .ok_or_else(|| LedgerError::Prompt(format!("no rating at position {}", index)))?;

        let fact = self.store.create_fact(&text, rating, employee.id, Utc::now()).await?;
        info!(id = fact.id, employee_id = employee.id, "Added fact");
        self.print_success(&format!("Added fact: {}\n", fact.text));
        Ok(())
    }

    async fn list_facts(&mut self) -> Result<()> {
        let rows = self.fact_rows().await?;
        write!(self.out, "{}", report::facts_table(&rows))?;
        Ok(())
    }

    async fn list_employees(&mut self) -> Result<()> {
        let employees = self.store.list_employees().await?;
        write!(self.out, "{}", report::employees_table(&employees))?;
        Ok(())
    }

    async fn show_ratings(&mut self) -> Result<()> {
        let totals = rating::employee_totals(&self.store).await?;
        if totals.is_empty() {
            self.print_info("No rated facts yet.\n");
            return Ok(());
        }

        write!(self.out, "{}", report::ratings_report(&totals))?;
        Ok(())
    }

    async fn show_chart(&mut self) -> Result<()> {
        let Some(employee) = self.choose_employee().await? else {
            return Ok(());
        };

        let facts = self.store.list_facts_for_employee_chronological(employee.id).await?;
        let history = rating::running_history(&facts);

        match report::plot(&history, self.config.report.chart_height) {
            Some(chart) => writeln!(self.out, "{}", chart)?,
            None => self.print_info("No data to chart for this employee.\n"),
        }
        Ok(())
    }

    async fn export_csv(&mut self) -> Result<()> {
        let rows = self.fact_rows().await?;
        let path = self.config.export.csv_path.clone();

        let count = report::write_facts_csv(&path, &rows).await?;
        self.print_success(&format!("Exported {} facts to '{}'\n", count, path.display()));
        Ok(())
    }

    async fn recent_facts(&mut self) -> Result<()> {
        let Some(employee) = self.choose_employee().await? else {
            return Ok(());
        };

        let since = window_start(Utc::now(), self.config.report.recent_window_months);
        let facts = self.store.list_recent_facts_for_employee(employee.id, since).await?;

        write!(self.out, "{}", report::recent_facts_table(&facts))?;
        if facts.is_empty() {
            self.print_info(&format!("No recent facts for {}.\n", employee.full_name));
        }
        Ok(())
    }

    async fn delete_fact(&mut self) -> Result<()> {
        let Some(employee) = self.choose_employee().await? else {
            return Ok(());
        };

        let facts = self.store
            .list_last_n_facts_for_employee(employee.id, self.config.report.delete_candidates)
            .await?;
        if facts.is_empty() {
            self.print_info(&format!("No facts recorded for {}.\n", employee.full_name));
            return Ok(());
        }

        let labels: Vec<String> = facts.iter().map(report::fact_choice_label).collect();
        let index = self.prompter.select("Choose a fact to delete", &labels)?;
        let fact = facts
            .get(index)
            .ok_or_else(|| LedgerError::Prompt(format!("no fact at position {}", index)))?;

        if self.store.delete_fact(fact.id).await? {
            info!(id = fact.id, "Deleted fact");
            self.print_success(&format!("Deleted fact {}.\n", fact.id));
        } else {
            self.print_info(&format!("Fact {} was already gone.\n", fact.id));
        }
        Ok(())
    }

    async fn delete_all_facts(&mut self) -> Result<()> {
        if !self.confirm("Really delete all facts?")? {
            self.print_info("Nothing deleted.\n");
            return Ok(());
        }

        let deleted = self.store.delete_all_facts().await?;
        info!(deleted, "Deleted all facts");
        self.print_success(&format!("All facts were deleted ({}).\n", deleted));
        Ok(())
    }

    async fn delete_all_employees(&mut self) -> Result<()> {
        if !self.confirm("Really delete all employees and their facts?")? {
            self.print_info("Nothing deleted.\n");
            return Ok(());
        }

        let employees = self.store.delete_all_employees().await?;
        let facts = self.store.delete_all_facts().await?;
        info!(employees, facts, "Deleted all employees and facts");
        self.print_success(&format!(
            "All employees ({}) and their facts ({}) were deleted.\n",
            employees, facts
        ));
        Ok(())
    }

    async fn show_top(&mut self, direction: Direction) -> Result<()> {
        let limit = self.config.report.top_limit;
        let ranked = rating::top_employees(&self.store, direction, limit).await?;
        write!(self.out, "{}", report::top_report(direction, limit, &ranked))?;
        Ok(())
    }

    async fn fact_rows(&self) -> Result<Vec<FactRow>> {
        let joined = self.store.list_facts_with_employee().await?;
        Ok(joined.iter().map(FactRow::from).collect())
    }

    /// Employee picker; `None` after telling the user there is nobody to pick
    async fn choose_employee(&mut self) -> Result<Option<Employee>> {
        let employees = self.store.list_employees().await?;
        if employees.is_empty() {
            self.print_info("No employees available.\n");
            return Ok(None);
        }
        self.pick_employee(&employees).map(Some)
    }

    fn pick_employee(&mut self, employees: &[Employee]) -> Result<Employee> {
        let labels: Vec<String> = employees.iter().map(Employee::picker_label).collect();
        let index = self.prompter.select("Choose an employee", &labels)?;
        employees
            .get(index)
            .cloned()
            .ok_or_else(|| LedgerError::Prompt(format!("no employee at position {}", index)))
    }

    fn confirm(&mut self, label: &str) -> Result<bool> {
        let choices = vec!["No".to_string(), "Yes".to_string()];
        Ok(self.prompter.select(label, &choices)? == 1)
    }

    fn print_colored(&mut self, text: &str, color: Color) {
        let _ = execute!(
            self.out,
            SetForegroundColor(color),
            Print(text),
            ResetColor
        );
    }

    fn print_success(&mut self, text: &str) {
        self.print_colored(text, Color::Green);
    }

    fn print_info(&mut self, text: &str) {
        self.print_colored(text, Color::Cyan);
    }

    fn print_dim(&mut self, text: &str) {
        self.print_colored(text, Color::DarkGrey);
    }
}

/// Start of the "recent" window, `months` calendar months before `now`
fn window_start(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Start an interactive session on the terminal
pub async fn run_interactive(config: Config) -> Result<()> {
    let store = crate::store::open_configured(&config).await?;
    let prompter = LinePrompter::new()?;

    println!();
    println!("  \x1b[1mFact Ledger v{}\x1b[0m", crate::VERSION);
    println!("  \x1b[90mdatabase: {}\x1b[0m", config.storage.database_path.display());
    println!("  \x1b[90mCtrl+C cancels the current question, at the menu it exits\x1b[0m");

    let mut session = Session::new(store, config, prompter, std::io::stdout());
    session.run().await
}
