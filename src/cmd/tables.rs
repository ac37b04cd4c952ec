//! Tables command - print the bracket tables and standard deductions in use

use crate::core::{display_amount, FilingStatus};
use crate::tax::{compute_tax, RateSchedule, TaxYear};
use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct TablesCommand {
    /// Only show this filing status (e.g. single, married_filing_jointly)
    #[arg(short, long, value_parser = parse_status)]
    status: Option<FilingStatus>,

    /// Tax year
    #[arg(short, long, default_value_t = 2024)]
    year: i32,

    /// Also show the tax on this taxable income
    #[arg(short, long)]
    income: Option<Decimal>,
}

fn parse_status(s: &str) -> Result<FilingStatus, String> {
    s.parse().map_err(|e: crate::core::ValidationError| e.to_string())
}

#[derive(Debug, Clone, Tabled)]
struct BracketRow {
    #[tabled(rename = "Over")]
    lower: String,
    #[tabled(rename = "But not over")]
    upper: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Tax at lower bound")]
    base_tax: String,
}

impl TablesCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let year = TaxYear::new(self.year)?;
        let statuses = match self.status {
            Some(status) => vec![status],
            None => FilingStatus::ALL.to_vec(),
        };
        for status in statuses {
            let schedule = year.rate_schedule(status)?;
            print_schedule(year, &schedule);
            if let Some(income) = self.income {
                let tax = compute_tax(income, status, year)?;
                println!(
                    "Tax on {}: {} (marginal {}%, effective {}%)",
                    display_amount(income),
                    display_amount(tax),
                    percent(schedule.marginal_rate(income)),
                    percent(schedule.effective_rate(income)?.round_dp(4))
                );
            }
        }
        Ok(())
    }
}

fn percent(rate: Decimal) -> Decimal {
    (rate * dec!(100)).normalize()
}

fn print_schedule(year: TaxYear, schedule: &RateSchedule) {
    let status = schedule.status;
    println!();
    println!("{} - {}", year, status);
    println!(
        "Standard deduction: {} (+{} per age/blindness condition)",
        display_amount(year.standard_deduction(status)),
        display_amount(year.additional_deduction(status))
    );

    let rows: Vec<BracketRow> = schedule
        .brackets
        .iter()
        .map(|b| BracketRow {
            lower: display_amount(b.lower),
            upper: b.upper.map_or("-".to_string(), display_amount),
            rate: format!("{}%", percent(b.rate)),
            base_tax: display_amount(b.base_tax),
        })
        .collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
}
