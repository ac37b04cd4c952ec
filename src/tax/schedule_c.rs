use super::rates::ConfigError;
use super::unit::{Cited, FormUnit};
use crate::core::{display_amount, BusinessProfile, Citation, CitationLog, FilingStatus, LineItems};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Deductible share of business meals
const MEALS_DEDUCTIBLE: Decimal = dec!(0.5);

/// Schedule C - Profit or Loss From Business
#[derive(Debug, Default, Clone, Copy)]
pub struct ScheduleC;

#[derive(Debug, Clone)]
pub struct ScheduleCInput {
    pub business: BusinessProfile,
    /// Not used by the computation
    pub status: FilingStatus,
}

#[derive(Debug, Clone, Default, Serialize, LineItems)]
#[line(form = "schedule-c")]
pub struct ScheduleCOutput {
    #[line(number = "1", label = "gross receipts")]
    pub gross_receipts: Decimal,
    /// Receipts less returns and cost of goods sold, plus other income
    #[line(number = "7", label = "gross income")]
    pub gross_income: Decimal,
    /// Includes only the deductible half of meals
    #[line(number = "28", label = "total expenses")]
    pub total_expenses: Decimal,
    #[line(number = "31", label = "net profit or loss")]
    pub net_profit_or_loss: Decimal,
    #[serde(skip)]
    pub citations: Vec<Citation>,
}

impl Cited for ScheduleCOutput {
    fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl FormUnit for ScheduleC {
    type Input = ScheduleCInput;
    type Output = ScheduleCOutput;
    const FORM: &'static str = "schedule-c";

    fn process(&self, input: &ScheduleCInput) -> Result<ScheduleCOutput, ConfigError> {
        let business = &input.business;
        let mut log = CitationLog::new(Self::FORM);

        let gross_income = business.gross_receipts - business.returns_allowances
            - business.cost_of_goods_sold
            + business.other_income;
        log.cite(
            "gross income",
            "Schedule C Instructions, Part I",
            format!(
                "Gross income: {} = receipts ({}) - returns ({}) - COGS ({}) + other ({})",
                display_amount(gross_income),
                display_amount(business.gross_receipts),
                display_amount(business.returns_allowances),
                display_amount(business.cost_of_goods_sold),
                display_amount(business.other_income)
            ),
        );

        let listed: Decimal = business
            .fully_deductible_expenses()
            .iter()
            .map(|(_, amount)| *amount)
            .sum();
        let meals = business.meals * MEALS_DEDUCTIBLE;
        let other: Decimal = business.other_expenses.values().copied().sum();
        let total_expenses = listed + meals + other;
        log.cite(
            "total expenses",
            "Schedule C Instructions, Part II",
            format!(
                "Total expenses: {} (meals limited to 50%: {} of {} deducted)",
                display_amount(total_expenses),
                display_amount(meals),
                display_amount(business.meals)
            ),
        );

        let net_profit_or_loss = gross_income - total_expenses;
        log.cite(
            "net profit or loss",
            "Schedule C Instructions, Line 31",
            format!(
                "Net {}: {} = gross income ({}) - total expenses ({})",
                if net_profit_or_loss < Decimal::ZERO { "loss" } else { "profit" },
                display_amount(net_profit_or_loss),
                display_amount(gross_income),
                display_amount(total_expenses)
            ),
        );

        log::debug!(
            "Schedule C {}: gross={}, expenses={}, net={}",
            business.name.as_deref().unwrap_or("(unnamed)"),
            gross_income,
            total_expenses,
            net_profit_or_loss
        );

        Ok(ScheduleCOutput {
            gross_receipts: business.gross_receipts,
            gross_income,
            total_expenses,
            net_profit_or_loss,
            citations: log.finish(),
        })
    }
}
