use super::rates::{ConfigError, TaxYear};
use super::unit::{Cited, FormUnit};
use crate::core::{display_amount, round_cents, Citation, CitationLog, FilingStatus, LineItems};
use rust_decimal::Decimal;
use serde::Serialize;

/// Schedule SE - Self-Employment Tax
#[derive(Debug, Default, Clone, Copy)]
pub struct ScheduleSe {
    pub year: TaxYear,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduleSeInput {
    /// Schedule C net profit
    pub net_profit: Decimal,
    /// Not used by the computation
    pub status: FilingStatus,
}

#[derive(Debug, Clone, Default, Serialize, LineItems)]
#[line(form = "schedule-se")]
pub struct ScheduleSeOutput {
    /// Net profit times 92.35%
    #[line(number = "4a", label = "net earnings")]
    pub net_earnings: Decimal,
    #[line(number = "10", label = "social security tax")]
    pub social_security_tax: Decimal,
    #[line(number = "11", label = "medicare tax")]
    pub medicare_tax: Decimal,
    #[line(number = "12", label = "self-employment tax")]
    pub self_employment_tax: Decimal,
    /// Half of the self-employment tax, taken on Schedule 1
    #[line(number = "13", label = "deduction")]
    pub deduction: Decimal,
    #[serde(skip)]
    pub citations: Vec<Citation>,
}

impl Cited for ScheduleSeOutput {
    fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl FormUnit for ScheduleSe {
    type Input = ScheduleSeInput;
    type Output = ScheduleSeOutput;
    const FORM: &'static str = "schedule-se";

    fn process(&self, input: &ScheduleSeInput) -> Result<ScheduleSeOutput, ConfigError> {
        let year = self.year;
        let mut log = CitationLog::new(Self::FORM);

        let threshold = year.self_employment_threshold();
        if input.net_profit <= threshold {
            log.cite(
                "self-employment tax",
                "Schedule SE Instructions, Who Must File",
                format!(
                    "Net earnings ({}) at or below {} threshold; no SE tax",
                    display_amount(input.net_profit),
                    display_amount(threshold)
                ),
            );
            return Ok(ScheduleSeOutput {
                citations: log.finish(),
                ..Default::default()
            });
        }

        let factor = year.self_employment_earnings_factor();
        let net_earnings = input.net_profit * factor;
        log.cite(
            "net earnings",
            "Schedule SE, Line 4a",
            format!(
                "Net earnings: {} × {} = {}",
                display_amount(input.net_profit),
                factor,
                display_amount(round_cents(net_earnings))
            ),
        );

        let wage_base = year.social_security_wage_base();
        let social_security = net_earnings.min(wage_base) * year.social_security_rate();
        let medicare = net_earnings * year.medicare_rate();
        let self_employment_tax = round_cents(social_security + medicare);
        log.cite(
            "self-employment tax",
            "Schedule SE, Line 12",
            format!(
                "SE tax: {} (Social Security {} on earnings up to {}, Medicare {})",
                display_amount(self_employment_tax),
                display_amount(round_cents(social_security)),
                display_amount(wage_base),
                display_amount(round_cents(medicare))
            ),
        );

        let deduction = round_cents(self_employment_tax / Decimal::TWO);
        log.cite(
            "deduction",
            "Schedule SE, Line 13",
            format!(
                "Deductible part of SE tax: {} / 2 = {}",
                display_amount(self_employment_tax),
                display_amount(deduction)
            ),
        );

        log::debug!(
            "Schedule SE: net earnings={}, tax={}, deduction={}",
            net_earnings,
            self_employment_tax,
            deduction
        );

        Ok(ScheduleSeOutput {
            net_earnings: round_cents(net_earnings),
            social_security_tax: round_cents(social_security),
            medicare_tax: round_cents(medicare),
            self_employment_tax,
            deduction,
            citations: log.finish(),
        })
    }
}
