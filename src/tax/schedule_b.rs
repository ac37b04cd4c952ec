use super::rates::ConfigError;
use super::unit::{Cited, FormUnit};
use crate::core::{display_amount, Citation, CitationLog, DividendRecord, InterestRecord, LineItems};
use rust_decimal::Decimal;
use serde::Serialize;

/// Schedule B - Interest and Ordinary Dividends
#[derive(Debug, Default, Clone, Copy)]
pub struct ScheduleB;

#[derive(Debug, Clone, Default)]
pub struct ScheduleBInput {
    pub interest: Vec<InterestRecord>,
    pub dividends: Vec<DividendRecord>,
}

#[derive(Debug, Clone, Default, Serialize, LineItems)]
#[line(form = "schedule-b")]
pub struct ScheduleBOutput {
    /// Taxable interest from all payers
    #[line(number = "4", label = "total interest")]
    pub total_interest: Decimal,
    /// Ordinary dividends from all payers
    #[line(number = "6", label = "total dividends")]
    pub total_dividends: Decimal,
    /// Qualified portion of the ordinary dividends (informational)
    #[line(number = "3a", label = "qualified dividends")]
    pub qualified_dividends: Decimal,
    #[serde(skip)]
    pub citations: Vec<Citation>,
}

impl Cited for ScheduleBOutput {
    fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl FormUnit for ScheduleB {
    type Input = ScheduleBInput;
    type Output = ScheduleBOutput;
    const FORM: &'static str = "schedule-b";

    fn process(&self, input: &ScheduleBInput) -> Result<ScheduleBOutput, ConfigError> {
        let mut log = CitationLog::new(Self::FORM);
        let mut output = ScheduleBOutput::default();

        if !input.interest.is_empty() {
            output.total_interest = input.interest.iter().map(|r| r.amount).sum();
            log.cite(
                "total interest",
                "Form 1099-INT aggregation",
                format!(
                    "Total interest income: {} from {} payer(s)",
                    display_amount(output.total_interest),
                    input.interest.len()
                ),
            );
        }

        if !input.dividends.is_empty() {
            output.total_dividends = input.dividends.iter().map(|r| r.ordinary).sum();
            output.qualified_dividends = input.dividends.iter().map(|r| r.qualified).sum();
            log.cite(
                "total dividends",
                "Form 1099-DIV aggregation",
                format!(
                    "Total ordinary dividends: {} from {} payer(s)",
                    display_amount(output.total_dividends),
                    input.dividends.len()
                ),
            );
        }

        log::debug!(
            "Schedule B: interest={}, dividends={}",
            output.total_interest,
            output.total_dividends
        );
        output.citations = log.finish();
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn interest(amount: Decimal) -> InterestRecord {
        InterestRecord {
            payer: None,
            amount,
        }
    }

    fn dividend(ordinary: Decimal, qualified: Decimal) -> DividendRecord {
        DividendRecord {
            payer: None,
            ordinary,
            qualified,
        }
    }

    #[test]
    fn sums_each_category() {
        let input = ScheduleBInput {
            interest: vec![interest(dec!(150.50)), interest(dec!(75.25))],
            dividends: vec![dividend(dec!(500), dec!(400))],
        };
        let output = ScheduleB.process(&input).unwrap();
        assert_eq!(output.total_interest, dec!(225.75));
        assert_eq!(output.total_dividends, dec!(500));
        assert_eq!(output.qualified_dividends, dec!(400));
        assert_eq!(output.citations.len(), 2);
        assert!(output.citations[0].justification.contains("2 payer(s)"));
    }

    #[test]
    fn empty_category_has_no_citation() {
        let input = ScheduleBInput {
            interest: vec![interest(dec!(10))],
            dividends: vec![],
        };
        let output = ScheduleB.process(&input).unwrap();
        assert_eq!(output.total_dividends, dec!(0));
        assert_eq!(output.citations.len(), 1);
        assert_eq!(output.citations[0].line, "total interest");
    }

    #[test]
    fn order_does_not_matter() {
        let a = ScheduleBInput {
            interest: vec![interest(dec!(1.11)), interest(dec!(2.22)), interest(dec!(3.33))],
            dividends: vec![],
        };
        let b = ScheduleBInput {
            interest: a.interest.iter().rev().cloned().collect(),
            dividends: vec![],
        };
        assert_eq!(
            ScheduleB.process(&a).unwrap().total_interest,
            ScheduleB.process(&b).unwrap().total_interest
        );
    }

    #[test]
    fn exposes_line_items() {
        let input = ScheduleBInput {
            interest: vec![interest(dec!(10))],
            dividends: vec![dividend(dec!(20), dec!(5))],
        };
        let output = ScheduleB.process(&input).unwrap();
        assert_eq!(output.amount("total dividends"), Some(dec!(20)));
        assert_eq!(output.amount("4"), Some(dec!(10)));
    }
}
