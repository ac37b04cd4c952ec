use super::deduction::{compute_standard_deduction, DeductionFacts};
use super::rates::{ConfigError, TaxYear};
use super::unit::{Cited, FormUnit};
use crate::core::{display_amount, Citation, CitationLog, FilingStatus, LineItems};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

const FORM: &str = "1040";

/// Form 1040 - U.S. Individual Income Tax Return
#[derive(Debug, Default, Clone, Copy)]
pub struct MainReturn {
    pub year: TaxYear,
}

/// Figures gathered from the documents and the schedules that ran.
#[derive(Debug, Clone, Copy)]
pub struct MainReturnInput {
    pub status: FilingStatus,
    pub deduction_facts: DeductionFacts,
    pub qualifying_children: usize,
    pub wages: Decimal,
    pub withholding: Decimal,
    pub interest: Decimal,
    pub dividends: Decimal,
    /// Schedule 1 line 10
    pub additional_income: Decimal,
    /// Schedule 1 line 26
    pub adjustments: Decimal,
}

/// The Form 1040 lines the pipeline computes.
///
/// At most one of `refund` and `amount_owed` is non-zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, LineItems)]
#[line(form = "1040")]
pub struct Form1040 {
    #[line(number = "1z", label = "wages")]
    pub wages: Decimal,
    #[line(number = "2b", label = "taxable interest")]
    pub taxable_interest: Decimal,
    #[line(number = "3b", label = "ordinary dividends")]
    pub ordinary_dividends: Decimal,
    /// From Schedule 1, line 10
    #[line(number = "8", label = "additional income")]
    pub additional_income: Decimal,
    #[line(number = "9", label = "total income")]
    pub total_income: Decimal,
    /// From Schedule 1, line 26
    #[line(number = "10", label = "adjustments to income")]
    pub adjustments: Decimal,
    #[line(number = "11", label = "adjusted gross income")]
    pub adjusted_gross_income: Decimal,
    #[line(number = "12", label = "standard deduction")]
    pub standard_deduction: Decimal,
    #[line(number = "15", label = "taxable income")]
    pub taxable_income: Decimal,
    #[line(number = "16", label = "tax")]
    pub tax: Decimal,
    /// Limited to the line 16 tax
    #[line(number = "19", label = "child tax credit")]
    pub child_tax_credit: Decimal,
    /// Schedule 2 other taxes, self-employment tax only
    #[line(number = "23", label = "other taxes")]
    pub other_taxes: Decimal,
    #[line(number = "24", label = "total tax")]
    pub total_tax: Decimal,
    #[line(number = "25a", label = "federal income tax withheld")]
    pub withholding: Decimal,
    #[line(number = "33", label = "total payments")]
    pub total_payments: Decimal,
    #[line(number = "34", label = "refund")]
    pub refund: Decimal,
    #[line(number = "37", label = "amount owed")]
    pub amount_owed: Decimal,
    #[serde(default, skip_serializing)]
    pub citations: Vec<Citation>,
}

impl Cited for Form1040 {
    fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl Form1040 {
    /// Set line 23 and recompute the lines that depend on it (24, 34, 37).
    ///
    /// Citations for line 23 and the recomputed lines are replaced, so applying
    /// twice leaves one citation per line.
    pub fn apply_other_taxes(mut self, other_taxes: Decimal) -> Form1040 {
        let mut log = CitationLog::new(FORM);
        self.other_taxes = other_taxes;
        log.cite(
            "other taxes",
            "Schedule 2, Line 4",
            format!("Self-employment tax: {}", display_amount(other_taxes)),
        );
        self.compute_total_tax(&mut log);
        self.compute_refund_or_owed(&mut log);

        let recomputed = ["other taxes", "total tax", "refund", "amount owed"];
        self.citations.retain(|c| !recomputed.contains(&c.line.as_str()));
        self.citations.extend(log.finish());
        self
    }

    fn compute_total_tax(&mut self, log: &mut CitationLog) {
        self.total_tax = self.tax - self.child_tax_credit + self.other_taxes;
        log.cite(
            "total tax",
            "Form 1040 Instructions, Line 24",
            format!(
                "Total tax: {} = tax ({}) - credits ({}) + other taxes ({})",
                display_amount(self.total_tax),
                display_amount(self.tax),
                display_amount(self.child_tax_credit),
                display_amount(self.other_taxes)
            ),
        );
    }

    fn compute_refund_or_owed(&mut self, log: &mut CitationLog) {
        if self.total_payments > self.total_tax {
            self.refund = self.total_payments - self.total_tax;
            self.amount_owed = Decimal::ZERO;
            log.cite(
                "refund",
                "Form 1040 Instructions, Line 34",
                format!(
                    "Refund: {} = payments ({}) - total tax ({})",
                    display_amount(self.refund),
                    display_amount(self.total_payments),
                    display_amount(self.total_tax)
                ),
            );
        } else {
            self.refund = Decimal::ZERO;
            self.amount_owed = self.total_tax - self.total_payments;
            log.cite(
                "amount owed",
                "Form 1040 Instructions, Line 37",
                format!(
                    "Amount owed: {} = total tax ({}) - payments ({})",
                    display_amount(self.amount_owed),
                    display_amount(self.total_tax),
                    display_amount(self.total_payments)
                ),
            );
        }
    }
}

impl FormUnit for MainReturn {
    type Input = MainReturnInput;
    type Output = Form1040;
    const FORM: &'static str = FORM;

    fn process(&self, input: &MainReturnInput) -> Result<Form1040, ConfigError> {
        let year = self.year;
        let status = input.status;
        let schedule = year.rate_schedule(status)?;
        let mut log = CitationLog::new(FORM);
        let mut form = Form1040 {
            wages: input.wages,
            taxable_interest: input.interest,
            ordinary_dividends: input.dividends,
            additional_income: input.additional_income,
            adjustments: input.adjustments,
            withholding: input.withholding,
            ..Default::default()
        };

        form.total_income =
            form.wages + form.taxable_interest + form.ordinary_dividends + form.additional_income;
        log.cite(
            "total income",
            "Form 1040 Instructions, Line 9",
            format!(
                "Total income: {} = wages ({}) + interest ({}) + dividends ({}) + additional income ({})",
                display_amount(form.total_income),
                display_amount(form.wages),
                display_amount(form.taxable_interest),
                display_amount(form.ordinary_dividends),
                display_amount(form.additional_income)
            ),
        );

        form.adjusted_gross_income = form.total_income - form.adjustments;
        log.cite(
            "adjusted gross income",
            "Form 1040 Instructions, Line 11",
            format!(
                "AGI: {} = total income ({}) - adjustments ({})",
                display_amount(form.adjusted_gross_income),
                display_amount(form.total_income),
                display_amount(form.adjustments)
            ),
        );

        form.standard_deduction = compute_standard_deduction(status, input.deduction_facts, year);
        let conditions = input.deduction_facts.conditions(status);
        log.cite(
            "standard deduction",
            "Form 1040 Instructions, Line 12",
            if conditions > 0 {
                format!(
                    "Standard deduction for {status}: {} including {conditions} age/blindness addition(s)",
                    display_amount(form.standard_deduction)
                )
            } else {
                format!(
                    "Standard deduction for {status}: {}",
                    display_amount(form.standard_deduction)
                )
            },
        );

        form.taxable_income =
            (form.adjusted_gross_income - form.standard_deduction).max(Decimal::ZERO);
        log.cite(
            "taxable income",
            "Form 1040 Instructions, Line 15",
            format!(
                "Taxable income: max(0, {} - {}) = {}",
                display_amount(form.adjusted_gross_income),
                display_amount(form.standard_deduction),
                display_amount(form.taxable_income)
            ),
        );

        form.tax = schedule.compute_tax(form.taxable_income)?;
        log.cite(
            "tax",
            "Tax Rate Schedules",
            format!(
                "Tax on {} for {status}: {} (marginal rate {}%)",
                display_amount(form.taxable_income),
                display_amount(form.tax),
                schedule.marginal_rate(form.taxable_income) * Decimal::ONE_HUNDRED
            ),
        );

        if input.qualifying_children > 0 {
            let credit = year.child_tax_credit_per_child() * Decimal::from(input.qualifying_children);
            form.child_tax_credit = credit.min(form.tax);
            log.cite(
                "child tax credit",
                "Schedule 8812",
                format!(
                    "Child tax credit: {} for {} qualifying child(ren), limited to tax {}",
                    display_amount(form.child_tax_credit),
                    input.qualifying_children,
                    display_amount(form.tax)
                ),
            );
        }

        form.compute_total_tax(&mut log);

        form.total_payments = form.withholding;
        log.cite(
            "total payments",
            "Form 1040 Instructions, Line 33",
            format!("Total payments: withholding {}", display_amount(form.withholding)),
        );

        form.compute_refund_or_owed(&mut log);

        log::debug!(
            "Form 1040: agi={}, taxable={}, total tax={}, refund={}, owed={}",
            form.adjusted_gross_income,
            form.taxable_income,
            form.total_tax,
            form.refund,
            form.amount_owed
        );
        form.citations = log.finish();
        Ok(form)
    }
}
