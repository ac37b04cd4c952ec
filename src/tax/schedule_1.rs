use super::adjustments::{
    educator_expense_deduction, excess_business_loss, student_loan_interest_deduction,
    EducatorExpenses,
};
use super::rates::{ConfigError, TaxYear};
use super::unit::{Cited, FormUnit};
use crate::core::{display_amount, Citation, CitationLog, FilingStatus, LineItems};
use rust_decimal::Decimal;
use serde::Serialize;

/// Schedule 1 - Additional Income and Adjustments to Income
#[derive(Debug, Default, Clone, Copy)]
pub struct Schedule1Unit {
    pub year: TaxYear,
}

#[derive(Debug, Clone, Copy)]
pub struct Schedule1Input {
    pub status: FilingStatus,
    /// Schedule C net result, if a business was reported
    pub business_result: Option<Decimal>,
    /// Schedule SE line 13
    pub self_employment_deduction: Decimal,
    pub educator: EducatorExpenses,
    pub student_loan_interest_paid: Decimal,
    /// Wages, interest and ordinary dividends
    pub other_income: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, LineItems)]
#[line(form = "schedule-1")]
pub struct Schedule1 {
    #[line(number = "3", label = "business income")]
    pub business_income: Decimal,
    /// Form 461 excess business loss added back to income
    #[line(number = "8p", label = "excess business loss")]
    pub excess_business_loss: Decimal,
    #[line(number = "10", label = "additional income")]
    pub additional_income: Decimal,
    #[line(number = "11", label = "educator expenses")]
    pub educator_expenses: Decimal,
    #[line(number = "15", label = "self-employment tax deduction")]
    pub self_employment_deduction: Decimal,
    #[line(number = "21", label = "student loan interest")]
    pub student_loan_interest: Decimal,
    #[line(number = "26", label = "adjustments to income")]
    pub total_adjustments: Decimal,
    #[serde(skip)]
    pub citations: Vec<Citation>,
}

impl Cited for Schedule1 {
    fn citations(&self) -> &[Citation] {
        &self.citations
    }
}

impl FormUnit for Schedule1Unit {
    type Input = Schedule1Input;
    type Output = Schedule1;
    const FORM: &'static str = "schedule-1";

    fn process(&self, input: &Schedule1Input) -> Result<Schedule1, ConfigError> {
        let year = self.year;
        let status = input.status;
        let mut log = CitationLog::new(Self::FORM);
        let mut schedule = Schedule1::default();

        if let Some(result) = input.business_result {
            schedule.business_income = result;
            log.cite(
                "business income",
                "Schedule 1, Line 3",
                format!("Schedule C net result: {}", display_amount(result)),
            );

            schedule.excess_business_loss = excess_business_loss(result, status, year);
            if schedule.excess_business_loss > Decimal::ZERO {
                log.cite(
                    "excess business loss",
                    "Form 461 Instructions",
                    format!(
                        "Loss of {} exceeds the {} threshold for {}; {} added back",
                        display_amount(result.abs()),
                        display_amount(year.excess_business_loss_threshold(status)),
                        status,
                        display_amount(schedule.excess_business_loss)
                    ),
                );
            }
        }
        schedule.additional_income = schedule.business_income + schedule.excess_business_loss;

        if input.self_employment_deduction > Decimal::ZERO {
            schedule.self_employment_deduction = input.self_employment_deduction;
            log.cite(
                "self-employment tax deduction",
                "Schedule 1, Line 15",
                format!(
                    "Deductible part of self-employment tax: {}",
                    display_amount(input.self_employment_deduction)
                ),
            );
        }

        schedule.educator_expenses = educator_expense_deduction(input.educator, status, year);
        if schedule.educator_expenses > Decimal::ZERO {
            log.cite(
                "educator expenses",
                "Form 1040 Instructions, Schedule 1 Line 11",
                format!(
                    "Educator expenses: {} (limit {} per eligible educator)",
                    display_amount(schedule.educator_expenses),
                    display_amount(year.educator_expense_limit())
                ),
            );
        }

        // Student loan MAGI excludes the student loan deduction itself
        let magi = input.other_income + schedule.additional_income
            - (schedule.self_employment_deduction + schedule.educator_expenses);
        if input.student_loan_interest_paid > Decimal::ZERO {
            schedule.student_loan_interest =
                student_loan_interest_deduction(input.student_loan_interest_paid, magi, status, year);
            let window = year.student_loan_phase_out(status);
            log.cite(
                "student loan interest",
                "Student Loan Interest Deduction Worksheet",
                format!(
                    "Deduction {} of {} paid; MAGI {} against phase-out {}-{}",
                    display_amount(schedule.student_loan_interest),
                    display_amount(input.student_loan_interest_paid),
                    display_amount(magi),
                    display_amount(window.start),
                    display_amount(window.end)
                ),
            );
        }

        schedule.total_adjustments = schedule.educator_expenses
            + schedule.self_employment_deduction
            + schedule.student_loan_interest;
        log.cite(
            "adjustments to income",
            "Schedule 1, Line 26",
            format!("Total adjustments: {}", display_amount(schedule.total_adjustments)),
        );

        log::debug!(
            "Schedule 1: additional income={}, adjustments={}, magi={}",
            schedule.additional_income,
            schedule.total_adjustments,
            magi
        );
        schedule.citations = log.finish();
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(status: FilingStatus) -> Schedule1Input {
        Schedule1Input {
            status,
            business_result: None,
            self_employment_deduction: Decimal::ZERO,
            educator: EducatorExpenses::default(),
            student_loan_interest_paid: Decimal::ZERO,
            other_income: Decimal::ZERO,
        }
    }

    fn run(input: Schedule1Input) -> Schedule1 {
        Schedule1Unit::default().process(&input).unwrap()
    }

    #[test]
    fn large_loss_added_back_for_single() {
        let schedule = run(Schedule1Input {
            business_result: Some(dec!(-400000)),
            ..input(FilingStatus::Single)
        });
        assert_eq!(schedule.business_income, dec!(-400000));
        assert_eq!(schedule.excess_business_loss, dec!(95000));
        assert_eq!(schedule.additional_income, dec!(-305000));
    }

    #[test]
    fn same_loss_under_joint_threshold() {
        let schedule = run(Schedule1Input {
            business_result: Some(dec!(-400000)),
            ..input(FilingStatus::MarriedFilingJointly)
        });
        assert_eq!(schedule.excess_business_loss, dec!(0));
        assert_eq!(schedule.additional_income, dec!(-400000));
        assert!(schedule.citations.iter().all(|c| c.line != "excess business loss"));
    }

    #[test]
    fn adjustments_total() {
        let schedule = run(Schedule1Input {
            business_result: Some(dec!(60500)),
            self_employment_deduction: dec!(4274.19),
            educator: EducatorExpenses {
                paid: dec!(450),
                eligible: true,
                ..Default::default()
            },
            ..input(FilingStatus::Single)
        });
        assert_eq!(schedule.educator_expenses, dec!(300));
        assert_eq!(schedule.total_adjustments, dec!(4574.19));
        assert_eq!(schedule.additional_income, dec!(60500));
    }

    #[test]
    fn student_loan_magi_excludes_its_own_deduction() {
        // 90,000 wages less a 2,500 SE deduction puts MAGI at 87,500
        let schedule = run(Schedule1Input {
            self_employment_deduction: dec!(2500),
            student_loan_interest_paid: dec!(3000),
            other_income: dec!(90000),
            ..input(FilingStatus::Single)
        });
        assert_eq!(schedule.student_loan_interest, dec!(1250));
        assert_eq!(schedule.total_adjustments, dec!(3750));
    }

    #[test]
    fn no_adjustments_cites_zero_total() {
        let schedule = run(input(FilingStatus::HeadOfHousehold));
        assert_eq!(schedule.total_adjustments, dec!(0));
        assert_eq!(schedule.citations.len(), 1);
        assert_eq!(schedule.amount("26"), Some(dec!(0)));
    }
}
