//! Schedule 1 adjustment formulas: educator expenses, student loan interest
//! and the Form 461 excess business loss limit.

use super::rates::TaxYear;
use crate::core::{round_cents, FilingStatus};
use rust_decimal::Decimal;

/// Amounts an educator (and, on a joint return, the spouse) paid
#[derive(Debug, Clone, Copy, Default)]
pub struct EducatorExpenses {
    pub paid: Decimal,
    pub eligible: bool,
    pub spouse_paid: Decimal,
    pub spouse_eligible: bool,
}

pub fn educator_expense_deduction(
    expenses: EducatorExpenses,
    status: FilingStatus,
    year: TaxYear,
) -> Decimal {
    let limit = year.educator_expense_limit();
    let mut deduction = Decimal::ZERO;
    if expenses.eligible {
        deduction += expenses.paid.min(limit);
    }
    if status.is_joint() && expenses.spouse_eligible {
        deduction += expenses.spouse_paid.min(limit);
    }
    deduction
}

/// Student loan interest deduction, phased out linearly over the MAGI window.
pub fn student_loan_interest_deduction(
    interest_paid: Decimal,
    magi: Decimal,
    status: FilingStatus,
    year: TaxYear,
) -> Decimal {
    let deduction = interest_paid.min(year.student_loan_interest_limit());
    let window = year.student_loan_phase_out(status);

    if magi <= window.start {
        deduction
    } else if magi >= window.end {
        Decimal::ZERO
    } else {
        let reduction = (magi - window.start) / (window.end - window.start);
        round_cents(deduction * (Decimal::ONE - reduction))
    }
}

/// Portion of a business loss beyond the Form 461 threshold, added back to income.
///
/// `net_business_result` is the Schedule C result; profits and zero yield 0.
pub fn excess_business_loss(
    net_business_result: Decimal,
    status: FilingStatus,
    year: TaxYear,
) -> Decimal {
    if net_business_result >= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let loss = net_business_result.abs();
    let threshold = year.excess_business_loss_threshold(status);
    if loss > threshold {
        loss - threshold
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn year() -> TaxYear {
        TaxYear::default()
    }

    #[test]
    fn educator_capped_per_person() {
        let expenses = EducatorExpenses {
            paid: dec!(400),
            eligible: true,
            spouse_paid: dec!(400),
            spouse_eligible: true,
        };
        assert_eq!(
            educator_expense_deduction(expenses, FilingStatus::Single, year()),
            dec!(300)
        );
        assert_eq!(
            educator_expense_deduction(expenses, FilingStatus::MarriedFilingJointly, year()),
            dec!(600)
        );
    }

    #[test]
    fn educator_spouse_only_counts_on_joint_return() {
        let expenses = EducatorExpenses {
            paid: dec!(0),
            eligible: false,
            spouse_paid: dec!(250),
            spouse_eligible: true,
        };
        for status in [
            FilingStatus::Single,
            FilingStatus::MarriedFilingSeparately,
            FilingStatus::QualifyingWidow,
            FilingStatus::HeadOfHousehold,
        ] {
            assert_eq!(educator_expense_deduction(expenses, status, year()), dec!(0));
        }
        assert_eq!(
            educator_expense_deduction(expenses, FilingStatus::MarriedFilingJointly, year()),
            dec!(250)
        );
    }

    #[test]
    fn educator_requires_eligibility() {
        let expenses = EducatorExpenses {
            paid: dec!(200),
            ..Default::default()
        };
        assert_eq!(
            educator_expense_deduction(expenses, FilingStatus::Single, year()),
            dec!(0)
        );
    }

    #[test]
    fn student_loan_full_below_window() {
        assert_eq!(
            student_loan_interest_deduction(dec!(3000), dec!(50000), FilingStatus::Single, year()),
            dec!(2500)
        );
        assert_eq!(
            student_loan_interest_deduction(dec!(1800), dec!(80000), FilingStatus::Single, year()),
            dec!(1800)
        );
    }

    #[test]
    fn student_loan_halfway_through_window() {
        assert_eq!(
            student_loan_interest_deduction(dec!(3000), dec!(87500), FilingStatus::Single, year()),
            dec!(1250)
        );
        assert_eq!(
            student_loan_interest_deduction(
                dec!(3000),
                dec!(180000),
                FilingStatus::MarriedFilingJointly,
                year()
            ),
            dec!(1250)
        );
    }

    #[test]
    fn student_loan_zero_at_and_above_end() {
        for magi in [dec!(95000), dec!(95000.01), dec!(250000)] {
            assert_eq!(
                student_loan_interest_deduction(dec!(3000), magi, FilingStatus::Single, year()),
                dec!(0)
            );
        }
    }

    #[test]
    fn student_loan_piecewise_linear_and_non_increasing() {
        for status in FilingStatus::ALL {
            let window = year().student_loan_phase_out(status);
            let mut previous = dec!(2500);
            let mut magi = window.start - dec!(5000);
            while magi <= window.end + dec!(5000) {
                let d = student_loan_interest_deduction(dec!(2500), magi, status, year());
                assert!(d <= previous, "{status}: rose at {magi}");
                assert!(d >= dec!(0));
                // Continuous: steps of 250 move the deduction by at most 2500 * 250 / width
                let width = window.end - window.start;
                assert!(previous - d <= dec!(2500) * dec!(250) / width + dec!(0.01));
                previous = d;
                magi += dec!(250);
            }
        }
    }

    #[test]
    fn excess_business_loss_single_and_joint() {
        assert_eq!(
            excess_business_loss(dec!(-400000), FilingStatus::Single, year()),
            dec!(95000)
        );
        assert_eq!(
            excess_business_loss(dec!(-400000), FilingStatus::MarriedFilingJointly, year()),
            dec!(0)
        );
        assert_eq!(
            excess_business_loss(dec!(-305000), FilingStatus::Single, year()),
            dec!(0)
        );
    }

    #[test]
    fn excess_business_loss_ignores_profit() {
        assert_eq!(
            excess_business_loss(dec!(900000), FilingStatus::Single, year()),
            dec!(0)
        );
        assert_eq!(excess_business_loss(dec!(0), FilingStatus::Single, year()), dec!(0));
    }
}
