//! Independent arithmetic check of a finished Form 1040.
//!
//! Findings are data: a failed check never raises.

use super::form_1040::Form1040;
use crate::core::{display_amount, within_cent};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// AGI above which a return is flagged for manual review
const HIGH_INCOME_REVIEW: Decimal = dec!(1000000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Arithmetic,
    Logic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationError {
    pub form: String,
    pub line: String,
    pub category: ErrorCategory,
    pub message: String,
    pub expected: Decimal,
    pub actual: Decimal,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verifier: String,
    pub passed: bool,
    pub errors: Vec<VerificationError>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ArithmeticVerifier;

impl ArithmeticVerifier {
    pub const NAME: &'static str = "arithmetic";

    pub fn verify(&self, form: &Form1040) -> VerificationResult {
        let mut errors = Vec::new();

        let mut check = |line: &str, expected: Decimal, actual: Decimal| {
            if !within_cent(expected, actual) {
                errors.push(VerificationError {
                    form: "1040".to_string(),
                    line: line.to_string(),
                    category: ErrorCategory::Arithmetic,
                    message: format!(
                        "{line} is {} but the lines it is built from give {}",
                        display_amount(actual),
                        display_amount(expected)
                    ),
                    expected,
                    actual,
                    severity: Severity::Error,
                });
            }
        };

        check(
            "total income",
            form.wages + form.taxable_interest + form.ordinary_dividends + form.additional_income,
            form.total_income,
        );
        check(
            "adjusted gross income",
            form.total_income - form.adjustments,
            form.adjusted_gross_income,
        );
        check(
            "taxable income",
            (form.adjusted_gross_income - form.standard_deduction).max(Decimal::ZERO),
            form.taxable_income,
        );
        check(
            "total tax",
            form.tax - form.child_tax_credit + form.other_taxes,
            form.total_tax,
        );

        let balance = form.total_payments - form.total_tax;
        if balance > Decimal::ZERO {
            check("refund", balance, form.refund);
        } else {
            check("amount owed", -balance, form.amount_owed);
        }

        if form.taxable_income < Decimal::ZERO {
            errors.push(logic_error(
                "taxable income",
                "Taxable income cannot be negative",
                Decimal::ZERO,
                form.taxable_income,
                Severity::Critical,
            ));
        }
        if balance > Decimal::ZERO && form.amount_owed != Decimal::ZERO {
            errors.push(logic_error(
                "amount owed",
                "Payments exceed total tax but an amount owed is reported",
                Decimal::ZERO,
                form.amount_owed,
                Severity::Error,
            ));
        }
        if balance <= Decimal::ZERO && form.refund != Decimal::ZERO {
            errors.push(logic_error(
                "refund",
                "Total tax is not covered by payments but a refund is reported",
                Decimal::ZERO,
                form.refund,
                Severity::Error,
            ));
        }

        let mut warnings = Vec::new();
        if form.adjusted_gross_income > HIGH_INCOME_REVIEW {
            warnings.push(format!(
                "High income ({}) - manual review recommended",
                display_amount(form.adjusted_gross_income)
            ));
        }
        if form.tax == Decimal::ZERO && form.taxable_income > Decimal::ZERO {
            warnings.push("Zero tax with positive taxable income".to_string());
        }
        if form.child_tax_credit > Decimal::ZERO && form.child_tax_credit == form.tax {
            warnings.push(format!(
                "Child tax credit limited to tax of {}",
                display_amount(form.tax)
            ));
        }

        let passed = errors.is_empty();
        if passed {
            log::debug!("verification passed with {} warning(s)", warnings.len());
        } else {
            log::warn!("verification failed with {} error(s)", errors.len());
        }

        VerificationResult {
            verifier: Self::NAME.to_string(),
            passed,
            errors,
            warnings,
        }
    }
}

fn logic_error(
    line: &str,
    message: &str,
    expected: Decimal,
    actual: Decimal,
    severity: Severity,
) -> VerificationError {
    VerificationError {
        form: "1040".to_string(),
        line: line.to_string(),
        category: ErrorCategory::Logic,
        message: message.to_string(),
        expected,
        actual,
        severity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consistent() -> Form1040 {
        Form1040 {
            wages: dec!(50000),
            total_income: dec!(50000),
            adjusted_gross_income: dec!(50000),
            standard_deduction: dec!(14600),
            taxable_income: dec!(35400),
            tax: dec!(4016),
            total_tax: dec!(4016),
            withholding: dec!(5000),
            total_payments: dec!(5000),
            refund: dec!(984),
            ..Default::default()
        }
    }

    #[test]
    fn consistent_return_passes() {
        let result = ArithmeticVerifier.verify(&consistent());
        assert!(result.passed);
        assert!(result.errors.is_empty());
        assert!(result.warnings.is_empty());
        assert_eq!(result.verifier, "arithmetic");
    }

    #[test]
    fn one_cent_tolerance() {
        let form = Form1040 {
            total_income: dec!(50000.01),
            adjusted_gross_income: dec!(50000.01),
            ..consistent()
        };
        assert!(ArithmeticVerifier.verify(&form).passed);

        let form = Form1040 {
            total_income: dec!(50000.02),
            adjusted_gross_income: dec!(50000.02),
            ..consistent()
        };
        let result = ArithmeticVerifier.verify(&form);
        assert!(!result.passed);
        assert_eq!(result.errors[0].line, "total income");
        assert_eq!(result.errors[0].expected, dec!(50000));
        assert_eq!(result.errors[0].actual, dec!(50000.02));
    }

    #[test]
    fn negative_taxable_income_is_critical() {
        let form = Form1040 {
            taxable_income: dec!(-100),
            ..consistent()
        };
        let result = ArithmeticVerifier.verify(&form);
        assert!(!result.passed);
        let critical = result
            .errors
            .iter()
            .find(|e| e.severity == Severity::Critical)
            .unwrap();
        assert_eq!(critical.category, ErrorCategory::Logic);
        assert_eq!(critical.line, "taxable income");
    }

    #[test]
    fn owed_on_refund_side_is_logic_error() {
        let form = Form1040 {
            amount_owed: dec!(10),
            ..consistent()
        };
        let result = ArithmeticVerifier.verify(&form);
        assert!(!result.passed);
        assert!(result
            .errors
            .iter()
            .any(|e| e.category == ErrorCategory::Logic && e.line == "amount owed"));
    }

    #[test]
    fn wrong_refund_is_arithmetic_error() {
        let form = Form1040 {
            refund: dec!(900),
            ..consistent()
        };
        let result = ArithmeticVerifier.verify(&form);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].category, ErrorCategory::Arithmetic);
        assert_eq!(result.errors[0].expected, dec!(984));
    }

    #[test]
    fn warnings_do_not_fail() {
        let form = Form1040 {
            wages: dec!(2000000),
            total_income: dec!(2000000),
            adjusted_gross_income: dec!(2000000),
            taxable_income: dec!(1985400),
            tax: dec!(0),
            total_tax: dec!(0),
            refund: dec!(5000),
            ..consistent()
        };
        let result = ArithmeticVerifier.verify(&form);
        assert!(result.passed);
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn limited_child_credit_warns() {
        let form = Form1040 {
            child_tax_credit: dec!(4016),
            total_tax: dec!(0),
            refund: dec!(5000),
            ..consistent()
        };
        let result = ArithmeticVerifier.verify(&form);
        assert!(result.passed);
        assert_eq!(result.warnings, ["Child tax credit limited to tax of $4,016.00"]);
    }

    #[test]
    fn idempotent() {
        let form = Form1040 {
            total_tax: dec!(1),
            ..consistent()
        };
        let first = ArithmeticVerifier.verify(&form);
        let second = ArithmeticVerifier.verify(&form);
        assert_eq!(first, second);
    }
}
