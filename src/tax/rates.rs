use crate::core::{round_cents, FilingStatus};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no rate tables for tax year {0}")]
    UnsupportedYear(i32),
    #[error("{status} rate table has no brackets")]
    EmptyTable { status: FilingStatus },
    #[error("{status} bracket {index}: {reason}")]
    BracketDiscontinuity {
        status: FilingStatus,
        index: usize,
        reason: String,
    },
    #[error("no {status} bracket contains {income}")]
    NoBracket {
        status: FilingStatus,
        income: Decimal,
    },
}

/// Half-open income interval `[lower, upper)` taxed at `rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub lower: Decimal,
    /// `None` for the top bracket
    pub upper: Option<Decimal>,
    pub rate: Decimal,
    /// Tax on income up to `lower`
    pub base_tax: Decimal,
}

impl Bracket {
    const fn new(lower: Decimal, upper: Option<Decimal>, rate: Decimal, base_tax: Decimal) -> Self {
        Bracket {
            lower,
            upper,
            rate,
            base_tax,
        }
    }

    pub fn contains(&self, income: Decimal) -> bool {
        self.lower <= income && self.upper.map_or(true, |upper| income < upper)
    }

    /// Tax on the full width of this bracket, `None` for the top bracket.
    fn full_width_tax(&self) -> Option<Decimal> {
        self.upper.map(|upper| (upper - self.lower) * self.rate)
    }
}

/// Validated bracket table for one filing status
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RateSchedule {
    pub status: FilingStatus,
    pub brackets: Vec<Bracket>,
}

impl RateSchedule {
    /// Build a schedule, rejecting tables with gaps, overlaps or jumps.
    pub fn new(status: FilingStatus, brackets: Vec<Bracket>) -> Result<Self, ConfigError> {
        let schedule = RateSchedule { status, brackets };
        schedule.validate()?;
        Ok(schedule)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let status = self.status;
        let broken = |index: usize, reason: String| ConfigError::BracketDiscontinuity {
            status,
            index,
            reason,
        };

        let Some(first) = self.brackets.first() else {
            return Err(ConfigError::EmptyTable { status });
        };
        if !first.lower.is_zero() || !first.base_tax.is_zero() {
            return Err(broken(0, "first bracket must start at 0 with no base tax".into()));
        }

        for (index, pair) in self.brackets.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            let Some(upper) = current.upper else {
                return Err(broken(index, "only the last bracket may be unbounded".into()));
            };
            if upper <= current.lower {
                return Err(broken(index, format!("upper {} not above lower {}", upper, current.lower)));
            }
            if next.lower != upper {
                return Err(broken(
                    index + 1,
                    format!("lower {} does not meet previous upper {}", next.lower, upper),
                ));
            }
            let expected = current.base_tax + current.full_width_tax().unwrap_or_default();
            if next.base_tax != expected {
                return Err(broken(
                    index + 1,
                    format!("base tax {} should be {}", next.base_tax, expected),
                ));
            }
        }

        let last = self.brackets.len() - 1;
        if self.brackets[last].upper.is_some() {
            return Err(broken(last, "last bracket must be unbounded".into()));
        }
        Ok(())
    }

    pub fn bracket_for(&self, income: Decimal) -> Option<&Bracket> {
        self.brackets.iter().find(|b| b.contains(income))
    }

    /// Tax on `taxable_income`, rounded to the cent. Zero for non-positive income.
    pub fn compute_tax(&self, taxable_income: Decimal) -> Result<Decimal, ConfigError> {
        if taxable_income <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let bracket = self
            .bracket_for(taxable_income)
            .ok_or(ConfigError::NoBracket {
                status: self.status,
                income: taxable_income,
            })?;
        let tax = bracket.base_tax + (taxable_income - bracket.lower) * bracket.rate;
        log::debug!(
            "Tax on {} ({}): bracket from {} at {} -> {}",
            taxable_income,
            self.status,
            bracket.lower,
            bracket.rate,
            tax
        );
        Ok(round_cents(tax))
    }

    pub fn marginal_rate(&self, taxable_income: Decimal) -> Decimal {
        self.bracket_for(taxable_income.max(Decimal::ZERO))
            .or(self.brackets.last())
            .map_or(Decimal::ZERO, |b| b.rate)
    }

    pub fn effective_rate(&self, taxable_income: Decimal) -> Result<Decimal, ConfigError> {
        if taxable_income <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        Ok(self.compute_tax(taxable_income)? / taxable_income)
    }
}

/// Linear phase-out window `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOut {
    pub start: Decimal,
    pub end: Decimal,
}

/// Tax year whose constants are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct TaxYear(i32);

impl TaxYear {
    pub const SUPPORTED: [i32; 1] = [2024];

    pub fn new(year: i32) -> Result<Self, ConfigError> {
        if Self::SUPPORTED.contains(&year) {
            Ok(TaxYear(year))
        } else {
            Err(ConfigError::UnsupportedYear(year))
        }
    }

    pub fn year(&self) -> i32 {
        self.0
    }

    /// Validated bracket table for `status`.
    pub fn rate_schedule(&self, status: FilingStatus) -> Result<RateSchedule, ConfigError> {
        RateSchedule::new(status, self.brackets(status))
    }

    // Rev. Proc. 2023-34
    fn brackets(&self, status: FilingStatus) -> Vec<Bracket> {
        let b = |lower, upper, rate, base| Bracket::new(lower, Some(upper), rate, base);
        let top = |lower, base| Bracket::new(lower, None, dec!(0.37), base);
        match status {
            FilingStatus::Single => vec![
                b(dec!(0), dec!(11600), dec!(0.10), dec!(0)),
                b(dec!(11600), dec!(47150), dec!(0.12), dec!(1160)),
                b(dec!(47150), dec!(100525), dec!(0.22), dec!(5426)),
                b(dec!(100525), dec!(191950), dec!(0.24), dec!(17168.50)),
                b(dec!(191950), dec!(243725), dec!(0.32), dec!(39110.50)),
                b(dec!(243725), dec!(609350), dec!(0.35), dec!(55678.50)),
                top(dec!(609350), dec!(183647.25)),
            ],
            FilingStatus::MarriedFilingJointly | FilingStatus::QualifyingWidow => vec![
                b(dec!(0), dec!(23200), dec!(0.10), dec!(0)),
                b(dec!(23200), dec!(94300), dec!(0.12), dec!(2320)),
                b(dec!(94300), dec!(201050), dec!(0.22), dec!(10852)),
                b(dec!(201050), dec!(383900), dec!(0.24), dec!(34337)),
                b(dec!(383900), dec!(487450), dec!(0.32), dec!(78221)),
                b(dec!(487450), dec!(731200), dec!(0.35), dec!(111357)),
                top(dec!(731200), dec!(196669.50)),
            ],
            FilingStatus::MarriedFilingSeparately => vec![
                b(dec!(0), dec!(11600), dec!(0.10), dec!(0)),
                b(dec!(11600), dec!(47150), dec!(0.12), dec!(1160)),
                b(dec!(47150), dec!(100525), dec!(0.22), dec!(5426)),
                b(dec!(100525), dec!(191950), dec!(0.24), dec!(17168.50)),
                b(dec!(191950), dec!(243725), dec!(0.32), dec!(39110.50)),
                b(dec!(243725), dec!(365600), dec!(0.35), dec!(55678.50)),
                top(dec!(365600), dec!(98334.75)),
            ],
            FilingStatus::HeadOfHousehold => vec![
                b(dec!(0), dec!(16550), dec!(0.10), dec!(0)),
                b(dec!(16550), dec!(63100), dec!(0.12), dec!(1655)),
                b(dec!(63100), dec!(100500), dec!(0.22), dec!(7241)),
                b(dec!(100500), dec!(191950), dec!(0.24), dec!(15469)),
                b(dec!(191950), dec!(243700), dec!(0.32), dec!(37417)),
                b(dec!(243700), dec!(609350), dec!(0.35), dec!(53977)),
                top(dec!(609350), dec!(181954.50)),
            ],
        }
    }

    pub fn standard_deduction(&self, status: FilingStatus) -> Decimal {
        match status {
            FilingStatus::Single | FilingStatus::MarriedFilingSeparately => dec!(14600),
            FilingStatus::MarriedFilingJointly | FilingStatus::QualifyingWidow => dec!(29200),
            FilingStatus::HeadOfHousehold => dec!(21900),
        }
    }

    /// Extra standard deduction per condition (65 or older, blind) per person
    pub fn additional_deduction(&self, status: FilingStatus) -> Decimal {
        match status {
            FilingStatus::Single | FilingStatus::HeadOfHousehold => dec!(1950),
            FilingStatus::MarriedFilingJointly
            | FilingStatus::MarriedFilingSeparately
            | FilingStatus::QualifyingWidow => dec!(1550),
        }
    }

    /// Per eligible educator
    pub fn educator_expense_limit(&self) -> Decimal {
        dec!(300)
    }

    pub fn student_loan_interest_limit(&self) -> Decimal {
        dec!(2500)
    }

    pub fn student_loan_phase_out(&self, status: FilingStatus) -> PhaseOut {
        if status.is_joint() {
            PhaseOut {
                start: dec!(165000),
                end: dec!(195000),
            }
        } else {
            PhaseOut {
                start: dec!(80000),
                end: dec!(95000),
            }
        }
    }

    /// Form 461 limit on business losses
    pub fn excess_business_loss_threshold(&self, status: FilingStatus) -> Decimal {
        if status.is_joint() {
            dec!(610000)
        } else {
            dec!(305000)
        }
    }

    /// Net profit at or below which no self-employment tax is due
    pub fn self_employment_threshold(&self) -> Decimal {
        dec!(400)
    }

    /// Share of net profit treated as net earnings from self-employment
    pub fn self_employment_earnings_factor(&self) -> Decimal {
        dec!(0.9235)
    }

    pub fn social_security_rate(&self) -> Decimal {
        dec!(0.124)
    }

    pub fn medicare_rate(&self) -> Decimal {
        dec!(0.029)
    }

    pub fn social_security_wage_base(&self) -> Decimal {
        dec!(168600)
    }

    pub fn child_tax_credit_per_child(&self) -> Decimal {
        dec!(2000)
    }
}

impl TryFrom<i32> for TaxYear {
    type Error = ConfigError;

    fn try_from(year: i32) -> Result<Self, Self::Error> {
        TaxYear::new(year)
    }
}

impl From<TaxYear> for i32 {
    fn from(year: TaxYear) -> Self {
        year.0
    }
}

impl Default for TaxYear {
    fn default() -> Self {
        TaxYear(2024)
    }
}

impl std::fmt::Display for TaxYear {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Tax on `taxable_income` for `status` in `year`.
pub fn compute_tax(
    taxable_income: Decimal,
    status: FilingStatus,
    year: TaxYear,
) -> Result<Decimal, ConfigError> {
    year.rate_schedule(status)?.compute_tax(taxable_income)
}
