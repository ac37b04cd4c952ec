use super::rates::TaxYear;
use crate::core::FilingStatus;
use rust_decimal::Decimal;

/// Age and blindness facts that raise the standard deduction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeductionFacts {
    pub taxpayer_age: Option<u32>,
    pub taxpayer_blind: bool,
    pub spouse_age: Option<u32>,
    pub spouse_blind: bool,
}

impl DeductionFacts {
    /// Number of additional-deduction conditions that apply under `status`.
    pub fn conditions(&self, status: FilingStatus) -> u32 {
        let senior = |age: Option<u32>| age.is_some_and(|a| a >= 65);
        let mut count = u32::from(senior(self.taxpayer_age)) + u32::from(self.taxpayer_blind);
        if status.counts_spouse() {
            count += u32::from(senior(self.spouse_age)) + u32::from(self.spouse_blind);
        }
        count
    }
}

/// Standard deduction including the additional amounts for age and blindness.
///
/// Spouse facts are ignored unless filing jointly or as a qualifying widow(er).
pub fn compute_standard_deduction(
    status: FilingStatus,
    facts: DeductionFacts,
    year: TaxYear,
) -> Decimal {
    let base = year.standard_deduction(status);
    let additional = year.additional_deduction(status) * Decimal::from(facts.conditions(status));
    base + additional
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn deduction(status: FilingStatus, facts: DeductionFacts) -> Decimal {
        compute_standard_deduction(status, facts, TaxYear::default())
    }

    #[test]
    fn base_amounts() {
        let none = DeductionFacts::default();
        assert_eq!(deduction(FilingStatus::Single, none), dec!(14600));
        assert_eq!(deduction(FilingStatus::MarriedFilingJointly, none), dec!(29200));
        assert_eq!(deduction(FilingStatus::MarriedFilingSeparately, none), dec!(14600));
        assert_eq!(deduction(FilingStatus::HeadOfHousehold, none), dec!(21900));
        assert_eq!(deduction(FilingStatus::QualifyingWidow, none), dec!(29200));
    }

    #[test]
    fn taxpayer_age_and_blindness() {
        let senior = DeductionFacts {
            taxpayer_age: Some(65),
            ..Default::default()
        };
        assert_eq!(deduction(FilingStatus::Single, senior), dec!(16550));

        let senior_blind = DeductionFacts {
            taxpayer_blind: true,
            ..senior
        };
        assert_eq!(deduction(FilingStatus::Single, senior_blind), dec!(18500));

        let sixty_four = DeductionFacts {
            taxpayer_age: Some(64),
            ..Default::default()
        };
        assert_eq!(deduction(FilingStatus::Single, sixty_four), dec!(14600));
    }

    #[test]
    fn joint_counts_both_spouses() {
        let facts = DeductionFacts {
            taxpayer_age: Some(66),
            taxpayer_blind: true,
            spouse_age: Some(67),
            spouse_blind: false,
        };
        assert_eq!(
            deduction(FilingStatus::MarriedFilingJointly, facts),
            dec!(29200) + dec!(1550) * dec!(3)
        );
        assert_eq!(
            deduction(FilingStatus::QualifyingWidow, facts),
            dec!(29200) + dec!(1550) * dec!(3)
        );
    }

    #[test]
    fn spouse_ignored_for_other_statuses() {
        for status in [
            FilingStatus::Single,
            FilingStatus::HeadOfHousehold,
            FilingStatus::MarriedFilingSeparately,
        ] {
            let without = DeductionFacts {
                taxpayer_age: Some(40),
                ..Default::default()
            };
            let with_spouse = DeductionFacts {
                spouse_age: Some(80),
                spouse_blind: true,
                ..without
            };
            assert_eq!(deduction(status, without), deduction(status, with_spouse));
        }
    }

    #[test]
    fn adding_conditions_never_lowers_deduction() {
        for status in FilingStatus::ALL {
            let steps = [
                DeductionFacts::default(),
                DeductionFacts {
                    taxpayer_age: Some(70),
                    ..Default::default()
                },
                DeductionFacts {
                    taxpayer_age: Some(70),
                    taxpayer_blind: true,
                    ..Default::default()
                },
                DeductionFacts {
                    taxpayer_age: Some(70),
                    taxpayer_blind: true,
                    spouse_age: Some(70),
                    spouse_blind: false,
                },
                DeductionFacts {
                    taxpayer_age: Some(70),
                    taxpayer_blind: true,
                    spouse_age: Some(70),
                    spouse_blind: true,
                },
            ];
            let amounts: Vec<_> = steps.iter().map(|f| deduction(status, *f)).collect();
            assert!(amounts.windows(2).all(|w| w[0] <= w[1]), "{status}: {amounts:?}");
        }
    }
}
