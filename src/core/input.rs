use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Read;
use std::str::FromStr;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("unrecognized filing status: '{0}'")]
    UnknownFilingStatus(String),
    #[error("{field} must not be negative (got {value})")]
    NegativeAmount { field: String, value: Decimal },
    #[error("{field} exceeds the largest supported amount {max} (got {value})")]
    AmountTooLarge {
        field: String,
        value: Decimal,
        max: Decimal,
    },
    #[error("missing required field: {0}")]
    MissingField(String),
    #[error("{field} {date} is after the end of tax year {year}")]
    DateOfBirthAfterYearEnd {
        field: String,
        date: NaiveDate,
        year: i32,
    },
}

/// IRS filing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
    QualifyingWidow,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 5] = [
        FilingStatus::Single,
        FilingStatus::MarriedFilingJointly,
        FilingStatus::MarriedFilingSeparately,
        FilingStatus::HeadOfHousehold,
        FilingStatus::QualifyingWidow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::MarriedFilingJointly => "married_filing_jointly",
            FilingStatus::MarriedFilingSeparately => "married_filing_separately",
            FilingStatus::HeadOfHousehold => "head_of_household",
            FilingStatus::QualifyingWidow => "qualifying_widow",
        }
    }

    pub fn is_joint(&self) -> bool {
        *self == FilingStatus::MarriedFilingJointly
    }

    /// Statuses where the spouse's age and blindness add to the standard deduction.
    pub fn counts_spouse(&self) -> bool {
        matches!(
            self,
            FilingStatus::MarriedFilingJointly | FilingStatus::QualifyingWidow
        )
    }
}

impl FromStr for FilingStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '-'], "_");
        FilingStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == normalized)
            .ok_or_else(|| ValidationError::UnknownFilingStatus(s.to_string()))
    }
}

impl std::fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Input root for a tax return, as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TaxInput {
    /// One of single, married_filing_jointly, married_filing_separately,
    /// head_of_household, qualifying_widow
    pub filing_status: String,
    pub taxpayer: TaxpayerProfile,
    /// Form W-2 records
    #[serde(default)]
    pub wages: Vec<WageRecord>,
    /// Form 1099-INT records
    #[serde(default)]
    pub interest: Vec<InterestRecord>,
    /// Form 1099-DIV records
    #[serde(default)]
    pub dividends: Vec<DividendRecord>,
    /// Sole proprietorship, if any
    #[serde(default)]
    pub business: Option<BusinessProfile>,
    #[serde(default)]
    pub dependents: Vec<Dependent>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub educator_expenses_paid: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub spouse_educator_expenses_paid: Option<Decimal>,
    #[serde(default)]
    #[schemars(with = "Option<f64>")]
    pub student_loan_interest_paid: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TaxpayerProfile {
    pub name: String,
    /// Taxpayer identification number
    #[serde(alias = "ssn")]
    pub identifier: String,
    #[serde(default)]
    pub age: Option<u32>,
    /// Used to derive the age when `age` is not given
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub blind: bool,
    /// Eligible educator (K-12 teacher, counselor, etc.)
    #[serde(default)]
    pub educator: bool,
    #[serde(default)]
    pub spouse: Option<SpouseProfile>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SpouseProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "ssn")]
    pub identifier: Option<String>,
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub blind: bool,
    #[serde(default)]
    pub educator: bool,
}

impl TaxpayerProfile {
    /// Age for the standard deduction test in `tax_year`.
    pub fn age_in(&self, tax_year: i32) -> Option<u32> {
        self.age
            .or_else(|| self.date_of_birth.and_then(|dob| age_at_year_end(dob, tax_year)))
    }

    pub fn spouse_age_in(&self, tax_year: i32) -> Option<u32> {
        self.spouse.as_ref().and_then(|s| {
            s.age
                .or_else(|| s.date_of_birth.and_then(|dob| age_at_year_end(dob, tax_year)))
        })
    }

    pub fn spouse_blind(&self) -> bool {
        self.spouse.as_ref().is_some_and(|s| s.blind)
    }

    pub fn spouse_educator(&self) -> bool {
        self.spouse.as_ref().is_some_and(|s| s.educator)
    }
}

/// Age reached by 1 January of the following year.
///
/// A person is treated as reaching an age on the day before the birthday, so
/// someone born on 1 January 1960 is 65 for tax year 2024.
pub fn age_at_year_end(date_of_birth: NaiveDate, tax_year: i32) -> Option<u32> {
    let reference = NaiveDate::from_ymd_opt(tax_year + 1, 1, 1)?;
    if date_of_birth > reference {
        return None;
    }
    let mut years = reference.year() - date_of_birth.year();
    if (reference.month(), reference.day()) < (date_of_birth.month(), date_of_birth.day()) {
        years -= 1;
    }
    u32::try_from(years).ok()
}

/// Form W-2 wage and tax statement
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WageRecord {
    #[serde(default)]
    pub employer: Option<String>,
    /// Box 1 - wages, tips, other compensation
    #[schemars(with = "f64")]
    pub wages: Decimal,
    /// Box 2 - federal income tax withheld
    #[serde(default)]
    #[schemars(with = "f64")]
    pub federal_withholding: Decimal,
}

/// Form 1099-INT
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct InterestRecord {
    #[serde(default)]
    pub payer: Option<String>,
    /// Box 1 - interest income
    #[schemars(with = "f64")]
    pub amount: Decimal,
}

/// Form 1099-DIV
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct DividendRecord {
    #[serde(default)]
    pub payer: Option<String>,
    /// Box 1a - total ordinary dividends
    #[serde(default)]
    #[schemars(with = "f64")]
    pub ordinary: Decimal,
    /// Box 1b - qualified dividends
    #[serde(default)]
    #[schemars(with = "f64")]
    pub qualified: Decimal,
}

/// Schedule C business figures
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BusinessProfile {
    pub name: Option<String>,
    #[schemars(with = "f64")]
    pub gross_receipts: Decimal,
    #[schemars(with = "f64")]
    pub returns_allowances: Decimal,
    #[schemars(with = "f64")]
    pub cost_of_goods_sold: Decimal,
    #[schemars(with = "f64")]
    pub other_income: Decimal,
    #[schemars(with = "f64")]
    pub advertising: Decimal,
    #[schemars(with = "f64")]
    pub car_truck_expenses: Decimal,
    #[schemars(with = "f64")]
    pub commissions_fees: Decimal,
    #[schemars(with = "f64")]
    pub contract_labor: Decimal,
    #[schemars(with = "f64")]
    pub depreciation: Decimal,
    #[schemars(with = "f64")]
    pub insurance: Decimal,
    #[schemars(with = "f64")]
    pub interest: Decimal,
    #[schemars(with = "f64")]
    pub legal_professional: Decimal,
    #[schemars(with = "f64")]
    pub office_expense: Decimal,
    #[schemars(with = "f64")]
    pub rent_lease: Decimal,
    #[schemars(with = "f64")]
    pub repairs_maintenance: Decimal,
    #[schemars(with = "f64")]
    pub supplies: Decimal,
    #[schemars(with = "f64")]
    pub taxes_licenses: Decimal,
    #[schemars(with = "f64")]
    pub travel: Decimal,
    /// Business meals as paid; only half is deductible
    #[schemars(with = "f64")]
    pub meals: Decimal,
    #[schemars(with = "f64")]
    pub utilities: Decimal,
    #[schemars(with = "f64")]
    pub wages: Decimal,
    /// Other named expenses (Part V)
    #[schemars(with = "BTreeMap<String, f64>")]
    pub other_expenses: BTreeMap<String, Decimal>,
}

impl BusinessProfile {
    /// Expense categories deductible at their full amount (everything but meals
    /// and the named other expenses).
    pub fn fully_deductible_expenses(&self) -> [(&'static str, Decimal); 16] {
        [
            ("advertising", self.advertising),
            ("car_truck_expenses", self.car_truck_expenses),
            ("commissions_fees", self.commissions_fees),
            ("contract_labor", self.contract_labor),
            ("depreciation", self.depreciation),
            ("insurance", self.insurance),
            ("interest", self.interest),
            ("legal_professional", self.legal_professional),
            ("office_expense", self.office_expense),
            ("rent_lease", self.rent_lease),
            ("repairs_maintenance", self.repairs_maintenance),
            ("supplies", self.supplies),
            ("taxes_licenses", self.taxes_licenses),
            ("travel", self.travel),
            ("utilities", self.utilities),
            ("wages", self.wages),
        ]
    }

    fn income_fields(&self) -> [(&'static str, Decimal); 4] {
        [
            ("gross_receipts", self.gross_receipts),
            ("returns_allowances", self.returns_allowances),
            ("cost_of_goods_sold", self.cost_of_goods_sold),
            ("other_income", self.other_income),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Dependent {
    pub name: String,
    #[serde(default, alias = "ssn")]
    pub identifier: String,
    #[serde(default)]
    pub relationship: String,
    /// Counts toward the child tax credit
    #[serde(default)]
    pub qualifying_child: bool,
}

/// Source documents after validation
#[derive(Debug, Clone, Default)]
pub struct IncomeDocuments {
    pub wages: Vec<WageRecord>,
    pub interest: Vec<InterestRecord>,
    pub dividends: Vec<DividendRecord>,
}

impl IncomeDocuments {
    pub fn total_wages(&self) -> Decimal {
        self.wages.iter().map(|w| w.wages).sum()
    }

    pub fn total_withholding(&self) -> Decimal {
        self.wages.iter().map(|w| w.federal_withholding).sum()
    }

    pub fn has_interest_or_dividends(&self) -> bool {
        !self.interest.is_empty() || !self.dividends.is_empty()
    }
}

/// Raw amounts for the above-the-line adjustments
#[derive(Debug, Clone, Copy, Default)]
pub struct AdjustmentInputs {
    pub educator_paid: Decimal,
    pub spouse_educator_paid: Decimal,
    pub student_loan_interest_paid: Decimal,
}

/// A validated return input; every amount is non-negative and at most
/// [`MAX_AMOUNT`].
#[derive(Debug, Clone)]
pub struct ReturnInput {
    pub status: FilingStatus,
    pub taxpayer: TaxpayerProfile,
    pub documents: IncomeDocuments,
    pub business: Option<BusinessProfile>,
    pub dependents: Vec<Dependent>,
    pub adjustments: AdjustmentInputs,
}

impl ReturnInput {
    pub fn qualifying_children(&self) -> usize {
        self.dependents.iter().filter(|d| d.qualifying_child).count()
    }
}

impl TaxInput {
    /// Check the input and convert it to a [`ReturnInput`] for `tax_year`.
    ///
    /// Fails on the first problem found; nothing is computed for invalid input.
    pub fn validate(self, tax_year: i32) -> Result<ReturnInput, ValidationError> {
        let status: FilingStatus = self.filing_status.parse()?;

        require("taxpayer.name", &self.taxpayer.name)?;
        require("taxpayer.identifier", &self.taxpayer.identifier)?;
        check_birth_date("taxpayer.date_of_birth", self.taxpayer.date_of_birth, tax_year)?;
        if let Some(spouse) = &self.taxpayer.spouse {
            check_birth_date("taxpayer.spouse.date_of_birth", spouse.date_of_birth, tax_year)?;
        }

        for (i, w) in self.wages.iter().enumerate() {
            check_amount(format!("wages[{i}].wages"), w.wages)?;
            check_amount(
                format!("wages[{i}].federal_withholding"),
                w.federal_withholding,
            )?;
        }
        for (i, r) in self.interest.iter().enumerate() {
            check_amount(format!("interest[{i}].amount"), r.amount)?;
        }
        for (i, d) in self.dividends.iter().enumerate() {
            check_amount(format!("dividends[{i}].ordinary"), d.ordinary)?;
            check_amount(format!("dividends[{i}].qualified"), d.qualified)?;
        }
        if let Some(business) = &self.business {
            let named = business
                .income_fields()
                .into_iter()
                .chain(business.fully_deductible_expenses())
                .chain(std::iter::once(("meals", business.meals)));
            for (field, value) in named {
                check_amount(format!("business.{field}"), value)?;
            }
            for (name, value) in &business.other_expenses {
                check_amount(format!("business.other_expenses.{name}"), *value)?;
            }
        }
        for (i, d) in self.dependents.iter().enumerate() {
            require(&format!("dependents[{i}].name"), &d.name)?;
        }

        let adjustments = AdjustmentInputs {
            educator_paid: optional_amount("educator_expenses_paid", self.educator_expenses_paid)?,
            spouse_educator_paid: optional_amount(
                "spouse_educator_expenses_paid",
                self.spouse_educator_expenses_paid,
            )?,
            student_loan_interest_paid: optional_amount(
                "student_loan_interest_paid",
                self.student_loan_interest_paid,
            )?,
        };

        Ok(ReturnInput {
            status,
            taxpayer: self.taxpayer,
            documents: IncomeDocuments {
                wages: self.wages,
                interest: self.interest,
                dividends: self.dividends,
            },
            business: self.business,
            dependents: self.dependents,
            adjustments,
        })
    }
}

/// Read a JSON [`TaxInput`] document
pub fn read_tax_input_json<R: Read>(reader: R) -> anyhow::Result<TaxInput> {
    let input: TaxInput = serde_json::from_reader(reader)?;
    Ok(input)
}

fn require(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field.to_string()));
    }
    Ok(())
}

/// Largest accepted input amount. Totals of any realistic number of records
/// stay far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = dec!(1000000000000);

fn check_amount(field: String, value: Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ValidationError::NegativeAmount { field, value });
    }
    if value > MAX_AMOUNT {
        return Err(ValidationError::AmountTooLarge {
            field,
            value,
            max: MAX_AMOUNT,
        });
    }
    Ok(())
}

fn optional_amount(field: &str, value: Option<Decimal>) -> Result<Decimal, ValidationError> {
    let value = value.unwrap_or(Decimal::ZERO);
    check_amount(field.to_string(), value)?;
    Ok(value)
}

fn check_birth_date(
    field: &str,
    date: Option<NaiveDate>,
    tax_year: i32,
) -> Result<(), ValidationError> {
    match date {
        Some(date) if age_at_year_end(date, tax_year).is_none() => {
            Err(ValidationError::DateOfBirthAfterYearEnd {
                field: field.to_string(),
                date,
                year: tax_year,
            })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn taxpayer() -> TaxpayerProfile {
        TaxpayerProfile {
            name: "Jane Doe".to_string(),
            identifier: "123-45-6789".to_string(),
            ..Default::default()
        }
    }

    fn input(status: &str) -> TaxInput {
        TaxInput {
            filing_status: status.to_string(),
            taxpayer: taxpayer(),
            wages: vec![WageRecord {
                employer: None,
                wages: dec!(50000),
                federal_withholding: dec!(5000),
            }],
            interest: vec![],
            dividends: vec![],
            business: None,
            dependents: vec![],
            educator_expenses_paid: None,
            spouse_educator_expenses_paid: None,
            student_loan_interest_paid: None,
        }
    }

    #[test]
    fn filing_status_parsing() {
        assert_eq!("single".parse(), Ok(FilingStatus::Single));
        assert_eq!(
            "Married Filing Jointly".parse(),
            Ok(FilingStatus::MarriedFilingJointly)
        );
        assert_eq!(
            "head-of-household".parse(),
            Ok(FilingStatus::HeadOfHousehold)
        );
        assert_eq!(
            "widow".parse::<FilingStatus>(),
            Err(ValidationError::UnknownFilingStatus("widow".to_string()))
        );
    }

    #[test]
    fn unknown_status_fails_validation() {
        let err = input("joint").validate(2024).unwrap_err();
        assert_eq!(err, ValidationError::UnknownFilingStatus("joint".to_string()));
    }

    #[test]
    fn negative_wage_rejected() {
        let mut i = input("single");
        i.wages[0].federal_withholding = dec!(-1);
        let err = i.validate(2024).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NegativeAmount {
                field: "wages[0].federal_withholding".to_string(),
                value: dec!(-1)
            }
        );
    }

    #[test]
    fn negative_business_expense_rejected() {
        let mut i = input("single");
        let mut business = BusinessProfile {
            gross_receipts: dec!(1000),
            ..Default::default()
        };
        business.other_expenses.insert("software".to_string(), dec!(-5));
        i.business = Some(business);
        let err = i.validate(2024).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NegativeAmount { ref field, .. } if field == "business.other_expenses.software"
        ));
    }

    #[test]
    fn oversized_amounts_rejected() {
        let mut i = input("single");
        i.wages[0].wages = Decimal::MAX;
        i.wages.push(WageRecord {
            employer: None,
            wages: Decimal::MAX,
            federal_withholding: dec!(0),
        });
        assert_eq!(
            i.validate(2024).unwrap_err(),
            ValidationError::AmountTooLarge {
                field: "wages[0].wages".to_string(),
                value: Decimal::MAX,
                max: MAX_AMOUNT,
            }
        );

        let mut i = input("single");
        i.educator_expenses_paid = Some(MAX_AMOUNT + dec!(0.01));
        assert!(matches!(
            i.validate(2024),
            Err(ValidationError::AmountTooLarge { ref field, .. }) if field == "educator_expenses_paid"
        ));

        let mut i = input("single");
        i.wages[0].wages = MAX_AMOUNT;
        assert!(i.validate(2024).is_ok());
    }

    #[test]
    fn missing_name_rejected() {
        let mut i = input("single");
        i.taxpayer.name = "  ".to_string();
        assert_eq!(
            i.validate(2024).unwrap_err(),
            ValidationError::MissingField("taxpayer.name".to_string())
        );
    }

    #[test]
    fn negative_student_loan_interest_rejected() {
        let mut i = input("single");
        i.student_loan_interest_paid = Some(dec!(-10));
        assert!(i.validate(2024).is_err());
    }

    #[test]
    fn valid_input_sums_documents() {
        let mut i = input("single");
        i.wages.push(WageRecord {
            employer: Some("Second".to_string()),
            wages: dec!(1000),
            federal_withholding: dec!(100),
        });
        let validated = i.validate(2024).unwrap();
        assert_eq!(validated.status, FilingStatus::Single);
        assert_eq!(validated.documents.total_wages(), dec!(51000));
        assert_eq!(validated.documents.total_withholding(), dec!(5100));
        assert!(!validated.documents.has_interest_or_dividends());
    }

    #[test]
    fn age_derived_from_date_of_birth() {
        let born = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
        assert_eq!(age_at_year_end(born(1960, 1, 1), 2024), Some(65));
        assert_eq!(age_at_year_end(born(1960, 1, 2), 2024), Some(64));
        assert_eq!(age_at_year_end(born(1959, 6, 30), 2024), Some(65));
        assert_eq!(age_at_year_end(born(2026, 1, 1), 2024), None);

        let mut tp = taxpayer();
        tp.date_of_birth = Some(born(1959, 3, 1));
        assert_eq!(tp.age_in(2024), Some(65));
        tp.age = Some(40);
        assert_eq!(tp.age_in(2024), Some(40));
    }

    #[test]
    fn birth_date_after_year_end_rejected() {
        let mut i = input("single");
        i.taxpayer.date_of_birth = NaiveDate::from_ymd_opt(2025, 6, 1);
        assert!(matches!(
            i.validate(2024),
            Err(ValidationError::DateOfBirthAfterYearEnd { .. })
        ));
    }

    #[test]
    fn deserializes_numbers_and_ssn_alias() {
        let json = r#"{
            "filing_status": "single",
            "taxpayer": { "name": "John", "ssn": "000-00-0000", "age": 35 },
            "wages": [{ "wages": 50000, "federal_withholding": 5000 }],
            "interest": [{ "payer": "Bank", "amount": 150.50 }]
        }"#;
        let input = read_tax_input_json(json.as_bytes()).unwrap();
        assert_eq!(input.taxpayer.identifier, "000-00-0000");
        assert_eq!(input.interest[0].amount, dec!(150.50));
        assert!(input.business.is_none());
    }
}
