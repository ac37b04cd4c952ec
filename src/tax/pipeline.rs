//! Runs the form units in dependency order for one return.

use super::adjustments::EducatorExpenses;
use super::deduction::DeductionFacts;
use super::form_1040::{Form1040, MainReturn, MainReturnInput};
use super::rates::{ConfigError, TaxYear};
use super::schedule_1::{Schedule1, Schedule1Input, Schedule1Unit};
use super::schedule_b::{ScheduleB, ScheduleBInput, ScheduleBOutput};
use super::schedule_c::{ScheduleC, ScheduleCInput, ScheduleCOutput};
use super::schedule_se::{ScheduleSe, ScheduleSeInput, ScheduleSeOutput};
use super::unit::{Cited, FormUnit};
use super::verify::{ArithmeticVerifier, VerificationResult};
use crate::config::PipelineConfig;
use crate::core::{
    citation_prompt, ground_citations, source_map, Citation, FilingStatus, InstructionSource,
    LineItem, LineItems, NarrativeError, Narrator, NoInstructions, ReturnInput, TaxInput,
    TextInstructions, ValidationError, SYSTEM_PROMPT,
};
use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, thiserror::Error)]
pub enum ReturnError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to load instructions: {0}")]
    Instructions(#[from] std::io::Error),
    #[error("failed to serialize input: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Every record produced for one return, plus the citations of all units in
/// execution order.
#[derive(Debug, Clone, Serialize)]
pub struct TaxReturn {
    pub tax_year: TaxYear,
    pub filing_status: FilingStatus,
    pub form_1040: Form1040,
    pub schedule_1: Schedule1,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_b: Option<ScheduleBOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_c: Option<ScheduleCOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_se: Option<ScheduleSeOutput>,
    pub citations: Vec<Citation>,
}

impl TaxReturn {
    /// Every record that ran, Form 1040 first
    fn records(&self) -> Vec<&dyn LineItems> {
        let mut records: Vec<&dyn LineItems> = vec![&self.form_1040, &self.schedule_1];
        if let Some(b) = &self.schedule_b {
            records.push(b);
        }
        if let Some(c) = &self.schedule_c {
            records.push(c);
        }
        if let Some(se) = &self.schedule_se {
            records.push(se);
        }
        records
    }

    pub fn line_items(&self) -> Vec<LineItem> {
        self.records()
            .into_iter()
            .flat_map(|record| record.line_items())
            .collect()
    }

    /// Amount of a line on `form`, by label or line number
    pub fn amount(&self, form: &str, line: &str) -> Option<Decimal> {
        self.records()
            .into_iter()
            .find(|record| record.form() == form)?
            .amount(line)
    }

    /// Latest citation for a line label, on any form
    pub fn citation_for(&self, line: &str) -> Option<&Citation> {
        self.citations
            .iter()
            .rev()
            .find(|c| c.line.eq_ignore_ascii_case(line))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReturnReport {
    /// SHA-256 of the input document as read
    pub input_digest: String,
    #[serde(flatten)]
    pub tax_return: TaxReturn,
    /// `"form line"` -> authority of its latest citation
    pub sources: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<VerificationResult>,
}

pub struct ReturnPipeline {
    year: TaxYear,
    verify: bool,
    instructions: Box<dyn InstructionSource>,
    narrator: Box<dyn Narrator>,
}

impl ReturnPipeline {
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ReturnError> {
        let year = TaxYear::new(config.tax_year)?;
        let instructions: Box<dyn InstructionSource> = match &config.instructions_dir {
            Some(dir) => {
                let source = TextInstructions::open_all(dir)?;
                log::info!(
                    "Loaded {} instruction document(s) from {}",
                    source.document_count(),
                    dir.display()
                );
                Box::new(source)
            }
            None => Box::new(NoInstructions),
        };
        Ok(ReturnPipeline {
            year,
            verify: config.verify,
            instructions,
            narrator: config.narrative.build(),
        })
    }

    pub fn year(&self) -> TaxYear {
        self.year
    }

    /// Validate, compute, optionally verify.
    pub fn process(&self, input: TaxInput) -> Result<ReturnReport, ReturnError> {
        let input_digest = hex::encode(Sha256::digest(serde_json::to_vec(&input)?));
        let input = input.validate(self.year.year())?;
        let tax_return = self.run(&input)?;
        let verification = self
            .verify
            .then(|| ArithmeticVerifier.verify(&tax_return.form_1040));
        Ok(ReturnReport {
            input_digest,
            sources: source_map(&tax_return.citations),
            tax_return,
            verification,
        })
    }

    /// Compute every form the input calls for.
    pub fn run(&self, input: &ReturnInput) -> Result<TaxReturn, ConfigError> {
        let year = self.year;
        let status = input.status;
        log::info!("Computing {} return for {} ({})", year, input.taxpayer.name, status);

        let mut citations = Vec::new();

        let schedule_b = if input.documents.has_interest_or_dividends() {
            let output = ScheduleB.process(&ScheduleBInput {
                interest: input.documents.interest.clone(),
                dividends: input.documents.dividends.clone(),
            })?;
            collect(&mut citations, &output);
            Some(output)
        } else {
            None
        };

        let schedule_c = match &input.business {
            Some(business) => {
                let output = ScheduleC.process(&ScheduleCInput {
                    business: business.clone(),
                    status,
                })?;
                collect(&mut citations, &output);
                Some(output)
            }
            None => None,
        };

        let schedule_se = match &schedule_c {
            Some(c) if c.net_profit_or_loss > Decimal::ZERO => {
                let output = ScheduleSe { year }.process(&ScheduleSeInput {
                    net_profit: c.net_profit_or_loss,
                    status,
                })?;
                collect(&mut citations, &output);
                Some(output)
            }
            _ => None,
        };

        let (interest, dividends) = schedule_b
            .as_ref()
            .map_or((Decimal::ZERO, Decimal::ZERO), |b| {
                (b.total_interest, b.total_dividends)
            });
        let wages = input.documents.total_wages();
        let se_deduction = schedule_se.as_ref().map_or(Decimal::ZERO, |se| se.deduction);

        let schedule_1 = Schedule1Unit { year }.process(&Schedule1Input {
            status,
            business_result: schedule_c.as_ref().map(|c| c.net_profit_or_loss),
            self_employment_deduction: se_deduction,
            educator: EducatorExpenses {
                paid: input.adjustments.educator_paid,
                eligible: input.taxpayer.educator,
                spouse_paid: input.adjustments.spouse_educator_paid,
                spouse_eligible: input.taxpayer.spouse_educator(),
            },
            student_loan_interest_paid: input.adjustments.student_loan_interest_paid,
            other_income: wages + interest + dividends,
        })?;
        collect(&mut citations, &schedule_1);

        let mut form_1040 = MainReturn { year }.process(&MainReturnInput {
            status,
            deduction_facts: DeductionFacts {
                taxpayer_age: input.taxpayer.age_in(year.year()),
                taxpayer_blind: input.taxpayer.blind,
                spouse_age: input.taxpayer.spouse_age_in(year.year()),
                spouse_blind: input.taxpayer.spouse_blind(),
            },
            qualifying_children: input.qualifying_children(),
            wages,
            withholding: input.documents.total_withholding(),
            interest,
            dividends,
            additional_income: schedule_1.additional_income,
            adjustments: schedule_1.total_adjustments,
        })?;

        if let Some(se) = &schedule_se {
            if se.self_employment_tax > Decimal::ZERO {
                form_1040 = form_1040.apply_other_taxes(se.self_employment_tax);
            }
        }
        collect(&mut citations, &form_1040);

        let citations = ground_citations(citations, self.instructions.as_ref());

        log::info!(
            "Return complete: total tax {}, refund {}, owed {}",
            form_1040.total_tax,
            form_1040.refund,
            form_1040.amount_owed
        );

        Ok(TaxReturn {
            tax_year: year,
            filing_status: status,
            form_1040,
            schedule_1,
            schedule_b,
            schedule_c,
            schedule_se,
            citations,
        })
    }

    /// Prose explanation of a computed line from its citation.
    ///
    /// A citation without a grounding paragraph is grounded in any instruction
    /// lines that mention its label.
    pub fn explain(&self, tax_return: &TaxReturn, line: &str) -> Result<String, NarrativeError> {
        let citation = tax_return
            .citation_for(line)
            .ok_or_else(|| NarrativeError::Backend(format!("no citation for line '{line}'")))?;
        let grounding = citation
            .grounding
            .clone()
            .or_else(|| self.mentions_of(&citation.line));
        self.narrator.narrate(
            &citation_prompt(citation),
            grounding.as_deref(),
            Some(SYSTEM_PROMPT),
        )
    }

    fn mentions_of(&self, label: &str) -> Option<String> {
        let hits = self.instructions.find_text(label);
        if hits.is_empty() {
            return None;
        }
        let lines: Vec<String> = hits
            .iter()
            .map(|hit| format!("{}:{}: {}", hit.source, hit.line_number, hit.text))
            .collect();
        Some(lines.join("\n"))
    }
}

fn collect(citations: &mut Vec<Citation>, output: &impl Cited) {
    citations.extend_from_slice(output.citations());
}
