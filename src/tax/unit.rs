use super::rates::ConfigError;
use crate::core::Citation;

/// One form computation: a pure function from a narrow input to a line-item
/// record carrying its own citations.
pub trait FormUnit {
    type Input;
    type Output: Cited;

    /// Form name used on citations, e.g. "schedule-c"
    const FORM: &'static str;

    fn process(&self, input: &Self::Input) -> Result<Self::Output, ConfigError>;
}

/// Output record with an audit trail
pub trait Cited {
    fn citations(&self) -> &[Citation];
}
