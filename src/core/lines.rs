use rust_decimal::Decimal;
use serde::Serialize;

pub use taxline_derive::LineItems;

/// A single numbered line on a form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineItem {
    pub form: &'static str,
    pub number: &'static str,
    /// Stable label used to look the line up, e.g. "taxable income"
    pub label: &'static str,
    pub description: &'static str,
    pub amount: Decimal,
}

/// Output record whose fields are lines on a form.
///
/// Implemented with `#[derive(LineItems)]`.
pub trait LineItems {
    fn form(&self) -> &'static str;

    fn line_items(&self) -> Vec<LineItem>;

    /// Look a line up by its stable label (case-insensitive) or its line number.
    fn amount(&self, line: &str) -> Option<Decimal> {
        self.line_items()
            .into_iter()
            .find(|l| l.label.eq_ignore_ascii_case(line) || l.number == line)
            .map(|l| l.amount)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[derive(LineItems)]
    #[line(form = "test")]
    struct Sample {
        /// First line
        #[line(number = "1", label = "first")]
        first: Decimal,
        #[line(number = "2a")]
        second_line: Decimal,
        #[allow(dead_code)]
        note: String,
    }

    #[test]
    fn derive_lists_annotated_fields_in_order() {
        let sample = Sample {
            first: dec!(10),
            second_line: dec!(20),
            note: "ignored".to_string(),
        };
        let items = sample.line_items();
        assert_eq!(sample.form(), "test");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].label, "first");
        assert_eq!(items[0].description, "First line");
        assert_eq!(items[1].label, "second line");
        assert_eq!(items[1].number, "2a");
    }

    #[test]
    fn amount_by_label_or_number() {
        let sample = Sample {
            first: dec!(10),
            second_line: dec!(20),
            note: String::new(),
        };
        assert_eq!(sample.amount("FIRST"), Some(dec!(10)));
        assert_eq!(sample.amount("2a"), Some(dec!(20)));
        assert_eq!(sample.amount("missing"), None);
    }
}
