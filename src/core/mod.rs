pub mod citation;
pub mod grounding;
pub mod input;
pub mod lines;
pub mod money;
pub mod narrative;

// Flat public surface for domain types and functions.
pub use citation::{source_map, Citation, CitationLog};
pub use grounding::{ground_citations, InstructionSource, NoInstructions, TextInstructions};
pub use input::{
    read_tax_input_json, BusinessProfile, DividendRecord, FilingStatus, InterestRecord,
    ReturnInput, TaxInput, ValidationError,
};
pub use lines::{LineItem, LineItems};
pub use money::{display_amount, round_cents, within_cent};
pub use narrative::{citation_prompt, NarrativeBackend, NarrativeError, Narrator, SYSTEM_PROMPT};
