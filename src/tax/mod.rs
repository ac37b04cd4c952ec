pub mod adjustments;
pub mod deduction;
pub mod form_1040;
pub mod pipeline;
pub mod rates;
pub mod schedule_1;
pub mod schedule_b;
pub mod schedule_c;
pub mod schedule_se;
pub mod unit;
pub mod verify;

pub use form_1040::Form1040;
pub use pipeline::{ReturnPipeline, ReturnReport};
pub use rates::{compute_tax, RateSchedule, TaxYear};
pub use verify::{ArithmeticVerifier, VerificationResult};
