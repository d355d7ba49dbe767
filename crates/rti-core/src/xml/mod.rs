//! RTI XML documents: generation and shallow validation.
//!
//! Three document types share one envelope:
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <IRenvelope xmlns="{namespace}">
//!   <IRheader>
//!     <Keys>
//!       <Key Type="TaxOfficeNumber">123</Key>
//!       <Key Type="TaxOfficeReference">AB45678</Key>
//!     </Keys>
//!     <PeriodEnd>2026-04-05</PeriodEnd>
//!     <DefaultCurrency>GBP</DefaultCurrency>
//!     <Sender>Employer</Sender>
//!     <SenderID>RTIPAYROLL</SenderID>
//!   </IRheader>
//!   <FullPaymentSubmission | EmployerPaymentSummary | EarlierYearUpdate>
//!     ...
//!   </...>
//! </IRenvelope>
//! ```
//!
//! # Optional amounts
//!
//! | Document | Unset optional amount |
//! |----------|-----------------------|
//! | FPS | empty element, e.g. `<StudentLoanRecovered></StudentLoanRecovered>` |
//! | EPS | no element |
//! | EYU | no element |
//!
//! Downstream schema consumers rely on both conventions, so they are kept
//! apart on purpose.
//!
//! # Escaping
//!
//! Free text and references go through [`escape_xml`]. Amounts, dates and
//! codes are written as formatted.

mod eps;
mod eyu;
mod format;
mod fps;
mod header;
pub mod types;
mod validate;
mod writer;

pub use eps::generate_eps;
pub use eyu::generate_eyu;
pub use format::{
    escape_xml, format_money, format_optional_money, period_type_code, DateValue,
};
pub use fps::{generate_fps, is_valid_nino, normalize_nino};
pub use header::{tax_year_end, PayeReference, DEFAULT_CURRENCY, SENDER, SENDER_ID};
pub use types::{
    Address, ApprenticeshipLevy, Corrections, Employee, EmploymentAllowance, EpsInput, EyuInput,
    FpsInput, PayrollRecord, StatutoryPayRecovery, StatutoryPayments, YearToDate,
};
pub use validate::{validate_xml, ValidationResult, MISSING_DECLARATION, MISSING_EMPLOYEE};

pub const FPS_NAMESPACE: &str =
    "http://www.govtalk.gov.uk/taxation/PAYE/RTI/FullPaymentSubmission/25-26/1";
pub const EPS_NAMESPACE: &str =
    "http://www.govtalk.gov.uk/taxation/PAYE/RTI/EmployerPaymentSummary/25-26/1";
pub const EYU_NAMESPACE: &str =
    "http://www.govtalk.gov.uk/taxation/PAYE/RTI/EarlierYearUpdate/25-26/1";

/// A document to generate, tagged by type.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SubmissionInput {
    Fps(FpsInput),
    Eps(EpsInput),
    Eyu(EyuInput),
}

impl SubmissionInput {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fps(_) => "FPS",
            Self::Eps(_) => "EPS",
            Self::Eyu(_) => "EYU",
        }
    }

    /// Generate the document for whichever type this is.
    pub fn generate(&self) -> crate::error::RtiResult<String> {
        match self {
            Self::Fps(input) => generate_fps(input),
            Self::Eps(input) => Ok(generate_eps(input)),
            Self::Eyu(input) => Ok(generate_eyu(input)),
        }
    }
}
