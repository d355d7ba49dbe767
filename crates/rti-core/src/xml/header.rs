//! `IRheader` and employer references shared by every document type.

use chrono::{Datelike, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use super::format::DateValue;
use super::writer::XmlWriter;

/// Sender type declared in every `IRheader`.
pub const SENDER: &str = "Employer";

/// Sender identity declared in every `IRheader`.
pub const SENDER_ID: &str = "RTIPAYROLL";

pub const DEFAULT_CURRENCY: &str = "GBP";

lazy_static! {
    // 2025-26, 2025/26, 2025-2026, 25-26
    static ref TAX_YEAR: Regex = Regex::new(r"^\s*(\d{2}|\d{4})\s*[-/]\s*(\d{2}|\d{4})\s*$").unwrap();
}

/// Employer PAYE reference split into its tax office parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayeReference {
    pub office_number: String,
    pub office_reference: String,
}

impl PayeReference {
    /// Split `officeNumber/officeReference` on the first `/`.
    ///
    /// A reference without `/` yields an empty office reference.
    pub fn parse(reference: &str) -> Self {
        let mut parts = reference.splitn(2, '/');
        let office_number = parts.next().unwrap_or_default().trim().to_string();
        let office_reference = parts.next().unwrap_or_default().trim().to_string();
        Self {
            office_number,
            office_reference,
        }
    }
}

/// 5 April closing the tax year named by `tax_year`.
pub fn tax_year_end(tax_year: &str) -> Option<NaiveDate> {
    let caps = TAX_YEAR.captures(tax_year)?;
    let start = caps.get(1)?.as_str();
    let mut start_year: i32 = start.parse().ok()?;
    if start.len() == 2 {
        start_year += 2000;
    }
    NaiveDate::from_ymd_opt(start_year + 1, 4, 5)
}

/// `PeriodEnd` value: tax year end, or the submission date when the tax
/// year cannot be read.
pub(crate) fn period_end(tax_year: &str, submission_date: &DateValue) -> String {
    tax_year_end(tax_year)
        .or_else(|| submission_date.as_date())
        .unwrap_or_else(|| Utc::now().date_naive())
        .format("%Y-%m-%d")
        .to_string()
}

/// Two-digit form used in `RelatedTaxYear`, e.g. `25-26`.
pub(crate) fn related_tax_year(tax_year: &str) -> String {
    match tax_year_end(tax_year) {
        Some(end) => {
            let end_year = end.year();
            format!("{:02}-{:02}", (end_year - 1) % 100, end_year % 100)
        }
        None => tax_year.trim().to_string(),
    }
}

pub(crate) fn write_ir_header(w: &mut XmlWriter, paye: &PayeReference, period_end: &str) {
    w.open("IRheader");
    w.open("Keys");
    w.text_with_attr("Key", "Type", "TaxOfficeNumber", &paye.office_number);
    w.text_with_attr("Key", "Type", "TaxOfficeReference", &paye.office_reference);
    w.close("Keys");
    w.value("PeriodEnd", period_end);
    w.value("DefaultCurrency", DEFAULT_CURRENCY);
    w.value("Sender", SENDER);
    w.value("SenderID", SENDER_ID);
    w.close("IRheader");
}

/// `EmpRefs` block shared by all document bodies.
pub(crate) fn write_emp_refs(w: &mut XmlWriter, paye: &PayeReference, accounts_office: &str) {
    w.open("EmpRefs");
    w.text("OfficeNo", &paye.office_number);
    w.text("PayeRef", &paye.office_reference);
    w.text("AORef", accounts_office.trim());
    w.close("EmpRefs");
}
