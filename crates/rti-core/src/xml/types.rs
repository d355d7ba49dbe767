//! Submission inputs for the three RTI document types.
//!
//! Amounts are pounds as `f64`; the generators only format them; no payroll
//! arithmetic happens here.

use serde::{Deserialize, Serialize};

use super::format::DateValue;

/// Input for a Full Payment Submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FpsInput {
    pub payroll_records: Vec<PayrollRecord>,

    /// `officeNumber/officeReference`, e.g. `123/AB45678`.
    pub employer_paye_reference: String,

    pub accounts_office_reference: String,

    /// e.g. `2025-26`.
    pub tax_year: String,

    pub period_number: u32,

    /// `weekly`, `fortnightly`, `four_weekly` or `monthly`.
    pub period_type: String,

    pub payment_date: DateValue,

    pub submission_date: DateValue,
}

/// One employee's pay for the period.
///
/// `employee` must be attached by the caller before generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayrollRecord {
    pub id: String,

    #[serde(default)]
    pub employee: Option<Employee>,

    pub gross_pay: f64,

    pub tax_deductions: f64,

    /// Employee National Insurance for the period.
    #[serde(default)]
    pub ni_deductions: f64,

    /// Employer National Insurance for the period.
    #[serde(default)]
    pub employer_ni: f64,

    #[serde(default)]
    pub student_loan_deductions: Option<f64>,

    #[serde(default)]
    pub postgraduate_loan_deductions: Option<f64>,

    /// Employee pension contributions.
    #[serde(default)]
    pub pension_deductions: Option<f64>,

    #[serde(default)]
    pub statutory_payments: StatutoryPayments,

    #[serde(default)]
    pub year_to_date: YearToDate,
}

/// Statutory payments made in a period or year to date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatutoryPayments {
    #[serde(default)]
    pub maternity: Option<f64>,

    #[serde(default)]
    pub paternity: Option<f64>,

    #[serde(default)]
    pub adoption: Option<f64>,

    #[serde(default)]
    pub shared_parental: Option<f64>,
}

/// Year-to-date figures for one employment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YearToDate {
    #[serde(default)]
    pub taxable_pay: f64,

    #[serde(default)]
    pub tax: f64,

    #[serde(default)]
    pub ni_deductions: f64,

    #[serde(default)]
    pub student_loan_deductions: Option<f64>,

    #[serde(default)]
    pub postgraduate_loan_deductions: Option<f64>,

    #[serde(default)]
    pub pension_deductions: Option<f64>,

    #[serde(default)]
    pub statutory_payments: StatutoryPayments,
}

/// Employee master data attached to a payroll record.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Employee {
    pub id: String,

    /// Payroll id reported to the authority; falls back to `id`.
    #[serde(default)]
    pub payroll_id: Option<String>,

    pub first_name: String,

    pub last_name: String,

    #[serde(default)]
    pub ni_number: Option<String>,

    #[serde(default)]
    pub date_of_birth: Option<DateValue>,

    /// `M` or `F`.
    #[serde(default)]
    pub gender: Option<String>,

    #[serde(default)]
    pub address: Option<Address>,

    #[serde(default)]
    pub tax_code: String,

    /// NI category letter; `A` when unset.
    #[serde(default)]
    pub ni_category: Option<String>,

    #[serde(default)]
    pub start_date: Option<DateValue>,

    #[serde(default)]
    pub leaving_date: Option<DateValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Address {
    #[serde(default)]
    pub lines: Vec<String>,

    #[serde(default)]
    pub postcode: Option<String>,
}

/// Input for an Employer Payment Summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpsInput {
    pub employer_paye_reference: String,

    pub accounts_office_reference: String,

    pub tax_year: String,

    /// Tax month the summary relates to.
    pub period_number: u32,

    pub submission_date: DateValue,

    #[serde(default)]
    pub no_payment_for_period: Option<bool>,

    #[serde(default)]
    pub statutory_pay_recovery: Option<StatutoryPayRecovery>,

    #[serde(default)]
    pub employment_allowance: Option<EmploymentAllowance>,

    #[serde(default)]
    pub cis_deductions: Option<f64>,

    #[serde(default)]
    pub apprenticeship_levy: Option<ApprenticeshipLevy>,
}

/// Year-to-date statutory pay recovered by the employer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatutoryPayRecovery {
    #[serde(default)]
    pub smp: Option<f64>,

    #[serde(default)]
    pub spp: Option<f64>,

    #[serde(default)]
    pub sap: Option<f64>,

    #[serde(default)]
    pub shpp: Option<f64>,

    #[serde(default)]
    pub aspp: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmploymentAllowance {
    pub claimed: bool,

    #[serde(default)]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApprenticeshipLevy {
    /// Levy due year to date.
    pub amount: f64,

    /// Annual levy allowance.
    pub allowance: f64,
}

/// Input for an Earlier Year Update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EyuInput {
    pub employer_paye_reference: String,

    pub accounts_office_reference: String,

    /// The earlier tax year being corrected.
    pub tax_year: String,

    pub submission_date: DateValue,

    pub employee_id: String,

    pub original_payroll_id: String,

    #[serde(default)]
    pub corrections: Corrections,

    pub reason: String,
}

/// Adjustments to previously reported figures. Unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corrections {
    #[serde(default)]
    pub gross_pay: Option<f64>,

    #[serde(default)]
    pub tax_deductions: Option<f64>,

    #[serde(default)]
    pub ni_deductions: Option<f64>,

    #[serde(default)]
    pub student_loan_deductions: Option<f64>,

    #[serde(default)]
    pub pension_deductions: Option<f64>,
}
