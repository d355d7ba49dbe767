//! Full Payment Submission.
//!
//! Optional money fields are written as empty elements when zero or unset,
//! unlike EPS and EYU which leave them out entirely.

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, warn};

use crate::error::{RtiError, RtiResult};

use super::format::{format_money, format_optional_money, period_type_code};
use super::header::{period_end, related_tax_year, write_emp_refs, write_ir_header, PayeReference};
use super::types::{Employee, FpsInput, PayrollRecord, StatutoryPayments};
use super::writer::XmlWriter;
use super::FPS_NAMESPACE;

lazy_static! {
    static ref NINO: Regex = Regex::new(r"^[A-Z]{2}[0-9]{6}[A-Z]?$").unwrap();
}

const DEFAULT_NI_CATEGORY: &str = "A";

/// Strip whitespace and upper-case.
pub fn normalize_nino(nino: &str) -> String {
    nino.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Whether a normalized NINO has the expected shape.
pub fn is_valid_nino(nino: &str) -> bool {
    NINO.is_match(nino)
}

/// Generate an FPS document.
///
/// Fails with [`RtiError::MissingData`] on the first payroll record without
/// an attached employee. A malformed NINO only logs a warning.
pub fn generate_fps(input: &FpsInput) -> RtiResult<String> {
    let paye = PayeReference::parse(&input.employer_paye_reference);
    let frequency = period_type_code(&input.period_type);

    let mut w = XmlWriter::new();
    w.open_with_namespace("IRenvelope", FPS_NAMESPACE);
    write_ir_header(
        &mut w,
        &paye,
        &period_end(&input.tax_year, &input.submission_date),
    );

    w.open("FullPaymentSubmission");
    write_emp_refs(&mut w, &paye, &input.accounts_office_reference);
    w.text("RelatedTaxYear", &related_tax_year(&input.tax_year));
    w.value("PayFrequency", frequency);
    w.value("PeriodNumber", &input.period_number.to_string());
    w.value("PaymentDate", &input.payment_date.render());

    for (index, record) in input.payroll_records.iter().enumerate() {
        let employee = record
            .employee
            .as_ref()
            .ok_or_else(|| RtiError::MissingData {
                payroll_id: record.id.clone(),
                index,
            })?;
        write_employee(&mut w, input, frequency, index, record, employee);
    }

    w.close("FullPaymentSubmission");
    w.close("IRenvelope");

    debug!(
        employees = input.payroll_records.len(),
        tax_year = %input.tax_year,
        period = input.period_number,
        "generated FPS"
    );
    Ok(w.finish())
}

fn write_employee(
    w: &mut XmlWriter,
    input: &FpsInput,
    frequency: &str,
    index: usize,
    record: &PayrollRecord,
    employee: &Employee,
) {
    let nino = employee
        .ni_number
        .as_deref()
        .map(normalize_nino)
        .unwrap_or_default();
    if !is_valid_nino(&nino) {
        warn!(
            payroll_id = %record.id,
            employee_id = %employee.id,
            index,
            "NI number does not match the expected format, submitting as is"
        );
    }

    w.open("Employee");

    w.open("EmployeeDetails");
    w.text("NINO", &nino);
    w.open("Name");
    w.text("Fore", &employee.first_name);
    w.text("Sur", &employee.last_name);
    w.close("Name");
    if let Some(address) = &employee.address {
        w.open("Address");
        for line in address.lines.iter().filter(|l| !l.trim().is_empty()) {
            w.text("Line", line);
        }
        if let Some(postcode) = &address.postcode {
            w.text("UKPostcode", postcode);
        }
        w.close("Address");
    }
    if let Some(dob) = &employee.date_of_birth {
        w.value("BirthDate", &dob.render());
    }
    if let Some(gender) = &employee.gender {
        w.text("Gender", gender);
    }
    w.close("EmployeeDetails");

    w.open("Employment");
    w.text(
        "PayId",
        employee.payroll_id.as_deref().unwrap_or(&employee.id),
    );
    if let Some(start) = &employee.start_date {
        w.open("Starter");
        w.value("StartDate", &start.render());
        w.close("Starter");
    }
    if let Some(leaving) = &employee.leaving_date {
        w.value("LeavingDate", &leaving.render());
    }

    let ytd = &record.year_to_date;
    w.open("FiguresToDate");
    w.value("TaxablePay", &format_money(ytd.taxable_pay));
    w.value("TotalTax", &format_money(ytd.tax));
    w.value(
        "StudentLoansTD",
        &format_optional_money(ytd.student_loan_deductions),
    );
    w.value(
        "PostgradLoansTD",
        &format_optional_money(ytd.postgraduate_loan_deductions),
    );
    w.value(
        "EmpeePenContribnsPaidYTD",
        &format_optional_money(ytd.pension_deductions),
    );
    write_statutory(w, &ytd.statutory_payments, "YTD");
    w.close("FiguresToDate");

    w.open("Payment");
    w.value("PayFreq", frequency);
    w.value("PmtDate", &input.payment_date.render());
    let period_tag = if frequency.starts_with('W') {
        "WeekNo"
    } else {
        "MonthNo"
    };
    w.value(period_tag, &input.period_number.to_string());
    w.value("PeriodsCovered", "1");
    w.text("TaxCode", employee.tax_code.trim());
    w.value("GrossPay", &format_money(record.gross_pay));
    w.value("TaxDeducted", &format_money(record.tax_deductions));
    w.value(
        "StudentLoanRecovered",
        &format_optional_money(record.student_loan_deductions),
    );
    w.value(
        "PostgradLoanRecovered",
        &format_optional_money(record.postgraduate_loan_deductions),
    );
    w.value(
        "EmpeePenContribnsPaid",
        &format_optional_money(record.pension_deductions),
    );
    write_statutory(w, &record.statutory_payments, "");
    w.close("Payment");

    w.open("NIlettersAndValues");
    w.text(
        "NIletter",
        employee
            .ni_category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_NI_CATEGORY),
    );
    w.value("GrossEarningsForNICsInPd", &format_money(record.gross_pay));
    w.value("TotalEmpNICInPd", &format_money(record.employer_ni));
    w.value("EmpeeContribnsInPd", &format_money(record.ni_deductions));
    w.value("EmpeeContribnsYTD", &format_money(ytd.ni_deductions));
    w.close("NIlettersAndValues");

    w.close("Employment");
    w.close("Employee");

    debug!(payroll_id = %record.id, index, "wrote FPS employee");
}

fn write_statutory(w: &mut XmlWriter, payments: &StatutoryPayments, suffix: &str) {
    for (tag, amount) in [
        ("SMP", payments.maternity),
        ("SPP", payments.paternity),
        ("SAP", payments.adoption),
        ("ShPP", payments.shared_parental),
    ] {
        w.value(&format!("{}{}", tag, suffix), &format_optional_money(amount));
    }
}
