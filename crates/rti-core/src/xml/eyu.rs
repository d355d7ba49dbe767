//! Earlier Year Update.

use tracing::debug;

use super::format::format_money;
use super::header::{period_end, related_tax_year, write_emp_refs, write_ir_header, PayeReference};
use super::types::EyuInput;
use super::writer::XmlWriter;
use super::EYU_NAMESPACE;

/// Generate an EYU document. Unset corrections are omitted.
pub fn generate_eyu(input: &EyuInput) -> String {
    let paye = PayeReference::parse(&input.employer_paye_reference);

    let mut w = XmlWriter::new();
    w.open_with_namespace("IRenvelope", EYU_NAMESPACE);
    write_ir_header(
        &mut w,
        &paye,
        &period_end(&input.tax_year, &input.submission_date),
    );

    w.open("EarlierYearUpdate");
    write_emp_refs(&mut w, &paye, &input.accounts_office_reference);
    w.text("RelatedTaxYear", &related_tax_year(&input.tax_year));
    w.text("EmployeeId", &input.employee_id);
    w.text("OriginalPayrollId", &input.original_payroll_id);
    w.text("Reason", &input.reason);

    let c = &input.corrections;
    w.open("Corrections");
    for (tag, amount) in [
        ("GrossPay", c.gross_pay),
        ("TaxDeductions", c.tax_deductions),
        ("NIDeductions", c.ni_deductions),
        ("StudentLoanDeductions", c.student_loan_deductions),
        ("PensionDeductions", c.pension_deductions),
    ] {
        if let Some(amount) = amount {
            w.value(tag, &format_money(amount));
        }
    }
    w.close("Corrections");

    w.close("EarlierYearUpdate");
    w.close("IRenvelope");

    debug!(employee_id = %input.employee_id, tax_year = %input.tax_year, "generated EYU");
    w.finish()
}
