//! Employer Payment Summary.
//!
//! Every optional section is left out entirely when absent. This differs
//! from FPS, which writes empty elements for unset optional amounts.

use tracing::debug;

use super::format::format_money;
use super::header::{period_end, related_tax_year, write_emp_refs, write_ir_header, PayeReference};
use super::types::{EpsInput, StatutoryPayRecovery};
use super::writer::XmlWriter;
use super::EPS_NAMESPACE;

/// Generate an EPS document.
pub fn generate_eps(input: &EpsInput) -> String {
    let paye = PayeReference::parse(&input.employer_paye_reference);

    let mut w = XmlWriter::new();
    w.open_with_namespace("IRenvelope", EPS_NAMESPACE);
    write_ir_header(
        &mut w,
        &paye,
        &period_end(&input.tax_year, &input.submission_date),
    );

    w.open("EmployerPaymentSummary");
    write_emp_refs(&mut w, &paye, &input.accounts_office_reference);
    w.text("RelatedTaxYear", &related_tax_year(&input.tax_year));
    w.value("PeriodNumber", &input.period_number.to_string());

    if input.no_payment_for_period == Some(true) {
        w.value("NoPaymentForPeriod", "yes");
    }

    if let Some(recovery) = &input.statutory_pay_recovery {
        write_recovery(&mut w, recovery);
    }

    if let Some(allowance) = input.employment_allowance.as_ref().filter(|a| a.claimed) {
        w.open("EmploymentAllowance");
        w.value("Claimed", "yes");
        if let Some(amount) = allowance.amount {
            w.value("Amount", &format_money(amount));
        }
        w.close("EmploymentAllowance");
    }

    if let Some(cis) = input.cis_deductions {
        w.value("CISDeductions", &format_money(cis));
    }

    if let Some(levy) = &input.apprenticeship_levy {
        w.open("ApprenticeshipLevy");
        w.value("LevyDueYTD", &format_money(levy.amount));
        w.value("AnnualAllce", &format_money(levy.allowance));
        w.close("ApprenticeshipLevy");
    }

    w.close("EmployerPaymentSummary");
    w.close("IRenvelope");

    debug!(tax_year = %input.tax_year, period = input.period_number, "generated EPS");
    w.finish()
}

/// Writes only the recovered amounts that are set; nothing at all when
/// none are.
fn write_recovery(w: &mut XmlWriter, recovery: &StatutoryPayRecovery) {
    let entries: Vec<(&str, f64)> = [
        ("SMPRecovered", recovery.smp),
        ("SPPRecovered", recovery.spp),
        ("SAPRecovered", recovery.sap),
        ("ShPPRecovered", recovery.shpp),
        ("ASPPRecovered", recovery.aspp),
    ]
    .into_iter()
    .filter_map(|(tag, amount)| amount.map(|a| (tag, a)))
    .collect();

    if entries.is_empty() {
        return;
    }

    w.open("StatutoryPayRecovery");
    for (tag, amount) in entries {
        w.value(tag, &format_money(amount));
    }
    w.close("StatutoryPayRecovery");
}
