//! Integration tests for FPS, EPS and EYU generation and validation.
//!
//! FPS writes empty elements for unset optional amounts; EPS and EYU omit
//! them. Both conventions are asserted here.

use chrono::NaiveDate;
use rti_core::xml::{
    ApprenticeshipLevy, Corrections, Employee, EmploymentAllowance, EpsInput, EyuInput, FpsInput,
    PayrollRecord, StatutoryPayRecovery, SubmissionInput, EPS_NAMESPACE, EYU_NAMESPACE,
    FPS_NAMESPACE,
};
use rti_core::{generate_eps, generate_eyu, generate_fps, validate_xml, RtiError};

fn employee(id: &str, nino: &str) -> Employee {
    Employee {
        id: id.to_string(),
        first_name: "Jane".into(),
        last_name: "O'Neill".into(),
        ni_number: Some(nino.to_string()),
        tax_code: "1257L".into(),
        ..Default::default()
    }
}

fn record(id: &str, employee: Option<Employee>) -> PayrollRecord {
    PayrollRecord {
        id: id.to_string(),
        employee,
        gross_pay: 1000.0,
        tax_deductions: 200.0,
        ni_deductions: 52.4,
        employer_ni: 98.1,
        ..Default::default()
    }
}

fn fps_input(records: Vec<PayrollRecord>) -> FpsInput {
    FpsInput {
        payroll_records: records,
        employer_paye_reference: "123/AB45678".into(),
        accounts_office_reference: "123PA00012345".into(),
        tax_year: "2025-26".into(),
        period_number: 1,
        period_type: "monthly".into(),
        payment_date: NaiveDate::from_ymd_opt(2025, 4, 25).unwrap().into(),
        submission_date: "2025-04-24T08:30:00Z".into(),
    }
}

fn eps_input() -> EpsInput {
    EpsInput {
        employer_paye_reference: "123/AB45678".into(),
        accounts_office_reference: "123PA00012345".into(),
        tax_year: "2025-26".into(),
        period_number: 3,
        submission_date: "2025-07-10".into(),
        no_payment_for_period: None,
        statutory_pay_recovery: None,
        employment_allowance: None,
        cis_deductions: None,
        apprenticeship_levy: None,
    }
}

fn eyu_input(corrections: Corrections) -> EyuInput {
    EyuInput {
        employer_paye_reference: "123/AB45678".into(),
        accounts_office_reference: "123PA00012345".into(),
        tax_year: "2024-25".into(),
        submission_date: "2025-06-01".into(),
        employee_id: "emp-1".into(),
        original_payroll_id: "PAY-0001".into(),
        corrections,
        reason: "Bonus omitted from March run".into(),
    }
}

#[test]
fn test_fps_end_to_end_figures() {
    let xml = generate_fps(&fps_input(vec![record(
        "pr-1",
        Some(employee("emp-1", "AB123456C")),
    )]))
    .unwrap();

    assert!(xml.contains("<GrossPay>1000.00</GrossPay>"));
    assert!(xml.contains("<TaxDeducted>200.00</TaxDeducted>"));
    assert!(xml.contains("<NINO>AB123456C</NINO>"));
    assert!(xml.contains("<EmpeeContribnsInPd>52.40</EmpeeContribnsInPd>"));
    assert!(xml.contains("<TotalEmpNICInPd>98.10</TotalEmpNICInPd>"));
    assert!(validate_xml(&xml).valid);
}

#[test]
fn test_fps_header_and_references() {
    let xml = generate_fps(&fps_input(vec![record(
        "pr-1",
        Some(employee("emp-1", "AB123456C")),
    )]))
    .unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(xml.contains(&format!("<IRenvelope xmlns=\"{}\">", FPS_NAMESPACE)));
    assert!(xml.contains("<Key Type=\"TaxOfficeNumber\">123</Key>"));
    assert!(xml.contains("<Key Type=\"TaxOfficeReference\">AB45678</Key>"));
    assert!(xml.contains("<PeriodEnd>2026-04-05</PeriodEnd>"));
    assert!(xml.contains("<Sender>Employer</Sender>"));
    assert!(xml.contains("<SenderID>RTIPAYROLL</SenderID>"));
    assert!(xml.contains("<OfficeNo>123</OfficeNo>"));
    assert!(xml.contains("<PayeRef>AB45678</PayeRef>"));
    assert!(xml.contains("<AORef>123PA00012345</AORef>"));
    assert!(xml.contains("<RelatedTaxYear>25-26</RelatedTaxYear>"));
    assert!(xml.contains("<PayFrequency>M1</PayFrequency>"));
    assert!(xml.contains("<PeriodNumber>1</PeriodNumber>"));
    assert!(xml.contains("<PaymentDate>2025-04-25</PaymentDate>"));
    assert!(xml.contains("<MonthNo>1</MonthNo>"));

    // IRheader precedes the body.
    assert!(xml.find("<IRheader>").unwrap() < xml.find("<FullPaymentSubmission>").unwrap());
}

#[test]
fn test_fps_employee_count_and_order() {
    let records = vec![
        record("pr-1", Some(employee("emp-a", "AA111111A"))),
        record("pr-2", Some(employee("emp-b", "BB222222B"))),
        record("pr-3", Some(employee("emp-c", "CC333333C"))),
    ];
    let xml = generate_fps(&fps_input(records)).unwrap();

    assert_eq!(xml.matches("<Employee>").count(), 3);
    let a = xml.find("<PayId>emp-a</PayId>").unwrap();
    let b = xml.find("<PayId>emp-b</PayId>").unwrap();
    let c = xml.find("<PayId>emp-c</PayId>").unwrap();
    assert!(a < b && b < c);
}

#[test]
fn test_fps_missing_employee_names_record_and_index() {
    let records = vec![
        record("pr-1", Some(employee("emp-a", "AA111111A"))),
        record("pr-2", None),
    ];
    let result = generate_fps(&fps_input(records));

    match result {
        Err(RtiError::MissingData { payroll_id, index }) => {
            assert_eq!(payroll_id, "pr-2");
            assert_eq!(index, 1);
        }
        other => panic!("expected MissingData, got {:?}", other),
    }
}

#[test]
fn test_fps_malformed_nino_still_generates() {
    let xml = generate_fps(&fps_input(vec![record(
        "pr-1",
        Some(employee("emp-1", "not a nino")),
    )]))
    .unwrap();
    assert!(xml.contains("<NINO>NOTANINO</NINO>"));
}

#[test]
fn test_fps_nino_normalized() {
    let xml = generate_fps(&fps_input(vec![record(
        "pr-1",
        Some(employee("emp-1", "ab 12 34 56 c")),
    )]))
    .unwrap();
    assert!(xml.contains("<NINO>AB123456C</NINO>"));
}

#[test]
fn test_fps_optional_amounts_are_empty_elements() {
    let xml = generate_fps(&fps_input(vec![record(
        "pr-1",
        Some(employee("emp-1", "AB123456C")),
    )]))
    .unwrap();

    for tag in [
        "StudentLoanRecovered",
        "PostgradLoanRecovered",
        "EmpeePenContribnsPaid",
        "SMP",
        "ShPP",
        "StudentLoansTD",
        "PostgradLoansTD",
        "EmpeePenContribnsPaidYTD",
        "SMPYTD",
    ] {
        assert!(
            xml.contains(&format!("<{tag}></{tag}>", tag = tag)),
            "expected empty <{}>",
            tag
        );
    }
}

#[test]
fn test_fps_optional_amounts_when_set() {
    let mut r = record("pr-1", Some(employee("emp-1", "AB123456C")));
    r.student_loan_deductions = Some(37.0);
    r.pension_deductions = Some(0.0);
    r.year_to_date.student_loan_deductions = Some(111.5);
    let xml = generate_fps(&fps_input(vec![r])).unwrap();

    assert!(xml.contains("<StudentLoanRecovered>37.00</StudentLoanRecovered>"));
    assert!(xml.contains("<StudentLoansTD>111.50</StudentLoansTD>"));
    assert!(xml.contains("<EmpeePenContribnsPaid></EmpeePenContribnsPaid>"));
}

#[test]
fn test_fps_free_text_is_escaped() {
    let xml = generate_fps(&fps_input(vec![record(
        "pr-1",
        Some(employee("emp-1", "AB123456C")),
    )]))
    .unwrap();
    assert!(xml.contains("<Sur>O&apos;Neill</Sur>"));
}

#[test]
fn test_fps_weekly_frequency() {
    let mut input = fps_input(vec![record("pr-1", Some(employee("emp-1", "AB123456C")))]);
    input.period_type = "weekly".into();
    input.period_number = 12;
    let xml = generate_fps(&input).unwrap();

    assert!(xml.contains("<PayFrequency>W1</PayFrequency>"));
    assert!(xml.contains("<PayFreq>W1</PayFreq>"));
    assert!(xml.contains("<WeekNo>12</WeekNo>"));
}

#[test]
fn test_fps_local_midnight_payment_keeps_calendar_day() {
    let mut value = serde_json::to_value(fps_input(vec![record(
        "pr-1",
        Some(employee("emp-1", "AB123456C")),
    )]))
    .unwrap();
    value["payment_date"] = serde_json::json!("2025-04-26T00:30:00+01:00");
    value["submission_date"] = serde_json::json!("26/04/2025");
    let input: FpsInput = serde_json::from_value(value).unwrap();

    let xml = generate_fps(&input).unwrap();
    assert!(xml.contains("<PaymentDate>2025-04-26</PaymentDate>"));
    assert!(xml.contains("<PmtDate>2025-04-26</PmtDate>"));
}

#[test]
fn test_fps_without_records_fails_validation() {
    let xml = generate_fps(&fps_input(Vec::new())).unwrap();
    let result = validate_xml(&xml);

    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].contains("Employee"));
}

#[test]
fn test_eps_without_optionals_omits_sections() {
    let xml = generate_eps(&eps_input());

    assert!(xml.contains(&format!("<IRenvelope xmlns=\"{}\">", EPS_NAMESPACE)));
    assert!(xml.contains("<EmployerPaymentSummary>"));
    for absent in [
        "NoPaymentForPeriod",
        "StatutoryPayRecovery",
        "EmploymentAllowance",
        "CISDeductions",
        "ApprenticeshipLevy",
    ] {
        assert!(!xml.contains(absent), "unexpected {}", absent);
    }
    assert!(validate_xml(&xml).valid);
}

#[test]
fn test_eps_recovery_only_set_fields() {
    let mut input = eps_input();
    input.statutory_pay_recovery = Some(StatutoryPayRecovery {
        smp: Some(1200.0),
        shpp: Some(80.5),
        ..Default::default()
    });
    let xml = generate_eps(&input);

    assert!(xml.contains("<StatutoryPayRecovery>"));
    assert!(xml.contains("<SMPRecovered>1200.00</SMPRecovered>"));
    assert!(xml.contains("<ShPPRecovered>80.50</ShPPRecovered>"));
    assert!(!xml.contains("SPPRecovered"));
    assert!(!xml.contains("<SAPRecovered>"));
    assert!(!xml.contains("ASPPRecovered"));
}

#[test]
fn test_eps_empty_recovery_block_is_omitted() {
    let mut input = eps_input();
    input.statutory_pay_recovery = Some(StatutoryPayRecovery::default());
    assert!(!generate_eps(&input).contains("StatutoryPayRecovery"));
}

#[test]
fn test_eps_employment_allowance_only_when_claimed() {
    let mut input = eps_input();
    input.employment_allowance = Some(EmploymentAllowance {
        claimed: false,
        amount: Some(5000.0),
    });
    assert!(!generate_eps(&input).contains("EmploymentAllowance"));

    input.employment_allowance = Some(EmploymentAllowance {
        claimed: true,
        amount: Some(10500.0),
    });
    let xml = generate_eps(&input);
    assert!(xml.contains("<EmploymentAllowance>"));
    assert!(xml.contains("<Amount>10500.00</Amount>"));
}

#[test]
fn test_eps_all_sections() {
    let mut input = eps_input();
    input.no_payment_for_period = Some(true);
    input.cis_deductions = Some(250.0);
    input.apprenticeship_levy = Some(ApprenticeshipLevy {
        amount: 1500.0,
        allowance: 15000.0,
    });
    let xml = generate_eps(&input);

    assert!(xml.contains("<NoPaymentForPeriod>yes</NoPaymentForPeriod>"));
    assert!(xml.contains("<CISDeductions>250.00</CISDeductions>"));
    assert!(xml.contains("<LevyDueYTD>1500.00</LevyDueYTD>"));
    assert!(xml.contains("<AnnualAllce>15000.00</AnnualAllce>"));
}

#[test]
fn test_eyu_omits_unset_corrections() {
    let xml = generate_eyu(&eyu_input(Corrections {
        gross_pay: Some(250.0),
        tax_deductions: Some(50.0),
        ..Default::default()
    }));

    assert!(xml.contains(&format!("<IRenvelope xmlns=\"{}\">", EYU_NAMESPACE)));
    assert!(xml.contains("<EmployeeId>emp-1</EmployeeId>"));
    assert!(xml.contains("<OriginalPayrollId>PAY-0001</OriginalPayrollId>"));
    assert!(xml.contains("<Reason>Bonus omitted from March run</Reason>"));
    assert!(xml.contains("<GrossPay>250.00</GrossPay>"));
    assert!(xml.contains("<TaxDeductions>50.00</TaxDeductions>"));
    assert!(!xml.contains("NIDeductions"));
    assert!(!xml.contains("StudentLoanDeductions"));
    assert!(!xml.contains("PensionDeductions"));
    assert!(xml.contains("<PeriodEnd>2025-04-05</PeriodEnd>"));
}

#[test]
fn test_eyu_zero_correction_is_kept() {
    let xml = generate_eyu(&eyu_input(Corrections {
        ni_deductions: Some(0.0),
        ..Default::default()
    }));
    assert!(xml.contains("<NIDeductions>0.00</NIDeductions>"));
}

#[test]
fn test_submission_input_from_tagged_json() {
    let json = serde_json::json!({
        "type": "eyu",
        "employer_paye_reference": "123/AB45678",
        "accounts_office_reference": "123PA00012345",
        "tax_year": "2024-25",
        "submission_date": "2025-06-01",
        "employee_id": "emp-1",
        "original_payroll_id": "PAY-0001",
        "corrections": { "pension_deductions": 12.5 },
        "reason": "Pension <correction>"
    });
    let input: SubmissionInput = serde_json::from_value(json).unwrap();
    assert_eq!(input.kind(), "EYU");

    let xml = input.generate().unwrap();
    assert!(xml.contains("<PensionDeductions>12.50</PensionDeductions>"));
    assert!(xml.contains("<Reason>Pension &lt;correction&gt;</Reason>"));
}
