use std::fs;

use anyhow::Context;
use rti_core::{validate_xml, EpsInput, EyuInput, FpsInput, SubmissionInput};

use crate::cli::args::{DocumentKind, GenerateArgs, ValidateArgs};
use crate::exit_codes::{SUCCESS, VALIDATION_FAILED};

pub fn generate(args: GenerateArgs) -> anyhow::Result<i32> {
    let raw = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let input = parse_input(&raw, args.kind)
        .with_context(|| format!("failed to parse {}", args.input.display()))?;

    let xml = input.generate()?;
    tracing::info!(kind = input.kind(), bytes = xml.len(), "generated document");

    match &args.output {
        Some(path) => fs::write(path, &xml)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", xml),
    }

    let result = validate_xml(&xml);
    if !result.valid {
        for error in &result.errors {
            eprintln!("invalid: {}", error);
        }
        return Ok(VALIDATION_FAILED);
    }
    Ok(SUCCESS)
}

pub fn validate(args: ValidateArgs) -> anyhow::Result<i32> {
    let xml = fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;

    let result = validate_xml(&xml);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(if result.valid { SUCCESS } else { VALIDATION_FAILED })
}

fn parse_input(raw: &str, kind: Option<DocumentKind>) -> serde_json::Result<SubmissionInput> {
    Ok(match kind {
        Some(DocumentKind::Fps) => SubmissionInput::Fps(serde_json::from_str::<FpsInput>(raw)?),
        Some(DocumentKind::Eps) => SubmissionInput::Eps(serde_json::from_str::<EpsInput>(raw)?),
        Some(DocumentKind::Eyu) => SubmissionInput::Eyu(serde_json::from_str::<EyuInput>(raw)?),
        None => serde_json::from_str(raw)?,
    })
}
