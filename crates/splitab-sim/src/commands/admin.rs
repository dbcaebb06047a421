use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use serde_json::Value;
use splitab_core::NoOverrides;
use splitab_exp::{to_canonical_json_bytes, AbTest};

use super::{load_session, save_session, Context};

#[derive(Args, Debug)]
pub struct ForceArgs {
    #[arg(long)]
    pub experiment: String,
    #[arg(long)]
    pub session: PathBuf,
    /// Alternative value as JSON (bare words are read as strings). Omit to clear.
    #[arg(long)]
    pub value: Option<String>,
}

#[derive(Args, Debug)]
pub struct BucketArgs {
    #[arg(long)]
    pub experiment: String,
    #[arg(long)]
    pub identity: String,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Limit the report to one experiment.
    #[arg(long)]
    pub experiment: Option<String>,
}

#[derive(Args, Debug)]
pub struct ResetArgs {
    #[arg(long)]
    pub experiment: String,
}

pub fn force(ctx: &Context, args: &ForceArgs) -> Result<(), Box<dyn Error>> {
    let test = ctx.experiment(&args.experiment)?;
    let mut session = load_session(Some(args.session.as_path()))?;
    let value = args.value.as_deref().map(parse_value);
    test.force_selection(value.as_ref(), &mut session)?;
    save_session(&args.session, &session)?;
    Ok(())
}

pub fn bucket(ctx: &Context, args: &BucketArgs) -> Result<(), Box<dyn Error>> {
    let test = ctx.experiment(&args.experiment)?;
    let assignment = test.preview(&args.identity, &NoOverrides)?;
    println!("{}", assignment.alternative);
    Ok(())
}

pub fn report(ctx: &Context, args: &ReportArgs) -> Result<(), Box<dyn Error>> {
    let tests: Vec<AbTest> = match &args.experiment {
        Some(name) => vec![ctx.experiment(name)?],
        None => ctx.catalog.build(ctx.store.clone())?,
    };
    let reports = tests
        .iter()
        .map(AbTest::report)
        .collect::<Result<Vec<_>, _>>()?;
    let bytes = to_canonical_json_bytes(&reports)?;
    println!("{}", String::from_utf8(bytes)?);
    Ok(())
}

pub fn reset(ctx: &Context, args: &ResetArgs) -> Result<(), Box<dyn Error>> {
    ctx.experiment(&args.experiment)?.reset()?;
    Ok(())
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
