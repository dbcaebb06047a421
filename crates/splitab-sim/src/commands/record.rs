use std::error::Error;
use std::path::PathBuf;

use clap::Args;

use super::{load_session, Context};

#[derive(Args, Debug)]
pub struct RecordArgs {
    #[arg(long)]
    pub experiment: String,
    #[arg(long)]
    pub identity: String,
    /// JSON session file carrying forced selections.
    #[arg(long)]
    pub session: Option<PathBuf>,
}

pub fn choose(ctx: &Context, args: &RecordArgs) -> Result<(), Box<dyn Error>> {
    let test = ctx.experiment(&args.experiment)?;
    let session = load_session(args.session.as_deref())?;
    let value = test.choose(&args.identity, &session)?;
    println!("{value}");
    Ok(())
}

pub fn convert(ctx: &Context, args: &RecordArgs) -> Result<(), Box<dyn Error>> {
    let test = ctx.experiment(&args.experiment)?;
    let session = load_session(args.session.as_deref())?;
    let alternative = test.record_conversion(&args.identity, &session)?;
    println!("{alternative}");
    Ok(())
}
