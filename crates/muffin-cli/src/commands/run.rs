//! Run command - every group, then the grand total

use super::{build_harness, load_config, Outcome};
use crate::GlobalArgs;
use anyhow::Result;

pub fn run(args: &GlobalArgs) -> Result<Outcome> {
    let config = load_config(args)?;
    let mut harness = build_harness(&config, args.json)?;
    let report = harness.run_all_tests()?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(Outcome::from_success(report.is_success()))
}
