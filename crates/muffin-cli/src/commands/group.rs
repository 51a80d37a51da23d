//! Group command - run one named group

use super::{build_harness, load_config, Outcome};
use crate::GlobalArgs;
use anyhow::{bail, Result};
use muffin_core::HarnessError;

pub fn run(args: &GlobalArgs, name: &str) -> Result<Outcome> {
    let config = load_config(args)?;
    let mut harness = build_harness(&config, args.json)?;

    let report = match harness.test_certain_class(name) {
        Ok(report) => report,
        Err(HarnessError::GroupNotFound { name }) => bail!("Could not find test {}", name),
        Err(err) => return Err(err.into()),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(Outcome::from_success(report.tally.is_success()))
}
