//! Implementation of the `plan` command.
//!
//! Prints the targets a run would execute, in order, without touching the
//! container runtime.

use anyhow::{Context, Result};
use serde::Serialize;

use aprendo_deploy::orchestrate::{TargetAction, TargetDag, TargetSet};

use crate::output::{self, print_info, print_json};

#[derive(Serialize)]
struct PlannedTarget<'a> {
  name: &'a str,
  action: &'a TargetAction,
}

fn describe(action: &TargetAction) -> String {
  match action {
    TargetAction::None => "no action".to_string(),
    TargetAction::BuildImage(stage) => format!("build stage {}", stage),
    TargetAction::ExportImages => "export images".to_string(),
    TargetAction::Clean => "remove archives".to_string(),
  }
}

pub fn cmd_plan(name: &str, json: bool) -> Result<()> {
  let dag = TargetDag::new(&TargetSet::aprendo()).context("Invalid target graph")?;
  let plan = dag.plan(name)?;

  if json {
    let planned: Vec<_> = plan
      .iter()
      .map(|t| PlannedTarget {
        name: &t.name,
        action: &t.action,
      })
      .collect();
    return print_json(&planned);
  }

  print_info(&format!("Plan for {}: {} target(s)", name, plan.len()));
  for (i, target) in plan.iter().enumerate() {
    println!(
      "  {}. {} {} {}",
      i + 1,
      target.name,
      output::symbols::ARROW,
      describe(&target.action)
    );
  }

  Ok(())
}
