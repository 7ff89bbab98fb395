//! Calendar command.

use crate::display::time_grid;
use anyhow::{Context, Result};
use sessionbar_lib::prelude::*;
use sessionbar_lib::{BoundaryRule, RuleKind};

use super::parse_interval;

/// Starts shown per output row.
const STARTS_PER_ROW: usize = 8;

/// Print the session calendar: opens, rule table and every interval start.
pub(crate) fn show_calendar(
    config: &PipelineConfig,
    interval: Option<&str>,
    show_rules: bool,
    json: bool,
) -> Result<()> {
    let mut schedule = config.schedule.clone();
    if let Some(interval) = interval {
        schedule.interval_minutes = parse_interval(interval)?.minutes();
    }
    let calendar = schedule.to_calendar().context("Invalid session schedule")?;
    let starts: Vec<_> = calendar.interval_starts().collect();

    if json {
        let value = serde_json::json!({
            "interval": calendar.interval().to_string(),
            "session_opens": schedule.session_opens,
            "rules": calendar.rules(),
            "interval_starts": starts.iter().map(|t| t.format("%H:%M").to_string()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Interval: {}", calendar.interval());
    println!("Session opens: {}", schedule.session_opens.join(", "));

    if show_rules {
        println!("\nRules (checked in order, then minute % {} == 0):", calendar.interval().minutes());
        for rule in calendar.rules() {
            println!("  {}", describe_rule(rule));
        }
    }

    println!("\nInterval starts ({}):", starts.len());
    for line in time_grid(&starts, STARTS_PER_ROW).lines() {
        println!("  {line}");
    }

    Ok(())
}

fn describe_rule(rule: &BoundaryRule) -> String {
    let kind = match rule.kind {
        RuleKind::SessionOpen => "session open",
        RuleKind::OpenAbsorption => "open absorption",
    };
    let effect = if rule.is_boundary { "start" } else { "no start" };
    format!("{:02}:{:02}  {effect:<8}  {kind}", rule.hour, rule.minute)
}
