//! Handler for the `execute` command.

use crate::adapter::inbound::cli::command::ExecuteArgs;
use crate::adapter::inbound::cli::{confirm, load_config, output};
use crate::domain::id::OpportunityId;
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap;
use crate::port::{ExecutionReport, ExecutionRequest};

/// Submit one opportunity to the execution endpoint.
pub async fn execute(args: &ExecuteArgs) -> Result<()> {
    let config = load_config(&args.config)?;
    let service = bootstrap::build_execution_service(&config)?;
    let defaults = service.options();

    let request = ExecutionRequest {
        opportunity_id: OpportunityId::from(args.opportunity_id.as_str()),
        trade_size_usd: args.size,
        max_slippage: args.max_slippage.unwrap_or(defaults.max_slippage),
        dry_run: !args.live && defaults.dry_run,
    };

    output::section("Execution");
    output::field("Opportunity", output::highlight(&request.opportunity_id));
    output::field("Size", format!("${}", request.trade_size_usd));
    output::field("Max slippage", request.max_slippage);
    output::field("Mode", if request.dry_run { "dry run" } else { "live" });

    if !request.dry_run {
        let prompt = format!(
            "Execute {} for ${} with real funds?",
            request.opportunity_id, request.trade_size_usd
        );
        if !confirm(&prompt, args.yes)? {
            output::warning("Execution cancelled by user");
            return Ok(());
        }
    }

    let report = service.execute(request).await?;
    print_report(&report)
}

fn print_report(report: &ExecutionReport) -> Result<()> {
    if let Some(message) = &report.message {
        output::field("Message", message);
    }
    if output::verbosity() > 0 {
        for (key, value) in &report.extra {
            output::field(key, value);
        }
    }

    if report.success {
        if report.dry_run {
            output::success("Dry run accepted");
            output::hint("pass --live to execute with real funds");
        } else {
            output::success("Execution submitted");
        }
        Ok(())
    } else {
        Err(Error::Incomplete(
            report
                .message
                .clone()
                .unwrap_or_else(|| "execution was not successful".to_string()),
        ))
    }
}
