//! Associate command implementation

use crate::cli::AssociateArgs;
use crate::input::{read_applications, read_network};
use crate::output::OutputWriter;
use crate::output_types::{ApplicationPipe, AssociateOutput};
use anyhow::Result;
use pipenet_core::config::LayeredConfig;
use pipenet_geo::{resolve_pipe, PipeIndex, PipeResolution};
use tabled::Tabled;

pub fn execute(args: AssociateArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let applications = read_applications(&args.applications, output)?;
    let network = read_network(&args.network, output)?;
    let tolerance = config.association_tolerance();
    let include_completed = config.include_completed.value;

    let index = PipeIndex::from_network(&network);
    tracing::debug!(pipes = index.len(), %tolerance, "Built pipe index");

    let resolved: Vec<ApplicationPipe> = applications
        .iter()
        .filter(|application| include_completed || application.is_active())
        .map(|application| ApplicationPipe {
            application_id: application.id,
            status: application.status.to_string(),
            resolution: resolve_pipe(application, &index, tolerance),
        })
        .collect();

    let open_pipes: Vec<i64> = index
        .pipes_with_open_applications(&applications, tolerance)
        .into_iter()
        .collect();

    if output.is_json() {
        return output.result(AssociateOutput {
            tolerance,
            applications: resolved,
            pipes_with_open_applications: open_pipes,
        });
    }

    output.section("Applications");
    output.kv("Tolerance", tolerance);

    #[derive(Tabled)]
    struct ResolutionRow {
        #[tabled(rename = "Application")]
        id: i64,
        #[tabled(rename = "Status")]
        status: String,
        #[tabled(rename = "Pipe")]
        pipe: String,
        #[tabled(rename = "How")]
        how: String,
    }

    let unresolved = resolved
        .iter()
        .filter(|item| item.resolution == PipeResolution::Unresolved)
        .count();

    let rows: Vec<ResolutionRow> = resolved
        .into_iter()
        .map(|item| {
            let how = match item.resolution {
                PipeResolution::Explicit { .. } => "created on pipe".to_string(),
                PipeResolution::Nearest(found) => format!("nearest ({:.6})", found.distance),
                PipeResolution::Unresolved => "-".to_string(),
            };
            ResolutionRow {
                id: item.application_id,
                status: item.status,
                pipe: item
                    .resolution
                    .pipe_id()
                    .map_or_else(|| "-".to_string(), |id| id.to_string()),
                how,
            }
        })
        .collect();
    output.table(rows);

    if unresolved > 0 {
        output.warning(format!("{} application(s) are not on any pipe", unresolved));
    }

    output.section("Pipes With Open Applications");
    if open_pipes.is_empty() {
        output.info("No pipe has open applications");
    } else {
        let ids: Vec<String> = open_pipes.iter().map(i64::to_string).collect();
        output.kv("Pipes", ids.join(", "));
    }

    Ok(())
}
