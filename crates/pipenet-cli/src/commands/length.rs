//! Length command implementation

use crate::cli::LengthArgs;
use crate::input::read_network;
use crate::output::OutputWriter;
use crate::output_types::LengthOutput;
use anyhow::Result;
use pipenet_geo::{pipe_length, PipeLength};
use tabled::Tabled;

pub fn execute(args: LengthArgs, output: &OutputWriter) -> Result<()> {
    let network = read_network(&args.network, output)?;

    let pipes: Vec<PipeLength> = network.iter().filter_map(pipe_length).collect();
    let total_display_m = pipes.iter().filter_map(|pipe| pipe.display_m).sum::<f64>();
    let total_display_m = (total_display_m * 100.0).round() / 100.0;

    if output.is_json() {
        return output.result(LengthOutput {
            pipes,
            total_display_m,
        });
    }

    output.section("Pipe Lengths");

    #[derive(Tabled)]
    struct LengthRow {
        #[tabled(rename = "Pipe")]
        id: i64,
        #[tabled(rename = "Computed (m)")]
        computed: String,
        #[tabled(rename = "Manual (m)")]
        manual: String,
        #[tabled(rename = "Shown (m)")]
        display: String,
        #[tabled(rename = "Midpoint")]
        midpoint: String,
    }

    let meters = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |m| format!("{:.2}", m));
    let pipe_count = pipes.len();
    let rows: Vec<LengthRow> = pipes
        .into_iter()
        .map(|pipe| LengthRow {
            id: pipe.pipe_id,
            computed: meters(pipe.computed_m),
            manual: meters(pipe.manual_m),
            display: meters(pipe.display_m),
            midpoint: pipe
                .midpoint
                .map_or_else(|| "-".to_string(), |at| format!("{:.6}, {:.6}", at.lat, at.lng)),
        })
        .collect();

    output.table(rows);
    output.success(format!("{} pipe(s), {:.2} m in total", pipe_count, total_display_m));

    Ok(())
}
