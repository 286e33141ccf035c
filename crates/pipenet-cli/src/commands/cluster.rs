//! Cluster command implementation

use crate::cli::ClusterArgs;
use crate::input::read_applications;
use crate::output::OutputWriter;
use crate::output_types::{ClusterOutput, ClusterSummary};
use anyhow::Result;
use pipenet_core::config::LayeredConfig;
use pipenet_core::models::ApplicationRecord;
use pipenet_geo::{active_applications, group_by_location};
use tabled::Tabled;

pub fn execute(args: ClusterArgs, config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let applications = read_applications(&args.applications, output)?;
    let cluster_tolerance = config.cluster_tolerance.value;

    let shown: Vec<&ApplicationRecord> = if config.include_completed.value {
        applications.iter().collect()
    } else {
        active_applications(&applications).collect()
    };

    let groups: Vec<ClusterSummary> = group_by_location(shown.iter().copied(), cluster_tolerance)
        .into_iter()
        .filter(|group| group.len() >= args.min_size)
        .map(|group| {
            let tone = group.tone();
            ClusterSummary {
                key: group.key,
                location: group.location,
                badge: group.badge_label(),
                tone: tone.as_str().to_string(),
                color: tone.hex().to_string(),
                counts: group.counts,
                member_ids: group.member_ids(),
            }
        })
        .collect();

    if output.is_json() {
        return output.result(ClusterOutput {
            cluster_tolerance,
            application_count: shown.len(),
            groups,
        });
    }

    output.section("Marker Groups");
    output.kv("Cell size", format!("{}°", cluster_tolerance));

    #[derive(Tabled)]
    struct GroupRow {
        #[tabled(rename = "Location")]
        location: String,
        #[tabled(rename = "Badge")]
        badge: String,
        #[tabled(rename = "Color")]
        color: String,
        #[tabled(rename = "Water")]
        water: usize,
        #[tabled(rename = "Sewer")]
        sewer: usize,
        #[tabled(rename = "Unassigned")]
        unassigned: usize,
        #[tabled(rename = "Applications")]
        members: String,
    }

    let group_count = groups.len();
    let rows: Vec<GroupRow> = groups
        .into_iter()
        .map(|group| GroupRow {
            location: format!("{:.6}, {:.6}", group.location.lat, group.location.lng),
            badge: group.badge,
            color: format!("{} {}", group.tone, group.color),
            water: group.counts.water,
            sewer: group.counts.sewer,
            unassigned: group.counts.unassigned,
            members: group
                .member_ids
                .iter()
                .map(i64::to_string)
                .collect::<Vec<_>>()
                .join(", "),
        })
        .collect();

    output.table(rows);
    output.success(format!(
        "{} application(s) in {} group(s)",
        shown.len(),
        group_count
    ));

    Ok(())
}
