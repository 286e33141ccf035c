//! Config command implementation

use crate::output::OutputWriter;
use crate::output_types::{ConfigEntry, ConfigOutput};
use anyhow::Result;
use pipenet_core::config::LayeredConfig;
use tabled::Tabled;

pub fn execute(config: &LayeredConfig, output: &OutputWriter) -> Result<()> {
    let inspection_map = config.to_inspection_map();

    if output.is_json() {
        let values = inspection_map
            .into_iter()
            .map(|(key, (value, source))| {
                let entry = ConfigEntry {
                    value,
                    source: source.as_str().to_string(),
                };
                (key, entry)
            })
            .collect();
        return output.result(ConfigOutput { values });
    }

    output.section("Configuration Values");

    #[derive(Tabled)]
    struct ConfigRow {
        #[tabled(rename = "Key")]
        key: String,
        #[tabled(rename = "Value")]
        value: String,
        #[tabled(rename = "Source")]
        source: String,
    }

    // BTreeMap iteration is already sorted by key
    let rows: Vec<ConfigRow> = inspection_map
        .into_iter()
        .map(|(key, (value, source))| ConfigRow {
            key,
            value,
            source: source.as_str().to_string(),
        })
        .collect();

    output.table(rows);

    output.section("Configuration Precedence");
    output.info("CLI arguments > Environment variables > Config file > Defaults");

    Ok(())
}
