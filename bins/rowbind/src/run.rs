use std::io::{BufWriter, Read, Write};

use rowbind_engine::{materialize_with, parse_query_response, DynamicRecord, RecordLayout};

use crate::config::{Cli, LayoutConfig};
use crate::error::CliError;

pub fn run(cli: &Cli) -> Result<(), CliError> {
    tracing::info!(layout = %cli.layout, "loading record layout");
    let layout = LayoutConfig::load(&cli.layout)?.into_layout()?;

    let body = read_input(&cli.input)?;
    let result = parse_query_response(&body)?;
    tracing::info!(
        input = %cli.input,
        columns = result.schema.len(),
        rows = result.rows.len(),
        "query response loaded"
    );

    let mut records: Vec<DynamicRecord> = Vec::with_capacity(result.rows.len());
    let appended = materialize_with(&layout, &result, &mut records)?;

    let stdout = std::io::stdout();
    write_records(&layout, &records, BufWriter::new(stdout.lock()))?;
    tracing::info!(records = appended, "done");
    Ok(())
}

fn read_input(path: &str) -> Result<String, CliError> {
    let input_error = |source| CliError::Input {
        path: path.to_string(),
        source,
    };
    if path == "-" {
        let mut body = String::new();
        std::io::stdin()
            .read_to_string(&mut body)
            .map_err(input_error)?;
        Ok(body)
    } else {
        std::fs::read_to_string(path).map_err(input_error)
    }
}

/// One JSON object per line.
fn write_records<W: Write>(
    layout: &RecordLayout,
    records: &[DynamicRecord],
    mut out: W,
) -> Result<(), CliError> {
    for record in records {
        serde_json::to_writer(&mut out, &layout.to_json(record))?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}
