//! Rows command - stream typed rows as JSON lines.

use std::io::{BufWriter, Write};

use datapackage::{PackageResult, ParsedRow};
use tracing::debug;

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the rows command.
pub struct RowsArgs {
    pub uri: String,
    pub resource: Option<String>,
    pub limit: Option<usize>,
}

/// Run the rows command.
pub fn run(runner: &CliRunner, args: RowsArgs) -> Result<(), CliError> {
    let package = runner.open_package(&args.uri)?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let written = match &args.resource {
        Some(name) => write_rows(package.get_data(name)?, args.limit, &mut out)?,
        None => write_rows(package.rows(), args.limit, &mut out)?,
    };
    out.flush()?;

    debug!(rows = written, "Wrote rows");
    Ok(())
}

/// Write up to `limit` rows, one JSON object per line.
///
/// Stops at the first failing row. Returns the number of rows written.
pub fn write_rows<I, W>(rows: I, limit: Option<usize>, out: &mut W) -> Result<usize, CliError>
where
    I: Iterator<Item = PackageResult<ParsedRow>>,
    W: Write,
{
    let mut written = 0;
    for row in rows.take(limit.unwrap_or(usize::MAX)) {
        let row = row?;
        serde_json::to_writer(&mut *out, &row.to_json()).map_err(std::io::Error::from)?;
        writeln!(out)?;
        written += 1;
    }
    Ok(written)
}
