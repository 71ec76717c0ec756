//! Resources command - list resources and their schemas.

use std::io::Write;

use datapackage::{DataPackage, Opener, ResourceEntry};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the resources command.
pub fn run(runner: &CliRunner, uri: &str) -> Result<(), CliError> {
    let package = runner.open_package(uri)?;
    let stdout = std::io::stdout();
    write_resources(&package, &mut stdout.lock())
}

/// Write one block per resource: location, encoding and typed fields.
pub fn write_resources<O: Opener, W: Write>(
    package: &DataPackage<O>,
    out: &mut W,
) -> Result<(), CliError> {
    let mut first = true;
    for resource in package.resources() {
        if !first {
            writeln!(out)?;
        }
        first = false;
        write_resource(package, resource, out)?;
    }
    Ok(())
}

fn write_resource<O: Opener, W: Write>(
    package: &DataPackage<O>,
    resource: &ResourceEntry,
    out: &mut W,
) -> Result<(), CliError> {
    let name = if resource.name.is_empty() {
        "(unnamed)"
    } else {
        resource.name.as_str()
    };
    writeln!(out, "{}", name)?;

    let location = match resource.location.as_deref() {
        Some(reference) => package.resolve_location(reference)?,
        None => "(none)".to_string(),
    };
    writeln!(out, "  location: {}", location)?;
    writeln!(out, "  encoding: {}", resource.encoding)?;

    let format = resource.format();
    if !format.is_empty() {
        writeln!(out, "  format:   {}", format)?;
    }
    if let Some(bytes) = resource.bytes {
        writeln!(out, "  bytes:    {}", bytes)?;
    }

    if resource.fields.is_empty() {
        writeln!(out, "  fields:   (none)")?;
        return Ok(());
    }

    writeln!(out, "  fields:")?;
    for field in &resource.fields {
        match &field.format {
            Some(format) => writeln!(out, "    {}: {} ({})", field.name, field.field_type, format)?,
            None => writeln!(out, "    {}: {}", field.name, field.field_type)?,
        }
    }
    Ok(())
}
