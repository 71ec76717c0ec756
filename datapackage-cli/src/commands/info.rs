//! Info command - print package metadata.

use std::io::Write;

use datapackage::{DataPackage, Opener};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Run the info command.
pub fn run(runner: &CliRunner, uri: &str) -> Result<(), CliError> {
    let package = runner.open_package(uri)?;
    let stdout = std::io::stdout();
    write_info(&package, &mut stdout.lock())
}

/// Write a human-readable metadata summary.
pub fn write_info<O: Opener, W: Write>(
    package: &DataPackage<O>,
    out: &mut W,
) -> Result<(), CliError> {
    let descriptor = package.descriptor();

    writeln!(out, "Name:        {}", or_unset(descriptor.name().ok()))?;
    writeln!(out, "Title:       {}", or_unset(Some(descriptor.title())))?;
    match descriptor.version() {
        Ok(version) => writeln!(out, "Version:     {}", version)?,
        Err(e) => writeln!(out, "Version:     (invalid: {})", e)?,
    }
    writeln!(
        out,
        "Format:      {}",
        or_unset(descriptor.datapackage_version().ok())
    )?;
    writeln!(out, "Location:    {}", package.base())?;

    if !descriptor.description().is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", descriptor.description())?;
    }

    let licenses = descriptor.licenses()?;
    if !licenses.is_empty() {
        writeln!(out)?;
        writeln!(out, "Licenses:")?;
        for license in &licenses {
            match &license.url {
                Some(url) => writeln!(out, "  {} ({})", license.license_type, url)?,
                None => writeln!(out, "  {}", license.license_type)?,
            }
        }
    }

    let sources = descriptor.sources()?;
    if !sources.is_empty() {
        writeln!(out)?;
        writeln!(out, "Sources:")?;
        for source in &sources {
            match &source.web {
                Some(web) => writeln!(out, "  {} <{}>", source.name, web)?,
                None => writeln!(out, "  {}", source.name)?,
            }
        }
    }

    let keywords = descriptor.keywords();
    if !keywords.is_empty() {
        writeln!(out)?;
        writeln!(out, "Keywords:    {}", keywords.join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "Resources:")?;
    for resource in package.resources() {
        writeln!(out, "  {}", or_unset(Some(resource.name.as_str())))?;
    }

    Ok(())
}

fn or_unset(value: Option<&str>) -> &str {
    match value {
        Some(v) if !v.is_empty() => v,
        _ => "(not set)",
    }
}
