//! Row streaming engine.
//!
//! [`ResourceRows`] pulls one resource's bytes through its opener, decodes
//! them with the declared encoding, parses CSV, drops the first record and
//! coerces every following record into a [`ParsedRow`]. Nothing is buffered
//! beyond the CSV reader's working buffer, so arbitrarily large resources
//! stream in constant memory.
//!
//! [`PackageRows`] chains the streams of every resource in registry order.
//! A resource is only opened once the previous one is exhausted.
//!
//! # Lifecycle
//!
//! ```text
//! open ──► header skipped on first next() ──► rows ... ──► exhausted ─┐
//!   │                                            │                   ├─► closed (fused)
//!   └──────────── close() / drop ────────────────┴── first error ────┘
//! ```
//!
//! The first error ends the stream: there is no skip-and-continue.

use std::fmt;

use csv::StringRecord;
use encoding_rs::Encoding;
use encoding_rs_io::{DecodeReaderBytes, DecodeReaderBytesBuilder};
use tracing::{debug, trace, warn};

use crate::error::{PackageError, PackageResult};
use crate::location::BaseLocation;
use crate::opener::{ByteStream, Opener};
use crate::resolver::{resolve, FieldParser};
use crate::schema::ResourceEntry;
use crate::value::ParsedRow;

type CsvReader = csv::Reader<DecodeReaderBytes<ByteStream, Vec<u8>>>;

/// One positional column: output key plus its parser.
#[derive(Debug, Clone)]
struct Column {
    name: String,
    parser: FieldParser,
}

/// Lazy, single-pass row stream over one resource.
pub struct ResourceRows {
    resource: String,
    columns: Vec<Column>,
    reader: Option<CsvReader>,
    record: StringRecord,
    header_skipped: bool,
    next_row: usize,
    warned_wide: bool,
}

impl ResourceRows {
    /// Open a resource at an already-resolved location.
    ///
    /// The opener is called immediately, so open failures surface here
    /// rather than on the first `next()`.
    pub fn open<O: Opener + ?Sized>(
        entry: &ResourceEntry,
        location: &str,
        opener: &O,
    ) -> PackageResult<Self> {
        let encoding = Encoding::for_label(entry.encoding.trim().as_bytes()).ok_or_else(|| {
            PackageError::UnknownEncoding {
                resource: entry.name.clone(),
                encoding: entry.encoding.clone(),
            }
        })?;

        let stream = opener.open(location).map_err(|source| PackageError::Open {
            location: location.to_string(),
            source,
        })?;

        Ok(Self::from_stream(entry, encoding, stream, location))
    }

    fn from_stream(
        entry: &ResourceEntry,
        encoding: &'static Encoding,
        stream: ByteStream,
        location: &str,
    ) -> Self {
        let decoder = DecodeReaderBytesBuilder::new()
            .encoding(Some(encoding))
            .build(stream);
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(decoder);

        let columns = entry
            .fields
            .iter()
            .map(|field| Column {
                name: field.name.clone(),
                parser: resolve(field),
            })
            .collect();

        debug!(
            resource = %entry.name,
            location = %location,
            encoding = encoding.name(),
            "Opened resource stream"
        );

        Self {
            resource: entry.name.clone(),
            columns,
            reader: Some(reader),
            record: StringRecord::new(),
            header_skipped: false,
            next_row: 0,
            warned_wide: false,
        }
    }

    /// Name of the resource being streamed.
    pub fn resource(&self) -> &str {
        &self.resource
    }

    /// Number of data rows yielded so far.
    pub fn rows_read(&self) -> usize {
        self.next_row
    }

    /// Returns true while the underlying stream is held open.
    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    /// Release the underlying stream. Further calls to `next()` return `None`.
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            debug!(
                resource = %self.resource,
                rows = self.next_row,
                "Closed resource stream"
            );
        }
    }

    fn read_record(&mut self) -> Result<bool, csv::Error> {
        match self.reader.as_mut() {
            Some(reader) => reader.read_record(&mut self.record),
            None => Ok(false),
        }
    }

    /// Advance to the next data record, skipping the header on first use.
    fn advance(&mut self) -> PackageResult<bool> {
        let csv_err = |resource: &str, source: csv::Error| PackageError::Csv {
            resource: resource.to_string(),
            source,
        };

        if !self.header_skipped {
            self.header_skipped = true;
            if !self.read_record().map_err(|e| csv_err(&self.resource, e))? {
                return Ok(false);
            }
        }

        self.read_record().map_err(|e| csv_err(&self.resource, e))
    }

    /// Coerce the current record into a row.
    fn build_row(&mut self, row: usize) -> PackageResult<ParsedRow> {
        if self.record.len() > self.columns.len() && !self.warned_wide {
            self.warned_wide = true;
            warn!(
                resource = %self.resource,
                row,
                cells = self.record.len(),
                fields = self.columns.len(),
                "Row has more cells than schema fields, extra cells ignored"
            );
        }

        let mut parsed = ParsedRow::new();
        for (idx, column) in self.columns.iter().enumerate() {
            let raw = self.record.get(idx).ok_or_else(|| PackageError::MissingCell {
                field: column.name.clone(),
                row,
            })?;

            let value = column
                .parser
                .parse(raw)
                .map_err(|source| PackageError::FieldCoercion {
                    field: column.name.clone(),
                    row,
                    source,
                })?;
            parsed.insert(column.name.clone(), value);
        }
        Ok(parsed)
    }
}

impl Iterator for ResourceRows {
    type Item = PackageResult<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_none() {
            return None;
        }

        match self.advance() {
            Ok(true) => {}
            Ok(false) => {
                self.close();
                return None;
            }
            Err(e) => {
                self.close();
                return Some(Err(e));
            }
        }

        let row = self.next_row;
        self.next_row += 1;

        let result = self.build_row(row);
        match &result {
            Ok(_) => trace!(resource = %self.resource, row, "Parsed row"),
            Err(e) => {
                debug!(resource = %self.resource, row, error = %e, "Row coercion failed");
                self.close();
            }
        }
        Some(result)
    }
}

impl Drop for ResourceRows {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for ResourceRows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRows")
            .field("resource", &self.resource)
            .field("columns", &self.columns)
            .field("open", &self.is_open())
            .field("next_row", &self.next_row)
            .finish()
    }
}

/// Resolve the absolute location of a resource against the package base.
pub(crate) fn locate(base: &BaseLocation, entry: &ResourceEntry) -> PackageResult<String> {
    let reference = entry
        .location
        .as_deref()
        .ok_or_else(|| PackageError::MissingLocation(entry.name.clone()))?;
    base.resolve(reference)
}

/// Lazy concatenation of every resource's rows, in registry order.
pub struct PackageRows<'a, O: ?Sized> {
    base: &'a BaseLocation,
    opener: &'a O,
    pending: std::vec::IntoIter<&'a ResourceEntry>,
    current: Option<ResourceRows>,
    finished: bool,
}

impl<'a, O: Opener + ?Sized> PackageRows<'a, O> {
    pub(crate) fn new(
        base: &'a BaseLocation,
        opener: &'a O,
        resources: Vec<&'a ResourceEntry>,
    ) -> Self {
        Self {
            base,
            opener,
            pending: resources.into_iter(),
            current: None,
            finished: false,
        }
    }

    /// Name of the resource currently being streamed, if any.
    pub fn current_resource(&self) -> Option<&str> {
        self.current.as_ref().map(ResourceRows::resource)
    }

    /// Release the active stream and skip all remaining resources.
    pub fn close(&mut self) {
        if let Some(mut current) = self.current.take() {
            current.close();
        }
        self.finished = true;
    }

    fn open_next(&mut self) -> Option<PackageResult<ResourceRows>> {
        let entry = self.pending.next()?;
        Some(
            locate(self.base, entry)
                .and_then(|location| ResourceRows::open(entry, &location, self.opener)),
        )
    }
}

impl<O: Opener + ?Sized> Iterator for PackageRows<'_, O> {
    type Item = PackageResult<ParsedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            if let Some(current) = self.current.as_mut() {
                match current.next() {
                    Some(Ok(row)) => return Some(Ok(row)),
                    Some(Err(e)) => {
                        self.close();
                        return Some(Err(e));
                    }
                    None => self.current = None,
                }
            }

            match self.open_next() {
                Some(Ok(rows)) => self.current = Some(rows),
                Some(Err(e)) => {
                    self.close();
                    return Some(Err(e));
                }
                None => self.finished = true,
            }
        }
        None
    }
}

impl<O: ?Sized> fmt::Debug for PackageRows<'_, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PackageRows")
            .field("base", &self.base)
            .field("current", &self.current)
            .field("remaining", &self.pending.len())
            .field("finished", &self.finished)
            .finish()
    }
}
