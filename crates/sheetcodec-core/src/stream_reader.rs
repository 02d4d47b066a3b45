//! Forward-only streaming worksheet reader.
//!
//! [`SheetStreamReader`] reads worksheet XML row-by-row using event-driven
//! parsing (`quick_xml::Reader`) without materializing the full DOM. This
//! enables processing large worksheets with bounded memory by reading rows
//! in batches.
//!
//! Shared string indices are resolved through a reference to the workbook's
//! [`SharedStringTable`]. Cell types (string, number, boolean, date, formula,
//! error, inline string) are handled according to the OOXML specification.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::name::QName;

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::sst::SharedStringTable;
use crate::utils::cell_ref::cell_name_to_coordinates;

/// A single row produced by the streaming reader.
#[derive(Debug, Clone)]
pub struct StreamRow {
    /// 1-based row number.
    pub row_number: u32,
    /// Cells in this row as (1-based column index, value) pairs.
    pub cells: Vec<(u32, CellValue)>,
}

/// Forward-only streaming reader for worksheet XML.
///
/// Reads rows in batches without deserializing the entire worksheet into
/// memory. The reader borrows the shared string table for resolving string
/// cell references.
pub struct SheetStreamReader<'a, R: BufRead> {
    reader: quick_xml::Reader<R>,
    sst: &'a SharedStringTable,
    done: bool,
    row_limit: Option<u32>,
    rows_emitted: u32,
}

impl<'a, R: BufRead> SheetStreamReader<'a, R> {
    /// Create a new streaming reader over the given `BufRead` source.
    ///
    /// `sst` is a reference to the shared string table for resolving
    /// shared string cell values. `row_limit` optionally caps the number
    /// of rows returned.
    pub fn new(source: R, sst: &'a SharedStringTable, row_limit: Option<u32>) -> Self {
        let mut reader = quick_xml::Reader::from_reader(source);
        reader.config_mut().trim_text(false);
        Self {
            reader,
            sst,
            done: false,
            row_limit,
            rows_emitted: 0,
        }
    }

    /// Read the next batch of rows. Returns an empty `Vec` when there are no
    /// more rows to read.
    pub fn next_batch(&mut self, batch_size: usize) -> Result<Vec<StreamRow>> {
        if self.done {
            return Ok(Vec::new());
        }

        let mut rows = Vec::with_capacity(batch_size);
        let mut buf = Vec::with_capacity(4096);

        loop {
            if rows.len() >= batch_size {
                break;
            }
            if let Some(limit) = self.row_limit {
                if self.rows_emitted >= limit {
                    self.done = true;
                    break;
                }
            }

            buf.clear();
            match self
                .reader
                .read_event_into(&mut buf)
                .map_err(|e| Error::XmlParse(e.to_string()))?
            {
                Event::Start(ref e) if e.name() == QName(b"row") => {
                    let row_number = extract_row_number(e)?;
                    let row = self.parse_row_body(row_number)?;
                    self.rows_emitted += 1;
                    if !row.cells.is_empty() {
                        rows.push(row);
                    }
                }
                Event::Eof => {
                    self.done = true;
                    break;
                }
                _ => {}
            }
        }

        Ok(rows)
    }

    /// Returns `true` if there are potentially more rows to read.
    pub fn has_more(&self) -> bool {
        !self.done
    }

    /// Close the reader and release resources.
    pub fn close(self) {
        drop(self);
    }

    /// Parse the body of a `<row>` element (its child `<c>` elements) after
    /// the row number has been extracted from the opening tag.
    fn parse_row_body(&mut self, row_number: u32) -> Result<StreamRow> {
        let mut cells = Vec::new();
        let mut buf = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match self
                .reader
                .read_event_into(&mut buf)
                .map_err(|e| Error::XmlParse(e.to_string()))?
            {
                Event::Start(ref e) if e.name() == QName(b"c") => {
                    let (col, cell_type) = extract_cell_attrs(e)?;
                    if let Some(col) = col {
                        let cv = self.parse_cell_body(cell_type.as_deref())?;
                        cells.push((col, cv));
                    } else {
                        self.skip_to_end_of(b"c")?;
                    }
                }
                Event::Empty(ref e) if e.name() == QName(b"c") => {
                    let (col, cell_type) = extract_cell_attrs(e)?;
                    if let Some(col) = col {
                        let cv =
                            resolve_cell_value(self.sst, cell_type.as_deref(), None, None, None)?;
                        cells.push((col, cv));
                    }
                }
                Event::End(ref e) if e.name() == QName(b"row") => break,
                Event::Eof => {
                    self.done = true;
                    break;
                }
                _ => {}
            }
        }

        Ok(StreamRow { row_number, cells })
    }

    /// Parse the body of a `<c>` element (its child `<v>`, `<f>`, `<is>`
    /// elements) after the cell attributes have been extracted.
    fn parse_cell_body(&mut self, cell_type: Option<&str>) -> Result<CellValue> {
        let mut value_text: Option<String> = None;
        let mut formula_text: Option<String> = None;
        let mut inline_string: Option<String> = None;
        let mut buf = Vec::with_capacity(512);
        let mut in_is = false;

        loop {
            buf.clear();
            match self
                .reader
                .read_event_into(&mut buf)
                .map_err(|e| Error::XmlParse(e.to_string()))?
            {
                Event::Start(ref e) => {
                    let local = e.local_name();
                    if local.as_ref() == b"v" {
                        value_text = Some(self.read_text_content(b"v")?);
                    } else if local.as_ref() == b"f" {
                        formula_text = Some(self.read_text_content(b"f")?);
                    } else if local.as_ref() == b"is" {
                        in_is = true;
                        inline_string = Some(String::new());
                    } else if local.as_ref() == b"t" && in_is {
                        let t = self.read_text_content(b"t")?;
                        if let Some(ref mut is) = inline_string {
                            is.push_str(&t);
                        }
                    }
                }
                Event::End(ref e) => {
                    let local = e.local_name();
                    if local.as_ref() == b"c" {
                        break;
                    }
                    if local.as_ref() == b"is" {
                        in_is = false;
                    }
                }
                Event::Eof => {
                    self.done = true;
                    break;
                }
                _ => {}
            }
        }

        resolve_cell_value(
            self.sst,
            cell_type,
            value_text.as_deref(),
            formula_text,
            inline_string,
        )
    }

    /// Read text content between an opening tag and its matching closing tag.
    fn read_text_content(&mut self, end_tag: &[u8]) -> Result<String> {
        let mut text = String::new();
        let mut buf = Vec::with_capacity(256);
        loop {
            buf.clear();
            match self
                .reader
                .read_event_into(&mut buf)
                .map_err(|e| Error::XmlParse(e.to_string()))?
            {
                Event::Text(ref e) => {
                    let decoded = e.unescape().map_err(|e| Error::XmlParse(e.to_string()))?;
                    text.push_str(&decoded);
                }
                Event::End(ref e) if e.local_name().as_ref() == end_tag => break,
                Event::Eof => {
                    self.done = true;
                    break;
                }
                _ => {}
            }
        }
        Ok(text)
    }

    /// Skip all events until the matching end tag for the given element.
    fn skip_to_end_of(&mut self, tag: &[u8]) -> Result<()> {
        let mut buf = Vec::with_capacity(256);
        let mut depth: u32 = 1;
        loop {
            buf.clear();
            match self
                .reader
                .read_event_into(&mut buf)
                .map_err(|e| Error::XmlParse(e.to_string()))?
            {
                Event::Start(ref e) if e.local_name().as_ref() == tag => {
                    depth += 1;
                }
                Event::End(ref e) if e.local_name().as_ref() == tag => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Event::Eof => {
                    self.done = true;
                    break;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Extract the `r` (row number) attribute from a `<row>` element.
fn extract_row_number(start: &quick_xml::events::BytesStart<'_>) -> Result<u32> {
    for attr in start.attributes().flatten() {
        if attr.key == QName(b"r") {
            let val =
                std::str::from_utf8(&attr.value).map_err(|e| Error::XmlParse(e.to_string()))?;
            return val
                .parse::<u32>()
                .map_err(|e| Error::XmlParse(format!("invalid row number: {e}")));
        }
    }
    Err(Error::XmlParse(
        "row element missing r attribute".to_string(),
    ))
}

/// Extract the cell reference (column index) and type attribute from a `<c>` element.
fn extract_cell_attrs(
    start: &quick_xml::events::BytesStart<'_>,
) -> Result<(Option<u32>, Option<String>)> {
    let mut cell_ref: Option<String> = None;
    let mut cell_type: Option<String> = None;

    for attr in start.attributes().flatten() {
        match attr.key {
            QName(b"r") => {
                cell_ref = Some(
                    std::str::from_utf8(&attr.value)
                        .map_err(|e| Error::XmlParse(e.to_string()))?
                        .to_string(),
                );
            }
            QName(b"t") => {
                cell_type = Some(
                    std::str::from_utf8(&attr.value)
                        .map_err(|e| Error::XmlParse(e.to_string()))?
                        .to_string(),
                );
            }
            _ => {}
        }
    }

    let col = match &cell_ref {
        Some(r) => Some(cell_name_to_coordinates(r)?.0),
        None => None,
    };

    Ok((col, cell_type))
}

/// Resolve cell type, value text, formula, and inline string into a `CellValue`.
fn resolve_cell_value(
    sst: &SharedStringTable,
    cell_type: Option<&str>,
    value_text: Option<&str>,
    formula_text: Option<String>,
    inline_string: Option<String>,
) -> Result<CellValue> {
    if let Some(formula) = formula_text {
        let cached = match (cell_type, value_text) {
            (Some("b"), Some(v)) => Some(Box::new(CellValue::Bool(v == "1"))),
            (Some("e"), Some(v)) => Some(Box::new(CellValue::Error(v.to_string()))),
            (Some("str"), Some(v)) => Some(Box::new(CellValue::String(v.to_string()))),
            (_, Some(v)) => v
                .parse::<f64>()
                .ok()
                .map(|n| Box::new(CellValue::Number(n))),
            _ => None,
        };
        return Ok(CellValue::Formula {
            expr: formula,
            result: cached,
        });
    }

    match (cell_type, value_text) {
        (Some("s"), Some(v)) => {
            let idx: usize = v
                .parse()
                .map_err(|_| Error::Internal(format!("invalid SST index: {v}")))?;
            let s = sst
                .get(idx)
                .ok_or_else(|| Error::Internal(format!("SST index {idx} out of bounds")))?;
            Ok(CellValue::String(s.to_string()))
        }
        (Some("b"), Some(v)) => Ok(CellValue::Bool(v == "1")),
        (Some("e"), Some(v)) => Ok(CellValue::Error(v.to_string())),
        (Some("inlineStr"), _) => Ok(CellValue::String(inline_string.unwrap_or_default())),
        (Some("str"), Some(v)) => Ok(CellValue::String(v.to_string())),
        (Some("d"), Some(v)) => {
            let n: f64 = v
                .parse()
                .map_err(|_| Error::Internal(format!("invalid date value: {v}")))?;
            Ok(CellValue::Date(n))
        }
        (Some("n") | None, Some(v)) => {
            let n: f64 = v
                .parse()
                .map_err(|_| Error::Internal(format!("invalid number: {v}")))?;
            Ok(CellValue::Number(n))
        }
        _ => Ok(CellValue::Empty),
    }
}
