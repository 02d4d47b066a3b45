//! Streaming worksheet writer.
//!
//! The [`StreamWriter`] builds `WorksheetXml` structs directly instead of
//! writing raw XML text. Rows must be written in ascending order.
//!
//! # Example
//!
//! ```
//! use sheetcodec_core::stream::StreamWriter;
//! use sheetcodec_core::cell::CellValue;
//!
//! let mut sw = StreamWriter::new("Sheet1");
//! sw.set_col_width(1, 20.0).unwrap();
//! sw.write_row(1, &[CellValue::from("Name"), CellValue::from("Age")]).unwrap();
//! sw.write_row(2, &[CellValue::from("Alice"), CellValue::from(30)]).unwrap();
//! let xml_bytes = sw.finish().unwrap();
//! assert!(!xml_bytes.is_empty());
//! ```

use crate::cell::CellValue;
use crate::error::{Error, Result};
use crate::sst::SharedStringTable;
use crate::utils::cell_ref::{cell_name_to_coordinates, coordinates_to_cell_name};
use crate::utils::constants::{MAX_COLUMNS, MAX_ROWS, MAX_ROW_HEIGHT};

use sheetcodec_xml::worksheet::{
    cell_types, Cell, CellFormula, Col, Cols, MergeCell, MergeCells, Pane, Row, SheetData,
    SheetView, SheetViews, WorksheetXml,
};

/// XML declaration prepended to the worksheet XML.
const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

/// Maximum outline level allowed by Excel.
const MAX_OUTLINE_LEVEL: u8 = 7;

/// Options for a streamed row.
#[derive(Debug, Clone, Default)]
pub struct StreamRowOptions {
    /// Custom row height in points.
    pub height: Option<f64>,
    /// Row visibility (false = hidden).
    pub visible: Option<bool>,
    /// Outline level (0-7).
    pub outline_level: Option<u8>,
    /// Style ID for the row.
    pub style_id: Option<u32>,
}

/// Internal column configuration beyond width.
#[derive(Debug, Clone, Default)]
struct StreamColOptions {
    width: Option<f64>,
    style_id: Option<u32>,
    hidden: Option<bool>,
    outline_level: Option<u8>,
}

/// A streaming worksheet writer that writes rows sequentially.
///
/// Rows must be written in ascending order. The StreamWriter builds
/// `Row` structs directly, then assembles them into a `WorksheetXml`
/// on finish.
#[derive(Debug)]
pub struct StreamWriter {
    sheet_name: String,
    rows: Vec<Row>,
    last_row: u32,
    started: bool,
    finished: bool,
    col_widths: Vec<(u32, u32, f64)>,
    col_options: Vec<(u32, StreamColOptions)>,
    sst: SharedStringTable,
    merge_cells: Vec<String>,
    /// Freeze pane: (x_split, y_split, top_left_cell).
    freeze_pane: Option<(u32, u32, String)>,
}

impl StreamWriter {
    /// Create a new StreamWriter for the given sheet name.
    pub fn new(sheet_name: &str) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            rows: Vec::new(),
            last_row: 0,
            started: false,
            finished: false,
            col_widths: Vec::new(),
            col_options: Vec::new(),
            sst: SharedStringTable::new(),
            merge_cells: Vec::new(),
            freeze_pane: None,
        }
    }

    /// Get the sheet name.
    pub fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    /// Set column width for a single column (1-based).
    /// Must be called before any write_row() calls.
    pub fn set_col_width(&mut self, col: u32, width: f64) -> Result<()> {
        self.set_col_width_range(col, col, width)
    }

    /// Set column width for a range (min_col..=max_col), both 1-based.
    /// Must be called before any write_row() calls.
    pub fn set_col_width_range(&mut self, min_col: u32, max_col: u32, width: f64) -> Result<()> {
        if self.finished {
            return Err(Error::StreamAlreadyFinished);
        }
        if self.started {
            return Err(Error::StreamColumnsAfterRows);
        }
        if min_col == 0 || max_col == 0 || min_col > MAX_COLUMNS || max_col > MAX_COLUMNS {
            return Err(Error::InvalidColumnNumber(if min_col == 0 {
                min_col
            } else {
                max_col
            }));
        }
        self.col_widths.push((min_col, max_col, width));
        Ok(())
    }

    /// Set column style for a single column (1-based).
    /// Must be called before any write_row() calls.
    pub fn set_col_style(&mut self, col: u32, style_id: u32) -> Result<()> {
        self.ensure_col_configurable(col)?;
        self.get_or_create_col_options(col).style_id = Some(style_id);
        Ok(())
    }

    /// Set column visibility for a single column (1-based).
    /// Must be called before any write_row() calls.
    pub fn set_col_visible(&mut self, col: u32, visible: bool) -> Result<()> {
        self.ensure_col_configurable(col)?;
        self.get_or_create_col_options(col).hidden = Some(!visible);
        Ok(())
    }

    /// Set column outline level for a single column (1-based).
    /// Must be called before any write_row() calls. Level must be 0-7.
    pub fn set_col_outline_level(&mut self, col: u32, level: u8) -> Result<()> {
        self.ensure_col_configurable(col)?;
        if level > MAX_OUTLINE_LEVEL {
            return Err(Error::OutlineLevelExceeded {
                level,
                max: MAX_OUTLINE_LEVEL,
            });
        }
        self.get_or_create_col_options(col).outline_level = Some(level);
        Ok(())
    }

    /// Set freeze panes for the streamed sheet.
    /// Must be called before any write_row() calls.
    /// `top_left_cell` is the cell below and to the right of the frozen area,
    /// e.g., "A2" freezes row 1, "B1" freezes column A, "C3" freezes rows 1-2
    /// and columns A-B.
    pub fn set_freeze_panes(&mut self, top_left_cell: &str) -> Result<()> {
        if self.finished {
            return Err(Error::StreamAlreadyFinished);
        }
        if self.started {
            return Err(Error::StreamColumnsAfterRows);
        }
        let (col, row) = cell_name_to_coordinates(top_left_cell)?;
        if col == 1 && row == 1 {
            return Err(Error::InvalidCellReference(
                "freeze pane at A1 has no effect".to_string(),
            ));
        }
        self.freeze_pane = Some((col - 1, row - 1, top_left_cell.to_string()));
        Ok(())
    }

    /// Write a row of values with row-level options.
    pub fn write_row_with_options(
        &mut self,
        row: u32,
        values: &[CellValue],
        options: &StreamRowOptions,
    ) -> Result<()> {
        self.write_row_impl(row, values, None, Some(options))
    }

    /// Write a row of values. Rows must be written in ascending order.
    /// Row numbers are 1-based.
    pub fn write_row(&mut self, row: u32, values: &[CellValue]) -> Result<()> {
        self.write_row_impl(row, values, None, None)
    }

    /// Write a row with a specific style ID applied to all cells.
    pub fn write_row_with_style(
        &mut self,
        row: u32,
        values: &[CellValue],
        style_id: u32,
    ) -> Result<()> {
        self.write_row_impl(row, values, Some(style_id), None)
    }

    /// Add a merge cell reference (e.g., "A1:B2").
    /// Must be called before finish(). The reference must be a valid range
    /// in the form "A1:B2".
    pub fn add_merge_cell(&mut self, reference: &str) -> Result<()> {
        if self.finished {
            return Err(Error::StreamAlreadyFinished);
        }
        // Validate the range format.
        let parts: Vec<&str> = reference.split(':').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidMergeCellReference(reference.to_string()));
        }
        cell_name_to_coordinates(parts[0])
            .map_err(|_| Error::InvalidMergeCellReference(reference.to_string()))?;
        cell_name_to_coordinates(parts[1])
            .map_err(|_| Error::InvalidMergeCellReference(reference.to_string()))?;
        self.merge_cells.push(reference.to_string());
        Ok(())
    }

    /// Finish writing and return the complete worksheet XML bytes.
    pub fn finish(&mut self) -> Result<Vec<u8>> {
        if self.finished {
            return Err(Error::StreamAlreadyFinished);
        }
        self.finished = true;
        let ws = self.build_worksheet_xml();
        let body = quick_xml::se::to_string(&ws).map_err(|e| Error::Internal(e.to_string()))?;
        let mut xml = String::with_capacity(body.len() + 60);
        xml.push_str(XML_DECLARATION);
        xml.push('\n');
        xml.push_str(&body);
        Ok(xml.into_bytes())
    }

    /// Get a reference to the shared string table.
    pub fn sst(&self) -> &SharedStringTable {
        &self.sst
    }

    /// Consume the writer and return (xml_bytes, shared_string_table).
    pub fn into_parts(mut self) -> Result<(Vec<u8>, SharedStringTable)> {
        let xml = self.finish()?;
        Ok((xml, self.sst))
    }

    /// Consume the writer and return the worksheet XML struct and shared string table.
    /// This is the optimized path that avoids XML serialization/deserialization.
    pub fn into_worksheet_parts(mut self) -> Result<(WorksheetXml, SharedStringTable)> {
        if self.finished {
            return Err(Error::StreamAlreadyFinished);
        }
        self.finished = true;
        let ws = self.build_worksheet_xml_owned();
        Ok((ws, self.sst))
    }

    /// Validate that column configuration is allowed (not finished, not started,
    /// valid column number).
    fn ensure_col_configurable(&self, col: u32) -> Result<()> {
        if self.finished {
            return Err(Error::StreamAlreadyFinished);
        }
        if self.started {
            return Err(Error::StreamColumnsAfterRows);
        }
        if col == 0 || col > MAX_COLUMNS {
            return Err(Error::InvalidColumnNumber(col));
        }
        Ok(())
    }

    /// Get or create a StreamColOptions entry for the given column.
    fn get_or_create_col_options(&mut self, col: u32) -> &mut StreamColOptions {
        if let Some(pos) = self.col_options.iter().position(|(c, _)| *c == col) {
            &mut self.col_options[pos].1
        } else {
            self.col_options.push((col, StreamColOptions::default()));
            let last = self.col_options.len() - 1;
            &mut self.col_options[last].1
        }
    }

    /// Build a `WorksheetXml` by cloning the accumulated rows.
    fn build_worksheet_xml(&self) -> WorksheetXml {
        self.build_worksheet_xml_inner(self.rows.clone())
    }

    /// Build a `WorksheetXml` by taking ownership of the accumulated rows.
    fn build_worksheet_xml_owned(&mut self) -> WorksheetXml {
        let rows = std::mem::take(&mut self.rows);
        self.build_worksheet_xml_inner(rows)
    }

    /// Assemble the final `WorksheetXml` from the given rows and accumulated config.
    fn build_worksheet_xml_inner(&self, rows: Vec<Row>) -> WorksheetXml {
        let sheet_views = self
            .freeze_pane
            .as_ref()
            .map(|(x_split, y_split, top_left_cell)| {
                let active_pane = match (*x_split > 0, *y_split > 0) {
                    (true, true) => "bottomRight",
                    (true, false) => "topRight",
                    (false, true) => "bottomLeft",
                    (false, false) => unreachable!(),
                };
                SheetViews {
                    sheet_views: vec![SheetView {
                        tab_selected: Some(true),
                        zoom_scale: None,
                        workbook_view_id: 0,
                        pane: Some(Pane {
                            x_split: if *x_split > 0 { Some(*x_split) } else { None },
                            y_split: if *y_split > 0 { Some(*y_split) } else { None },
                            top_left_cell: Some(top_left_cell.clone()),
                            active_pane: Some(active_pane.to_string()),
                            state: Some("frozen".to_string()),
                        }),
                        selection: vec![],
                    }],
                }
            });

        let cols = {
            let has_widths = !self.col_widths.is_empty();
            let has_options = !self.col_options.is_empty();
            if has_widths || has_options {
                let mut col_defs = Vec::new();
                for &(min, max, width) in &self.col_widths {
                    col_defs.push(Col {
                        min,
                        max,
                        width: Some(width),
                        style: None,
                        hidden: None,
                        custom_width: Some(true),
                        outline_level: None,
                    });
                }
                for &(col_num, ref opts) in &self.col_options {
                    col_defs.push(Col {
                        min: col_num,
                        max: col_num,
                        width: opts.width,
                        style: opts.style_id,
                        hidden: opts.hidden,
                        custom_width: if opts.width.is_some() {
                            Some(true)
                        } else {
                            None
                        },
                        outline_level: opts.outline_level.filter(|&l| l > 0),
                    });
                }
                Some(Cols { cols: col_defs })
            } else {
                None
            }
        };

        let merge_cells = if self.merge_cells.is_empty() {
            None
        } else {
            Some(MergeCells {
                count: Some(self.merge_cells.len() as u32),
                merge_cells: self
                    .merge_cells
                    .iter()
                    .map(|r| MergeCell {
                        reference: r.clone(),
                    })
                    .collect(),
            })
        };

        WorksheetXml {
            sheet_views,
            cols,
            sheet_data: SheetData { rows },
            merge_cells,
            ..WorksheetXml::default()
        }
    }

    /// Internal unified implementation for writing a row.
    fn write_row_impl(
        &mut self,
        row: u32,
        values: &[CellValue],
        cell_style_id: Option<u32>,
        options: Option<&StreamRowOptions>,
    ) -> Result<()> {
        if self.finished {
            return Err(Error::StreamAlreadyFinished);
        }

        // Validate row number.
        if row == 0 || row > MAX_ROWS {
            return Err(Error::InvalidRowNumber(row));
        }

        // Enforce ascending row order.
        if row <= self.last_row {
            return Err(Error::StreamRowAlreadyWritten { row });
        }

        // Validate column count.
        if values.len() > MAX_COLUMNS as usize {
            return Err(Error::InvalidColumnNumber(values.len() as u32));
        }

        // Validate row options if provided.
        if let Some(opts) = options {
            if let Some(height) = opts.height {
                if height > MAX_ROW_HEIGHT {
                    return Err(Error::RowHeightExceeded {
                        height,
                        max: MAX_ROW_HEIGHT,
                    });
                }
            }
            if let Some(level) = opts.outline_level {
                if level > MAX_OUTLINE_LEVEL {
                    return Err(Error::OutlineLevelExceeded {
                        level,
                        max: MAX_OUTLINE_LEVEL,
                    });
                }
            }
        }

        self.started = true;
        self.last_row = row;

        let mut cells = Vec::new();

        for (i, value) in values.iter().enumerate() {
            let col = (i as u32) + 1;
            let r = coordinates_to_cell_name(col, row)?;

            match value {
                CellValue::Empty => continue,
                CellValue::String(s) => {
                    let idx = self.sst.add(s);
                    cells.push(Cell {
                        r,
                        s: cell_style_id,
                        t: Some(cell_types::SHARED_STRING.to_string()),
                        v: Some(idx.to_string()),
                        f: None,
                        is: None,
                    });
                }
                CellValue::Number(n) => {
                    cells.push(Cell {
                        r,
                        s: cell_style_id,
                        t: None,
                        v: Some(n.to_string()),
                        f: None,
                        is: None,
                    });
                }
                CellValue::Date(serial) => {
                    cells.push(Cell {
                        r,
                        s: cell_style_id,
                        t: None,
                        v: Some(serial.to_string()),
                        f: None,
                        is: None,
                    });
                }
                CellValue::Bool(b) => {
                    let val = if *b { "1" } else { "0" };
                    cells.push(Cell {
                        r,
                        s: cell_style_id,
                        t: Some(cell_types::BOOLEAN.to_string()),
                        v: Some(val.to_string()),
                        f: None,
                        is: None,
                    });
                }
                CellValue::Formula { expr, .. } => {
                    cells.push(Cell {
                        r,
                        s: cell_style_id,
                        t: None,
                        v: None,
                        f: Some(CellFormula {
                            t: None,
                            reference: None,
                            si: None,
                            value: Some(expr.clone()),
                        }),
                        is: None,
                    });
                }
                CellValue::Error(e) => {
                    cells.push(Cell {
                        r,
                        s: cell_style_id,
                        t: Some(cell_types::ERROR.to_string()),
                        v: Some(e.clone()),
                        f: None,
                        is: None,
                    });
                }
                CellValue::RichString(runs) => {
                    let plain = crate::rich_text::rich_text_to_plain(runs);
                    let idx = self.sst.add(&plain);
                    cells.push(Cell {
                        r,
                        s: cell_style_id,
                        t: Some(cell_types::SHARED_STRING.to_string()),
                        v: Some(idx.to_string()),
                        f: None,
                        is: None,
                    });
                }
            }
        }

        let mut xml_row = Row {
            r: row,
            spans: None,
            s: None,
            custom_format: None,
            ht: None,
            hidden: None,
            custom_height: None,
            outline_level: None,
            cells,
        };

        if let Some(opts) = options {
            if let Some(height) = opts.height {
                xml_row.ht = Some(height);
                xml_row.custom_height = Some(true);
            }
            if let Some(false) = opts.visible {
                xml_row.hidden = Some(true);
            }
            if let Some(level) = opts.outline_level {
                if level > 0 {
                    xml_row.outline_level = Some(level);
                }
            }
            if let Some(sid) = opts.style_id {
                xml_row.s = Some(sid);
                xml_row.custom_format = Some(true);
            }
        }

        self.rows.push(xml_row);
        Ok(())
    }
}
