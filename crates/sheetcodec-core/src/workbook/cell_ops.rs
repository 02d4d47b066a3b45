use super::*;

impl Workbook {
    /// Get the value of a cell.
    ///
    /// Returns [`CellValue::Empty`] for cells that have no value or do not
    /// exist in the sheet data.
    pub fn get_cell_value(&self, sheet: &str, cell: &str) -> Result<CellValue> {
        let ws = self
            .worksheets
            .iter()
            .find(|(name, _)| name == sheet)
            .map(|(_, ws)| ws)
            .ok_or_else(|| Error::SheetNotFound {
                name: sheet.to_string(),
            })?;

        let (col, row) = cell_name_to_coordinates(cell)?;
        let cell_ref = crate::utils::cell_ref::coordinates_to_cell_name(col, row)?;

        // Find the row.
        let xml_row = ws.sheet_data.rows.iter().find(|r| r.r == row);
        let xml_row = match xml_row {
            Some(r) => r,
            None => return Ok(CellValue::Empty),
        };

        // Find the cell.
        let xml_cell = xml_row.cells.iter().find(|c| c.r == cell_ref);
        let xml_cell = match xml_cell {
            Some(c) => c,
            None => return Ok(CellValue::Empty),
        };

        self.xml_cell_to_value(xml_cell)
    }

    /// Return `(col, row)` pairs for every occupied cell on the named sheet,
    /// in row-major document order.
    pub fn get_occupied_cells(&self, sheet: &str) -> Result<Vec<(u32, u32)>> {
        let ws = self.worksheet_ref(sheet)?;
        let mut cells = Vec::new();
        for row in &ws.sheet_data.rows {
            for cell in &row.cells {
                if let Ok((c, r)) = cell_name_to_coordinates(cell.r.as_str()) {
                    cells.push((c, r));
                }
            }
        }
        Ok(cells)
    }

    /// Set the value of a cell.
    ///
    /// The value can be any type that implements `Into<CellValue>`, including
    /// `&str`, `String`, `f64`, `i32`, `i64`, and `bool`.
    ///
    /// Setting a cell to [`CellValue::Empty`] removes the cell from the row.
    pub fn set_cell_value(
        &mut self,
        sheet: &str,
        cell: &str,
        value: impl Into<CellValue>,
    ) -> Result<()> {
        let value = value.into();

        // Validate string length.
        if let CellValue::String(ref s) = value {
            if s.len() > MAX_CELL_CHARS {
                return Err(Error::CellValueTooLong {
                    length: s.len(),
                    max: MAX_CELL_CHARS,
                });
            }
        }

        let ws = self
            .worksheets
            .iter_mut()
            .find(|(name, _)| name == sheet)
            .map(|(_, ws)| ws)
            .ok_or_else(|| Error::SheetNotFound {
                name: sheet.to_string(),
            })?;

        let (col, row_num) = cell_name_to_coordinates(cell)?;
        let cell_ref = crate::utils::cell_ref::coordinates_to_cell_name(col, row_num)?;

        // Find or create the row (keep rows sorted by row number).
        let row_idx = match ws.sheet_data.rows.iter().position(|r| r.r >= row_num) {
            Some(idx) if ws.sheet_data.rows[idx].r == row_num => idx,
            Some(idx) => {
                ws.sheet_data.rows.insert(idx, new_row(row_num));
                idx
            }
            None => {
                ws.sheet_data.rows.push(new_row(row_num));
                ws.sheet_data.rows.len() - 1
            }
        };

        let row = &mut ws.sheet_data.rows[row_idx];

        // Handle Empty: remove the cell if present.
        if value == CellValue::Empty {
            row.cells.retain(|c| c.r != cell_ref);
            return Ok(());
        }

        // Find or create the cell.
        let cell_idx = match row.cells.iter().position(|c| c.r == cell_ref) {
            Some(idx) => idx,
            None => {
                // Insert in column order.
                let insert_pos = row
                    .cells
                    .iter()
                    .position(|c| {
                        cell_name_to_coordinates(&c.r)
                            .map(|(c_col, _)| c_col > col)
                            .unwrap_or(false)
                    })
                    .unwrap_or(row.cells.len());
                row.cells.insert(
                    insert_pos,
                    Cell {
                        r: cell_ref,
                        s: None,
                        t: None,
                        v: None,
                        f: None,
                        is: None,
                    },
                );
                insert_pos
            }
        };

        let xml_cell = &mut row.cells[cell_idx];
        value_to_xml_cell(&mut self.sst_runtime, xml_cell, value);

        Ok(())
    }

    /// Convert an XML Cell to a CellValue.
    pub(crate) fn xml_cell_to_value(&self, xml_cell: &Cell) -> Result<CellValue> {
        // Check for formula first.
        if let Some(ref formula) = xml_cell.f {
            let expr = formula.value.clone().unwrap_or_default();
            let result = match (&xml_cell.t, &xml_cell.v) {
                (Some(t), Some(v)) if t == "b" => Some(Box::new(CellValue::Bool(v == "1"))),
                (Some(t), Some(v)) if t == "e" => Some(Box::new(CellValue::Error(v.clone()))),
                (_, Some(v)) => v
                    .parse::<f64>()
                    .ok()
                    .map(|n| Box::new(CellValue::Number(n))),
                _ => None,
            };
            return Ok(CellValue::Formula { expr, result });
        }

        let cell_type = xml_cell.t.as_deref();
        let cell_value = xml_cell.v.as_deref();

        match (cell_type, cell_value) {
            // Shared string
            (Some("s"), Some(v)) => {
                let idx: usize = v
                    .parse()
                    .map_err(|_| Error::Internal(format!("invalid SST index: {v}")))?;
                let s = self.sst_runtime.get(idx).unwrap_or("").to_string();
                Ok(CellValue::String(s))
            }
            // Boolean
            (Some("b"), Some(v)) => Ok(CellValue::Bool(v == "1")),
            // Error
            (Some("e"), Some(v)) => Ok(CellValue::Error(v.to_string())),
            // Inline string
            (Some("inlineStr"), _) => {
                let s = xml_cell
                    .is
                    .as_ref()
                    .and_then(|is| is.t.clone())
                    .unwrap_or_default();
                Ok(CellValue::String(s))
            }
            // Formula string (cached string result)
            (Some("str"), Some(v)) => Ok(CellValue::String(v.to_string())),
            // Number (explicit or default type) -- may be a date if styled.
            (None | Some("n"), Some(v)) => {
                let n: f64 = v
                    .parse()
                    .map_err(|_| Error::Internal(format!("invalid number: {v}")))?;
                // Check whether this cell has a date number format.
                if self.is_date_styled_cell(xml_cell) {
                    return Ok(CellValue::Date(n));
                }
                Ok(CellValue::Number(n))
            }
            // No value
            _ => Ok(CellValue::Empty),
        }
    }

    /// Check whether a cell's style indicates a date/time number format.
    pub(crate) fn is_date_styled_cell(&self, xml_cell: &Cell) -> bool {
        let style_idx = match xml_cell.s {
            Some(idx) => idx as usize,
            None => return false,
        };
        let xf = match self.stylesheet.cell_xfs.xfs.get(style_idx) {
            Some(xf) => xf,
            None => return false,
        };
        let num_fmt_id = xf.num_fmt_id.unwrap_or(0);
        // Check built-in date format IDs.
        if crate::cell::is_date_num_fmt(num_fmt_id) {
            return true;
        }
        // Check custom number formats for date patterns.
        if num_fmt_id >= 164 {
            if let Some(ref num_fmts) = self.stylesheet.num_fmts {
                if let Some(nf) = num_fmts
                    .num_fmts
                    .iter()
                    .find(|nf| nf.num_fmt_id == num_fmt_id)
                {
                    return crate::cell::is_date_format_code(&nf.format_code);
                }
            }
        }
        false
    }

    /// Register a new style and return its ID.
    ///
    /// The style is deduplicated: if an identical style already exists in
    /// the stylesheet, the existing ID is returned.
    pub fn add_style(&mut self, style: &crate::style::Style) -> Result<u32> {
        crate::style::add_style(&mut self.stylesheet, style)
    }

    /// Get the style ID applied to a cell.
    ///
    /// Returns `None` if the cell does not exist or has no explicit style
    /// (i.e. uses the default style 0).
    pub fn get_cell_style(&self, sheet: &str, cell: &str) -> Result<Option<u32>> {
        let ws = self.worksheet_ref(sheet)?;

        let (col, row) = cell_name_to_coordinates(cell)?;
        let cell_ref = crate::utils::cell_ref::coordinates_to_cell_name(col, row)?;

        // Find the row.
        let xml_row = match ws.sheet_data.rows.iter().find(|r| r.r == row) {
            Some(r) => r,
            None => return Ok(None),
        };

        // Find the cell.
        let xml_cell = match xml_row.cells.iter().find(|c| c.r == cell_ref) {
            Some(c) => c,
            None => return Ok(None),
        };

        Ok(xml_cell.s)
    }

    /// Set the style ID for a cell.
    ///
    /// If the cell does not exist, an empty cell with just the style is created.
    /// The `style_id` must be a valid index in cellXfs.
    pub fn set_cell_style(&mut self, sheet: &str, cell: &str, style_id: u32) -> Result<()> {
        // Validate the style_id.
        if style_id as usize >= self.stylesheet.cell_xfs.xfs.len() {
            return Err(Error::StyleNotFound { id: style_id });
        }

        let ws = self
            .worksheets
            .iter_mut()
            .find(|(name, _)| name == sheet)
            .map(|(_, ws)| ws)
            .ok_or_else(|| Error::SheetNotFound {
                name: sheet.to_string(),
            })?;

        let (col, row_num) = cell_name_to_coordinates(cell)?;
        let cell_ref = crate::utils::cell_ref::coordinates_to_cell_name(col, row_num)?;

        // Find or create the row (keep rows sorted by row number).
        let row_idx = match ws.sheet_data.rows.iter().position(|r| r.r >= row_num) {
            Some(idx) if ws.sheet_data.rows[idx].r == row_num => idx,
            Some(idx) => {
                ws.sheet_data.rows.insert(idx, new_row(row_num));
                idx
            }
            None => {
                ws.sheet_data.rows.push(new_row(row_num));
                ws.sheet_data.rows.len() - 1
            }
        };

        let row = &mut ws.sheet_data.rows[row_idx];

        // Find or create the cell.
        let cell_idx = match row.cells.iter().position(|c| c.r == cell_ref) {
            Some(idx) => idx,
            None => {
                // Insert in column order.
                let insert_pos = row
                    .cells
                    .iter()
                    .position(|c| {
                        cell_name_to_coordinates(&c.r)
                            .map(|(c_col, _)| c_col > col)
                            .unwrap_or(false)
                    })
                    .unwrap_or(row.cells.len());
                row.cells.insert(
                    insert_pos,
                    Cell {
                        r: cell_ref,
                        s: None,
                        t: None,
                        v: None,
                        f: None,
                        is: None,
                    },
                );
                insert_pos
            }
        };

        row.cells[cell_idx].s = Some(style_id);
        Ok(())
    }

    /// Merge a range of cells on the given sheet.
    ///
    /// `top_left` and `bottom_right` are cell references like "A1" and "C3".
    /// Returns an error if the range overlaps with an existing merge region.
    pub fn merge_cells(&mut self, sheet: &str, top_left: &str, bottom_right: &str) -> Result<()> {
        let ws = self.worksheet_mut(sheet)?;
        crate::merge::merge_cells(ws, top_left, bottom_right)
    }

    /// Remove a merged cell range from the given sheet.
    ///
    /// `reference` is the exact range string like "A1:C3".
    pub fn unmerge_cell(&mut self, sheet: &str, reference: &str) -> Result<()> {
        let ws = self.worksheet_mut(sheet)?;
        crate::merge::unmerge_cell(ws, reference)
    }

    /// Get all merged cell ranges on the given sheet.
    ///
    /// Returns a list of range strings like `["A1:B2", "D1:F3"]`.
    pub fn get_merge_cells(&self, sheet: &str) -> Result<Vec<String>> {
        let ws = self.worksheet_ref(sheet)?;
        Ok(crate::merge::get_merge_cells(ws))
    }

    /// Set a formula on a cell.
    ///
    /// This is a convenience wrapper around [`set_cell_value`] with
    /// [`CellValue::Formula`].
    pub fn set_cell_formula(&mut self, sheet: &str, cell: &str, formula: &str) -> Result<()> {
        self.set_cell_value(
            sheet,
            cell,
            CellValue::Formula {
                expr: formula.to_string(),
                result: None,
            },
        )
    }

    /// Fill a range of cells with a formula, adjusting row references for each
    /// row relative to the first cell in the range.
    ///
    /// `range` is an A1-style range like `"D2:D10"`. The `formula` is the base
    /// formula for the first cell of the range. For each subsequent row, the
    /// row references in the formula are shifted by the row offset. Absolute
    /// row references (`$1`) are left unchanged.
    pub fn fill_formula(&mut self, sheet: &str, range: &str, formula: &str) -> Result<()> {
        let parts: Vec<&str> = range.split(':').collect();
        if parts.len() != 2 {
            return Err(Error::InvalidCellReference(format!(
                "invalid range: {range}"
            )));
        }
        let (start_col, start_row) = cell_name_to_coordinates(parts[0])?;
        let (end_col, end_row) = cell_name_to_coordinates(parts[1])?;

        if start_col != end_col {
            return Err(Error::InvalidCellReference(
                "fill_formula only supports single-column ranges".to_string(),
            ));
        }

        for row in start_row..=end_row {
            let row_offset = row as i32 - start_row as i32;
            let adjusted = if row_offset == 0 {
                formula.to_string()
            } else {
                crate::cell_ref_shift::shift_cell_references_with_abs(
                    formula,
                    |col, r, _abs_col, abs_row| {
                        if abs_row {
                            (col, r)
                        } else {
                            (col, (r as i32 + row_offset) as u32)
                        }
                    },
                )?
            };
            let cell_ref =
                crate::utils::cell_ref::coordinates_to_cell_name(start_col, row)?;
            self.set_cell_formula(sheet, &cell_ref, &adjusted)?;
        }
        Ok(())
    }

    /// Set a cell to a rich text value (multiple formatted runs).
    pub fn set_cell_rich_text(
        &mut self,
        sheet: &str,
        cell: &str,
        runs: Vec<crate::rich_text::RichTextRun>,
    ) -> Result<()> {
        self.set_cell_value(sheet, cell, CellValue::RichString(runs))
    }

    /// Get rich text runs for a cell, if it contains rich text.
    ///
    /// Returns `None` if the cell is empty, contains a plain string, or holds
    /// a non-string value.
    pub fn get_cell_rich_text(
        &self,
        sheet: &str,
        cell: &str,
    ) -> Result<Option<Vec<crate::rich_text::RichTextRun>>> {
        let (col, row) = cell_name_to_coordinates(cell)?;
        let sheet_idx = self
            .worksheets
            .iter()
            .position(|(name, _)| name == sheet)
            .ok_or_else(|| Error::SheetNotFound {
                name: sheet.to_string(),
            })?;
        let ws = &self.worksheets[sheet_idx].1;

        for xml_row in &ws.sheet_data.rows {
            if xml_row.r == row {
                for xml_cell in &xml_row.cells {
                    let (cc, cr) = cell_name_to_coordinates(&xml_cell.r)?;
                    if cc == col && cr == row {
                        if xml_cell.t.as_deref() == Some("s") {
                            if let Some(ref v) = xml_cell.v {
                                if let Ok(idx) = v.parse::<usize>() {
                                    return Ok(self.sst_runtime.get_rich_text(idx));
                                }
                            }
                        }
                        return Ok(None);
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Write a CellValue into an XML Cell (mutating it in place).
pub(crate) fn value_to_xml_cell(
    sst: &mut SharedStringTable,
    xml_cell: &mut Cell,
    value: CellValue,
) {
    // Clear previous values.
    xml_cell.t = None;
    xml_cell.v = None;
    xml_cell.f = None;
    xml_cell.is = None;

    match value {
        CellValue::String(s) => {
            let idx = sst.add(&s);
            xml_cell.t = Some("s".to_string());
            xml_cell.v = Some(idx.to_string());
        }
        CellValue::Number(n) => {
            xml_cell.v = Some(n.to_string());
        }
        CellValue::Date(serial) => {
            // Dates are stored as numbers in Excel. The style must apply a
            // date number format for correct display.
            xml_cell.v = Some(serial.to_string());
        }
        CellValue::Bool(b) => {
            xml_cell.t = Some("b".to_string());
            xml_cell.v = Some(if b { "1" } else { "0" }.to_string());
        }
        CellValue::Formula { expr, .. } => {
            xml_cell.f = Some(CellFormula {
                t: None,
                reference: None,
                si: None,
                value: Some(expr),
            });
        }
        CellValue::Error(e) => {
            xml_cell.t = Some("e".to_string());
            xml_cell.v = Some(e);
        }
        CellValue::Empty => {
            // Already cleared above; the caller should have removed the cell.
        }
        CellValue::RichString(runs) => {
            let idx = sst.add_rich_text(&runs);
            xml_cell.t = Some("s".to_string());
            xml_cell.v = Some(idx.to_string());
        }
    }
}

/// Create a new empty row with the given 1-based row number.
pub(crate) fn new_row(row_num: u32) -> Row {
    Row {
        r: row_num,
        spans: None,
        s: None,
        custom_format: None,
        ht: None,
        hidden: None,
        custom_height: None,
        outline_level: None,
        cells: vec![],
    }
}
