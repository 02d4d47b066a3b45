//! Column operations for worksheet manipulation.
//!
//! All functions operate directly on a [`WorksheetXml`] structure, keeping the
//! business logic decoupled from the [`Workbook`](crate::workbook::Workbook)
//! wrapper.

use sheetcodec_xml::worksheet::{Col, Cols, WorksheetXml};

use crate::error::{Error, Result};
use crate::utils::cell_ref::{
    cell_name_to_coordinates, column_name_to_number, coordinates_to_cell_name,
};
use crate::utils::constants::{MAX_COLUMNS, MAX_COLUMN_WIDTH};

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Set the width of a column. Creates the `Cols` container and/or a `Col`
/// entry if they do not yet exist.
///
/// Valid range: `0.0 ..= 255.0`.
pub fn set_col_width(ws: &mut WorksheetXml, col: &str, width: f64) -> Result<()> {
    let col_num = column_name_to_number(col)?;
    if !(0.0..=MAX_COLUMN_WIDTH).contains(&width) {
        return Err(Error::ColumnWidthExceeded {
            width,
            max: MAX_COLUMN_WIDTH,
        });
    }

    let col_entry = find_or_create_col(ws, col_num);
    col_entry.width = Some(width);
    col_entry.custom_width = Some(true);
    Ok(())
}

/// Get the width of a column. Returns `None` when there is no explicit width
/// defined for the column.
pub fn get_col_width(ws: &WorksheetXml, col: &str) -> Option<f64> {
    let col_num = column_name_to_number(col).ok()?;
    ws.cols
        .as_ref()
        .and_then(|cols| {
            cols.cols
                .iter()
                .find(|c| col_num >= c.min && col_num <= c.max)
        })
        .and_then(|c| c.width)
}

/// Set the visibility of a column.
pub fn set_col_visible(ws: &mut WorksheetXml, col: &str, visible: bool) -> Result<()> {
    let col_num = column_name_to_number(col)?;
    let col_entry = find_or_create_col(ws, col_num);
    col_entry.hidden = if visible { None } else { Some(true) };
    Ok(())
}

/// Get the visibility of a column. Returns `true` (visible) if there is no
/// explicit hidden flag.
pub fn get_col_visible(ws: &WorksheetXml, col: &str) -> Result<bool> {
    let col_num = column_name_to_number(col)?;
    Ok(find_col(ws, col_num)
        .map(|c| !c.hidden.unwrap_or(false))
        .unwrap_or(true))
}

/// Set the outline (grouping) level of a column.
///
/// Valid range: `0..=7` (Excel supports up to 7 outline levels).
pub fn set_col_outline_level(ws: &mut WorksheetXml, col: &str, level: u8) -> Result<()> {
    let col_num = column_name_to_number(col)?;
    if level > 7 {
        return Err(Error::Internal(format!(
            "outline level {level} exceeds maximum 7"
        )));
    }
    let col_entry = find_or_create_col(ws, col_num);
    col_entry.outline_level = if level == 0 { None } else { Some(level) };
    Ok(())
}

/// Get the outline (grouping) level of a column. Returns `0` if not set.
pub fn get_col_outline_level(ws: &WorksheetXml, col: &str) -> Result<u8> {
    let col_num = column_name_to_number(col)?;
    Ok(find_col(ws, col_num)
        .and_then(|c| c.outline_level)
        .unwrap_or(0))
}

/// Set the style applied to an entire column. The caller is responsible for
/// validating `style_id` against the stylesheet.
pub fn set_col_style(ws: &mut WorksheetXml, col: &str, style_id: u32) -> Result<()> {
    let col_num = column_name_to_number(col)?;
    let col_entry = find_or_create_col(ws, col_num);
    col_entry.style = Some(style_id);
    Ok(())
}

/// Get the style ID applied to a column. Returns `0` (default) if not set.
pub fn get_col_style(ws: &WorksheetXml, col: &str) -> Result<u32> {
    let col_num = column_name_to_number(col)?;
    Ok(find_col(ws, col_num).and_then(|c| c.style).unwrap_or(0))
}

/// Insert `count` columns starting at `col`, shifting existing columns at
/// and to the right of `col` further right.
///
/// Cell references are updated: e.g. when inserting 2 columns at "B", a cell
/// "C3" becomes "E3".
pub fn insert_cols(ws: &mut WorksheetXml, col: &str, count: u32) -> Result<()> {
    let start_col = column_name_to_number(col)?;
    if count == 0 {
        return Ok(());
    }

    // Validate we won't exceed max columns.
    let max_existing = ws
        .sheet_data
        .rows
        .iter()
        .flat_map(|r| r.cells.iter())
        .filter_map(|c| cell_name_to_coordinates(&c.r).ok())
        .map(|(col_n, _)| col_n)
        .max()
        .unwrap_or(0);
    let furthest = max_existing.max(start_col);
    if furthest
        .checked_add(count)
        .is_none_or(|v| v > MAX_COLUMNS)
    {
        return Err(Error::InvalidColumnNumber(furthest + count));
    }

    // Shift cell references.
    for row in ws.sheet_data.rows.iter_mut() {
        for cell in row.cells.iter_mut() {
            let (c, r) = cell_name_to_coordinates(&cell.r)?;
            if c >= start_col {
                cell.r = coordinates_to_cell_name(c + count, r)?;
            }
        }
    }

    // Shift Col definitions.
    if let Some(ref mut cols) = ws.cols {
        for c in cols.cols.iter_mut() {
            if c.min >= start_col {
                c.min += count;
            }
            if c.max >= start_col {
                c.max += count;
            }
        }
    }

    Ok(())
}

/// Remove a single column, shifting columns to its right leftward by one.
pub fn remove_col(ws: &mut WorksheetXml, col: &str) -> Result<()> {
    let col_num = column_name_to_number(col)?;

    // Remove cells in the target column and shift cells to the right.
    for row in ws.sheet_data.rows.iter_mut() {
        // Remove cells at the target column.
        row.cells.retain(|cell| {
            cell_name_to_coordinates(&cell.r)
                .map(|(c, _)| c != col_num)
                .unwrap_or(true)
        });

        // Shift cells that are to the right of the removed column.
        for cell in row.cells.iter_mut() {
            let (c, r) = cell_name_to_coordinates(&cell.r).unwrap();
            if c > col_num {
                cell.r = coordinates_to_cell_name(c - 1, r).unwrap();
            }
        }
    }

    // Shift Col definitions.
    if let Some(ref mut cols) = ws.cols {
        // Remove col entries that exactly span the removed column only.
        cols.cols
            .retain(|c| !(c.min == col_num && c.max == col_num));

        for c in cols.cols.iter_mut() {
            if c.min > col_num {
                c.min -= 1;
            }
            if c.max >= col_num {
                // Only shrink max if it's above the removed column.
                if c.max > col_num {
                    c.max -= 1;
                }
            }
        }

        // Remove the Cols wrapper if it's now empty.
        if cols.cols.is_empty() {
            ws.cols = None;
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Find an existing Col entry covering `col_num`, if any.
fn find_col(ws: &WorksheetXml, col_num: u32) -> Option<&Col> {
    ws.cols.as_ref().and_then(|cols| {
        cols.cols
            .iter()
            .find(|c| col_num >= c.min && col_num <= c.max)
    })
}

/// Find an existing Col entry that covers exactly `col_num`, or create a
/// new single-column entry for it.
fn find_or_create_col(ws: &mut WorksheetXml, col_num: u32) -> &mut Col {
    // Ensure the Cols container exists.
    if ws.cols.is_none() {
        ws.cols = Some(Cols { cols: vec![] });
    }
    let cols = ws.cols.as_mut().unwrap();

    // Look for an existing entry that spans exactly this column.
    let existing = cols
        .cols
        .iter()
        .position(|c| c.min == col_num && c.max == col_num);

    if let Some(idx) = existing {
        return &mut cols.cols[idx];
    }

    // Create a new single-column entry.
    cols.cols.push(Col {
        min: col_num,
        max: col_num,
        width: None,
        style: None,
        hidden: None,
        custom_width: None,
        outline_level: None,
    });
    let last = cols.cols.len() - 1;
    &mut cols.cols[last]
}

// ===========================================================================
// Tests
// ===========================================================================
