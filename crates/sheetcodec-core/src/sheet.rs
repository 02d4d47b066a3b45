//! Sheet management utilities.
//!
//! Contains validation helpers and internal functions used by [`crate::workbook::Workbook`]
//! for creating, deleting, renaming, and copying worksheets.

use sheetcodec_xml::content_types::{mime_types, ContentTypeOverride, ContentTypes};
use sheetcodec_xml::relationships::{rel_types, Relationship, Relationships};
use sheetcodec_xml::workbook::{SheetEntry, WorkbookXml};
use sheetcodec_xml::worksheet::WorksheetXml;

use crate::error::{Error, Result};
use crate::utils::constants::{MAX_SHEET_NAME_LENGTH, SHEET_NAME_INVALID_CHARS};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate a sheet name according to Excel rules.
///
/// A valid sheet name must:
/// - Be non-empty
/// - Be at most [`MAX_SHEET_NAME_LENGTH`] (31) characters
/// - Not contain any of the characters `: \ / ? * [ ]`
/// - Not start or end with a single quote (`'`)
pub fn validate_sheet_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidSheetName("sheet name cannot be empty".into()));
    }
    if name.len() > MAX_SHEET_NAME_LENGTH {
        return Err(Error::InvalidSheetName(format!(
            "sheet name '{}' exceeds {} characters",
            name, MAX_SHEET_NAME_LENGTH
        )));
    }
    for ch in SHEET_NAME_INVALID_CHARS {
        if name.contains(*ch) {
            return Err(Error::InvalidSheetName(format!(
                "sheet name '{}' contains invalid character '{}'",
                name, ch
            )));
        }
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(Error::InvalidSheetName(format!(
            "sheet name '{}' cannot start or end with a single quote",
            name
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// ID generation helpers
// ---------------------------------------------------------------------------

/// Generate the next available rId for workbook relationships.
///
/// Scans existing relationship IDs of the form `rIdN` and returns `rId{max+1}`.
pub fn next_rid(existing_rels: &[Relationship]) -> String {
    let max = existing_rels
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId").and_then(|n| n.parse::<u32>().ok()))
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

/// Generate the next available sheet ID.
///
/// Sheet IDs in a workbook are unique but not necessarily contiguous. This
/// function returns one greater than the current maximum.
pub fn next_sheet_id(existing_sheets: &[SheetEntry]) -> u32 {
    existing_sheets
        .iter()
        .map(|s| s.sheet_id)
        .max()
        .unwrap_or(0)
        + 1
}

// ---------------------------------------------------------------------------
// Sheet operations (operate on workbook internals)
// ---------------------------------------------------------------------------

/// Find the index (0-based) of a sheet by name.
pub fn find_sheet_index(worksheets: &[(String, WorksheetXml)], name: &str) -> Option<usize> {
    worksheets.iter().position(|(n, _)| n == name)
}

/// Add a new sheet. Returns the 0-based index of the new sheet.
///
/// This function performs all bookkeeping: adds entries to the sheet list,
/// workbook relationships, and content type overrides.
pub fn add_sheet(
    workbook_xml: &mut WorkbookXml,
    workbook_rels: &mut Relationships,
    content_types: &mut ContentTypes,
    worksheets: &mut Vec<(String, WorksheetXml)>,
    name: &str,
    worksheet_data: WorksheetXml,
) -> Result<usize> {
    validate_sheet_name(name)?;

    // Check for duplicate name
    if worksheets.iter().any(|(n, _)| n == name) {
        return Err(Error::SheetAlreadyExists {
            name: name.to_string(),
        });
    }

    let rid = next_rid(&workbook_rels.relationships);
    let sheet_id = next_sheet_id(&workbook_xml.sheets.sheets);
    let sheet_number = worksheets.len() + 1;
    let target = format!("worksheets/sheet{}.xml", sheet_number);

    // Add SheetEntry to workbook XML
    workbook_xml.sheets.sheets.push(SheetEntry {
        name: name.to_string(),
        sheet_id,
        state: None,
        r_id: rid.clone(),
    });

    // Add Relationship
    workbook_rels.relationships.push(Relationship {
        id: rid,
        rel_type: rel_types::WORKSHEET.to_string(),
        target: target.clone(),
        target_mode: None,
    });

    // Add ContentType override
    content_types.overrides.push(ContentTypeOverride {
        part_name: format!("/xl/{}", target),
        content_type: mime_types::WORKSHEET.to_string(),
    });

    // Add to worksheets vec
    worksheets.push((name.to_string(), worksheet_data));

    Ok(worksheets.len() - 1)
}

/// Delete a sheet by name.
///
/// Returns an error if the sheet does not exist or if it is the last remaining sheet.
pub fn delete_sheet(
    workbook_xml: &mut WorkbookXml,
    workbook_rels: &mut Relationships,
    content_types: &mut ContentTypes,
    worksheets: &mut Vec<(String, WorksheetXml)>,
    name: &str,
) -> Result<()> {
    let idx = find_sheet_index(worksheets, name).ok_or_else(|| Error::SheetNotFound {
        name: name.to_string(),
    })?;

    if worksheets.len() <= 1 {
        return Err(Error::InvalidSheetName(
            "cannot delete the last sheet in a workbook".into(),
        ));
    }

    // Get the rId before removing
    let r_id = workbook_xml.sheets.sheets[idx].r_id.clone();

    // Remove from worksheets vec
    worksheets.remove(idx);

    // Remove from workbook XML sheets
    workbook_xml.sheets.sheets.remove(idx);

    // Remove matching relationship
    workbook_rels.relationships.retain(|r| r.id != r_id);

    // Rebuild content type overrides for worksheets to match new indices
    rebuild_content_type_overrides(content_types, worksheets.len());

    // Rebuild relationship targets to match new worksheet indices
    rebuild_worksheet_relationships(workbook_xml, workbook_rels);

    Ok(())
}

/// Rename a sheet.
pub fn rename_sheet(
    workbook_xml: &mut WorkbookXml,
    worksheets: &mut [(String, WorksheetXml)],
    old_name: &str,
    new_name: &str,
) -> Result<()> {
    validate_sheet_name(new_name)?;

    let idx = find_sheet_index(worksheets, old_name).ok_or_else(|| Error::SheetNotFound {
        name: old_name.to_string(),
    })?;

    // Check new name doesn't conflict
    if worksheets.iter().any(|(n, _)| n == new_name) {
        return Err(Error::SheetAlreadyExists {
            name: new_name.to_string(),
        });
    }

    // Update in worksheets vec
    worksheets[idx].0 = new_name.to_string();

    // Update in workbook XML
    workbook_xml.sheets.sheets[idx].name = new_name.to_string();

    Ok(())
}

/// Copy a sheet, returning the 0-based index of the new copy.
pub fn copy_sheet(
    workbook_xml: &mut WorkbookXml,
    workbook_rels: &mut Relationships,
    content_types: &mut ContentTypes,
    worksheets: &mut Vec<(String, WorksheetXml)>,
    source_name: &str,
    target_name: &str,
) -> Result<usize> {
    let source_idx =
        find_sheet_index(worksheets, source_name).ok_or_else(|| Error::SheetNotFound {
            name: source_name.to_string(),
        })?;

    let cloned_data = worksheets[source_idx].1.clone();

    add_sheet(
        workbook_xml,
        workbook_rels,
        content_types,
        worksheets,
        target_name,
        cloned_data,
    )
}

// ---------------------------------------------------------------------------
// Active sheet helpers
// ---------------------------------------------------------------------------

/// Get the active sheet index (0-based) from bookViews, defaulting to 0.
pub fn active_sheet_index(workbook_xml: &WorkbookXml) -> usize {
    workbook_xml
        .book_views
        .as_ref()
        .and_then(|bv| bv.workbook_views.first())
        .and_then(|v| v.active_tab)
        .unwrap_or(0) as usize
}

/// Set the active sheet by index in bookViews.
pub fn set_active_sheet_index(workbook_xml: &mut WorkbookXml, index: u32) {
    use sheetcodec_xml::workbook::{BookViews, WorkbookView};

    let book_views = workbook_xml.book_views.get_or_insert_with(|| BookViews {
        workbook_views: vec![WorkbookView {
            x_window: None,
            y_window: None,
            window_width: None,
            window_height: None,
            active_tab: Some(0),
        }],
    });

    if let Some(view) = book_views.workbook_views.first_mut() {
        view.active_tab = Some(index);
    }
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Rebuild content type overrides for worksheets so they match the current
/// worksheet indices (sheet1.xml, sheet2.xml, ...).
fn rebuild_content_type_overrides(content_types: &mut ContentTypes, sheet_count: usize) {
    // Remove all existing worksheet overrides
    content_types
        .overrides
        .retain(|o| o.content_type != mime_types::WORKSHEET);

    // Re-add them with correct indices
    for i in 1..=sheet_count {
        content_types.overrides.push(ContentTypeOverride {
            part_name: format!("/xl/worksheets/sheet{}.xml", i),
            content_type: mime_types::WORKSHEET.to_string(),
        });
    }
}

/// Rebuild worksheet relationship targets so they match the current worksheet indices.
fn rebuild_worksheet_relationships(
    workbook_xml: &mut WorkbookXml,
    workbook_rels: &mut Relationships,
) {
    // Collect the rIds from the sheet entries (which are already in correct order)
    let sheet_rids: Vec<String> = workbook_xml
        .sheets
        .sheets
        .iter()
        .map(|s| s.r_id.clone())
        .collect();

    // Update relationship targets for each sheet
    for (i, rid) in sheet_rids.iter().enumerate() {
        if let Some(rel) = workbook_rels
            .relationships
            .iter_mut()
            .find(|r| r.id == *rid)
        {
            rel.target = format!("worksheets/sheet{}.xml", i + 1);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
