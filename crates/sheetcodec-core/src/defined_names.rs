//! Defined names (named ranges) management.
//!
//! Provides functions to add, retrieve, update, delete, and list defined names
//! in an Excel workbook. Defined names can be workbook-scoped (visible from all
//! sheets) or sheet-scoped (visible only in the specified sheet).

use sheetcodec_xml::workbook::{DefinedName, DefinedNames, WorkbookXml};

use crate::error::{Error, Result};

/// Characters that are not allowed in defined names.
const DEFINED_NAME_INVALID_CHARS: &[char] = &['\\', '/', '?', '*', '[', ']'];

/// Scope of a defined name.
#[derive(Debug, Clone, PartialEq)]
pub enum DefinedNameScope {
    /// Workbook-level scope (visible from all sheets).
    Workbook,
    /// Sheet-level scope (only visible in the specified sheet).
    Sheet(u32),
}

/// Information about a defined name.
#[derive(Debug, Clone)]
pub struct DefinedNameInfo {
    pub name: String,
    /// The reference or formula, e.g. "Sheet1!$A$1:$D$10".
    pub value: String,
    pub scope: DefinedNameScope,
    pub comment: Option<String>,
}

/// Validate a defined name.
///
/// A valid defined name must:
/// - Be non-empty
/// - Not start or end with whitespace
/// - Not contain any of the characters `\ / ? * [ ]`
fn validate_defined_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::InvalidDefinedName(
            "defined name cannot be empty".into(),
        ));
    }
    if name != name.trim() {
        return Err(Error::InvalidDefinedName(
            "defined name cannot start or end with whitespace".into(),
        ));
    }
    for ch in DEFINED_NAME_INVALID_CHARS {
        if name.contains(*ch) {
            return Err(Error::InvalidDefinedName(format!(
                "defined name '{}' contains invalid character '{}'",
                name, ch
            )));
        }
    }
    Ok(())
}

/// Convert a `DefinedNameScope` to the corresponding `local_sheet_id` value.
fn scope_to_local_sheet_id(scope: &DefinedNameScope) -> Option<u32> {
    match scope {
        DefinedNameScope::Workbook => None,
        DefinedNameScope::Sheet(id) => Some(*id),
    }
}

/// Convert an optional `local_sheet_id` to a `DefinedNameScope`.
fn local_sheet_id_to_scope(local_sheet_id: Option<u32>) -> DefinedNameScope {
    match local_sheet_id {
        None => DefinedNameScope::Workbook,
        Some(id) => DefinedNameScope::Sheet(id),
    }
}

/// Add or update a defined name in the workbook.
///
/// If a defined name with the same name and scope already exists, its value
/// and comment are updated. Otherwise, a new entry is created.
pub fn set_defined_name(
    wb: &mut WorkbookXml,
    name: &str,
    value: &str,
    scope: DefinedNameScope,
    comment: Option<&str>,
) -> Result<()> {
    validate_defined_name(name)?;

    let local_sheet_id = scope_to_local_sheet_id(&scope);

    let defined_names = wb.defined_names.get_or_insert_with(|| DefinedNames {
        defined_names: Vec::new(),
    });

    // Check if a name with the same name+scope already exists.
    if let Some(existing) = defined_names
        .defined_names
        .iter_mut()
        .find(|dn| dn.name == name && dn.local_sheet_id == local_sheet_id)
    {
        existing.value = value.to_string();
        existing.comment = comment.map(|c| c.to_string());
        return Ok(());
    }

    defined_names.defined_names.push(DefinedName {
        name: name.to_string(),
        local_sheet_id,
        comment: comment.map(|c| c.to_string()),
        hidden: None,
        value: value.to_string(),
    });

    Ok(())
}

/// Get a defined name by name and scope.
///
/// Returns `None` if no matching defined name is found.
pub fn get_defined_name(
    wb: &WorkbookXml,
    name: &str,
    scope: DefinedNameScope,
) -> Option<DefinedNameInfo> {
    let defined_names = wb.defined_names.as_ref()?;
    let local_sheet_id = scope_to_local_sheet_id(&scope);

    defined_names
        .defined_names
        .iter()
        .find(|dn| dn.name == name && dn.local_sheet_id == local_sheet_id)
        .map(|dn| DefinedNameInfo {
            name: dn.name.clone(),
            value: dn.value.clone(),
            scope: local_sheet_id_to_scope(dn.local_sheet_id),
            comment: dn.comment.clone(),
        })
}

/// Delete a defined name by name and scope.
///
/// Returns an error if the defined name does not exist.
pub fn delete_defined_name(
    wb: &mut WorkbookXml,
    name: &str,
    scope: DefinedNameScope,
) -> Result<()> {
    let local_sheet_id = scope_to_local_sheet_id(&scope);

    let defined_names = wb
        .defined_names
        .as_mut()
        .ok_or_else(|| Error::DefinedNameNotFound {
            name: name.to_string(),
        })?;

    let idx = defined_names
        .defined_names
        .iter()
        .position(|dn| dn.name == name && dn.local_sheet_id == local_sheet_id)
        .ok_or_else(|| Error::DefinedNameNotFound {
            name: name.to_string(),
        })?;

    defined_names.defined_names.remove(idx);

    // Clean up: remove the container if empty.
    if defined_names.defined_names.is_empty() {
        wb.defined_names = None;
    }

    Ok(())
}

/// List all defined names in the workbook.
pub fn get_all_defined_names(wb: &WorkbookXml) -> Vec<DefinedNameInfo> {
    let Some(defined_names) = wb.defined_names.as_ref() else {
        return Vec::new();
    };

    defined_names
        .defined_names
        .iter()
        .map(|dn| DefinedNameInfo {
            name: dn.name.clone(),
            value: dn.value.clone(),
            scope: local_sheet_id_to_scope(dn.local_sheet_id),
            comment: dn.comment.clone(),
        })
        .collect()
}
