//! Table and auto-filter management utilities.
//!
//! Provides functions for setting and removing auto-filters on worksheets,
//! and for building/validating table definitions (`xl/tables/table{N}.xml`).

use sheetcodec_xml::table::{
    TableAutoFilter, TableColumnXml, TableColumnsXml, TableStyleInfoXml, TableXml,
};
use sheetcodec_xml::worksheet::{AutoFilter, WorksheetXml};

use crate::error::{Error, Result};

/// Configuration for a table.
#[derive(Debug, Clone, Default)]
pub struct TableConfig {
    /// The table name (used internally).
    pub name: String,
    /// The display name shown in the UI.
    pub display_name: String,
    /// The cell range (e.g. "A1:D10").
    pub range: String,
    /// Column definitions.
    pub columns: Vec<TableColumn>,
    /// Whether to show the header row.
    pub show_header_row: bool,
    /// The table style name (e.g. "TableStyleMedium2").
    pub style_name: Option<String>,
    /// Whether to enable auto-filter on the table.
    pub auto_filter: bool,
}

/// A column within a table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TableColumn {
    /// The column header name.
    pub name: String,
    /// The totals-row aggregate function (e.g. "sum", "average"), if any.
    pub totals_row_function: Option<String>,
    /// The label shown in the totals row for this column, if any.
    pub totals_row_label: Option<String>,
}

/// Metadata describing an existing table, as returned by
/// [`crate::workbook::Workbook::get_tables`].
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    /// The table name.
    pub name: String,
    /// The display name shown in the UI.
    pub display_name: String,
    /// The cell range covered by the table.
    pub range: String,
    /// Column header names, in order.
    pub columns: Vec<String>,
    /// Whether the header row is shown.
    pub show_header_row: bool,
    /// Whether auto-filter is enabled on the table.
    pub auto_filter: bool,
    /// The table style name, if any.
    pub style_name: Option<String>,
}

/// Set an auto-filter on a worksheet for the given cell range.
pub fn set_auto_filter(ws: &mut WorksheetXml, range: &str) -> Result<()> {
    ws.auto_filter = Some(AutoFilter {
        reference: range.to_string(),
    });
    Ok(())
}

/// Remove any auto-filter from a worksheet.
pub fn remove_auto_filter(ws: &mut WorksheetXml) {
    ws.auto_filter = None;
}

/// Validate a table configuration before it is turned into XML.
pub fn validate_table_config(config: &TableConfig) -> Result<()> {
    if config.name.is_empty() {
        return Err(Error::InvalidTableConfig(
            "table name must not be empty".to_string(),
        ));
    }
    if config.range.is_empty() {
        return Err(Error::InvalidTableConfig(
            "table range must not be empty".to_string(),
        ));
    }
    if config.columns.is_empty() {
        return Err(Error::InvalidTableConfig(
            "table must have at least one column".to_string(),
        ));
    }
    Ok(())
}

/// Build the `TableXml` part for a validated configuration and ID.
pub fn build_table_xml(config: &TableConfig, table_id: u32) -> TableXml {
    let display_name = if config.display_name.is_empty() {
        config.name.clone()
    } else {
        config.display_name.clone()
    };

    let columns = config
        .columns
        .iter()
        .enumerate()
        .map(|(i, col)| TableColumnXml {
            id: i as u32 + 1,
            name: col.name.clone(),
            totals_row_function: col.totals_row_function.clone(),
            totals_row_label: col.totals_row_label.clone(),
        })
        .collect::<Vec<_>>();
    let column_count = columns.len() as u32;

    TableXml {
        id: table_id,
        name: config.name.clone(),
        display_name,
        reference: config.range.clone(),
        totals_row_count: None,
        totals_row_shown: None,
        header_row_count: if config.show_header_row { None } else { Some(0) },
        auto_filter: config.auto_filter.then(|| TableAutoFilter {
            reference: config.range.clone(),
        }),
        table_columns: TableColumnsXml {
            count: column_count,
            columns,
        },
        table_style_info: config.style_name.as_ref().map(|name| TableStyleInfoXml {
            name: Some(name.clone()),
            show_first_column: Some(false),
            show_last_column: Some(false),
            show_row_stripes: Some(true),
            show_column_stripes: Some(false),
        }),
        ..TableXml::default()
    }
}

/// Extract display metadata from a parsed or freshly-built `TableXml`.
pub fn table_xml_to_info(table: &TableXml) -> TableInfo {
    TableInfo {
        name: table.name.clone(),
        display_name: table.display_name.clone(),
        range: table.reference.clone(),
        columns: table
            .table_columns
            .columns
            .iter()
            .map(|c| c.name.clone())
            .collect(),
        show_header_row: table.header_row_count != Some(0),
        auto_filter: table.auto_filter.is_some(),
        style_name: table
            .table_style_info
            .as_ref()
            .and_then(|s| s.name.clone()),
    }
}
