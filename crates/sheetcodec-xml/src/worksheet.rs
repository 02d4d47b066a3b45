//! Worksheet XML schema structures.
//!
//! Represents `xl/worksheets/sheet*.xml` in the OOXML package.

use serde::{Deserialize, Serialize};

use crate::namespaces;

/// Worksheet root element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "worksheet")]
pub struct WorksheetXml {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,

    #[serde(rename = "@xmlns:r")]
    pub xmlns_r: String,

    #[serde(rename = "dimension", skip_serializing_if = "Option::is_none")]
    pub dimension: Option<Dimension>,

    #[serde(rename = "sheetViews", skip_serializing_if = "Option::is_none")]
    pub sheet_views: Option<SheetViews>,

    #[serde(rename = "sheetFormatPr", skip_serializing_if = "Option::is_none")]
    pub sheet_format_pr: Option<SheetFormatPr>,

    #[serde(rename = "cols", skip_serializing_if = "Option::is_none")]
    pub cols: Option<Cols>,

    #[serde(rename = "sheetData")]
    pub sheet_data: SheetData,

    #[serde(rename = "autoFilter", skip_serializing_if = "Option::is_none")]
    pub auto_filter: Option<AutoFilter>,

    #[serde(rename = "mergeCells", skip_serializing_if = "Option::is_none")]
    pub merge_cells: Option<MergeCells>,

    #[serde(rename = "conditionalFormatting", default, skip_serializing_if = "Vec::is_empty")]
    pub conditional_formatting: Vec<ConditionalFormatting>,

    #[serde(rename = "dataValidations", skip_serializing_if = "Option::is_none")]
    pub data_validations: Option<DataValidations>,

    #[serde(rename = "hyperlinks", skip_serializing_if = "Option::is_none")]
    pub hyperlinks: Option<Hyperlinks>,

    #[serde(rename = "pageMargins", skip_serializing_if = "Option::is_none")]
    pub page_margins: Option<PageMargins>,

    #[serde(rename = "pageSetup", skip_serializing_if = "Option::is_none")]
    pub page_setup: Option<PageSetup>,

    #[serde(rename = "drawing", skip_serializing_if = "Option::is_none")]
    pub drawing: Option<DrawingRef>,

    #[serde(rename = "legacyDrawing", skip_serializing_if = "Option::is_none")]
    pub legacy_drawing: Option<DrawingRef>,

    #[serde(rename = "tableParts", skip_serializing_if = "Option::is_none")]
    pub table_parts: Option<TableParts>,
}

/// Sheet dimension reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(rename = "@ref")]
    pub reference: String,
}

/// Sheet views container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetViews {
    #[serde(rename = "sheetView")]
    pub sheet_views: Vec<SheetView>,
}

/// Individual sheet view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetView {
    #[serde(rename = "@tabSelected", skip_serializing_if = "Option::is_none")]
    pub tab_selected: Option<bool>,

    #[serde(rename = "@zoomScale", skip_serializing_if = "Option::is_none")]
    pub zoom_scale: Option<u32>,

    #[serde(rename = "@workbookViewId")]
    pub workbook_view_id: u32,

    #[serde(rename = "pane", skip_serializing_if = "Option::is_none")]
    pub pane: Option<Pane>,

    #[serde(rename = "selection", default)]
    pub selection: Vec<Selection>,
}

/// Frozen/split pane configuration for a sheet view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pane {
    #[serde(rename = "@xSplit", skip_serializing_if = "Option::is_none")]
    pub x_split: Option<u32>,

    #[serde(rename = "@ySplit", skip_serializing_if = "Option::is_none")]
    pub y_split: Option<u32>,

    #[serde(rename = "@topLeftCell", skip_serializing_if = "Option::is_none")]
    pub top_left_cell: Option<String>,

    #[serde(rename = "@activePane", skip_serializing_if = "Option::is_none")]
    pub active_pane: Option<String>,

    #[serde(rename = "@state", skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Cell selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    #[serde(rename = "@activeCell", skip_serializing_if = "Option::is_none")]
    pub active_cell: Option<String>,

    #[serde(rename = "@sqref", skip_serializing_if = "Option::is_none")]
    pub sqref: Option<String>,
}

/// Sheet format properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetFormatPr {
    #[serde(rename = "@defaultRowHeight")]
    pub default_row_height: f64,

    #[serde(rename = "@defaultColWidth", skip_serializing_if = "Option::is_none")]
    pub default_col_width: Option<f64>,
}

/// Columns container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cols {
    #[serde(rename = "col")]
    pub cols: Vec<Col>,
}

/// Individual column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Col {
    #[serde(rename = "@min")]
    pub min: u32,

    #[serde(rename = "@max")]
    pub max: u32,

    #[serde(rename = "@width", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,

    #[serde(rename = "@style", skip_serializing_if = "Option::is_none")]
    pub style: Option<u32>,

    #[serde(rename = "@hidden", skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    #[serde(rename = "@customWidth", skip_serializing_if = "Option::is_none")]
    pub custom_width: Option<bool>,

    #[serde(rename = "@outlineLevel", skip_serializing_if = "Option::is_none")]
    pub outline_level: Option<u8>,
}

/// Sheet data container holding all rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetData {
    #[serde(rename = "row", default)]
    pub rows: Vec<Row>,
}

/// A single row of cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    /// 1-based row number.
    #[serde(rename = "@r")]
    pub r: u32,

    #[serde(rename = "@spans", skip_serializing_if = "Option::is_none")]
    pub spans: Option<String>,

    #[serde(rename = "@s", skip_serializing_if = "Option::is_none")]
    pub s: Option<u32>,

    #[serde(rename = "@customFormat", skip_serializing_if = "Option::is_none")]
    pub custom_format: Option<bool>,

    #[serde(rename = "@ht", skip_serializing_if = "Option::is_none")]
    pub ht: Option<f64>,

    #[serde(rename = "@hidden", skip_serializing_if = "Option::is_none")]
    pub hidden: Option<bool>,

    #[serde(rename = "@customHeight", skip_serializing_if = "Option::is_none")]
    pub custom_height: Option<bool>,

    #[serde(rename = "@outlineLevel", skip_serializing_if = "Option::is_none")]
    pub outline_level: Option<u8>,

    #[serde(rename = "c", default)]
    pub cells: Vec<Cell>,
}

/// A single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    /// Cell reference (e.g., "A1").
    #[serde(rename = "@r")]
    pub r: String,

    /// Style index.
    #[serde(rename = "@s", skip_serializing_if = "Option::is_none")]
    pub s: Option<u32>,

    /// Cell type: "b", "d", "e", "inlineStr", "n", "s", "str".
    #[serde(rename = "@t", skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    /// Cell value.
    #[serde(rename = "v", skip_serializing_if = "Option::is_none")]
    pub v: Option<String>,

    /// Cell formula.
    #[serde(rename = "f", skip_serializing_if = "Option::is_none")]
    pub f: Option<CellFormula>,

    /// Inline string.
    #[serde(rename = "is", skip_serializing_if = "Option::is_none")]
    pub is: Option<InlineString>,
}

/// Cell type constants.
pub mod cell_types {
    pub const BOOLEAN: &str = "b";
    pub const DATE: &str = "d";
    pub const ERROR: &str = "e";
    pub const INLINE_STRING: &str = "inlineStr";
    pub const NUMBER: &str = "n";
    pub const SHARED_STRING: &str = "s";
    pub const FORMULA_STRING: &str = "str";
}

/// Cell formula.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFormula {
    #[serde(rename = "@t", skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,

    #[serde(rename = "@ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(rename = "@si", skip_serializing_if = "Option::is_none")]
    pub si: Option<u32>,

    #[serde(rename = "$value", skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Inline string within a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineString {
    #[serde(rename = "t", skip_serializing_if = "Option::is_none")]
    pub t: Option<String>,
}

/// Merge cells container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCells {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "mergeCell", default)]
    pub merge_cells: Vec<MergeCell>,
}

/// Individual merge cell reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeCell {
    #[serde(rename = "@ref")]
    pub reference: String,
}

/// Auto-filter range applied to a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoFilter {
    #[serde(rename = "@ref")]
    pub reference: String,
}

/// Data validations container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidations {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "dataValidation", default)]
    pub data_validations: Vec<DataValidation>,
}

/// Individual data validation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataValidation {
    #[serde(rename = "@type", skip_serializing_if = "Option::is_none")]
    pub validation_type: Option<String>,

    #[serde(rename = "@operator", skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(rename = "@allowBlank", skip_serializing_if = "Option::is_none")]
    pub allow_blank: Option<bool>,

    #[serde(rename = "@showInputMessage", skip_serializing_if = "Option::is_none")]
    pub show_input_message: Option<bool>,

    #[serde(rename = "@showErrorMessage", skip_serializing_if = "Option::is_none")]
    pub show_error_message: Option<bool>,

    #[serde(rename = "@errorStyle", skip_serializing_if = "Option::is_none")]
    pub error_style: Option<String>,

    #[serde(rename = "@errorTitle", skip_serializing_if = "Option::is_none")]
    pub error_title: Option<String>,

    #[serde(rename = "@error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(rename = "@promptTitle", skip_serializing_if = "Option::is_none")]
    pub prompt_title: Option<String>,

    #[serde(rename = "@prompt", skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(rename = "@sqref")]
    pub sqref: String,

    #[serde(rename = "formula1", skip_serializing_if = "Option::is_none")]
    pub formula1: Option<String>,

    #[serde(rename = "formula2", skip_serializing_if = "Option::is_none")]
    pub formula2: Option<String>,
}

/// Conditional formatting rules applying to a cell range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalFormatting {
    #[serde(rename = "@sqref")]
    pub sqref: String,

    #[serde(rename = "cfRule", default)]
    pub cf_rules: Vec<CfRule>,
}

/// A single conditional formatting rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfRule {
    #[serde(rename = "@type")]
    pub rule_type: String,

    #[serde(rename = "@dxfId", skip_serializing_if = "Option::is_none")]
    pub dxf_id: Option<u32>,

    #[serde(rename = "@priority")]
    pub priority: u32,

    #[serde(rename = "@operator", skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,

    #[serde(rename = "@text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "@stopIfTrue", skip_serializing_if = "Option::is_none")]
    pub stop_if_true: Option<bool>,

    #[serde(rename = "@aboveAverage", skip_serializing_if = "Option::is_none")]
    pub above_average: Option<bool>,

    #[serde(rename = "@equalAverage", skip_serializing_if = "Option::is_none")]
    pub equal_average: Option<bool>,

    #[serde(rename = "@percent", skip_serializing_if = "Option::is_none")]
    pub percent: Option<bool>,

    #[serde(rename = "@rank", skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,

    #[serde(rename = "@bottom", skip_serializing_if = "Option::is_none")]
    pub bottom: Option<bool>,

    #[serde(rename = "formula", default)]
    pub formulas: Vec<String>,

    #[serde(rename = "colorScale", skip_serializing_if = "Option::is_none")]
    pub color_scale: Option<CfColorScale>,

    #[serde(rename = "dataBar", skip_serializing_if = "Option::is_none")]
    pub data_bar: Option<CfDataBar>,

    #[serde(rename = "iconSet", skip_serializing_if = "Option::is_none")]
    pub icon_set: Option<CfIconSet>,
}

/// Color scale conditional format (2- or 3-color gradient).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfColorScale {
    #[serde(rename = "cfvo", default)]
    pub cfvos: Vec<CfVo>,

    #[serde(rename = "color", default)]
    pub colors: Vec<CfColor>,
}

/// Data bar conditional format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfDataBar {
    #[serde(rename = "@showValue", skip_serializing_if = "Option::is_none")]
    pub show_value: Option<bool>,

    #[serde(rename = "cfvo", default)]
    pub cfvos: Vec<CfVo>,

    #[serde(rename = "color", skip_serializing_if = "Option::is_none")]
    pub color: Option<CfColor>,
}

/// Icon set conditional format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfIconSet {
    #[serde(rename = "@iconSet", skip_serializing_if = "Option::is_none")]
    pub icon_set: Option<String>,

    #[serde(rename = "cfvo", default)]
    pub cfvos: Vec<CfVo>,
}

/// A conditional format value object: one threshold in a color scale, data
/// bar, or icon set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfVo {
    #[serde(rename = "@type")]
    pub value_type: String,

    #[serde(rename = "@val", skip_serializing_if = "Option::is_none")]
    pub val: Option<String>,
}

/// A color reference used within conditional formatting rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CfColor {
    #[serde(rename = "@rgb", skip_serializing_if = "Option::is_none")]
    pub rgb: Option<String>,

    #[serde(rename = "@theme", skip_serializing_if = "Option::is_none")]
    pub theme: Option<u32>,

    #[serde(rename = "@tint", skip_serializing_if = "Option::is_none")]
    pub tint: Option<f64>,
}

/// Hyperlinks container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperlinks {
    #[serde(rename = "hyperlink", default)]
    pub hyperlinks: Vec<Hyperlink>,
}

/// Individual hyperlink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hyperlink {
    #[serde(rename = "@ref")]
    pub reference: String,

    #[serde(
        rename = "@r:id",
        alias = "@id",
        skip_serializing_if = "Option::is_none"
    )]
    pub r_id: Option<String>,

    #[serde(rename = "@location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    #[serde(rename = "@display", skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Page margins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    #[serde(rename = "@left")]
    pub left: f64,

    #[serde(rename = "@right")]
    pub right: f64,

    #[serde(rename = "@top")]
    pub top: f64,

    #[serde(rename = "@bottom")]
    pub bottom: f64,

    #[serde(rename = "@header")]
    pub header: f64,

    #[serde(rename = "@footer")]
    pub footer: f64,
}

/// Page setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSetup {
    #[serde(rename = "@paperSize", skip_serializing_if = "Option::is_none")]
    pub paper_size: Option<u32>,

    #[serde(rename = "@orientation", skip_serializing_if = "Option::is_none")]
    pub orientation: Option<String>,

    #[serde(
        rename = "@r:id",
        alias = "@id",
        skip_serializing_if = "Option::is_none"
    )]
    pub r_id: Option<String>,
}

/// Drawing reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingRef {
    #[serde(rename = "@r:id", alias = "@id")]
    pub r_id: String,
}

/// Table parts container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableParts {
    #[serde(rename = "@count", skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,

    #[serde(rename = "tablePart", default)]
    pub table_parts: Vec<TablePart>,
}

/// Individual table part reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TablePart {
    #[serde(rename = "@r:id", alias = "@id")]
    pub r_id: String,
}

impl Default for WorksheetXml {
    fn default() -> Self {
        Self {
            xmlns: namespaces::SPREADSHEET_ML.to_string(),
            xmlns_r: namespaces::RELATIONSHIPS.to_string(),
            dimension: None,
            sheet_views: None,
            sheet_format_pr: None,
            cols: None,
            sheet_data: SheetData { rows: vec![] },
            auto_filter: None,
            merge_cells: None,
            conditional_formatting: vec![],
            data_validations: None,
            hyperlinks: None,
            page_margins: None,
            page_setup: None,
            drawing: None,
            legacy_drawing: None,
            table_parts: None,
        }
    }
}
