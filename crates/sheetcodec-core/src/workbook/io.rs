use std::collections::{HashMap, HashSet};
use std::io::Read;

use sheetcodec_xml::comments::Comments;
use sheetcodec_xml::content_types::{mime_types, ContentTypeDefault, ContentTypeOverride, ContentTypes};
use sheetcodec_xml::relationships::{self, rel_types, Relationship, Relationships};
use sheetcodec_xml::shared_strings::Sst;
use sheetcodec_xml::styles::StyleSheet;
use sheetcodec_xml::table::TableXml;
use sheetcodec_xml::worksheet::{DrawingRef, WorksheetXml};
use sheetcodec_xml::workbook::WorkbookXml;

use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::error::{Error, Result};
use crate::sst::SharedStringTable;
use crate::workbook_paths::{
    default_relationships, relationship_part_path, relative_relationship_target,
    resolve_relationship_target,
};

use super::{Workbook, WorkbookFormat, XML_DECLARATION};

const VML_DRAWING_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/vmlDrawing";
const VML_DRAWING_MIME: &str = "application/vnd.openxmlformats-officedocument.vmlDrawing";

impl Workbook {
    /// Create a new empty workbook containing a single empty sheet named "Sheet1".
    pub fn new() -> Self {
        Self {
            format: WorkbookFormat::Xlsx,
            content_types: ContentTypes::default(),
            package_rels: relationships::package_rels(),
            workbook_xml: WorkbookXml::default(),
            workbook_rels: relationships::workbook_rels(),
            worksheets: vec![("Sheet1".to_string(), WorksheetXml::default())],
            stylesheet: StyleSheet::default(),
            sst_runtime: SharedStringTable::new(),
            sheet_comments: vec![None],
            worksheet_rels: HashMap::new(),
            core_properties: None,
            app_properties: None,
            custom_properties: None,
            theme_xml: None,
            theme_colors: crate::theme::default_theme_colors(),
            sheet_vml: vec![None],
            tables: vec![],
            extra_parts: vec![],
            sheet_name_index: {
                let mut m = HashMap::new();
                m.insert("Sheet1".to_string(), 0);
                m
            },
        }
    }

    /// Open an existing `.xlsx` file from disk.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let data = std::fs::read(path.as_ref())?;
        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor).map_err(|e| Error::Zip(e.to_string()))?;
        Self::from_archive(&mut archive)
    }

    /// Open a workbook from an in-memory `.xlsx` buffer.
    pub fn open_from_buffer(data: &[u8]) -> Result<Self> {
        let cursor = std::io::Cursor::new(data);
        let mut archive = zip::ZipArchive::new(cursor).map_err(|e| Error::Zip(e.to_string()))?;
        Self::from_archive(&mut archive)
    }

    /// Build a Workbook from an already-opened ZIP archive.
    ///
    /// Every part this library models is parsed into its typed counterpart.
    /// Anything else in the package is copied byte-for-byte into
    /// `extra_parts` so round-tripping a file this library does not fully
    /// understand does not silently drop data.
    fn from_archive<R: std::io::Read + std::io::Seek>(
        archive: &mut zip::ZipArchive<R>,
    ) -> Result<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut mark = |name: &str, seen: &mut HashSet<String>| seen.insert(name.to_string());

        let content_types: ContentTypes = read_xml_part(archive, "[Content_Types].xml")?;
        mark("[Content_Types].xml", &mut seen);

        let format = content_types
            .overrides
            .iter()
            .find(|o| o.part_name == "/xl/workbook.xml")
            .and_then(|o| WorkbookFormat::from_content_type(&o.content_type))
            .unwrap_or_default();

        let package_rels: Relationships = read_xml_part(archive, "_rels/.rels")?;
        mark("_rels/.rels", &mut seen);

        let workbook_xml: WorkbookXml = read_xml_part(archive, "xl/workbook.xml")?;
        mark("xl/workbook.xml", &mut seen);

        let workbook_rels: Relationships = read_xml_part(archive, "xl/_rels/workbook.xml.rels")?;
        mark("xl/_rels/workbook.xml.rels", &mut seen);

        let mut worksheets = Vec::new();
        let mut worksheet_paths = Vec::new();
        for sheet_entry in &workbook_xml.sheets.sheets {
            let rel = workbook_rels
                .relationships
                .iter()
                .find(|r| r.id == sheet_entry.r_id && r.rel_type == rel_types::WORKSHEET)
                .ok_or_else(|| {
                    Error::Internal(format!(
                        "missing worksheet relationship for sheet '{}'",
                        sheet_entry.name
                    ))
                })?;

            let sheet_path = resolve_relationship_target("xl/workbook.xml", &rel.target);
            let ws: WorksheetXml = read_xml_part(archive, &sheet_path)?;
            mark(&sheet_path, &mut seen);
            worksheets.push((sheet_entry.name.clone(), ws));
            worksheet_paths.push(sheet_path);
        }

        let stylesheet: StyleSheet = read_xml_part(archive, "xl/styles.xml")?;
        mark("xl/styles.xml", &mut seen);

        let sst: Sst = read_xml_part(archive, "xl/sharedStrings.xml").unwrap_or_default();
        mark("xl/sharedStrings.xml", &mut seen);
        let sst_runtime = SharedStringTable::from_sst(&sst);

        let (theme_xml, theme_colors) = match read_bytes_part(archive, "xl/theme/theme1.xml") {
            Ok(bytes) => {
                let colors = sheetcodec_xml::theme::parse_theme_colors(&bytes);
                mark("xl/theme/theme1.xml", &mut seen);
                (Some(bytes), colors)
            }
            Err(_) => (None, crate::theme::default_theme_colors()),
        };

        let mut worksheet_rels: HashMap<usize, Relationships> = HashMap::new();
        for (i, sheet_path) in worksheet_paths.iter().enumerate() {
            let rels_path = relationship_part_path(sheet_path);
            if let Ok(rels) = read_xml_part::<Relationships, _>(archive, &rels_path) {
                mark(&rels_path, &mut seen);
                worksheet_rels.insert(i, rels);
            }
        }

        let mut sheet_comments: Vec<Option<Comments>> = vec![None; worksheets.len()];
        let mut sheet_vml: Vec<Option<Vec<u8>>> = vec![None; worksheets.len()];
        let mut tables: Vec<(String, TableXml, usize)> = Vec::new();

        for (sheet_idx, sheet_path) in worksheet_paths.iter().enumerate() {
            let Some(rels) = worksheet_rels.get(&sheet_idx) else {
                continue;
            };

            for rel in &rels.relationships {
                match rel.rel_type.as_str() {
                    rel_types::COMMENTS => {
                        let target = resolve_relationship_target(sheet_path, &rel.target);
                        if let Ok(comments) = read_xml_part::<Comments, _>(archive, &target) {
                            mark(&target, &mut seen);
                            sheet_comments[sheet_idx] = Some(comments);
                        }
                    }
                    VML_DRAWING_REL_TYPE => {
                        let target = resolve_relationship_target(sheet_path, &rel.target);
                        if let Ok(bytes) = read_bytes_part(archive, &target) {
                            mark(&target, &mut seen);
                            sheet_vml[sheet_idx] = Some(bytes);
                        }
                    }
                    rel_types::TABLE => {
                        let target = resolve_relationship_target(sheet_path, &rel.target);
                        if let Ok(table_xml) = read_xml_part::<TableXml, _>(archive, &target) {
                            mark(&target, &mut seen);
                            tables.push((target, table_xml, sheet_idx));
                        }
                    }
                    _ => {}
                }
            }
        }

        let core_properties = read_string_part(archive, "docProps/core.xml")
            .ok()
            .and_then(|xml_str| {
                sheetcodec_xml::doc_props::deserialize_core_properties(&xml_str).ok()
            });
        mark("docProps/core.xml", &mut seen);

        let app_properties: Option<sheetcodec_xml::doc_props::ExtendedProperties> =
            read_xml_part(archive, "docProps/app.xml").ok();
        mark("docProps/app.xml", &mut seen);

        let custom_properties = read_string_part(archive, "docProps/custom.xml")
            .ok()
            .and_then(|xml_str| {
                sheetcodec_xml::doc_props::deserialize_custom_properties(&xml_str).ok()
            });
        mark("docProps/custom.xml", &mut seen);

        // Anything left over -- charts, drawings, images, pivot tables, VBA
        // projects, threaded comments, calc chains -- is preserved byte for
        // byte rather than dropped.
        let mut extra_parts = Vec::new();
        let all_names: Vec<String> = (0..archive.len())
            .filter_map(|i| archive.by_index(i).ok().map(|f| f.name().to_string()))
            .collect();
        for name in all_names {
            if name.ends_with('/') || seen.contains(&name) {
                continue;
            }
            if let Ok(bytes) = read_bytes_part(archive, &name) {
                extra_parts.push((name, bytes));
            }
        }

        let mut workbook = Self {
            format,
            content_types,
            package_rels,
            workbook_xml,
            workbook_rels,
            worksheets,
            stylesheet,
            sst_runtime,
            sheet_comments,
            worksheet_rels,
            core_properties,
            app_properties,
            custom_properties,
            theme_xml,
            theme_colors,
            sheet_vml,
            tables,
            extra_parts,
            sheet_name_index: HashMap::new(),
        };
        workbook.rebuild_sheet_index();
        Ok(workbook)
    }

    /// Save the workbook to a `.xlsx` file at the given path.
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let mut zip = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        self.write_zip_contents(&mut zip, options)?;
        zip.finish().map_err(|e| Error::Zip(e.to_string()))?;
        Ok(())
    }

    /// Serialize the workbook to an in-memory `.xlsx` buffer.
    pub fn save_to_buffer(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        {
            let cursor = std::io::Cursor::new(&mut buf);
            let mut zip = zip::ZipWriter::new(cursor);
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            self.write_zip_contents(&mut zip, options)?;
            zip.finish().map_err(|e| Error::Zip(e.to_string()))?;
        }
        Ok(buf)
    }

    /// Write all workbook parts into the given ZIP writer.
    fn write_zip_contents<W: std::io::Write + std::io::Seek>(
        &self,
        zip: &mut zip::ZipWriter<W>,
        options: SimpleFileOptions,
    ) -> Result<()> {
        let mut content_types = self.content_types.clone();
        content_types
            .overrides
            .retain(|o| WorkbookFormat::from_content_type(&o.content_type).is_none());
        content_types.overrides.push(ContentTypeOverride {
            part_name: "/xl/workbook.xml".to_string(),
            content_type: self.format.content_type().to_string(),
        });

        let mut worksheet_rels = self.worksheet_rels.clone();
        let mut written: HashSet<String> = HashSet::new();

        // Synchronize comment and VML parts with worksheet relationships and
        // content types, regenerating VML from comments when none was
        // preserved from the source file.
        let mut vml_parts_to_write: Vec<(String, Vec<u8>)> = Vec::new();
        let mut legacy_drawing_rids: HashMap<usize, String> = HashMap::new();
        let mut has_any_vml = false;

        for sheet_idx in 0..self.worksheets.len() {
            let has_comments = self
                .sheet_comments
                .get(sheet_idx)
                .and_then(|c| c.as_ref())
                .is_some();

            if let Some(rels) = worksheet_rels.get_mut(&sheet_idx) {
                rels.relationships
                    .retain(|r| r.rel_type != rel_types::COMMENTS);
                rels.relationships
                    .retain(|r| r.rel_type != VML_DRAWING_REL_TYPE);
            }
            if !has_comments {
                continue;
            }

            let comment_path = format!("xl/comments{}.xml", sheet_idx + 1);
            let part_name = format!("/{comment_path}");
            if !content_types
                .overrides
                .iter()
                .any(|o| o.part_name == part_name)
            {
                content_types.overrides.push(ContentTypeOverride {
                    part_name,
                    content_type: mime_types::COMMENTS.to_string(),
                });
            }

            let sheet_path = self.sheet_part_path(sheet_idx);
            let target = relative_relationship_target(&sheet_path, &comment_path);
            let rels = worksheet_rels
                .entry(sheet_idx)
                .or_insert_with(default_relationships);
            let rid = crate::sheet::next_rid(&rels.relationships);
            rels.relationships.push(Relationship {
                id: rid,
                rel_type: rel_types::COMMENTS.to_string(),
                target,
                target_mode: None,
            });

            let vml_path = format!("xl/drawings/vmlDrawing{}.vml", sheet_idx + 1);
            let vml_bytes = if let Some(bytes) =
                self.sheet_vml.get(sheet_idx).and_then(|v| v.as_ref())
            {
                bytes.clone()
            } else {
                let comments = self.sheet_comments[sheet_idx].as_ref().unwrap();
                let cells: Vec<&str> = comments
                    .comment_list
                    .comments
                    .iter()
                    .map(|c| c.r#ref.as_str())
                    .collect();
                crate::vml::build_vml_drawing(&cells).into_bytes()
            };

            let vml_target = relative_relationship_target(&sheet_path, &vml_path);
            let vml_rid = crate::sheet::next_rid(&rels.relationships);
            rels.relationships.push(Relationship {
                id: vml_rid.clone(),
                rel_type: VML_DRAWING_REL_TYPE.to_string(),
                target: vml_target,
                target_mode: None,
            });

            legacy_drawing_rids.insert(sheet_idx, vml_rid);
            vml_parts_to_write.push((vml_path, vml_bytes));
            has_any_vml = true;
        }

        if has_any_vml && !content_types.defaults.iter().any(|d| d.extension == "vml") {
            content_types.defaults.push(ContentTypeDefault {
                extension: "vml".to_string(),
                content_type: VML_DRAWING_MIME.to_string(),
            });
        }

        // Attach each table to its owning sheet's relationships and table
        // part list, in declaration order. Stale table relationships and
        // content-type overrides (e.g. from a since-deleted table) are
        // dropped first so they don't linger with no backing part.
        for rels in worksheet_rels.values_mut() {
            rels.relationships
                .retain(|r| r.rel_type != rel_types::TABLE);
        }
        content_types
            .overrides
            .retain(|o| !o.part_name.starts_with("/xl/tables/"));

        let mut sheet_table_parts: HashMap<usize, Vec<String>> = HashMap::new();
        for (part_path, _, sheet_idx) in self.tables.iter() {
            let part_name = format!("/{part_path}");
            if !content_types
                .overrides
                .iter()
                .any(|o| o.part_name == part_name)
            {
                content_types.overrides.push(ContentTypeOverride {
                    part_name,
                    content_type: mime_types::TABLE.to_string(),
                });
            }

            let sheet_path = self.sheet_part_path(*sheet_idx);
            let target = relative_relationship_target(&sheet_path, part_path);
            let rels = worksheet_rels
                .entry(*sheet_idx)
                .or_insert_with(default_relationships);
            let rid = crate::sheet::next_rid(&rels.relationships);
            rels.relationships.push(Relationship {
                id: rid.clone(),
                rel_type: rel_types::TABLE.to_string(),
                target,
                target_mode: None,
            });
            sheet_table_parts.entry(*sheet_idx).or_default().push(rid);
        }

        write_xml_part(zip, "[Content_Types].xml", &content_types, options)?;
        written.insert("[Content_Types].xml".to_string());

        write_xml_part(zip, "_rels/.rels", &self.package_rels, options)?;
        written.insert("_rels/.rels".to_string());

        write_xml_part(zip, "xl/workbook.xml", &self.workbook_xml, options)?;
        written.insert("xl/workbook.xml".to_string());

        write_xml_part(
            zip,
            "xl/_rels/workbook.xml.rels",
            &self.workbook_rels,
            options,
        )?;
        written.insert("xl/_rels/workbook.xml.rels".to_string());

        for (i, (_name, ws)) in self.worksheets.iter().enumerate() {
            let entry_name = self.sheet_part_path(i);
            let needs_legacy_drawing = legacy_drawing_rids.contains_key(&i);
            let table_rids = sheet_table_parts.get(&i);

            if !needs_legacy_drawing && table_rids.is_none() {
                write_xml_part(zip, &entry_name, ws, options)?;
            } else {
                let mut ws_clone = ws.clone();
                if let Some(rid) = legacy_drawing_rids.get(&i) {
                    ws_clone.legacy_drawing = Some(DrawingRef { r_id: rid.clone() });
                }
                if let Some(rids) = table_rids {
                    ws_clone.table_parts = Some(sheetcodec_xml::worksheet::TableParts {
                        count: Some(rids.len() as u32),
                        table_parts: rids
                            .iter()
                            .map(|r_id| sheetcodec_xml::worksheet::TablePart { r_id: r_id.clone() })
                            .collect(),
                    });
                }
                write_xml_part(zip, &entry_name, &ws_clone, options)?;
            }
            written.insert(entry_name);
        }

        write_xml_part(zip, "xl/styles.xml", &self.stylesheet, options)?;
        written.insert("xl/styles.xml".to_string());

        write_xml_part(
            zip,
            "xl/sharedStrings.xml",
            &self.sst_runtime.to_sst(),
            options,
        )?;
        written.insert("xl/sharedStrings.xml".to_string());

        for (i, comments) in self.sheet_comments.iter().enumerate() {
            if let Some(c) = comments {
                let entry_name = format!("xl/comments{}.xml", i + 1);
                write_xml_part(zip, &entry_name, c, options)?;
                written.insert(entry_name);
            }
        }

        for (vml_path, vml_bytes) in &vml_parts_to_write {
            zip.start_file(vml_path, options)
                .map_err(|e| Error::Zip(e.to_string()))?;
            zip.write_all(vml_bytes)?;
            written.insert(vml_path.clone());
        }

        for (part_path, table_xml, _) in &self.tables {
            write_xml_part(zip, part_path, table_xml, options)?;
            written.insert(part_path.clone());
        }

        for (sheet_idx, rels) in &worksheet_rels {
            if rels.relationships.is_empty() {
                continue;
            }
            let sheet_path = self.sheet_part_path(*sheet_idx);
            let path = relationship_part_path(&sheet_path);
            write_xml_part(zip, &path, rels, options)?;
            written.insert(path);
        }

        {
            let default_theme = crate::theme::default_theme_xml();
            let theme_bytes = self.theme_xml.as_deref().unwrap_or(&default_theme);
            zip.start_file("xl/theme/theme1.xml", options)
                .map_err(|e| Error::Zip(e.to_string()))?;
            zip.write_all(theme_bytes)?;
            written.insert("xl/theme/theme1.xml".to_string());
        }

        if let Some(props) = &self.core_properties {
            let xml_str = sheetcodec_xml::doc_props::serialize_core_properties(props);
            zip.start_file("docProps/core.xml", options)
                .map_err(|e| Error::Zip(e.to_string()))?;
            zip.write_all(xml_str.as_bytes())?;
            written.insert("docProps/core.xml".to_string());
        }

        if let Some(props) = &self.app_properties {
            write_xml_part(zip, "docProps/app.xml", props, options)?;
            written.insert("docProps/app.xml".to_string());
        }

        if let Some(props) = &self.custom_properties {
            let xml_str = sheetcodec_xml::doc_props::serialize_custom_properties(props);
            zip.start_file("docProps/custom.xml", options)
                .map_err(|e| Error::Zip(e.to_string()))?;
            zip.write_all(xml_str.as_bytes())?;
            written.insert("docProps/custom.xml".to_string());
        }

        // Everything this library does not model, rewritten unchanged,
        // skipping any path a part above already claimed.
        for (path, bytes) in &self.extra_parts {
            if written.contains(path) {
                continue;
            }
            zip.start_file(path, options)
                .map_err(|e| Error::Zip(e.to_string()))?;
            zip.write_all(bytes)?;
        }

        Ok(())
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a value to XML with the standard XML declaration prepended.
pub(crate) fn serialize_xml<T: serde::Serialize>(value: &T) -> Result<String> {
    let body = quick_xml::se::to_string(value).map_err(|e| Error::XmlParse(e.to_string()))?;
    Ok(format!("{XML_DECLARATION}\n{body}"))
}

/// Read a ZIP entry and deserialize it from XML.
pub(crate) fn read_xml_part<T: serde::de::DeserializeOwned, R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<T> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| Error::Zip(e.to_string()))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| Error::Zip(e.to_string()))?;
    quick_xml::de::from_str(&content).map_err(|e| Error::XmlDeserialize(e.to_string()))
}

/// Read a ZIP entry as a raw string (no serde deserialization).
pub(crate) fn read_string_part<R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<String> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| Error::Zip(e.to_string()))?;
    let mut content = String::new();
    entry
        .read_to_string(&mut content)
        .map_err(|e| Error::Zip(e.to_string()))?;
    Ok(content)
}

/// Read a ZIP entry as raw bytes.
pub(crate) fn read_bytes_part<R: std::io::Read + std::io::Seek>(
    archive: &mut zip::ZipArchive<R>,
    name: &str,
) -> Result<Vec<u8>> {
    let mut entry = archive
        .by_name(name)
        .map_err(|e| Error::Zip(e.to_string()))?;
    let mut content = Vec::new();
    entry
        .read_to_end(&mut content)
        .map_err(|e| Error::Zip(e.to_string()))?;
    Ok(content)
}

/// Serialize a value to XML and write it as a ZIP entry.
pub(crate) fn write_xml_part<T: serde::Serialize, W: std::io::Write + std::io::Seek>(
    zip: &mut zip::ZipWriter<W>,
    name: &str,
    value: &T,
    options: SimpleFileOptions,
) -> Result<()> {
    let xml = serialize_xml(value)?;
    zip.start_file(name, options)
        .map_err(|e| Error::Zip(e.to_string()))?;
    zip.write_all(xml.as_bytes())?;
    Ok(())
}
