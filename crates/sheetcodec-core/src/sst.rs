//! Runtime shared string table.
//!
//! The [`SharedStringTable`] provides an efficient in-memory index for looking
//! up and inserting shared strings. It bridges the gap between the XML-level
//! [`sheetcodec_xml::shared_strings::Sst`] and the high-level cell API.

use std::collections::HashMap;

use sheetcodec_xml::shared_strings::{Si, Sst, T};

use crate::rich_text::{rich_text_to_plain, runs_to_si, xml_to_run, RichTextRun};

/// Runtime shared string table for efficient string lookup and insertion.
///
/// Maintains both an ordered list of strings (for index-based lookup) and a
/// reverse hash map (for deduplication when inserting). Rich-text entries
/// keep their formatted runs alongside the flattened plain text so they can
/// be written back out with formatting intact.
pub struct SharedStringTable {
    strings: Vec<String>,
    /// Formatted runs for entries added via [`add_rich_text`](Self::add_rich_text)
    /// or parsed from a rich `<si>` element. `None` for plain entries.
    rich: Vec<Option<Vec<RichTextRun>>>,
    index_map: HashMap<String, usize>,
}

impl SharedStringTable {
    /// Create a new, empty shared string table.
    pub fn new() -> Self {
        Self {
            strings: Vec::new(),
            rich: Vec::new(),
            index_map: HashMap::new(),
        }
    }

    /// Build from an XML [`Sst`] struct.
    ///
    /// Plain-text items use the `t` field directly. Rich-text items keep
    /// their runs (for later round-trip) and index by their concatenated
    /// plain text.
    pub fn from_sst(sst: &Sst) -> Self {
        let mut table = Self::new();

        for si in &sst.items {
            let idx = table.strings.len();
            if si.t.is_some() {
                let text = si_to_string(si);
                table.index_map.entry(text.clone()).or_insert(idx);
                table.strings.push(text);
                table.rich.push(None);
            } else {
                let runs: Vec<RichTextRun> = si.r.iter().map(xml_to_run).collect();
                let text = rich_text_to_plain(&runs);
                table.index_map.entry(text.clone()).or_insert(idx);
                table.strings.push(text);
                table.rich.push(Some(runs));
            }
        }

        table
    }

    /// Convert back to an XML [`Sst`] struct.
    pub fn to_sst(&self) -> Sst {
        let items: Vec<Si> = self
            .strings
            .iter()
            .zip(&self.rich)
            .map(|(s, rich)| match rich {
                Some(runs) => runs_to_si(runs),
                None => Si {
                    t: Some(T {
                        xml_space: if s.starts_with(' ')
                            || s.ends_with(' ')
                            || s.contains("  ")
                            || s.contains('\n')
                            || s.contains('\t')
                        {
                            Some("preserve".to_string())
                        } else {
                            None
                        },
                        value: s.clone(),
                    }),
                    r: vec![],
                },
            })
            .collect();

        let len = items.len() as u32;
        Sst {
            xmlns: sheetcodec_xml::namespaces::SPREADSHEET_ML.to_string(),
            count: Some(len),
            unique_count: Some(len),
            items,
        }
    }

    /// Get the flattened plain text of a string by its index.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.strings.get(index).map(|s| s.as_str())
    }

    /// Get the formatted runs of a rich-text entry by its index.
    ///
    /// Returns `None` if the index is out of range or the entry is plain text.
    pub fn get_rich_text(&self, index: usize) -> Option<Vec<RichTextRun>> {
        self.rich.get(index).and_then(|r| r.clone())
    }

    /// Add a string, returning its index.
    ///
    /// If the string already exists as a plain entry, the existing index is
    /// returned (dedup).
    pub fn add(&mut self, s: &str) -> usize {
        if let Some(&idx) = self.index_map.get(s) {
            return idx;
        }
        let idx = self.strings.len();
        self.strings.push(s.to_string());
        self.rich.push(None);
        self.index_map.insert(s.to_string(), idx);
        idx
    }

    /// Add a rich-text value (multiple formatted runs), returning its index.
    ///
    /// Unlike [`add`](Self::add), rich-text entries are never deduplicated
    /// against existing entries, since two runs with the same plain text can
    /// carry different formatting.
    pub fn add_rich_text(&mut self, runs: &[RichTextRun]) -> usize {
        let idx = self.strings.len();
        let text = rich_text_to_plain(runs);
        self.strings.push(text);
        self.rich.push(Some(runs.to_vec()));
        idx
    }

    /// Number of unique strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Returns `true` if the table contains no strings.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for SharedStringTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract the plain-text content of a shared string item.
///
/// For plain items, returns `si.t.value`. For rich-text items, concatenates
/// all run texts.
fn si_to_string(si: &Si) -> String {
    if let Some(ref t) = si.t {
        t.value.clone()
    } else {
        // Rich text: concatenate all runs.
        si.r.iter().map(|r| r.t.value.as_str()).collect()
    }
}
