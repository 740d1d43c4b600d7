//! Tag substitution in spreadsheet templates.
//!
//! Only the active worksheet is rewritten. String cells are substituted
//! whether they point into the shared-string table or hold an inline string;
//! a changed shared-string cell is rewritten as an inline string so other
//! cells using the same entry keep their text.

use std::collections::{BTreeMap, HashMap};

use super::package::Package;
use super::tags::{find_tags, replace_tags, TAG_OPEN};
use super::value::DocumentData;
use super::xml::{Element, Node, XmlDocument};
use super::{RenderOptions, TemplateError};

pub const WORKBOOK_PART: &str = "xl/workbook.xml";
pub const WORKBOOK_RELS_PART: &str = "xl/_rels/workbook.xml.rels";
pub const SHARED_STRINGS_PART: &str = "xl/sharedStrings.xml";
pub const CONTENT_TYPES_PART: &str = "[Content_Types].xml";

const WORKSHEET_REL_TYPE: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const WORKSHEET_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";

/// Sheet-level elements that point at relationships of the source sheet.
const REL_BOUND_ELEMENTS: &[&str] = &[
    "drawing",
    "legacyDrawing",
    "legacyDrawingHF",
    "picture",
    "oleObjects",
    "controls",
    "tableParts",
    "hyperlinks",
];

pub fn render_xlsx(
    template: &[u8],
    data: &DocumentData,
    options: RenderOptions,
) -> Result<Vec<u8>, TemplateError> {
    let mut package = Package::read(template)?;
    let workbook = Workbook::load(&package)?;
    let sheet = workbook.active_sheet()?;
    let shared = shared_strings(&package)?;

    let mut doc = XmlDocument::parse_bytes(package.require(&sheet.path)?)?;
    let cell_name = qualified(prefix_of(doc.root()), "c");
    let mut left: Vec<String> = Vec::new();

    doc.root_mut().visit_all_mut(&cell_name, &mut |cell| {
        let Some(text) = cell_string(cell, &shared) else {
            return;
        };
        if !text.contains(TAG_OPEN) {
            return;
        }
        let replaced = replace_tags(&text, data);
        if replaced != text {
            set_inline_string(cell, &replaced);
        }
        if options.strict {
            for key in find_tags(&replaced) {
                if !left.contains(&key) {
                    left.push(key);
                }
            }
        }
    });

    if !left.is_empty() {
        return Err(TemplateError::UnresolvedTags(left));
    }

    package.set_part(&sheet.path, doc.to_bytes()?);
    package.write()
}

/// Sheet titles and the displayed values of one sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XlsxSummary {
    pub sheets: Vec<String>,
    pub sheet: String,
    /// Cell reference (`A1`) to displayed text.
    pub cells: BTreeMap<String, String>,
}

/// Reads the active sheet, or the sheet titled `sheet` when given.
pub fn inspect_xlsx(bytes: &[u8], sheet: Option<&str>) -> Result<XlsxSummary, TemplateError> {
    let package = Package::read(bytes)?;
    let workbook = Workbook::load(&package)?;
    let target = match sheet {
        Some(name) => workbook
            .sheets
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| TemplateError::Malformed(format!("no sheet named {}", name)))?,
        None => workbook.active_sheet()?,
    };
    let shared = shared_strings(&package)?;
    let mut doc = XmlDocument::parse_bytes(package.require(&target.path)?)?;
    let cell_name = qualified(prefix_of(doc.root()), "c");

    let mut cells = BTreeMap::new();
    doc.root_mut().visit_all_mut(&cell_name, &mut |cell| {
        let Some(reference) = cell.attr("r").map(str::to_string) else {
            return;
        };
        let value = cell_string(cell, &shared)
            .or_else(|| child_local(cell, "v").map(Element::text_content));
        if let Some(value) = value {
            cells.insert(reference, value);
        }
    });

    Ok(XlsxSummary {
        sheets: workbook.sheets.iter().map(|s| s.name.clone()).collect(),
        sheet: target.name.clone(),
        cells,
    })
}

/// Copies the last worksheet into a new sheet titled `title`, writes `cells`
/// into the copy and registers it with the workbook. Returns the new package
/// and the title actually used (a suffix is added when `title` is taken).
///
/// Values that parse as numbers are written as numbers, anything else as an
/// inline string. Drawings, tables and other relationship-bound content of
/// the source sheet are not carried over.
pub fn append_sheet_copy(
    bytes: &[u8],
    title: &str,
    cells: &[(&str, String)],
) -> Result<(Vec<u8>, String), TemplateError> {
    let mut package = Package::read(bytes)?;
    let workbook = Workbook::load(&package)?;
    let source = workbook
        .sheets
        .last()
        .ok_or_else(|| TemplateError::Malformed("workbook has no sheets".to_string()))?;
    let title = workbook.unique_title(title);

    let existing: Vec<String> = package.names().map(str::to_string).collect();
    let mut n = workbook.sheets.len() + 1;
    while existing.contains(&format!("xl/worksheets/sheet{}.xml", n)) {
        n += 1;
    }
    let part = format!("xl/worksheets/sheet{}.xml", n);

    let mut sheet = XmlDocument::parse_bytes(package.require(&source.path)?)?;
    strip_relationship_content(sheet.root_mut());
    for (reference, value) in cells {
        set_cell_value(sheet.root_mut(), reference, value)?;
    }
    package.set_part(&part, sheet.to_bytes()?);

    let mut rels = XmlDocument::parse_bytes(package.require(WORKBOOK_RELS_PART)?)?;
    let rel_id = next_rel_id(rels.root());
    let rel_type = rels
        .root()
        .elements()
        .filter_map(|r| r.attr("Type"))
        .find(|t| t.ends_with("/worksheet"))
        .unwrap_or(WORKSHEET_REL_TYPE)
        .to_string();
    let mut rel = Element::new(qualified(prefix_of(rels.root()), "Relationship"));
    rel.set_attr("Id", rel_id.as_str());
    rel.set_attr("Type", rel_type);
    rel.set_attr("Target", format!("worksheets/sheet{}.xml", n));
    rels.root_mut().children.push(Node::Element(rel));
    package.set_part(WORKBOOK_RELS_PART, rels.to_bytes()?);

    let mut wb = XmlDocument::parse_bytes(package.require(WORKBOOK_PART)?)?;
    let wb_prefix = prefix_of(wb.root()).to_string();
    let sheets = child_local_mut(wb.root_mut(), "sheets")
        .ok_or_else(|| TemplateError::Malformed("workbook has no sheet list".to_string()))?;
    let id_key = sheets
        .elements()
        .flat_map(|s| s.attrs.iter())
        .map(|(k, _)| k.clone())
        .find(|k| k.ends_with(":id"))
        .unwrap_or_else(|| "r:id".to_string());
    let next_sheet_id = workbook.sheets.iter().map(|s| s.sheet_id).max().unwrap_or(0) + 1;
    let mut entry = Element::new(qualified(&wb_prefix, "sheet"));
    entry.set_attr("name", title.as_str());
    entry.set_attr("sheetId", next_sheet_id.to_string());
    entry.set_attr(&id_key, rel_id);
    sheets.children.push(Node::Element(entry));
    package.set_part(WORKBOOK_PART, wb.to_bytes()?);

    let mut types = XmlDocument::parse_bytes(package.require(CONTENT_TYPES_PART)?)?;
    let part_name = format!("/{}", part);
    let registered = types
        .root()
        .elements()
        .any(|e| e.attr("PartName") == Some(part_name.as_str()));
    if !registered {
        let mut over = Element::new(qualified(prefix_of(types.root()), "Override"));
        over.set_attr("PartName", part_name);
        over.set_attr("ContentType", WORKSHEET_CONTENT_TYPE);
        types.root_mut().children.push(Node::Element(over));
        package.set_part(CONTENT_TYPES_PART, types.to_bytes()?);
    }

    Ok((package.write()?, title))
}

#[derive(Debug, Clone)]
struct SheetRef {
    name: String,
    sheet_id: u32,
    path: String,
}

#[derive(Debug, Clone)]
struct Workbook {
    sheets: Vec<SheetRef>,
    active: usize,
}

impl Workbook {
    fn load(package: &Package) -> Result<Self, TemplateError> {
        let wb = XmlDocument::parse_bytes(package.require(WORKBOOK_PART)?)?;
        let rels = XmlDocument::parse_bytes(package.require(WORKBOOK_RELS_PART)?)?;

        let targets: HashMap<&str, &str> = rels
            .root()
            .elements()
            .filter(|r| r.local_name() == "Relationship")
            .filter_map(|r| Some((r.attr("Id")?, r.attr("Target")?)))
            .collect();

        let active = child_local(wb.root(), "bookViews")
            .and_then(|views| child_local(views, "workbookView"))
            .and_then(|view| view.attr("activeTab"))
            .and_then(|tab| tab.parse::<usize>().ok())
            .unwrap_or(0);

        let list = child_local(wb.root(), "sheets")
            .ok_or_else(|| TemplateError::Malformed("workbook has no sheet list".to_string()))?;
        let mut sheets = Vec::new();
        for sheet in list.elements().filter(|e| e.local_name() == "sheet") {
            let rel_id = sheet
                .attrs
                .iter()
                .find(|(k, _)| k.ends_with(":id"))
                .map(|(_, v)| v.as_str())
                .ok_or_else(|| TemplateError::Malformed("sheet without relationship".to_string()))?;
            let target = targets.get(rel_id).ok_or_else(|| {
                TemplateError::Malformed(format!("unknown sheet relationship {}", rel_id))
            })?;
            sheets.push(SheetRef {
                name: sheet.attr("name").unwrap_or_default().to_string(),
                sheet_id: sheet
                    .attr("sheetId")
                    .and_then(|id| id.parse().ok())
                    .unwrap_or(0),
                path: resolve_target(target),
            });
        }

        Ok(Self { sheets, active })
    }

    fn active_sheet(&self) -> Result<&SheetRef, TemplateError> {
        self.sheets
            .get(self.active)
            .or_else(|| self.sheets.first())
            .ok_or_else(|| TemplateError::Malformed("workbook has no sheets".to_string()))
    }

    /// Sheet names compare case-insensitively in spreadsheet applications.
    fn unique_title(&self, title: &str) -> String {
        let taken = |candidate: &str| {
            self.sheets
                .iter()
                .any(|s| s.name.to_lowercase() == candidate.to_lowercase())
        };
        if !taken(title) {
            return title.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{} ({})", title, n);
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn resolve_target(target: &str) -> String {
    match target.strip_prefix('/') {
        Some(absolute) => absolute.to_string(),
        None => format!("xl/{}", target),
    }
}

fn next_rel_id(rels: &Element) -> String {
    let ids: Vec<&str> = rels.elements().filter_map(|r| r.attr("Id")).collect();
    let mut n = ids.len() + 1;
    while ids.contains(&format!("rId{}", n).as_str()) {
        n += 1;
    }
    format!("rId{}", n)
}

fn shared_strings(package: &Package) -> Result<Vec<String>, TemplateError> {
    let Some(bytes) = package.part(SHARED_STRINGS_PART) else {
        return Ok(Vec::new());
    };
    let doc = XmlDocument::parse_bytes(bytes)?;
    Ok(doc
        .root()
        .elements()
        .filter(|e| e.local_name() == "si")
        .map(rich_text)
        .collect())
}

/// Text of an `si`/`is` item: plain `t` plus rich-text runs, no phonetic hints.
fn rich_text(item: &Element) -> String {
    let mut out = String::new();
    for child in item.elements() {
        match child.local_name() {
            "t" => out.push_str(&child.text_content()),
            "r" => {
                if let Some(t) = child_local(child, "t") {
                    out.push_str(&t.text_content());
                }
            }
            _ => {}
        }
    }
    out
}

fn cell_string(cell: &Element, shared: &[String]) -> Option<String> {
    match cell.attr("t") {
        Some("s") => {
            let index: usize = child_local(cell, "v")?.text_content().trim().parse().ok()?;
            shared.get(index).cloned()
        }
        Some("inlineStr") => child_local(cell, "is").map(rich_text),
        _ => None,
    }
}

fn set_inline_string(cell: &mut Element, text: &str) {
    let prefix = prefix_of(cell).to_string();
    cell.set_attr("t", "inlineStr");
    clear_value(cell);

    let mut t = Element::with_text(qualified(&prefix, "t"), text);
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    let mut is = Element::new(qualified(&prefix, "is"));
    is.children.push(Node::Element(t));
    insert_before_ext(cell, is);
}

fn set_number(cell: &mut Element, number: &str) {
    let prefix = prefix_of(cell).to_string();
    cell.remove_attr("t");
    clear_value(cell);
    insert_before_ext(cell, Element::with_text(qualified(&prefix, "v"), number));
}

fn clear_value(cell: &mut Element) {
    cell.children.retain(|n| match n {
        Node::Element(e) => !matches!(e.local_name(), "f" | "v" | "is"),
        _ => true,
    });
}

fn insert_before_ext(cell: &mut Element, el: Element) {
    let at = cell
        .children
        .iter()
        .position(|n| matches!(n, Node::Element(e) if e.local_name() == "extLst"))
        .unwrap_or(cell.children.len());
    cell.children.insert(at, Node::Element(el));
}

fn strip_relationship_content(root: &mut Element) {
    root.children.retain(|n| match n {
        Node::Element(e) => !REL_BOUND_ELEMENTS.contains(&e.local_name()),
        _ => true,
    });
    for child in root.elements_mut() {
        match child.local_name() {
            "pageSetup" => child.attrs.retain(|(k, _)| !k.ends_with(":id")),
            "sheetViews" => {
                for view in child.elements_mut() {
                    view.remove_attr("tabSelected");
                }
            }
            _ => {}
        }
    }
}

/// Splits `F5` into (`F`, 5).
fn split_reference(reference: &str) -> Result<(String, u32), TemplateError> {
    let col: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    let row = reference[col.len()..].parse::<u32>().ok();
    match row {
        Some(row) if !col.is_empty() && row > 0 => Ok((col, row)),
        _ => Err(TemplateError::Malformed(format!(
            "invalid cell reference {}",
            reference
        ))),
    }
}

fn column_key(reference: &str) -> (usize, String) {
    let col: String = reference
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();
    (col.len(), col)
}

fn set_cell_value(root: &mut Element, reference: &str, value: &str) -> Result<(), TemplateError> {
    let (col, row_number) = split_reference(reference)?;
    let reference = format!("{}{}", col, row_number);
    let prefix = prefix_of(root).to_string();
    let sheet_data = child_local_mut(root, "sheetData")
        .ok_or_else(|| TemplateError::Malformed("worksheet has no sheetData".to_string()))?;

    let row_of = |n: &Node| match n {
        Node::Element(e) if e.local_name() == "row" => {
            e.attr("r").and_then(|r| r.parse::<u32>().ok())
        }
        _ => None,
    };
    let row_index = match sheet_data
        .children
        .iter()
        .position(|n| row_of(n) == Some(row_number))
    {
        Some(i) => i,
        None => {
            let at = sheet_data
                .children
                .iter()
                .position(|n| row_of(n).is_some_and(|r| r > row_number))
                .unwrap_or(sheet_data.children.len());
            let mut row = Element::new(qualified(&prefix, "row"));
            row.set_attr("r", row_number.to_string());
            sheet_data.children.insert(at, Node::Element(row));
            at
        }
    };
    let row = element_at(&mut sheet_data.children, row_index)?;
    row.remove_attr("spans");

    let wanted = column_key(&reference);
    let ref_of = |n: &Node| match n {
        Node::Element(e) if e.local_name() == "c" => e.attr("r").map(column_key),
        _ => None,
    };
    let cell_index = match row
        .children
        .iter()
        .position(|n| ref_of(n).as_ref() == Some(&wanted))
    {
        Some(i) => i,
        None => {
            let at = row
                .children
                .iter()
                .position(|n| ref_of(n).is_some_and(|k| k > wanted))
                .unwrap_or(row.children.len());
            let mut cell = Element::new(qualified(&prefix, "c"));
            cell.set_attr("r", reference.as_str());
            row.children.insert(at, Node::Element(cell));
            at
        }
    };
    let cell = element_at(&mut row.children, cell_index)?;

    let trimmed = value.trim();
    let normalized = trimmed.replace(',', ".");
    if !trimmed.is_empty() && normalized.parse::<f64>().is_ok() {
        set_number(cell, &normalized);
    } else {
        set_inline_string(cell, value);
    }
    Ok(())
}

fn element_at(children: &mut [Node], index: usize) -> Result<&mut Element, TemplateError> {
    match children.get_mut(index) {
        Some(Node::Element(e)) => Ok(e),
        _ => Err(TemplateError::Malformed("expected an element".to_string())),
    }
}

fn prefix_of(el: &Element) -> &str {
    el.name.rsplit_once(':').map(|(p, _)| p).unwrap_or("")
}

fn qualified(prefix: &str, local: &str) -> String {
    if prefix.is_empty() {
        local.to_string()
    } else {
        format!("{}:{}", prefix, local)
    }
}

fn child_local<'a>(el: &'a Element, local: &str) -> Option<&'a Element> {
    el.elements().find(|e| e.local_name() == local)
}

fn child_local_mut<'a>(el: &'a mut Element, local: &str) -> Option<&'a mut Element> {
    el.elements_mut().find(|e| e.local_name() == local)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    /// Minimal two-sheet workbook; the second sheet is active.
    pub fn workbook(first: &str, second: &str, shared: &[&str]) -> Vec<u8> {
        let sst: String = shared
            .iter()
            .map(|s| format!("<si><t xml:space=\"preserve\">{}</t></si>", s))
            .collect();
        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/><Override PartName="/xl/worksheets/sheet2.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><bookViews><workbookView activeTab="1"/></bookViews><sheets><sheet name="Итоги" sheetId="1" r:id="rId1"/><sheet name="Заявка" sheetId="2" r:id="rId2"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="/xl/worksheets/sheet2.xml"/><Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/sharedStrings" Target="sharedStrings.xml"/></Relationships>"#.to_string(),
            ),
            ("xl/worksheets/sheet1.xml", sheet(first)),
            ("xl/worksheets/sheet2.xml", sheet(second)),
            (
                "xl/sharedStrings.xml",
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" count="{0}" uniqueCount="{0}">{1}</sst>"#,
                    shared.len(),
                    sst
                ),
            ),
        ];

        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, body) in parts.iter() {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(body.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn sheet(rows: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheetViews><sheetView tabSelected="1" workbookViewId="0"/></sheetViews><sheetData>{}</sheetData><pageMargins left="0.7" right="0.7" top="0.75" bottom="0.75" header="0.3" footer="0.3"/><drawing r:id="rId1"/></worksheet>"#,
            rows
        )
    }
}
