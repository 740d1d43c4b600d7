//! Tag substitution in word-processor templates.
//!
//! Only `word/document.xml` is rewritten. Every paragraph of the body is
//! reached, including those in table cells, nested tables and text boxes.
//! In [`MatchMode::Run`] each run is substituted on its own, so a tag that
//! Word split across two runs is left untouched.

use super::package::Package;
use super::tags::{find_tags, replace_tags, tag_for, TAG_OPEN};
use super::value::DocumentData;
use super::xml::{Element, Node, XmlDocument};
use super::{MatchMode, RenderOptions, TemplateError};

pub const DOCUMENT_PART: &str = "word/document.xml";

/// Rows to clone from a template table row.
///
/// Every table row whose text contains `{{marker}}` is repeated once per
/// entry in `rows`, each copy filled from its own entry. No entries removes
/// the row.
#[derive(Debug, Clone, Default)]
pub struct RowSet {
    pub marker: String,
    pub rows: Vec<DocumentData>,
}

impl RowSet {
    pub fn new(marker: impl Into<String>, rows: Vec<DocumentData>) -> Self {
        Self {
            marker: marker.into(),
            rows,
        }
    }
}

pub fn render_docx(
    template: &[u8],
    data: &DocumentData,
    row_sets: &[RowSet],
    options: RenderOptions,
) -> Result<Vec<u8>, TemplateError> {
    let mut package = Package::read(template)?;
    let mut doc = XmlDocument::parse_bytes(package.require(DOCUMENT_PART)?)?;
    let root = doc.root_mut();

    for set in row_sets {
        expand_rows(root, set, options.mode);
    }
    substitute(root, data, options.mode);

    if options.strict {
        let left = unresolved_tags(root);
        if !left.is_empty() {
            return Err(TemplateError::UnresolvedTags(left));
        }
    }

    package.set_part(DOCUMENT_PART, doc.to_bytes()?);
    package.write()
}

/// Paragraph texts and structure counts of a rendered document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocxSummary {
    pub paragraphs: usize,
    pub tables: usize,
    pub rows: usize,
    pub texts: Vec<String>,
}

pub fn inspect_docx(bytes: &[u8]) -> Result<DocxSummary, TemplateError> {
    let package = Package::read(bytes)?;
    let mut doc = XmlDocument::parse_bytes(package.require(DOCUMENT_PART)?)?;
    let root = doc.root_mut();
    let mut texts = Vec::new();
    root.visit_all_mut("w:p", &mut |p| texts.push(paragraph_text(p)));
    Ok(DocxSummary {
        paragraphs: root.count("w:p"),
        tables: root.count("w:tbl"),
        rows: root.count("w:tr"),
        texts,
    })
}

pub(crate) fn substitute(el: &mut Element, data: &DocumentData, mode: MatchMode) {
    match mode {
        MatchMode::Run => el.visit_all_mut("w:r", &mut |run| substitute_run(run, data)),
        MatchMode::Paragraph => {
            el.visit_all_mut("w:p", &mut |p| substitute_paragraph(p, data))
        }
    }
}

fn substitute_run(run: &mut Element, data: &DocumentData) {
    let text = run_text(run);
    if !text.contains(TAG_OPEN) {
        return;
    }
    let replaced = replace_tags(&text, data);
    if replaced != text {
        set_run_text(run, &replaced);
    }
}

fn substitute_paragraph(p: &mut Element, data: &DocumentData) {
    let mut runs = Vec::new();
    collect_runs(p, &mut runs);
    let full: String = runs.iter().map(|r| run_text(r)).collect();
    if !full.contains(TAG_OPEN) {
        return;
    }
    let replaced = replace_tags(&full, data);
    if replaced == full {
        return;
    }

    let mut written = false;
    for run in runs {
        if !has_text_children(run) {
            continue;
        }
        if written {
            set_run_text(run, "");
        } else {
            set_run_text(run, &replaced);
            written = true;
        }
    }
}

fn expand_rows(root: &mut Element, set: &RowSet, mode: MatchMode) {
    let tag = tag_for(&set.marker);
    root.visit_all_mut("w:tbl", &mut |tbl| {
        let matches = |el: &Element| el.is("w:tr") && own_text(el, "w:tbl").contains(&tag);
        if !tbl.elements().any(matches) {
            return;
        }
        let old = std::mem::take(&mut tbl.children);
        for node in old {
            match node {
                Node::Element(tr) if matches(&tr) => {
                    for row_data in &set.rows {
                        let mut copy = tr.clone();
                        substitute(&mut copy, row_data, mode);
                        tbl.children.push(Node::Element(copy));
                    }
                }
                other => tbl.children.push(other),
            }
        }
    });
}

fn unresolved_tags(root: &mut Element) -> Vec<String> {
    let mut left = Vec::new();
    root.visit_all_mut("w:p", &mut |p| {
        for key in find_tags(&paragraph_text(p)) {
            if !left.contains(&key) {
                left.push(key);
            }
        }
    });
    left
}

fn paragraph_text(p: &mut Element) -> String {
    let mut runs = Vec::new();
    collect_runs(p, &mut runs);
    runs.iter().map(|r| run_text(r)).collect()
}

/// Runs belonging to this paragraph, not to paragraphs nested inside it.
fn collect_runs<'a>(el: &'a mut Element, out: &mut Vec<&'a mut Element>) {
    for child in el.elements_mut() {
        if child.is("w:r") {
            out.push(child);
        } else if !child.is("w:p") {
            collect_runs(child, out);
        }
    }
}

/// Text of `el` ignoring anything inside `skip` descendants.
fn own_text(el: &Element, skip: &str) -> String {
    let mut out = String::new();
    for child in &el.children {
        match child {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) if !e.is(skip) => out.push_str(&own_text(e, skip)),
            _ => {}
        }
    }
    out
}

fn is_text_child(el: &Element) -> bool {
    match el.name.as_str() {
        "w:t" | "w:tab" | "w:cr" => true,
        "w:br" => matches!(el.attr("w:type"), None | Some("textWrapping")),
        _ => false,
    }
}

fn has_text_children(run: &Element) -> bool {
    run.elements().any(is_text_child)
}

/// Visible text of a single run.
fn run_text(run: &Element) -> String {
    let mut out = String::new();
    for child in run.elements() {
        match child.name.as_str() {
            "w:t" => out.push_str(&child.text_content()),
            "w:tab" => out.push('\t'),
            "w:br" | "w:cr" if is_text_child(child) => out.push('\n'),
            _ => {}
        }
    }
    out
}

/// Swaps the run's text children for `text`, placed where the first of them
/// was. Properties and other content stay.
fn set_run_text(run: &mut Element, text: &str) {
    let first = run
        .children
        .iter()
        .position(|n| matches!(n, Node::Element(e) if is_text_child(e)));
    let Some(first) = first else {
        return;
    };

    let old = std::mem::take(&mut run.children);
    for (i, node) in old.into_iter().enumerate() {
        if i == first {
            run.children.extend(text_nodes(text));
        }
        match node {
            Node::Element(ref e) if is_text_child(e) => {}
            other => run.children.push(other),
        }
    }
}

fn text_nodes(text: &str) -> Vec<Node> {
    let mut nodes = Vec::new();
    for (li, line) in text.split('\n').enumerate() {
        if li > 0 {
            nodes.push(Node::Element(Element::new("w:br")));
        }
        for (ti, segment) in line.split('\t').enumerate() {
            if ti > 0 {
                nodes.push(Node::Element(Element::new("w:tab")));
            }
            if !segment.is_empty() {
                nodes.push(Node::Element(text_element(segment)));
            }
        }
    }
    if nodes.is_empty() {
        nodes.push(Node::Element(Element::new("w:t")));
    }
    nodes
}

fn text_element(segment: &str) -> Element {
    let mut t = Element::with_text("w:t", segment);
    if segment.starts_with(char::is_whitespace) || segment.ends_with(char::is_whitespace) {
        t.set_attr("xml:space", "preserve");
    }
    t
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::value::TagValue;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;

    fn docx(body: &str) -> Vec<u8> {
        fixtures::document(body)
    }

    fn data(pairs: &[(&str, &str)]) -> DocumentData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), TagValue::text(*v)))
            .collect()
    }

    fn para(runs: &[&str]) -> String {
        let runs: String = runs
            .iter()
            .map(|t| format!(r#"<w:r><w:rPr><w:b/></w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#, t))
            .collect();
        format!("<w:p>{}</w:p>", runs)
    }

    fn document_xml(bytes: &[u8]) -> String {
        let package = Package::read(bytes).unwrap();
        String::from_utf8(package.part(DOCUMENT_PART).unwrap().to_vec()).unwrap()
    }

    #[test]
    fn test_run_substitution_keeps_formatting() {
        let template = docx(&para(&["Номер: {{НОМЕРТТН}} от {{ДАТА}}"]));
        let out = render_docx(
            &template,
            &data(&[("НОМЕРТТН", "ТТН-000007")]),
            &[],
            RenderOptions::default(),
        )
        .unwrap();

        let xml = document_xml(&out);
        assert!(xml.contains("<w:b/>"));
        let summary = inspect_docx(&out).unwrap();
        assert_eq!(summary.texts, vec!["Номер: ТТН-000007 от {{ДАТА}}"]);
    }

    #[test]
    fn test_split_tag_is_missed_in_run_mode_but_found_in_paragraph_mode() {
        let template = docx(&para(&["Период: {{ПЕРИОД ", "ПРОЕЗДА}}."]));
        let d = data(&[("ПЕРИОД ПРОЕЗДА", "с 10.01.2025 по 20.01.2025")]);

        let run_mode = render_docx(&template, &d, &[], RenderOptions::default()).unwrap();
        assert_eq!(
            inspect_docx(&run_mode).unwrap().texts,
            vec!["Период: {{ПЕРИОД ПРОЕЗДА}}."]
        );

        let options = RenderOptions {
            mode: MatchMode::Paragraph,
            ..RenderOptions::default()
        };
        let para_mode = render_docx(&template, &d, &[], options).unwrap();
        assert_eq!(
            inspect_docx(&para_mode).unwrap().texts,
            vec!["Период: с 10.01.2025 по 20.01.2025."]
        );
        assert_eq!(inspect_docx(&para_mode).unwrap().paragraphs, 1);
    }

    #[test]
    fn test_table_cells_are_substituted() {
        let table = format!(
            "<w:tbl><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>",
            para(&["Накладная"]),
            para(&["№ {{НОМЕРТТН}} (копия)"])
        );
        let template = docx(&table);
        let out = render_docx(
            &template,
            &data(&[("НОМЕРТТН", "ТТН-000007")]),
            &[],
            RenderOptions::default(),
        )
        .unwrap();
        let summary = inspect_docx(&out).unwrap();
        assert_eq!(summary.texts, vec!["Накладная", "№ ТТН-000007 (копия)"]);
        assert_eq!(summary.tables, 1);
        assert_eq!(summary.paragraphs, 2);
    }

    #[test]
    fn test_row_set_replicates_and_removes_rows() {
        let table = format!(
            "<w:tbl><w:tr><w:tc>{}</w:tc></w:tr><w:tr><w:tc>{}</w:tc><w:tc>{}</w:tc></w:tr></w:tbl>{}",
            para(&["ФИО"]),
            para(&["{{№}}"]),
            para(&["{{СОТРУДНИК}}"]),
            para(&["Всего: {{ВСЕГО}}"])
        );
        let template = docx(&table);
        let rows = vec![
            data(&[("№", "1"), ("СОТРУДНИК", "Иванов И.И.")]),
            data(&[("№", "2"), ("СОТРУДНИК", "Петров П.П.")]),
        ];
        let out = render_docx(
            &template,
            &data(&[("ВСЕГО", "2")]),
            &[RowSet::new("СОТРУДНИК", rows)],
            RenderOptions::default(),
        )
        .unwrap();
        let summary = inspect_docx(&out).unwrap();
        assert_eq!(summary.rows, 3);
        assert_eq!(
            summary.texts,
            vec!["ФИО", "1", "Иванов И.И.", "2", "Петров П.П.", "Всего: 2"]
        );

        let emptied = render_docx(
            &template,
            &DocumentData::new(),
            &[RowSet::new("СОТРУДНИК", Vec::new())],
            RenderOptions::default(),
        )
        .unwrap();
        assert_eq!(inspect_docx(&emptied).unwrap().rows, 1);
    }

    #[test]
    fn test_strict_mode_reports_leftovers() {
        let template = docx(&para(&["{{A}} {{B}}"]));
        let options = RenderOptions {
            strict: true,
            ..RenderOptions::default()
        };
        match render_docx(&template, &data(&[("A", "1")]), &[], options) {
            Err(TemplateError::UnresolvedTags(keys)) => assert_eq!(keys, vec!["B".to_string()]),
            other => panic!("unexpected result: {:?}", other.map(|b| b.len())),
        }
        assert!(render_docx(&template, &data(&[("A", "1"), ("B", "2")]), &[], options).is_ok());
    }

    #[test]
    fn test_tabs_breaks_and_escaping() {
        let template = docx(&para(&["{{X}}"]));
        let out = render_docx(
            &template,
            &data(&[("X", " a\tb\n<c> & d")]),
            &[],
            RenderOptions::default(),
        )
        .unwrap();
        let xml = document_xml(&out);
        assert!(xml.contains(r#"<w:t xml:space="preserve"> a</w:t><w:tab/><w:t>b</w:t><w:br/><w:t>&lt;c&gt; &amp; d</w:t>"#));
        assert_eq!(inspect_docx(&out).unwrap().texts, vec![" a\tb\n<c> & d"]);
    }

    #[test]
    fn test_output_is_deterministic() {
        let template = docx(&para(&["{{A}}-{{B}}"]));
        let d = data(&[("B", "2"), ("A", "1")]);
        let first = render_docx(&template, &d, &[], RenderOptions::default()).unwrap();
        let second = render_docx(&template, &d, &[], RenderOptions::default()).unwrap();
        assert_eq!(document_xml(&first), document_xml(&second));
    }

    #[test]
    fn test_missing_document_part() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("word/styles.xml", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"<w:styles/>").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(
            render_docx(&bytes, &DocumentData::new(), &[], RenderOptions::default()),
            Err(TemplateError::MissingPart(_))
        ));
    }
}
