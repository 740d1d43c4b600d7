mod common;

#[cfg(test)]
mod document_generation_tests {
    use std::path::Path;
    use std::sync::Arc;

    use transport_admin_server::documents::docx::{inspect_docx, render_docx};
    use transport_admin_server::documents::{
        adapt, DocumentData, DocumentGenerator, DocumentKind, GeneratorError, RawFields,
        RenderOptions, TagValue,
    };
    use transport_admin_server::storage::{FileStorage, LocalStorage};

    use crate::common::{docx, paragraph, table};

    fn storage(root: &Path) -> Arc<dyn FileStorage> {
        let storage = LocalStorage::new(root);
        storage.ensure_layout().unwrap();
        Arc::new(storage)
    }

    fn count_files(dir: &Path) -> usize {
        if !dir.exists() {
            return 0;
        }
        std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| {
                let path = entry.unwrap().path();
                if path.is_dir() {
                    count_files(&path)
                } else {
                    1
                }
            })
            .sum()
    }

    fn ttn_fields() -> RawFields {
        RawFields::new()
            .with("date", "2025-03-01")
            .with("number", "ТТН-000007")
            .with("sender_organization", "ООО Вектор")
    }

    #[test]
    fn test_pass_request_period_and_posts() {
        let mut fields = RawFields::new()
            .with("request_type", "auto")
            .with("start_date", "2025-01-10")
            .with("end_date", "2025-01-20");
        fields.push("posts", "Пост №1");
        fields.push("posts", "Пост №2");

        let adapted = adapt(DocumentKind::PassRequest, &fields).unwrap();
        assert_eq!(
            adapted.data["ПЕРИОД ПРОЕЗДА"].render(),
            "с 10.01.2025 по 20.01.2025"
        );
        assert_eq!(adapted.data["ПЕРЕЧЕНЬ ПОСТОВ"].render(), "Пост №1, Пост №2");

        // Same input, same mapping.
        let again = adapt(DocumentKind::PassRequest, &fields).unwrap();
        assert_eq!(adapted.data, again.data);
    }

    #[test]
    fn test_tag_in_table_cell_keeps_static_text() {
        let template = docx(&format!(
            "{}{}",
            paragraph("Товарно-транспортная накладная"),
            table(&["Номер: {{НОМЕРТТН}} от", "{{НЕИЗВЕСТНО}}"])
        ));
        let mut data = DocumentData::new();
        data.insert("НОМЕРТТН".to_string(), TagValue::text("ТТН-000007"));

        let rendered = render_docx(&template, &data, &[], RenderOptions::default()).unwrap();
        let summary = inspect_docx(&rendered).unwrap();
        assert!(summary.texts.contains(&"Номер: ТТН-000007 от".to_string()));
        assert!(summary.texts.contains(&"{{НЕИЗВЕСТНО}}".to_string()));

        let original = inspect_docx(&template).unwrap();
        assert_eq!(summary.paragraphs, original.paragraphs);
        assert_eq!(summary.tables, original.tables);
        assert_eq!(summary.rows, original.rows);
    }

    #[test]
    fn test_generator_stores_filled_document() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let template = docx(&table(&["{{НОМЕРТТН}}", "{{ДАТАСОСТАВЛЕНИЯ}}"]));
        let template_path = storage.save_template(&template, "ttn.docx", "ttn").unwrap();

        let generator = DocumentGenerator::new(storage.clone(), template_path.clone());
        let document = generator.generate_ttn(&ttn_fields()).unwrap();

        assert_eq!(document.kind, DocumentKind::Ttn);
        assert!(document.path.starts_with("generated/ttn/"));
        assert!(document.filename.ends_with(".docx"));
        let summary = inspect_docx(&storage.read(&document.path).unwrap()).unwrap();
        assert!(summary.texts.contains(&"ТТН-000007".to_string()));
        assert!(summary.texts.contains(&"01.03.2025".to_string()));

        // The template itself is left untouched.
        assert_eq!(storage.read(&template_path).unwrap(), template);
    }

    #[test]
    fn test_missing_template_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let generator =
            DocumentGenerator::new(storage(dir.path()), "templates/does_not_exist.docx");

        let result = generator.generate_ttn(&ttn_fields());
        assert!(matches!(result, Err(GeneratorError::TemplateLoad { .. })));
        assert_eq!(count_files(&dir.path().join("generated")), 0);
    }

    #[test]
    fn test_unreadable_template_produces_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let path = storage
            .save_template(b"not a zip archive", "broken.docx", "ttn")
            .unwrap();

        let generator = DocumentGenerator::new(storage, path);
        assert!(matches!(
            generator.generate_ttn(&ttn_fields()),
            Err(GeneratorError::Render(_))
        ));
        assert_eq!(count_files(&dir.path().join("generated")), 0);
    }

    #[test]
    fn test_strict_mode_rejects_leftover_tags() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let template = docx(&paragraph("{{НОМЕРТТН}} / {{ОПЕЧАТКА}}"));
        let path = storage.save_template(&template, "ttn.docx", "ttn").unwrap();

        let generator = DocumentGenerator::new(storage, path).with_options(RenderOptions {
            strict: true,
            ..RenderOptions::default()
        });
        assert!(matches!(
            generator.generate_ttn(&ttn_fields()),
            Err(GeneratorError::Render(_))
        ));
        assert_eq!(count_files(&dir.path().join("generated")), 0);
    }

    #[test]
    fn test_missing_required_field_is_an_adapter_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage(dir.path());
        let path = storage
            .save_template(&docx(&paragraph("{{НОМЕРТТН}}")), "ttn.docx", "ttn")
            .unwrap();

        let generator = DocumentGenerator::new(storage, path);
        let fields = RawFields::new().with("number", "ТТН-000001");
        assert!(matches!(
            generator.generate_ttn(&fields),
            Err(GeneratorError::Adapter(_))
        ));
    }
}
