#[macro_use]
mod common;

#[cfg(test)]
mod api_integration_tests {
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, web};
    use chrono::{Duration, Local};
    use serde_json::{json, Value};
    use std::sync::Arc;

    use transport_admin_server::db::{connect, AppState};
    use transport_admin_server::documents::docx::inspect_docx;
    use transport_admin_server::documents::xlsx::inspect_xlsx;
    use transport_admin_server::storage::{FileStorage, LocalStorage};
    use transport_admin_server::AppConfig;

    use crate::common::{docx, multipart_body, paragraph, table, test_state, xlsx, FilePart};

    fn multipart_request(uri: &str, fields: &[(&str, &str)], files: &[FilePart]) -> test::TestRequest {
        let (content_type, body) = multipart_body(fields, files);
        test::TestRequest::post()
            .uri(uri)
            .insert_header((header::CONTENT_TYPE, content_type))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn test_dictionary_entry_in_use_cannot_be_deleted() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/dictionaries/departments")
            .set_json(json!({ "name": "Автоколонна" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let department: Value = test::read_body_json(resp).await;
        let department_id = department["id"].as_i64().unwrap();

        let id = department_id.to_string();
        let req = multipart_request(
            "/api/employees",
            &[("last_name", "Петров"), ("first_name", "Иван"), ("department_id", id.as_str())],
            &[],
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::delete()
            .uri(&format!("/api/dictionaries/departments/{}", department_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "InUse");

        let req = test::TestRequest::get()
            .uri("/api/dictionaries/departments")
            .to_request();
        let entries: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(entries.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_dictionary_unused_entry_is_deleted_and_unknown_kind_rejected() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/dictionaries/airports")
            .set_json(json!({ "name": "Пулково", "code": "LED" }))
            .to_request();
        let entry: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(entry["code"], "LED");

        let req = test::TestRequest::delete()
            .uri(&format!("/api/dictionaries/airports/{}", entry["id"]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/dictionaries/planets")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/dictionaries/cities")
            .set_json(json!({ "name": "   " }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_contract_numbers_are_unique() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);
        let contract = json!({
            "number": "Д-17/2025",
            "start_date": "2025-01-01",
            "end_date": "2025-12-31"
        });

        let req = test::TestRequest::post()
            .uri("/api/contracts")
            .set_json(&contract)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/contracts")
            .set_json(&contract)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::post()
            .uri("/api/contracts")
            .set_json(json!({
                "number": "Д-18/2025",
                "start_date": "2025-12-31",
                "end_date": "2025-01-01"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "ValidationError");
        assert!(!body["details"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_employee_create_validates_and_searches() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = multipart_request("/api/employees", &[("first_name", "Иван")], &[]).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["details"][0]["field"], "last_name");

        let req = multipart_request(
            "/api/employees",
            &[
                ("last_name", "Сидоров"),
                ("first_name", "Семён"),
                ("pass_number", "P-1024"),
                ("license_categories", "B"),
                ("license_categories", "C"),
            ],
            &[],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert_eq!(saved["data"]["license_categories"], "B,C");

        let req = test::TestRequest::get()
            .uri("/api/employees/search?q=P-10")
            .to_request();
        let results: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(results[0]["text"], "Сидоров Семён");

        let req = test::TestRequest::get()
            .uri(&format!("/api/employees/{}", saved["data"]["id"]))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/api/employees/9999").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_pass_request_generates_and_serves_document() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "name": "Пост №1" }))
            .to_request();
        let post: Value = test::call_and_read_body_json(&app, req).await;
        let post_id = post["id"].to_string();

        let template = docx(&format!(
            "{}{}",
            paragraph("Период: {{ПЕРИОД ПРОЕЗДА}}"),
            table(&["Посты: {{ПЕРЕЧЕНЬ ПОСТОВ}}"])
        ));
        let req = multipart_request(
            "/api/pass-requests",
            &[
                ("request_type", "auto"),
                ("formed_by", "Сидоров С.С."),
                ("start_date", "2025-01-10"),
                ("end_date", "2025-01-20"),
                ("posts", post_id.as_str()),
            ],
            &[FilePart {
                field: "template",
                filename: "pass.docx",
                bytes: &template,
            }],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert!(saved["warnings"].as_array().unwrap().is_empty());
        let generated = saved["data"]["generated_document_path"].as_str().unwrap();
        assert!(generated.starts_with("generated/pass_request/"));

        let req = test::TestRequest::get()
            .uri(&format!("/storage/{}", generated))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = test::read_body(resp).await;
        let summary = inspect_docx(&bytes).unwrap();
        assert!(summary
            .texts
            .contains(&"Период: с 10.01.2025 по 20.01.2025".to_string()));
        assert!(summary.texts.contains(&"Посты: Пост №1".to_string()));

        let req = test::TestRequest::get()
            .uri(&format!("/api/pass-requests/{}", saved["data"]["id"]))
            .to_request();
        let detail: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(detail["posts"], json!(["Пост №1"]));
    }

    #[actix_web::test]
    async fn test_pass_request_saved_when_template_is_broken() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = multipart_request(
            "/api/pass-requests",
            &[
                ("request_type", "single"),
                ("formed_by", "Иванов И.И."),
                ("start_date", "2025-02-01"),
                ("end_date", "2025-02-02"),
            ],
            &[FilePart {
                field: "template",
                filename: "pass.docx",
                bytes: b"definitely not a docx",
            }],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert!(saved["data"]["generated_document_path"].is_null());
        assert!(saved["data"]["template_path"].is_string());
        assert_eq!(saved["warnings"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get().uri("/api/pass-requests").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_ttn_numbers_are_sequential() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        for expected in ["ТТН-000001", "ТТН-000002"] {
            let req = multipart_request(
                "/api/ttns",
                &[("date", "2025-03-01"), ("cargo_weight", "12,5")],
                &[],
            )
            .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::CREATED);
            let saved: Value = test::read_body_json(resp).await;
            assert_eq!(saved["data"]["number"], expected);
        }

        let req = multipart_request("/api/ttns", &[("cargo_weight", "1")], &[]).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_ttn_document_carries_the_assigned_number() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);
        let template = docx(&table(&["Накладная {{НОМЕРТТН}}", "от {{ДАТАСОСТАВЛЕНИЯ}}"]));

        let req = multipart_request(
            "/api/ttns",
            &[("date", "2025-03-01"), ("sender_organization", "ООО Вектор")],
            &[FilePart {
                field: "template",
                filename: "ttn.docx",
                bytes: &template,
            }],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert!(saved["warnings"].as_array().unwrap().is_empty());
        assert_eq!(saved["data"]["number"], "ТТН-000001");
        let generated = saved["data"]["generated_document_path"].as_str().unwrap();
        assert!(generated.starts_with("generated/ttn/"));

        let summary = inspect_docx(&state.storage.read(generated).unwrap()).unwrap();
        assert!(summary.texts.contains(&"Накладная ТТН-000001".to_string()));
        assert!(summary.texts.contains(&"от 01.03.2025".to_string()));

        let req = test::TestRequest::get().uri("/api/ttns").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed[0]["generated_document_path"], generated);
    }

    #[actix_web::test]
    async fn test_concurrent_ttns_get_distinct_numbers() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);
        let template = docx(&paragraph("{{НОМЕРТТН}}"));
        let request = || {
            multipart_request(
                "/api/ttns",
                &[("date", "2025-03-01")],
                &[FilePart {
                    field: "template",
                    filename: "ttn.docx",
                    bytes: &template,
                }],
            )
            .to_request()
        };

        let (first, second) = futures_util::join!(
            test::call_service(&app, request()),
            test::call_service(&app, request())
        );
        assert_eq!(first.status(), StatusCode::CREATED);
        assert_eq!(second.status(), StatusCode::CREATED);
        let first: Value = test::read_body_json(first).await;
        let second: Value = test::read_body_json(second).await;

        let mut numbers = Vec::new();
        for saved in [&first, &second] {
            let number = saved["data"]["number"].as_str().unwrap().to_string();
            let path = saved["data"]["generated_document_path"].as_str().unwrap();
            let summary = inspect_docx(&state.storage.read(path).unwrap()).unwrap();
            assert_eq!(summary.texts, vec![number.clone()]);
            numbers.push(number);
        }
        numbers.sort();
        assert_eq!(numbers, vec!["ТТН-000001", "ТТН-000002"]);
    }

    #[actix_web::test]
    async fn test_charter_shift_request_fills_workbook_template() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let mut airport_ids = Vec::new();
        for (name, code) in [("Пулково", "LED"), ("Шереметьево", "SVO")] {
            let req = test::TestRequest::post()
                .uri("/api/dictionaries/airports")
                .set_json(json!({ "name": name, "code": code }))
                .to_request();
            let airport: Value = test::call_and_read_body_json(&app, req).await;
            airport_ids.push(airport["id"].to_string());
        }

        let template = xlsx(
            "Заявка",
            &[
                ("A1", "{{ОТКУДА}}"),
                ("B1", "{{КУДА}}"),
                ("A2", "Вылет: {{ДАТА ВЫЛЕТА}}"),
                ("B2", "{{ОТКУДА АВТО}}"),
            ],
        );
        let req = multipart_request(
            "/api/shift-requests/charter",
            &[
                ("flight_date", "2025-05-01"),
                ("departure_airport_id", airport_ids[0].as_str()),
                ("arrival_airport_id", airport_ids[1].as_str()),
                ("auto_delivery_from", "Вахтовый поселок"),
            ],
            &[FilePart {
                field: "template",
                filename: "charter.xlsx",
                bytes: &template,
            }],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert!(saved["warnings"].as_array().unwrap().is_empty());
        assert_eq!(saved["data"]["request_type"], "charter");
        let generated = saved["data"]["generated_document_path"].as_str().unwrap();
        assert!(generated.starts_with("generated/shift_request/"));
        assert!(generated.ends_with(".xlsx"));

        let sheet = inspect_xlsx(&state.storage.read(generated).unwrap(), None).unwrap();
        assert_eq!(sheet.cells["A1"], "Пулково");
        assert_eq!(sheet.cells["B1"], "Шереметьево");
        assert_eq!(sheet.cells["A2"], "Вылет: 01.05.2025");
        assert_eq!(sheet.cells["B2"], "Вахтовый поселок");

        let req = test::TestRequest::get().uri("/api/shift-requests").to_request();
        let listed: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(listed.as_array().unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn test_unknown_shift_request_kind_is_not_found() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = multipart_request("/api/shift-requests/cargo", &[("flight_date", "2025-05-01")], &[])
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_uniform_issue_and_requirements() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);
        let today = Local::now().date_naive();

        let req = test::TestRequest::post()
            .uri("/api/dictionaries/positions")
            .set_json(json!({ "name": "Водитель" }))
            .to_request();
        let position: Value = test::call_and_read_body_json(&app, req).await;

        let position_id = position["id"].to_string();
        let req = multipart_request(
            "/api/employees",
            &[("last_name", "Кузнецов"), ("first_name", "Олег"), ("position_id", position_id.as_str())],
            &[],
        )
        .to_request();
        let employee: Value = test::call_and_read_body_json(&app, req).await;
        let employee_id = employee["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/uniform-types")
            .set_json(json!({ "name": "Куртка зимняя", "wear_period": 12 }))
            .to_request();
        let uniform: Value = test::call_and_read_body_json(&app, req).await;
        let uniform_id = uniform["id"].as_i64().unwrap();

        let req = test::TestRequest::post()
            .uri("/api/uniforms/norms")
            .set_json(json!({
                "position_id": position["id"],
                "uniform_type_id": uniform_id,
                "quantity": 2
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/uniforms/issue")
            .set_json(json!({
                "employee_id": employee_id,
                "uniform_type_id": uniform_id,
                "issue_date": "2020-01-15"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let issued: Value = test::read_body_json(resp).await;
        assert_eq!(issued["expiry_date"], "2021-01-15");
        assert_eq!(issued["quantity"], 1);

        let req = test::TestRequest::post()
            .uri("/api/uniforms/issue")
            .set_json(json!({
                "employee_id": employee_id,
                "uniform_type_id": uniform_id,
                "issue_date": today.format("%Y-%m-%d").to_string()
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::post()
            .uri("/api/uniforms/issue")
            .set_json(json!({
                "employee_id": employee_id,
                "uniform_type_id": 999,
                "issue_date": "2025-01-15"
            }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get()
            .uri("/api/uniforms/accounting")
            .to_request();
        let accounting: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(accounting["total_issued"], 2);

        // The 2020 issue has expired; only today's item counts against a norm of two.
        let req = test::TestRequest::get()
            .uri("/api/uniforms/requirements")
            .to_request();
        let requirements: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(requirements[0]["required"], 2);
        assert_eq!(requirements[0]["issued"], 1);
        assert_eq!(requirements[0]["deficit"], 1);
    }

    #[actix_web::test]
    async fn test_expiring_report_lists_passes_in_window() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);
        let today = Local::now().date_naive();
        let soon = (today + Duration::days(10)).format("%Y-%m-%d").to_string();
        let later = (today + Duration::days(90)).format("%Y-%m-%d").to_string();

        for (last_name, pass_expiry) in [("Орлов", soon.as_str()), ("Соколов", later.as_str())] {
            let req = multipart_request(
                "/api/employees",
                &[
                    ("last_name", last_name),
                    ("first_name", "Пётр"),
                    ("pass_expiry", pass_expiry),
                    ("medical_exam_not_required", "on"),
                    ("psychiatric_exam_not_required", "on"),
                ],
                &[],
            )
            .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::get()
            .uri("/api/reports/expiring?days=30")
            .to_request();
        let report: Value = test::call_and_read_body_json(&app, req).await;
        let employees = report["employees"].as_array().unwrap();
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0]["kind"], "pass");
        assert_eq!(employees[0]["days_left"], 10);

        let req = test::TestRequest::get()
            .uri("/api/reports/expiring?days=-1")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_checklist_form_edit_and_fill() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/checklists/forms")
            .set_json(json!({
                "name": "Осмотр автобуса",
                "form_structure": { "items": ["Шины", "Огнетушитель"] }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let form: Value = test::read_body_json(resp).await;
        assert_eq!(form["form_structure"]["items"][1], "Огнетушитель");

        let req = test::TestRequest::put()
            .uri(&format!("/api/checklists/forms/{}", form["id"]))
            .set_json(json!({ "name": "Предрейсовый осмотр" }))
            .to_request();
        let updated: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(updated["name"], "Предрейсовый осмотр");
        assert_eq!(updated["form_structure"], json!({}));

        let req = test::TestRequest::put()
            .uri("/api/checklists/forms/999")
            .set_json(json!({ "name": "Нет такой" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post()
            .uri("/api/checklists")
            .set_json(json!({
                "form_id": form["id"],
                "filled_data": { "Шины": true },
                "created_by": "Механик Иванов"
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let checklist: Value = test::read_body_json(resp).await;
        assert_eq!(checklist["form_name"], "Предрейсовый осмотр");

        let req = test::TestRequest::post()
            .uri("/api/checklists")
            .set_json(json!({ "form_id": 999, "created_by": "Механик Иванов" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/checklists")
            .set_json(json!({ "form_id": form["id"], "filled_data": 5, "created_by": "Иванов" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_electricity_readings_without_workbook() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = multipart_request(
            "/api/electricity",
            &[
                ("reading_date", "2025-03-31"),
                ("previous_bpo", "1200"),
                ("current_bpo", "1350,5"),
            ],
            &[],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert_eq!(saved["data"]["current_bpo"], "1350,5");
        assert!(saved["data"]["previous_dormitory"].is_null());
        assert!(saved["data"]["file_path"].is_null());

        let req = multipart_request(
            "/api/electricity",
            &[("reading_date", "2025-04-30"), ("current_bpo", "-3")],
            &[],
        )
        .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = multipart_request(
            "/api/electricity",
            &[("reading_date", "2025-04-30")],
            &[FilePart {
                field: "excel_file",
                filename: "readings.txt",
                bytes: b"plain text",
            }],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert!(saved["data"]["file_path"].is_null());
        assert_eq!(saved["warnings"].as_array().unwrap().len(), 1);

        let req = test::TestRequest::get().uri("/api/electricity").to_request();
        let readings: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(readings.as_array().unwrap().len(), 2);
        assert_eq!(readings[0]["date"], "2025-04-30");
    }

    #[actix_web::test]
    async fn test_electricity_workbook_gets_a_month_sheet() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);
        let workbook = xlsx("February 2025", &[("A5", "БПО"), ("A6", "Общежитие")]);

        let req = multipart_request(
            "/api/electricity",
            &[
                ("reading_date", "2025-03-31"),
                ("previous_bpo", "1200"),
                ("current_bpo", "1350,5"),
                ("previous_dormitory", "800"),
                ("current_dormitory", "905"),
            ],
            &[FilePart {
                field: "excel_file",
                filename: "tracking.xlsx",
                bytes: &workbook,
            }],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert!(saved["warnings"].as_array().unwrap().is_empty());
        let stored = saved["data"]["file_path"].as_str().unwrap();
        assert!(stored.starts_with("documents/electricity/"));

        let bytes = state.storage.read(stored).unwrap();
        let month = inspect_xlsx(&bytes, Some("March 2025")).unwrap();
        assert_eq!(month.sheets, vec!["February 2025", "March 2025"]);
        assert_eq!(month.cells["A5"], "БПО");
        assert_eq!(month.cells["F5"], "1200");
        assert_eq!(month.cells["G5"], "1350.5");
        assert_eq!(month.cells["F6"], "800");
        assert_eq!(month.cells["G6"], "905");

        let previous = inspect_xlsx(&bytes, Some("February 2025")).unwrap();
        assert!(!previous.cells.contains_key("F5"));
    }

    #[actix_web::test]
    async fn test_stored_files_are_served_from_the_state_storage() {
        let written_root = tempfile::tempdir().unwrap();
        let configured_root = tempfile::tempdir().unwrap();
        let storage = LocalStorage::new(written_root.path());
        storage.ensure_layout().unwrap();
        let pool = connect("sqlite::memory:").await.unwrap();
        let state = web::Data::new(
            AppState::new_with_pool_and_storage(
                pool,
                Arc::new(storage),
                AppConfig::for_storage_root(configured_root.path()),
            )
            .await
            .unwrap(),
        );
        let app = init_app!(state);

        state
            .storage
            .write("documents/electricity/readings.xlsx", b"workbook")
            .unwrap();
        let req = test::TestRequest::get()
            .uri("/storage/documents/electricity/readings.xlsx")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(test::read_body(resp).await.as_ref(), b"workbook");

        let req = test::TestRequest::get()
            .uri("/storage/../secrets.txt")
            .to_request();
        assert_ne!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn test_missing_stored_file_is_not_found() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::get()
            .uri("/storage/generated/ttn/missing.docx")
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_acceptance_acts_are_listed_with_their_forms() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/acceptance-acts/forms")
            .set_json(json!({
                "name": "Приёмка автобуса из ремонта",
                "act_type": "repair",
                "form_structure": { "items": ["Кузов", "Салон"] }
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let form: Value = test::read_body_json(resp).await;
        assert_eq!(form["act_type"], "repair");

        for author in ["Механик Орлов", "Механик Зуев"] {
            let req = test::TestRequest::post()
                .uri("/api/acceptance-acts")
                .set_json(json!({
                    "form_id": form["id"],
                    "filled_data": { "Кузов": "без повреждений" },
                    "created_by": author
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::post()
            .uri("/api/acceptance-acts")
            .set_json(json!({ "form_id": 404, "created_by": "Механик Орлов" }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/api/acceptance-acts").to_request();
        let acts: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(acts.as_array().unwrap().len(), 2);
        assert_eq!(acts[0]["created_by"], "Механик Зуев");
        assert_eq!(acts[0]["form_name"], "Приёмка автобуса из ремонта");
        assert_eq!(acts[0]["act_type"], "repair");

        let req = test::TestRequest::get()
            .uri("/api/acceptance-acts/forms")
            .to_request();
        let forms: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(forms[0]["form_structure"]["items"][0], "Кузов");
    }

    #[actix_web::test]
    async fn test_work_permits_are_numbered_and_keep_templates() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state.clone());

        let req = multipart_request(
            "/api/employees",
            &[("last_name", "Ершов"), ("first_name", "Павел")],
            &[],
        )
        .to_request();
        let employee: Value = test::call_and_read_body_json(&app, req).await;
        let employee_id = employee["data"]["id"].to_string();

        let req = test::TestRequest::get()
            .uri("/api/work-permits/next-number")
            .to_request();
        let next: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(next["number"], "ШМР-0001");

        let template = docx(&paragraph("Наряд-допуск"));
        let req = multipart_request(
            "/api/work-permits",
            &[
                ("tire_type", "Летние"),
                ("start_date", "2025-06-02"),
                ("end_date", "2025-06-02"),
                ("start_time", "08:00"),
                ("end_time", "16:00"),
                ("supervisor_id", employee_id.as_str()),
                ("executor_id", employee_id.as_str()),
            ],
            &[FilePart {
                field: "template",
                filename: "permit.docx",
                bytes: &template,
            }],
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let saved: Value = test::read_body_json(resp).await;
        assert_eq!(saved["data"]["number"], "ШМР-0001");
        assert_eq!(saved["data"]["end_time"], "16:00");
        let template_path = saved["data"]["template_path"].as_str().unwrap();
        assert!(template_path.starts_with("templates/work_permits_"));
        assert_eq!(state.storage.read(template_path).unwrap(), template);

        let req = multipart_request("/api/work-permits", &[("responsible_id", "9999")], &[])
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = multipart_request("/api/work-permits", &[("tire_type", "Зимние")], &[])
            .to_request();
        let second: Value = test::call_and_read_body_json(&app, req).await;
        assert_ne!(second["data"]["number"], "ШМР-0001");
        assert!(second["data"]["template_path"].is_null());

        let req = test::TestRequest::get().uri("/api/work-permits").to_request();
        let permits: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(permits.as_array().unwrap().len(), 2);
        assert_eq!(permits[0]["tire_type"], "Зимние");
    }

    #[actix_web::test]
    async fn test_daily_requests_check_drivers_and_list_latest_first() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = multipart_request(
            "/api/employees",
            &[("last_name", "Кротов"), ("first_name", "Олег")],
            &[],
        )
        .to_request();
        let driver: Value = test::call_and_read_body_json(&app, req).await;
        let driver_id = driver["data"]["id"].as_i64().unwrap();

        for date in ["2025-04-01", "2025-04-03"] {
            let req = test::TestRequest::post()
                .uri("/api/daily-requests")
                .set_json(json!({
                    "request_date": date,
                    "shift_type": "day",
                    "vehicles": [
                        { "vehicle_type": "Автобус", "driver_id": driver_id, "shifts_count": 2 }
                    ]
                }))
                .to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);
        }

        let req = test::TestRequest::post()
            .uri("/api/daily-requests")
            .set_json(json!({
                "request_date": "2025-04-02",
                "vehicles": [{ "vehicle_type": "Тягач", "driver_id": 9999 }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["message"].as_str().unwrap().contains("9999"));

        let req = test::TestRequest::get().uri("/api/daily-requests").to_request();
        let requests: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(requests.as_array().unwrap().len(), 2);
        assert_eq!(requests[0]["date"], "2025-04-03");
        assert_eq!(requests[0]["vehicles_data"][0]["shifts_count"], 2);
        assert_eq!(requests[0]["vehicles_data"][0]["driver_id"], driver_id);
    }

    #[actix_web::test]
    async fn test_safety_test_is_graded_and_results_listed() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state);

        let req = test::TestRequest::post()
            .uri("/api/safety/tests")
            .set_json(json!({
                "name": "Работа на перроне",
                "questions": [
                    {
                        "text": "Допустимая скорость?",
                        "answers": [
                            { "text": "20 км/ч", "correct": true },
                            { "text": "40 км/ч" }
                        ]
                    },
                    {
                        "text": "Средства защиты?",
                        "multiple": true,
                        "answers": [
                            { "text": "Жилет", "correct": true },
                            { "text": "Беруши", "correct": true },
                            { "text": "Кепка" }
                        ]
                    }
                ]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(resp).await;
        let test_id = created["id"].as_i64().unwrap();

        let take = |name: &str, answers: Value| {
            test::TestRequest::post()
                .uri(&format!("/api/safety/tests/{}/take", test_id))
                .set_json(json!({ "employee_name": name, "answers": answers }))
                .to_request()
        };

        let resp = test::call_service(&app, take("Лебедев А.", json!([[0], [0, 1]]))).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let result: Value = test::read_body_json(resp).await;
        assert_eq!((result["score"].as_i64(), result["passed"].as_bool()), (Some(2), Some(true)));

        let result: Value =
            test::call_and_read_body_json(&app, take("Смирнов Б.", json!([[0], [0]]))).await;
        assert_eq!(result["score"], 1);
        assert_eq!(result["max_score"], 2);
        assert_eq!(result["passed"], false);

        let resp = test::call_service(&app, take("", json!([]))).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::post()
            .uri("/api/safety/tests/999/take")
            .set_json(json!({ "employee_name": "Лебедев А.", "answers": [] }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::get()
            .uri(&format!("/api/safety/tests/{}/results", test_id))
            .to_request();
        let results: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(results.as_array().unwrap().len(), 2);
        assert_eq!(results[0]["employee_name"], "Смирнов Б.");

        let req = test::TestRequest::get().uri("/api/safety/tests").to_request();
        let overview: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(overview["total_results"], 2);
        assert_eq!(overview["average_score"], 1.5);
        assert_eq!(overview["tests"][0]["question_count"], 2);
        assert_eq!(overview["tests"][0]["results_count"], 2);
    }

    #[actix_web::test]
    async fn test_employee_document_upload() {
        let (state, _dir) = test_state().await;
        let app = init_app!(state.clone());

        let req = multipart_request(
            "/api/employees",
            &[("last_name", "Громов"), ("first_name", "Илья")],
            &[],
        )
        .to_request();
        let employee: Value = test::call_and_read_body_json(&app, req).await;
        let id = employee["data"]["id"].as_i64().unwrap();

        let scan = FilePart {
            field: "document",
            filename: "passport.pdf",
            bytes: b"%PDF-1.4",
        };
        let req = multipart_request(&format!("/api/employees/{}/documents", id), &[], &[scan])
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let document: Value = test::read_body_json(resp).await;
        let path = document["path"].as_str().unwrap();
        assert!(path.starts_with(&format!("documents/employee_{}_", id)));
        assert!(path.ends_with("_passport.pdf"));
        assert_eq!(document["size"], 8);
        assert_eq!(state.storage.read(path).unwrap(), b"%PDF-1.4");

        let req = test::TestRequest::get().uri(&format!("/storage/{}", path)).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = multipart_request(&format!("/api/employees/{}/documents", id), &[], &[])
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let scan = FilePart {
            field: "document",
            filename: "passport.pdf",
            bytes: b"%PDF-1.4",
        };
        let req = multipart_request("/api/employees/9999/documents", &[], &[scan]).to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }
}
