//! Macro-generated HTTP suite run against the full router.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! rest_api_tests!(InMemoryRequestStore::new());
//! ```
//!
//! `$factory` must evaluate to a fresh, empty `RequestStore`. Uploads go to a
//! temporary directory with a 1 KiB image ceiling.

#[macro_export]
macro_rules! rest_api_tests {
    ($factory:expr) => {
        mod rest_api_contract_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::multipart::{MultipartForm, Part};
            use serde_json::{Value, json};

            async fn app() -> TestApp {
                TestApp::new($factory)
            }

            fn olive_oil_form() -> MultipartForm {
                MultipartForm::new()
                    .add_text("itemNameEn", "Olive Oil")
                    .add_text("requestorName", "Amy")
                    .add_text("category", "Ingredient")
                    .add_text("priority", "Urgent")
            }

            fn image_part(bytes: Vec<u8>, name: &str, mime: &str) -> Part {
                Part::bytes(bytes).file_name(name).mime_type(mime)
            }

            async fn create_json(app: &TestApp, body: Value) -> Value {
                let response = app.server.post("/api/requests").json(&body).await;
                response.assert_status(StatusCode::CREATED);
                response.json::<Value>()
            }

            // ==================================================================
            // Lifecycle
            // ==================================================================

            #[tokio::test]
            async fn test_request_lifecycle() {
                let app = app().await;

                let response = app
                    .server
                    .post("/api/requests")
                    .multipart(olive_oil_form())
                    .await;
                response.assert_status(StatusCode::CREATED);
                let created: Value = response.json();
                let id = created["id"].as_str().unwrap().to_string();
                assert_eq!(created["status"], "Pending");
                assert_eq!(created["category"], "Ingredient");
                assert_eq!(created["priority"], "Urgent");
                assert_eq!(created["imagePath"], "");
                for flag in [
                    "quoteObtained",
                    "managerApproved",
                    "orderPlaced",
                    "paymentProcessed",
                    "itemReceived",
                    "invoiceFiled",
                ] {
                    assert_eq!(created["checklist"][flag], false, "{} should start false", flag);
                }

                let response = app
                    .server
                    .patch(&format!("/api/requests/{}", id))
                    .json(&json!({
                        "status": "Approved",
                        "checklist": { "managerApproved": true }
                    }))
                    .await;
                response.assert_status_ok();
                let updated: Value = response.json();
                assert_eq!(updated["status"], "Approved");
                assert_eq!(updated["checklist"]["managerApproved"], true);
                assert_eq!(updated["checklist"]["quoteObtained"], false);
                assert_eq!(updated["checklist"]["invoiceFiled"], false);
                assert_eq!(updated["createdAt"], created["createdAt"]);
                assert_ne!(updated["updatedAt"], created["updatedAt"]);

                let response = app.server.get(&format!("/api/requests/{}", id)).await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>(), updated);

                let response = app.server.delete(&format!("/api/requests/{}", id)).await;
                response.assert_status_ok();
                response.assert_json(&json!({ "ok": true }));

                let response = app.server.get(&format!("/api/requests/{}", id)).await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(response.json::<Value>()["code"], "REQUEST_NOT_FOUND");
            }

            // ==================================================================
            // Create
            // ==================================================================

            #[tokio::test]
            async fn test_create_from_json_body() {
                let app = app().await;
                let created = create_json(
                    &app,
                    json!({
                        "itemNameEn": "Tongs",
                        "requestorName": "Ben",
                        "quantity": "4",
                        "unit": "pcs"
                    }),
                )
                .await;

                assert_eq!(created["quantity"], "4");
                assert_eq!(created["category"], "Equipment");
                assert_eq!(created["priority"], "Low");
            }

            #[tokio::test]
            async fn test_create_missing_required_field() {
                let app = app().await;
                let form = MultipartForm::new().add_text("itemNameEn", "Olive Oil");

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status_bad_request();
                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
                assert!(body["error"].as_str().unwrap().contains("requestorName"));

                let all: Value = app.server.get("/api/requests").await.json();
                assert_eq!(all, json!([]));
            }

            #[tokio::test]
            async fn test_create_invalid_enum() {
                let app = app().await;
                let form = olive_oil_form().add_text("status", "Lost");

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status_bad_request();
                let body: Value = response.json();
                assert_eq!(body["details"]["field"], "status");
                assert!(body["details"]["allowed"]
                    .as_array()
                    .unwrap()
                    .contains(&json!("Received")));
            }

            #[tokio::test]
            async fn test_create_blank_enum_uses_default() {
                let app = app().await;
                let form = MultipartForm::new()
                    .add_text("itemNameEn", "Foil")
                    .add_text("requestorName", "Amy")
                    .add_text("priority", "")
                    .add_text("department", "Pastry")
                    .add_text("favouriteColour", "blue");

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status(StatusCode::CREATED);
                let created: Value = response.json();
                assert_eq!(created["priority"], "Low");
                assert_eq!(created["department"], "Pastry");
                assert!(created.get("favouriteColour").is_none());
            }

            #[tokio::test]
            async fn test_create_checklist_field() {
                let app = app().await;

                let form = olive_oil_form().add_text("checklist", r#"{"quoteObtained":true}"#);
                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status(StatusCode::CREATED);
                assert_eq!(response.json::<Value>()["checklist"]["quoteObtained"], true);

                let form = olive_oil_form().add_text("checklist", "{not json");
                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status(StatusCode::CREATED);
                assert_eq!(response.json::<Value>()["checklist"]["quoteObtained"], false);
            }

            // ==================================================================
            // Images
            // ==================================================================

            #[tokio::test]
            async fn test_create_with_image() {
                let app = app().await;
                let bytes = jpeg_bytes(512);
                let form = olive_oil_form()
                    .add_part("image", image_part(bytes.clone(), "olive oil.jpg", "image/jpeg"));

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status(StatusCode::CREATED);
                let created: Value = response.json();
                let image_path = created["imagePath"].as_str().unwrap().to_string();
                assert!(image_path.starts_with("/uploads/"), "got {}", image_path);
                assert!(image_path.ends_with("-olive_oil.jpg"), "got {}", image_path);

                assert_eq!(std::fs::read(app.image_file(&image_path)).unwrap(), bytes);

                let served = app.server.get(&image_path).await;
                served.assert_status_ok();
                assert_eq!(served.as_bytes().as_ref(), bytes.as_slice());
            }

            #[tokio::test]
            async fn test_empty_file_part_means_no_image() {
                let app = app().await;
                let form = olive_oil_form()
                    .add_part("image", image_part(Vec::new(), "", "application/octet-stream"));

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status(StatusCode::CREATED);
                assert_eq!(response.json::<Value>()["imagePath"], "");
                assert_eq!(app.stored_images(), 0);
            }

            #[tokio::test]
            async fn test_create_rejects_non_image() {
                let app = app().await;
                let form = olive_oil_form()
                    .add_part("image", image_part(b"hello".to_vec(), "notes.txt", "text/plain"));

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status_bad_request();
                assert_eq!(response.json::<Value>()["code"], "UNSUPPORTED_MEDIA_TYPE");

                let all: Value = app.server.get("/api/requests").await.json();
                assert_eq!(all, json!([]));
                assert_eq!(app.stored_images(), 0);
            }

            #[tokio::test]
            async fn test_create_rejects_oversized_image() {
                let app = app().await;
                let form = olive_oil_form().add_part(
                    "image",
                    image_part(jpeg_bytes(TEST_MAX_IMAGE_BYTES + 1), "big.jpg", "image/jpeg"),
                );

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status_bad_request();
                assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
                assert_eq!(app.stored_images(), 0);
            }

            #[tokio::test]
            async fn test_validation_runs_before_image_is_stored() {
                let app = app().await;
                let form = MultipartForm::new()
                    .add_text("itemNameEn", "Olive Oil")
                    .add_part("image", image_part(jpeg_bytes(64), "a.jpg", "image/jpeg"));

                let response = app.server.post("/api/requests").multipart(form).await;
                response.assert_status_bad_request();
                assert_eq!(app.stored_images(), 0);
            }

            #[tokio::test]
            async fn test_delete_removes_image() {
                let app = app().await;
                let form = olive_oil_form()
                    .add_part("image", image_part(jpeg_bytes(64), "a.jpg", "image/jpeg"));
                let created: Value = app.server.post("/api/requests").multipart(form).await.json();
                let file = app.image_file(created["imagePath"].as_str().unwrap());
                assert!(file.exists());

                let id = created["id"].as_str().unwrap();
                app.server
                    .delete(&format!("/api/requests/{}", id))
                    .await
                    .assert_status_ok();

                assert!(wait_until_removed(&file).await, "image should be deleted");
            }

            #[tokio::test]
            async fn test_image_path_is_not_client_settable() {
                let app = app().await;
                let form = olive_oil_form()
                    .add_part("image", image_part(jpeg_bytes(64), "a.jpg", "image/jpeg"));
                let owner: Value = app.server.post("/api/requests").multipart(form).await.json();
                let owner_url = format!("/api/requests/{}", owner["id"].as_str().unwrap());
                let owner_image = owner["imagePath"].as_str().unwrap().to_string();
                let file = app.image_file(&owner_image);

                let other = create_json(
                    &app,
                    json!({"itemNameEn": "Tongs", "requestorName": "Ben", "imagePath": &owner_image}),
                )
                .await;
                assert_eq!(other["imagePath"], "");
                let other_url = format!("/api/requests/{}", other["id"].as_str().unwrap());

                let response = app
                    .server
                    .patch(&other_url)
                    .json(&json!({ "imagePath": &owner_image }))
                    .await;
                response.assert_status_bad_request();
                assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");

                app.server.delete(&other_url).await.assert_status_ok();
                tokio::time::sleep(std::time::Duration::from_millis(100)).await;

                assert!(file.exists(), "another record's image must survive");
                app.server.get(&owner_url).await.assert_status_ok();
                app.server.get(&owner_image).await.assert_status_ok();
            }

            // ==================================================================
            // List
            // ==================================================================

            #[tokio::test]
            async fn test_list_filters_and_search() {
                let app = app().await;
                create_json(&app, json!({"itemNameEn": "Flour", "requestorName": "Amy", "priority": "High", "department": "Pastry"})).await;
                tick().await;
                create_json(&app, json!({"itemNameEn": "Whole Chicken", "requestorName": "Ben", "priority": "High", "category": "Ingredient"})).await;
                tick().await;
                create_json(&app, json!({"itemNameEn": "Mop", "requestorName": "Cai", "category": "Cleaning"})).await;

                let names = |body: Value| -> Vec<String> {
                    body.as_array()
                        .unwrap()
                        .iter()
                        .map(|r| r["itemNameEn"].as_str().unwrap().to_string())
                        .collect()
                };

                let all: Value = app.server.get("/api/requests").await.json();
                assert_eq!(names(all), vec!["Mop", "Whole Chicken", "Flour"]);

                let high: Value = app
                    .server
                    .get("/api/requests")
                    .add_query_param("status", "Pending")
                    .add_query_param("priority", "High")
                    .await
                    .json();
                assert_eq!(names(high), vec!["Whole Chicken", "Flour"]);

                let cleaning: Value = app
                    .server
                    .get("/api/requests")
                    .add_query_param("category", "Cleaning")
                    .add_query_param("search", "")
                    .await
                    .json();
                assert_eq!(names(cleaning), vec!["Mop"]);

                let chicken: Value = app
                    .server
                    .get("/api/requests")
                    .add_query_param("search", "CHICK")
                    .await
                    .json();
                assert_eq!(names(chicken), vec!["Whole Chicken"]);

                let response = app
                    .server
                    .get("/api/requests")
                    .add_query_param("priority", "Whenever")
                    .await;
                response.assert_status_bad_request();
                assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR");
            }

            #[tokio::test]
            async fn test_list_rejects_malformed_query() {
                let app = app().await;

                let response = app
                    .server
                    .get("/api/requests?status=Pending&status=Done")
                    .await;
                response.assert_status_bad_request();
                let body: Value = response.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
                assert!(body["error"].as_str().unwrap().contains("status"));
            }

            // ==================================================================
            // Get / Patch errors
            // ==================================================================

            #[tokio::test]
            async fn test_invalid_and_unknown_ids() {
                let app = app().await;

                app.server
                    .get("/api/requests/not-a-uuid")
                    .await
                    .assert_status_bad_request();

                let missing = uuid::Uuid::new_v4();
                let response = app.server.get(&format!("/api/requests/{}", missing)).await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(response.json::<Value>()["details"]["id"], missing.to_string());

                app.server
                    .patch(&format!("/api/requests/{}", missing))
                    .json(&json!({ "status": "Done" }))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);

                app.server
                    .delete(&format!("/api/requests/{}", missing))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_patch_rejections_leave_record_unchanged() {
                let app = app().await;
                let created =
                    create_json(&app, json!({"itemNameEn": "Tongs", "requestorName": "Ben"})).await;
                let url = format!("/api/requests/{}", created["id"].as_str().unwrap());

                for body in [
                    json!({ "status": "Lost" }),
                    json!({ "createdAt": "2020-01-01T00:00:00Z" }),
                    json!({ "id": uuid::Uuid::new_v4() }),
                    json!({ "colour": "red" }),
                    json!({ "checklist": { "paid": true } }),
                    json!({ "itemNameEn": "  " }),
                ] {
                    let response = app.server.patch(&url).json(&body).await;
                    response.assert_status_bad_request();
                    assert_eq!(response.json::<Value>()["code"], "VALIDATION_ERROR", "{}", body);
                }

                let response = app
                    .server
                    .patch(&url)
                    .text("status=Done")
                    .await;
                response.assert_status_bad_request();

                let current: Value = app.server.get(&url).await.json();
                assert_eq!(current, created);
            }

            #[tokio::test]
            async fn test_patch_completed_at() {
                let app = app().await;
                let created =
                    create_json(&app, json!({"itemNameEn": "Tongs", "requestorName": "Ben"})).await;
                let url = format!("/api/requests/{}", created["id"].as_str().unwrap());

                let done: Value = app
                    .server
                    .patch(&url)
                    .json(&json!({ "status": "Done", "completedAt": "2026-03-01T10:00:00Z" }))
                    .await
                    .json();
                assert_eq!(done["completedAt"], "2026-03-01T10:00:00.000000Z");

                let reopened: Value = app
                    .server
                    .patch(&url)
                    .json(&json!({ "status": "Pending", "completedAt": null }))
                    .await
                    .json();
                assert!(reopened["completedAt"].is_null());
            }

            // ==================================================================
            // Health
            // ==================================================================

            #[tokio::test]
            async fn test_health() {
                let app = app().await;

                let response = app.server.get("/api/health").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["status"], "OK");
                assert_eq!(body["db"], "Connected");
                assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
            }
        }
    };
}
