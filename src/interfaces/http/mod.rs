// ============================================================
// HTTP INTERFACE
// ============================================================
// actix-web surface for the import pipeline. Preview and commit accept
// either a multipart upload (file + metadata fields) or a JSON body
// when the client already parsed/mapped the rows itself.

use std::sync::Arc;

use actix_cors::Cors;
use actix_multipart::Multipart;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{
    dev::Server, get, post, web, App, HttpRequest, HttpResponse, HttpServer, Responder,
};
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use crate::application::use_cases::import_service::{self, ImportPreview};
use crate::application::use_cases::template_builder::{build_template, template_file_name};
use crate::domain::error::{AppError, Result};
use crate::domain::import::{FieldMapping, ImportKind, MappedRecord, RawRecord, RawTable};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::csv::parse_upload;
use crate::infrastructure::db::ImportStore;

pub struct HttpState {
    pub config: AppConfig,
    pub store: Arc<dyn ImportStore>,
}

#[derive(Deserialize)]
struct PreviewJsonRequest {
    #[serde(rename = "type")]
    kind: String,
    records: Vec<RawRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitJsonRequest {
    #[serde(rename = "type")]
    kind: String,
    mapped_data: Vec<MappedRecord>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewResponse {
    data: Vec<MappedRecord>,
    headers: Vec<String>,
    mappings: Vec<FieldMapping>,
    total_rows: usize,
}

impl From<ImportPreview> for PreviewResponse {
    fn from(preview: ImportPreview) -> Self {
        Self {
            data: preview.records,
            headers: preview.headers,
            mappings: preview.mappings,
            total_rows: preview.total_rows,
        }
    }
}

#[derive(Serialize)]
struct CommitResponse {
    success: bool,
    count: usize,
    message: String,
}

#[derive(Deserialize)]
struct TemplateQuery {
    #[serde(rename = "type")]
    kind: String,
}

/// Everything a multipart upload can carry. `mapped_data`, when present,
/// short-circuits the file entirely (the client mapped the rows itself).
#[derive(Default)]
struct UploadForm {
    file_name: Option<String>,
    file_bytes: Vec<u8>,
    kind: Option<String>,
    mappings: Option<Vec<FieldMapping>>,
    mapped_data: Option<Vec<MappedRecord>>,
}

fn is_multipart(req: &HttpRequest) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("multipart/form-data"))
        .unwrap_or(false)
}

async fn collect_body(payload: &mut web::Payload, cap: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    while let Some(chunk) = payload.next().await {
        let chunk =
            chunk.map_err(|e| AppError::IoError(format!("Failed to read request body: {}", e)))?;
        if body.len() + chunk.len() > cap {
            return Err(AppError::ValidationError(
                "Request body exceeds the upload limit".to_string(),
            ));
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

async fn read_field_bytes(field: &mut actix_multipart::Field, cap: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk =
            chunk.map_err(|e| AppError::IoError(format!("Failed to read upload: {}", e)))?;
        if bytes.len() + chunk.len() > cap {
            return Err(AppError::ValidationError(
                "Uploaded file exceeds the upload limit".to_string(),
            ));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_upload_form(mut payload: Multipart, cap: usize) -> Result<UploadForm> {
    let mut form = UploadForm::default();

    while let Some(item) = payload.next().await {
        let mut field =
            item.map_err(|e| AppError::ParseError(format!("Invalid multipart payload: {}", e)))?;

        let name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match name.as_deref() {
            Some("file") => {
                form.file_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()));
                form.file_bytes = read_field_bytes(&mut field, cap).await?;
            }
            Some("type") => {
                let bytes = read_field_bytes(&mut field, cap).await?;
                form.kind = Some(String::from_utf8_lossy(&bytes).trim().to_string());
            }
            Some("mappings") => {
                let bytes = read_field_bytes(&mut field, cap).await?;
                form.mappings = Some(serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::ParseError(format!("Invalid mappings JSON: {}", e))
                })?);
            }
            Some("mappedData") => {
                let bytes = read_field_bytes(&mut field, cap).await?;
                form.mapped_data = Some(serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::ParseError(format!("Invalid mappedData JSON: {}", e))
                })?);
            }
            _ => {}
        }
    }

    Ok(form)
}

fn kind_of(form: &UploadForm) -> Result<ImportKind> {
    match form.kind.as_deref() {
        Some(value) => ImportKind::parse(value),
        None => Err(AppError::ValidationError(
            "Missing 'type' field in upload".to_string(),
        )),
    }
}

fn table_of(form: &UploadForm) -> Result<RawTable> {
    if form.file_bytes.is_empty() {
        return Err(AppError::ValidationError(
            "Missing 'file' field in upload".to_string(),
        ));
    }
    let file_name = form.file_name.as_deref().unwrap_or("upload.csv");
    parse_upload(file_name, &form.file_bytes)
}

/// Rows arriving pre-parsed over JSON carry no header order, so the
/// column order is reconstructed as the sorted union of keys.
fn table_from_records(records: Vec<RawRecord>) -> RawTable {
    let mut headers: Vec<String> = records
        .iter()
        .flat_map(|r| r.keys().cloned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();
    headers.sort();

    RawTable { headers, records }
}

fn error_response(err: &AppError) -> HttpResponse {
    let body = |label: &str| json!({ "error": label, "message": err.to_string() });
    match err {
        AppError::ParseError(_) => HttpResponse::BadRequest().json(body("parse_error")),
        AppError::ValidationError(_) => HttpResponse::BadRequest().json(body("validation_error")),
        AppError::MappingIncomplete(_) => {
            HttpResponse::BadRequest().json(body("mapping_incomplete"))
        }
        AppError::NotFound(_) => HttpResponse::NotFound().json(body("not_found")),
        _ => {
            error!("request failed: {}", err);
            HttpResponse::InternalServerError().json(body("internal_error"))
        }
    }
}

#[post("/import/preview")]
async fn preview_import(
    data: web::Data<HttpState>,
    req: HttpRequest,
    mut payload: web::Payload,
) -> impl Responder {
    let cap = data.config.max_upload_bytes;

    let outcome = if is_multipart(&req) {
        let multipart = Multipart::new(req.headers(), payload);
        match read_upload_form(multipart, cap).await {
            Ok(form) => kind_of(&form).and_then(|kind| {
                table_of(&form)
                    .and_then(|table| import_service::preview(table, kind, data.config.preview_rows))
            }),
            Err(e) => Err(e),
        }
    } else {
        match collect_body(&mut payload, cap).await {
            Ok(body) => serde_json::from_slice::<PreviewJsonRequest>(&body)
                .map_err(|e| AppError::ParseError(format!("Invalid JSON body: {}", e)))
                .and_then(|req| {
                    let kind = ImportKind::parse(&req.kind)?;
                    let table = table_from_records(req.records);
                    import_service::preview(table, kind, data.config.preview_rows)
                }),
            Err(e) => Err(e),
        }
    };

    match outcome {
        Ok(preview) => HttpResponse::Ok().json(PreviewResponse::from(preview)),
        Err(e) => error_response(&e),
    }
}

#[post("/import/commit")]
async fn commit_import(
    data: web::Data<HttpState>,
    req: HttpRequest,
    mut payload: web::Payload,
) -> impl Responder {
    let cap = data.config.max_upload_bytes;
    let store = data.store.as_ref();

    let outcome = if is_multipart(&req) {
        let multipart = Multipart::new(req.headers(), payload);
        match read_upload_form(multipart, cap).await {
            Ok(form) => match kind_of(&form) {
                Ok(kind) => {
                    let file_name = form.file_name.as_deref();
                    if let Some(mapped) = form.mapped_data.clone() {
                        import_service::commit_mapped(store, mapped, kind, file_name).await
                    } else {
                        match table_of(&form) {
                            Ok(table) => {
                                import_service::commit_table(
                                    store,
                                    table,
                                    kind,
                                    form.mappings.clone(),
                                    file_name,
                                )
                                .await
                            }
                            Err(e) => Err(e),
                        }
                    }
                }
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    } else {
        match collect_body(&mut payload, cap).await {
            Ok(body) => match serde_json::from_slice::<CommitJsonRequest>(&body)
                .map_err(|e| AppError::ParseError(format!("Invalid JSON body: {}", e)))
            {
                Ok(req) => match ImportKind::parse(&req.kind) {
                    Ok(kind) => {
                        import_service::commit_mapped(store, req.mapped_data, kind, None).await
                    }
                    Err(e) => Err(e),
                },
                Err(e) => Err(e),
            },
            Err(e) => Err(e),
        }
    };

    match outcome {
        Ok(result) => HttpResponse::Ok().json(CommitResponse {
            success: true,
            count: result.imported_count,
            message: result.message,
        }),
        Err(e) => error_response(&e),
    }
}

#[get("/import/template")]
async fn download_template(query: web::Query<TemplateQuery>) -> impl Responder {
    let outcome = ImportKind::parse(&query.kind).and_then(|kind| {
        let bytes = build_template(kind)?;
        Ok((kind, bytes))
    });

    match outcome {
        Ok((kind, bytes)) => HttpResponse::Ok()
            .content_type("text/csv; charset=utf-8")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", template_file_name(kind)),
            ))
            .body(bytes),
        Err(e) => error_response(&e),
    }
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

fn api_scope() -> actix_web::Scope {
    web::scope("/api")
        .service(preview_import)
        .service(commit_import)
        .service(download_template)
        .service(health)
}

fn cors_for(config: &AppConfig) -> Cors {
    match &config.allowed_origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allow_any_method()
            .allow_any_header()
            .max_age(3600),
        // Local tool mode: no configured origin, allow everything
        None => Cors::permissive(),
    }
}

pub fn start_server(config: AppConfig, store: Arc<dyn ImportStore>) -> std::io::Result<Server> {
    let bind_addr = config.bind_addr();
    info!(host = %bind_addr.0, port = bind_addr.1, "starting import server");

    let state = web::Data::new(HttpState { config, store });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors_for(&state.config))
            .app_data(state.clone())
            .service(api_scope())
    })
    .bind(bind_addr)?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};

    use crate::infrastructure::db::SqliteImportStore;

    async fn test_state() -> (web::Data<HttpState>, Arc<SqliteImportStore>) {
        let store = Arc::new(SqliteImportStore::init("sqlite::memory:").await.unwrap());
        let state = web::Data::new(HttpState {
            config: AppConfig::default(),
            store: store.clone(),
        });
        (state, store)
    }

    macro_rules! test_app {
        ($state:expr) => {
            test::init_service(App::new().app_data($state.clone()).service(api_scope())).await
        };
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> (String, Vec<u8>) {
        let boundary = "XTESTBOUNDARY";
        let mut body = Vec::new();
        for (name, filename, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
            match filename {
                Some(filename) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\r\n",
                        name, filename
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
        (
            format!("multipart/form-data; boundary={}", boundary),
            body,
        )
    }

    #[actix_web::test]
    async fn test_health() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_template_download() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let req = test::TestRequest::get()
            .uri("/api/import/template?type=sales")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let content_type = resp
            .headers()
            .get("content-type")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/csv"));

        let body = test::read_body(resp).await;
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.starts_with("customerId;amount;date;brand;notes"));
    }

    #[actix_web::test]
    async fn test_template_unknown_kind_is_400() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let req = test::TestRequest::get()
            .uri("/api/import/template?type=orders")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
    }

    #[actix_web::test]
    async fn test_preview_multipart_csv() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let (content_type, body) = multipart_body(&[
            ("type", None, "customers"),
            (
                "file",
                Some("clientes.csv"),
                "Nombre;Apellido;Correo\nJuan;Perez;juan@x.com\n",
            ),
        ]);

        let req = test::TestRequest::post()
            .uri("/api/import/preview")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["totalRows"], 1);
        assert_eq!(body["data"][0]["firstName"], "Juan");
        assert_eq!(body["headers"][0], "firstName");
    }

    #[actix_web::test]
    async fn test_preview_json_records() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let req = test::TestRequest::post()
            .uri("/api/import/preview")
            .set_json(json!({
                "type": "customers",
                "records": [{"Nombre": "Juan", "Apellido": "Perez"}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["data"][0]["firstName"], "Juan");
        assert_eq!(body["data"][0]["lastName"], "Perez");
    }

    #[actix_web::test]
    async fn test_commit_multipart_end_to_end() {
        let (state, store) = test_state().await;
        let app = test_app!(state);
        let (content_type, body) = multipart_body(&[
            ("type", None, "customers"),
            (
                "file",
                Some("clientes.csv"),
                "Nombre;Apellido\nJuan;Perez\nMaria;Lopez\n",
            ),
        ]);

        let req = test::TestRequest::post()
            .uri("/api/import/commit")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["count"], 2);
        assert_eq!(body["message"], "Imported 2 of 2 customers");

        assert!(store.customer_exists(1).await.unwrap());
        assert!(store.customer_exists(2).await.unwrap());
    }

    #[actix_web::test]
    async fn test_commit_json_mapped_data() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let req = test::TestRequest::post()
            .uri("/api/import/commit")
            .set_json(json!({
                "type": "leads",
                "mappedData": [{"name": "Maria Lopez", "status": "new"}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["count"], 1);
    }

    #[actix_web::test]
    async fn test_commit_missing_required_mapping_is_400() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let (content_type, body) = multipart_body(&[
            ("type", None, "customers"),
            ("file", Some("clientes.csv"), "Correo\njuan@x.com\n"),
        ]);

        let req = test::TestRequest::post()
            .uri("/api/import/commit")
            .insert_header(("content-type", content_type))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "mapping_incomplete");
        let message = body["message"].as_str().unwrap();
        assert!(message.contains("firstName"));
        assert!(message.contains("lastName"));
    }

    #[actix_web::test]
    async fn test_commit_validation_failure_is_400() {
        let (state, _store) = test_state().await;
        let app = test_app!(state);
        let req = test::TestRequest::post()
            .uri("/api/import/commit")
            .set_json(json!({
                "type": "customers",
                "mappedData": []
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "validation_error");
    }
}
