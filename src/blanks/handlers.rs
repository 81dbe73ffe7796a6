//! HTTP handlers for the blank endpoints.

use actix_web::{web, HttpResponse, Responder};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::groups::{self, ExpandError};
use super::permit::{PermitGenerator, PermitRequest};
use super::sequence;
use super::voucher::{VoucherGenerator, VoucherRequest};
use super::{BlankError, BlankFont, GeneratedBlank, Generator, Validator};
use crate::models::{BlankVariant, FormValues, Hunter, PrintConfig, ResourceRow, SavedGroup};
use crate::store::ConfigStore;
use crate::ErrorResponse;

/// Shared state for the blank endpoints. The font is loaded once and
/// shared by both generators.
pub struct BlanksState {
    pub store: ConfigStore,
    pub permits: PermitGenerator,
    pub vouchers: VoucherGenerator,
}

impl BlanksState {
    pub fn new(store: ConfigStore) -> Result<Self, BlankError> {
        let font = BlankFont::load()?;
        Ok(Self {
            store,
            permits: PermitGenerator::with_font(font.clone()),
            vouchers: VoucherGenerator::with_font(font),
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExpandGroupRequest {
    /// Group name or a comma/semicolon/newline separated species list.
    #[schema(example = "Гусь, Утка, Вальдшнеп")]
    pub input: String,
    /// Set after the client acknowledged the truncation warning.
    #[serde(default)]
    pub confirm_truncation: bool,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupExpansionResponse {
    pub rows: Vec<ResourceRow>,
    pub variant: BlankVariant,
}

/// 409 body asking the client to confirm list truncation.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TruncationRequired {
    pub error: String,
    pub message: String,
    pub total: usize,
    pub limit: usize,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermitRenderRequest {
    pub hunter: Hunter,
    #[serde(default)]
    pub form: FormValues,
    /// Blank variant name; unknown names fall back to the yellow stock.
    #[serde(default)]
    #[schema(example = "Pink")]
    pub variant: String,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRenderRequest {
    pub hunter: Hunter,
    #[serde(default)]
    pub form: FormValues,
    /// The scanned voucher sheet, base64-encoded.
    pub background_pdf_base64: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PrintSettingsResponse {
    #[serde(flatten)]
    pub defaults: PrintConfig,
    pub saved_groups: Vec<SavedGroup>,
    pub voucher_number: String,
}

/// Fill empty form fields from the stored print defaults.
fn merge_defaults(mut form: FormValues, defaults: &PrintConfig) -> FormValues {
    let fields = [
        (&mut form.organization_name, &defaults.organization_name),
        (&mut form.hunting_place, &defaults.hunting_place),
        (&mut form.issued_by_name, &defaults.issued_by_name),
        (&mut form.hunt_type, &defaults.hunt_type),
        (&mut form.job_title, &defaults.job_title),
    ];
    for (field, default) in fields {
        if field.trim().is_empty() {
            *field = default.clone();
        }
    }
    form
}

/// RFC 5987 percent-encoding for the Content-Disposition filename.
fn encode_filename(filename: &str) -> String {
    let mut encoded = String::with_capacity(filename.len());
    for byte in filename.bytes() {
        match byte {
            b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_' => {
                encoded.push(byte as char);
            }
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

fn pdf_response(blank: GeneratedBlank) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            "Content-Disposition",
            format!(
                "attachment; filename=\"blank.pdf\"; filename*=UTF-8''{}",
                encode_filename(&blank.filename)
            ),
        ))
        .body(blank.pdf)
}

fn blank_error_response(err: &BlankError) -> HttpResponse {
    log::error!("blank generation failed: {err}");
    match err {
        BlankError::Background(_) | BlankError::EmptyBackground => HttpResponse::BadRequest()
            .json(ErrorResponse::bad_request(&err.to_string())),
        _ => HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error(&err.to_string())),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Blank Service",
    get,
    path = "/groups",
    responses(
        (status = 200, description = "Saved resource groups", body = [SavedGroup])
    )
)]
pub async fn get_groups(state: web::Data<BlanksState>) -> impl Responder {
    HttpResponse::Ok().json(state.store.saved_groups())
}

#[utoipa::path(
    context_path = "/api",
    tag = "Blank Service",
    post,
    path = "/groups/expand",
    request_body = ExpandGroupRequest,
    responses(
        (status = 200, description = "Expanded resource rows", body = GroupExpansionResponse),
        (status = 204, description = "Empty input, current rows stay unchanged"),
        (status = 409, description = "List exceeds the blank capacity", body = TruncationRequired),
        (status = 422, description = "No species recognized in the input", body = ErrorResponse)
    )
)]
pub async fn expand_group(
    state: web::Data<BlanksState>,
    req: web::Json<ExpandGroupRequest>,
) -> impl Responder {
    let groups = state.store.saved_groups();
    match groups::expand(&req.input, &groups, req.confirm_truncation) {
        Ok(expansion) => HttpResponse::Ok().json(GroupExpansionResponse {
            rows: expansion.rows,
            variant: expansion.variant,
        }),
        Err(ExpandError::EmptyInput) => HttpResponse::NoContent().finish(),
        Err(err @ ExpandError::TruncationNeeded { total, limit }) => {
            HttpResponse::Conflict().json(TruncationRequired {
                error: "TruncationRequired".to_string(),
                message: err.to_string(),
                total,
                limit,
            })
        }
        Err(err @ ExpandError::NothingRecognized) => HttpResponse::UnprocessableEntity()
            .json(ErrorResponse::new("UnprocessableEntity", &err.to_string())),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Blank Service",
    post,
    path = "/blanks/permit",
    request_body = PermitRenderRequest,
    responses(
        (status = 200, description = "Stamped permit PDF"),
        (status = 500, description = "Blank table defect or render failure", body = ErrorResponse)
    )
)]
pub async fn render_permit(
    state: web::Data<BlanksState>,
    req: web::Json<PermitRenderRequest>,
) -> impl Responder {
    let req = req.into_inner();
    let request = PermitRequest {
        hunter: req.hunter,
        form: merge_defaults(req.form, &state.store.print_defaults()),
        variant: BlankVariant::parse(&req.variant),
    };

    if let Err(message) = request.validate() {
        log::error!("отказ рендера разрешения: {message}");
        return HttpResponse::InternalServerError()
            .json(ErrorResponse::internal_error(&message));
    }

    log::info!(
        "рендер разрешения: бланк {:?}, ресурсов {}",
        request.variant,
        request.form.resources.len()
    );

    match state.permits.generate(request) {
        Ok(blank) => pdf_response(blank),
        Err(err) => blank_error_response(&err),
    }
}

#[utoipa::path(
    context_path = "/api",
    tag = "Blank Service",
    post,
    path = "/blanks/voucher",
    request_body = VoucherRenderRequest,
    responses(
        (status = 200, description = "Stamped voucher PDF"),
        (status = 400, description = "Missing or unparsable background sheet", body = ErrorResponse),
        (status = 500, description = "Render failure or counter persist failure", body = ErrorResponse)
    )
)]
pub async fn render_voucher(
    state: web::Data<BlanksState>,
    req: web::Json<VoucherRenderRequest>,
) -> impl Responder {
    let req = req.into_inner();

    let background = match BASE64.decode(req.background_pdf_base64.as_bytes()) {
        Ok(bytes) if !bytes.is_empty() => bytes,
        Ok(_) => {
            return HttpResponse::BadRequest()
                .json(ErrorResponse::bad_request("не передан фоновый лист путёвки"));
        }
        Err(err) => {
            return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&format!(
                "фоновый лист не в base64: {err}"
            )));
        }
    };

    let form = merge_defaults(req.form, &state.store.print_defaults());

    // A manually entered number is stamped as-is and never touches the
    // persisted counter.
    let manual = form
        .voucher_number
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);
    let (use_number, allocation) = match manual {
        Some(number) => (number, None),
        None => {
            let alloc = sequence::allocate(&state.store.voucher_number());
            (alloc.use_number.clone(), Some(alloc))
        }
    };

    log::info!("рендер путёвки №{use_number}");

    let request = VoucherRequest {
        hunter: req.hunter,
        form,
        voucher_number: use_number,
        background,
    };

    if let Err(message) = request.validate() {
        return HttpResponse::BadRequest().json(ErrorResponse::bad_request(&message));
    }

    let blank = match state.vouchers.generate(request) {
        Ok(blank) => blank,
        Err(err) => return blank_error_response(&err),
    };

    // The counter advances only after the render succeeded.
    if let Some(alloc) = allocation {
        if let Err(err) = state.store.set_voucher_number(&alloc.next_value) {
            log::error!("не удалось сохранить счётчик путёвок: {err}");
            return HttpResponse::InternalServerError().json(ErrorResponse::internal_error(
                "не удалось сохранить счётчик путёвок",
            ));
        }
    }

    pdf_response(blank)
}

#[utoipa::path(
    context_path = "/api",
    tag = "Blank Service",
    get,
    path = "/config/print",
    responses(
        (status = 200, description = "Stored print defaults", body = PrintSettingsResponse)
    )
)]
pub async fn get_print_settings(state: web::Data<BlanksState>) -> impl Responder {
    let snapshot = state.store.snapshot();
    HttpResponse::Ok().json(PrintSettingsResponse {
        defaults: snapshot.print,
        saved_groups: snapshot.saved_groups,
        voucher_number: snapshot.voucher_number,
    })
}

/// Configure the blank routes.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/groups").route(web::get().to(get_groups)));
    cfg.service(web::resource("/groups/expand").route(web::post().to(expand_group)));
    cfg.service(web::resource("/blanks/permit").route(web::post().to(render_permit)));
    cfg.service(web::resource("/blanks/voucher").route(web::post().to(render_voucher)));
    cfg.service(web::resource("/config/print").route(web::get().to(get_print_settings)));
}
