//! Machine-to-machine endpoints for the voice vendor, also open to
//! dashboard sessions.

pub mod lookup;
pub mod requests;
pub mod responses;

use actix_web::{http::header, web, HttpRequest, HttpResponse};

use crate::{
    auth::{Action, ApiAccess, VoiceSecret},
    booking::{self, requests::BookingRequest},
    conversation,
    database::{self, DbPool},
    error::ApiError,
    protocol::{DataResponse, ListResponse},
    utils::{get_resource, non_blank, page_bounds, post_resource},
    voice::VoiceServices,
    walk_in::{self, requests::WalkInRequest},
};

use self::{
    lookup::ClinicScope,
    requests::{DepartmentQuery, DoctorQuery},
    responses::{DepartmentFilters, DoctorFilters, TranscriptionResponse},
};

const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(post_resource("/book", book))
        .service(post_resource("/walk_in", register_walk_in))
        .service(get_resource("/doctors", search_doctor))
        .service(get_resource("/departments", search_depart))
        .service(post_resource("/conversation", conversation::converse))
        .service(
            post_resource("/transcribe", transcribe)
                .app_data(web::PayloadConfig::new(MAX_AUDIO_BYTES)),
        );
}

/// Clinic-scoped write access for dashboard callers; the vendor is trusted.
fn authorize_optional_clinic(
    access: &ApiAccess,
    clinic_id: Option<&str>,
    action: Action,
) -> Result<(), ApiError> {
    match (access, clinic_id.map(str::trim).filter(|c| !c.is_empty())) {
        (ApiAccess::Voice, _) => Ok(()),
        (ApiAccess::User(_), Some(clinic_id)) => access.authorize(clinic_id, action),
        (ApiAccess::User(_), None) => {
            Err(ApiError::validation("Missing required fields: clinicId"))
        }
    }
}

/// Dashboard callers without a clinic filter only see their own clinics.
fn lookup_scope(access: &ApiAccess, clinic_id: Option<&str>) -> Result<ClinicScope, ApiError> {
    match (access, clinic_id) {
        (ApiAccess::Voice, _) => Ok(None),
        (ApiAccess::User(caller), Some(clinic_id)) => {
            caller.authorize(clinic_id, Action::View)?;
            Ok(None)
        }
        (ApiAccess::User(caller), None) => Ok(Some(caller.clinic_ids())),
    }
}

async fn book(
    pool: web::Data<DbPool>,
    access: ApiAccess,
    info: web::Json<BookingRequest>,
) -> Result<HttpResponse, ApiError> {
    let info = info.into_inner();
    authorize_optional_clinic(&access, info.clinic_id.as_deref(), Action::ManageAppointments)?;

    let booked = booking::book(&pool, info, access.account_id()).await?;
    Ok(HttpResponse::Created().json(DataResponse::ok(booked)))
}

async fn register_walk_in(
    pool: web::Data<DbPool>,
    access: ApiAccess,
    info: web::Json<WalkInRequest>,
) -> Result<HttpResponse, ApiError> {
    let info = info.into_inner();
    authorize_optional_clinic(&access, info.clinic_id.as_deref(), Action::ManageWalkIns)?;

    let walk_in = walk_in::register(&pool, info).await?;
    Ok(HttpResponse::Created().json(DataResponse::ok(walk_in)))
}

async fn search_doctor(
    pool: web::Data<DbPool>,
    access: ApiAccess,
    query: web::Query<DoctorQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let filters = DoctorFilters {
        clinic_id: non_blank(query.clinic_id),
        department_id: non_blank(query.department_id),
        is_active: query.is_active,
    };
    let scope = lookup_scope(&access, filters.clinic_id.as_deref())?;

    let echoed = filters.clone();
    let (docs, total) = database::run(&pool, move |conn| {
        lookup::search_doctors(conn, &filters, &scope, limit, offset)
    })
    .await?;

    Ok(HttpResponse::Ok().json(ListResponse::new(docs, total, limit, offset, echoed)))
}

async fn search_depart(
    pool: web::Data<DbPool>,
    access: ApiAccess,
    query: web::Query<DepartmentQuery>,
) -> Result<HttpResponse, ApiError> {
    let query = query.into_inner();
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let filters = DepartmentFilters {
        clinic_id: non_blank(query.clinic_id),
        is_active: query.is_active,
    };
    let scope = lookup_scope(&access, filters.clinic_id.as_deref())?;

    let echoed = filters.clone();
    let (departs, total) = database::run(&pool, move |conn| {
        lookup::search_departments(conn, &filters, &scope, limit, offset)
    })
    .await?;

    Ok(HttpResponse::Ok().json(ListResponse::new(departs, total, limit, offset, echoed)))
}

async fn transcribe(
    _secret: VoiceSecret,
    voice: web::Data<VoiceServices>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    if body.is_empty() {
        return Err(ApiError::validation("Empty audio body"));
    }
    let transcriber = voice
        .transcriber
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("no transcription service configured"))?;
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/octet-stream");

    let text = transcriber
        .transcribe(body.to_vec(), content_type)
        .await
        .map_err(|err| ApiError::Internal(err.context("transcription failed")))?;

    Ok(HttpResponse::Ok().json(TranscriptionResponse {
        success: true,
        text,
    }))
}
