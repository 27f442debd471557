//! Patient-facing pages of one clinic, addressed by its slug. No
//! authentication; only active clinics, departments and doctors are shown.

pub mod requests;
pub mod responses;

use actix_web::{web, HttpResponse};
use diesel::prelude::*;

use crate::{
    api::{
        lookup,
        responses::{DepartmentItem, DoctorFilters},
    },
    booking::{self, requests::BookingRequest},
    database::{self, assert, DbPool},
    error::ApiError,
    models::departments::Department,
    protocol::{DataResponse, ListResponse},
    utils::{get_resource, page_bounds, post_resource},
    walk_in::{self, requests::WalkInRequest},
};

use self::{requests::PageQuery, responses::ClinicPage};

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(get_resource("/clinics/{slug}", view_clinic))
        .service(get_resource("/clinics/{slug}/doctors", list_doctors))
        .service(post_resource("/clinics/{slug}/book", book))
        .service(post_resource("/clinics/{slug}/walk_in", register_walk_in));
}

async fn clinic_id_of(pool: &web::Data<DbPool>, slug: String) -> Result<String, ApiError> {
    let clinic = database::run(pool, move |conn| assert::assert_clinic_slug(conn, &slug)).await?;
    Ok(clinic.id)
}

async fn view_clinic(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    use crate::schema::departments;

    let slug = path.into_inner();
    let page = database::run(&pool, move |conn| {
        let clinic = assert::assert_clinic_slug(conn, &slug)?;
        let departs = departments::table
            .filter(departments::clinic_id.eq(&clinic.id))
            .filter(departments::is_active.eq(true))
            .order(departments::name.asc())
            .load::<Department>(conn)?;
        Ok(ClinicPage::new(
            clinic,
            departs.into_iter().map(DepartmentItem::from).collect(),
        ))
    })
    .await?;

    Ok(HttpResponse::Ok().json(DataResponse::ok(page)))
}

async fn list_doctors(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse, ApiError> {
    let clinic_id = clinic_id_of(&pool, path.into_inner()).await?;
    let (limit, offset) = page_bounds(query.limit, query.offset);
    let filters = DoctorFilters {
        clinic_id: Some(clinic_id),
        department_id: None,
        is_active: Some(true),
    };

    let echoed = filters.clone();
    let (docs, total) = database::run(&pool, move |conn| {
        lookup::search_doctors(conn, &filters, &None, limit, offset)
    })
    .await?;

    Ok(HttpResponse::Ok().json(ListResponse::new(docs, total, limit, offset, echoed)))
}

/// The clinic comes from the address, never from the body.
async fn book(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    info: web::Json<BookingRequest>,
) -> Result<HttpResponse, ApiError> {
    let clinic_id = clinic_id_of(&pool, path.into_inner()).await?;
    let mut info = info.into_inner();
    info.clinic_id = Some(clinic_id);

    let booked = booking::book(&pool, info, None).await?;
    Ok(HttpResponse::Created().json(DataResponse::ok(booked)))
}

async fn register_walk_in(
    pool: web::Data<DbPool>,
    path: web::Path<String>,
    info: web::Json<WalkInRequest>,
) -> Result<HttpResponse, ApiError> {
    let clinic_id = clinic_id_of(&pool, path.into_inner()).await?;
    let mut info = info.into_inner();
    info.clinic_id = Some(clinic_id);

    let walk_in = walk_in::register(&pool, info).await?;
    Ok(HttpResponse::Created().json(DataResponse::ok(walk_in)))
}
