//! Walk-in registration.

pub mod requests;
pub mod responses;

use actix_web::web;
use chrono::Utc;
use diesel::prelude::*;

use crate::{
    database::{
        self, assert,
        sequences::{self, Sequence},
        DbPool,
    },
    error::ApiError,
    models::walk_ins::{NewWalkIn, WalkIn, WALK_IN_STATUS_WAITING},
};

use self::{
    requests::{ValidWalkIn, WalkInRequest},
    responses::WalkInItem,
};

pub fn insert_walk_in(
    conn: &mut SqliteConnection,
    walk_in: ValidWalkIn,
) -> Result<WalkInItem, ApiError> {
    use crate::schema::walk_ins;

    conn.immediate_transaction(|conn| {
        if let Some(clinic_id) = &walk_in.clinic_id {
            assert::assert_active_clinic(conn, clinic_id)?;
        }

        let id = sequences::next_display_id(conn, Sequence::WalkIn)?;
        let data = NewWalkIn {
            id: id.clone(),
            clinic_id: walk_in.clinic_id,
            patient_name: walk_in.patient_name,
            patient_phone: walk_in.patient_phone,
            patient_email: walk_in.patient_email,
            age: walk_in.age,
            gender: walk_in.gender,
            reason: walk_in.reason,
            status: WALK_IN_STATUS_WAITING.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        diesel::insert_into(walk_ins::table)
            .values(&data)
            .execute(conn)?;

        let row = walk_ins::table.find(&id).get_result::<WalkIn>(conn)?;
        log::info!("registered walk-in {}", id);
        Ok(row.into())
    })
}

pub async fn register(
    pool: &web::Data<DbPool>,
    request: WalkInRequest,
) -> Result<WalkInItem, ApiError> {
    let walk_in = request.validate()?;
    database::run(pool, move |conn| insert_walk_in(conn, walk_in)).await
}
