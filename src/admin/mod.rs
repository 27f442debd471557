//! Clinic-admin dashboard endpoints. Every call carries a bearer session and
//! is checked against the caller's role in the clinic it touches.

mod requests;
mod responses;
mod utils;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::{
    api::responses::{DepartmentItem, DoctorItem},
    auth::{Action, Caller, Role},
    database::{
        self, assert, conflict_on_unique,
        sequences::{self, Sequence},
        DbPool,
    },
    error::ApiError,
    models::{
        appointments::{self, Appointment},
        clinic_users::{ClinicUser, NewClinicUser},
        clinics::{Clinic, NewClinic, UpdateClinic},
        departments::{Department, NewDepartment, UpdateDepartment},
        doctors::{Doctor, NewDoctor, UpdateDoctor},
        walk_ins::{WalkIn, WALK_IN_STATUSES},
    },
    protocol::{DataResponse, ListResponse, SimpleResponse},
    slug,
    utils::{self as common, non_blank, page_bounds, post_resource, required},
    walk_in::responses::WalkInItem,
};

use self::{requests::*, responses::*};

const DUPLICATE_DEPARTMENT: &str = "A department with this name already exists in the clinic";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(post_resource("/register_clinic", register_clinic))
        .service(post_resource("/update_clinic", update_clinic))
        .service(post_resource("/deactivate_clinic", deactivate_clinic))
        .service(post_resource("/add_depart", add_depart))
        .service(post_resource("/modify_depart", modify_depart))
        .service(post_resource("/add_doctor", add_doctor))
        .service(post_resource("/modify_doctor", modify_doctor))
        .service(post_resource("/search_appoint", search_appoint))
        .service(post_resource("/update_appoint_status", update_appoint_status))
        .service(post_resource("/search_walk_in", search_walk_in))
        .service(post_resource("/update_walk_in_status", update_walk_in_status))
        .service(post_resource("/add_member", add_member))
        .service(post_resource("/remove_member", remove_member));
}

crate::post_funcs! {
    (register_clinic, RegisterClinicRequest),
    (update_clinic, UpdateClinicRequest),
    (deactivate_clinic, DeactivateClinicRequest),
    (add_depart, AddDepartRequest),
    (modify_depart, ModifyDepartRequest),
    (add_doctor, AddDoctorRequest),
    (modify_doctor, ModifyDoctorRequest),
    (search_appoint, SearchAppointRequest),
    (update_appoint_status, UpdateAppointStatusRequest),
    (search_walk_in, SearchWalkInRequest),
    (update_walk_in_status, UpdateWalkInStatusRequest),
    (add_member, AddMemberRequest),
    (remove_member, RemoveMemberRequest),
}

fn contact_fields(
    email: Option<String>,
    phone: Option<String>,
) -> Result<(Option<String>, Option<String>), ApiError> {
    let email = non_blank(email);
    if let Some(email) = &email {
        if !common::is_valid_email(email) {
            return Err(ApiError::validation("Wrong format on 'email'"));
        }
    }
    let phone = non_blank(phone);
    if let Some(phone) = &phone {
        if !common::is_valid_phone(phone) {
            return Err(ApiError::validation("Wrong format on 'phone'"));
        }
    }
    Ok((email, phone))
}

async fn register_clinic_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: RegisterClinicRequest,
) -> Result<DataResponse<ClinicItem>, ApiError> {
    use crate::schema::{clinic_users, clinics};

    let name = required(info.name, "name")?;
    let (email, phone) = contact_fields(info.email, info.phone)?;
    let address = non_blank(info.address);

    let clinic = database::run(&pool, move |conn| {
        conn.immediate_transaction(|conn| {
            let now = Utc::now().naive_utc();
            let id = Uuid::new_v4().to_string();
            let slug = slug::unique_clinic_slug(conn, &name, None)?;
            let data = NewClinic {
                id: id.clone(),
                name,
                email,
                phone,
                address,
                slug,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            diesel::insert_into(clinics::table)
                .values(&data)
                .execute(conn)?;

            let admin = NewClinicUser {
                account_id: caller.account_id.clone(),
                clinic_id: id.clone(),
                role: Role::Admin.as_str().to_string(),
                is_active: true,
                created_at: now,
            };
            diesel::insert_into(clinic_users::table)
                .values(&admin)
                .execute(conn)?;

            let clinic = clinics::table.find(&id).get_result::<Clinic>(conn)?;
            log::info!(
                "account {} registered clinic {} as '{}'",
                caller.account_id,
                clinic.id,
                clinic.slug
            );
            Ok(clinic)
        })
    })
    .await?;

    Ok(DataResponse::ok(clinic.into()))
}

async fn update_clinic_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: UpdateClinicRequest,
) -> Result<DataResponse<ClinicItem>, ApiError> {
    use crate::schema::clinics;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    caller.authorize(&clinic_id, Action::ConfigureClinic)?;

    let name = non_blank(info.name);
    let (email, phone) = contact_fields(info.email, info.phone)?;
    let address = non_blank(info.address);
    if name.is_none() && email.is_none() && phone.is_none() && address.is_none() {
        return Err(ApiError::validation("Nothing to update"));
    }

    let clinic = database::run(&pool, move |conn| {
        conn.immediate_transaction(|conn| {
            assert::assert_clinic(conn, &clinic_id)?;
            // a rename moves the public address too
            let slug = match &name {
                Some(name) => Some(slug::unique_clinic_slug(conn, name, Some(clinic_id.as_str()))?),
                None => None,
            };
            let data = UpdateClinic {
                name,
                email,
                phone,
                address,
                slug,
                is_active: None,
                updated_at: Utc::now().naive_utc(),
            };
            diesel::update(clinics::table.find(&clinic_id))
                .set(&data)
                .execute(conn)?;
            Ok(clinics::table.find(&clinic_id).get_result::<Clinic>(conn)?)
        })
    })
    .await?;

    Ok(DataResponse::ok(clinic.into()))
}

async fn deactivate_clinic_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: DeactivateClinicRequest,
) -> Result<SimpleResponse, ApiError> {
    use crate::schema::clinics;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    caller.authorize(&clinic_id, Action::ConfigureClinic)?;

    database::run(&pool, move |conn| {
        assert::assert_clinic(conn, &clinic_id)?;
        diesel::update(clinics::table.find(&clinic_id))
            .set((
                clinics::is_active.eq(false),
                clinics::updated_at.eq(Utc::now().naive_utc()),
            ))
            .execute(conn)?;
        log::info!("account {} deactivated clinic {}", caller.account_id, clinic_id);
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn add_depart_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: AddDepartRequest,
) -> Result<DataResponse<DepartmentItem>, ApiError> {
    use crate::schema::departments;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    let name = required(info.name, "name")?;
    caller.authorize(&clinic_id, Action::ConfigureClinic)?;

    let depart = database::run(&pool, move |conn| {
        conn.immediate_transaction(|conn| {
            assert::assert_clinic(conn, &clinic_id)?;
            let id = sequences::next_display_id(conn, Sequence::Department)?;
            let data = NewDepartment {
                id: id.clone(),
                clinic_id,
                name,
                description: non_blank(info.description),
                is_active: true,
                created_at: Utc::now().naive_utc(),
            };
            diesel::insert_into(departments::table)
                .values(&data)
                .execute(conn)
                .map_err(|err| conflict_on_unique(err, DUPLICATE_DEPARTMENT))?;
            Ok(departments::table.find(&id).get_result::<Department>(conn)?)
        })
    })
    .await?;

    Ok(DataResponse::ok(depart.into()))
}

async fn modify_depart_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: ModifyDepartRequest,
) -> Result<SimpleResponse, ApiError> {
    use crate::schema::departments;

    let department_id = required(info.department_id, "departmentId")?;
    let data = UpdateDepartment {
        name: non_blank(info.name),
        description: non_blank(info.description),
        is_active: info.is_active,
    };
    if data.name.is_none() && data.description.is_none() && data.is_active.is_none() {
        return Err(ApiError::validation("Nothing to update"));
    }

    database::run(&pool, move |conn| {
        let depart = assert::assert_department(conn, &department_id)?;
        caller.authorize(&depart.clinic_id, Action::ConfigureClinic)?;
        diesel::update(departments::table.find(&department_id))
            .set(&data)
            .execute(conn)
            .map_err(|err| conflict_on_unique(err, DUPLICATE_DEPARTMENT))?;
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn add_doctor_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: AddDoctorRequest,
) -> Result<DataResponse<DoctorItem>, ApiError> {
    use crate::schema::doctors;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    let department_id = required(info.department_id, "departmentId")?;
    let name = required(info.name, "name")?;
    caller.authorize(&clinic_id, Action::ConfigureClinic)?;

    let available_days = utils::normalize_days(info.available_days.unwrap_or_default())?;
    let available_times = utils::normalize_times(info.available_times.unwrap_or_default())?;

    let doc = database::run(&pool, move |conn| {
        conn.immediate_transaction(|conn| {
            assert::assert_clinic(conn, &clinic_id)?;
            let depart = assert::assert_department_in_clinic(conn, &department_id, &clinic_id)?;

            let id = sequences::next_display_id(conn, Sequence::Doctor)?;
            let data = NewDoctor {
                id: id.clone(),
                clinic_id,
                department_id: depart.id,
                name,
                specialization: non_blank(info.specialization),
                available_days,
                available_times,
                is_active: true,
                created_at: Utc::now().naive_utc(),
            };
            diesel::insert_into(doctors::table)
                .values(&data)
                .execute(conn)?;

            let doc = doctors::table.find(&id).get_result::<Doctor>(conn)?;
            Ok(DoctorItem::new(doc, Some(depart.name)))
        })
    })
    .await?;

    Ok(DataResponse::ok(doc))
}

async fn modify_doctor_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: ModifyDoctorRequest,
) -> Result<SimpleResponse, ApiError> {
    use crate::schema::doctors;

    let doctor_id = required(info.doctor_id, "doctorId")?;
    let mut data = UpdateDoctor {
        department_id: non_blank(info.department_id),
        name: non_blank(info.name),
        specialization: non_blank(info.specialization),
        is_active: info.is_active,
        ..Default::default()
    };
    if let Some(days) = info.available_days {
        data.available_days = Some(utils::normalize_days(days)?);
    }
    if let Some(times) = info.available_times {
        data.available_times = Some(utils::normalize_times(times)?);
    }
    if data.department_id.is_none()
        && data.name.is_none()
        && data.specialization.is_none()
        && data.available_days.is_none()
        && data.available_times.is_none()
        && data.is_active.is_none()
    {
        return Err(ApiError::validation("Nothing to update"));
    }

    database::run(&pool, move |conn| {
        conn.immediate_transaction(|conn| {
            let doc = assert::assert_doctor(conn, &doctor_id)?;
            caller.authorize(&doc.clinic_id, Action::ConfigureClinic)?;
            if let Some(department_id) = &data.department_id {
                assert::assert_department_in_clinic(conn, department_id, &doc.clinic_id)?;
            }
            diesel::update(doctors::table.find(&doctor_id))
                .set(&data)
                .execute(conn)?;
            Ok(())
        })
    })
    .await?;

    Ok(SimpleResponse::ok())
}

async fn search_appoint_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: SearchAppointRequest,
) -> Result<ListResponse<AppointmentItem, AppointFilters>, ApiError> {
    use crate::schema::appointments as appoint_table;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    caller.authorize(&clinic_id, Action::View)?;

    let status = non_blank(info.status);
    if let Some(status) = &status {
        if !appointments::ALL_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::validation("Wrong value on 'status'"));
        }
    }
    let date_from = non_blank(info.date_from);
    if let Some(date) = &date_from {
        common::parse_date("dateFrom", date)?;
    }
    let date_to = non_blank(info.date_to);
    if let Some(date) = &date_to {
        common::parse_date("dateTo", date)?;
    }
    let (limit, offset) = page_bounds(info.limit, info.offset);
    let filters = AppointFilters {
        clinic_id,
        doctor_id: non_blank(info.doctor_id),
        status,
        patient_name: non_blank(info.patient_name),
        date_from,
        date_to,
    };

    let echoed = filters.clone();
    let (appoints, total) = database::run(&pool, move |conn| {
        let total = utils::filtered_appointments(&filters)
            .count()
            .get_result::<i64>(conn)?;
        let appoints = utils::filtered_appointments(&filters)
            .order((
                appoint_table::appointment_date.asc(),
                appoint_table::appointment_time.asc(),
            ))
            .offset(offset)
            .limit(limit)
            .load::<Appointment>(conn)?;
        Ok((appoints, total))
    })
    .await?;

    let appoints = appoints.into_iter().map(AppointmentItem::from).collect();
    Ok(ListResponse::new(appoints, total, limit, offset, echoed))
}

async fn update_appoint_status_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: UpdateAppointStatusRequest,
) -> Result<DataResponse<AppointmentItem>, ApiError> {
    use crate::schema::appointments as appoint_table;

    let appointment_id = required(info.appointment_id, "appointmentId")?;
    let status = required(info.status, "status")?.to_lowercase();
    if !appointments::ALL_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::validation("Wrong value on 'status'"));
    }

    let appoint = database::run(&pool, move |conn| {
        conn.immediate_transaction(|conn| {
            let appoint = appoint_table::table
                .find(&appointment_id)
                .get_result::<Appointment>(conn)
                .optional()?
                .ok_or_else(|| ApiError::not_found("No such appointment"))?;
            caller.authorize(&appoint.clinic_id, Action::ManageAppointments)?;

            if !appointments::status_transition_allowed(&appoint.status, &status) {
                return Err(ApiError::validation(format!(
                    "Cannot change an appointment from '{}' to '{}'",
                    appoint.status, status
                )));
            }
            diesel::update(appoint_table::table.find(&appointment_id))
                .set((
                    appoint_table::status.eq(&status),
                    appoint_table::updated_at.eq(Utc::now().naive_utc()),
                ))
                .execute(conn)?;
            log::info!(
                "appointment {} moved from {} to {} by {}",
                appointment_id,
                appoint.status,
                status,
                caller.account_id
            );

            Ok(appoint_table::table
                .find(&appointment_id)
                .get_result::<Appointment>(conn)?)
        })
    })
    .await?;

    Ok(DataResponse::ok(appoint.into()))
}

async fn search_walk_in_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: SearchWalkInRequest,
) -> Result<ListResponse<WalkInItem, WalkInFilters>, ApiError> {
    use crate::schema::walk_ins;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    caller.authorize(&clinic_id, Action::View)?;

    let status = non_blank(info.status);
    if let Some(status) = &status {
        if !WALK_IN_STATUSES.contains(&status.as_str()) {
            return Err(ApiError::validation("Wrong value on 'status'"));
        }
    }
    let (limit, offset) = page_bounds(info.limit, info.offset);
    let filters = WalkInFilters { clinic_id, status };

    let echoed = filters.clone();
    let (rows, total) = database::run(&pool, move |conn| {
        let total = utils::filtered_walk_ins(&filters)
            .count()
            .get_result::<i64>(conn)?;
        let rows = utils::filtered_walk_ins(&filters)
            .order((walk_ins::created_at.desc(), walk_ins::id.desc()))
            .offset(offset)
            .limit(limit)
            .load::<WalkIn>(conn)?;
        Ok((rows, total))
    })
    .await?;

    let rows = rows.into_iter().map(WalkInItem::from).collect();
    Ok(ListResponse::new(rows, total, limit, offset, echoed))
}

async fn update_walk_in_status_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: UpdateWalkInStatusRequest,
) -> Result<DataResponse<WalkInItem>, ApiError> {
    use crate::schema::walk_ins;

    let walk_in_id = required(info.walk_in_id, "walkInId")?;
    let status = required(info.status, "status")?.to_lowercase();
    if !WALK_IN_STATUSES.contains(&status.as_str()) {
        return Err(ApiError::validation("Wrong value on 'status'"));
    }

    let row = database::run(&pool, move |conn| {
        let row = walk_ins::table
            .find(&walk_in_id)
            .get_result::<WalkIn>(conn)
            .optional()?
            .ok_or_else(|| ApiError::not_found("No such walk-in"))?;
        let clinic_id = row
            .clinic_id
            .as_deref()
            .ok_or_else(|| ApiError::Forbidden("Walk-in is not attached to a clinic".into()))?;
        caller.authorize(clinic_id, Action::ManageWalkIns)?;

        diesel::update(walk_ins::table.find(&walk_in_id))
            .set(walk_ins::status.eq(&status))
            .execute(conn)?;
        Ok(walk_ins::table.find(&walk_in_id).get_result::<WalkIn>(conn)?)
    })
    .await?;

    Ok(DataResponse::ok(row.into()))
}

async fn add_member_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: AddMemberRequest,
) -> Result<DataResponse<MemberItem>, ApiError> {
    use crate::schema::clinic_users;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    let account_id = required(info.account_id, "accountId")?;
    let role: Role = required(info.role, "role")?.parse()?;
    caller.authorize(&clinic_id, Action::ManageMembers)?;

    let member = database::run(&pool, move |conn| {
        conn.immediate_transaction(|conn| {
            assert::assert_clinic(conn, &clinic_id)?;
            let existing = clinic_users::table
                .filter(clinic_users::account_id.eq(&account_id))
                .filter(clinic_users::clinic_id.eq(&clinic_id))
                .get_result::<ClinicUser>(conn)
                .optional()?;

            match existing {
                Some(member) if member.is_active => {
                    return Err(ApiError::Conflict(
                        "Account is already a member of this clinic".into(),
                    ));
                }
                // former members come back with the new role
                Some(member) => {
                    diesel::update(clinic_users::table.find(member.id))
                        .set((
                            clinic_users::role.eq(role.as_str()),
                            clinic_users::is_active.eq(true),
                        ))
                        .execute(conn)?;
                }
                None => {
                    let data = NewClinicUser {
                        account_id: account_id.clone(),
                        clinic_id: clinic_id.clone(),
                        role: role.as_str().to_string(),
                        is_active: true,
                        created_at: Utc::now().naive_utc(),
                    };
                    diesel::insert_into(clinic_users::table)
                        .values(&data)
                        .execute(conn)?;
                }
            }
            log::info!(
                "account {} added {} to clinic {} as {}",
                caller.account_id,
                account_id,
                clinic_id,
                role
            );

            Ok(clinic_users::table
                .filter(clinic_users::account_id.eq(&account_id))
                .filter(clinic_users::clinic_id.eq(&clinic_id))
                .get_result::<ClinicUser>(conn)?)
        })
    })
    .await?;

    Ok(DataResponse::ok(member.into()))
}

async fn remove_member_impl(
    pool: web::Data<DbPool>,
    caller: Caller,
    info: RemoveMemberRequest,
) -> Result<SimpleResponse, ApiError> {
    use crate::schema::clinic_users;

    let clinic_id = required(info.clinic_id, "clinicId")?;
    let account_id = required(info.account_id, "accountId")?;
    caller.authorize(&clinic_id, Action::ManageMembers)?;
    if account_id == caller.account_id {
        return Err(ApiError::validation("You cannot remove yourself from a clinic"));
    }

    database::run(&pool, move |conn| {
        let res = diesel::update(
            clinic_users::table
                .filter(clinic_users::account_id.eq(&account_id))
                .filter(clinic_users::clinic_id.eq(&clinic_id))
                .filter(clinic_users::is_active.eq(true)),
        )
        .set(clinic_users::is_active.eq(false))
        .execute(conn)?;
        if res == 0 {
            return Err(ApiError::not_found("No such member"));
        }
        log::info!(
            "account {} removed {} from clinic {}",
            caller.account_id,
            account_id,
            clinic_id
        );
        Ok(())
    })
    .await?;

    Ok(SimpleResponse::ok())
}
