//! The voice vendor's per-turn endpoint.
//!
//! Each call loads the caller's server-held session, asks the language model
//! for the next reply, advances the tracker and, when the model says the
//! details are confirmed, books the appointment or registers the walk-in.

pub mod directory;
pub mod prompts;
pub mod session;
pub mod state;

use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    auth::VoiceSecret,
    booking::{self, requests::BookingRequest, responses::BookedAppointment},
    database::{self, DbPool},
    error::ApiError,
    voice::VoiceServices,
    walk_in::{self, requests::WalkInRequest, responses::WalkInItem},
};

use self::{
    directory::ClinicDirectory,
    session::SessionStore,
    state::{ConversationState, Directive, Intent, TurnPlan},
};

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub clinic_id: String,
    pub caller_phone: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRequest {
    #[serde(default)]
    pub user_input: String,
    pub session_id: Option<Uuid>,
    pub context: ConversationContext,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub text: String,
    pub should_end: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub appointment_data: Option<BookedAppointment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub walkin_data: Option<WalkInItem>,
    pub conversation_state: ConversationState,
    pub session_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// The outcome of one turn before speech synthesis.
#[derive(Debug, Default)]
struct Turn {
    text: String,
    should_end: bool,
    appointment_data: Option<BookedAppointment>,
    walkin_data: Option<WalkInItem>,
}

impl Turn {
    fn say<S: Into<String>>(text: S) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

fn booking_request(
    directory: &ClinicDirectory,
    state: &ConversationState,
    caller_phone: Option<&str>,
) -> BookingRequest {
    let doctor = state
        .text_field("doctorId")
        .map(|value| match directory.resolve_doctor(&value) {
            Some(doctor) => (doctor.id.clone(), Some(doctor.department_id.clone())),
            None => (value, None),
        });
    let department_id = state
        .text_field("departmentId")
        .map(|value| match directory.resolve_department(&value) {
            Some(depart) => depart.id.clone(),
            None => value,
        })
        .or_else(|| doctor.as_ref().and_then(|(_, depart)| depart.clone()));

    BookingRequest {
        clinic_id: Some(directory.clinic.id.clone()),
        patient_name: state.text_field("patientName"),
        patient_phone: state
            .text_field("patientPhone")
            .or_else(|| caller_phone.map(str::to_string)),
        patient_email: state.text_field("patientEmail"),
        doctor_id: doctor.map(|(id, _)| id),
        department_id,
        appointment_date: state.text_field("appointmentDate"),
        appointment_time: state.text_field("appointmentTime"),
        notes: state.text_field("notes"),
    }
}

fn walk_in_request(
    directory: &ClinicDirectory,
    state: &ConversationState,
    caller_phone: Option<&str>,
) -> WalkInRequest {
    WalkInRequest {
        clinic_id: Some(directory.clinic.id.clone()),
        patient_name: state.text_field("patientName"),
        patient_phone: state
            .text_field("patientPhone")
            .or_else(|| caller_phone.map(str::to_string)),
        patient_email: state.text_field("patientEmail"),
        age: state.text_field("age").and_then(|age| age.parse().ok()),
        gender: state.text_field("gender"),
        reason: state.text_field("reason"),
    }
}

/// What to tell the caller after a booking or registration was refused.
fn failed_attempt(state: &mut ConversationState, err: ApiError) -> String {
    state.record_failure();
    match err {
        ApiError::Conflict(_) => {
            state.forget("appointmentTime");
            prompts::SLOT_UNAVAILABLE.to_string()
        }
        ApiError::Validation(msg) | ApiError::NotFound(msg) => {
            log::info!("conversation attempt rejected: {}", msg);
            format!("I wasn't able to complete that: {}. Could you help me correct it?", msg)
        }
        err => {
            log::warn!("conversation attempt failed: {}", err);
            prompts::TECHNICAL_DIFFICULTIES.to_string()
        }
    }
}

async fn execute(
    pool: &web::Data<DbPool>,
    directory: &ClinicDirectory,
    state: &mut ConversationState,
    plan: TurnPlan,
    caller_phone: Option<&str>,
) -> Turn {
    let mut turn = Turn::say(plan.text);

    match plan.directive {
        Directive::Continue => {}
        Directive::EndCall => {
            state.complete();
            turn.should_end = true;
        }
        Directive::BookAppointment => {
            state.select_intent(Intent::AppointmentBooking);
            let request = booking_request(directory, state, caller_phone);
            let missing = request.missing_fields();
            if !missing.is_empty() {
                turn.text = prompts::ask_for(&missing);
                return turn;
            }
            match booking::book(pool, request, None).await {
                Ok(booked) => {
                    state.complete();
                    turn.text = prompts::booking_confirmation(&booked);
                    turn.should_end = true;
                    turn.appointment_data = Some(booked);
                }
                Err(err) => turn.text = failed_attempt(state, err),
            }
        }
        Directive::RegisterWalkIn => {
            state.select_intent(Intent::WalkinRegistration);
            let request = walk_in_request(directory, state, caller_phone);
            let missing = request.missing_fields();
            if !missing.is_empty() {
                turn.text = prompts::ask_for(&missing);
                return turn;
            }
            match walk_in::register(pool, request).await {
                Ok(walk_in) => {
                    state.complete();
                    turn.text = prompts::walk_in_confirmation(&walk_in);
                    turn.should_end = true;
                    turn.walkin_data = Some(walk_in);
                }
                Err(err) => turn.text = failed_attempt(state, err),
            }
        }
    }

    if !state.is_complete() && state.attempts_exhausted() {
        log::info!("giving up after {} failed attempts", state.attempt_count);
        state.complete();
        turn.text = prompts::HANDOFF.to_string();
        turn.should_end = true;
    }
    turn
}

pub async fn converse(
    _secret: VoiceSecret,
    pool: web::Data<DbPool>,
    sessions: web::Data<SessionStore>,
    voice: web::Data<VoiceServices>,
    info: web::Json<ConversationRequest>,
) -> Result<HttpResponse, ApiError> {
    let info = info.into_inner();
    let clinic_id = info.context.clinic_id.trim().to_string();
    if clinic_id.is_empty() {
        return Err(ApiError::validation("Missing required fields: context.clinicId"));
    }
    let language_model = voice
        .language_model
        .clone()
        .ok_or_else(|| anyhow::anyhow!("no language model configured"))?;

    let directory = {
        let clinic_id = clinic_id.clone();
        database::run(&pool, move |conn| ClinicDirectory::load(conn, &clinic_id)).await?
    };

    let now = Utc::now();
    let (session_id, mut session) = sessions.checkout(info.session_id, &clinic_id, now)?;
    let caller_phone = info.context.caller_phone.as_deref();

    let turn = if session.state.is_complete() {
        Turn {
            text: prompts::ALREADY_COMPLETE.to_string(),
            should_end: true,
            ..Default::default()
        }
    } else {
        let snapshot = session.state.clone();
        session.state.begin_turn(now);
        let messages = prompts::build_messages(
            &directory,
            &session.state,
            &session.history,
            &info.user_input,
        );

        match language_model.complete(&messages).await {
            Ok(reply) => {
                let plan = session.state.apply_reply(&reply);
                let turn = execute(&pool, &directory, &mut session.state, plan, caller_phone).await;
                session.record_exchange(&info.user_input, &turn.text);
                turn
            }
            Err(err) => {
                log::warn!("language model call failed for {}: {:#}", session_id, err);
                session.state = snapshot;
                session.state.last_activity = now;
                Turn::say(prompts::TECHNICAL_DIFFICULTIES)
            }
        }
    };
    let conversation_state = session.state.clone();
    drop(session);

    let audio_url = match &voice.synthesizer {
        Some(synthesizer) => match synthesizer.synthesize(&turn.text).await {
            Ok(url) => Some(url),
            Err(err) => {
                log::warn!("speech synthesis failed for {}: {:#}", session_id, err);
                None
            }
        },
        None => None,
    };

    Ok(HttpResponse::Ok().json(ConversationResponse {
        text: turn.text,
        should_end: turn.should_end,
        appointment_data: turn.appointment_data,
        walkin_data: turn.walkin_data,
        conversation_state,
        session_id,
        audio_url,
    }))
}
