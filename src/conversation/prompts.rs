use std::fmt::Write;

use crate::{
    booking::responses::BookedAppointment, voice::ChatMessage, walk_in::responses::WalkInItem,
};

use super::{directory::ClinicDirectory, state::ConversationState};

pub const TECHNICAL_DIFFICULTIES: &str =
    "I'm sorry, we're having some technical difficulties right now. Please try again in a moment.";
pub const ALREADY_COMPLETE: &str =
    "Thank you for calling. This call has already been completed. Goodbye!";
pub const HANDOFF: &str =
    "I'm sorry, I wasn't able to complete that for you. Please call back during office hours and our staff will help you.";
pub const SLOT_UNAVAILABLE: &str =
    "I'm sorry, that time was just taken. Could you choose another time?";

const INSTRUCTIONS: &str = r#"You are the phone receptionist of a medical clinic. Be brief, warm and speak in plain sentences suitable for text to speech.
You can book appointments, register walk-in patients and answer general questions about the clinic.
Never invent doctors, departments or opening times that are not listed below.

Always reply with a single JSON object and nothing else:
{"response": "<what to say to the caller>",
 "intent": "appointment_booking" | "walkin_registration" | "faq" | null,
 "action": "continue" | "book_appointment" | "register_walkin" | "end_call",
 "data": {<fields learned this turn>}}

Field names for appointments: patientName, patientPhone, patientEmail, doctorId, departmentId, appointmentDate (YYYY-MM-DD), appointmentTime (HH:MM, 24-hour), notes.
Field names for walk-ins: patientName, patientPhone, patientEmail, age, gender (male, female or other), reason.
Use "book_appointment" or "register_walkin" only once the caller has confirmed the details. Use "end_call" when the caller says goodbye."#;

fn clinic_context(directory: &ClinicDirectory) -> String {
    let clinic = &directory.clinic;
    let mut out = format!("Clinic: {}\n", clinic.name);
    if let Some(address) = &clinic.address {
        let _ = writeln!(out, "Address: {}", address);
    }
    if let Some(phone) = &clinic.phone {
        let _ = writeln!(out, "Phone: {}", phone);
    }

    out.push_str("Departments:\n");
    for depart in &directory.departments {
        let _ = write!(out, "- {} (departmentId {})", depart.name, depart.id);
        if let Some(description) = &depart.description {
            let _ = write!(out, ": {}", description);
        }
        out.push('\n');
    }

    out.push_str("Doctors:\n");
    for doctor in &directory.doctors {
        let department = directory
            .department_name(&doctor.department_id)
            .unwrap_or("unknown department");
        let _ = write!(out, "- {} (doctorId {}), {}", doctor.name, doctor.id, department);
        if let Some(specialization) = &doctor.specialization {
            let _ = write!(out, ", {}", specialization);
        }
        let days = doctor.days();
        if !days.is_empty() {
            let _ = write!(out, "; days: {}", days.join(", "));
        }
        let times = doctor.times();
        if !times.is_empty() {
            let _ = write!(out, "; times: {}", times.join(", "));
        }
        out.push('\n');
    }
    out
}

fn state_context(state: &ConversationState) -> String {
    let step = serde_json::to_string(&state.step).unwrap_or_default();
    let collected = serde_json::to_string(&state.collected_data).unwrap_or_default();
    format!(
        "Today is {}. Current step: {}. Details collected so far: {}",
        state.last_activity.format("%Y-%m-%d (%A)"),
        step,
        collected
    )
}

/// System prompt, clinic and dialogue context, recent history, then the
/// caller's words.
pub fn build_messages(
    directory: &ClinicDirectory,
    state: &ConversationState,
    history: &[ChatMessage],
    user_input: &str,
) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 3);
    messages.push(ChatMessage::system(INSTRUCTIONS));
    messages.push(ChatMessage::system(format!(
        "{}\n{}",
        clinic_context(directory),
        state_context(state)
    )));
    messages.extend(history.iter().cloned());

    let user_input = user_input.trim();
    if user_input.is_empty() {
        messages.push(ChatMessage::user("[the caller has just connected]"));
    } else {
        messages.push(ChatMessage::user(user_input));
    }
    messages
}

fn spoken_field(field: &str) -> &str {
    match field {
        "patientName" => "your full name",
        "patientPhone" => "a phone number",
        "doctorId" => "which doctor you would like to see",
        "departmentId" => "which department",
        "appointmentDate" => "the date",
        "appointmentTime" => "the time",
        "reason" => "the reason for your visit",
        other => other,
    }
}

pub fn ask_for(missing: &[&str]) -> String {
    let fields: Vec<&str> = missing.iter().map(|f| spoken_field(f)).collect();
    let list = match fields.split_last() {
        Some((last, [])) => last.to_string(),
        Some((last, rest)) => format!("{} and {}", rest.join(", "), last),
        None => String::new(),
    };
    format!("Before I can finish, I still need {}.", list)
}

pub fn booking_confirmation(booked: &BookedAppointment) -> String {
    format!(
        "You're all set, {}. Your appointment with {} in {} is on {} at {}. Your appointment number is {}.",
        booked.patient_name,
        booked.doctor_name,
        booked.department_name,
        booked.appointment_date,
        booked.appointment_time,
        booked.appointment_id
    )
}

pub fn walk_in_confirmation(walk_in: &WalkInItem) -> String {
    format!(
        "Thank you, {}. You're registered as a walk-in, number {}. Please check in at the front desk when you arrive.",
        walk_in.patient_name, walk_in.walk_in_id
    )
}
