table! {
    account_sessions (token_hash) {
        token_hash -> Text,
        account_id -> Text,
        issued_at -> Timestamp,
    }
}

table! {
    appointments (id) {
        id -> Text,
        clinic_id -> Text,
        doctor_id -> Text,
        department_id -> Text,
        patient_name -> Text,
        patient_phone -> Text,
        patient_email -> Nullable<Text>,
        appointment_date -> Text,
        appointment_time -> Text,
        status -> Text,
        notes -> Nullable<Text>,
        created_by -> Nullable<Text>,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    clinic_users (id) {
        id -> Integer,
        account_id -> Text,
        clinic_id -> Text,
        role -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

table! {
    clinics (id) {
        id -> Text,
        name -> Text,
        email -> Nullable<Text>,
        phone -> Nullable<Text>,
        address -> Nullable<Text>,
        slug -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
        updated_at -> Timestamp,
    }
}

table! {
    departments (id) {
        id -> Text,
        clinic_id -> Text,
        name -> Text,
        description -> Nullable<Text>,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

table! {
    doctors (id) {
        id -> Text,
        clinic_id -> Text,
        department_id -> Text,
        name -> Text,
        specialization -> Nullable<Text>,
        available_days -> Text,
        available_times -> Text,
        is_active -> Bool,
        created_at -> Timestamp,
    }
}

table! {
    id_sequences (name) {
        name -> Text,
        value -> BigInt,
    }
}

table! {
    walk_ins (id) {
        id -> Text,
        clinic_id -> Nullable<Text>,
        patient_name -> Text,
        patient_phone -> Text,
        patient_email -> Nullable<Text>,
        age -> Nullable<Integer>,
        gender -> Nullable<Text>,
        reason -> Text,
        status -> Text,
        created_at -> Timestamp,
    }
}

allow_tables_to_appear_in_same_query!(
    account_sessions,
    appointments,
    clinic_users,
    clinics,
    departments,
    doctors,
    id_sequences,
    walk_ins,
);
