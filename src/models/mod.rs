pub mod account_sessions;
pub mod appointments;
pub mod clinic_users;
pub mod clinics;
pub mod departments;
pub mod doctors;
pub mod walk_ins;
