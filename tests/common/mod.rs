#![allow(dead_code)]

use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
    time::Duration,
};

use actix_web::web;
use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use serde_json::{json, Value};
use tokio::sync::Notify;

use clinic_desk::{
    auth::hash_token,
    config::Settings,
    conversation::session::SessionStore,
    database::{self, DbPool},
    models::{
        account_sessions::AccountSession, clinic_users::NewClinicUser, clinics::NewClinic,
        departments::NewDepartment, doctors::NewDoctor,
    },
    schema::{account_sessions, clinic_users, clinics, departments, doctors},
    voice::{ChatMessage, LanguageModel, SpeechSynthesizer, VoiceServices},
};

pub const SECRET: &str = "test-voice-secret";
pub const ADMIN_TOKEN: &str = "admin-token";
pub const STAFF_TOKEN: &str = "staff-token";
pub const OUTSIDER_TOKEN: &str = "outsider-token";
pub const STALE_TOKEN: &str = "stale-token";

pub const CLINIC: &str = "c1";
pub const CLINIC_SLUG: &str = "sunrise-clinic";
pub const DEPARTMENT: &str = "dept1";
pub const DOCTOR: &str = "d1";

/// Builds the service the same way `main` does, from a [`TestContext`].
macro_rules! init_app {
    ($ctx:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($ctx.pool.clone())
                .app_data($ctx.sessions.clone())
                .app_data($ctx.voice.clone())
                .app_data($ctx.settings.clone())
                .configure(clinic_desk::configure)
                .default_service(actix_web::web::to(clinic_desk::utils::not_found)),
        )
        .await
    };
}

pub struct TestContext {
    pub pool: web::Data<DbPool>,
    pub sessions: web::Data<SessionStore>,
    pub voice: web::Data<VoiceServices>,
    pub settings: web::Data<Settings>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_voice(VoiceServices::disabled())
    }

    pub fn with_voice(voice: VoiceServices) -> Self {
        let settings = Settings {
            database_url: ":memory:".to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            voice_shared_secret: SECRET.to_string(),
            session_max_age_secs: 3600,
            conversation_ttl: Duration::from_secs(900),
            vendor: None,
        };
        let pool = database::build_pool(&settings.database_url).unwrap();
        database::run_migrations(&pool).unwrap();
        seed(&pool);

        Self {
            pool: web::Data::new(pool),
            sessions: web::Data::new(SessionStore::new(settings.conversation_ttl)),
            voice: web::Data::new(voice),
            settings: web::Data::new(settings),
        }
    }

    pub fn with_model<M: LanguageModel + 'static>(model: Arc<M>) -> Self {
        Self::with_voice(VoiceServices {
            language_model: Some(model as Arc<dyn LanguageModel>),
            synthesizer: Some(Arc::new(FakeSynthesizer) as Arc<dyn SpeechSynthesizer>),
            transcriber: None,
        })
    }

    pub fn count(&self, table: &str) -> i64 {
        let mut conn = self.pool.get().unwrap();
        let sql = format!("SELECT COUNT(*) AS n FROM {}", table);
        diesel::sql_query(sql)
            .get_result::<Count>(&mut conn)
            .unwrap()
            .n
    }
}

/// A migrated and seeded pool over a database file, so that several
/// connections share the same data.
pub fn file_pool(path: &std::path::Path) -> DbPool {
    let url = path.to_str().unwrap();
    let pool = database::build_pool(url).unwrap();
    database::run_migrations(&pool).unwrap();
    seed(&pool);
    pool
}

#[derive(QueryableByName)]
pub struct Count {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    pub n: i64,
}

pub fn seed(pool: &DbPool) {
    let mut conn = pool.get().unwrap();
    let now = Utc::now().naive_utc();

    diesel::insert_into(clinics::table)
        .values(&NewClinic {
            id: CLINIC.into(),
            name: "Sunrise Clinic".into(),
            email: Some("front@sunrise.test".into()),
            phone: Some("+15550001111".into()),
            address: Some("1 Main St".into()),
            slug: CLINIC_SLUG.into(),
            is_active: true,
            created_at: now,
            updated_at: now,
        })
        .execute(&mut conn)
        .unwrap();
    diesel::insert_into(departments::table)
        .values(&NewDepartment {
            id: DEPARTMENT.into(),
            clinic_id: CLINIC.into(),
            name: "Cardiology".into(),
            description: Some("Heart and blood vessels".into()),
            is_active: true,
            created_at: now,
        })
        .execute(&mut conn)
        .unwrap();
    diesel::insert_into(doctors::table)
        .values(&NewDoctor {
            id: DOCTOR.into(),
            clinic_id: CLINIC.into(),
            department_id: DEPARTMENT.into(),
            name: "Dr. Amy Smith".into(),
            specialization: Some("Cardiologist".into()),
            available_days: "[]".into(),
            available_times: "[]".into(),
            is_active: true,
            created_at: now,
        })
        .execute(&mut conn)
        .unwrap();

    let sessions = [
        (ADMIN_TOKEN, "acct-admin", now),
        (STAFF_TOKEN, "acct-staff", now),
        (OUTSIDER_TOKEN, "acct-outsider", now),
        (STALE_TOKEN, "acct-admin", now - chrono::Duration::hours(2)),
    ];
    for (token, account_id, issued_at) in sessions {
        diesel::insert_into(account_sessions::table)
            .values(&AccountSession {
                token_hash: hash_token(token),
                account_id: account_id.into(),
                issued_at,
            })
            .execute(&mut conn)
            .unwrap();
    }

    for (account_id, role) in [("acct-admin", "admin"), ("acct-staff", "staff")] {
        diesel::insert_into(clinic_users::table)
            .values(&NewClinicUser {
                account_id: account_id.into(),
                clinic_id: CLINIC.into(),
                role: role.into(),
                is_active: true,
                created_at: now,
            })
            .execute(&mut conn)
            .unwrap();
    }
}

pub fn booking_body() -> Value {
    json!({
        "clinicId": CLINIC,
        "patientName": "Jane Doe",
        "patientPhone": "+15551234567",
        "doctorId": DOCTOR,
        "departmentId": DEPARTMENT,
        "appointmentDate": "2025-06-01",
        "appointmentTime": "09:00"
    })
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Replays canned replies; `None` stands for a failed vendor call.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Option<String>>>,
    pub seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Option<&str>>) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(|r| r.map(str::to_string)).collect()),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> anyhow::Result<String> {
        self.seen.lock().unwrap().push(messages.to_vec());
        match self.replies.lock().unwrap().pop_front() {
            Some(Some(reply)) => Ok(reply),
            Some(None) => Err(anyhow::anyhow!("vendor unavailable")),
            None => Err(anyhow::anyhow!("no scripted reply left")),
        }
    }
}

/// Holds every call until the gate is opened once per call.
pub struct GatedModel {
    pub gate: Notify,
}

#[async_trait]
impl LanguageModel for GatedModel {
    async fn complete(&self, _messages: &[ChatMessage]) -> anyhow::Result<String> {
        self.gate.notified().await;
        Ok(r#"{"response":"Go on.","action":"continue"}"#.to_string())
    }
}

pub struct FakeSynthesizer;

#[async_trait]
impl SpeechSynthesizer for FakeSynthesizer {
    async fn synthesize(&self, text: &str) -> anyhow::Result<String> {
        Ok(format!("https://audio.test/{}.mp3", text.len()))
    }
}
