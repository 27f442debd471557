//! Server-held conversation sessions.
//!
//! Clients only echo an opaque session id; the tracker state never leaves
//! the server except as a read-only snapshot in responses. A session is
//! locked for the length of a turn, so a second turn arriving while the
//! first is still talking to the model is refused instead of racing it.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::{error::ApiError, voice::ChatMessage};

use super::state::ConversationState;

/// Exchanges kept as model context, counted in messages.
pub const MAX_HISTORY: usize = 12;

#[derive(Debug)]
pub struct Session {
    pub clinic_id: String,
    pub state: ConversationState,
    pub history: Vec<ChatMessage>,
}

impl Session {
    fn new(clinic_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            clinic_id: clinic_id.to_string(),
            state: ConversationState::new(now),
            history: Vec::new(),
        }
    }

    pub fn record_exchange(&mut self, user_input: &str, reply: &str) {
        if !user_input.trim().is_empty() {
            self.history.push(ChatMessage::user(user_input.trim()));
        }
        self.history.push(ChatMessage::assistant(reply));
        if self.history.len() > MAX_HISTORY {
            let excess = self.history.len() - MAX_HISTORY;
            self.history.drain(..excess);
        }
    }
}

pub type SessionGuard = OwnedMutexGuard<Session>;

pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<Uuid, Arc<AsyncMutex<Session>>>>,
}

fn busy() -> ApiError {
    ApiError::Conflict("This conversation is already processing a turn".into())
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        (now - session.state.last_activity)
            .to_std()
            .map(|idle| idle > self.ttl)
            .unwrap_or(false)
    }

    /// Locks the session for one turn.
    ///
    /// Unknown or expired ids start a fresh session under a new id. A session
    /// that is mid-turn yields `409`.
    pub fn checkout(
        &self,
        session_id: Option<Uuid>,
        clinic_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(Uuid, SessionGuard), ApiError> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);

        // a busy session is in use, so it is not expired
        sessions.retain(|_, slot| match slot.try_lock() {
            Ok(session) => !self.is_expired(&session, now),
            Err(_) => true,
        });

        if let Some(id) = session_id {
            if let Some(slot) = sessions.get(&id) {
                let guard = slot.clone().try_lock_owned().map_err(|_| busy())?;
                if guard.clinic_id != clinic_id {
                    return Err(ApiError::validation(
                        "Session belongs to a different clinic",
                    ));
                }
                return Ok((id, guard));
            }
            log::info!("conversation {} is unknown or expired, starting over", id);
        }

        let id = Uuid::new_v4();
        let slot = Arc::new(AsyncMutex::new(Session::new(clinic_id, now)));
        let guard = slot.clone().try_lock_owned().map_err(|_| busy())?;
        sessions.insert(id, slot);
        log::debug!("started conversation {} for clinic {}", id, clinic_id);
        Ok((id, guard))
    }

    pub fn len(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::state::Step;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(60))
    }

    #[test]
    fn new_sessions_start_at_greeting() {
        let store = store();
        let (_, session) = store.checkout(None, "c1", Utc::now()).unwrap();
        assert_eq!(session.state.step, Step::Greeting);
        assert_eq!(session.clinic_id, "c1");
    }

    #[test]
    fn returning_sessions_keep_their_state() {
        let store = store();
        let now = Utc::now();
        let (id, mut session) = store.checkout(None, "c1", now).unwrap();
        session.state.begin_turn(now);
        drop(session);

        let (again, session) = store.checkout(Some(id), "c1", now).unwrap();
        assert_eq!(again, id);
        assert_eq!(session.state.step, Step::IntentDetection);
    }

    #[test]
    fn overlapping_turns_are_refused() {
        let store = store();
        let now = Utc::now();
        let (id, _held) = store.checkout(None, "c1", now).unwrap();

        assert!(matches!(
            store.checkout(Some(id), "c1", now),
            Err(ApiError::Conflict(_))
        ));
    }

    #[test]
    fn expired_sessions_restart_at_greeting() {
        let store = store();
        let start = Utc::now();
        let (id, mut session) = store.checkout(None, "c1", start).unwrap();
        session.state.begin_turn(start);
        drop(session);

        let later = start + chrono::Duration::seconds(61);
        let (fresh, session) = store.checkout(Some(id), "c1", later).unwrap();
        assert_ne!(fresh, id);
        assert_eq!(session.state.step, Step::Greeting);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn unknown_ids_get_a_new_session() {
        let store = store();
        let stale = Uuid::new_v4();
        let (id, _) = store.checkout(Some(stale), "c1", Utc::now()).unwrap();
        assert_ne!(id, stale);
    }

    #[test]
    fn sessions_are_bound_to_their_clinic() {
        let store = store();
        let now = Utc::now();
        let (id, session) = store.checkout(None, "c1", now).unwrap();
        drop(session);
        assert!(matches!(
            store.checkout(Some(id), "c2", now),
            Err(ApiError::Validation(_))
        ));
    }

    #[test]
    fn history_is_capped() {
        let mut session = Session::new("c1", Utc::now());
        for i in 0..20 {
            session.record_exchange(&format!("question {}", i), "answer");
        }
        assert_eq!(session.history.len(), MAX_HISTORY);
        assert_eq!(session.history.last().unwrap().content, "answer");
    }
}
