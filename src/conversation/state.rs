//! Where in the dialogue a caller is.
//!
//! The tracker does no language understanding of its own. It trusts the
//! model's declared `intent`, `action` and `data`, and only guarantees the
//! step never goes back to `greeting` and never leaves `complete`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Failed attempts over the whole call, including unreadable model replies,
/// before the caller is handed off. Understood turns do not reset the count.
pub const MAX_ATTEMPTS: u32 = 3;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Greeting,
    IntentDetection,
    AppointmentBooking,
    WalkinRegistration,
    Faq,
    Complete,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    AppointmentBooking,
    WalkinRegistration,
    Faq,
}

impl Intent {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "appointment_booking" | "booking" | "book_appointment" | "appointment" => {
                Some(Intent::AppointmentBooking)
            }
            "walkin_registration" | "walk_in_registration" | "walkin" | "walk_in" => {
                Some(Intent::WalkinRegistration)
            }
            "faq" | "question" | "general_question" => Some(Intent::Faq),
            _ => None,
        }
    }

    pub fn step(self) -> Step {
        match self {
            Intent::AppointmentBooking => Step::AppointmentBooking,
            Intent::WalkinRegistration => Step::WalkinRegistration,
            Intent::Faq => Step::Faq,
        }
    }
}

/// What the model asked the server to do this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Directive {
    Continue,
    BookAppointment,
    RegisterWalkIn,
    EndCall,
}

impl Directive {
    pub fn parse(action: Option<&str>) -> Self {
        let action = action.map(|a| a.trim().to_ascii_lowercase());
        match action.as_deref() {
            Some("book_appointment") | Some("book") => Directive::BookAppointment,
            Some("register_walkin") | Some("register_walk_in") | Some("walkin") => {
                Directive::RegisterWalkIn
            }
            Some("end_call") | Some("end") | Some("hangup") => Directive::EndCall,
            _ => Directive::Continue,
        }
    }
}

/// Structured reply the model is prompted to produce.
#[derive(Deserialize, Debug, Default, PartialEq)]
pub struct ModelReply {
    pub response: String,
    #[serde(default)]
    pub intent: Option<String>,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// Finds the JSON object in the model's text, tolerating prose around it.
pub fn parse_model_reply(raw: &str) -> Option<ModelReply> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&raw[start..=end]).ok()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnPlan {
    pub text: String,
    pub directive: Directive,
    /// `false` when the reply was not structured and the step stalled.
    pub understood: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationState {
    pub step: Step,
    pub intent: Option<Intent>,
    pub collected_data: Map<String, Value>,
    pub attempt_count: u32,
    pub last_activity: DateTime<Utc>,
}

impl ConversationState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            step: Step::Greeting,
            intent: None,
            collected_data: Map::new(),
            attempt_count: 0,
            last_activity: now,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.step == Step::Complete
    }

    /// Every round trip moves past the greeting.
    pub fn begin_turn(&mut self, now: DateTime<Utc>) {
        if self.step == Step::Greeting {
            self.step = Step::IntentDetection;
        }
        self.last_activity = now;
    }

    pub fn select_intent(&mut self, intent: Intent) {
        self.intent = Some(intent);
        if !self.is_complete() {
            self.step = intent.step();
        }
    }

    pub fn apply_reply(&mut self, raw: &str) -> TurnPlan {
        let reply = match parse_model_reply(raw) {
            Some(reply) => reply,
            None => {
                self.attempt_count += 1;
                log::debug!("unstructured model reply, staying at {:?}", self.step);
                return TurnPlan {
                    text: raw.trim().to_string(),
                    directive: Directive::Continue,
                    understood: false,
                };
            }
        };

        if let Some(intent) = reply.intent.as_deref().and_then(Intent::parse) {
            self.select_intent(intent);
        }
        self.merge(reply.data);

        TurnPlan {
            text: reply.response,
            directive: Directive::parse(reply.action.as_deref()),
            understood: true,
        }
    }

    /// Nulls from the model never erase what was already collected.
    fn merge(&mut self, data: Map<String, Value>) {
        for (key, value) in data {
            if !value.is_null() {
                self.collected_data.insert(key, value);
            }
        }
    }

    pub fn forget(&mut self, key: &str) {
        self.collected_data.remove(key);
    }

    /// Counts a failed attempt; `true` once the limit is reached.
    pub fn record_failure(&mut self) -> bool {
        self.attempt_count += 1;
        self.attempts_exhausted()
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.attempt_count >= MAX_ATTEMPTS
    }

    pub fn complete(&mut self) {
        self.step = Step::Complete;
    }

    /// A collected field as text; numbers are accepted too.
    pub fn text_field(&self, key: &str) -> Option<String> {
        match self.collected_data.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> ConversationState {
        ConversationState::new(Utc::now())
    }

    #[test]
    fn first_turn_leaves_greeting() {
        let mut state = state();
        state.begin_turn(Utc::now());
        let plan = state.apply_reply(r#"{"response":"Hi, how can I help?","action":"continue"}"#);

        assert_eq!(state.step, Step::IntentDetection);
        assert_eq!(plan.text, "Hi, how can I help?");
        assert_eq!(plan.directive, Directive::Continue);
    }

    #[test]
    fn unstructured_reply_stalls_with_raw_text() {
        let mut state = state();
        state.begin_turn(Utc::now());
        let plan = state.apply_reply("  Sorry, could you repeat that?  ");

        assert!(!plan.understood);
        assert_eq!(plan.text, "Sorry, could you repeat that?");
        assert_eq!(state.step, Step::IntentDetection);
        assert_eq!(state.attempt_count, 1);
    }

    #[test]
    fn declared_intent_selects_branch_and_merges_data() {
        let mut state = state();
        state.begin_turn(Utc::now());
        state.apply_reply(
            r#"Sure! {"response":"Which doctor?","intent":"appointment_booking","data":{"patientName":"Jane Doe","patientEmail":null}}"#,
        );

        assert_eq!(state.step, Step::AppointmentBooking);
        assert_eq!(state.intent, Some(Intent::AppointmentBooking));
        assert_eq!(state.text_field("patientName").as_deref(), Some("Jane Doe"));
        assert!(!state.collected_data.contains_key("patientEmail"));
    }

    #[test]
    fn nulls_do_not_erase_collected_fields() {
        let mut state = state();
        state.begin_turn(Utc::now());
        state.apply_reply(r#"{"response":"ok","data":{"patientPhone":"5551234567"}}"#);
        state.apply_reply(r#"{"response":"ok","data":{"patientPhone":null}}"#);
        assert_eq!(state.text_field("patientPhone").as_deref(), Some("5551234567"));
    }

    #[test]
    fn never_regresses_to_greeting() {
        let replies = [
            "not json at all",
            r#"{"response":"a","intent":"faq"}"#,
            r#"{"response":"b","intent":"walkin"}"#,
            r#"{"response":"c","intent":"nonsense"}"#,
            "{ broken",
        ];
        let mut state = state();
        for reply in replies {
            state.begin_turn(Utc::now());
            state.apply_reply(reply);
            assert_ne!(state.step, Step::Greeting);
        }
        assert_eq!(state.step, Step::WalkinRegistration);
    }

    #[test]
    fn complete_is_terminal() {
        let mut state = state();
        state.begin_turn(Utc::now());
        state.complete();
        state.apply_reply(r#"{"response":"again?","intent":"appointment_booking"}"#);
        state.begin_turn(Utc::now());
        assert_eq!(state.step, Step::Complete);
    }

    #[test]
    fn failures_exhaust_after_the_limit() {
        let mut state = state();
        for _ in 0..MAX_ATTEMPTS - 1 {
            assert!(!state.record_failure());
        }
        assert!(state.record_failure());
    }

    #[test]
    fn attempts_count_across_understood_turns() {
        let mut state = state();
        state.begin_turn(Utc::now());
        state.apply_reply("garbled");
        state.apply_reply(r#"{"response":"Which day suits you?","intent":"appointment_booking"}"#);
        state.apply_reply("garbled again");
        assert_eq!(state.attempt_count, 2);
        assert!(!state.attempts_exhausted());

        assert!(state.record_failure());
    }

    #[test]
    fn actions_parse_leniently() {
        assert_eq!(Directive::parse(Some("BOOK_APPOINTMENT")), Directive::BookAppointment);
        assert_eq!(Directive::parse(Some("register_walkin")), Directive::RegisterWalkIn);
        assert_eq!(Directive::parse(Some("end_call")), Directive::EndCall);
        assert_eq!(Directive::parse(Some("dance")), Directive::Continue);
        assert_eq!(Directive::parse(None), Directive::Continue);
    }

    #[test]
    fn numbers_read_as_text() {
        let mut state = state();
        state.apply_reply(r#"{"response":"ok","data":{"age":42}}"#);
        assert_eq!(state.text_field("age").as_deref(), Some("42"));
    }
}
