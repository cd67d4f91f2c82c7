//! Session state for one chat run.
//!
//! The state is a snapshot value. Every change goes through [`transition`],
//! so the chat loop never mutates fields directly.

use crate::models::Exchange;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A file was chosen (`present`) or the selection was left empty. An
    /// empty selection locks questions; choosing a file alone never unlocks them.
    FileSelected { present: bool },
    UploadStarted,
    /// The upload endpoint answered; `accepted` is true only for the sentinel message.
    UploadSucceeded { accepted: bool },
    UploadFailed,
    QuestionEdited(String),
    AskStarted,
    AskSucceeded { question: String, reply: String },
    AskFailed,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    exchanges: Vec<Exchange>,
    pending_question: String,
    upload_in_flight: bool,
    question_input_enabled: bool,
    ask_in_flight: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starting state when the backend already holds a document.
    pub fn unlocked() -> Self {
        Self {
            question_input_enabled: true,
            ..Self::default()
        }
    }

    pub fn exchanges(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn pending_question(&self) -> &str {
        &self.pending_question
    }

    pub fn upload_in_flight(&self) -> bool {
        self.upload_in_flight
    }

    pub fn question_input_enabled(&self) -> bool {
        self.question_input_enabled
    }

    pub fn ask_in_flight(&self) -> bool {
        self.ask_in_flight
    }

    pub fn apply(&self, event: SessionEvent) -> Self {
        transition(self, event)
    }
}

pub fn transition(state: &SessionState, event: SessionEvent) -> SessionState {
    let mut next = state.clone();

    match event {
        SessionEvent::FileSelected { present } => {
            if !present {
                next.question_input_enabled = false;
            }
        }
        SessionEvent::UploadStarted => {
            next.upload_in_flight = true;
        }
        SessionEvent::UploadSucceeded { accepted } => {
            next.upload_in_flight = false;
            next.question_input_enabled |= accepted;
        }
        SessionEvent::UploadFailed => {
            next.upload_in_flight = false;
        }
        SessionEvent::QuestionEdited(text) => {
            next.pending_question = text;
        }
        SessionEvent::AskStarted => {
            next.ask_in_flight = true;
        }
        SessionEvent::AskSucceeded { question, reply } => {
            next.exchanges.push(Exchange::human(question));
            next.exchanges.push(Exchange::bot(reply));
            next.pending_question.clear();
            next.ask_in_flight = false;
        }
        SessionEvent::AskFailed => {
            next.ask_in_flight = false;
        }
    }

    next
}
