//! Per-chat conversation state.
//!
//! A [`Session`] is a plain value: the transport loads it from its storage,
//! hands it to [`crate::intake::IntakeFlow::handle`] together with one event,
//! and stores whatever comes back. Nothing else holds on to it.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Position of a conversation in the intake flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum State {
    /// No conversation yet; only `/start` is accepted.
    #[default]
    AwaitingStart,
    BuildingType,
    Location,
    FireSafety,
    CustomerId,
    Documents,
    Confirm,
    /// Conversation finished (confirmed, declined, or cancelled).
    Terminal,
}

impl State {
    /// `true` for the six states between `/start` and the end of the flow.
    pub fn is_active(self) -> bool {
        !matches!(self, State::AwaitingStart | State::Terminal)
    }
}

/// The four free-text answers, in the order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Field {
    BuildingType,
    Location,
    FireSafety,
    CustomerId,
}

impl Field {
    /// Prompt order.
    pub const ALL: [Field; 4] = [
        Field::BuildingType,
        Field::Location,
        Field::FireSafety,
        Field::CustomerId,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Field::BuildingType => "building_type",
            Field::Location => "location",
            Field::FireSafety => "fire_safety",
            Field::CustomerId => "customer_id",
        }
    }
}

/// Answers collected so far. A field is `None` until its prompt was answered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answers {
    pub building_type: Option<String>,
    pub location: Option<String>,
    pub fire_safety: Option<String>,
    pub customer_id: Option<String>,
}

impl Answers {
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::BuildingType => self.building_type.as_deref(),
            Field::Location => self.location.as_deref(),
            Field::FireSafety => self.fire_safety.as_deref(),
            Field::CustomerId => self.customer_id.as_deref(),
        }
    }

    pub(crate) fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::BuildingType => &mut self.building_type,
            Field::Location => &mut self.location,
            Field::FireSafety => &mut self.fire_safety,
            Field::CustomerId => &mut self.customer_id,
        };
        *slot = Some(value);
    }

    /// Answered fields in prompt order.
    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL
            .into_iter()
            .filter_map(move |f| self.get(f).map(|v| (f, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }
}

/// One user's conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: State,
    pub answers: Answers,
    /// Where the accepted upload was stored. Set only after the extension passed validation.
    pub document_path: Option<PathBuf>,
    /// OCR text of an accepted image upload. PDF page text is logged, not kept here.
    pub recognized_text: Option<String>,
}

impl Session {
    pub fn is_terminal(&self) -> bool {
        self.state == State::Terminal
    }

    /// A finished session with every partial answer dropped.
    pub fn terminated() -> Self {
        Self {
            state: State::Terminal,
            ..Self::default()
        }
    }
}
