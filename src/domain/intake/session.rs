//! Per-caller conversation session.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ConversationId, StateMachine, Timestamp};

use super::CategoryCode;

/// Phase of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// No report in progress; the next message gets the greeting.
    #[default]
    Start,

    /// Menu sent, waiting for a category token.
    AwaitCategory,

    /// Category chosen, waiting for the free-text description.
    AwaitDescription,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::AwaitCategory => "await_category",
            Stage::AwaitDescription => "await_description",
        }
    }
}

impl StateMachine for Stage {
    fn valid_transitions(&self) -> Vec<Self> {
        match self {
            Stage::Start => vec![Stage::AwaitCategory],
            Stage::AwaitCategory => vec![Stage::AwaitCategory, Stage::AwaitDescription],
            Stage::AwaitDescription => vec![Stage::Start],
        }
    }
}

/// Stage plus the data that only exists in that stage. Keeping the chosen
/// category inside the `AwaitDescription` variant means a session can never
/// hold a category outside that stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
enum Progress {
    Start,
    AwaitCategory,
    AwaitDescription { category: CategoryCode },
}

/// State of one caller's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationSession {
    conversation_id: ConversationId,
    #[serde(flatten)]
    progress: Progress,
    updated_at: Timestamp,
}

impl ConversationSession {
    /// Fresh session in `Start` for a caller never seen before.
    pub fn default_for(conversation_id: ConversationId, now: Timestamp) -> Self {
        Self {
            conversation_id,
            progress: Progress::Start,
            updated_at: now,
        }
    }

    /// Session waiting for a category selection.
    pub fn awaiting_category(conversation_id: ConversationId, now: Timestamp) -> Self {
        Self {
            conversation_id,
            progress: Progress::AwaitCategory,
            updated_at: now,
        }
    }

    /// Session waiting for the description of a report under `category`.
    pub fn awaiting_description(
        conversation_id: ConversationId,
        category: CategoryCode,
        now: Timestamp,
    ) -> Self {
        Self {
            conversation_id,
            progress: Progress::AwaitDescription { category },
            updated_at: now,
        }
    }

    pub fn conversation_id(&self) -> &ConversationId {
        &self.conversation_id
    }

    pub fn stage(&self) -> Stage {
        match self.progress {
            Progress::Start => Stage::Start,
            Progress::AwaitCategory => Stage::AwaitCategory,
            Progress::AwaitDescription { .. } => Stage::AwaitDescription,
        }
    }

    /// Chosen category; present exactly when the stage is `AwaitDescription`.
    pub fn selected_category(&self) -> Option<&CategoryCode> {
        match &self.progress {
            Progress::AwaitDescription { category } => Some(category),
            _ => None,
        }
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }

    /// True for a `Start` session, which carries no caller-specific data.
    pub fn is_default(&self) -> bool {
        self.progress == Progress::Start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn caller() -> ConversationId {
        ConversationId::new("whatsapp:+91999").unwrap()
    }

    mod stage {
        use super::*;

        #[test]
        fn default_stage_is_start() {
            assert_eq!(Stage::default(), Stage::Start);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&Stage::AwaitDescription).unwrap();
            assert_eq!(json, "\"await_description\"");
        }

        #[test]
        fn follows_intake_cycle() {
            assert!(Stage::Start.can_transition_to(&Stage::AwaitCategory));
            assert!(Stage::AwaitCategory.can_transition_to(&Stage::AwaitCategory));
            assert!(Stage::AwaitCategory.can_transition_to(&Stage::AwaitDescription));
            assert!(Stage::AwaitDescription.can_transition_to(&Stage::Start));
        }

        #[test]
        fn cannot_skip_stages() {
            assert!(!Stage::Start.can_transition_to(&Stage::AwaitDescription));
            assert!(!Stage::AwaitDescription.can_transition_to(&Stage::AwaitCategory));
            assert!(!Stage::AwaitCategory.can_transition_to(&Stage::Start));
        }

        #[test]
        fn no_stage_is_terminal() {
            for stage in [Stage::Start, Stage::AwaitCategory, Stage::AwaitDescription] {
                assert!(!stage.is_terminal());
            }
        }
    }

    mod session {
        use super::*;

        #[test]
        fn default_session_has_no_category() {
            let session = ConversationSession::default_for(caller(), Timestamp::now());
            assert_eq!(session.stage(), Stage::Start);
            assert!(session.selected_category().is_none());
            assert!(session.is_default());
        }

        #[test]
        fn category_present_only_while_awaiting_description() {
            let now = Timestamp::now();
            let code = CategoryCode::new("ACCOUNT", "ACCOUNT_TAKEOVER");

            let awaiting = ConversationSession::awaiting_category(caller(), now);
            assert!(awaiting.selected_category().is_none());
            assert!(!awaiting.is_default());

            let describing = ConversationSession::awaiting_description(caller(), code.clone(), now);
            assert_eq!(describing.stage(), Stage::AwaitDescription);
            assert_eq!(describing.selected_category(), Some(&code));
        }

        #[test]
        fn serializes_stage_alongside_category() {
            let session = ConversationSession::awaiting_description(
                caller(),
                CategoryCode::new("JOB", "JOB_SCAM"),
                Timestamp::now(),
            );
            let json = serde_json::to_value(&session).unwrap();

            assert_eq!(json["stage"], "await_description");
            assert_eq!(json["category"]["main_code"], "JOB");
            assert_eq!(json["conversation_id"], "whatsapp:+91999");
        }
    }
}
