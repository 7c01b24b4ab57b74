//! Conversation transition function.
//!
//! `ConversationEngine::transition` is pure: given the current session and a
//! normalized inbound text it returns the next session, the reply, and a
//! report draft when a description completes the cycle. Every input in every
//! stage yields a reply; unknown category tokens are a self-loop, not an error.

use std::sync::Arc;

use crate::domain::foundation::{DeliveryId, StateMachine, Timestamp};

use super::{messages, CategoryRegistry, ConversationSession, ReportDraft, Stage};

/// Output of one transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub session: ConversationSession,
    pub reply: String,
    pub draft: Option<ReportDraft>,
}

/// Drives callers through greeting, category selection and description.
#[derive(Debug, Clone)]
pub struct ConversationEngine {
    registry: Arc<CategoryRegistry>,
}

impl ConversationEngine {
    pub fn new(registry: Arc<CategoryRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn transition(
        &self,
        session: &ConversationSession,
        input: &str,
        delivery_id: &DeliveryId,
        now: Timestamp,
    ) -> Transition {
        let conversation_id = session.conversation_id().clone();

        let transition = match (session.stage(), session.selected_category()) {
            (Stage::AwaitCategory, _) => match self.registry.lookup(input) {
                Some(category) => Transition {
                    reply: messages::category_confirmed(category),
                    session: ConversationSession::awaiting_description(
                        conversation_id,
                        category.clone(),
                        now,
                    ),
                    draft: None,
                },
                None => Transition {
                    reply: messages::option_not_understood(self.registry.menu_text()),
                    session: ConversationSession::awaiting_category(conversation_id, now),
                    draft: None,
                },
            },
            (Stage::AwaitDescription, Some(category)) => Transition {
                reply: messages::report_recorded(category),
                draft: Some(ReportDraft {
                    conversation_id: conversation_id.clone(),
                    category: category.clone(),
                    description: input.to_string(),
                    occurred_at: now,
                }),
                session: ConversationSession::default_for(conversation_id, now),
            },
            // `Start`, and the unrepresentable description stage without a category.
            _ => Transition {
                reply: messages::greeting(self.registry.menu_text()),
                session: ConversationSession::awaiting_category(conversation_id, now),
                draft: None,
            },
        };

        debug_assert!(session.stage().can_transition_to(&transition.session.stage()));

        tracing::debug!(
            conversation_id = %session.conversation_id(),
            delivery_id = %delivery_id,
            from = session.stage().as_str(),
            to = transition.session.stage().as_str(),
            draft = transition.draft.is_some(),
            "Conversation transition"
        );

        transition
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ConversationId;
    use crate::domain::intake::{normalize, CategoryCode};
    use proptest::prelude::*;

    fn engine() -> ConversationEngine {
        ConversationEngine::new(Arc::new(CategoryRegistry::standard().unwrap()))
    }

    fn caller() -> ConversationId {
        ConversationId::new("+91999").unwrap()
    }

    fn delivery() -> DeliveryId {
        DeliveryId::new("SM0001").unwrap()
    }

    fn start() -> ConversationSession {
        ConversationSession::default_for(caller(), Timestamp::now())
    }

    fn awaiting_category() -> ConversationSession {
        ConversationSession::awaiting_category(caller(), Timestamp::now())
    }

    fn awaiting_description(main: &str, sub: &str) -> ConversationSession {
        ConversationSession::awaiting_description(
            caller(),
            CategoryCode::new(main, sub),
            Timestamp::now(),
        )
    }

    mod start_stage {
        use super::*;

        #[test]
        fn any_input_moves_to_category_selection_with_menu() {
            let engine = engine();
            for input in ["hi", "", "3", "help me"] {
                let t = engine.transition(&start(), input, &delivery(), Timestamp::now());

                assert_eq!(t.session.stage(), Stage::AwaitCategory);
                assert_eq!(t.reply, messages::greeting(engine.registry().menu_text()));
                assert!(t.draft.is_none());
            }
        }
    }

    mod await_category_stage {
        use super::*;

        #[test]
        fn valid_token_selects_category() {
            let engine = engine();
            let t = engine.transition(&awaiting_category(), "3", &delivery(), Timestamp::now());

            assert_eq!(t.session.stage(), Stage::AwaitDescription);
            assert_eq!(
                t.session.selected_category(),
                Some(&CategoryCode::new("ACCOUNT", "ACCOUNT_TAKEOVER"))
            );
            assert!(t.reply.contains("*ACCOUNT*"));
            assert!(t.reply.contains("describe what happened"));
            assert!(t.draft.is_none());
        }

        #[test]
        fn other_alias_selects_catch_all() {
            let engine = engine();
            let input = normalize(" 🔟 ");
            let t = engine.transition(&awaiting_category(), &input, &delivery(), Timestamp::now());

            assert_eq!(
                t.session.selected_category(),
                Some(&CategoryCode::new("OTHER", "OTHER_UNSURE"))
            );
        }

        #[test]
        fn unknown_token_reprints_menu() {
            let engine = engine();
            for input in ["0", "abc", "11", ""] {
                let t = engine.transition(&awaiting_category(), input, &delivery(), Timestamp::now());

                assert_eq!(t.session.stage(), Stage::AwaitCategory);
                assert!(t.session.selected_category().is_none());
                assert_eq!(
                    t.reply,
                    messages::option_not_understood(engine.registry().menu_text())
                );
                assert!(t.draft.is_none());
            }
        }
    }

    mod await_description_stage {
        use super::*;

        #[test]
        fn description_completes_report_and_resets() {
            let engine = engine();
            let session = awaiting_description("ACCOUNT", "ACCOUNT_TAKEOVER");
            let now = Timestamp::now();
            let t = engine.transition(&session, "They asked for my OTP", &delivery(), now);

            assert_eq!(t.session.stage(), Stage::Start);
            assert!(t.session.selected_category().is_none());
            assert!(t.reply.contains("*ACCOUNT*"));

            let draft = t.draft.unwrap();
            assert_eq!(draft.conversation_id, caller());
            assert_eq!(draft.category, CategoryCode::new("ACCOUNT", "ACCOUNT_TAKEOVER"));
            assert_eq!(draft.description, "They asked for my OTP");
            assert_eq!(draft.occurred_at, now);
        }

        #[test]
        fn empty_description_is_accepted_verbatim() {
            let engine = engine();
            let session = awaiting_description("LOAN", "LOAN_SCAM");
            let t = engine.transition(&session, "", &delivery(), Timestamp::now());

            assert_eq!(t.session.stage(), Stage::Start);
            assert_eq!(t.draft.unwrap().description, "");
        }

        #[test]
        fn category_token_is_treated_as_description() {
            let engine = engine();
            let session = awaiting_description("JOB", "JOB_SCAM");
            let t = engine.transition(&session, "3", &delivery(), Timestamp::now());

            let draft = t.draft.unwrap();
            assert_eq!(draft.category.main_code(), "JOB");
            assert_eq!(draft.description, "3");
        }
    }

    proptest! {
        #[test]
        fn start_always_greets(input in ".{0,64}") {
            let engine = engine();
            let t = engine.transition(&start(), &normalize(&input), &delivery(), Timestamp::now());
            prop_assert_eq!(t.session.stage(), Stage::AwaitCategory);
            prop_assert!(t.draft.is_none());
        }

        #[test]
        fn unregistered_tokens_self_loop(input in "[a-z]{1,8}|[0-9]{3,6}|0|1[1-9]") {
            let engine = engine();
            let t = engine.transition(&awaiting_category(), &normalize(&input), &delivery(), Timestamp::now());
            prop_assert_eq!(t.session.stage(), Stage::AwaitCategory);
            prop_assert!(t.reply.ends_with(engine.registry().menu_text()));
        }

        #[test]
        fn description_always_emits_one_draft(input in ".{0,200}") {
            let engine = engine();
            let description = normalize(&input);
            let t = engine.transition(
                &awaiting_description("PHISHING", "PHISHING_LINK"),
                &description,
                &delivery(),
                Timestamp::now(),
            );
            prop_assert_eq!(t.session.stage(), Stage::Start);
            prop_assert_eq!(t.draft.map(|d| d.description), Some(description));
        }

        #[test]
        fn selected_category_iff_awaiting_description(steps in proptest::collection::vec("[0-9]{1,2}|[a-z]{0,5}", 0..12)) {
            let engine = engine();
            let mut session = start();
            for step in steps {
                session = engine.transition(&session, &normalize(&step), &delivery(), Timestamp::now()).session;
                prop_assert_eq!(
                    session.selected_category().is_some(),
                    session.stage() == Stage::AwaitDescription
                );
            }
        }
    }
}
