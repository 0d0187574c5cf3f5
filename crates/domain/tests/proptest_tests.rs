//! Property-based tests for domain types
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{ChatTurn, DomainError, Prompt, TurnPart, TurnRole};
use proptest::prelude::*;

// ============================================================================
// Prompt Property Tests
// ============================================================================

mod prompt_tests {
    use super::*;

    proptest! {
        #[test]
        fn whitespace_only_is_rejected(s in "[ \t\r\n]{0,32}") {
            prop_assert!(matches!(Prompt::parse(s), Err(DomainError::EmptyMessage)));
        }

        #[test]
        fn text_with_visible_char_is_accepted(
            pre in "[ \t]{0,8}",
            body in "[a-zA-Z0-9?!.]{1,64}",
            post in "[ \t]{0,8}"
        ) {
            let raw = format!("{pre}{body}{post}");
            let prompt = Prompt::parse(raw.clone());
            prop_assert!(prompt.is_ok());
            prop_assert_eq!(prompt.unwrap().into_inner(), raw);
        }
    }
}

// ============================================================================
// ChatTurn Property Tests
// ============================================================================

mod chat_turn_tests {
    use super::*;

    fn role_strategy() -> impl Strategy<Value = TurnRole> {
        prop_oneof![Just(TurnRole::User), Just(TurnRole::Model)]
    }

    proptest! {
        #[test]
        fn text_is_concatenation_of_parts(
            role in role_strategy(),
            texts in prop::collection::vec("[a-z ]{0,16}", 0..6)
        ) {
            let turn = ChatTurn {
                role,
                parts: texts.iter().map(|t| TurnPart { text: t.clone() }).collect(),
            };
            prop_assert_eq!(turn.text(), texts.concat());
        }

        #[test]
        fn json_roundtrip_preserves_turn(
            role in role_strategy(),
            text in "[a-zA-Z0-9 ]{0,32}"
        ) {
            let turn = ChatTurn { role, parts: vec![TurnPart { text }] };
            let json = serde_json::to_string(&turn).unwrap();
            let back: ChatTurn = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(back, turn);
        }
    }
}
