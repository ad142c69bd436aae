//! Property-based tests for the IMDG analyzer domain models.

use proptest::prelude::*;
use std::collections::HashSet;

use crate::{check_password_hash, generate_password_hash, CollectionName, DocumentChunk, Session};

prop_compose! {
    fn arb_password()(password in "[ -~]{0,24}") -> String {
        password
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    /// A hash verifies its own password and rejects any different one.
    #[test]
    fn prop_password_hash_verifies_only_original(
        password in arb_password(),
        other in arb_password(),
    ) {
        let hash = generate_password_hash(&password);
        prop_assert!(check_password_hash(&hash, &password));
        if other != password {
            prop_assert!(!check_password_hash(&hash, &other));
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_collection_name_accepts_safe_names(name in "[A-Za-z0-9_-]{1,64}") {
        let parsed = CollectionName::parse(&name);
        prop_assert!(parsed.is_ok());
        let parsed = parsed.unwrap();
        prop_assert_eq!(parsed.as_str(), name.as_str());
    }

    #[test]
    fn prop_collection_name_rejects_separators(
        prefix in "[a-z]{0,8}",
        bad in prop::sample::select(vec!['/', '\\', '.', ' ', ':', '\0']),
        suffix in "[a-z]{0,8}",
    ) {
        let name = format!("{}{}{}", prefix, bad, suffix);
        prop_assert!(CollectionName::parse(&name).is_err());
    }

    /// Record ids of one document are exactly "1".."N".
    #[test]
    fn prop_chunk_record_ids_unique_within_document(count in 1usize..200) {
        let ids: Vec<String> = (0..count)
            .map(|i| DocumentChunk::new(i, "text").record_id())
            .collect();
        let unique: HashSet<&String> = ids.iter().collect();
        prop_assert_eq!(unique.len(), count);
        prop_assert_eq!(ids.first().map(String::as_str), Some("1"));
        let last = count.to_string();
        prop_assert_eq!(ids.last(), Some(&last));
    }

    /// Any sequence of logins and logouts leaves the session UUID untouched.
    #[test]
    fn prop_session_uuid_stable_across_auth_changes(ops in prop::collection::vec(any::<bool>(), 0..20)) {
        let mut session = Session::new();
        let id = session.id;
        for login in ops {
            if login {
                session.login("user");
                prop_assert!(session.is_authenticated());
            } else {
                session.logout();
                prop_assert!(!session.is_authenticated());
            }
        }
        prop_assert_eq!(session.id, id);
    }
}
