// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! User identity resolution (§4.3).

use crate::config::PipelineConfig;
use crate::core::model::{indexmap_like::InsertionOrderedMap, SourceUser};
use crate::core::IntermediateUser;
use crate::ports::ExitHook;

use super::sanitize::cap_runes;

const MAX_NAME_LENGTH: usize = 64;

/// Split a real name into first word + remainder, matching §4.3
/// ("split `real_name` into first word + remainder (last name may be
/// empty)").
fn split_real_name(real_name: &str) -> (String, String) {
    let mut parts = real_name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest = parts.collect::<Vec<_>>().join(" ");
    (first, rest)
}

/// Resolve one [`SourceUser`] into an [`IntermediateUser`].
///
/// `now_millis` is injected rather than read from the system clock so the
/// resolver stays deterministic and testable; callers pass
/// `chrono::Utc::now().timestamp_millis()` in production.
pub fn transform_user(
    source: &SourceUser,
    config: &PipelineConfig,
    exit_hook: &dyn ExitHook,
    now_millis: i64,
) -> IntermediateUser {
    let id = if source.is_bot && !source.profile.bot_id.is_empty() {
        source.profile.bot_id.clone()
    } else {
        source.id.clone()
    };

    let (first_name, last_name) = split_real_name(&source.profile.real_name);
    let position = cap_runes(&source.profile.title, MAX_NAME_LENGTH);

    let email = resolve_email(&source.username, &source.profile.email, config, exit_hook);

    let delete_at = if source.deleted { now_millis } else { 0 };

    IntermediateUser {
        id,
        username: source.username.clone(),
        first_name: cap_runes(&first_name, MAX_NAME_LENGTH),
        last_name: cap_runes(&last_name, MAX_NAME_LENGTH),
        position,
        email,
        password: uuid::Uuid::new_v4().to_string(),
        memberships: Vec::new(),
        delete_at,
    }
}

/// Apply the §4.3 email policy: synthesize `username@domain` when a
/// default domain is configured, else leave blank when
/// `skip_empty_emails` is set, else invoke the exit hook (fatal).
fn resolve_email(
    username: &str,
    email: &str,
    config: &PipelineConfig,
    exit_hook: &dyn ExitHook,
) -> String {
    if !email.is_empty() {
        return email.to_string();
    }
    if let Some(domain) = &config.default_email_domain {
        return format!("{username}@{domain}");
    }
    if config.skip_empty_emails {
        return String::new();
    }
    exit_hook.exit(&format!(
        "user '{username}' has no email and no email policy is configured"
    ));
}

/// Synthesize a placeholder user for a post/channel reference to an id not
/// present in the user catalog (§3 invariant, §9 design note: "keep
/// synthesis idempotent").
pub fn synthesize_placeholder_user(id: &str) -> IntermediateUser {
    IntermediateUser {
        id: id.to_string(),
        username: id.to_lowercase(),
        first_name: "Deleted".to_string(),
        last_name: "User".to_string(),
        position: String::new(),
        email: format!("{id}@local"),
        password: uuid::Uuid::new_v4().to_string(),
        memberships: Vec::new(),
        delete_at: 0,
    }
}

/// Look up a user by id, synthesizing and inserting a placeholder the
/// first time a given id is missing. Subsequent lookups of the same
/// missing id return the same placeholder (idempotent synthesis).
pub fn resolve_or_synthesize<'a>(
    users_by_id: &'a mut InsertionOrderedMap<String, IntermediateUser>,
    id: &str,
) -> &'a IntermediateUser {
    if !users_by_id.contains_key(&id.to_string()) {
        users_by_id.insert(id.to_string(), synthesize_placeholder_user(id));
    }
    users_by_id.get(&id.to_string()).expect("just inserted")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfigBuilder;
    use crate::core::model::{SourceProfile, SourceUser};
    use crate::ports::PanicExitHook;

    fn user(real_name: &str, email: &str) -> SourceUser {
        SourceUser {
            id: "U1".to_string(),
            username: "jane".to_string(),
            is_bot: false,
            deleted: false,
            profile: SourceProfile {
                real_name: real_name.to_string(),
                email: email.to_string(),
                title: "Engineer".to_string(),
                bot_id: String::new(),
            },
        }
    }

    #[test]
    fn splits_real_name_into_first_and_rest() {
        assert_eq!(split_real_name("Jane Jones Doe"), ("Jane".to_string(), "Jones Doe".to_string()));
        assert_eq!(split_real_name("Cher"), ("Cher".to_string(), String::new()));
    }

    #[test]
    fn transform_user_carries_position_and_password() {
        let config = PipelineConfigBuilder::new().with_skip_empty_emails(true).build();
        let resolved = transform_user(&user("Jane Doe", "jane@example.com"), &config, &PanicExitHook, 0);
        assert_eq!(resolved.first_name, "Jane");
        assert_eq!(resolved.last_name, "Doe");
        assert_eq!(resolved.position, "Engineer");
        assert!(!resolved.password.is_empty());
        assert_eq!(resolved.email, "jane@example.com");
    }

    #[test]
    fn bot_user_uses_bot_id_as_intermediate_id() {
        let mut source = user("Bot", "");
        source.is_bot = true;
        source.profile.bot_id = "B123".to_string();
        let config = PipelineConfigBuilder::new().with_skip_empty_emails(true).build();
        let resolved = transform_user(&source, &config, &PanicExitHook, 0);
        assert_eq!(resolved.id, "B123");
    }

    #[test]
    fn missing_email_synthesizes_from_default_domain() {
        let config = PipelineConfigBuilder::new()
            .with_default_email_domain("example.com")
            .build();
        let resolved = transform_user(&user("Jane Doe", ""), &config, &PanicExitHook, 0);
        assert_eq!(resolved.email, "jane@example.com");
    }

    #[test]
    fn missing_email_left_blank_when_skip_configured() {
        let config = PipelineConfigBuilder::new().with_skip_empty_emails(true).build();
        let resolved = transform_user(&user("Jane Doe", ""), &config, &PanicExitHook, 0);
        assert_eq!(resolved.email, "");
    }

    #[test]
    #[should_panic(expected = "no email policy")]
    fn missing_email_with_no_policy_invokes_exit_hook() {
        let config = PipelineConfigBuilder::new().build();
        transform_user(&user("Jane Doe", ""), &config, &PanicExitHook, 0);
    }

    #[test]
    fn placeholder_user_matches_scenario_5() {
        let placeholder = synthesize_placeholder_user("U_MISSING");
        assert_eq!(placeholder.username, "u_missing");
        assert_eq!(placeholder.first_name, "Deleted");
        assert_eq!(placeholder.last_name, "User");
        assert_eq!(placeholder.email, "U_MISSING@local");
    }

    #[test]
    fn resolve_or_synthesize_is_idempotent() {
        let mut users = InsertionOrderedMap::new();
        let first = resolve_or_synthesize(&mut users, "U_MISSING").password.clone();
        let second = resolve_or_synthesize(&mut users, "U_MISSING").password.clone();
        assert_eq!(first, second);
        assert_eq!(users.len(), 1);
    }
}
