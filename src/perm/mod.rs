pub mod action;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::options;
use action::Action;

options! {
    /// 团队成员角色
    Role {
        Admin => "Admin",
        Manager => "Manager",
        Agent => "Agent",
        Viewer => "Viewer",
    } default Agent
}

/// 权限组 -> 可执行的动作
pub type PermissionMap = BTreeMap<String, Vec<String>>;

/// 成员的权限，库中以 JSON 文本保存
///
/// 调用方可以传任意 JSON 对象覆盖角色默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(pub Value);

impl Permissions {
    pub fn for_role(role: Role) -> Self {
        Self(json!(role_permissions(role)))
    }
    #[cfg(test)]
    fn allows(&self, group: &str, action: &str) -> bool {
        self.0
            .get(group)
            .and_then(Value::as_array)
            .is_some_and(|actions| actions.iter().any(|a| a.as_str() == Some(action)))
    }
}

impl From<String> for Permissions {
    fn from(value: String) -> Self {
        Self(serde_json::from_str(&value).unwrap_or(Value::String(value)))
    }
}

impl mysql::prelude::FromValue for Permissions {
    type Intermediate = String;
}

impl From<Permissions> for mysql::Value {
    fn from(value: Permissions) -> Self {
        mysql::Value::from(value.0.to_string())
    }
}

fn all_actions(filter: impl Fn(&str, &str) -> bool) -> PermissionMap {
    action::groups()
        .into_iter()
        .map(|(group, actions)| {
            let actions = actions
                .into_iter()
                .filter(|a| filter(group, a))
                .map(str::to_owned)
                .collect::<Vec<_>>();
            (group.to_owned(), actions)
        })
        .filter(|(_, actions)| !actions.is_empty())
        .collect()
}

/// 各角色的默认权限
pub fn role_permissions(role: Role) -> PermissionMap {
    match role {
        Role::Admin => all_actions(|_, _| true),
        Role::Manager => all_actions(|group, action| {
            !matches!((group, action), ("team", Action::DELETE | Action::CHANGE_ROLE))
        }),
        Role::Agent => all_actions(|group, action| match group {
            "leads" | "tasks" | "appointments" | "tickets" => {
                matches!(action, Action::VIEW | Action::CREATE | Action::UPDATE)
            }
            "team" | "courses" => action == Action::VIEW,
            _ => false,
        }),
        Role::Viewer => all_actions(|_, action| action == Action::VIEW),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_everything() {
        let perms = Permissions::for_role(Role::Admin);
        assert!(perms.allows("team", Action::CHANGE_ROLE));
        assert!(perms.allows("automations", Action::CONFIGURE));
    }

    #[test]
    fn manager_cannot_touch_roles() {
        let perms = Permissions::for_role(Role::Manager);
        assert!(perms.allows("team", Action::CREATE));
        assert!(!perms.allows("team", Action::CHANGE_ROLE));
        assert!(!perms.allows("team", Action::DELETE));
    }

    #[test]
    fn agent_works_records_but_not_settings() {
        let perms = Permissions::for_role(Role::Agent);
        assert!(perms.allows("leads", Action::UPDATE));
        assert!(!perms.allows("leads", Action::DELETE));
        assert!(!perms.allows("ai_agent", Action::VIEW));
        assert!(role_permissions(Role::Agent).get("automations").is_none());
    }

    #[test]
    fn viewer_only_views() {
        let map = role_permissions(Role::Viewer);
        assert!(map.values().all(|actions| actions == &vec!["view".to_owned()]));
    }

    #[test]
    fn stored_text_round_trips() {
        let perms = Permissions::for_role(Role::Viewer);
        let text = perms.0.to_string();
        assert_eq!(Permissions::from(text), perms);
        assert_eq!(
            Permissions::from("not json".to_owned()),
            Permissions(Value::String("not json".to_owned()))
        );
    }
}
