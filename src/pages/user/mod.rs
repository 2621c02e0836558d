use axum::{body::Bytes, extract::State, Router};
use mysql_common::prelude::FromRow;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    database::{
        upsert::{self, Upserted},
        Entity, Store, StoreError,
    },
    libs::{
        decode,
        dser::deserialize_option_text,
        new_id,
        time::{TimeFormat, TIME},
        validate::{check_email, check_option, required},
    },
    pages::{function, AppState},
    perm::{Permissions, Role},
    response::missing_fields,
    Response, ResponseResult,
};

pub fn user_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/team-members/upsert", function(upsert_member::<S>))
        .route("/team-members/create", function(create_member::<S>))
        .route("/team-members/get", function(get_member::<S>))
}

/// 团队成员
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    /// upsert 的去重键
    pub phone: String,
    pub email: Option<String>,
    pub role: Role,
    pub permissions: Permissions,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for TeamMember {
    const TABLE: &'static str = "team_members";
    const KEY: &'static str = "phone";
    const NAME: &'static str = "Team member";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "phone",
        "email",
        "role",
        "permissions",
        "created_at",
        "updated_at",
    ];

    fn key(&self) -> &str {
        &self.phone
    }
    fn values(&self) -> Vec<mysql::Value> {
        vec![
            self.id.clone().into(),
            self.name.clone().into(),
            self.phone.clone().into(),
            self.email.clone().into(),
            self.role.into(),
            self.permissions.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
    fn touch(&mut self, now: &str) {
        self.updated_at = now.to_owned();
    }
}

#[derive(Debug, Deserialize)]
struct MemberPayload {
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_text")]
    phone: Option<String>,
    email: Option<String>,
    role: Option<String>,
    permissions: Option<Value>,
}

struct MemberInput {
    name: Option<String>,
    phone: String,
    email: Option<String>,
    role: Option<Role>,
    permissions: Option<Permissions>,
}

impl MemberInput {
    fn parse(payload: MemberPayload) -> Result<Self, Response> {
        let role = check_option("role", payload.role.as_deref())?;
        let email = check_email("email", payload.email.as_deref())?;
        let permissions = match payload.permissions {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) => Some(Permissions(Value::Object(map))),
            Some(_) => {
                return Err(Response::invalid_format(
                    "Invalid permissions: expected a JSON object",
                ))
            }
        };
        Ok(Self {
            name: payload.name.map(|n| n.trim().to_owned()).filter(|n| !n.is_empty()),
            phone: payload.phone.unwrap_or_default().trim().to_owned(),
            email,
            role,
            permissions,
        })
    }

    fn apply(&self, member: &mut TeamMember) {
        if let Some(name) = &self.name {
            member.name = name.clone();
        }
        if let Some(email) = &self.email {
            member.email = Some(email.clone());
        }
        if let Some(role) = self.role {
            // 换角色且没有指定权限时重置为新角色的默认权限
            if role != member.role && self.permissions.is_none() {
                member.permissions = Permissions::for_role(role);
            }
            member.role = role;
        }
        if let Some(permissions) = &self.permissions {
            member.permissions = permissions.clone();
        }
    }

    fn create(&self) -> TeamMember {
        let now = TIME::now().format(TimeFormat::YYYYMMDD_HHMMSS);
        let role = self.role.unwrap_or_default();
        TeamMember {
            id: new_id(),
            name: self.name.clone().unwrap_or_default(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            role,
            permissions: self
                .permissions
                .clone()
                .unwrap_or_else(|| Permissions::for_role(role)),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// 邮箱已被另一个手机号占用
fn email_taken<S: Store>(store: &S, email: &str, phone: &str) -> Result<bool, Response> {
    let owner: Option<TeamMember> = store.find_by("email", email)?;
    Ok(owner.is_some_and(|m| m.phone != phone))
}

/// 按手机号新建或更新成员
async fn upsert_member<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let payload: MemberPayload = decode(&body)?;
    required(&[("phone", payload.phone.as_deref())])?;
    let store = state.store.as_ref();
    let input = MemberInput::parse(payload)?;
    if let Some(email) = &input.email {
        if email_taken(store, email, &input.phone)? {
            return Err(Response::already_exist(format!(
                "Email {} is already used by another team member",
                email
            )));
        }
    }
    tracing::info!("upsert team member, phone: {}", input.phone);
    let result: Upserted<TeamMember> = upsert::upsert(
        store,
        Some(&input.phone),
        |member| {
            input.apply(member);
            Ok(())
        },
        || {
            if input.name.is_none() {
                return Err(missing_fields(&["name"]));
            }
            Ok(input.create())
        },
    )?;
    Ok(result.into_response())
}

/// 只新建，邮箱重复时拒绝
async fn create_member<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let payload: MemberPayload = decode(&body)?;
    required(&[
        ("name", payload.name.as_deref()),
        ("email", payload.email.as_deref()),
        ("phone", payload.phone.as_deref()),
    ])?;
    let store = state.store.as_ref();
    let input = MemberInput::parse(payload)?;
    let email = input.email.clone().unwrap_or_default();
    if store.find_by::<TeamMember>("email", &email)?.is_some() {
        return Err(Response::already_exist(format!(
            "A team member with email {} already exists",
            email
        )));
    }
    tracing::info!("create team member, email: {}", email);
    let member = input.create();
    match store.insert(&member) {
        Ok(()) => Ok(Upserted::Created(member).into_response()),
        Err(StoreError::Conflict { .. }) => Err(duplicate_member(store, &member)?),
        Err(e) => Err(e.into()),
    }
}

/// 手机号和邮箱都是唯一键，冲突后重新查询邮箱区分是哪一个
fn duplicate_member<S: Store>(store: &S, member: &TeamMember) -> Result<Response, Response> {
    if let Some(email) = &member.email {
        if store.find_by::<TeamMember>("email", email)?.is_some() {
            return Ok(Response::already_exist(format!(
                "A team member with email {} already exists",
                email
            )));
        }
    }
    Ok(Response::already_exist(format!(
        "A team member with phone {} already exists",
        member.phone
    )))
}

#[derive(Debug, Deserialize)]
struct MemberKey {
    #[serde(default, deserialize_with = "deserialize_option_text")]
    phone: Option<String>,
}

async fn get_member<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let key: MemberKey = decode(&body)?;
    required(&[("phone", key.phone.as_deref())])?;
    let phone = key.phone.unwrap_or_default();
    upsert::fetch::<S, TeamMember>(state.store.as_ref(), phone.trim())
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::*;
    use crate::MemoryStore;

    fn member(phone: &str, email: &str) -> TeamMember {
        TeamMember {
            id: new_id(),
            name: "Lia".to_owned(),
            phone: phone.to_owned(),
            email: Some(email.to_owned()),
            role: Role::Agent,
            permissions: Permissions::for_role(Role::Agent),
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    #[test]
    fn duplicate_names_the_clashing_key() {
        let store = MemoryStore::new();
        store.insert(&member("700", "lia@example.com")).unwrap();

        // 邮箱被另一手机号占用
        let res = duplicate_member(&store, &member("701", "lia@example.com")).unwrap();
        assert_eq!(res.code(), StatusCode::BAD_REQUEST);
        assert_eq!(res.text(), "A team member with email lia@example.com already exists");

        let res = duplicate_member(&store, &member("700", "other@example.com")).unwrap();
        assert_eq!(res.text(), "A team member with phone 700 already exists");
    }
}
