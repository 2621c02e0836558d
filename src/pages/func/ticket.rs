use axum::{body::Bytes, extract::State, Router};
use mysql_common::prelude::FromRow;
use serde::{Deserialize, Serialize};

use super::task::Priority;
use crate::{
    database::{
        resolve::{self, Resolved},
        upsert::{self, Upserted},
        Entity, Reference, Store, StoreError,
    },
    libs::{
        decode,
        dser::deserialize_option_number,
        new_id,
        serial::next_ticket_id,
        time::{TimeFormat, TIME},
        validate::{check_option, check_range, required},
    },
    options,
    pages::{function, AppState},
    Response, ResponseResult,
};

pub fn ticket_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/tickets/upsert", function(upsert_ticket::<S>))
        .route("/tickets/get", function(get_ticket::<S>))
}

options! {
    TicketStatus {
        Open => "Open",
        InProgress => "In Progress",
        Resolved => "Resolved",
        Closed => "Closed",
    } default Open
}

impl TicketStatus {
    fn is_finished(self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

options! {
    Category {
        General => "General",
        Technical => "Technical",
        Billing => "Billing",
        Account => "Account",
        FeatureRequest => "Feature Request",
        BugReport => "Bug Report",
    } default General
}

/// 工单号冲突时的最大尝试次数
pub const MAX_TICKET_ATTEMPTS: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SupportTicket {
    pub id: String,
    /// TKT-NNNNNN
    pub ticket_id: String,
    pub subject: String,
    pub description: String,
    pub contact_id: String,
    pub assigned_to: Option<String>,
    pub priority: Priority,
    pub status: TicketStatus,
    pub category: Category,
    /// 1 ~ 5
    pub satisfaction: Option<i32>,
    pub resolution: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for SupportTicket {
    const TABLE: &'static str = "support_tickets";
    const KEY: &'static str = "ticket_id";
    const NAME: &'static str = "Ticket";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "ticket_id",
        "subject",
        "description",
        "contact_id",
        "assigned_to",
        "priority",
        "status",
        "category",
        "satisfaction",
        "resolution",
        "resolved_at",
        "created_at",
        "updated_at",
    ];

    fn key(&self) -> &str {
        &self.ticket_id
    }
    fn values(&self) -> Vec<mysql::Value> {
        vec![
            self.id.clone().into(),
            self.ticket_id.clone().into(),
            self.subject.clone().into(),
            self.description.clone().into(),
            self.contact_id.clone().into(),
            self.assigned_to.clone().into(),
            self.priority.into(),
            self.status.into(),
            self.category.into(),
            self.satisfaction.into(),
            self.resolution.clone().into(),
            self.resolved_at.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
    fn touch(&mut self, now: &str) {
        self.updated_at = now.to_owned();
    }
}

#[derive(Debug, Deserialize)]
struct TicketPayload {
    ticket_id: Option<String>,
    subject: Option<String>,
    description: Option<String>,
    /// 外部联系人 id，必须存在
    contact_id: Option<String>,
    /// 成员邮箱
    assigned_to: Option<String>,
    priority: Option<String>,
    status: Option<String>,
    category: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number")]
    satisfaction: Option<i64>,
    resolution: Option<String>,
}

struct TicketInput {
    subject: Option<String>,
    description: Option<String>,
    priority: Option<Priority>,
    status: Option<TicketStatus>,
    category: Option<Category>,
    satisfaction: Option<i32>,
    resolution: Option<String>,
    contact_id: Option<String>,
    assigned_to: Resolved,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl TicketInput {
    fn parse<S: Store>(store: &S, payload: TicketPayload) -> Result<Self, Response> {
        let priority = check_option("priority", payload.priority.as_deref())?;
        let status = check_option("status", payload.status.as_deref())?;
        let category = check_option("category", payload.category.as_deref())?;
        let satisfaction = check_range("satisfaction", payload.satisfaction, 1, 5)?;
        let contact_id = resolve::resolve_required(
            store,
            Reference::Contact,
            "contact_id",
            payload.contact_id.as_deref(),
        )?;
        let assigned_to = resolve::resolve_optional(
            store,
            Reference::TeamMember,
            "assigned_to",
            payload.assigned_to.as_deref(),
        )?;
        Ok(Self {
            subject: trimmed(payload.subject),
            description: trimmed(payload.description),
            priority,
            status,
            category,
            satisfaction,
            resolution: payload.resolution,
            contact_id,
            assigned_to,
        })
    }

    fn apply(&self, ticket: &mut SupportTicket, now: &str) {
        if let Some(subject) = &self.subject {
            ticket.subject = subject.clone();
        }
        if let Some(description) = &self.description {
            ticket.description = description.clone();
        }
        if let Some(contact_id) = &self.contact_id {
            ticket.contact_id = contact_id.clone();
        }
        if let Some(priority) = self.priority {
            ticket.priority = priority;
        }
        if let Some(status) = self.status {
            if status.is_finished() && ticket.resolved_at.is_none() {
                ticket.resolved_at = Some(now.to_owned());
            } else if !status.is_finished() {
                ticket.resolved_at = None;
            }
            ticket.status = status;
        }
        if let Some(category) = self.category {
            ticket.category = category;
        }
        if let Some(satisfaction) = self.satisfaction {
            ticket.satisfaction = Some(satisfaction);
        }
        if let Some(resolution) = &self.resolution {
            ticket.resolution = Some(resolution.clone());
        }
        resolve::apply(&mut ticket.assigned_to, self.assigned_to.clone());
    }

    fn create(&self, ticket_id: String, now: &str) -> SupportTicket {
        let status = self.status.unwrap_or_default();
        SupportTicket {
            id: new_id(),
            ticket_id,
            subject: self.subject.clone().unwrap_or_default(),
            description: self.description.clone().unwrap_or_default(),
            contact_id: self.contact_id.clone().unwrap_or_default(),
            assigned_to: self.assigned_to.clone().flatten(),
            priority: self.priority.unwrap_or_default(),
            status,
            category: self.category.unwrap_or_default(),
            satisfaction: self.satisfaction,
            resolution: self.resolution.clone(),
            resolved_at: status.is_finished().then(|| now.to_owned()),
            created_at: now.to_owned(),
            updated_at: now.to_owned(),
        }
    }
}

/// 读取当前最大工单号加一后写入，唯一键冲突说明被并发请求占用，重新读取后再试
pub fn create_ticket<S, F>(store: &S, build: F) -> Result<SupportTicket, Response>
where
    S: Store,
    F: Fn(String) -> SupportTicket,
{
    for attempt in 1..=MAX_TICKET_ATTEMPTS {
        let latest = store.latest_ticket_id()?;
        let ticket = build(next_ticket_id(latest.as_deref()));
        match store.insert(&ticket) {
            Ok(()) => return Ok(ticket),
            Err(StoreError::Conflict { key, .. }) => {
                tracing::warn!("ticket id {} taken, attempt {}", key, attempt);
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(Response::internal_server_error(format!(
        "Could not allocate a ticket id after {} attempts",
        MAX_TICKET_ATTEMPTS
    )))
}

/// 带 ticket_id 为局部更新，不带则新建并生成工单号
async fn upsert_ticket<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let payload: TicketPayload = decode(&body)?;
    let store = state.store.as_ref();
    let ticket_id = trimmed(payload.ticket_id.clone());
    if ticket_id.is_none() {
        required(&[
            ("subject", payload.subject.as_deref()),
            ("description", payload.description.as_deref()),
            ("contact_id", payload.contact_id.as_deref()),
        ])?;
    }
    let input = TicketInput::parse(store, payload)?;
    let now = TIME::now().format(TimeFormat::YYYYMMDD_HHMMSS);
    let result: Upserted<SupportTicket> = match ticket_id {
        Some(ticket_id) => {
            tracing::info!("update ticket {}", ticket_id);
            upsert::update_existing(store, &ticket_id, |ticket| {
                input.apply(ticket, &now);
                Ok(())
            })?
        }
        None => {
            let ticket = create_ticket(store, |id| input.create(id, &now))?;
            tracing::info!("created ticket {}", ticket.ticket_id);
            Upserted::Created(ticket)
        }
    };
    Ok(result.into_response())
}

#[derive(Debug, Deserialize)]
struct TicketKey {
    ticket_id: Option<String>,
}

async fn get_ticket<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let key: TicketKey = decode(&body)?;
    required(&[("ticket_id", key.ticket_id.as_deref())])?;
    let ticket_id = key.ticket_id.unwrap_or_default();
    upsert::fetch::<S, SupportTicket>(state.store.as_ref(), ticket_id.trim())
}
