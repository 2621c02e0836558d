use axum::{body::Bytes, extract::State, Router};
use mysql_common::prelude::FromRow;
use serde::{Deserialize, Serialize};

use crate::{
    database::{
        resolve::{self, Resolved},
        upsert::{self, Upserted},
        Entity, Reference, Store,
    },
    libs::{
        decode,
        dser::{deserialize_option_number, deserialize_option_text},
        new_id,
        time::{TimeFormat, TIME},
        validate::{check_email, check_option, check_range, required},
    },
    options,
    pages::{function, AppState},
    response::missing_fields,
    Response, ResponseResult,
};

pub fn lead_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/leads/upsert", function(upsert_lead::<S>))
        .route("/leads/get", function(get_lead::<S>))
}

options! {
    /// 线索所处阶段
    LeadStage {
        New => "New",
        Contacted => "Contacted",
        Qualified => "Qualified",
        Proposal => "Proposal",
        Negotiation => "Negotiation",
        Won => "Won",
        Lost => "Lost",
    } default New
}

pub const DEFAULT_SOURCE: &str = "Website";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lead {
    pub id: String,
    pub name: String,
    /// 去重键
    pub phone: String,
    pub email: Option<String>,
    pub source: String,
    pub interest: Option<String>,
    pub stage: LeadStage,
    pub pipeline_id: Option<String>,
    pub contact_id: Option<String>,
    /// 0 ~ 100
    pub score: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for Lead {
    const TABLE: &'static str = "leads";
    const KEY: &'static str = "phone";
    const NAME: &'static str = "Lead";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "phone",
        "email",
        "source",
        "interest",
        "stage",
        "pipeline_id",
        "contact_id",
        "score",
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
            self.source.clone().into(),
            self.interest.clone().into(),
            self.stage.into(),
            self.pipeline_id.clone().into(),
            self.contact_id.clone().into(),
            self.score.into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
    fn touch(&mut self, now: &str) {
        self.updated_at = now.to_owned();
    }
}

#[derive(Debug, Deserialize)]
struct LeadPayload {
    name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_text")]
    phone: Option<String>,
    email: Option<String>,
    source: Option<String>,
    interest: Option<String>,
    stage: Option<String>,
    /// 管道名称
    pipeline: Option<String>,
    /// 外部联系人 id
    contact_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number")]
    score: Option<i64>,
}

/// 校验并完成外键查询后的线索数据
struct LeadInput {
    name: Option<String>,
    phone: String,
    email: Option<String>,
    source: Option<String>,
    interest: Option<String>,
    stage: Option<LeadStage>,
    score: Option<i32>,
    pipeline_id: Resolved,
    contact_id: Resolved,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

impl LeadInput {
    fn parse<S: Store>(store: &S, payload: LeadPayload) -> Result<Self, Response> {
        required(&[("phone", payload.phone.as_deref())])?;
        let stage = check_option("stage", payload.stage.as_deref())?;
        let score = check_range("score", payload.score, 0, 100)?;
        let email = check_email("email", payload.email.as_deref())?;
        let pipeline_id = resolve::resolve_optional(
            store,
            Reference::Pipeline,
            "pipeline",
            payload.pipeline.as_deref(),
        )?;
        let contact_id = resolve::resolve_optional(
            store,
            Reference::Contact,
            "contact_id",
            payload.contact_id.as_deref(),
        )?;
        Ok(Self {
            name: non_empty(payload.name),
            phone: payload.phone.unwrap_or_default().trim().to_owned(),
            email,
            source: non_empty(payload.source),
            interest: non_empty(payload.interest),
            stage,
            score,
            pipeline_id,
            contact_id,
        })
    }

    fn apply(&self, lead: &mut Lead) {
        if let Some(name) = &self.name {
            lead.name = name.clone();
        }
        if let Some(email) = &self.email {
            lead.email = Some(email.clone());
        }
        if let Some(source) = &self.source {
            lead.source = source.clone();
        }
        if let Some(interest) = &self.interest {
            lead.interest = Some(interest.clone());
        }
        if let Some(stage) = self.stage {
            lead.stage = stage;
        }
        if let Some(score) = self.score {
            lead.score = score;
        }
        resolve::apply(&mut lead.pipeline_id, self.pipeline_id.clone());
        resolve::apply(&mut lead.contact_id, self.contact_id.clone());
    }

    /// 新建时才要求 name
    fn create(&self) -> Result<Lead, Response> {
        let name = op::some!(self.name.clone(); ret Err(missing_fields(&["name"])));
        let now = TIME::now().format(TimeFormat::YYYYMMDD_HHMMSS);
        Ok(Lead {
            id: new_id(),
            name,
            phone: self.phone.clone(),
            email: self.email.clone(),
            source: self.source.clone().unwrap_or_else(|| DEFAULT_SOURCE.to_owned()),
            interest: self.interest.clone(),
            stage: self.stage.unwrap_or_default(),
            pipeline_id: self.pipeline_id.clone().flatten(),
            contact_id: self.contact_id.clone().flatten(),
            score: self.score.unwrap_or(0),
            created_at: now.clone(),
            updated_at: now,
        })
    }
}

/// 按手机号新建或更新线索，成功后转发给通知接口
async fn upsert_lead<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let payload: LeadPayload = decode(&body)?;
    let store = state.store.as_ref();
    let input = LeadInput::parse(store, payload)?;
    tracing::info!("upsert lead, phone: {}", input.phone);
    let result: Upserted<Lead> = upsert::upsert(
        store,
        Some(&input.phone),
        |lead| {
            input.apply(lead);
            Ok(())
        },
        || input.create(),
    )?;
    state.notifier.forward("lead", result.record());
    Ok(result.into_response())
}

#[derive(Debug, Deserialize)]
struct LeadKey {
    #[serde(default, deserialize_with = "deserialize_option_text")]
    phone: Option<String>,
}

async fn get_lead<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let key: LeadKey = decode(&body)?;
    required(&[("phone", key.phone.as_deref())])?;
    let phone = key.phone.unwrap_or_default();
    upsert::fetch::<S, Lead>(state.store.as_ref(), phone.trim())
}
