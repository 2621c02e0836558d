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
        dser::deserialize_option_number,
        new_id,
        time::{TimeFormat, TIME},
        validate::{check_format, check_option, check_range, required},
    },
    options,
    pages::{function, AppState},
    Response, ResponseResult,
};

pub fn appointment_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/appointments/upsert", function(upsert_appointment::<S>))
        .route("/appointments/get", function(get_appointment::<S>))
}

options! {
    MeetingType {
        InPerson => "In Person",
        PhoneCall => "Phone Call",
        VideoCall => "Video Call",
    } default VideoCall
}

options! {
    Purpose {
        Consultation => "Consultation",
        FollowUp => "Follow Up",
        Demo => "Demo",
        Onboarding => "Onboarding",
        Support => "Support",
        Other => "Other",
    } default Consultation
}

options! {
    AppointmentStatus {
        Scheduled => "Scheduled",
        Confirmed => "Confirmed",
        Completed => "Completed",
        Cancelled => "Cancelled",
        NoShow => "No Show",
    } default Scheduled
}

/// 默认时长，分钟
pub const DEFAULT_DURATION: i32 = 30;
pub const MIN_DURATION: i64 = 5;
pub const MAX_DURATION: i64 = 480;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Appointment {
    pub id: String,
    pub appointment_id: String,
    pub title: String,
    pub description: Option<String>,
    pub contact_id: Option<String>,
    pub assigned_to: Option<String>,
    pub calendar_id: Option<String>,
    pub created_by: Option<String>,
    /// YYYY-MM-DD
    pub date: String,
    /// HH:MM
    pub time: String,
    pub duration_minutes: i32,
    pub meeting_type: MeetingType,
    pub purpose: Purpose,
    pub status: AppointmentStatus,
    pub location: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for Appointment {
    const TABLE: &'static str = "appointments";
    const KEY: &'static str = "appointment_id";
    const NAME: &'static str = "Appointment";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "appointment_id",
        "title",
        "description",
        "contact_id",
        "assigned_to",
        "calendar_id",
        "created_by",
        "date",
        "time",
        "duration_minutes",
        "meeting_type",
        "purpose",
        "status",
        "location",
        "created_at",
        "updated_at",
    ];

    fn key(&self) -> &str {
        &self.appointment_id
    }
    fn values(&self) -> Vec<mysql::Value> {
        vec![
            self.id.clone().into(),
            self.appointment_id.clone().into(),
            self.title.clone().into(),
            self.description.clone().into(),
            self.contact_id.clone().into(),
            self.assigned_to.clone().into(),
            self.calendar_id.clone().into(),
            self.created_by.clone().into(),
            self.date.clone().into(),
            self.time.clone().into(),
            self.duration_minutes.into(),
            self.meeting_type.into(),
            self.purpose.into(),
            self.status.into(),
            self.location.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
    fn touch(&mut self, now: &str) {
        self.updated_at = now.to_owned();
    }
}

#[derive(Debug, Deserialize)]
struct AppointmentPayload {
    appointment_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    /// 外部联系人 id
    contact_id: Option<String>,
    /// 成员邮箱
    assigned_to: Option<String>,
    /// 外部日历 id
    calendar_id: Option<String>,
    /// 成员邮箱
    created_by: Option<String>,
    date: Option<String>,
    time: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number")]
    duration_minutes: Option<i64>,
    meeting_type: Option<String>,
    purpose: Option<String>,
    status: Option<String>,
    location: Option<String>,
}

struct AppointmentInput {
    title: Option<String>,
    description: Option<String>,
    date: Option<String>,
    time: Option<String>,
    duration: Option<i32>,
    meeting_type: Option<MeetingType>,
    purpose: Option<Purpose>,
    status: Option<AppointmentStatus>,
    location: Option<String>,
    contact_id: Resolved,
    assigned_to: Resolved,
    calendar_id: Resolved,
    created_by: Resolved,
}

impl AppointmentInput {
    fn parse<S: Store>(store: &S, payload: AppointmentPayload) -> Result<Self, Response> {
        let meeting_type = check_option("meeting_type", payload.meeting_type.as_deref())?;
        let purpose = check_option("purpose", payload.purpose.as_deref())?;
        let status = check_option("status", payload.status.as_deref())?;
        let date = check_format("date", payload.date.as_deref(), TimeFormat::YYYYMMDD)?;
        let time = check_format("time", payload.time.as_deref(), TimeFormat::HHMM)?;
        let duration = check_range(
            "duration_minutes",
            payload.duration_minutes,
            MIN_DURATION,
            MAX_DURATION,
        )?;
        let contact_id = resolve::resolve_optional(
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
        let calendar_id = resolve::resolve_optional(
            store,
            Reference::Calendar,
            "calendar_id",
            payload.calendar_id.as_deref(),
        )?;
        let created_by = resolve::resolve_optional(
            store,
            Reference::TeamMember,
            "created_by",
            payload.created_by.as_deref(),
        )?;
        Ok(Self {
            title: payload.title.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty()),
            description: payload.description,
            date,
            time,
            duration,
            meeting_type,
            purpose,
            status,
            location: payload.location,
            contact_id,
            assigned_to,
            calendar_id,
            created_by,
        })
    }

    fn apply(&self, appointment: &mut Appointment) {
        if let Some(title) = &self.title {
            appointment.title = title.clone();
        }
        if let Some(description) = &self.description {
            appointment.description = Some(description.clone());
        }
        if let Some(date) = &self.date {
            appointment.date = date.clone();
        }
        if let Some(time) = &self.time {
            appointment.time = time.clone();
        }
        if let Some(duration) = self.duration {
            appointment.duration_minutes = duration;
        }
        if let Some(meeting_type) = self.meeting_type {
            appointment.meeting_type = meeting_type;
        }
        if let Some(purpose) = self.purpose {
            appointment.purpose = purpose;
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(location) = &self.location {
            appointment.location = Some(location.clone());
        }
        resolve::apply(&mut appointment.contact_id, self.contact_id.clone());
        resolve::apply(&mut appointment.assigned_to, self.assigned_to.clone());
        resolve::apply(&mut appointment.calendar_id, self.calendar_id.clone());
        resolve::apply(&mut appointment.created_by, self.created_by.clone());
    }

    fn create(&self) -> Appointment {
        let now = TIME::now().format(TimeFormat::YYYYMMDD_HHMMSS);
        Appointment {
            id: new_id(),
            appointment_id: new_id(),
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone(),
            contact_id: self.contact_id.clone().flatten(),
            assigned_to: self.assigned_to.clone().flatten(),
            calendar_id: self.calendar_id.clone().flatten(),
            created_by: self.created_by.clone().flatten(),
            date: self.date.clone().unwrap_or_default(),
            time: self.time.clone().unwrap_or_default(),
            duration_minutes: self.duration.unwrap_or(DEFAULT_DURATION),
            meeting_type: self.meeting_type.unwrap_or_default(),
            purpose: self.purpose.unwrap_or_default(),
            status: self.status.unwrap_or_default(),
            location: self.location.clone(),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// 带 appointment_id 为局部更新，不带则新建
async fn upsert_appointment<S: Store>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> ResponseResult {
    let payload: AppointmentPayload = decode(&body)?;
    let store = state.store.as_ref();
    let appointment_id = payload
        .appointment_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned);
    if appointment_id.is_none() {
        required(&[
            ("title", payload.title.as_deref()),
            ("date", payload.date.as_deref()),
            ("time", payload.time.as_deref()),
        ])?;
    }
    let input = AppointmentInput::parse(store, payload)?;
    let result: Upserted<Appointment> = match appointment_id {
        Some(appointment_id) => {
            tracing::info!("update appointment {}", appointment_id);
            upsert::update_existing(store, &appointment_id, |appointment| {
                input.apply(appointment);
                Ok(())
            })?
        }
        None => {
            let appointment = input.create();
            tracing::info!(
                "create appointment {} on {} {}",
                appointment.appointment_id,
                appointment.date,
                appointment.time
            );
            upsert::create(store, appointment)?
        }
    };
    Ok(result.into_response())
}

#[derive(Debug, Deserialize)]
struct AppointmentKey {
    appointment_id: Option<String>,
}

async fn get_appointment<S: Store>(
    State(state): State<AppState<S>>,
    body: Bytes,
) -> ResponseResult {
    let key: AppointmentKey = decode(&body)?;
    required(&[("appointment_id", key.appointment_id.as_deref())])?;
    let appointment_id = key.appointment_id.unwrap_or_default();
    upsert::fetch::<S, Appointment>(state.store.as_ref(), appointment_id.trim())
}
