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

pub fn task_router<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/tasks/upsert", function(upsert_task::<S>))
        .route("/tasks/get", function(get_task::<S>))
}

options! {
    TaskStatus {
        ToDo => "To Do",
        InProgress => "In Progress",
        InReview => "In Review",
        Completed => "Completed",
        Cancelled => "Cancelled",
    } default ToDo
}

options! {
    /// 任务、工单共用的优先级
    Priority {
        Low => "Low",
        Medium => "Medium",
        High => "High",
        Urgent => "Urgent",
    } default Medium
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: String,
    pub task_id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    /// 0 ~ 100
    pub progress_percentage: i32,
    pub due_date: Option<String>,
    pub assigned_to: Option<String>,
    pub assigned_by: Option<String>,
    pub contact_id: Option<String>,
    /// 进入 Completed 的时间
    pub completed_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl Entity for Task {
    const TABLE: &'static str = "tasks";
    const KEY: &'static str = "task_id";
    const NAME: &'static str = "Task";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "task_id",
        "title",
        "description",
        "status",
        "priority",
        "progress_percentage",
        "due_date",
        "assigned_to",
        "assigned_by",
        "contact_id",
        "completed_at",
        "created_at",
        "updated_at",
    ];

    fn key(&self) -> &str {
        &self.task_id
    }
    fn values(&self) -> Vec<mysql::Value> {
        vec![
            self.id.clone().into(),
            self.task_id.clone().into(),
            self.title.clone().into(),
            self.description.clone().into(),
            self.status.into(),
            self.priority.into(),
            self.progress_percentage.into(),
            self.due_date.clone().into(),
            self.assigned_to.clone().into(),
            self.assigned_by.clone().into(),
            self.contact_id.clone().into(),
            self.completed_at.clone().into(),
            self.created_at.clone().into(),
            self.updated_at.clone().into(),
        ]
    }
    fn touch(&mut self, now: &str) {
        self.updated_at = now.to_owned();
    }
}

#[derive(Debug, Deserialize)]
struct TaskPayload {
    task_id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    status: Option<String>,
    priority: Option<String>,
    #[serde(default, deserialize_with = "deserialize_option_number")]
    progress_percentage: Option<i64>,
    due_date: Option<String>,
    /// 成员邮箱
    assigned_to: Option<String>,
    /// 成员邮箱
    assigned_by: Option<String>,
    /// 外部联系人 id
    contact_id: Option<String>,
}

struct TaskInput {
    title: Option<String>,
    description: Option<String>,
    status: Option<TaskStatus>,
    priority: Option<Priority>,
    progress: Option<i32>,
    due_date: Option<String>,
    assigned_to: Resolved,
    assigned_by: Resolved,
    contact_id: Resolved,
}

impl TaskInput {
    fn parse<S: Store>(store: &S, payload: TaskPayload) -> Result<Self, Response> {
        let status = check_option("status", payload.status.as_deref())?;
        let priority = check_option("priority", payload.priority.as_deref())?;
        let progress = check_range("progress_percentage", payload.progress_percentage, 0, 100)?;
        let due_date = check_format("due_date", payload.due_date.as_deref(), TimeFormat::YYYYMMDD)?;
        let assigned_to = resolve::resolve_optional(
            store,
            Reference::TeamMember,
            "assigned_to",
            payload.assigned_to.as_deref(),
        )?;
        let assigned_by = resolve::resolve_optional(
            store,
            Reference::TeamMember,
            "assigned_by",
            payload.assigned_by.as_deref(),
        )?;
        let contact_id = resolve::resolve_optional(
            store,
            Reference::Contact,
            "contact_id",
            payload.contact_id.as_deref(),
        )?;
        Ok(Self {
            title: payload.title.map(|t| t.trim().to_owned()).filter(|t| !t.is_empty()),
            description: payload.description,
            status,
            priority,
            progress,
            due_date,
            assigned_to,
            assigned_by,
            contact_id,
        })
    }

    fn apply(&self, task: &mut Task, now: &str) {
        if let Some(title) = &self.title {
            task.title = title.clone();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(status) = self.status {
            if status != task.status {
                task.completed_at = match status {
                    TaskStatus::Completed => Some(now.to_owned()),
                    _ => None,
                };
            }
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(progress) = self.progress {
            task.progress_percentage = progress;
        }
        if let Some(due_date) = &self.due_date {
            task.due_date = Some(due_date.clone());
        }
        resolve::apply(&mut task.assigned_to, self.assigned_to.clone());
        resolve::apply(&mut task.assigned_by, self.assigned_by.clone());
        resolve::apply(&mut task.contact_id, self.contact_id.clone());
    }

    fn create(&self, now: String) -> Task {
        let status = self.status.unwrap_or_default();
        let completed = status == TaskStatus::Completed;
        Task {
            id: new_id(),
            task_id: new_id(),
            title: self.title.clone().unwrap_or_default(),
            description: self.description.clone(),
            status,
            priority: self.priority.unwrap_or_default(),
            progress_percentage: self.progress.unwrap_or(if completed { 100 } else { 0 }),
            due_date: self.due_date.clone(),
            assigned_to: self.assigned_to.clone().flatten(),
            assigned_by: self.assigned_by.clone().flatten(),
            contact_id: self.contact_id.clone().flatten(),
            completed_at: completed.then(|| now.clone()),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// 带 task_id 为局部更新，不带则新建
async fn upsert_task<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let payload: TaskPayload = decode(&body)?;
    let store = state.store.as_ref();
    let task_id = payload
        .task_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_owned);
    if task_id.is_none() {
        required(&[("title", payload.title.as_deref())])?;
    }
    let input = TaskInput::parse(store, payload)?;
    let now = TIME::now().format(TimeFormat::YYYYMMDD_HHMMSS);
    let result: Upserted<Task> = match task_id {
        Some(task_id) => {
            tracing::info!("update task {}", task_id);
            upsert::update_existing(store, &task_id, |task| {
                input.apply(task, &now);
                Ok(())
            })?
        }
        None => {
            let task = input.create(now);
            tracing::info!("create task {}", task.task_id);
            upsert::create(store, task)?
        }
    };
    Ok(result.into_response())
}

#[derive(Debug, Deserialize)]
struct TaskKey {
    task_id: Option<String>,
}

async fn get_task<S: Store>(State(state): State<AppState<S>>, body: Bytes) -> ResponseResult {
    let key: TaskKey = decode(&body)?;
    required(&[("task_id", key.task_id.as_deref())])?;
    let task_id = key.task_id.unwrap_or_default();
    upsert::fetch::<S, Task>(state.store.as_ref(), task_id.trim())
}
