#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tokio::sync::{mpsc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

use woolchain_api::{
    config::AppConfig,
    db,
    entities::{batch, farm, user},
    events::{self, Event, EventSender, NotificationTransport},
    models::{Actor, ApprovalStatus, BatchStatus, FarmLocation, Stage, UserRole, Weight},
    services::{
        farms::RegisterFarmInput,
        lifecycle::{BatchUpdateInput, CreateBatchInput},
        users::RegisterUserInput,
    },
    AppState,
};

/// Keeps every delivered notification as (event name, batch id).
#[derive(Default)]
pub struct RecordingTransport {
    delivered: Mutex<Vec<(&'static str, Option<Uuid>)>>,
}

#[async_trait]
impl NotificationTransport for RecordingTransport {
    async fn deliver(&self, event: &Event) -> Result<(), String> {
        self.delivered.lock().await.push((event.name(), event.batch_id()));
        Ok(())
    }
}

/// Application state backed by a fresh in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    notifications: Arc<RecordingTransport>,
    event_tx: mpsc::Sender<Event>,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // Every pooled connection to sqlite::memory: is its own database.
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.snapshot_worker_enabled = false;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_sender = Arc::new(EventSender::new(event_tx.clone()));
        let notifications = Arc::new(RecordingTransport::default());
        let event_task = tokio::spawn(events::process_events(event_rx, notifications.clone()));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = woolchain_api::build_router(state.clone());

        Self {
            router,
            state,
            notifications,
            event_tx,
            _event_task: event_task,
        }
    }

    /// Waits for the consumer to empty the channel, then takes everything
    /// delivered so far.
    pub async fn drain_notifications(&self) -> Vec<(&'static str, Option<Uuid>)> {
        for _ in 0..1_000 {
            if self.event_tx.capacity() == self.event_tx.max_capacity() {
                break;
            }
            tokio::task::yield_now().await;
        }
        tokio::task::yield_now().await;
        std::mem::take(&mut *self.notifications.delivered.lock().await)
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> axum::response::Response {
        self.request_with_headers(method, uri, body, &[]).await
    }

    pub async fn request_with_headers(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn register_user(&self, name: &str, role: UserRole) -> user::Model {
        let email = format!("{}@woolchain.test", name.to_lowercase().replace(' ', "."));
        self.state
            .services
            .users
            .register_user(RegisterUserInput {
                name: name.to_string(),
                email,
                password: "correct-horse-battery".to_string(),
                role,
                phone: None,
                farm_id: None,
            })
            .await
            .expect("register user")
    }

    pub async fn admin(&self) -> user::Model {
        self.register_user("Ada Admin", UserRole::Admin).await
    }

    /// Registers a farm owned by a new farmer, without approving it.
    pub async fn pending_farm(&self, name: &str) -> farm::Model {
        let owner = self.register_user(&format!("{} Owner", name), UserRole::Farmer).await;
        self.state
            .services
            .farms
            .register_farm(RegisterFarmInput {
                name: name.to_string(),
                owner_id: owner.id,
                location: FarmLocation {
                    address: Some("12 Station Road".to_string()),
                    city: Some("Omarama".to_string()),
                    state: Some("Otago".to_string()),
                    country: Some("New Zealand".to_string()),
                    ..Default::default()
                },
                contact: Default::default(),
                certifications: Vec::new(),
                sheep_count: 1200,
                description: None,
            })
            .await
            .expect("register farm")
    }

    pub async fn approved_farm(&self, name: &str) -> farm::Model {
        let admin = self
            .register_user(&format!("{} Approver", name), UserRole::Admin)
            .await;
        let farm = self.pending_farm(name).await;
        self.state
            .services
            .farms
            .set_approval_status(admin.id, farm.id, ApprovalStatus::Approved, None)
            .await
            .expect("approve farm")
    }

    pub async fn create_batch(&self, farm: &farm::Model, shearing_date: DateTime<Utc>) -> batch::Model {
        self.state
            .services
            .lifecycle
            .create_batch(batch_input(farm, shearing_date))
            .await
            .expect("create batch")
    }

    /// Drives a batch through every stage up to and including `target`, one day apart.
    pub async fn advance_to(&self, mut batch: batch::Model, target: Stage) -> batch::Model {
        let mut at = batch.last_update_date.unwrap_or(batch.shearing_date);
        while batch.current_stage < target {
            let next = batch.current_stage.next().expect("stage below target has a successor");
            at += Duration::days(1);
            let status = if next.is_terminal() {
                BatchStatus::Completed
            } else {
                BatchStatus::InProgress
            };
            batch = self
                .state
                .services
                .lifecycle
                .apply_update(batch.id, Some(batch.version), BatchUpdateInput::note(next, status, processor(), at, "advance"))
                .await
                .expect("advance batch");
        }
        batch
    }
}

pub fn farmer() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        name: "Fern Farmer".to_string(),
        role: UserRole::Farmer,
        company: None,
        contact_email: Some("fern@woolchain.test".to_string()),
        contact_phone: Some("+64 3 555 0101".to_string()),
    }
}

pub fn processor() -> Actor {
    Actor {
        user_id: Uuid::new_v4(),
        name: "Pat Processor".to_string(),
        role: UserRole::Processor,
        company: Some("Valley Scourers".to_string()),
        contact_email: Some("pat@valleyscourers.test".to_string()),
        contact_phone: Some("+64 3 555 0199".to_string()),
    }
}

pub fn batch_input(farm: &farm::Model, shearing_date: DateTime<Utc>) -> CreateBatchInput {
    CreateBatchInput {
        farm_id: farm.id,
        batch_code: None,
        weight: Weight::kg(250.0),
        shearing_date,
        quality_metrics: Default::default(),
        certifications: Vec::new(),
        estimated_completion_date: Some(shearing_date + Duration::days(30)),
        revenue_estimate: None,
        notes: None,
        is_publicly_visible: None,
        created_by: farmer(),
        origin: None,
    }
}

pub async fn read_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not json")
}
