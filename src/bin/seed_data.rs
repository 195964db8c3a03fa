//! Seed data script: populates the database with a small demo supply chain.
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates an admin, a farmer and a processor, one approved farm, and
//! two batches driven through the lifecycle engine (one completed, one in
//! progress with an open quality issue).

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use rand::Rng;
use rust_decimal_macros::dec;
use tokio::sync::mpsc;
use tracing::info;

use woolchain_api::{
    config, db,
    entities::user,
    events::{process_events, EventSender, LogTransport},
    models::{
        Actor, ApprovalStatus, BatchStatus, FarmCertification, FarmLocation, IssueReport, IssueType,
        Location, QualityCheck, QualityMetrics, RevenueEstimate, Severity, SnapshotPeriod, Stage, UserRole,
        Weight,
    },
    services::{
        analytics::AnalyticsService,
        farms::{FarmService, RegisterFarmInput},
        lifecycle::{BatchUpdateInput, CreateBatchInput, LifecycleService},
        users::{RegisterUserInput, UserService},
    },
};

fn actor(user: &user::Model, company: Option<&str>) -> Actor {
    Actor {
        user_id: user.id,
        name: user.name.clone(),
        role: user.role,
        company: company.map(str::to_string),
        contact_email: Some(user.email.clone()),
        contact_phone: user.phone.clone(),
    }
}

fn mill(name: &str, city: &str) -> Location {
    Location {
        facility_name: Some(name.to_string()),
        city: Some(city.to_string()),
        country: Some("New Zealand".to_string()),
        ..Default::default()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load_config().context("failed to load configuration")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    info!("=== Woolchain Seed Data ===");
    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;
    let pool = Arc::new(pool);

    let (tx, rx) = mpsc::channel(cfg.event_channel_capacity);
    let events = Arc::new(EventSender::new(tx));
    let notifier = tokio::spawn(process_events(rx, Arc::new(LogTransport)));

    let users = UserService::new(pool.clone());
    let farms = FarmService::new(pool.clone(), events.clone());
    let lifecycle = LifecycleService::new(pool.clone(), events.clone());
    let analytics = AnalyticsService::new(pool.clone(), events.clone());

    info!("Creating users...");
    let register = |name: &str, email: &str, role: UserRole| RegisterUserInput {
        name: name.to_string(),
        email: email.to_string(),
        password: "woolchain-demo".to_string(),
        role,
        phone: None,
        farm_id: None,
    };
    let admin = users
        .register_user(register("Ada Admin", "admin@woolchain.test", UserRole::Admin))
        .await?;
    let farmer = users
        .register_user(register("Fern Farmer", "farmer@woolchain.test", UserRole::Farmer))
        .await?;
    let processor = users
        .register_user(register("Pat Processor", "processor@woolchain.test", UserRole::Processor))
        .await?;

    info!("Registering farm...");
    let farm = farms
        .register_farm(RegisterFarmInput {
            name: "Glenmore Station".to_string(),
            owner_id: farmer.id,
            location: FarmLocation {
                city: Some("Twizel".to_string()),
                state: Some("Canterbury".to_string()),
                country: Some("New Zealand".to_string()),
                ..Default::default()
            },
            contact: Default::default(),
            certifications: vec![FarmCertification {
                name: "BioGro Organic".to_string(),
                issued_by: "BioGro NZ".to_string(),
                certificate_number: Some("BG-4471".to_string()),
                issued_date: Some(Utc::now() - Duration::days(200)),
                expiry_date: Some(Utc::now() + Duration::days(165)),
                is_organic: true,
                document_url: None,
            }],
            sheep_count: 2400,
            description: Some("High-country merino".to_string()),
        })
        .await?;
    let farm = farms
        .set_approval_status(admin.id, farm.id, ApprovalStatus::Approved, None)
        .await?;
    info!(farm_code = %farm.farm_code, "Farm approved");

    let mut rng = rand::thread_rng();
    let farmer_actor = actor(&farmer, None);
    let processor_actor = actor(&processor, Some("Canterbury Scourers"));
    let start = Utc::now() - Duration::days(40);

    info!("Creating batches...");
    for (n, complete) in [(0_i64, true), (1, false)] {
        let shearing = start + Duration::days(n * 5);
        let batch = lifecycle
            .create_batch(CreateBatchInput {
                farm_id: farm.id,
                batch_code: None,
                weight: Weight::kg(rng.gen_range(180.0..420.0)),
                shearing_date: shearing,
                quality_metrics: QualityMetrics {
                    clean_yield: Some(rng.gen_range(62.0..74.0)),
                    ..Default::default()
                },
                certifications: Vec::new(),
                estimated_completion_date: Some(shearing + Duration::days(30)),
                revenue_estimate: Some(RevenueEstimate {
                    amount: dec!(4850.00),
                    currency: "NZD".to_string(),
                }),
                notes: None,
                is_publicly_visible: Some(true),
                created_by: farmer_actor.clone(),
                origin: None,
            })
            .await?;

        let stages: &[Stage] = if complete { &Stage::ALL[1..] } else { &Stage::ALL[1..4] };
        let mut batch = batch;
        for (step, &stage) in stages.iter().enumerate() {
            let at = shearing + Duration::days(2 * (step as i64 + 1));
            let status = if stage.is_terminal() {
                BatchStatus::Completed
            } else {
                BatchStatus::InProgress
            };
            let mut update = BatchUpdateInput::note(stage, status, processor_actor.clone(), at, "seeded");
            update.location = Some(mill("Canterbury Scourers", "Timaru"));
            if complete && stage == Stage::Sorting {
                update.quality_check = Some(QualityCheck {
                    performed: true,
                    passed: Some(true),
                    inspector: Some(processor.name.clone()),
                    inspection_date: Some(at),
                    findings: None,
                    score: Some(rng.gen_range(80..=98)),
                });
            }
            if !complete && stage == Stage::Sorting {
                update.status = BatchStatus::QualityIssue;
                update.issues = vec![IssueReport {
                    issue_type: IssueType::Contamination,
                    description: "Vegetable matter above tolerance".to_string(),
                    severity: Severity::Medium,
                }];
            }
            batch = lifecycle.apply_update(batch.id, Some(batch.version), update).await?;
        }
        info!(batch_code = %batch.batch_code, stage = %batch.current_stage, "Batch seeded");
    }

    info!("Computing snapshots...");
    for period in [SnapshotPeriod::Daily, SnapshotPeriod::Monthly] {
        analytics.generate_snapshot(period, Utc::now(), "seed-data").await?;
    }

    drop((lifecycle, farms, analytics, events));
    let _ = notifier.await;
    info!("Seed complete");
    Ok(())
}
