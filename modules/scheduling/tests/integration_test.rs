use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use sea_orm_migration::MigratorTrait;
use tower::ServiceExt;
use uuid::Uuid;

use scheduling::api::rest::context::{ACTOR_HEADER, TENANT_HEADER};
use scheduling::api::rest::dto::{AppointmentDto, SlotDto};
use scheduling::api::rest::routes;
use scheduling::client::SchedulingApi;
use scheduling::config::SchedulingConfig;
use scheduling::domain::error::DomainError;
use scheduling::domain::service::SchedulingService;
use scheduling::error::SchedulingError;
use scheduling::gateways::local::SchedulingLocalClient;
use scheduling::infra::config::{StaticCourseConfig, StaticProviderConfig};
use scheduling::infra::storage::migrations::Migrator;
use scheduling::infra::storage::SeaOrmSchedulingStore;
use scheduling::model::{
    AppointmentFilter, AppointmentStatus, BlockKind, BookingRequest, NewBlock,
    NewRecurrencePattern,
};

/// Create a fresh test database and service for each test. A single pooled
/// connection keeps concurrent transactions strictly serialized, the same
/// guarantee the production setup gets from the unique slot index.
async fn create_test_service(config: SchedulingConfig) -> Arc<SchedulingService> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);
    let db = Database::connect(options)
        .await
        .expect("Failed to connect to test database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    Arc::new(SchedulingService::new(
        Arc::new(SeaOrmSchedulingStore::new(db)),
        Arc::new(StaticProviderConfig::new(&config)),
        Arc::new(StaticCourseConfig::new(&config)),
    ))
}

fn test_config() -> SchedulingConfig {
    SchedulingConfig::default()
}

fn monday() -> NaiveDate {
    // Any fixed far-future date; the pattern weekday is derived from it.
    NaiveDate::from_ymd_opt(2030, 6, 3).unwrap()
}

fn weekday_of(day: NaiveDate) -> u8 {
    day.weekday().num_days_from_sunday() as u8
}

fn at(day: NaiveDate, h: u32, m: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(day.year(), day.month(), day.day(), h, m, 0)
        .unwrap()
}

/// Weekly pattern on `day`'s weekday, 09:00-11:00 in 30-minute slots
fn morning_pattern(provider_id: Uuid, day: NaiveDate) -> NewRecurrencePattern {
    NewRecurrencePattern {
        provider_id,
        service_type: "lesson".to_string(),
        date_start: day - Duration::days(365),
        date_end: None,
        weekday: weekday_of(day),
        time_start: chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        time_end: chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        slot_duration_minutes: Some(30),
    }
}

fn booking(provider_id: Uuid, student_id: Uuid, course_id: Uuid, day: NaiveDate, h: u32, m: u32) -> BookingRequest {
    BookingRequest {
        provider_id,
        student_id,
        course_id,
        service_type: "lesson".to_string(),
        interval_start: at(day, h, m),
        interval_end: at(day, h, m) + Duration::minutes(30),
    }
}

#[tokio::test]
async fn slots_shrink_as_blocks_and_bookings_land() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;

    let slots = svc.list_slots(tenant, provider, "lesson", day, day).await?;
    assert_eq!(slots.len(), 4);
    assert_eq!(slots[0].start, at(day, 9, 0));
    assert!(slots.windows(2).all(|w| w[0].start < w[1].start));

    // A block swallows the first slot.
    svc.create_block(
        tenant,
        Uuid::new_v4(),
        NewBlock {
            provider_id: provider,
            kind: BlockKind::Planned,
            interval_start: at(day, 9, 0),
            interval_end: at(day, 9, 30),
            reason: Some("staff meeting".to_string()),
        },
    )
    .await?;
    let slots = svc.list_slots(tenant, provider, "lesson", day, day).await?;
    assert_eq!(slots.len(), 3);
    assert_eq!(slots[0].start, at(day, 9, 30));

    // A booking swallows another.
    svc.book(
        tenant,
        booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 10, 0),
    )
    .await?;
    let slots = svc.list_slots(tenant, provider, "lesson", day, day).await?;
    assert_eq!(slots.len(), 2);
    assert!(slots.iter().all(|s| s.start != at(day, 10, 0)));

    Ok(())
}

#[tokio::test]
async fn booking_lifecycle_with_auto_confirm() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let student = Uuid::new_v4();
    let course = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;

    let appointment = svc
        .book(tenant, booking(provider, student, course, day, 9, 0))
        .await?;
    assert_eq!(appointment.status, AppointmentStatus::Confirmed);
    assert!(appointment.confirmed_at.is_some());

    let fetched = svc.get_appointment(tenant, appointment.id).await?;
    assert_eq!(fetched.id, appointment.id);

    let actor = Uuid::new_v4();
    let cancelled = svc
        .cancel(tenant, appointment.id, actor, Some("sick".to_string()))
        .await?;
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
    assert_eq!(cancelled.cancelled_by, Some(actor));
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("sick"));

    // The slot is bookable again.
    let slots = svc.list_slots(tenant, provider, "lesson", day, day).await?;
    assert!(slots.iter().any(|s| s.start == at(day, 9, 0)));

    // Cancelling twice is refused.
    let err = svc
        .cancel(tenant, appointment.id, actor, None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AlreadyCancelled { .. }));

    Ok(())
}

#[tokio::test]
async fn pending_bookings_need_confirmation() -> Result<()> {
    let config = SchedulingConfig {
        auto_confirm: false,
        ..test_config()
    };
    let svc = create_test_service(config).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;
    let appointment = svc
        .book(
            tenant,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 0),
        )
        .await?;
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert!(appointment.confirmed_at.is_none());

    let confirmed = svc.confirm(tenant, appointment.id).await?;
    assert_eq!(confirmed.status, AppointmentStatus::Confirmed);
    assert!(confirmed.confirmed_at.is_some());

    // Confirming again is a no-op.
    let again = svc.confirm(tenant, appointment.id).await?;
    assert_eq!(again.status, AppointmentStatus::Confirmed);

    Ok(())
}

#[tokio::test]
async fn double_booking_is_refused() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;
    svc.book(
        tenant,
        booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 30),
    )
    .await?;

    let err = svc
        .book(
            tenant,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 30),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::SlotUnavailable));

    Ok(())
}

#[tokio::test]
async fn concurrent_bookings_leave_one_winner() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;

    let a = tokio::spawn({
        let svc = svc.clone();
        let req = booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 0);
        async move { svc.book(tenant, req).await }
    });
    let b = tokio::spawn({
        let svc = svc.clone();
        let req = booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 0);
        async move { svc.book(tenant, req).await }
    });

    let results = [a.await?, b.await?];
    let wins = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    assert!(results
        .iter()
        .any(|r| matches!(r, Err(DomainError::SlotUnavailable))));

    Ok(())
}

#[tokio::test]
async fn misaligned_interval_is_invalid() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;

    // Starts inside the window but off the 30-minute grid.
    let err = svc
        .book(
            tenant,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 10),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInterval));

    // Outside the pattern entirely.
    let err = svc
        .book(
            tenant,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 15, 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidInterval));

    Ok(())
}

#[tokio::test]
async fn service_types_produce_separate_grids() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;
    // Same provider and window, hour-long slots under another service type.
    svc.create_pattern(
        tenant,
        NewRecurrencePattern {
            service_type: "mentoring".to_string(),
            time_end: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            slot_duration_minutes: Some(60),
            ..morning_pattern(provider, day)
        },
    )
    .await?;

    // The hour-long mentoring slot must not displace the lesson grid.
    let lessons = svc.list_slots(tenant, provider, "lesson", day, day).await?;
    assert_eq!(lessons.len(), 4);
    assert_eq!(lessons[0].start, at(day, 9, 0));
    assert_eq!(lessons[0].end, at(day, 9, 30));

    let mentoring = svc
        .list_slots(tenant, provider, "mentoring", day, day)
        .await?;
    assert_eq!(mentoring.len(), 1);
    assert_eq!(mentoring[0].end, at(day, 10, 0));

    Ok(())
}

#[tokio::test]
async fn booking_needs_a_pattern_for_its_service_type() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;

    // 09:00 is a lesson slot, but nothing offers mentoring there.
    let request = BookingRequest {
        service_type: "mentoring".to_string(),
        ..booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 0)
    };
    let err = svc.book(tenant, request).await.unwrap_err();
    assert!(matches!(err, DomainError::InvalidInterval));

    Ok(())
}

#[tokio::test]
async fn monthly_quota_is_enforced_and_released() -> Result<()> {
    let config = SchedulingConfig {
        default_monthly_allowance: 2,
        ..test_config()
    };
    let svc = create_test_service(config).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let student = Uuid::new_v4();
    let course = Uuid::new_v4();
    let day = monday();
    let next_week = day + Duration::days(7);

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;

    let first = svc
        .book(tenant, booking(provider, student, course, day, 9, 0))
        .await?;
    svc.book(tenant, booking(provider, student, course, day, 9, 30))
        .await?;

    // Third booking in the same calendar month is refused.
    let err = svc
        .book(tenant, booking(provider, student, course, next_week, 9, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::QuotaExceeded { .. }));

    // A failed booking must not burn quota or the slot.
    let slots = svc.list_slots(tenant, provider, "lesson", next_week, next_week).await?;
    assert!(slots.iter().any(|s| s.start == at(next_week, 9, 0)));

    // Cancelling releases the unit for the same month.
    svc.cancel(tenant, first.id, Uuid::new_v4(), None).await?;
    svc.book(tenant, booking(provider, student, course, next_week, 9, 0))
        .await?;

    Ok(())
}

#[tokio::test]
async fn cancellation_refunds_the_original_month() -> Result<()> {
    let config = SchedulingConfig {
        default_monthly_allowance: 1,
        ..test_config()
    };
    let svc = create_test_service(config).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let student = Uuid::new_v4();
    let course = Uuid::new_v4();
    let june = monday();
    let july = june + Duration::days(28);
    assert_ne!(june.month(), july.month());

    svc.create_pattern(tenant, morning_pattern(provider, june))
        .await?;

    let june_booking = svc
        .book(tenant, booking(provider, student, course, june, 9, 0))
        .await?;
    svc.book(tenant, booking(provider, student, course, july, 9, 0))
        .await?;

    // Both months are now exhausted.
    let err = svc
        .book(
            tenant,
            booking(provider, student, course, june + Duration::days(7), 9, 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::QuotaExceeded { .. }));

    // Cancelling the June booking frees June only; July stays exhausted.
    svc.cancel(tenant, june_booking.id, Uuid::new_v4(), None)
        .await?;
    svc.book(
        tenant,
        booking(provider, student, course, june + Duration::days(7), 9, 0),
    )
    .await?;
    let err = svc
        .book(
            tenant,
            booking(provider, student, course, july + Duration::days(7), 9, 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::QuotaExceeded { .. }));

    Ok(())
}

#[tokio::test]
async fn zero_allowance_refuses_all_bookings() -> Result<()> {
    let config = SchedulingConfig {
        default_monthly_allowance: 0,
        ..test_config()
    };
    let svc = create_test_service(config).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;
    let err = svc
        .book(
            tenant,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 0),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::QuotaExceeded { .. }));

    Ok(())
}

#[tokio::test]
async fn tenants_are_isolated() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant_a = Uuid::new_v4();
    let tenant_b = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant_a, morning_pattern(provider, day))
        .await?;

    // Another tenant sees no availability for the same provider ID.
    let slots = svc.list_slots(tenant_b, provider, "lesson", day, day).await?;
    assert!(slots.is_empty());

    let appointment = svc
        .book(
            tenant_a,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 0),
        )
        .await?;
    let err = svc
        .get_appointment(tenant_b, appointment.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::AppointmentNotFound { .. }));

    Ok(())
}

#[tokio::test]
async fn deactivated_patterns_stop_producing_slots() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    let pattern = svc
        .create_pattern(tenant, morning_pattern(provider, day))
        .await?;
    assert!(!svc.list_slots(tenant, provider, "lesson", day, day).await?.is_empty());

    svc.deactivate_pattern(tenant, pattern.id).await?;
    assert!(svc.list_slots(tenant, provider, "lesson", day, day).await?.is_empty());

    // The row survives for audit.
    let patterns = svc.list_patterns(tenant, provider, None).await?;
    assert_eq!(patterns.len(), 1);
    assert!(!patterns[0].active);

    Ok(())
}

#[tokio::test]
async fn appointment_listing_filters() -> Result<()> {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let student = Uuid::new_v4();
    let course = Uuid::new_v4();
    let day = monday();

    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await?;
    let kept = svc
        .book(tenant, booking(provider, student, course, day, 9, 0))
        .await?;
    let dropped = svc
        .book(tenant, booking(provider, student, course, day, 9, 30))
        .await?;
    svc.cancel(tenant, dropped.id, Uuid::new_v4(), None).await?;

    let confirmed = svc
        .list_appointments(
            tenant,
            AppointmentFilter {
                student_id: Some(student),
                status: Some(AppointmentStatus::Confirmed),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(confirmed.len(), 1);
    assert_eq!(confirmed[0].id, kept.id);

    let all = svc
        .list_appointments(
            tenant,
            AppointmentFilter {
                provider_id: Some(provider),
                ..Default::default()
            },
        )
        .await?;
    assert_eq!(all.len(), 2);

    Ok(())
}

// ---------------------------------------------------------------------------
// REST surface
// ---------------------------------------------------------------------------

async fn create_test_router() -> (Router, Uuid, Uuid, NaiveDate) {
    let svc = create_test_service(test_config()).await;
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();
    svc.create_pattern(tenant, morning_pattern(provider, day))
        .await
        .expect("Failed to seed pattern");
    (routes::router(svc), tenant, provider, day)
}

fn request(method: Method, uri: &str, tenant: Uuid, body: Option<serde_json::Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(TENANT_HEADER, tenant.to_string())
        .header(ACTOR_HEADER, Uuid::new_v4().to_string());
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("Should deserialize response body")
}

#[tokio::test]
async fn rest_slots_and_booking_flow() -> Result<()> {
    let (router, tenant, provider, day) = create_test_router().await;

    let uri = format!("/slots?provider_id={provider}&service_type=lesson&from={day}&to={day}");
    let response = router
        .clone()
        .oneshot(request(Method::GET, &uri, tenant, None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let slots: Vec<SlotDto> = json_body(response).await;
    assert_eq!(slots.len(), 4);

    let body = serde_json::json!({
        "provider_id": provider,
        "student_id": Uuid::new_v4(),
        "course_id": Uuid::new_v4(),
        "service_type": "lesson",
        "interval_start": slots[0].start,
        "interval_end": slots[0].end,
    });
    let response = router
        .clone()
        .oneshot(request(Method::POST, "/bookings", tenant, Some(body.clone())))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let appointment: AppointmentDto = json_body(response).await;
    assert_eq!(appointment.status, "confirmed");

    // Same slot again conflicts with a problem+json body.
    let response = router
        .clone()
        .oneshot(request(Method::POST, "/bookings", tenant, Some(body)))
        .await?;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
    let problem: serde_json::Value = json_body(response).await;
    assert_eq!(problem["code"], "slot_unavailable");

    // Cancel, then cancelling again reports 410.
    let uri = format!("/bookings/{}?reason=moved", appointment.id);
    let response = router
        .clone()
        .oneshot(request(Method::DELETE, &uri, tenant, None))
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cancelled: AppointmentDto = json_body(response).await;
    assert_eq!(cancelled.status, "cancelled");
    assert_eq!(cancelled.cancel_reason.as_deref(), Some("moved"));

    let uri = format!("/bookings/{}", appointment.id);
    let response = router
        .clone()
        .oneshot(request(Method::DELETE, &uri, tenant, None))
        .await?;
    assert_eq!(response.status(), StatusCode::GONE);

    Ok(())
}

#[tokio::test]
async fn rest_rejects_requests_without_tenant_headers() -> Result<()> {
    let (router, _tenant, provider, day) = create_test_router().await;

    let uri = format!("/slots?provider_id={provider}&service_type=lesson&from={day}&to={day}");
    let response = router
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn rest_misaligned_booking_is_bad_request() -> Result<()> {
    let (router, tenant, provider, day) = create_test_router().await;

    let body = serde_json::json!({
        "provider_id": provider,
        "student_id": Uuid::new_v4(),
        "course_id": Uuid::new_v4(),
        "service_type": "lesson",
        "interval_start": at(day, 9, 10),
        "interval_end": at(day, 9, 40),
    });
    let response = router
        .oneshot(request(Method::POST, "/bookings", tenant, Some(body)))
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let problem: serde_json::Value = json_body(response).await;
    assert_eq!(problem["code"], "invalid_interval");

    Ok(())
}

#[tokio::test]
async fn rest_block_management() -> Result<()> {
    let (router, tenant, provider, day) = create_test_router().await;

    let body = serde_json::json!({
        "provider_id": provider,
        "kind": "incident",
        "interval_start": at(day, 9, 0),
        "interval_end": at(day, 11, 0),
        "reason": "power outage",
    });
    let response = router
        .clone()
        .oneshot(request(Method::POST, "/blocks", tenant, Some(body)))
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    let block: serde_json::Value = json_body(response).await;

    let uri = format!("/slots?provider_id={provider}&service_type=lesson&from={day}&to={day}");
    let response = router
        .clone()
        .oneshot(request(Method::GET, &uri, tenant, None))
        .await?;
    let slots: Vec<SlotDto> = json_body(response).await;
    assert!(slots.is_empty());

    let uri = format!("/blocks/{}", block["id"].as_str().unwrap());
    let response = router
        .clone()
        .oneshot(request(Method::DELETE, &uri, tenant, None))
        .await?;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let uri = format!("/slots?provider_id={provider}&service_type=lesson&from={day}&to={day}");
    let response = router
        .oneshot(request(Method::GET, &uri, tenant, None))
        .await?;
    let slots: Vec<SlotDto> = json_body(response).await;
    assert_eq!(slots.len(), 4);

    Ok(())
}

// ---------------------------------------------------------------------------
// Local gateway
// ---------------------------------------------------------------------------

#[tokio::test]
async fn local_client_round_trip() -> Result<()> {
    let client = SchedulingLocalClient::new(create_test_service(test_config()).await);
    let tenant = Uuid::new_v4();
    let provider = Uuid::new_v4();
    let day = monday();

    client
        .create_pattern(tenant, morning_pattern(provider, day))
        .await?;
    let slots = client
        .list_slots(tenant, provider, "lesson", day, day)
        .await?;
    assert_eq!(slots.len(), 4);

    let appointment = client
        .book(
            tenant,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 0),
        )
        .await?;
    let fetched = client.get_appointment(tenant, appointment.id).await?;
    assert_eq!(fetched.id, appointment.id);

    let actor = Uuid::new_v4();
    client.cancel(tenant, appointment.id, actor, None).await?;

    // Domain errors cross the contract boundary as typed SchedulingError.
    let err = client
        .cancel(tenant, appointment.id, actor, None)
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchedulingError>(),
        Some(SchedulingError::AlreadyCancelled { .. })
    ));

    let err = client
        .book(
            tenant,
            booking(provider, Uuid::new_v4(), Uuid::new_v4(), day, 9, 10),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchedulingError>(),
        Some(SchedulingError::InvalidInterval)
    ));

    Ok(())
}
