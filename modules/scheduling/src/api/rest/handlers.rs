use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::Json,
    Extension,
};
use tracing::info;
use uuid::Uuid;

use crate::api::problem::{bad_request, ProblemResponse};
use crate::api::rest::context::TenantContext;
use crate::api::rest::dto::{
    AppointmentDto, BlockDto, BookAppointmentReq, CancelQuery, CreateBlockReq, CreatePatternReq,
    ListAppointmentsQuery, ListPatternsQuery, ListSlotsQuery, PatternDto, ProviderQuery, SlotDto,
};
use crate::api::rest::error::problem_from_domain;
use crate::contract::model::AppointmentFilter;
use crate::domain::service::SchedulingService;

/// List bookable slots for a provider over a date window
#[utoipa::path(
    get,
    path = "/slots",
    tag = "scheduling",
    params(ListSlotsQuery),
    responses(
        (status = 200, description = "Available slots, ascending by start", body = [SlotDto]),
        (status = 400, description = "Bad Request"),
        (status = 401, description = "Unauthorized"),
    )
)]
pub async fn list_slots(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Query(query): Query<ListSlotsQuery>,
) -> Result<Json<Vec<SlotDto>>, ProblemResponse> {
    let slots = svc
        .list_slots(
            ctx.tenant_id,
            query.provider_id,
            &query.service_type,
            query.from,
            query.to,
        )
        .await
        .map_err(problem_from_domain)?;
    Ok(Json(slots.into_iter().map(SlotDto::from).collect()))
}

/// Book a slot
#[utoipa::path(
    post,
    path = "/bookings",
    tag = "scheduling",
    request_body = BookAppointmentReq,
    responses(
        (status = 201, description = "Appointment booked", body = AppointmentDto),
        (status = 400, description = "Interval is not a generated slot"),
        (status = 409, description = "Slot taken or quota exhausted"),
    )
)]
pub async fn book_appointment(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Json(req): Json<BookAppointmentReq>,
) -> Result<(StatusCode, Json<AppointmentDto>), ProblemResponse> {
    info!(provider_id = %req.provider_id, start = %req.interval_start, "Booking request");
    let appointment = svc
        .book(ctx.tenant_id, req.into())
        .await
        .map_err(problem_from_domain)?;
    Ok((StatusCode::CREATED, Json(appointment.into())))
}

/// List appointments
#[utoipa::path(
    get,
    path = "/bookings",
    tag = "scheduling",
    params(ListAppointmentsQuery),
    responses(
        (status = 200, description = "Appointments, ascending by start", body = [AppointmentDto]),
        (status = 400, description = "Bad Request"),
    )
)]
pub async fn list_appointments(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Query(query): Query<ListAppointmentsQuery>,
) -> Result<Json<Vec<AppointmentDto>>, ProblemResponse> {
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(
            crate::api::rest::dto::parse_status(raw)
                .ok_or_else(|| bad_request(format!("Unknown status '{raw}'")))?,
        ),
    };
    let filter = AppointmentFilter {
        provider_id: query.provider_id,
        student_id: query.student_id,
        status,
        range_start: query.from,
        range_end: query.to,
    };
    let appointments = svc
        .list_appointments(ctx.tenant_id, filter)
        .await
        .map_err(problem_from_domain)?;
    Ok(Json(
        appointments.into_iter().map(AppointmentDto::from).collect(),
    ))
}

/// Get an appointment by ID
#[utoipa::path(
    get,
    path = "/bookings/{id}",
    tag = "scheduling",
    params(("id" = Uuid, Path, description = "Appointment UUID")),
    responses(
        (status = 200, description = "Appointment found", body = AppointmentDto),
        (status = 404, description = "Not Found"),
    )
)]
pub async fn get_appointment(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentDto>, ProblemResponse> {
    let appointment = svc
        .get_appointment(ctx.tenant_id, id)
        .await
        .map_err(problem_from_domain)?;
    Ok(Json(appointment.into()))
}

/// Cancel an appointment, releasing its quota unit
#[utoipa::path(
    delete,
    path = "/bookings/{id}",
    tag = "scheduling",
    params(("id" = Uuid, Path, description = "Appointment UUID"), CancelQuery),
    responses(
        (status = 200, description = "Appointment cancelled", body = AppointmentDto),
        (status = 404, description = "Not Found"),
        (status = 410, description = "Already cancelled"),
    )
)]
pub async fn cancel_appointment(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
    Query(query): Query<CancelQuery>,
) -> Result<Json<AppointmentDto>, ProblemResponse> {
    info!(appointment_id = %id, "Cancellation request");
    let appointment = svc
        .cancel(ctx.tenant_id, id, ctx.actor_id, query.reason)
        .await
        .map_err(problem_from_domain)?;
    Ok(Json(appointment.into()))
}

/// Confirm a pending appointment
#[utoipa::path(
    post,
    path = "/bookings/{id}/confirm",
    tag = "scheduling",
    params(("id" = Uuid, Path, description = "Appointment UUID")),
    responses(
        (status = 200, description = "Appointment confirmed", body = AppointmentDto),
        (status = 404, description = "Not Found"),
        (status = 410, description = "Already cancelled"),
    )
)]
pub async fn confirm_appointment(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<Json<AppointmentDto>, ProblemResponse> {
    let appointment = svc
        .confirm(ctx.tenant_id, id)
        .await
        .map_err(problem_from_domain)?;
    Ok(Json(appointment.into()))
}

/// List a provider's recurrence patterns
#[utoipa::path(
    get,
    path = "/availability",
    tag = "scheduling",
    params(ListPatternsQuery),
    responses(
        (status = 200, description = "Recurrence patterns", body = [PatternDto]),
    )
)]
pub async fn list_patterns(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Query(query): Query<ListPatternsQuery>,
) -> Result<Json<Vec<PatternDto>>, ProblemResponse> {
    let patterns = svc
        .list_patterns(
            ctx.tenant_id,
            query.provider_id,
            query.service_type.as_deref(),
        )
        .await
        .map_err(problem_from_domain)?;
    Ok(Json(patterns.into_iter().map(PatternDto::from).collect()))
}

/// Create a recurrence pattern
#[utoipa::path(
    post,
    path = "/availability",
    tag = "scheduling",
    request_body = CreatePatternReq,
    responses(
        (status = 201, description = "Pattern created", body = PatternDto),
        (status = 400, description = "Bad Request"),
    )
)]
pub async fn create_pattern(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Json(req): Json<CreatePatternReq>,
) -> Result<(StatusCode, Json<PatternDto>), ProblemResponse> {
    info!(provider_id = %req.provider_id, weekday = req.weekday, "Creating recurrence pattern");
    let pattern = svc
        .create_pattern(ctx.tenant_id, req.into())
        .await
        .map_err(problem_from_domain)?;
    Ok((StatusCode::CREATED, Json(pattern.into())))
}

/// Deactivate a recurrence pattern
#[utoipa::path(
    delete,
    path = "/availability/{id}",
    tag = "scheduling",
    params(("id" = Uuid, Path, description = "Pattern UUID")),
    responses(
        (status = 204, description = "Pattern deactivated"),
        (status = 404, description = "Not Found"),
    )
)]
pub async fn deactivate_pattern(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ProblemResponse> {
    svc.deactivate_pattern(ctx.tenant_id, id)
        .await
        .map_err(problem_from_domain)?;
    Ok(StatusCode::NO_CONTENT)
}

/// List a provider's blocks
#[utoipa::path(
    get,
    path = "/blocks",
    tag = "scheduling",
    params(ProviderQuery),
    responses(
        (status = 200, description = "Blocks, ascending by start", body = [BlockDto]),
    )
)]
pub async fn list_blocks(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Query(query): Query<ProviderQuery>,
) -> Result<Json<Vec<BlockDto>>, ProblemResponse> {
    let blocks = svc
        .list_blocks(ctx.tenant_id, query.provider_id)
        .await
        .map_err(problem_from_domain)?;
    Ok(Json(blocks.into_iter().map(BlockDto::from).collect()))
}

/// Create a block
#[utoipa::path(
    post,
    path = "/blocks",
    tag = "scheduling",
    request_body = CreateBlockReq,
    responses(
        (status = 201, description = "Block created", body = BlockDto),
        (status = 400, description = "Bad Request"),
    )
)]
pub async fn create_block(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Json(req): Json<CreateBlockReq>,
) -> Result<(StatusCode, Json<BlockDto>), ProblemResponse> {
    let new_block = req
        .into_new_block()
        .ok_or_else(|| bad_request("Unknown block kind"))?;
    let block = svc
        .create_block(ctx.tenant_id, ctx.actor_id, new_block)
        .await
        .map_err(problem_from_domain)?;
    Ok((StatusCode::CREATED, Json(block.into())))
}

/// Delete a block
#[utoipa::path(
    delete,
    path = "/blocks/{id}",
    tag = "scheduling",
    params(("id" = Uuid, Path, description = "Block UUID")),
    responses(
        (status = 204, description = "Block deleted"),
        (status = 404, description = "Not Found"),
    )
)]
pub async fn delete_block(
    Extension(svc): Extension<Arc<SchedulingService>>,
    ctx: TenantContext,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ProblemResponse> {
    svc.delete_block(ctx.tenant_id, id)
        .await
        .map_err(problem_from_domain)?;
    Ok(StatusCode::NO_CONTENT)
}
