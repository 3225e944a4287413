use utoipa::OpenApi;

use crate::api::problem::Problem;
use crate::api::rest::dto::{
    AppointmentDto, BlockDto, BookAppointmentReq, CreateBlockReq, CreatePatternReq, PatternDto,
    SlotDto,
};
use crate::api::rest::handlers;

/// OpenAPI document for the scheduling REST surface
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_slots,
        handlers::book_appointment,
        handlers::list_appointments,
        handlers::get_appointment,
        handlers::cancel_appointment,
        handlers::confirm_appointment,
        handlers::list_patterns,
        handlers::create_pattern,
        handlers::deactivate_pattern,
        handlers::list_blocks,
        handlers::create_block,
        handlers::delete_block,
    ),
    components(schemas(
        SlotDto,
        AppointmentDto,
        BookAppointmentReq,
        PatternDto,
        CreatePatternReq,
        BlockDto,
        CreateBlockReq,
        Problem,
    )),
    tags(
        (name = "scheduling", description = "Appointment scheduling: availability, bookings, quotas")
    )
)]
pub struct ApiDoc;
