use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::availability::WeeklyAvailability;
use crate::expander::TimeSlot;
use crate::models::{AvailableDates, BookingDraft, BookingRequest, SlotList, SlotView};

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::healthz_live,
        crate::handlers::healthz_ready,
        crate::handlers::get_available_dates,
        crate::handlers::get_slots,
        crate::handlers::get_slots_ical,
        crate::handlers::create_booking
    ),
    components(schemas(
        AvailableDates,
        SlotList,
        SlotView,
        TimeSlot,
        BookingDraft,
        BookingRequest,
        WeeklyAvailability
    )),
    tags(
        (name = "slots", description = "Tutor availability and slot booking")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;
