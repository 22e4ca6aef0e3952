use serde::Serialize;

#[derive(Serialize)]
pub struct EventSummaryResponse {
    pub event_id: String,
    pub pending: i64,
    pub confirmed: i64,
    pub cancelled: i64,
    pub confirmed_revenue_cents: i64,
    pub confirmed_revenue: String,
}
