//! Random payload synthesis.
//!
//! [`synthesize`] is a pure function of its random source, the message ID,
//! and the creation time. It never touches the controller's state, so it can
//! be exercised in isolation with a seeded [`StdRng`](rand::rngs::StdRng).

use chrono::{DateTime, Utc};
use pulse_types::{
    ApiCallDetails, ErrorDetails, EventDetails, EventKind, GeneratedMessage, HealthCheckDetails,
    HealthStatus, HttpMethod, InventoryDetails, NotificationChannel, NotificationDetails,
    OrderDetails, PaymentDetails, PaymentStatus, UserSession,
};
use rand::Rng;
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;

/// Value of the `source` field on every generated message.
pub const SOURCE: &str = "message-generator";

/// Currency attached to every monetary amount.
const CURRENCY: &str = "USD";

/// Length of the random suffix on session, order, and payment IDs.
const TOKEN_LEN: usize = 9;

const API_RESOURCES: [&str; 4] = ["users", "orders", "products", "payments"];
const HTTP_METHODS: [HttpMethod; 4] = [
    HttpMethod::Get,
    HttpMethod::Post,
    HttpMethod::Put,
    HttpMethod::Delete,
];
const STATUS_CODES: [u16; 5] = [200, 201, 400, 404, 500];
const CHANNELS: [NotificationChannel; 3] = [
    NotificationChannel::Email,
    NotificationChannel::Sms,
    NotificationChannel::Push,
];

/// Build one message with ID `id`, stamped `now`.
///
/// The event type is drawn uniformly from [`EventKind::ALL`]; the fields of
/// the chosen type follow the ranges documented on each detail struct.
pub fn synthesize<R: Rng + ?Sized>(rng: &mut R, id: u64, now: DateTime<Utc>) -> GeneratedMessage {
    let kind = EventKind::ALL
        .choose(rng)
        .copied()
        .unwrap_or(EventKind::SystemHealthCheck);

    GeneratedMessage {
        id,
        timestamp: now,
        source: SOURCE.to_owned(),
        details: details_for(rng, kind, id),
    }
}

/// Draw the event-specific fields for `kind`.
pub fn details_for<R: Rng + ?Sized>(rng: &mut R, kind: EventKind, id: u64) -> EventDetails {
    match kind {
        EventKind::UserLogin => EventDetails::UserLogin(user_session(rng)),
        EventKind::UserLogout => EventDetails::UserLogout(user_session(rng)),
        EventKind::OrderCreated => EventDetails::OrderCreated(order(rng)),
        EventKind::OrderUpdated => EventDetails::OrderUpdated(order(rng)),
        EventKind::PaymentProcessed => EventDetails::PaymentProcessed(PaymentDetails {
            payment_id: format!("pay_{}", token(rng)),
            amount: cents(rng, 50_000),
            currency: CURRENCY.to_owned(),
            status: if rng.random_bool(0.9) {
                PaymentStatus::Success
            } else {
                PaymentStatus::Failed
            },
        }),
        EventKind::InventoryUpdated => EventDetails::InventoryUpdated(InventoryDetails {
            product_id: format!("prod_{}", rng.random_range(1..=1000_u32)),
            quantity: rng.random_range(0..100),
            warehouse: format!("warehouse_{}", rng.random_range(1..=5_u32)),
        }),
        EventKind::NotificationSent => EventDetails::NotificationSent(NotificationDetails {
            recipient_id: rng.random_range(1..=1000),
            notification_type: CHANNELS
                .choose(rng)
                .copied()
                .unwrap_or(NotificationChannel::Email),
            message: format!("Random notification message {id}"),
        }),
        EventKind::ApiCall => EventDetails::ApiCall(ApiCallDetails {
            endpoint: format!(
                "/api/v1/{}",
                API_RESOURCES.choose(rng).copied().unwrap_or("users")
            ),
            method: HTTP_METHODS.choose(rng).copied().unwrap_or(HttpMethod::Get),
            response_time: rng.random_range(0..1000),
            status_code: STATUS_CODES.choose(rng).copied().unwrap_or(200),
        }),
        EventKind::ErrorOccurred => EventDetails::ErrorOccurred(ErrorDetails {
            error_code: format!("ERR_{:04}", rng.random_range(0..9999_u32)),
            error_message: format!("Random error message {id}"),
            stack_trace: "Stack trace would be here...".to_owned(),
        }),
        EventKind::SystemHealthCheck => EventDetails::SystemHealthCheck(HealthCheckDetails {
            cpu_usage: cents(rng, 10_000),
            memory_usage: cents(rng, 10_000),
            disk_usage: cents(rng, 10_000),
            status: if rng.random_bool(0.8) {
                HealthStatus::Healthy
            } else {
                HealthStatus::Warning
            },
        }),
    }
}

fn user_session<R: Rng + ?Sized>(rng: &mut R) -> UserSession {
    UserSession {
        user_id: rng.random_range(1..=1000),
        session_id: format!("session_{}", token(rng)),
    }
}

fn order<R: Rng + ?Sized>(rng: &mut R) -> OrderDetails {
    OrderDetails {
        order_id: format!("order_{}", token(rng)),
        amount: cents(rng, 100_000),
        currency: CURRENCY.to_owned(),
        customer_id: rng.random_range(1..=500),
    }
}

/// A two-decimal-place value in `[0, upper_cents / 100)`.
fn cents<R: Rng + ?Sized>(rng: &mut R, upper_cents: i64) -> Decimal {
    Decimal::new(rng.random_range(0..upper_cents), 2)
}

/// Nine lowercase base-36 characters.
fn token<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..TOKEN_LEN)
        .filter_map(|_| char::from_digit(rng.random_range(0..36), 36))
        .collect()
}
