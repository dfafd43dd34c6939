//! Generated message types.
//!
//! A [`GeneratedMessage`] is the payload published to the broker on every
//! tick. Its JSON form is a single flat object: the common envelope fields
//! (`id`, `timestamp`, `source`), the `eventType` discriminator, and the
//! event-specific fields of the matching [`EventDetails`] variant.
//!
//! ```json
//! {
//!   "id": 7,
//!   "timestamp": "2025-01-01T12:00:00Z",
//!   "source": "message-generator",
//!   "eventType": "order_created",
//!   "orderId": "order_k3j9x0a1b",
//!   "amount": "412.07",
//!   "currency": "USD",
//!   "customerId": 88
//! }
//! ```

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The closed set of synthetic event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventKind {
    /// A user signed in.
    UserLogin,
    /// A user signed out.
    UserLogout,
    /// An order was placed.
    OrderCreated,
    /// An existing order changed.
    OrderUpdated,
    /// A payment attempt finished.
    PaymentProcessed,
    /// Stock levels changed.
    InventoryUpdated,
    /// A notification went out to a recipient.
    NotificationSent,
    /// An API request was served.
    ApiCall,
    /// An application error was recorded.
    ErrorOccurred,
    /// Periodic host health sample.
    SystemHealthCheck,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::UserLogin,
        Self::UserLogout,
        Self::OrderCreated,
        Self::OrderUpdated,
        Self::PaymentProcessed,
        Self::InventoryUpdated,
        Self::NotificationSent,
        Self::ApiCall,
        Self::ErrorOccurred,
        Self::SystemHealthCheck,
    ];

    /// Wire name of the kind (the `eventType` value).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UserLogin => "user_login",
            Self::UserLogout => "user_logout",
            Self::OrderCreated => "order_created",
            Self::OrderUpdated => "order_updated",
            Self::PaymentProcessed => "payment_processed",
            Self::InventoryUpdated => "inventory_updated",
            Self::NotificationSent => "notification_sent",
            Self::ApiCall => "api_call",
            Self::ErrorOccurred => "error_occurred",
            Self::SystemHealthCheck => "system_health_check",
        }
    }
}

impl core::fmt::Display for EventKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Field enumerations
// ---------------------------------------------------------------------------

/// Outcome of a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum PaymentStatus {
    /// The payment cleared.
    Success,
    /// The payment was declined.
    Failed,
}

/// Delivery channel of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum NotificationChannel {
    /// Email.
    Email,
    /// Text message.
    Sms,
    /// Mobile push.
    Push,
}

/// HTTP verb of a simulated API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export, export_to = "bindings/")]
pub enum HttpMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
}

/// Host status reported by a health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum HealthStatus {
    /// All metrics nominal.
    Healthy,
    /// At least one metric needs attention.
    Warning,
}

// ---------------------------------------------------------------------------
// Per-shape detail structs
// ---------------------------------------------------------------------------

/// Fields of `user_login` and `user_logout`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct UserSession {
    /// User identifier in `[1, 1000]`.
    pub user_id: u32,
    /// `session_` followed by nine base-36 characters.
    pub session_id: String,
}

/// Fields of `order_created` and `order_updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct OrderDetails {
    /// `order_` followed by nine base-36 characters.
    pub order_id: String,
    /// Order total in `[0, 1000)`, two decimal places.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// ISO currency code (always `USD`).
    pub currency: String,
    /// Customer identifier in `[1, 500]`.
    pub customer_id: u32,
}

/// Fields of `payment_processed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PaymentDetails {
    /// `pay_` followed by nine base-36 characters.
    pub payment_id: String,
    /// Payment amount in `[0, 500)`, two decimal places.
    #[ts(as = "String")]
    pub amount: Decimal,
    /// ISO currency code (always `USD`).
    pub currency: String,
    /// Whether the payment cleared.
    pub status: PaymentStatus,
}

/// Fields of `inventory_updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct InventoryDetails {
    /// `prod_` followed by a number in `[1, 1000]`.
    pub product_id: String,
    /// Units on hand in `[0, 100)`.
    pub quantity: u32,
    /// `warehouse_` followed by a number in `[1, 5]`.
    pub warehouse: String,
}

/// Fields of `notification_sent`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct NotificationDetails {
    /// Recipient identifier in `[1, 1000]`.
    pub recipient_id: u32,
    /// Delivery channel.
    pub notification_type: NotificationChannel,
    /// Human-readable body.
    pub message: String,
}

/// Fields of `api_call`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ApiCallDetails {
    /// `/api/v1/` followed by a resource name.
    pub endpoint: String,
    /// HTTP verb.
    pub method: HttpMethod,
    /// Latency in milliseconds, `[0, 1000)`.
    pub response_time: u32,
    /// One of 200, 201, 400, 404, 500.
    pub status_code: u16,
}

/// Fields of `error_occurred`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct ErrorDetails {
    /// `ERR_` followed by four zero-padded digits.
    pub error_code: String,
    /// Human-readable error text.
    pub error_message: String,
    /// Placeholder stack trace.
    pub stack_trace: String,
}

/// Fields of `system_health_check`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct HealthCheckDetails {
    /// CPU utilisation percentage in `[0, 100)`.
    #[ts(as = "String")]
    pub cpu_usage: Decimal,
    /// Memory utilisation percentage in `[0, 100)`.
    #[ts(as = "String")]
    pub memory_usage: Decimal,
    /// Disk utilisation percentage in `[0, 100)`.
    #[ts(as = "String")]
    pub disk_usage: Decimal,
    /// Overall status.
    pub status: HealthStatus,
}

// ---------------------------------------------------------------------------
// Details + message
// ---------------------------------------------------------------------------

/// Event-specific payload, discriminated by `eventType`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "eventType", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum EventDetails {
    /// See [`EventKind::UserLogin`].
    UserLogin(UserSession),
    /// See [`EventKind::UserLogout`].
    UserLogout(UserSession),
    /// See [`EventKind::OrderCreated`].
    OrderCreated(OrderDetails),
    /// See [`EventKind::OrderUpdated`].
    OrderUpdated(OrderDetails),
    /// See [`EventKind::PaymentProcessed`].
    PaymentProcessed(PaymentDetails),
    /// See [`EventKind::InventoryUpdated`].
    InventoryUpdated(InventoryDetails),
    /// See [`EventKind::NotificationSent`].
    NotificationSent(NotificationDetails),
    /// See [`EventKind::ApiCall`].
    ApiCall(ApiCallDetails),
    /// See [`EventKind::ErrorOccurred`].
    ErrorOccurred(ErrorDetails),
    /// See [`EventKind::SystemHealthCheck`].
    SystemHealthCheck(HealthCheckDetails),
}

impl EventDetails {
    /// The kind this payload belongs to.
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::UserLogin(_) => EventKind::UserLogin,
            Self::UserLogout(_) => EventKind::UserLogout,
            Self::OrderCreated(_) => EventKind::OrderCreated,
            Self::OrderUpdated(_) => EventKind::OrderUpdated,
            Self::PaymentProcessed(_) => EventKind::PaymentProcessed,
            Self::InventoryUpdated(_) => EventKind::InventoryUpdated,
            Self::NotificationSent(_) => EventKind::NotificationSent,
            Self::ApiCall(_) => EventKind::ApiCall,
            Self::ErrorOccurred(_) => EventKind::ErrorOccurred,
            Self::SystemHealthCheck(_) => EventKind::SystemHealthCheck,
        }
    }
}

/// One synthetic message, created per tick and published to the broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMessage {
    /// Value of the generator's message counter when this was created.
    pub id: u64,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
    /// Producer name (always `message-generator`).
    pub source: String,
    /// Event-specific fields, flattened into this object.
    #[serde(flatten)]
    pub details: EventDetails,
}

impl GeneratedMessage {
    /// The message's event type.
    pub const fn event_type(&self) -> EventKind {
        self.details.kind()
    }
}
