use std::sync::Mutex;

use serde_json::Value;
use uuid::Uuid;

use crate::models::Role;

/// A push notification addressed to one user.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub user_id: Uuid,
    pub title: String,
    pub message: String,
    pub recipient: Role,
}

/// Device-level delivery hints forwarded to the push provider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliveryMeta {
    pub device_id: Option<String>,
    pub destination: Option<String>,
}

/// Push-notification dispatch. Fire-and-forget: implementations log failures
/// themselves and must never block or fail a lifecycle transition.
pub trait Notifier: Send + Sync {
    fn send(&self, notification: Notification, meta: DeliveryMeta);
}

/// Realtime (socket) event dispatch, same fire-and-forget contract.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, event: &str, recipient: Uuid, payload: Value);
}

/// Production stand-in that forwards to the log pipeline; the actual push
/// provider consumes these structured events.
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn send(&self, notification: Notification, meta: DeliveryMeta) {
        tracing::info!(
            user_id = %notification.user_id,
            title = %notification.title,
            device_id = meta.device_id.as_deref().unwrap_or("-"),
            "push notification dispatched"
        );
    }
}

pub struct TracingEvents;

impl EventEmitter for TracingEvents {
    fn emit(&self, event: &str, recipient: Uuid, _payload: Value) {
        tracing::info!(event, recipient = %recipient, "realtime event emitted");
    }
}

/// Test double that records every dispatch.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(Notification, DeliveryMeta)>>,
}

impl Notifier for RecordingNotifier {
    fn send(&self, notification: Notification, meta: DeliveryMeta) {
        self.sent.lock().unwrap().push((notification, meta));
    }
}

#[derive(Default)]
pub struct RecordingEvents {
    pub emitted: Mutex<Vec<(String, Uuid, Value)>>,
}

impl EventEmitter for RecordingEvents {
    fn emit(&self, event: &str, recipient: Uuid, payload: Value) {
        self.emitted
            .lock()
            .unwrap()
            .push((event.to_string(), recipient, payload));
    }
}
