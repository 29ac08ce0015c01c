/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a random identifier (UUID v4) for orders, sessions and payments.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
