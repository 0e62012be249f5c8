//! Best-effort desktop notifications over the freedesktop session bus.
//!
//! Delivery is strictly fire-and-forget: no daemon, no session bus, or a
//! denied request all degrade to in-app alerts only. Nothing here is ever
//! surfaced to the user as an error.

use std::collections::HashMap;

use tracing::debug;

const APP_NAME: &str = "Vaga";
const APP_ICON: &str = "mail-message-new";

/// Raise one desktop notification. Returns whether the daemon accepted it;
/// callers do not act on the result beyond logging.
pub async fn notify(summary: &str, body: &str) -> bool {
    match send(summary, body).await {
        Ok(id) => {
            debug!(id, "desktop notification delivered");
            true
        }
        Err(e) => {
            debug!(error = %e, "desktop notification unavailable, in-app only");
            false
        }
    }
}

async fn send(summary: &str, body: &str) -> zbus::Result<u32> {
    let conn = zbus::Connection::session().await?;
    let proxy = zbus::Proxy::new(
        &conn,
        "org.freedesktop.Notifications",
        "/org/freedesktop/Notifications",
        "org.freedesktop.Notifications",
    )
    .await?;

    let replaces_id: u32 = 0;
    let actions: Vec<&str> = Vec::new();
    let hints: HashMap<&str, zbus::zvariant::Value> = HashMap::new();
    let expire_timeout: i32 = -1; // daemon default

    // Notify signature: (susssasa{sv}i)
    let notification_id: u32 = proxy
        .call(
            "Notify",
            &(
                APP_NAME,
                replaces_id,
                APP_ICON,
                summary,
                body,
                actions,
                hints,
                expire_timeout,
            ),
        )
        .await?;

    Ok(notification_id)
}
