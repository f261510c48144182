//! Event publication for administrative mutations.

use arkhe_events::{AdminEvent, EventBus};
use tracing::warn;

/// Publish `event` on `bus`.
///
/// Called after the mutation is stored, so failures are logged rather than
/// returned.
pub(crate) async fn publish(bus: &dyn EventBus, event: AdminEvent) {
    let result = match event.to_event() {
        Ok(envelope) => bus.publish(envelope).await,
        Err(e) => Err(e),
    };
    if let Err(e) = result {
        warn!(event_type = event.event_type(), error = %e, "Failed to publish admin event");
    }
}
