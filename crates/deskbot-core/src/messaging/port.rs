use async_trait::async_trait;

use crate::{messaging::types::OutgoingMessage, Result};

/// Outbound half of the messaging transport.
///
/// The inbound half is a `tokio::sync::mpsc::Receiver<IncomingUpdate>` fed by
/// the adapter's polling task, so the dispatcher stays the sole consumer.
#[async_trait]
pub trait MessagingPort: Send + Sync {
    async fn send(&self, msg: OutgoingMessage) -> Result<()>;
}
