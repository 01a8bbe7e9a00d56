use std::sync::Arc;

use tokio::sync::mpsc;

use crate::core::batch;
use crate::core::transport::{ReqwestTransport, Transport};
use crate::models::result::RunEvent;
use crate::models::run_config::RunConfig;

/// Starts the run in the background and streams its events.
///
/// The receiver sees `Progress` snapshots, then exactly one `Finished`
/// or `Failed`, then the channel closes.
pub fn run_streaming(config: RunConfig) -> mpsc::Receiver<RunEvent> {
    let (sender, receiver) = mpsc::channel(1024);
    tokio::spawn(async move {
        let transport = match config
            .validate()
            .and_then(|_| ReqwestTransport::new(config.request_timeout))
        {
            Ok(t) => t,
            Err(e) => {
                tracing::error!(error = %e, "could not start load test");
                let _ = sender.send(RunEvent::Failed(e.to_string())).await;
                return;
            }
        };
        stream_with_transport(config, Arc::new(transport), sender).await;
    });
    receiver
}

pub(crate) async fn stream_with_transport(
    config: RunConfig,
    transport: Arc<dyn Transport>,
    sender: mpsc::Sender<RunEvent>,
) {
    let event = match batch::batch_with_transport(config, transport, Some(sender.clone())).await {
        Ok(result) => RunEvent::Finished(result),
        Err(e) => {
            tracing::error!(error = %e, "load test failed");
            RunEvent::Failed(e.to_string())
        }
    };
    if sender.send(event).await.is_err() {
        tracing::warn!("load test finished but nobody is listening");
    }
}
