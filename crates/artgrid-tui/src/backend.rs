//! Runs the controller's fetch commands against a [`CatalogSource`] and feeds
//! completion messages back to the event loop.

use std::sync::Arc;

use artgrid_core::bulk::fetch_pages;
use artgrid_core::{CatalogSource, FetchCommand, TableMessage};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Perform one command and build its completion message.
pub async fn execute(
    source: &dyn CatalogSource,
    cmd: FetchCommand,
    concurrency: usize,
) -> TableMessage {
    match cmd {
        FetchCommand::Page {
            token,
            page,
            page_size,
        } => {
            tracing::debug!(source = source.name(), page, page_size, token, "fetching page");
            TableMessage::PageFetched {
                token,
                page,
                page_size,
                result: source.fetch_page(page, page_size).await,
            }
        }
        FetchCommand::Pages {
            token,
            pages,
            page_size,
        } => {
            tracing::debug!(source = source.name(), ?pages, page_size, token, "fetching pages for bulk select");
            TableMessage::BulkPagesFetched {
                token,
                page_size,
                result: fetch_pages(source, &pages, page_size, concurrency).await,
            }
        }
    }
}

/// Receive commands until the channel closes or `cancel` fires. Each command
/// runs in its own task so a slow page never blocks the next request.
pub fn spawn_listener(
    source: Arc<dyn CatalogSource>,
    concurrency: usize,
    mut cmd_rx: mpsc::UnboundedReceiver<FetchCommand>,
    event_tx: mpsc::UnboundedSender<TableMessage>,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let cmd = tokio::select! {
                _ = cancel.cancelled() => break,
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => cmd,
                    None => break,
                },
            };
            let source = Arc::clone(&source);
            let tx = event_tx.clone();
            tokio::spawn(async move {
                let message = execute(source.as_ref(), cmd, concurrency).await;
                // The UI may already be gone during shutdown.
                let _ = tx.send(message);
            });
        }
        tracing::debug!("backend listener stopped");
    })
}
