use crate::models::websocket::{SubscribeMessage, WalletEvent};
use anyhow::Result;
use futures_util::{SinkExt, StreamExt};
use log::{info, warn};
use tokio::sync::mpsc::UnboundedSender;
use tokio_tungstenite::tungstenite;

pub struct WsHandle {
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl WsHandle {
    pub fn shutdown(self) {
        info!("Shutting down wallet event listener");
        let _ = self.shutdown_tx.send(());
    }
}

/// Connects to the bridge's event socket and forwards wallet events until
/// the socket closes or the returned handle is shut down.
pub async fn run_wallet_events(
    events_url: &str,
    sender: UnboundedSender<WalletEvent>,
) -> Result<WsHandle> {
    let (ws_stream, _) = tokio_tungstenite::connect_async(events_url).await?;
    info!("Wallet event socket connected: {}", events_url);

    let (mut sink, mut stream) = ws_stream.split();

    let subscribe = serde_json::to_string(&SubscribeMessage {
        msg_type: "SUBSCRIBE",
        events: &["accountsChanged"],
    })?;
    sink.send(tungstenite::Message::text(subscribe)).await?;

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    tokio::spawn(async move {
        tokio::select! {
            _ = async {
                while let Some(Ok(msg)) = stream.next().await {
                    if msg.is_close() {
                        break;
                    }
                    let Ok(text) = msg.to_text() else { continue };
                    match serde_json::from_str::<WalletEvent>(text) {
                        Ok(event) => {
                            if sender.send(event).is_err() {
                                break;
                            }
                        }
                        Err(e) => warn!("Ignoring wallet message {:?}: {}", text, e),
                    }
                }
            } => {
                info!("Wallet event socket closed");
            },

            _ = shutdown_rx => {
                info!("Wallet event listener shutdown requested");
            }
        }

        sink.close().await.ok();
    });

    Ok(WsHandle { shutdown_tx })
}
