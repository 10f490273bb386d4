//! Notification Delivery Worker
//!
//! 监听通知队列，逐条投递到通知网关。
//! 投递失败只记录日志，不重试、不回传 — fire-and-forget.

use super::Notification;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct NotifyWorker {
    client: reqwest::Client,
    gateway_url: String,
    timeout: Duration,
}

impl NotifyWorker {
    pub fn new(client: reqwest::Client, gateway_url: String, timeout_ms: u64) -> Self {
        Self {
            client,
            gateway_url,
            timeout: Duration::from_millis(timeout_ms),
        }
    }

    /// 运行工作者（阻塞直到通道关闭或收到停机信号）
    pub async fn run(self, mut rx: mpsc::Receiver<Notification>, shutdown: CancellationToken) {
        tracing::info!("Notification worker started");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Notification worker received shutdown signal");
                    break;
                }
                notification = rx.recv() => {
                    let Some(notification) = notification else {
                        tracing::info!("Notification channel closed, worker stopping");
                        break;
                    };
                    self.deliver(notification).await;
                }
            }
        }
    }

    /// One bounded delivery attempt; the outcome is a log line either way
    async fn deliver(&self, notification: Notification) {
        let order_id = notification.order_id;
        let result = self
            .client
            .post(format!("{}/notify", self.gateway_url))
            .timeout(self.timeout)
            .json(&notification)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => {
                tracing::info!(order_id, "Notification delivered");
            }
            Ok(resp) => {
                tracing::warn!(order_id, status = %resp.status(), "Notification rejected by gateway");
            }
            Err(e) => {
                tracing::warn!(order_id, error = %e, "Notification delivery failed");
            }
        }
    }
}
