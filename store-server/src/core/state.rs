//! 服务器状态 - 持有所有服务的单例引用
//!
//! ServerState 是门店后台的核心数据结构，持有所有服务的共享引用。
//! 使用 Arc / Clone 实现浅拷贝，所有权成本极低。

use crate::core::Config;
use crate::db::DbService;
use crate::notify::worker::NotifyWorker;
use crate::notify::{Notification, NotifyService};
use crate::payments::{ChannelRegistry, ReconciliationResolver};
use crate::utils::{AppError, AppResult};
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

/// 服务器状态
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | db | SQLite 连接池 |
/// | channels | 支付渠道注册表 |
/// | resolver | 对账解析器 |
/// | notify | 通知队列发送端 |
/// | shutdown | 停机信号 (后台任务共享) |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub channels: ChannelRegistry,
    pub resolver: ReconciliationResolver,
    pub notify: NotifyService,
    /// Receiving half of the notify queue, consumed once by
    /// [`start_background_tasks`](Self::start_background_tasks)
    notify_rx: Arc<Mutex<Option<mpsc::Receiver<Notification>>>>,
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// 初始化所有服务
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        std::fs::create_dir_all(&config.work_dir)
            .map_err(|e| AppError::internal(format!("Failed to create work dir: {e}")))?;

        let db = DbService::new(&config.database_path()).await?;
        let channels = ChannelRegistry::new(config)?;
        let resolver = ReconciliationResolver::new(config.reconcile_window_ms);

        let (tx, rx) = mpsc::channel::<Notification>(256);

        Ok(Self {
            config: config.clone(),
            db,
            channels,
            resolver,
            notify: NotifyService::new(tx),
            notify_rx: Arc::new(Mutex::new(Some(rx))),
            shutdown: CancellationToken::new(),
        })
    }

    /// 启动后台任务 (通知投递工作者)
    ///
    /// Idempotent: a second call finds the receiver already taken and
    /// does nothing.
    pub async fn start_background_tasks(&self) -> AppResult<()> {
        let Some(rx) = self.notify_rx.lock().await.take() else {
            return Ok(());
        };

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_millis(self.config.request_timeout_ms))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;

        let worker = NotifyWorker::new(
            client,
            self.config.notify_gateway_url.clone(),
            self.config.notify_timeout_ms,
        );
        tokio::spawn(worker.run(rx, self.shutdown.clone()));

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    /// Test double: real services over a throwaway work dir, with the
    /// notify receiver handed back so tests can observe what gets queued
    #[cfg(test)]
    pub(crate) async fn for_tests(work_dir: &str) -> (Self, mpsc::Receiver<Notification>) {
        let config = Config::with_overrides(work_dir, 0);
        let db = DbService::new(&config.database_path())
            .await
            .expect("open test database");
        let channels = ChannelRegistry::new(&config).expect("build channel registry");
        let resolver = ReconciliationResolver::new(config.reconcile_window_ms);
        let (tx, rx) = mpsc::channel::<Notification>(16);

        let state = Self {
            config,
            db,
            channels,
            resolver,
            notify: NotifyService::new(tx),
            notify_rx: Arc::new(Mutex::new(None)),
            shutdown: CancellationToken::new(),
        };
        (state, rx)
    }
}
