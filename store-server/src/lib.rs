//! Store Server - 零售门店后台 (订单履约与支付对账)
//!
//! # 架构概述
//!
//! - **结账** (`db/repository/order`): 库存校验 + 订单写入的原子事务
//! - **支付** (`payments`): 渠道适配器 (COD / QR / 刷卡 / 钱包) 与对账解析器
//! - **保修** (`warranty`): 按件幂等发放
//! - **通知** (`notify`): fire-and-forget 确认函投递
//! - **HTTP API** (`api`): RESTful API 接口
//!
//! # 模块结构
//!
//! ```text
//! store-server/src/
//! ├── core/          # 配置、状态、启动
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 连接池、迁移、仓储
//! ├── payments/      # 支付渠道与对账
//! ├── warranty/      # 保修发放
//! ├── notify/        # 通知队列与投递
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod core;
pub mod db;
pub mod notify;
pub mod payments;
pub mod utils;
pub mod warranty;

// Re-export 公共类型
pub use self::core::{Config, Server, ServerState};
pub use utils::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

/// 设置运行环境 (dotenv, 工作目录, 日志)
pub fn setup_environment() -> std::io::Result<Config> {
    let _ = dotenv::dotenv();

    let config = Config::from_env();
    std::fs::create_dir_all(&config.work_dir)?;
    std::fs::create_dir_all(config.log_dir())?;

    let log_dir = config.log_dir();
    let file_logs = config.is_production().then_some(log_dir.as_str());
    init_logger_with_file(std::env::var("LOG_LEVEL").ok().as_deref(), file_logs);

    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
   _____ __
  / ___// /_____  ________
  \__ \/ __/ __ \/ ___/ _ \
 ___/ / /_/ /_/ / /  /  __/
/____/\__/\____/_/   \___/
    "#
    );
}
