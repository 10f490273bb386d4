/// 服务器配置 - 门店后台的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | /var/lib/store | 工作目录 (数据库、日志) |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | COMPANY_NAME | Store Back-Office | 单据抬头 |
/// | BANK_NAME | Demo Bank | QR 转账收款银行 |
/// | BANK_ACCOUNT | 0000-0000-0000 | QR 转账收款账号 |
/// | CARD_GATEWAY_URL | http://localhost:9401 | 刷卡网关地址 |
/// | WALLET_PARTNER_URL | http://localhost:9402 | 钱包合作方地址 |
/// | WALLET_PARTNER_KEY | dev-partner-key | 钱包合作方密钥 |
/// | NOTIFY_GATEWAY_URL | http://localhost:9403 | 通知网关地址 |
/// | NOTIFY_TIMEOUT_MS | 5000 | 单次通知投递超时(毫秒) |
/// | RECONCILE_WINDOW_MS | 3600000 | 对账启发式时间窗口(毫秒) |
/// | REQUEST_TIMEOUT_MS | 30000 | 出站请求超时(毫秒) |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/store HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库、日志等文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,

    // === 单据 / 收款配置 ===
    /// 单据抬头 (确认函、发票)
    pub company_name: String,
    /// QR 转账收款银行
    pub bank_name: String,
    /// QR 转账收款账号
    pub bank_account: String,

    // === 外部服务 ===
    /// 刷卡网关地址
    pub card_gateway_url: String,
    /// 钱包合作方地址
    pub wallet_partner_url: String,
    /// 钱包合作方密钥
    pub wallet_partner_key: String,
    /// 通知网关地址
    pub notify_gateway_url: String,

    // === 超时 / 窗口 ===
    /// 单次通知投递超时 (毫秒)
    pub notify_timeout_ms: u64,
    /// 对账启发式匹配时间窗口 (毫秒)
    pub reconcile_window_ms: i64,
    /// 出站请求超时 (毫秒)
    pub request_timeout_ms: u64,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/store".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),

            company_name: std::env::var("COMPANY_NAME")
                .unwrap_or_else(|_| "Store Back-Office".into()),
            bank_name: std::env::var("BANK_NAME").unwrap_or_else(|_| "Demo Bank".into()),
            bank_account: std::env::var("BANK_ACCOUNT")
                .unwrap_or_else(|_| "0000-0000-0000".into()),

            card_gateway_url: std::env::var("CARD_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:9401".into()),
            wallet_partner_url: std::env::var("WALLET_PARTNER_URL")
                .unwrap_or_else(|_| "http://localhost:9402".into()),
            wallet_partner_key: std::env::var("WALLET_PARTNER_KEY")
                .unwrap_or_else(|_| "dev-partner-key".into()),
            notify_gateway_url: std::env::var("NOTIFY_GATEWAY_URL")
                .unwrap_or_else(|_| "http://localhost:9403".into()),

            notify_timeout_ms: std::env::var("NOTIFY_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            reconcile_window_ms: std::env::var("RECONCILE_WINDOW_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3_600_000),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30_000),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// SQLite 数据库文件路径
    pub fn database_path(&self) -> String {
        format!("{}/store.db", self.work_dir)
    }

    /// 日志目录
    pub fn log_dir(&self) -> String {
        format!("{}/logs", self.work_dir)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
