//! Payment API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/payments/initiate | POST | 发起支付 (按渠道) |
//! | /api/payments/callback | POST | 渠道回调 (幂等) |
//! | /api/payments/by-order/{id} | GET | 订单的账本历史 |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/payments", payment_routes())
}

fn payment_routes() -> Router<ServerState> {
    Router::new()
        .route("/initiate", post(handler::initiate))
        .route("/callback", post(handler::callback))
        .route("/by-order/{id}", get(handler::list_by_order))
}
