//! Order API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders/checkout | POST | 原子结账 |
//! | /api/orders | GET | 订单列表 |
//! | /api/orders/{id} | GET | 订单详情 (含行项目) |
//! | /api/orders/{id}/cancel | POST | 取消订单并回补库存 |
//! | /api/orders/{id}/status | PUT | 状态流转 |
//! | /api/orders/{id}/payment | GET | 订单支付视图 (对账) |
//! | /api/orders/payment-status | POST | 批量支付视图 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", order_routes())
}

fn order_routes() -> Router<ServerState> {
    Router::new()
        .route("/checkout", post(handler::checkout))
        .route("/", get(handler::list))
        .route("/payment-status", post(handler::payment_status_batch))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/status", put(handler::update_status))
        .route("/{id}/payment", get(handler::payment_status))
}
