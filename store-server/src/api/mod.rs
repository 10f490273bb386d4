//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单接口 (结账 / 取消 / 状态 / 对账视图)
//! - [`payments`] - 支付接口 (发起 / 回调 / 账本历史)
//! - [`products`] - 商品与库存接口
//! - [`customers`] - 客户接口
//! - [`warranties`] - 保修接口

pub mod customers;
pub mod health;
pub mod orders;
pub mod payments;
pub mod products;
pub mod warranties;

use crate::core::ServerState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// 聚合全部 API 路由
pub fn router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(payments::router())
        .merge(products::router())
        .merge(customers::router())
        .merge(warranties::router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
