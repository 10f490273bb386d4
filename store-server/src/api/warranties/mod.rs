//! Warranty API 模块
//!
//! 保修记录只读查询 + 过期清理。创建由后台 provisioner 负责。

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/warranties", warranty_routes())
}

fn warranty_routes() -> Router<ServerState> {
    Router::new()
        .route("/by-customer/{id}", get(handler::list_by_customer))
        .route("/by-order/{id}", get(handler::list_by_order))
        .route("/{id}", delete(handler::delete_expired))
}
