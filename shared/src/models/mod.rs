//! Domain models shared between the server and its clients

pub mod customer;
pub mod order;
pub mod payment;
pub mod product;
pub mod warranty;

pub use customer::{Customer, CustomerCreate};
pub use order::{
    CheckoutLine, CheckoutRequest, CheckoutResult, Order, OrderLineItem, OrderStatus,
    OrderStatusUpdate,
};
pub use payment::{
    CardDetails, OrderPaymentView, PaymentCallbackRequest, PaymentDisplayStatus,
    PaymentInitiateRequest, PaymentInitiateResponse, PaymentMethod, PaymentStatus,
    PaymentTransaction,
};
pub use product::{InventoryRecord, Product, ProductCreate, StockUpdate};
pub use warranty::{Warranty, WarrantyStatus};
