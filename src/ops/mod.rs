pub mod check;
pub mod reconcile;
pub mod store_ops;
