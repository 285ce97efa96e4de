//! HTTP handlers for the Inventory Management System

pub mod category;
pub mod dealer;
pub mod health;
pub mod ledger;
pub mod media;
pub mod product;
pub mod reporting;

pub use category::*;
pub use dealer::*;
pub use health::*;
pub use ledger::*;
pub use media::*;
pub use product::*;
pub use reporting::*;
