//! Immediate-mode presentation layer. Everything here reads the current
//! session and renders; no business logic lives in this module.

pub mod charts;
pub mod format;
pub mod pages;
pub mod panels;
pub mod table;
