//! Category hierarchy engine for storefront catalogs.
//!
//! Categories arrive as a flat list where each record names its parent by
//! title. [`catalog`] rebuilds the forest, filters and sorts it, and projects
//! an expandable view. [`source`] loads records from the backend or a saved
//! snapshot; [`ui`] renders them in a terminal.

pub mod app;
pub mod catalog;
pub mod config;
pub mod source;
pub mod ui;
pub mod util;
