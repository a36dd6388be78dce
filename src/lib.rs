//! stockgrid: inventory spreadsheet toolkit
//!
//! Rebuilds the location and shelf structure of a loosely formatted
//! inventory sheet and reports stock levels against par.

pub mod cli;
pub mod core;
pub mod entities;
