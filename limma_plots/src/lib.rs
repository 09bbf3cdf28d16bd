//! Plots for the LIMMA09-2018 gene-expression study.
//!
//! The statistics themselves come from LIMMA; this crate loads the per-gene
//! percentage tables it produced, reshapes them into one tidy table, counts
//! genes above a percentage threshold and renders bar charts and heatmaps.

pub mod analysis;
pub mod config;
pub mod data_handling;
pub mod error;
pub mod helper_functions;
pub mod models;
pub mod pipeline;
pub mod plotting;
