pub mod bar_chart;
pub mod colormap;
pub mod heatmap;
pub mod pvalue_counts;
