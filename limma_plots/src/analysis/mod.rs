pub mod layout;
pub mod pvalue_sweep;
pub mod threshold;
pub mod tidy;
