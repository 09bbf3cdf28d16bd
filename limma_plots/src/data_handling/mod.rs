pub mod limma_statistics;
