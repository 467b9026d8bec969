pub mod dataset;

pub use dataset::{read_dataset_csv, DatasetReaderConfig};
