pub mod estimator;
pub mod logistic;
pub mod pipeline;
pub mod pls;
pub mod random_forest;

pub mod classifier_trait;
pub mod factory;

pub use classifier_trait::ClassifierModel;
pub use estimator::Estimator;
