//! Request models

pub mod form;

pub use form::PredictForm;
