//! Central Configuration Constants
//!
//! Single source of truth for defaults shared by the library and the server.

/// Bundle file format this build reads
pub const BUNDLE_FORMAT_VERSION: u32 = 1;

/// Default model bundle location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "models/fall_risk_bundle.json";

/// Library version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Fall Risk Predictor";
