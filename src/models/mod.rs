//! Data models

pub mod observable;
pub mod module;
pub mod ctim;
pub mod bundle;

pub use observable::*;
pub use module::*;
pub use ctim::*;
pub use bundle::*;
