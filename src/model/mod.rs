//! Plain data types shared by the stores, the reconciler and the external services.

pub mod carrier;
pub mod geo;
pub mod optimizer;
pub mod work_order;

pub use carrier::*;
pub use geo::*;
pub use optimizer::*;
pub use work_order::*;
