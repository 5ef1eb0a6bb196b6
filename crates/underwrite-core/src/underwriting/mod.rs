pub mod charts;
pub mod model;
pub mod projection;
