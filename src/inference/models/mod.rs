pub mod model;
pub mod t5;
