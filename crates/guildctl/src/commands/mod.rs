pub mod apply;
pub mod check;
