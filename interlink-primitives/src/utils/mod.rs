mod pretty;

pub use pretty::*;
