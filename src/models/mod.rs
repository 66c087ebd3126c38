pub mod diagnostics;
pub mod report;

pub use diagnostics::*;
pub use report::*;
