pub mod crop;
pub mod farm;
pub mod report;
pub mod schedule;
pub mod soil;
pub mod weather;

pub use crop::*;
pub use farm::*;
pub use report::*;
pub use schedule::*;
pub use soil::*;
pub use weather::*;
