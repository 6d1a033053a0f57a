pub mod inventory;
pub mod response;

pub use inventory::*;
pub use response::*;
