pub mod dose;
pub mod medication;

pub use dose::*;
pub use medication::*;
