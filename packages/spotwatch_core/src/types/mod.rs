pub mod spot;

pub use spot::{Reading, Spot};
