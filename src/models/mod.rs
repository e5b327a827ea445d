pub mod appointment;
pub mod child;
pub mod enums;
pub mod interaction;
pub mod medication;
pub mod pharmacy;
pub mod reference;
pub mod symptom;

pub use appointment::*;
pub use child::*;
pub use interaction::*;
pub use medication::*;
pub use pharmacy::*;
pub use reference::*;
pub use symptom::*;
