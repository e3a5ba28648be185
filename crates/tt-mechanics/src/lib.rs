//! Combat mechanics for Tabletracker.
//!
//! Provides the hit point and armor class resource engine, and the
//! encounter initiative engine that tracks rounds and whose turn it is
//! as participants join, leave, and change initiative mid-fight.

pub mod armor;
pub mod combat;
pub mod error;
pub mod hp;

pub use armor::AcChange;
pub use combat::{Encounter, Participant};
pub use error::{MechError, MechResult};
pub use hp::HpChange;
