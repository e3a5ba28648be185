//! Core types for Tabletracker: game instances, characters, and validation.
//!
//! This crate defines the persisted data model for tracking tabletop-RPG
//! game state. It performs no I/O; storage lives in `tt-store` and the
//! combat engine in `tt-mechanics`.

/// Characters, their type-specific data, and hit points.
pub mod character;
/// Error types used throughout the crate.
pub mod error;
/// Typed identifiers for every persisted entity.
pub mod id;
/// Game instances (sessions and campaigns).
pub mod instance;
/// Normalised tag sets.
pub mod tag;
/// Character validation rules.
pub mod validate;

/// Re-export character types.
pub use character::{Character, CharacterDraft, CharacterKind, CharacterPatch, CharacterType, HitPoints};
/// Re-export error types.
pub use error::{CoreError, CoreResult, ValidationError};
/// Re-export identifiers.
pub use id::{CharacterId, EncounterId, InstanceId};
/// Re-export instance types.
pub use instance::{GameInstance, InstancePatch, InstanceStatus};
/// Re-export the tag set.
pub use tag::TagSet;
/// Re-export the validator entry point.
pub use validate::validate_draft;
