//! Guard primitives shared by the staking contracts.
//!
//! This crate provides:
//! - [`access_control`]: a role → holder capability table with super-admin
//!   gated grants and revocations.
//! - [`pausable`]: per-feature pause switches plus one global override.
//! - [`reentrancy`]: a call-scoped lock released on scope exit.
//!
//! Every helper reads and writes the storage of the contract currently
//! executing, so independent contract instances never share guard state.
//! Failures are reported as small plain enums; each contract converts them
//! into its own `#[contracterror]` type.

#![no_std]

// ── Modules ──────────────────────────────────────────────────────────────────

pub mod access_control;
pub mod pausable;
pub mod reentrancy;

pub use access_control::{AccessError, Role};
pub use pausable::{Feature, PauseError};
pub use reentrancy::ReentrancyGuard;
