//! # Onchain Program Instance Module
//!
//! Pure client-side pieces for talking to the voting and tracker programs.
//!
//! ## Features
//! - Program-derived address derivation for tracker and authority accounts
//! - Typed instruction builders with fixed account layouts

/// Tracker / authority address derivation
pub mod pda;

/// Instruction builders for the voting and tracker programs
pub mod instructions;
