//! Shift roster optimizer.
//!
//! Fills open shifts with employees under skill, availability, daily-cap and
//! overlap rules, maximizing availability and preference fit. Requests that
//! cannot be solved come back with diagnostics, suggestions and, for
//! infeasible ones, a best-effort relaxed roster.
//!
//! The pipeline, in call order:
//! [`eligibility`] filters employee×shift pairs, [`constraints`] encodes them
//! as a [`model::Model`], a [`solver::ConstraintSolver`] decides it, and
//! [`interpret`] turns the values back into assignments. [`optimize`] wires
//! these together; [`api`] serves it over HTTP.

pub mod api;
pub mod config;
#[cfg(feature = "console")]
pub mod console;
pub mod constraints;
pub mod demo_data;
pub mod domain;
pub mod dto;
pub mod eligibility;
pub mod error;
pub mod interpret;
pub mod model;
pub mod optimize;
pub mod relaxation;
pub mod solver;
pub mod suggestions;
pub mod time_window;
