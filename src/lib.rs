//! # gridflex
//!
//! Core engine of a multi-party energy-flexibility market. Independent roles
//! (grid operator, balance responsible party, aggregator, meter-data company)
//! exchange PTU-sliced forecasts, flexibility offers/orders and settlement
//! data; this crate provides the pieces they all share:
//!
//! - PTU identity and day decomposition ([`domain::time_slice`])
//! - typed workflow step contracts and a named-step executor ([`workflow`])
//! - the delivered-flex / power-deficiency settlement rules ([`settlement`])
//! - the grid-safety analysis coordinator ([`coordinator`])
//!
//! Wire formats, persistence mapping, REST surfaces and the pluggable
//! business computations themselves live outside this crate; it only defines
//! the contracts they plug into ([`repo`], [`workflow::WorkflowStep`]).

pub mod config;
pub mod coordinator;
pub mod domain;
pub mod error;
pub mod repo;
pub mod settlement;
pub mod telemetry;
pub mod workflow;
