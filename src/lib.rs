//! Grid Traffic Simulation Library
//!
//! A step-driven traffic simulation on a cell grid, built for experimenting
//! with traffic-light control policies.

pub mod simulation;
