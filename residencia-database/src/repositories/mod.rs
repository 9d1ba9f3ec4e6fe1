//! Query functions per table. Every function takes a plain connection so callers
//! decide whether it runs inside a transaction.

pub mod activities;
pub mod diets;
pub mod incidents;
pub mod medications;
pub mod residents;
pub mod rooms;
pub mod staff;
pub mod treatments;
pub mod users;
pub mod visits;
