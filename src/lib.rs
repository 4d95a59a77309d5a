//! Commandbot control library.
//!
//! A cooperative command scheduler with exclusive subsystem ownership,
//! operator-input triggers and bindings, table-driven actuator state
//! machines and the robot program built on top of them.  Everything is
//! pure logic driven one tick at a time; hardware is reached only through
//! the port traits in [`app::ports`].

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod binding;
pub mod command;
pub mod commands;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod fsm;
pub mod io;
pub mod safety;
pub mod scheduler;
pub mod sensors;
pub mod subsystem;
pub mod trigger;
