//! Tooth Time: a local reminder for interval medications and fixed-time
//! self-care tasks.
//!
//! The core is pure: [`schedule::derive`] turns a [`types::Plan`] and a
//! [`clock::Now`] into a sorted list of upcoming items, and
//! [`notify::dispatch_due`] decides whether this minute deserves a
//! notification. Persistence lives behind [`store::PlanStore`].

pub mod cli;
pub mod clock;
pub mod commands;
pub mod editor;
pub mod error;
pub mod metadata;
pub mod notify;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod storage;
pub mod store;
pub mod time_utils;
pub mod types;
pub mod watch;
