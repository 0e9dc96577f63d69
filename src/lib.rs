//! Snake Local View Library
//!
//! Cached, distance-sorted neighborhood queries on a wrapping snake arena.
//!
//! The [`LocalView`](game::local_view::LocalView) is the entry point for
//! per-frame algorithms (collision checks, steering, targeting): it asks the
//! [`Field`](game::field::Field) once for nearby body segments and food,
//! unwraps their coordinates around its center, and caches the sorted lists
//! until told to recalculate.

pub mod config;
pub mod game;
pub mod util;
