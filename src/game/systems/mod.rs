//! Per-tick bot systems
//!
//! Every system works in two phases: a read-only planning pass that builds one
//! [`LocalView`](crate::game::local_view::LocalView) per bot on the rayon pool,
//! then a sequential pass that applies the planned changes to the field.

pub mod collision;
pub mod food;
pub mod steering;

use std::convert::Infallible;

use crate::game::entities::BotId;
use crate::game::field::{Field, FieldError};
use crate::game::local_view::LocalViewError;
use crate::util::vec2::Vec2;

#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    View(#[from] LocalViewError),
    #[error(transparent)]
    Field(#[from] FieldError),
}

impl From<Infallible> for SystemError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Per-bot data copied out of the field before a parallel pass
#[derive(Debug, Clone, Copy)]
pub(crate) struct BotSnapshot {
    pub id: BotId,
    pub head: Vec2,
    pub heading: f32,
    pub segment_radius: f32,
}

pub(crate) fn snapshot_bots(field: &Field) -> Vec<BotSnapshot> {
    field
        .bots()
        .map(|bot| BotSnapshot {
            id: bot.id,
            head: bot.head(),
            heading: bot.heading,
            segment_radius: bot.segment_radius,
        })
        .collect()
}
