use serde::{Deserialize, Serialize};

use crate::util::vec2::Vec2;

/// Stable handle of a bot on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BotId(pub uuid::Uuid);

impl BotId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for BotId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable handle of a food item on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FoodId(pub u64);

impl std::fmt::Display for FoodId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "food#{}", self.0)
    }
}

/// A snake made of body segments, head first
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bot {
    pub id: BotId,
    pub name: String,
    /// Segment centers in wrapped field coordinates; `segments[0]` is the head
    pub segments: Vec<Vec2>,
    /// Direction of travel (radians)
    pub heading: f32,
    pub segment_radius: f32,
    /// Food value not yet turned into new segments
    pub pending_growth: f32,
    /// Total food value eaten over the bot's lifetime
    pub consumed_food: f32,
}

impl Bot {
    #[inline]
    pub fn head(&self) -> Vec2 {
        self.segments[0]
    }

    #[inline]
    pub fn length(&self) -> usize {
        self.segments.len()
    }
}

/// A consumable item lying on the field
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: FoodId,
    pub position: Vec2,
    pub value: f32,
}
