//! Capability categories and their classification rules.
//!
//! Every attachable capability belongs to exactly one [`Category`]. A category
//! decides how its members are rendered: zero-or-many categories are wrapped in
//! an expandable group node, while at-most-one categories are attached to the
//! root directly.

use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};

use crate::{color::Color, entity::EntityType};

/// A fixed capability grouping with its own cardinality and styling.
///
/// The names match external configuration strings (snake_case).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Persona,
    Channels,
    Skills,
    Tools,
    Security,
    Knowledge,
    Memory,
}

/// How many members a category may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    ExactlyOne,
    AtMostOne,
    ZeroOrMany,
}

impl Cardinality {
    /// Minimum number of members.
    pub fn min(self) -> usize {
        match self {
            Cardinality::ExactlyOne => 1,
            Cardinality::AtMostOne | Cardinality::ZeroOrMany => 0,
        }
    }

    /// Maximum number of members, `None` when unbounded.
    pub fn max(self) -> Option<usize> {
        match self {
            Cardinality::ExactlyOne | Cardinality::AtMostOne => Some(1),
            Cardinality::ZeroOrMany => None,
        }
    }

    /// Returns true if `count` members satisfy this rule.
    pub fn allows(self, count: usize) -> bool {
        count >= self.min() && self.max().is_none_or(|max| count <= max)
    }
}

/// Horizontal pinning of a category's slot in the tiered layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SlotPin {
    Left,
    Center,
    Right,
}

/// An angular range `[start, end)` in degrees, clockwise from 12 o'clock.
///
/// Sectors may wrap across 0°/360°; `Sector::new(330.0, 30.0)` spans 60°.
///
/// # Examples
///
/// ```
/// use agentmap_core::category::Sector;
///
/// let wrapping = Sector::new(330.0, 30.0);
/// assert_eq!(wrapping.span(), 60.0);
/// assert_eq!(wrapping.midpoint(), 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    start: f32,
    end: f32,
}

impl Sector {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn start(self) -> f32 {
        self.start
    }

    pub fn end(self) -> f32 {
        self.end
    }

    /// Angular width in degrees. Equal start and end denote a full circle.
    pub fn span(self) -> f32 {
        let span = (self.end - self.start).rem_euclid(360.0);
        if span == 0.0 { 360.0 } else { span }
    }

    /// Bearing at `fraction` (0..=1) of the way through the sector, normalized to [0, 360).
    pub fn bearing_at(self, fraction: f32) -> f32 {
        (self.start + self.span() * fraction).rem_euclid(360.0)
    }

    /// Bearing of the sector's angular midpoint.
    pub fn midpoint(self) -> f32 {
        self.bearing_at(0.5)
    }
}

impl Category {
    /// All categories in canonical order.
    pub const ALL: [Category; 7] = [
        Category::Persona,
        Category::Channels,
        Category::Skills,
        Category::Tools,
        Category::Security,
        Category::Knowledge,
        Category::Memory,
    ];

    /// Maps an entity type tag to its owning category.
    ///
    /// Returns `None` for types that are not attachable capabilities: the
    /// agent itself, synthetic group nodes and provider sub-nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use agentmap_core::{category::Category, entity::EntityType};
    ///
    /// assert_eq!(Category::classify(EntityType::Skill), Some(Category::Skills));
    /// assert_eq!(Category::classify(EntityType::Agent), None);
    /// ```
    pub fn classify(entity_type: EntityType) -> Option<Category> {
        match entity_type {
            EntityType::Persona => Some(Category::Persona),
            EntityType::Channel => Some(Category::Channels),
            EntityType::Skill => Some(Category::Skills),
            EntityType::Tool => Some(Category::Tools),
            EntityType::SecurityProfile => Some(Category::Security),
            EntityType::KnowledgeDocument => Some(Category::Knowledge),
            EntityType::MemorySettings => Some(Category::Memory),
            EntityType::Agent | EntityType::SkillProvider | EntityType::CategoryGroup => None,
        }
    }

    pub fn cardinality(self) -> Cardinality {
        match self {
            Category::Persona => Cardinality::ExactlyOne,
            Category::Security | Category::Memory => Cardinality::AtMostOne,
            Category::Channels | Category::Skills | Category::Tools | Category::Knowledge => {
                Cardinality::ZeroOrMany
            }
        }
    }

    /// True when members are wrapped in an expandable group node.
    pub fn renders_as_group(self) -> bool {
        self.cardinality() == Cardinality::ZeroOrMany
    }

    /// Human readable label for group headers and legends.
    pub fn label(self) -> &'static str {
        match self {
            Category::Persona => "Persona",
            Category::Channels => "Channels",
            Category::Skills => "Skills",
            Category::Tools => "Tools",
            Category::Security => "Security",
            Category::Knowledge => "Knowledge",
            Category::Memory => "Memory",
        }
    }

    /// Accent color used for the category's nodes and edges.
    pub fn color(self) -> Color {
        let css = match self {
            Category::Persona => "#ec4899",
            Category::Channels => "#0ea5e9",
            Category::Skills => "#8b5cf6",
            Category::Tools => "#f59e0b",
            Category::Security => "#ef4444",
            Category::Knowledge => "#10b981",
            Category::Memory => "#6366f1",
        };
        Color::new(css).unwrap_or_default()
    }

    /// Stable key used as the prefix of member node ids.
    pub fn key(self) -> &'static str {
        self.into()
    }

    /// Default angular sector in the radial layout.
    pub fn default_sector(self) -> Sector {
        match self {
            Category::Persona => Sector::new(330.0, 30.0),
            Category::Channels => Sector::new(30.0, 90.0),
            Category::Skills => Sector::new(90.0, 150.0),
            Category::Tools => Sector::new(150.0, 210.0),
            Category::Knowledge => Sector::new(210.0, 270.0),
            Category::Security => Sector::new(270.0, 300.0),
            Category::Memory => Sector::new(300.0, 330.0),
        }
    }

    /// Where the category's slot sits in the tiered layout's first row.
    pub fn pin(self) -> SlotPin {
        match self {
            Category::Persona | Category::Security => SlotPin::Left,
            Category::Memory => SlotPin::Right,
            Category::Channels | Category::Skills | Category::Tools | Category::Knowledge => {
                SlotPin::Center
            }
        }
    }
}

impl FromStr for Category {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "persona" => Ok(Self::Persona),
            "channels" => Ok(Self::Channels),
            "skills" => Ok(Self::Skills),
            "tools" => Ok(Self::Tools),
            "security" => Ok(Self::Security),
            "knowledge" => Ok(Self::Knowledge),
            "memory" => Ok(Self::Memory),
            _ => Err("Unsupported category"),
        }
    }
}

impl From<Category> for &'static str {
    fn from(val: Category) -> Self {
        match val {
            Category::Persona => "persona",
            Category::Channels => "channels",
            Category::Skills => "skills",
            Category::Tools => "tools",
            Category::Security => "security",
            Category::Knowledge => "knowledge",
            Category::Memory => "memory",
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s: &'static str = (*self).into();
        write!(f, "{s}")
    }
}
