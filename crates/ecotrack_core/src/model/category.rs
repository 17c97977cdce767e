//! Fixed carbon category partition and its recommendation table.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// One of the five buckets every carbon event is filed under.
///
/// Declaration order is significant: it is the iteration order for rollups
/// and the tie-break order when picking a dominant category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transport,
    Food,
    Energy,
    Shopping,
    Other,
}

impl Category {
    /// All categories in fixed enumeration order.
    pub const ALL: [Category; 5] = [
        Category::Transport,
        Category::Food,
        Category::Energy,
        Category::Shopping,
        Category::Other,
    ];

    /// Stable storage/wire key.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Transport => "transport",
            Self::Food => "food",
            Self::Energy => "energy",
            Self::Shopping => "shopping",
            Self::Other => "other",
        }
    }

    /// Parses a category key. Surrounding whitespace and ASCII case are ignored.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "transport" => Some(Self::Transport),
            "food" => Some(Self::Food),
            "energy" => Some(Self::Energy),
            "shopping" => Some(Self::Shopping),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Four static reduction tips for this category.
    pub fn recommendations(self) -> &'static [&'static str; 4] {
        match self {
            Self::Transport => &[
                "Consider using public transportation or carpooling",
                "Try biking or walking for short distances",
                "Look into electric or hybrid vehicles",
                "Work from home when possible to reduce commuting",
            ],
            Self::Food => &[
                "Reduce meat consumption and try plant-based alternatives",
                "Buy local and seasonal produce",
                "Minimize food waste by meal planning",
                "Choose organic options when available",
            ],
            Self::Energy => &[
                "Switch to LED light bulbs",
                "Unplug electronics when not in use",
                "Use a programmable thermostat",
                "Consider renewable energy sources",
            ],
            Self::Shopping => &[
                "Buy only what you need",
                "Choose products with minimal packaging",
                "Look for eco-friendly and sustainable brands",
                "Consider buying second-hand items",
            ],
            Self::Other => &[
                "Reduce, reuse, and recycle",
                "Choose digital receipts and bills",
                "Use reusable bags and containers",
                "Support environmentally conscious businesses",
            ],
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
