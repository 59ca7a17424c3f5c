//! 食品カテゴリ（固定の 4 種）

use common::error::Error;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Category {
    #[default]
    Liquid,
    Produce,
    Pantry,
    Packaged,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Liquid,
        Category::Produce,
        Category::Pantry,
        Category::Packaged,
    ];

    /// CLI で指定する短い ID
    pub fn id(&self) -> &'static str {
        match self {
            Self::Liquid => "liquid",
            Self::Produce => "produce",
            Self::Pantry => "pantry",
            Self::Packaged => "packaged",
        }
    }

    /// モデルへ渡し、レコードに残す表示名
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Liquid => "Liquid Essentials",
            Self::Produce => "Fresh Produce",
            Self::Pantry => "Spices & Pantry",
            Self::Packaged => "Packaged Goods",
        }
    }

    pub fn covers(&self) -> &'static str {
        match self {
            Self::Liquid => "Milk, Oil, Honey, Ghee",
            Self::Produce => "Fruits & Vegetables",
            Self::Pantry => "Powders, Pulses, Grains",
            Self::Packaged => "Labels, Cans, Snacks",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    /// ID または表示名（大文字小文字を区別しない）
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.id().eq_ignore_ascii_case(needle) || c.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| {
                let ids: Vec<&str> = Self::ALL.iter().map(|c| c.id()).collect();
                Error::invalid_argument(format!(
                    "Unknown category '{}'. Expected one of: {}",
                    s,
                    ids.join(", ")
                ))
            })
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}
