use std::{error, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Food category a shop offers. The set is closed, unknown tokens are
/// rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryCode {
    Korean,
    Chinese,
    Japanese,
    Western,
    FastFood,
    Cafe,
    Chicken,
    Pizza,
    NightSnack,
    LunchBox,
}

impl CategoryCode {
    pub const ALL: [CategoryCode; 10] = [
        CategoryCode::Korean,
        CategoryCode::Chinese,
        CategoryCode::Japanese,
        CategoryCode::Western,
        CategoryCode::FastFood,
        CategoryCode::Cafe,
        CategoryCode::Chicken,
        CategoryCode::Pizza,
        CategoryCode::NightSnack,
        CategoryCode::LunchBox,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryCode::Korean => "KOREAN",
            CategoryCode::Chinese => "CHINESE",
            CategoryCode::Japanese => "JAPANESE",
            CategoryCode::Western => "WESTERN",
            CategoryCode::FastFood => "FAST_FOOD",
            CategoryCode::Cafe => "CAFE",
            CategoryCode::Chicken => "CHICKEN",
            CategoryCode::Pizza => "PIZZA",
            CategoryCode::NightSnack => "NIGHT_SNACK",
            CategoryCode::LunchBox => "LUNCH_BOX",
        }
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category code '{}'", self.0)
    }
}

impl error::Error for UnknownCategory {}

impl FromStr for CategoryCode {
    type Err = UnknownCategory;

    /// Tokens are matched exactly, they are uppercase ASCII.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        CategoryCode::ALL
            .into_iter()
            .find(|code| code.as_str() == token)
            .ok_or_else(|| UnknownCategory(token.to_owned()))
    }
}
