use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// The expense category of a row. The six known categories are the choices offered by the entry
/// form; any other value found in the sheet is preserved in `Other`.
///
/// Known categories sort before unknown ones, in the order of `Category::KNOWN`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Category {
    Makan,
    Jajan,
    Belanja,
    Transportasi,
    Laundry,
    LainLain,
    Other(String),
}

impl Category {
    /// The fixed set of categories, in display order.
    pub const KNOWN: [Category; 6] = [
        Category::Makan,
        Category::Jajan,
        Category::Belanja,
        Category::Transportasi,
        Category::Laundry,
        Category::LainLain,
    ];

    /// The label used in the sheet and submitted by the entry form.
    pub fn label(&self) -> &str {
        match self {
            Category::Makan => MAKAN_STR,
            Category::Jajan => JAJAN_STR,
            Category::Belanja => BELANJA_STR,
            Category::Transportasi => TRANSPORTASI_STR,
            Category::Laundry => LAUNDRY_STR,
            Category::LainLain => LAIN_LAIN_STR,
            Category::Other(s) => s.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Category::Other(_))
    }
}

impl Default for Category {
    fn default() -> Self {
        Category::Other(String::new())
    }
}

impl FromStr for Category {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let known = match s {
            MAKAN_STR => Category::Makan,
            JAJAN_STR => Category::Jajan,
            BELANJA_STR => Category::Belanja,
            TRANSPORTASI_STR => Category::Transportasi,
            LAUNDRY_STR => Category::Laundry,
            // "Lain - Lain" and "Lain-Lain" are both in use
            _ if s.split_whitespace().collect::<String>() == "Lain-Lain" => Category::LainLain,
            other => Category::Other(other.to_string()),
        };
        Ok(known)
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Category {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_default())
    }
}

/// Who paid for an expense. Unknown values found in the sheet are preserved in `Other`.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Source {
    Bri,
    Suami,
    Istri,
    Other(String),
}

impl Source {
    pub const KNOWN: [Source; 3] = [Source::Bri, Source::Suami, Source::Istri];

    pub fn label(&self) -> &str {
        match self {
            Source::Bri => BRI_STR,
            Source::Suami => SUAMI_STR,
            Source::Istri => ISTRI_STR,
            Source::Other(s) => s.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Source::Other(_))
    }
}

impl Default for Source {
    fn default() -> Self {
        Source::Other(String::new())
    }
}

impl FromStr for Source {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            BRI_STR => Source::Bri,
            SUAMI_STR => Source::Suami,
            ISTRI_STR => Source::Istri,
            other => Source::Other(other.to_string()),
        })
    }
}

impl Display for Source {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Source {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Source {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(s.parse().unwrap_or_default())
    }
}

pub(crate) const MAKAN_STR: &str = "Makan";
pub(crate) const JAJAN_STR: &str = "Jajan";
pub(crate) const BELANJA_STR: &str = "Belanja";
pub(crate) const TRANSPORTASI_STR: &str = "Transportasi";
pub(crate) const LAUNDRY_STR: &str = "Laundry";
pub(crate) const LAIN_LAIN_STR: &str = "Lain - Lain";

pub(crate) const BRI_STR: &str = "BRI";
pub(crate) const SUAMI_STR: &str = "Suami";
pub(crate) const ISTRI_STR: &str = "Istri";
