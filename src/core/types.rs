use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

/// Closed string enumerations shared by the dataset and the filter surface.
macro_rules! catalog_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $label:tt),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($label => Ok($name::$variant),)+
                    other => Err(Error::new(
                        ErrorKind::Parse,
                        format!("Unknown {} '{}'", stringify!($name), other),
                    )),
                }
            }
        }
    };
}

catalog_enum! {
    /// Classification dimension used by the bucket index
    Expansion {
        Classic => "Classic",
        BurningCrusade => "The Burning Crusade",
        WrathOfTheLichKing => "Wrath of the Lich King",
        Cataclysm => "Cataclysm",
        MistsOfPandaria => "Mists of Pandaria",
    }
}

catalog_enum! {
    MountCategory {
        Ground => "Ground",
        Flying => "Flying",
        Aquatic => "Aquatic",
        Multi => "Multi",
    }
}

catalog_enum! {
    Faction {
        Alliance => "Alliance",
        Horde => "Horde",
        Neutral => "Neutral",
    }
}

catalog_enum! {
    SourceType {
        Drop => "Drop",
        Vendor => "Vendor",
        Quest => "Quest",
        Achievement => "Achievement",
        Crafting => "Crafting",
        Promotion => "Promotion",
        Other => "Other",
    }
}

/// One catalog entry. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// Stable unique key, never reused
    pub id: String,
    pub name: String,
    pub expansion: Expansion,
    pub category: MountCategory,
    pub faction: Faction,
    pub source_type: SourceType,
    pub source_detail: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wowhead_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires_riding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession_req: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_req: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_limited_time: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,

    // Provenance only, never consulted by queries
    pub data_version: u64,
    pub last_updated_utc: DateTime<Utc>,
}

impl Record {
    pub fn new(
        id: &str,
        name: &str,
        expansion: Expansion,
        category: MountCategory,
        faction: Faction,
        source_type: SourceType,
        source_detail: &str,
    ) -> Self {
        Record {
            id: id.to_string(),
            name: name.to_string(),
            expansion,
            category,
            faction,
            source_type,
            source_detail: source_detail.to_string(),
            zone: None,
            wowhead_id: None,
            requires_riding: None,
            profession_req: None,
            reputation_req: None,
            cost: None,
            is_limited_time: None,
            notes: None,
            tags: None,
            data_version: 1,
            last_updated_utc: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    pub fn with_zone(mut self, zone: &str) -> Self {
        self.zone = Some(zone.to_string());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = Some(tags.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn classification(&self) -> Expansion {
        self.expansion
    }

    pub fn tags(&self) -> &[String] {
        self.tags.as_deref().unwrap_or(&[])
    }
}

/// The full record set for a session
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetSnapshot {
    pub data_version: u64,
    pub records: Vec<Record>,
}

impl DatasetSnapshot {
    pub fn new(data_version: u64, records: Vec<Record>) -> Self {
        DatasetSnapshot { data_version, records }
    }

    /// Snapshot whose version is the newest record attribute version
    pub fn from_records(records: Vec<Record>) -> Self {
        let data_version = records.iter().map(|r| r.data_version).max().unwrap_or(0);
        DatasetSnapshot { data_version, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn valid_ids(&self) -> HashSet<&str> {
        self.records.iter().map(|r| r.id.as_str()).collect()
    }
}

/// Either every value of a facet or exactly one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection<T> {
    All,
    Only(T),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq> Selection<T> {
    pub fn matches(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(expected) => expected == value,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }
}

impl<T: FromStr<Err = Error>> FromStr for Selection<T> {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.is_empty() || s == "all" {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Only)
        }
    }
}
