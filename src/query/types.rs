use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::types::{Expansion, Faction, MountCategory, Record, Selection, SourceType};

/// Ownership restriction of a combined query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OwnershipFilter {
    #[default]
    All,
    Owned,
    NotOwned,
}

impl OwnershipFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            OwnershipFilter::All => "all",
            OwnershipFilter::Owned => "owned",
            OwnershipFilter::NotOwned => "not-owned",
        }
    }

    pub fn accepts(&self, owned: bool) -> bool {
        match self {
            OwnershipFilter::All => true,
            OwnershipFilter::Owned => owned,
            OwnershipFilter::NotOwned => !owned,
        }
    }
}

impl fmt::Display for OwnershipFilter {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnershipFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "all" => Ok(OwnershipFilter::All),
            "owned" => Ok(OwnershipFilter::Owned),
            "not-owned" => Ok(OwnershipFilter::NotOwned),
            other => Err(Error::new(ErrorKind::Parse, format!("Unknown ownership filter '{}'", other))),
        }
    }
}

/// Answers "is this record owned?" for the ownership filter
pub trait OwnershipLookup {
    fn is_owned(&self, id: &str) -> bool;
}

impl OwnershipLookup for HashSet<String> {
    fn is_owned(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl OwnershipLookup for BTreeSet<String> {
    fn is_owned(&self, id: &str) -> bool {
        self.contains(id)
    }
}

impl OwnershipLookup for HashSet<&str> {
    fn is_owned(&self, id: &str) -> bool {
        self.contains(id)
    }
}

/// Nothing is owned
pub struct NoOwnership;

impl OwnershipLookup for NoOwnership {
    fn is_owned(&self, _id: &str) -> bool {
        false
    }
}

/// Search text plus every structural filter, combined with AND.
/// `classifications` is a multi-select (OR within the facet); empty means all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub text: String,
    pub classifications: BTreeSet<Expansion>,
    pub category: Selection<MountCategory>,
    pub faction: Selection<Faction>,
    pub source_type: Selection<SourceType>,
    pub ownership: OwnershipFilter,
}

impl CatalogQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = text.to_string();
        self
    }

    pub fn with_classification(mut self, classification: Expansion) -> Self {
        self.classifications.insert(classification);
        self
    }

    pub fn with_category(mut self, category: MountCategory) -> Self {
        self.category = Selection::Only(category);
        self
    }

    pub fn with_faction(mut self, faction: Faction) -> Self {
        self.faction = Selection::Only(faction);
        self
    }

    pub fn with_source_type(mut self, source_type: SourceType) -> Self {
        self.source_type = Selection::Only(source_type);
        self
    }

    pub fn with_ownership(mut self, ownership: OwnershipFilter) -> Self {
        self.ownership = ownership;
        self
    }

    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn has_facet_filters(&self) -> bool {
        !(self.category.is_all() && self.faction.is_all() && self.source_type.is_all())
    }

    /// True when no structural filter narrows the candidate pool
    pub fn is_unfiltered(&self) -> bool {
        self.classifications.is_empty()
            && !self.has_facet_filters()
            && self.ownership == OwnershipFilter::All
    }

    pub fn matches_facets(&self, record: &Record) -> bool {
        self.category.matches(&record.category)
            && self.faction.matches(&record.faction)
            && self.source_type.matches(&record.source_type)
    }
}
