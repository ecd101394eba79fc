//! Structure specification - the declarative description of a corpus format
//!
//! A specification is authored as nested JSON objects:
//!
//! ```json
//! {
//!   "structureName": "play",
//!   "xpaths": ["/play"],
//!   "metadata": [{ "xpaths": ["title"], "propertyName": "title" }],
//!   "units": [
//!     { "structureName": "speech", "xpaths": ["act/scene/sp"],
//!       "metadata": [{ "xpaths": [""], "attr": "who", "propertyName": "speaker" }] }
//!   ]
//! }
//! ```
//!
//! Nodes with a `units` key become [`StructureSpec::Internal`]; nodes without
//! one become [`StructureSpec::Leaf`]. The tag is resolved once while
//! deserializing so the extractor never re-checks key presence.

use serde::{Deserialize, Serialize};

/// A rule describing how to extract one kind of metadata value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MetadataRule {
    /// Path expressions locating the value, relative to the unit's node
    #[serde(default)]
    pub xpaths: Vec<String>,

    /// Attribute to read; when absent the element text is used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attr: Option<String>,

    /// Name given to every property produced by this rule
    #[serde(rename = "propertyName")]
    pub property_name: String,
}

/// A specification node that produces sentences directly
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSpec {
    /// Name of the units produced by this node
    pub name: String,
    /// Path expressions matching the unit's markup nodes
    pub xpaths: Vec<String>,
    /// Metadata rules, if any
    pub metadata: Option<Vec<MetadataRule>>,
    /// Path expressions for the sentence text; defaults to `xpaths`
    pub sentence_xpaths: Option<Vec<String>>,
}

/// A specification node that produces nested units
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalSpec {
    /// Name of the units produced by this node
    pub name: String,
    /// Path expressions matching the unit's markup nodes
    pub xpaths: Vec<String>,
    /// Metadata rules, if any
    pub metadata: Option<Vec<MetadataRule>>,
    /// Child specifications, applied in order under every match
    pub children: Vec<StructureSpec>,
}

/// A node of the structure specification tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawStructure", into = "RawStructure")]
pub enum StructureSpec {
    /// Produces units holding sentences
    Leaf(LeafSpec),
    /// Produces units holding nested units
    Internal(InternalSpec),
}

impl StructureSpec {
    /// Name given to units produced by this node
    pub fn name(&self) -> &str {
        match self {
            StructureSpec::Leaf(leaf) => &leaf.name,
            StructureSpec::Internal(internal) => &internal.name,
        }
    }

    /// Path expressions matching this node's units
    pub fn xpaths(&self) -> &[String] {
        match self {
            StructureSpec::Leaf(leaf) => &leaf.xpaths,
            StructureSpec::Internal(internal) => &internal.xpaths,
        }
    }

    /// Metadata rules, or `None` when the node declares no `metadata`
    pub fn metadata(&self) -> Option<&[MetadataRule]> {
        match self {
            StructureSpec::Leaf(leaf) => leaf.metadata.as_deref(),
            StructureSpec::Internal(internal) => internal.metadata.as_deref(),
        }
    }

    /// Child specifications (`None` for leaves)
    pub fn children(&self) -> Option<&[StructureSpec]> {
        match self {
            StructureSpec::Leaf(_) => None,
            StructureSpec::Internal(internal) => Some(&internal.children),
        }
    }

    /// Path expressions used to gather sentence text under a unit
    ///
    /// Leaves may name dedicated sentence paths; otherwise the unit's own
    /// `xpaths` are reused, relative to the unit's node.
    pub fn sentence_xpaths(&self) -> &[String] {
        match self {
            StructureSpec::Leaf(LeafSpec {
                sentence_xpaths: Some(paths),
                ..
            }) => paths,
            _ => self.xpaths(),
        }
    }

    /// Whether this node produces sentences
    pub fn is_leaf(&self) -> bool {
        matches!(self, StructureSpec::Leaf(_))
    }

    /// Depth of the specification tree rooted here (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .map(|children| children.iter().map(StructureSpec::depth).max().unwrap_or(0))
            .unwrap_or(0)
    }
}

/// Wire form of a specification node, as authored in JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawStructure {
    #[serde(rename = "structureName")]
    structure_name: String,

    xpaths: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    units: Option<Vec<RawStructure>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    metadata: Option<Vec<MetadataRule>>,

    #[serde(
        default,
        rename = "sentenceXpaths",
        alias = "xpaths-for-sentences",
        skip_serializing_if = "Option::is_none"
    )]
    sentence_xpaths: Option<Vec<String>>,
}

impl From<RawStructure> for StructureSpec {
    fn from(raw: RawStructure) -> Self {
        match raw.units {
            Some(units) => StructureSpec::Internal(InternalSpec {
                name: raw.structure_name,
                xpaths: raw.xpaths,
                metadata: raw.metadata,
                children: units.into_iter().map(StructureSpec::from).collect(),
            }),
            None => StructureSpec::Leaf(LeafSpec {
                name: raw.structure_name,
                xpaths: raw.xpaths,
                metadata: raw.metadata,
                sentence_xpaths: raw.sentence_xpaths,
            }),
        }
    }
}

impl From<StructureSpec> for RawStructure {
    fn from(spec: StructureSpec) -> Self {
        match spec {
            StructureSpec::Leaf(leaf) => RawStructure {
                structure_name: leaf.name,
                xpaths: leaf.xpaths,
                units: None,
                metadata: leaf.metadata,
                sentence_xpaths: leaf.sentence_xpaths,
            },
            StructureSpec::Internal(internal) => RawStructure {
                structure_name: internal.name,
                xpaths: internal.xpaths,
                units: Some(internal.children.into_iter().map(RawStructure::from).collect()),
                metadata: internal.metadata,
                sentence_xpaths: None,
            },
        }
    }
}
