//! Closed enumerations used by resource fields.
//!
//! Every enumeration parses from its model-file spelling through [`FromStr`]
//! and serializes back to the canonical spelling.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// End-cap shape of a lyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LyphTopology {
    #[default]
    #[serde(rename = "TUBE")]
    Tube,
    /// Closed at the far end. Also spelled `BAG-`.
    #[serde(rename = "BAG", alias = "BAG-")]
    Bag,
    /// Closed at the near end. Also spelled `BAG+`.
    #[serde(rename = "BAG2", alias = "BAG+")]
    Bag2,
    #[serde(rename = "CYST")]
    Cyst,
}

impl LyphTopology {
    pub fn as_str(&self) -> &'static str {
        match self {
            LyphTopology::Tube => "TUBE",
            LyphTopology::Bag => "BAG",
            LyphTopology::Bag2 => "BAG2",
            LyphTopology::Cyst => "CYST",
        }
    }

    /// Which ends are capped, as `[far, near]`: the target end of the axis
    /// comes first, then the source end.
    pub fn radial_types(&self) -> [bool; 2] {
        match self {
            LyphTopology::Bag => [true, false],
            LyphTopology::Bag2 => [false, true],
            LyphTopology::Cyst => [true, true],
            LyphTopology::Tube => [false, false],
        }
    }

    /// Whether a chain whose template has this topology caps its first level.
    pub fn caps_start(&self) -> bool {
        matches!(self, LyphTopology::Bag2 | LyphTopology::Cyst)
    }

    /// Whether a chain whose template has this topology caps its last level.
    pub fn caps_end(&self) -> bool {
        matches!(self, LyphTopology::Bag | LyphTopology::Cyst)
    }
}

impl FromStr for LyphTopology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TUBE" => Ok(LyphTopology::Tube),
            "BAG" | "BAG-" => Ok(LyphTopology::Bag),
            "BAG2" | "BAG+" => Ok(LyphTopology::Bag2),
            "CYST" => Ok(LyphTopology::Cyst),
            _ => Err(format!("unknown lyph topology `{s}`")),
        }
    }
}

impl fmt::Display for LyphTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a link is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LinkGeometry {
    #[default]
    Link,
    Path,
    Invisible,
    Spline,
    Arc,
    Semicircle,
    Rectangle,
}

impl LinkGeometry {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkGeometry::Link => "LINK",
            LinkGeometry::Path => "PATH",
            LinkGeometry::Invisible => "INVISIBLE",
            LinkGeometry::Spline => "SPLINE",
            LinkGeometry::Arc => "ARC",
            LinkGeometry::Semicircle => "SEMICIRCLE",
            LinkGeometry::Rectangle => "RECTANGLE",
        }
    }
}

impl FromStr for LinkGeometry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "LINK" => Ok(LinkGeometry::Link),
            "PATH" => Ok(LinkGeometry::Path),
            "INVISIBLE" => Ok(LinkGeometry::Invisible),
            "SPLINE" => Ok(LinkGeometry::Spline),
            "ARC" => Ok(LinkGeometry::Arc),
            "SEMICIRCLE" => Ok(LinkGeometry::Semicircle),
            "RECTANGLE" => Ok(LinkGeometry::Rectangle),
            _ => Err(format!("unknown link geometry `{s}`")),
        }
    }
}

/// Transport process a link stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessType {
    #[default]
    Advective,
    Diffusive,
}

impl FromStr for ProcessType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADVECTIVE" => Ok(ProcessType::Advective),
            "DIFFUSIVE" => Ok(ProcessType::Diffusive),
            _ => Err(format!("unknown process type `{s}`")),
        }
    }
}

/// Kind of adjacency a coalescence declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CoalescenceTopology {
    /// The first lyph houses the others.
    Embedding,
    #[default]
    Connecting,
}

impl FromStr for CoalescenceTopology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "EMBEDDING" => Ok(CoalescenceTopology::Embedding),
            "CONNECTING" => Ok(CoalescenceTopology::Connecting),
            _ => Err(format!("unknown coalescence topology `{s}`")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topology_aliases() {
        assert_eq!("BAG-".parse::<LyphTopology>().unwrap(), LyphTopology::Bag);
        assert_eq!("BAG+".parse::<LyphTopology>().unwrap(), LyphTopology::Bag2);
        assert!("SPHERE".parse::<LyphTopology>().is_err());

        let parsed: LyphTopology = serde_json::from_str("\"BAG+\"").unwrap();
        assert_eq!(parsed, LyphTopology::Bag2);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"BAG2\"");
    }

    #[test]
    fn test_radial_types() {
        assert_eq!(LyphTopology::Tube.radial_types(), [false, false]);
        assert_eq!(LyphTopology::Bag.radial_types(), [true, false]);
        assert_eq!(LyphTopology::Bag2.radial_types(), [false, true]);
        assert_eq!(LyphTopology::Cyst.radial_types(), [true, true]);
    }

    #[test]
    fn test_radial_types_follow_capped_ends() {
        for topology in [
            LyphTopology::Tube,
            LyphTopology::Bag,
            LyphTopology::Bag2,
            LyphTopology::Cyst,
        ] {
            let [far, near] = topology.radial_types();
            assert_eq!(far, topology.caps_end(), "{topology:?}");
            assert_eq!(near, topology.caps_start(), "{topology:?}");
        }
    }

    #[test]
    fn test_geometry_parse() {
        assert_eq!(
            "INVISIBLE".parse::<LinkGeometry>().unwrap(),
            LinkGeometry::Invisible
        );
        assert_eq!(LinkGeometry::Semicircle.as_str(), "SEMICIRCLE");
        assert!("CURVE".parse::<LinkGeometry>().is_err());
    }
}
