//! The layer catalog.
//!
//! Every entry is a literal fragment of a `style` attribute as it appears in
//! map exports. A drawable belongs to a layer when its style contains one of
//! the layer's fragments. The fragments are matched byte for byte, so they
//! keep the exact number formatting the exporter writes.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::error::ConfigError;

/// Classification data for one named layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerRule {
    /// Always removed.
    pub hide: &'static [&'static str],
    /// Recolored when the layer has an override colour, removed otherwise.
    pub recolor: &'static [&'static str],
    /// Kept, with the fragment itself stripped from the style.
    pub keep: &'static [&'static str],
}

impl LayerRule {
    const fn new(
        keep: &'static [&'static str],
        recolor: &'static [&'static str],
        hide: &'static [&'static str],
    ) -> Self {
        Self { hide, recolor, keep }
    }

    const fn hidden(hide: &'static [&'static str]) -> Self {
        Self::new(&[], &[], hide)
    }

    /// All fragments of this layer: keep, then hide, then recolor.
    pub fn matches(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.keep
            .iter()
            .chain(self.hide)
            .chain(self.recolor)
            .copied()
    }
}

const ROADS: LayerRule = LayerRule::new(
    &[],
    &[
        "rgb(53.72549%,64.313725%,79.607843%)",  // blue road
        "rgb(58.039216%,83.137255%,58.039216%)", // green road
        "rgb(60%,60%,60%)",                      // campus road
        "rgb(60%,80%,80%)",                      // light grey road
        "rgb(66.666667%,66.666667%,66.666667%)", // grey road
        "rgb(86.666667%,62.352941%,62.352941%)", // red road
        "rgb(86.666667%,86.666667%,86.666667%)", // cul de sac
        "rgb(88.627451%,90.980392%,94.901961%)", // tunnel
        "rgb(94.901961%,94.901961%,94.901961%)", // light grey road
        "rgb(97.254902%,97.254902%,72.941176%)", // yellow road
        "rgb(97.647059%,83.921569%,66.666667%)", // brown road
        "rgb(98.039216%,98.039216%,81.960784%)", // light yellow road
        "rgb(100%,100%,100%)",                   // white road
    ],
    &[
        "rgb(46.666667%,53.333333%,63.137255%)", // blue road casing
        "rgb(49.411765%,68.235294%,49.411765%)", // green road casing
        "rgb(73.333333%,73.333333%,73.333333%)", // white road casing
        "rgb(77.254902%,48.235294%,49.411765%)", // red road casing
        "rgb(77.647059%,77.647059%,54.117647%)", // yellow road casing
        "rgb(80%,63.137255%,41.568627%)",        // brown road casing
        "rgb(91.764706%,77.254902%,77.254902%)", // blue road casing
    ],
);

const BUILDINGS: LayerRule = LayerRule::new(
    &[
        "stroke:rgb(72.54902%,66.27451%,61.176471%);", // building outline
    ],
    &[
        "rgb(68.627451%,61.176471%,55.294118%)",
        "rgb(83.137255%,66.666667%,66.666667%)", // landmark
        "rgb(94.901961%,85.490196%,85.098039%)",
        "rgb(92.941176%,86.666667%,78.823529%)",
        "rgb(81.960784%,77.647059%,74.117647%)",
        "rgb(85.098039%,81.568627%,78.823529%)",
        "rgb(71.372549%,70.980392%,57.254902%)", // construction
    ],
    &[],
);

const PARKS: LayerRule = LayerRule::new(
    &[],
    &[
        "rgb(20%,80%,60%)",                      // pier fields, park squares
        "rgb(54.117647%,82.745098%,68.627451%)", // soccer field
        "rgb(62.745098%,81.176471%,52.156863%)",
        "rgb(70.980392%,89.019608%,70.980392%)",
        "rgb(80%,100%,94.509804%)", // residential squares
        "rgb(80.392157%,96.862745%,78.823529%)",
        "rgb(92.941176%,92.941176%,92.941176%)", // park paths
    ],
    &[
        "rgb(45.490196%,86.27451%,72.941176%)",  // stadiums
        "rgb(66.666667%,79.607843%,68.627451%)", // sports fields
        "rgb(68.235294%,81.960784%,62.745098%)", // second park layer
        "rgb(81.176471%,92.54902%,65.882353%)",  // park patches
        "rgb(93.72549%,83.921569%,70.980392%)",
    ],
);

const CITY_BLOCKS: LayerRule = LayerRule::hidden(&[
    "rgb(88.235294%,88.235294%,88.235294%)",
    "rgb(91.372549%,90.588235%,88.627451%)", // docks
    "rgb(92.156863%,85.882353%,90.980392%)",
    "rgb(94.901961%,93.72549%,91.372549%)", // piers and paths
]);

const WATER: LayerRule = LayerRule::hidden(&["rgb(70.980392%,81.568627%,81.568627%)"]);

const TRAINS: LayerRule = LayerRule::hidden(&[
    "rgb(47.45098%,50.588235%,69.019608%)", // stations
    "rgb(52.54902%,52.54902%,52.54902%)",
]);

const LABELS: LayerRule = LayerRule::hidden(&[
    "fill:rgb(100",
    "fill:rgb(46.666",
    "rgb(0%,57.254902%,85.490196%)", // parking
    "rgb(30.196078%,30.196078%,30.196078%)",
    "rgb(52.941176%,67.058824%,52.941176%)",
    "rgb(73.333333%,48.235294%,49.803922%)",
    "rgb(76.862745%,77.647059%,56.078431%)",
    "rgb(77.647059%,67.843137%,51.764706%)",
    "rgb(81.568627%,56.078431%,33.333333%)",
    "rgb(85.490196%,0%,57.254902%)", // hospital
]);

const MISC: LayerRule = LayerRule::hidden(&[
    "opacity:0",
    "rgb(0%,0%,0%)",
    "rgb(17.254902%,55.294118%,55.294118%)",
    "rgb(33.333333%,33.333333%,33.333333%)",
    "rgb(46.666667%,46.666667%,46.666667%)", // shipping yard
    "rgb(50.196078%,50.196078%,50.196078%)",
    "rgb(64.705882%,16.470588%,16.470588%)",
    "rgb(80%,80%,80%)",
    "rgb(80.392157%,80%,78.823529%)", // under buildings
    "rgb(87.058824%,96.470588%,75.294118%)",
    "rgb(94.117647%,94.117647%,84.705882%)", // under buildings
    "rgb(96.862745%,93.72549%,71.764706%)",
    "rgb(98.431373%,88.235294%,76.078431%)",
    "stroke:rgb(0%,60%,43.529412%)",
]);

const LINES_14000: LayerRule = LayerRule::hidden(&[
    "dasharray",
    "stroke-width:0.2", // dock outlines
    "stroke-width:0.3", // park outlines
    "stroke-width:0.5", // stadium outlines
    "url(#pattern",
    // road label halos
    concat!(
        "stroke-width:2;stroke-linecap:butt;",
        "stroke-linejoin:round;",
        "stroke:rgb(100%,100%,100%);",
    ),
]);

const LINES_43000: LayerRule = LayerRule::hidden(&[
    "dasharray",
    "stroke-width:0.2",
    "stroke-width:0.3",
    "stroke-width:0.5",
    "url(#pattern",
]);

const BASE: [(&str, LayerRule); 8] = [
    ("roads", ROADS),
    ("buildings", BUILDINGS),
    ("parks", PARKS),
    ("city blocks", CITY_BLOCKS),
    ("water", WATER),
    ("trains", TRAINS),
    ("labels", LABELS),
    ("misc", MISC),
];

/// Map zoom level the export was made at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Zoom {
    #[default]
    #[value(name = "14000")]
    Z14000,
    #[value(name = "43000")]
    Z43000,
}

impl Zoom {
    pub const ALL: [Zoom; 2] = [Zoom::Z14000, Zoom::Z43000];

    pub fn key(self) -> &'static str {
        match self {
            Zoom::Z14000 => "14000",
            Zoom::Z43000 => "43000",
        }
    }

    fn overrides(self) -> [(&'static str, LayerRule); 1] {
        match self {
            Zoom::Z14000 => [("lines", LINES_14000)],
            Zoom::Z43000 => [("lines", LINES_43000)],
        }
    }
}

impl FromStr for Zoom {
    type Err = ConfigError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        Zoom::ALL
            .into_iter()
            .find(|z| z.key() == key)
            .ok_or_else(|| ConfigError::UnsupportedZoom(key.to_string()))
    }
}

impl fmt::Display for Zoom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Layers in effect for one zoom level, in catalog order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ruleset {
    layers: IndexMap<&'static str, LayerRule>,
}

impl Ruleset {
    /// Resolve the ruleset for a zoom key such as `"14000"`.
    pub fn resolve(zoom_key: &str) -> Result<Self, ConfigError> {
        Ok(Self::for_zoom(zoom_key.parse()?))
    }

    /// The base layers with the zoom-specific layers merged over them.
    ///
    /// A zoom layer that shares a base layer's name takes its place; new
    /// names are appended after the base layers.
    pub fn for_zoom(zoom: Zoom) -> Self {
        let mut layers: IndexMap<_, _> = BASE.into_iter().collect();
        layers.extend(zoom.overrides());
        Self { layers }
    }

    pub fn get(&self, name: &str) -> Option<&LayerRule> {
        self.layers.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &LayerRule)> + '_ {
        self.layers.iter().map(|(name, rule)| (*name, rule))
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Replacement colours for the recolorable layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorOverrides {
    pub roads: Option<String>,
    pub buildings: Option<String>,
    pub parks: Option<String>,
}

impl ColorOverrides {
    /// The override for `layer`, if one is set. Empty strings count as unset.
    pub fn get(&self, layer: &str) -> Option<&str> {
        let color = match layer {
            "roads" => &self.roads,
            "buildings" => &self.buildings,
            "parks" => &self.parks,
            _ => return None,
        };
        color.as_deref().filter(|c| !c.is_empty())
    }
}
