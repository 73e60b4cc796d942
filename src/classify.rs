//! Run-scoped match tables derived from a [`Ruleset`].
//!
//! Both plans are built once per run and only read afterwards.

use crate::layers::{ColorOverrides, Ruleset};

/// True when `style` contains any of `matches`. A missing style matches nothing.
pub fn contains_any(style: Option<&str>, matches: &[&str]) -> bool {
    style.is_some_and(|style| matches.iter().any(|m| style.contains(m)))
}

/// Style fragments that get a node deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalSet(Vec<&'static str>);

impl RemovalSet {
    pub fn matches(&self, style: Option<&str>) -> bool {
        contains_any(style, &self.0)
    }

    pub fn fragments(&self) -> &[&'static str] {
        &self.0
    }
}

/// Replace every occurrence of `matches` in a style with `color`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecolorRule {
    pub color: String,
    pub matches: Vec<&'static str>,
}

impl RecolorRule {
    pub fn apply(&self, style: &str) -> String {
        self.matches
            .iter()
            .fold(style.to_string(), |style, m| style.replace(m, &self.color))
    }
}

/// What to do with one drawable in normal mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Remove,
    Restyle(String),
    Keep,
}

/// Normal-mode plan: one removal set and an ordered list of recolor rules.
///
/// The last recolor rule always strips the layers' keep fragments (it
/// replaces them with nothing).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPlan {
    pub removals: RemovalSet,
    pub recolors: Vec<RecolorRule>,
}

impl LayerPlan {
    pub fn new(rules: &Ruleset, colors: &ColorOverrides) -> Self {
        let mut removals = Vec::new();
        let mut recolors = Vec::new();
        let mut keep = Vec::new();

        for (name, layer) in rules.iter() {
            keep.extend_from_slice(layer.keep);
            removals.extend_from_slice(layer.hide);

            match colors.get(name) {
                Some(color) => recolors.push(RecolorRule {
                    color: color.to_string(),
                    matches: layer.recolor.to_vec(),
                }),
                None => removals.extend_from_slice(layer.recolor),
            }
        }

        recolors.push(RecolorRule {
            color: String::new(),
            matches: keep,
        });

        Self {
            removals: RemovalSet(removals),
            recolors,
        }
    }

    pub fn classify(&self, style: Option<&str>) -> Action {
        let Some(style) = style else {
            return Action::Keep;
        };

        if self.removals.matches(Some(style)) {
            return Action::Remove;
        }

        let restyled = self
            .recolors
            .iter()
            .fold(style.to_string(), |style, rule| rule.apply(&style));

        if restyled == style {
            Action::Keep
        } else {
            Action::Restyle(restyled)
        }
    }
}

/// Every fragment of one layer, for expand mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedLayer {
    pub name: &'static str,
    pub matches: Vec<&'static str>,
}

impl ExpandedLayer {
    pub fn matches(&self, style: Option<&str>) -> bool {
        contains_any(style, &self.matches)
    }

    /// Layer name as used in file names: spaces become hyphens.
    pub fn file_label(&self) -> String {
        self.name.replace(' ', "-")
    }
}

/// Expand-mode plan: one entry per layer plus the union for the remainder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandPlan {
    pub layers: Vec<ExpandedLayer>,
    remainder: RemovalSet,
}

impl ExpandPlan {
    pub fn new(rules: &Ruleset) -> Self {
        let layers: Vec<_> = rules
            .iter()
            .map(|(name, layer)| ExpandedLayer {
                name,
                matches: layer.matches().collect(),
            })
            .collect();

        let remainder = RemovalSet(
            layers
                .iter()
                .flat_map(|layer| layer.matches.iter().copied())
                .collect(),
        );

        Self { layers, remainder }
    }

    /// Whether a style belongs to any layer at all.
    pub fn is_classified(&self, style: Option<&str>) -> bool {
        self.remainder.matches(style)
    }
}
