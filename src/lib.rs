//! msvg - simplify exported map SVGs
//!
//! msvg strips unwanted layers (labels, outlines, water, ...) from map
//! exports, optionally recolors roads, buildings and parks, and can split a
//! map into one file per layer.

use log::debug;

mod ast;
mod classify;
mod error;
mod layers;
mod parse;
mod progress;
mod rewrite;
mod run;
mod serialize;

pub use ast::*;
pub use classify::*;
pub use error::*;
pub use layers::*;
pub use parse::*;
pub use progress::*;
pub use rewrite::*;
pub use run::*;
pub use serialize::*;

/// Run options.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Zoom level the maps were exported at (default: 14000)
    pub zoom: Zoom,
    /// Split each map into one file per layer plus a remainder
    pub expand: bool,
    /// Replacement colours for roads, buildings and parks
    pub colors: ColorOverrides,
}

/// Simplify one parsed map.
///
/// Returns a single [`OutputKind::Filtered`] document in normal mode, or one
/// document per layer followed by the remainder when `expand` is set.
pub fn process(
    mut doc: Document,
    rules: &Ruleset,
    colors: &ColorOverrides,
    expand: bool,
    progress: &mut dyn Progress,
) -> Vec<OutputDocument> {
    preprocess(&mut doc, progress);

    if expand {
        rewrite::expand(&doc, &ExpandPlan::new(rules), progress)
    } else {
        let stats = rewrite_layers(&mut doc, &LayerPlan::new(rules, colors), progress);
        debug!("removed {} drawables, restyled {}", stats.removed, stats.restyled);
        vec![OutputDocument {
            kind: OutputKind::Filtered,
            document: doc,
        }]
    }
}

/// Simplify an SVG string with the given options (normal mode only).
pub fn simplify(svg: &str, options: &Options) -> Result<String, MsvgError> {
    let rules = Ruleset::resolve(options.zoom.key())?;
    let outputs = process(parse_svg(svg)?, &rules, &options.colors, false, &mut NoProgress);
    Ok(outputs.iter().map(|o| serialize(&o.document)).collect())
}
