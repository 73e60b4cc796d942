//! Layer filtering passes over a parsed map.
//!
//! Only the shallow structure of a map export is considered: `<defs>` and
//! `<g>` directly under the root, and `<path>`/`<rect>` directly inside those
//! groups. Anything nested deeper goes away with the sub-group holding it.

use log::debug;

use crate::ast::{Document, Element, SvgNames};
use crate::classify::{Action, ExpandPlan, ExpandedLayer, LayerPlan};
use crate::progress::Progress;

/// Counts from a normal-mode rewrite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    pub removed: usize,
    pub restyled: usize,
}

/// Which part of the input an output document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    /// The whole map, filtered and recolored.
    Filtered,
    /// The drawables of one layer.
    Layer(&'static str),
    /// The drawables no layer claims.
    Remainder,
}

#[derive(Debug, Clone)]
pub struct OutputDocument {
    pub kind: OutputKind,
    pub document: Document,
}

/// Drop every `<defs>` under the root. Returns how many were removed.
pub fn remove_defs(doc: &mut Document, progress: &mut dyn Progress) -> usize {
    let names = SvgNames::of(&doc.root);
    let count = doc.root.child_elements().filter(|e| names.is(e, "defs")).count();

    progress.start("Removing <defs>", count);
    doc.root.retain_elements(|e| {
        if names.is(e, "defs") {
            progress.update();
            false
        } else {
            true
        }
    })
}

/// Drop every `<g>` nested directly inside a top-level `<g>`.
pub fn remove_sub_groups(doc: &mut Document, progress: &mut dyn Progress) -> usize {
    let names = SvgNames::of(&doc.root);
    let mut removed = 0;

    for group in top_level_groups(&mut doc.root, &names) {
        let count = group.child_elements().filter(|e| names.is(e, "g")).count();

        progress.start("Removing <g>", count);
        removed += group.retain_elements(|e| {
            if names.is(e, "g") {
                progress.update();
                false
            } else {
                true
            }
        });
    }

    removed
}

/// Strip definitions and sub-groups; every output starts from this.
pub fn preprocess(doc: &mut Document, progress: &mut dyn Progress) {
    let defs = remove_defs(doc, progress);
    let groups = remove_sub_groups(doc, progress);
    debug!("removed {defs} <defs> and {groups} nested <g>");
}

/// Normal mode: remove and restyle drawables in place.
pub fn rewrite_layers(
    doc: &mut Document,
    plan: &LayerPlan,
    progress: &mut dyn Progress,
) -> RewriteStats {
    let mut stats = RewriteStats::default();

    for_each_drawable(doc, progress, |node| match plan.classify(node.style()) {
        Action::Remove => {
            stats.removed += 1;
            false
        }
        Action::Restyle(style) => {
            stats.restyled += 1;
            node.set_attr("style", style);
            true
        }
        Action::Keep => true,
    });

    stats
}

/// A copy of `doc` holding only the drawables of `layer`. Styles are untouched.
pub fn extract_layer(
    doc: &Document,
    layer: &ExpandedLayer,
    progress: &mut dyn Progress,
) -> Document {
    let mut copy = doc.clone();
    for_each_drawable(&mut copy, progress, |node| layer.matches(node.style()));
    copy
}

/// A copy of `doc` holding only the drawables no layer claims.
pub fn extract_remainder(
    doc: &Document,
    plan: &ExpandPlan,
    progress: &mut dyn Progress,
) -> Document {
    let mut copy = doc.clone();
    for_each_drawable(&mut copy, progress, |node| !plan.is_classified(node.style()));
    copy
}

/// Expand mode: one document per layer in catalog order, then the remainder.
///
/// `doc` must already be preprocessed.
pub fn expand(
    doc: &Document,
    plan: &ExpandPlan,
    progress: &mut dyn Progress,
) -> Vec<OutputDocument> {
    let mut out: Vec<_> = plan
        .layers
        .iter()
        .map(|layer| OutputDocument {
            kind: OutputKind::Layer(layer.name),
            document: extract_layer(doc, layer, progress),
        })
        .collect();

    out.push(OutputDocument {
        kind: OutputKind::Remainder,
        document: extract_remainder(doc, plan, progress),
    });

    out
}

fn top_level_groups<'a>(
    root: &'a mut Element,
    names: &'a SvgNames,
) -> impl Iterator<Item = &'a mut Element> {
    root.child_elements_mut().filter(move |e| names.is(e, "g"))
}

/// Run `keep` over every drawable of every top-level group, dropping those
/// it rejects. Other children are left alone.
fn for_each_drawable(
    doc: &mut Document,
    progress: &mut dyn Progress,
    mut keep: impl FnMut(&mut Element) -> bool,
) {
    let names = SvgNames::of(&doc.root);

    for group in top_level_groups(&mut doc.root, &names) {
        let count = group.child_elements().filter(|e| names.is_drawable(e)).count();

        progress.start("Updating layers", count);
        group.retain_elements(|e| {
            if names.is_drawable(e) {
                progress.update();
                keep(e)
            } else {
                true
            }
        });
    }
}
