//! Whole-run driver: validation, file and directory inputs, output naming.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info};
use walkdir::WalkDir;

use crate::ast::Document;
use crate::error::MsvgError;
use crate::layers::Ruleset;
use crate::parse::read_svg;
use crate::progress::Progress;
use crate::rewrite::OutputKind;
use crate::serialize::write_svg;
use crate::{Options, process};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Finished,
    Interrupted,
}

impl Outcome {
    pub fn message(self) -> &'static str {
        match self {
            Outcome::Finished => "Finished",
            Outcome::Interrupted => "Interrupted",
        }
    }
}

/// Check the input and output paths before anything is read or written.
pub fn validate(input: &Path, output: &Path, options: &Options) -> Result<(), MsvgError> {
    if !input.is_file() && !input.is_dir() {
        return Err(MsvgError::Usage("argument 1 must be a file or directory".into()));
    }

    if output.exists() {
        return Err(already_exists(output));
    }

    if options.expand && input.is_file() {
        let dir = expanded_dir(output);
        if dir.exists() {
            return Err(already_exists(&dir));
        }
    }

    Ok(())
}

fn already_exists(path: &Path) -> MsvgError {
    MsvgError::Usage(format!("{} already exists", path.display()))
}

/// The directory expand mode writes the layers of `output` into.
pub fn expanded_dir(output: &Path) -> PathBuf {
    output.with_extension("")
}

/// File name of one layer of `file_name` in expand mode.
///
/// `map.svg` with layer `city blocks` becomes `map-city-blocks.svg`.
pub fn layer_file_name(file_name: &str, layer: &str) -> String {
    let stem = file_name.strip_suffix(".svg").unwrap_or(file_name);
    format!("{}-{}.svg", stem, layer.replace(' ', "-"))
}

/// Simplify `input` (a file or a directory of `.svg` files) into `output`.
///
/// `interrupt` is polled between steps; once it is set the run stops before
/// the next file or output and reports [`Outcome::Interrupted`]. Outputs
/// already written stay in place; the one in progress is never written.
pub fn run(
    input: &Path,
    output: &Path,
    options: &Options,
    progress: &mut dyn Progress,
    interrupt: &AtomicBool,
) -> Result<Outcome, MsvgError> {
    validate(input, output, options)?;

    let rules = set_up_layers(options, progress)?;
    let mut runner = Runner {
        progress: &mut *progress,
        interrupt,
        rules: &rules,
        options,
    };

    let outcome = match runner.run(input, output) {
        Ok(()) => Outcome::Finished,
        Err(MsvgError::Interrupted) => {
            info!("interrupted while processing {}", input.display());
            Outcome::Interrupted
        }
        Err(e) => return Err(e),
    };

    progress.finish(outcome.message());
    Ok(outcome)
}

fn set_up_layers(options: &Options, progress: &mut dyn Progress) -> Result<Ruleset, MsvgError> {
    let rules = Ruleset::resolve(options.zoom.key())?;
    info!("zoom {}: {} layers", options.zoom, rules.len());

    progress.start("Setting up layers", rules.len());
    for _ in 0..rules.len() {
        progress.update();
    }

    Ok(rules)
}

/// Where one output of `source` goes, given the destination the run
/// assigned to it.
fn output_path(kind: OutputKind, dest: &Path, file_name: &str) -> PathBuf {
    match kind {
        OutputKind::Filtered => dest.to_path_buf(),
        OutputKind::Layer(layer) => expanded_dir(dest).join(layer_file_name(file_name, layer)),
        OutputKind::Remainder => expanded_dir(dest).join(file_name),
    }
}

struct Runner<'a> {
    progress: &'a mut dyn Progress,
    interrupt: &'a AtomicBool,
    rules: &'a Ruleset,
    options: &'a Options,
}

impl Runner<'_> {
    fn check_interrupt(&self) -> Result<(), MsvgError> {
        if self.interrupt.load(Ordering::SeqCst) {
            Err(MsvgError::Interrupted)
        } else {
            Ok(())
        }
    }

    fn run(&mut self, input: &Path, output: &Path) -> Result<(), MsvgError> {
        if input.is_dir() {
            self.run_dir(input, output)
        } else {
            self.run_file(input, output)
        }
    }

    fn run_dir(&mut self, input: &Path, output: &Path) -> Result<(), MsvgError> {
        self.create_dir(output)?;

        for entry in WalkDir::new(input).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                let path = e.path().unwrap_or(input).to_path_buf();
                MsvgError::io(path, e.into())
            })?;

            let name = entry.file_name().to_string_lossy();
            if !entry.file_type().is_file() || !name.ends_with(".svg") {
                debug!("skipping {}", entry.path().display());
                continue;
            }

            self.run_file(entry.path(), &output.join(name.as_ref()))?;
        }

        Ok(())
    }

    fn run_file(&mut self, source: &Path, dest: &Path) -> Result<(), MsvgError> {
        self.check_interrupt()?;
        info!("processing {}", source.display());

        let file_name = source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| MsvgError::Usage(format!("{} has no file name", source.display())))?;

        self.progress.start(&format!("Parsing {}", source.display()), 1);
        let doc = read_svg(source)?;
        let outputs = process(
            doc,
            self.rules,
            &self.options.colors,
            self.options.expand,
            self.progress,
        );

        if self.options.expand {
            self.check_interrupt()?;
            self.create_dir(&expanded_dir(dest))?;
        }

        for output in &outputs {
            self.save(&output.document, &output_path(output.kind, dest, &file_name))?;
        }

        Ok(())
    }

    fn create_dir(&mut self, dir: &Path) -> Result<(), MsvgError> {
        self.progress.start(&format!("Creating {} directory", dir.display()), 1);
        fs::create_dir(dir).map_err(|e| MsvgError::io(dir, e))
    }

    fn save(&mut self, doc: &Document, dest: &Path) -> Result<(), MsvgError> {
        self.check_interrupt()?;
        self.progress.start(&format!("Saving {}", dest.display()), 1);
        write_svg(doc, dest)?;
        info!("wrote {}", dest.display());
        Ok(())
    }
}
