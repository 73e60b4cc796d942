//! End-to-end runs over the sample map in `tests/fixtures`.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use msvg::{
    ColorOverrides, MsvgError, NoProgress, Options, Outcome, Progress, SvgNames, Zoom, parse_svg,
    run, simplify,
};

const FIXTURE: &str = include_str!("fixtures/map.svg");

fn run_default(input: &Path, output: &Path, options: &Options) -> Result<Outcome, MsvgError> {
    run(input, output, options, &mut NoProgress, &AtomicBool::new(false))
}

fn fixture_in(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, FIXTURE).unwrap();
    path
}

fn drawable_styles(svg: &str) -> Vec<Option<String>> {
    let doc = parse_svg(svg).unwrap();
    let names = SvgNames::of(&doc.root);
    doc.root
        .child_elements()
        .filter(|g| names.is(g, "g"))
        .flat_map(|g| g.child_elements())
        .filter(|e| names.is_drawable(e))
        .map(|e| e.style().map(str::to_string))
        .collect()
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect()
}

fn with_colors(roads: &str, parks: &str) -> Options {
    Options {
        colors: ColorOverrides {
            roads: Some(roads.into()),
            buildings: None,
            parks: Some(parks.into()),
        },
        ..Options::default()
    }
}

#[test]
fn test_single_file_without_overrides() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_in(tmp.path(), "map.svg");
    let output = tmp.path().join("out.svg");

    let outcome = run_default(&input, &output, &Options::default()).unwrap();
    assert_eq!(outcome, Outcome::Finished);

    let out = fs::read_to_string(&output).unwrap();
    assert!(out.starts_with("<?xml"));
    assert!(!out.contains("<defs"));
    assert!(!out.contains("clip-path"));
    assert!(!out.contains("xlink:href=\"#glyph0-0\""));

    let styles = drawable_styles(&out);
    assert_eq!(
        styles,
        [
            Some(
                "fill:none;stroke-width:0.7;stroke-linecap:butt;stroke-linejoin:miter;stroke-opacity:1;stroke-miterlimit:10;"
                    .to_string()
            ),
            Some(" stroke:none;fill-rule:nonzero;fill:rgb(12.54902%,25.098039%,37.647059%);fill-opacity:1;".to_string()),
            None,
        ]
    );
}

#[test]
fn test_single_file_with_overrides() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_in(tmp.path(), "map.svg");
    let output = tmp.path().join("out.svg");

    run_default(&input, &output, &with_colors("#FF0000", "#00AA00")).unwrap();

    let out = fs::read_to_string(&output).unwrap();
    let styles = drawable_styles(&out);
    assert_eq!(styles.len(), 6);
    assert!(styles.contains(&Some(
        " stroke:none;fill-rule:nonzero;fill:#00AA00;fill-opacity:1;".to_string()
    )));
    assert!(styles.contains(&Some(
        "fill:none;stroke-width:7.5;stroke-linecap:round;stroke-linejoin:round;stroke:#FF0000;stroke-opacity:1;stroke-miterlimit:10;"
            .to_string()
    )));
    assert_eq!(out.matches("stroke:#FF0000;").count(), 2);

    // Road casings and un-overridden buildings are still removed
    assert!(!out.contains("rgb(73.333333%,73.333333%,73.333333%)"));
    assert!(!out.contains("rgb(85.098039%,81.568627%,78.823529%)"));
}

#[test]
fn test_simplify_is_idempotent() {
    for options in [Options::default(), with_colors("#123456", "#654321")] {
        let once = simplify(FIXTURE, &options).unwrap();
        let twice = simplify(&once, &options).unwrap();
        assert_eq!(once, twice);
    }
}

#[test]
fn test_label_halos_depend_on_zoom() {
    let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g>
<path style="fill:none;stroke-width:2;stroke-linecap:butt;stroke-linejoin:round;stroke:rgb(100%,100%,100%);stroke-opacity:1;" d="M 0 0"/>
</g></svg>"#;

    let near = with_colors("#FF0000", "");
    assert!(drawable_styles(&simplify(svg, &near).unwrap()).is_empty());

    let far = Options {
        zoom: Zoom::Z43000,
        ..near
    };
    assert_eq!(
        drawable_styles(&simplify(svg, &far).unwrap()),
        [Some(
            "fill:none;stroke-width:2;stroke-linecap:butt;stroke-linejoin:round;stroke:#FF0000;stroke-opacity:1;"
                .to_string()
        )]
    );
}

#[test]
fn test_expand_single_file() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_in(tmp.path(), "map.svg");
    let output = tmp.path().join("out").join("map.svg");
    fs::create_dir(tmp.path().join("out")).unwrap();

    let options = Options {
        expand: true,
        ..Options::default()
    };
    assert_eq!(run_default(&input, &output, &options).unwrap(), Outcome::Finished);

    let dir = tmp.path().join("out").join("map");
    let names = file_names(&dir);
    let expected: BTreeSet<String> = [
        "map-roads.svg",
        "map-buildings.svg",
        "map-parks.svg",
        "map-city-blocks.svg",
        "map-water.svg",
        "map-trains.svg",
        "map-labels.svg",
        "map-misc.svg",
        "map-lines.svg",
        "map.svg",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    assert_eq!(names, expected);

    let count = |name: &str| drawable_styles(&fs::read_to_string(dir.join(name)).unwrap()).len();
    assert_eq!(count("map-roads.svg"), 3);
    assert_eq!(count("map-buildings.svg"), 2);
    assert_eq!(count("map-parks.svg"), 1);
    assert_eq!(count("map-city-blocks.svg"), 1);
    assert_eq!(count("map-water.svg"), 1);
    assert_eq!(count("map-lines.svg"), 1);
    assert_eq!(count("map-trains.svg"), 0);
    assert_eq!(count("map.svg"), 2);

    // Every drawable lands in exactly one file
    let total: usize = names.iter().map(|n| count(n)).sum();
    assert_eq!(total, drawable_styles(FIXTURE).len());

    // Styles are not rewritten in expand mode
    let buildings = fs::read_to_string(dir.join("map-buildings.svg")).unwrap();
    assert!(buildings.contains("stroke:rgb(72.54902%,66.27451%,61.176471%);"));
}

#[test]
fn test_directory_input_skips_other_files() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("maps");
    fs::create_dir(&input).unwrap();
    fixture_in(&input, "a.svg");
    fixture_in(&input, "b.svg");
    fs::write(input.join("notes.txt"), "not a map").unwrap();
    fs::create_dir(input.join("nested.svg")).unwrap();

    let output = tmp.path().join("simple");
    run_default(&input, &output, &Options::default()).unwrap();

    let names: Vec<_> = file_names(&output).into_iter().collect();
    assert_eq!(names, ["a.svg", "b.svg"]);
    assert_eq!(
        fs::read_to_string(output.join("a.svg")).unwrap(),
        simplify(FIXTURE, &Options::default()).unwrap()
    );
}

#[test]
fn test_directory_input_expanded() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("maps");
    fs::create_dir(&input).unwrap();
    fixture_in(&input, "midtown.svg");

    let output = tmp.path().join("layers");
    let options = Options {
        expand: true,
        ..Options::default()
    };
    run_default(&input, &output, &options).unwrap();

    let names = file_names(&output.join("midtown"));
    assert_eq!(names.len(), 10);
    assert!(names.contains("midtown-city-blocks.svg"));
    assert!(names.contains("midtown.svg"));
}

#[test]
fn test_existing_destination_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_in(tmp.path(), "map.svg");
    let output = tmp.path().join("out.svg");
    fs::write(&output, "keep").unwrap();

    let err = run_default(&input, &output, &Options::default()).unwrap_err();
    assert!(matches!(err, MsvgError::Usage(ref m) if m.ends_with("already exists")));
    assert_eq!(fs::read_to_string(&output).unwrap(), "keep");
    assert_eq!(file_names(tmp.path()).len(), 2);
}

#[test]
fn test_existing_expand_directory_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_in(tmp.path(), "map.svg");
    fs::create_dir(tmp.path().join("out")).unwrap();

    let options = Options {
        expand: true,
        ..Options::default()
    };
    let err = run_default(&input, &tmp.path().join("out.svg"), &options).unwrap_err();
    assert!(matches!(err, MsvgError::Usage(_)));
    assert!(file_names(&tmp.path().join("out")).is_empty());
}

#[test]
fn test_missing_input_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let err = run_default(
        &tmp.path().join("nope.svg"),
        &tmp.path().join("out.svg"),
        &Options::default(),
    )
    .unwrap_err();
    assert!(matches!(err, MsvgError::Usage(_)));
    assert!(file_names(tmp.path()).is_empty());
}

#[test]
fn test_interrupted_run_writes_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_in(tmp.path(), "map.svg");
    let output = tmp.path().join("out.svg");

    let outcome = run(
        &input,
        &output,
        &Options::default(),
        &mut NoProgress,
        &AtomicBool::new(true),
    )
    .unwrap();

    assert_eq!(outcome, Outcome::Interrupted);
    assert!(!output.exists());
    assert_eq!(file_names(tmp.path()).len(), 1);
}

/// Raises the interrupt flag as soon as the first file is being saved.
struct InterruptOnSave<'a> {
    interrupt: &'a AtomicBool,
}

impl Progress for InterruptOnSave<'_> {
    fn start(&mut self, name: &str, _total: usize) {
        if name.starts_with("Saving") {
            self.interrupt.store(true, Ordering::SeqCst);
        }
    }

    fn update(&mut self) {}

    fn finish(&mut self, _message: &str) {}
}

#[test]
fn test_interrupt_during_expand_keeps_saved_outputs() {
    let tmp = tempfile::tempdir().unwrap();
    let input = fixture_in(tmp.path(), "map.svg");
    let output = tmp.path().join("out.svg");
    let options = Options {
        expand: true,
        ..Options::default()
    };

    let interrupt = AtomicBool::new(false);
    let mut progress = InterruptOnSave {
        interrupt: &interrupt,
    };
    let outcome = run(&input, &output, &options, &mut progress, &interrupt).unwrap();
    assert_eq!(outcome, Outcome::Interrupted);

    // The save in flight completes; nothing after it is written
    let dir = tmp.path().join("out");
    let names: Vec<_> = file_names(&dir).into_iter().collect();
    assert_eq!(names, ["map-roads.svg"]);
    assert_eq!(
        drawable_styles(&fs::read_to_string(dir.join("map-roads.svg")).unwrap()).len(),
        3
    );
    assert_eq!(file_names(tmp.path()).len(), 2);
}

#[test]
fn test_interrupt_between_directory_files() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("maps");
    fs::create_dir(&input).unwrap();
    fixture_in(&input, "a.svg");
    fixture_in(&input, "b.svg");
    let output = tmp.path().join("simple");

    let interrupt = AtomicBool::new(false);
    let mut progress = InterruptOnSave {
        interrupt: &interrupt,
    };
    let outcome = run(&input, &output, &Options::default(), &mut progress, &interrupt).unwrap();
    assert_eq!(outcome, Outcome::Interrupted);

    // One complete map, no temporaries
    let names: Vec<_> = file_names(&output).into_iter().collect();
    assert_eq!(names.len(), 1);
    assert_eq!(
        fs::read_to_string(output.join(&names[0])).unwrap(),
        simplify(FIXTURE, &Options::default()).unwrap()
    );
}

#[test]
fn test_malformed_map_is_an_error() {
    let tmp = tempfile::tempdir().unwrap();
    let input = tmp.path().join("broken.svg");
    fs::write(&input, "<svg xmlns=\"http://www.w3.org/2000/svg\"><g>").unwrap();

    let result = run_default(&input, &tmp.path().join("out.svg"), &Options::default());
    assert!(result.is_err());
    assert!(!tmp.path().join("out.svg").exists());
}
