use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use trellis_cli::{Args, run};

/// Collects all .toml documents from a directory
fn collect_documents(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("toml")
            })
            .collect()
    } else {
        Vec::new()
    };

    files.sort();
    files
}

/// Demo documents live at the workspace root.
fn demos_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .join("demos")
}

fn args_for(input: &Path, output: PathBuf) -> Args {
    Args {
        input: input.to_string_lossy().to_string(),
        output: output.to_string_lossy().to_string(),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let demos = collect_documents(demos_path());

    assert!(!demos.is_empty(), "No demo documents found in demos/");

    let mut failed = Vec::new();
    for demo in &demos {
        let output = temp_dir
            .path()
            .join(format!("{}.svg", demo.file_stem().unwrap().to_string_lossy()));

        match run(&args_for(demo, output.clone())) {
            Ok(()) => {
                let svg = fs::read_to_string(&output).expect("SVG file should exist");
                assert!(svg.contains("</svg>"), "{} produced incomplete SVG", demo.display());
            }
            Err(err) => failed.push((demo.clone(), err)),
        }
    }

    if !failed.is_empty() {
        eprintln!("\nDemos that failed:");
        for (path, err) in &failed {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} demo(s) failed unexpectedly", failed.len());
    }
}

#[test]
fn e2e_smoke_test_error_demos() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let error_demos = collect_documents(demos_path().join("errors"));

    assert!(
        !error_demos.is_empty(),
        "No error documents found in demos/errors/"
    );

    let unexpectedly_succeeded: Vec<_> = error_demos
        .iter()
        .filter(|demo| {
            let output = temp_dir.path().join(format!(
                "error_{}.svg",
                demo.file_stem().unwrap().to_string_lossy()
            ));
            run(&args_for(demo, output)).is_ok()
        })
        .collect();

    assert!(
        unexpectedly_succeeded.is_empty(),
        "Error documents that unexpectedly succeeded: {unexpectedly_succeeded:?}"
    );
}

#[test]
fn e2e_missing_input_fails() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let missing = temp_dir.path().join("missing.toml");

    assert!(run(&args_for(&missing, temp_dir.path().join("out.svg"))).is_err());
}
