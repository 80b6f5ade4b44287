use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, body).unwrap();
    path
}

/// Two buses over a 2 × 1 grid of 0.5° cells with a constant 6 m/s wind.
fn onwind_fixture() -> TempDir {
    let dir = tempdir().unwrap();
    write(
        dir.path(),
        "regions.geojson",
        r#"{"type": "FeatureCollection", "features": [
            {"type": "Feature", "properties": {"name": "NG0 0", "x": 3.25, "y": 7.25, "country": "NG"},
             "geometry": {"type": "Polygon", "coordinates": [[[3,7],[3.5,7],[3.5,7.5],[3,7.5],[3,7]]]}},
            {"type": "Feature", "properties": {"name": "NG0 1", "x": 3.75, "y": 7.25, "country": "NG"},
             "geometry": {"type": "Polygon", "coordinates": [[[3.5,7],[4,7],[4,7.5],[3.5,7.5],[3.5,7]]]}}
        ]}"#,
    );
    let cutout = dir.path().join("cutout");
    fs::create_dir(&cutout).unwrap();
    write(
        &cutout,
        "cutout.json",
        r#"{
            "name": "test",
            "x": {"start": 3.25, "step": 0.5, "count": 2},
            "y": {"start": 7.25, "step": 0.5, "count": 1},
            "time": {"start": "2013-01-01T00:00:00Z", "step_hours": 1.0, "count": 2},
            "variables": {"wnd100m": "wind.csv"}
        }"#,
    );
    write(
        &cutout,
        "wind.csv",
        "time,x,y,wnd100m\n0,3.25,7.25,6\n0,3.75,7.25,6\n1,3.25,7.25,6\n1,3.75,7.25,6\n",
    );
    // west half of the grid is cropland (40), east half is forest (111)
    write(
        dir.path(),
        "copernicus.asc",
        "ncols 2\nnrows 1\nxllcorner 3.0\nyllcorner 7.0\ncellsize 0.5\nNODATA_value -9999\n40 111\n",
    );
    write(
        dir.path(),
        "config.yaml",
        &format!(
            r#"
countries: [NG]
atlite:
  nprocesses: 2
renewable:
  onwind:
    cutout: {}
    resource:
      method: wind
      turbine:
        hub_height: 100
        V: [0, 12, 25]
        POW: [0, 1, 1]
    capacity_per_sqkm: 3
    copernicus:
      grid_codes: [20, 30, 40]
    potential: simple
"#,
            cutout.display()
        ),
    );
    dir
}

fn profgen() -> Command {
    Command::cargo_bin("profgen").unwrap()
}

#[test]
fn build_then_inspect() {
    let dir = onwind_fixture();
    let out = dir.path().join("profile_onwind");
    profgen()
        .args(["build", "--config"])
        .arg(dir.path().join("config.yaml"))
        .args(["--technology", "onwind", "--regions"])
        .arg(dir.path().join("regions.geojson"))
        .arg("--copernicus")
        .arg(dir.path().join("copernicus.asc"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 profiles for 2 steps"))
        .stdout(predicate::str::contains("1 warning"));
    assert!(out.join("manifest.json").exists());

    profgen()
        .arg("inspect")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Technology : onwind"))
        .stdout(predicate::str::contains("Checksums  : OK"))
        .stdout(predicate::str::contains("potential"));

    let output = profgen()
        .args(["inspect", "--format", "json"])
        .arg(&out)
        .output()
        .unwrap();
    assert!(output.status.success());
    let manifest: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(manifest["technology"], "onwind");
    assert_eq!(manifest["kind"], "profile");
    assert_eq!(manifest["tables"]["buses"]["row_count"], 1);
    assert_eq!(manifest["diagnostics"]["issues"][0]["entity"], "NG0 1");
}

#[test]
fn missing_layer_input_fails_with_flag_name() {
    let dir = onwind_fixture();
    profgen()
        .args(["build", "--config"])
        .arg(dir.path().join("config.yaml"))
        .args(["--technology", "onwind", "--regions"])
        .arg(dir.path().join("regions.geojson"))
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("--copernicus"));
    assert!(!dir.path().join("out").exists());
}

#[test]
fn unknown_technology_fails() {
    let dir = onwind_fixture();
    profgen()
        .args(["build", "--config"])
        .arg(dir.path().join("config.yaml"))
        .args(["--technology", "solar", "--regions"])
        .arg(dir.path().join("regions.geojson"))
        .arg("--out")
        .arg(dir.path().join("out"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("solar"));
}

#[test]
fn inspect_rejects_tampered_dataset() {
    let dir = onwind_fixture();
    let out = dir.path().join("profile_onwind");
    profgen()
        .args(["build", "--config"])
        .arg(dir.path().join("config.yaml"))
        .args(["--technology", "onwind", "--regions"])
        .arg(dir.path().join("regions.geojson"))
        .arg("--copernicus")
        .arg(dir.path().join("copernicus.asc"))
        .arg("--out")
        .arg(&out)
        .assert()
        .success();
    fs::write(out.join("profile.arrow"), b"garbage").unwrap();
    profgen()
        .arg("inspect")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Checksum mismatch"));
}

#[test]
fn completions_for_bash() {
    profgen()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("profgen"));
}

#[test]
fn completions_written_to_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("completions").join("profgen.zsh");
    profgen()
        .args(["completions", "zsh", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote zsh completion"));
    let script = fs::read_to_string(&out).unwrap();
    assert!(script.contains("profgen"));
}
