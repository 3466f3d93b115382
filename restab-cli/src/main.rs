mod manifest;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;
use restab_core::{GeneratedFiles, ResourceLibrary};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::manifest::Manifest;

/// Compile resource table manifests into C++ `.h`/`.cc` pairs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Manifest files, or directories searched recursively for `*.toml`
    /// manifests (files without `target`/`namespace` keys are skipped)
    #[arg(required = true, value_name = "INPUT")]
    inputs: Vec<PathBuf>,

    #[arg(
        short,
        long,
        value_name = "DIR",
        help = "Directory for generated files (defaults to each manifest's directory)"
    )]
    out_dir: Option<PathBuf>,

    #[arg(
        long,
        conflicts_with = "stdout",
        help = "Fail if the generated files on disk are missing or out of date"
    )]
    check: bool,

    #[arg(long, help = "Print the generated artifacts instead of writing them")]
    stdout: bool,

    #[arg(short, long, help = "Enable debug logging (overridden by RUST_LOG)")]
    verbose: bool,
}

struct Job {
    manifest: PathBuf,
    library: ResourceLibrary,
    base: PathBuf,
    files: GeneratedFiles,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(cli)
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn execute(cli: Cli) -> Result<()> {
    let manifests = discover_manifests(&cli.inputs)?;

    // Every library is built before anything is written, so a bad manifest
    // leaves no output behind.
    let jobs = manifests
        .into_iter()
        .map(|path| prepare(&path, cli.out_dir.as_deref()))
        .collect::<Result<Vec<_>>>()?;

    if cli.stdout {
        for job in &jobs {
            let artifacts = job.library.render()?;
            print!("{}", artifacts.header);
            print!("{}", artifacts.source);
        }
    } else if cli.check {
        check(&jobs)?;
    } else {
        for job in &jobs {
            if let Some(dir) = job.files.header.parent() {
                if !dir.as_os_str().is_empty() {
                    fs::create_dir_all(dir)
                        .with_context(|| format!("failed to create directory {}", dir.display()))?;
                }
            }
            job.library.generate(&job.base)?;
            info!(
                manifest = %job.manifest.display(),
                "generated {} and {}",
                job.files.header.display(),
                job.files.source.display()
            );
        }
    }

    Ok(())
}

fn discover_manifests(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut manifests = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let walker = WalkDir::new(input).sort_by_file_name();
            for entry in walker {
                let entry = entry.with_context(|| format!("failed to scan {}", input.display()))?;
                let path = entry.path();
                if path.is_file() && path.extension().is_some_and(|ext| ext == "toml") {
                    if looks_like_manifest(path)? {
                        manifests.push(path.to_path_buf());
                    } else {
                        debug!(path = %path.display(), "skipping non-manifest toml");
                    }
                }
            }
        } else if input.is_file() {
            manifests.push(input.clone());
        } else {
            bail!("input {} does not exist", input.display());
        }
    }
    if manifests.is_empty() {
        bail!("no manifests found");
    }
    debug!(count = manifests.len(), "manifests discovered");
    Ok(manifests)
}

/// Other TOML files (`Cargo.toml`, tool configs) share directories with
/// manifests. Unparseable files are kept so their errors get reported.
fn looks_like_manifest(path: &Path) -> Result<bool> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(match text.parse::<toml::Table>() {
        Ok(table) => table.contains_key("target") || table.contains_key("namespace"),
        Err(_) => true,
    })
}

fn prepare(path: &Path, out_dir: Option<&Path>) -> Result<Job> {
    let manifest = Manifest::load(path)?;
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => path.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    let base = dir.join(manifest.basename());
    let files = GeneratedFiles::for_base(&base);
    let library = manifest
        .into_library()
        .with_context(|| format!("failed to compile {}", path.display()))?;
    Ok(Job {
        manifest: path.to_path_buf(),
        library,
        base,
        files,
    })
}

fn check(jobs: &[Job]) -> Result<()> {
    let mut stale = Vec::new();
    for job in jobs {
        let artifacts = job.library.render()?;
        for (path, expected) in [
            (&job.files.header, &artifacts.header),
            (&job.files.source, &artifacts.source),
        ] {
            match fs::read_to_string(path) {
                Ok(actual) if actual == *expected => debug!(path = %path.display(), "up to date"),
                Ok(_) => {
                    warn!(path = %path.display(), "out of date");
                    stale.push(path.display().to_string());
                }
                Err(err) => {
                    warn!(path = %path.display(), %err, "missing");
                    stale.push(path.display().to_string());
                }
            }
        }
    }
    if !stale.is_empty() {
        bail!("generated files are out of date: {}", stale.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::tempdir;

    const LEDS: &str = r##"
target = "stm32x"
namespace = "resources"
header = "// Generated by restab"
includes = ["#include <stdint.h>"]

[[table]]
name = "led"
prefix = "LED"
c_type = "uint32_t"
entries = [
  { key = "red", value = 0xFF0000 },
  { key = "green", value = 0x00FF00 },
]

[[table]]
name = "seq"
prefix = "SEQ"
c_type = "uint8_t"
use_aliases = true

[[table.entries]]
key = "blink"
value = { array = { name = "steps", c_type = "uint8_t", values = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9] } }
"##;

    #[test]
    fn generates_header_and_source() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("resources.toml");
        fs::write(&input_path, LEDS).expect("write manifest");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&input_path)
            .assert()
            .success();

        let header = fs::read_to_string(dir.path().join("resources.h")).expect("read header");
        assert!(header.starts_with("// Generated by restab\n#ifndef STM32X_RESOURCES_H_\n"));
        assert!(header.contains("extern const uint8_t *seqs[SEQ_LAST];"));

        let source = fs::read_to_string(dir.path().join("resources.cc")).expect("read source");
        assert!(source.contains(
            "static const uint8_t seq_blink_steps[10] = {\n  0, 1, 2, 3, 4, 5, 6, 7,\n  8, 9,\n};\n"
        ));
        assert!(source.contains("  &seq_blink,\n"));
    }

    #[test]
    fn writes_into_out_dir() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("resources.toml");
        fs::write(&input_path, LEDS).expect("write manifest");
        let out_dir = dir.path().join("generated").join("nested");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&input_path)
            .arg("--out-dir")
            .arg(&out_dir)
            .assert()
            .success();

        assert!(out_dir.join("resources.h").exists());
        assert!(out_dir.join("resources.cc").exists());
    }

    #[test]
    fn scans_directories_for_manifests() {
        let dir = tempdir().expect("tempdir");
        let nested = dir.path().join("tables");
        fs::create_dir_all(&nested).expect("create dir");
        fs::write(nested.join("a.toml"), LEDS).expect("write manifest");
        fs::write(
            nested.join("b.toml"),
            LEDS.replace("namespace = \"resources\"", "namespace = \"other\""),
        )
        .expect("write manifest");
        fs::write(nested.join("notes.txt"), "ignored").expect("write notes");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(dir.path())
            .assert()
            .success();

        assert!(nested.join("resources.h").exists());
        assert!(nested.join("other.cc").exists());
    }

    #[test]
    fn skips_unrelated_toml_files_when_scanning() {
        let dir = tempdir().expect("tempdir");
        fs::write(dir.path().join("resources.toml"), LEDS).expect("write manifest");
        fs::write(
            dir.path().join("Cargo.toml"),
            "[package]\nname = \"firmware\"\nversion = \"0.1.0\"\n",
        )
        .expect("write cargo manifest");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(dir.path())
            .assert()
            .success();

        assert!(dir.path().join("resources.h").exists());
        assert!(!dir.path().join("firmware.h").exists());
    }

    #[test]
    fn explicit_non_manifest_inputs_are_rejected() {
        let dir = tempdir().expect("tempdir");
        let cargo = dir.path().join("Cargo.toml");
        fs::write(&cargo, "[package]\nname = \"firmware\"\n").expect("write cargo manifest");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&cargo)
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid manifest"));
    }

    #[test]
    fn broken_manifests_in_directories_are_reported() {
        let dir = tempdir().expect("tempdir");
        fs::write(
            dir.path().join("resources.toml"),
            "target = \"stm32x\"\nnamespace = ",
        )
        .expect("write manifest");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid manifest"));
    }

    #[test]
    fn prints_to_stdout() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("resources.toml");
        fs::write(&input_path, LEDS).expect("write manifest");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&input_path)
            .arg("--stdout")
            .assert()
            .success()
            .stdout(predicate::str::contains("enum ELed {\n  LED_RED,\n  LED_GREEN,\n  LED_LAST\n}"))
            .stdout(predicate::str::contains("#include \"resources.h\""));

        assert!(!dir.path().join("resources.h").exists());
    }

    #[test]
    fn check_detects_drift() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("resources.toml");
        fs::write(&input_path, LEDS).expect("write manifest");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&input_path)
            .arg("--check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("out of date"));

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&input_path)
            .assert()
            .success();

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&input_path)
            .arg("--check")
            .assert()
            .success();

        fs::write(&input_path, LEDS.replace("0xFF0000", "0xFF0001")).expect("edit manifest");
        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(&input_path)
            .arg("--check")
            .assert()
            .failure()
            .stderr(predicate::str::contains("resources.cc"));
    }

    #[test]
    fn reports_duplicate_keys_without_writing() {
        let dir = tempdir().expect("tempdir");
        let good = dir.path().join("a.toml");
        fs::write(&good, LEDS).expect("write manifest");
        let bad = dir.path().join("b.toml");
        fs::write(
            &bad,
            LEDS.replace("namespace = \"resources\"", "namespace = \"bad\"")
                .replace("key = \"green\"", "key = \"RED\""),
        )
        .expect("write manifest");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("duplicate key `RED`"));

        assert!(!dir.path().join("resources.h").exists());
        assert!(!dir.path().join("bad.h").exists());
    }

    #[test]
    fn reports_missing_input() {
        let dir = tempdir().expect("tempdir");

        Command::cargo_bin("restab")
            .expect("binary exists")
            .arg(dir.path().join("missing.toml"))
            .assert()
            .failure()
            .stderr(predicate::str::contains("does not exist"));
    }

    #[test]
    fn output_is_stable_across_runs() {
        let dir = tempdir().expect("tempdir");
        let input_path = dir.path().join("resources.toml");
        fs::write(&input_path, LEDS).expect("write manifest");

        let run = || {
            Command::cargo_bin("restab")
                .expect("binary exists")
                .arg(&input_path)
                .assert()
                .success();
            (
                fs::read(dir.path().join("resources.h")).expect("read header"),
                fs::read(dir.path().join("resources.cc")).expect("read source"),
            )
        };
        assert_eq!(run(), run());
    }
}
