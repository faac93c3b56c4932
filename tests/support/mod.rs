#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const MINIMAL_CONTAINER: &str =
    "image: docker.io/x/y:latest\ndescription: test\ntransport: stdio\n";

pub const MINIMAL_REMOTE: &str =
    "url: https://api.example.com/mcp\ndescription: test\ntransport: sse\n";

/// Scratch catalog root with helpers for writing entry directories.
pub struct CatalogFixture {
    dir: TempDir,
}

impl CatalogFixture {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("failed to allocate catalog root")?;
        fs::create_dir_all(dir.path().join("registry"))?;
        Ok(Self { dir })
    }

    pub fn root(&self) -> PathBuf {
        self.dir.path().join("registry")
    }

    pub fn output_dir(&self) -> PathBuf {
        self.dir.path().join("build")
    }

    pub fn write_entry(&self, name: &str, spec: &str) -> Result<PathBuf> {
        let dir = self.root().join(name);
        fs::create_dir_all(&dir)?;
        let path = dir.join("spec.yaml");
        fs::write(&path, spec).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }

    pub fn write_file(&self, relative: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, contents)?;
        Ok(path)
    }
}

pub fn catalog_builder() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_catalog-builder"));
    cmd.env_remove("CATALOG_ROOT")
        .env_remove("CATALOG_OUTPUT_DIR")
        .env_remove("CATALOG_LOG");
    cmd
}

pub fn update_tools() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_catalog-update-tools"));
    cmd.env("CATALOG_LOG", "warn");
    cmd
}

pub fn catalog_import() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_catalog-import"));
    cmd.env_remove("CATALOG_ROOT").env("CATALOG_LOG", "warn");
    cmd
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run a command that is expected to fail and return its stderr.
pub fn run_failing(mut cmd: Command) -> Result<String> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {:?}", cmd))?;
    if output.status.success() {
        bail!(
            "command {:?} unexpectedly succeeded\nstdout: {}",
            cmd,
            String::from_utf8_lossy(&output.stdout)
        );
    }
    if output.status.code() != Some(1) {
        bail!("command {:?} exited with {:?}, expected 1", cmd, output.status.code());
    }
    Ok(String::from_utf8_lossy(&output.stderr).into_owned())
}

pub fn read_json(path: &Path) -> Result<serde_json::Value> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(serde_json::from_str(&raw)?)
}
