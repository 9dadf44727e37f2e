//! Whole-site builds: pages directory in, HTML files out.

use anyhow::{Context, Result, bail};
use cssx_core::loader::DSL_EXTENSION;
use cssx_core::{FilesystemSource, GlobalConfig, Transpiler};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub pages: PathBuf,
    pub output: PathBuf,
    pub public: PathBuf,
    pub config: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct BuildReport {
    pub generated: Vec<PathBuf>,
    pub copied: usize,
    pub failed: Vec<(String, String)>,
    pub warnings: usize,
}

pub fn build(options: &BuildOptions) -> Result<BuildReport> {
    if !options.pages.is_dir() {
        bail!("{} directory not found", options.pages.display());
    }

    let defaults = match &options.config {
        Some(path) => GlobalConfig::load(path)?,
        None => GlobalConfig::default(),
    };

    prepare_output_dir(&options.output)?;
    let copied = copy_public_dir(&options.public, &options.output)?;

    let pages = collect_pages(&options.pages)?;
    let source = FilesystemSource::new(&options.pages);
    log::info!("Compiling {} page(s) from {}", pages.len(), source.root().display());
    let transpiler = Transpiler::new().with_pages(source).with_defaults(defaults);

    // Pages are independent; each compile only reads shared state.
    let results: Vec<Result<(PathBuf, usize)>> = pages
        .par_iter()
        .map(|name| build_page(&transpiler, name, &options.output))
        .collect();

    let mut report = BuildReport {
        copied,
        ..BuildReport::default()
    };
    for (name, result) in pages.iter().zip(results) {
        match result {
            Ok((path, warnings)) => {
                report.warnings += warnings;
                report.generated.push(path);
            }
            Err(err) => {
                log::error!("{}: {:#}", name, err);
                report.failed.push((name.clone(), format!("{:#}", err)));
            }
        }
    }

    Ok(report)
}

fn build_page(transpiler: &Transpiler, name: &str, output: &Path) -> Result<(PathBuf, usize)> {
    let page = transpiler
        .transpile_page(name)
        .with_context(|| format!("failed to compile {}", name))?;
    for diagnostic in &page.diagnostics {
        log::warn!("{}: {}", name, diagnostic);
    }

    let stem = Path::new(name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(name);
    let target = output.join(format!("{}.html", stem));
    fs::write(&target, &page.html)
        .with_context(|| format!("failed to write {}", target.display()))?;

    log::info!("Generated {}", target.display());
    Ok((target, page.diagnostics.len()))
}

/// `.cssx` files directly inside `dir`, sorted by name.
fn collect_pages(dir: &Path) -> Result<Vec<String>> {
    let mut pages = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to list {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        let is_page = entry.file_type()?.is_file()
            && path.extension().is_some_and(|ext| ext == DSL_EXTENSION);
        if !is_page {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
            pages.push(name.to_string());
        }
    }
    pages.sort();
    Ok(pages)
}

/// Create the output directory, or clear the files directly inside it.
fn prepare_output_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).with_context(|| format!("failed to create {}", dir.display()))?;
        return Ok(());
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            fs::remove_file(entry.path())
                .with_context(|| format!("failed to remove {}", entry.path().display()))?;
        }
    }
    Ok(())
}

fn copy_public_dir(public: &Path, output: &Path) -> Result<usize> {
    if !public.is_dir() {
        log::info!("No public directory found at {}", public.display());
        return Ok(0);
    }

    let mut copied = 0;
    for entry in fs::read_dir(public)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let target = output.join(entry.file_name());
        fs::copy(entry.path(), &target)
            .with_context(|| format!("failed to copy {}", entry.path().display()))?;
        copied += 1;
    }
    Ok(copied)
}
