//! Integration test utilities for reflected-function lowering

use anyhow::{Context, Result, bail};
use rf_driver::{TransformConfig, TransformOutput, Transformer};
use rf_ir::Node;
use rf_ty::DeclaredTypes;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory holding the checked-in test projects
pub fn projects_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("test-projects")
}

/// Transform `source` as `input.ts` with the default configuration
///
/// # Errors
///
/// Returns an error if the source has syntax errors
pub fn transform(types: &DeclaredTypes, source: &str) -> Result<TransformOutput> {
    let transformer = Transformer::new(types, TransformConfig::default())?;
    Ok(transformer.transform(Path::new("input.ts"), source)?)
}

/// The IR of the first reflected function in `source`
///
/// # Errors
///
/// Returns an error if the source has syntax errors or reflects nothing
pub fn lower_first(types: &DeclaredTypes, source: &str) -> Result<Node> {
    let output = transform(types, source)?;
    match output.rewrites.into_iter().next() {
        Some(rewrite) => Ok(rewrite.ir),
        None => bail!("no reflected function in `{source}`"),
    }
}

/// A project under `test-projects/`
///
/// Each project has a `types.toml` with its type declarations, an optional
/// `refract.toml` transform configuration and TypeScript sources under `src/`.
pub struct TestProject {
    /// Project root
    pub root: PathBuf,
    /// Declarations the sources are checked against
    pub types: DeclaredTypes,
    /// Transform configuration
    pub config: TransformConfig,
}

impl TestProject {
    /// Load a checked-in project by directory name
    ///
    /// # Errors
    ///
    /// Returns an error if the project files cannot be read or parsed
    pub fn load(name: &str) -> Result<Self> {
        Self::from_dir(projects_dir().join(name))
    }

    /// Load a project from any directory
    ///
    /// # Errors
    ///
    /// Returns an error if the project files cannot be read or parsed
    pub fn from_dir(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let types = DeclaredTypes::load(&root.join("types.toml"))
            .with_context(|| format!("Failed to load types for {}", root.display()))?;

        let config_path = root.join("refract.toml");
        let config = if config_path.is_file() {
            TransformConfig::from_file(&config_path)?
        } else {
            TransformConfig::default()
        };

        Ok(Self {
            root,
            types,
            config,
        })
    }

    /// Source files under `src/`, relative to the project root, sorted
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be walked
    pub fn sources(&self) -> Result<Vec<PathBuf>> {
        let mut sources = Vec::new();
        collect_sources(&self.root, &self.root.join("src"), &mut sources)?;
        sources.sort();
        Ok(sources)
    }

    /// Transform every source of the project
    ///
    /// # Errors
    ///
    /// Returns an error if any source cannot be read or has syntax errors
    pub fn transform_all(&self) -> Result<Vec<(PathBuf, TransformOutput)>> {
        let transformer = Transformer::new(&self.types, self.config.clone())?;
        self.sources()?
            .into_iter()
            .map(|relative| -> Result<(PathBuf, TransformOutput)> {
                let source = fs::read_to_string(self.root.join(&relative))?;
                let output = transformer
                    .transform(&relative, &source)
                    .with_context(|| format!("Failed to transform {}", relative.display()))?;
                log::debug!("{}: {} rewrite(s)", relative.display(), output.rewrites.len());
                Ok((relative, output))
            })
            .collect()
    }

    /// Transform one source, given relative to the project root
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or has syntax errors
    pub fn transform(&self, relative: &str) -> Result<TransformOutput> {
        let transformer = Transformer::new(&self.types, self.config.clone())?;
        let source = fs::read_to_string(self.root.join(relative))?;
        Ok(transformer.transform(Path::new(relative), &source)?)
    }
}

fn collect_sources(base: &Path, dir: &Path, sources: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_sources(base, &path, sources)?;
        } else if path.extension().is_some_and(|ext| ext == "ts") {
            sources.push(path.strip_prefix(base).unwrap_or(&path).to_path_buf());
        }
    }
    Ok(())
}
