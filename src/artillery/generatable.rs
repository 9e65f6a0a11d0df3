//! Write generated documents to disk.

use crate::error::Result;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// A document that can be rendered as YAML.
pub trait YamlDocument {
    fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error>;
}

impl<T: Serialize> YamlDocument for T {
    fn to_yaml(&self) -> std::result::Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// A document paired with the file it should be written to.
pub struct Generatable {
    pub path: PathBuf,
    pub document: Box<dyn YamlDocument>,
}

impl Generatable {
    pub fn new(path: impl Into<PathBuf>, document: impl YamlDocument + 'static) -> Self {
        Self {
            path: path.into(),
            document: Box::new(document),
        }
    }
}

pub struct Generatables(Vec<Generatable>);

impl Generatables {
    /// Render every document, then write them all. Returns a summary of the
    /// written files. Nothing is written if any document fails to render.
    pub fn generate(&self) -> Result<String> {
        let mut rendered = Vec::with_capacity(self.0.len());
        for generatable in &self.0 {
            rendered.push((&generatable.path, generatable.document.to_yaml()?));
        }

        let mut lines = Vec::with_capacity(rendered.len());
        for (path, yaml) in rendered {
            fs::write(path, yaml)?;
            log::debug!("Wrote {}", path.display());
            lines.push(format!("{} generated", path.display()));
        }

        Ok(lines.join("\n"))
    }
}

impl FromIterator<Generatable> for Generatables {
    fn from_iter<I: IntoIterator<Item = Generatable>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Resolve the output directory and make sure it exists.
///
/// Without `out`, `<working_dir>/<default_dir>` is used. A relative `out` is
/// taken relative to `working_dir`.
pub fn mkdir_all_target_or_default(
    working_dir: &Path,
    out: Option<&Path>,
    default_dir: &str,
) -> Result<PathBuf> {
    let target = match out {
        Some(out) if out.is_absolute() => out.to_path_buf(),
        Some(out) => working_dir.join(out),
        None => working_dir.join(default_dir),
    };
    fs::create_dir_all(&target)?;
    Ok(target)
}

/// Copy `file` into `target_dir`, keeping its file name.
pub fn copy_file_to(target_dir: &Path, file: &Path) -> Result<PathBuf> {
    let file_name = file.file_name().ok_or_else(|| {
        crate::error::KubeArtilleryError::Validation(format!(
            "{} is not a file path",
            file.display()
        ))
    })?;
    let destination = target_dir.join(file_name);

    // Copying a file onto itself truncates it.
    let source = fs::canonicalize(file)?;
    if fs::canonicalize(&destination).ok() != Some(source) {
        fs::copy(file, &destination)?;
    }
    Ok(destination)
}
