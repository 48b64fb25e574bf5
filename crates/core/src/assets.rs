//! Persistence of segmented subplots as standalone SVG files.
//!
//! Files are named by chart ordinal (`<dir>/<n>.svg`). A reading-order
//! correction renames the whole set in one pass: the renamed set is built
//! in a scratch directory which then replaces the original.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;

use crate::chart::{Chart, Rename};
use crate::error::Result;
use crate::graphics::write_svg;

/// File name of a chart's subplot.
pub fn subplot_file_name(ordinal: usize) -> String {
    format!("{ordinal}.svg")
}

/// Writes every chart to `<dir>/<ordinal>.svg`, creating `dir` if needed.
pub fn save_subplots(dir: &Path, charts: &[Chart]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(charts.len());
    for chart in charts {
        let primitives = chart.primitives();
        let svg = write_svg(&primitives)?;
        let path = dir.join(subplot_file_name(chart.ordinal));
        fs::write(&path, svg)?;
        written.push(path);
    }
    tracing::debug!(dir = %dir.display(), charts = written.len(), "saved subplots");
    Ok(written)
}

fn scratch_dir(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = dir.file_name().unwrap_or_default().to_os_string();
    name.push(suffix);
    dir.with_file_name(name)
}

/// Applies `renames` to the subplot files in `dir`.
///
/// Every file is copied under its new name into a sibling scratch
/// directory; files not named in `renames` keep their name. The scratch
/// directory then takes the place of `dir`, so readers never see a mix of
/// old and new numbering.
pub fn apply_renames(dir: &Path, renames: &[Rename]) -> Result<()> {
    if renames.is_empty() {
        return Ok(());
    }
    let targets: FxHashMap<String, String> = renames
        .iter()
        .map(|r| (subplot_file_name(r.from), subplot_file_name(r.to)))
        .collect();

    let staging = scratch_dir(dir, ".reordered");
    let retired = scratch_dir(dir, ".previous");
    for stale in [&staging, &retired] {
        if stale.exists() {
            fs::remove_dir_all(stale)?;
        }
    }
    fs::create_dir(&staging)?;

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let target = targets.get(&name).unwrap_or(&name);
        fs::copy(entry.path(), staging.join(target))?;
    }

    fs::rename(dir, &retired)?;
    fs::rename(&staging, dir)?;
    fs::remove_dir_all(&retired)?;
    tracing::debug!(dir = %dir.display(), renamed = renames.len(), "renamed subplots");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{GraphicElement, Role};
    use crate::graphics::Path as GraphicPath;

    fn chart(ordinal: usize, y: f64) -> Chart {
        let axis = GraphicElement::new(Role::AxisLine, GraphicPath::line((0.0, y), (10.0, y)), None);
        Chart::new(ordinal, vec![axis])
    }

    #[test]
    fn test_save_and_rename() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("svg");
        let written = save_subplots(&dir, &[chart(1, 1.0), chart(2, 2.0)]).unwrap();
        assert_eq!(written.len(), 2);
        let one = fs::read_to_string(dir.join("1.svg")).unwrap();
        let two = fs::read_to_string(dir.join("2.svg")).unwrap();

        apply_renames(&dir, &[Rename { from: 1, to: 2 }, Rename { from: 2, to: 1 }]).unwrap();
        assert_eq!(fs::read_to_string(dir.join("1.svg")).unwrap(), two);
        assert_eq!(fs::read_to_string(dir.join("2.svg")).unwrap(), one);
        assert!(!root.path().join("svg.reordered").exists());
        assert!(!root.path().join("svg.previous").exists());
    }
}
