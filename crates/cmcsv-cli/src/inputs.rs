//! Input discovery and post-run housekeeping on the file system.

use std::path::{Path, PathBuf};

use anyhow::Context;

/// Files directly inside `dir` whose extension matches `extension`
/// (case-insensitive), in sorted path order.
pub(crate) fn list_input_files(dir: &Path, extension: &str) -> anyhow::Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read input directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let matches = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Creates every directory in `dirs` (and parents) if missing.
pub(crate) fn ensure_dirs(dirs: &[&Path]) -> anyhow::Result<()> {
    for dir in dirs {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create directory {}", dir.display()))?;
    }
    Ok(())
}

/// Moves each of `files` into `dest_dir`, keeping its file name. Returns the
/// number moved; a file that cannot be moved is logged and left in place.
pub(crate) fn move_to_completed(files: &[PathBuf], dest_dir: &Path) -> usize {
    let mut moved = 0;
    for file in files {
        let Some(name) = file.file_name() else {
            continue;
        };
        let target = dest_dir.join(name);
        match std::fs::rename(file, &target) {
            Ok(()) => moved += 1,
            Err(e) => tracing::warn!(
                file = %file.display(),
                target = %target.display(),
                error = %e,
                "failed to move processed input"
            ),
        }
    }
    moved
}
