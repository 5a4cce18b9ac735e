//! Directory helpers used for cache, stage and scratch maintenance

use std::fs;
use std::io;
use std::path::Path;

/// Make `dir` an empty directory, creating it if needed
pub fn empty_dir(dir: &Path) -> io::Result<()> {
    remove_if_exists(dir)?;
    fs::create_dir_all(dir)
}

/// Remove a file or directory tree; a missing path is not an error
pub fn remove_if_exists(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(path),
        Ok(_) => fs::remove_file(path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Recursively copy the contents of `src` into `dst`
///
/// `dst` is created if missing; existing files with the same name are overwritten.
pub fn copy_dir_all(src: &Path, dst: &Path) -> io::Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let from = entry.path();
        let to = dst.join(entry.file_name());
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            copy_dir_all(&from, &to)?;
        } else if file_type.is_symlink() {
            copy_symlink(&from, &to)?;
        } else {
            fs::copy(&from, &to)?;
        }
    }

    Ok(())
}

/// Replace `dst` wholesale with a copy of `src`
pub fn replace_dir(src: &Path, dst: &Path) -> io::Result<()> {
    empty_dir(dst)?;
    copy_dir_all(src, dst)
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    let target = fs::read_link(from)?;
    remove_if_exists(to)?;
    std::os::unix::fs::symlink(target, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    if from.is_dir() {
        copy_dir_all(from, to)
    } else {
        fs::copy(from, to).map(|_| ())
    }
}
