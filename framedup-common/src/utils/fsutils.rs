use std::{
    fs, io,
    path::{Path, PathBuf},
};

/// Delete the file at path, where an already missing file is a no-op, not an
/// error. Keeps interrupted runs re-invocable.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

/// Create the directory and its parents, existing contents are left alone.
pub fn ensure_dir(dir: impl AsRef<Path>) -> io::Result<()> {
    fs::create_dir_all(dir)
}

/// Collects all files in the given directory, does not walk it recursively.
pub fn all_files<R>(dir: impl AsRef<Path>) -> io::Result<R>
where
    R: FromIterator<PathBuf>,
{
    fs::read_dir(dir)?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect()
}

/// Try to read the file, return None if it doesn't exist
pub fn read_optional_file(path: impl AsRef<Path>) -> io::Result<Option<String>> {
    match fs::read_to_string(path) {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e),
        Ok(s) => Ok(Some(s)),
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn removing_a_missing_file_is_fine() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.png");
        assert!(remove_file_if_exists(&path).is_ok());

        fs::write(&path, b"hello").unwrap();
        assert!(remove_file_if_exists(&path).is_ok());
        assert!(!path.exists());
        assert!(remove_file_if_exists(&path).is_ok());
    }

    #[test]
    fn missing_optional_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.rc");
        assert_eq!(None, read_optional_file(&path).unwrap());

        fs::write(&path, "--mode 2").unwrap();
        assert_eq!(
            Some("--mode 2".to_string()),
            read_optional_file(&path).unwrap()
        );
    }
}
