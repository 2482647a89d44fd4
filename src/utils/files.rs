use std::fs;
use std::io;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Lists regular files directly inside `path`. Subdirectories are not entered.
pub fn find_files<F: AsRef<Path> + ?Sized>(path: &F) -> io::Result<Vec<PathBuf>> {
    let mut result = Vec::new();
    for entry in fs::read_dir(path.as_ref())? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            result.push(path);
        }
    }
    Ok(result)
}

/// Reads at most `len` bytes from the start of the file.
///
/// The flag is true when the whole file was read.
pub fn read_head<F: AsRef<Path> + ?Sized>(f: &F, len: usize) -> io::Result<(Vec<u8>, bool)> {
    let file = fs::File::open(f)?;
    let mut content = Vec::with_capacity(len);
    // One extra byte tells a file of exactly `len` bytes apart from a longer one.
    file.take(len as u64 + 1).read_to_end(&mut content)?;
    let complete = content.len() <= len;
    content.truncate(len);
    Ok((content, complete))
}

/// Writes `data` to `f`. A partially written file is removed on failure.
pub fn write_file<F: AsRef<Path> + ?Sized>(f: &F, data: &[u8]) -> io::Result<()> {
    let path = f.as_ref();
    let re = fs::File::create(path).and_then(|mut file| {
        file.write_all(data)?;
        file.flush()
    });
    if re.is_err() {
        let _ = fs::remove_file(path);
    }
    re
}

pub fn make_sure_dir_exists<F: AsRef<Path> + ?Sized>(f: &F) -> io::Result<()> {
    let path = f.as_ref();
    if path.exists() {
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{} exists and is not a directory", path.display()),
            ));
        }
        return Ok(());
    }
    fs::create_dir_all(path)
}

#[test]
fn test_read_head() {
    let dir = tempfile::tempdir().unwrap();
    let small = dir.path().join("small.txt");
    fs::write(&small, b"hello").unwrap();
    assert_eq!(read_head(&small, 4096).unwrap(), (b"hello".to_vec(), true));
    let exact = dir.path().join("exact.txt");
    fs::write(&exact, vec![b'a'; 16]).unwrap();
    assert_eq!(read_head(&exact, 16).unwrap(), (vec![b'a'; 16], true));
    let large = dir.path().join("large.txt");
    fs::write(&large, vec![b'a'; 5000]).unwrap();
    let (head, complete) = read_head(&large, 4096).unwrap();
    assert_eq!(head.len(), 4096);
    assert!(!complete);
}

#[test]
fn test_find_files_is_not_recursive() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), b"a").unwrap();
    fs::create_dir(dir.path().join("sub")).unwrap();
    fs::write(dir.path().join("sub").join("b.txt"), b"b").unwrap();
    let files = find_files(dir.path()).unwrap();
    assert_eq!(files, vec![dir.path().join("a.txt")]);
}

#[test]
fn test_make_sure_dir_exists() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("processed");
    make_sure_dir_exists(&out).unwrap();
    make_sure_dir_exists(&out).unwrap();
    assert!(out.is_dir());
    let file = dir.path().join("file");
    fs::write(&file, b"x").unwrap();
    assert!(make_sure_dir_exists(&file).is_err());
}
