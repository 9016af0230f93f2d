//! Ligand archive extraction.

use flate2::read::GzDecoder;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::debug;
use vinyx_common::error::{Result, VinyxError};

/// Unpack a `.tar.gz` archive into `dest`, creating it if needed.
pub fn unpack_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).map_err(|e| VinyxError::io(dest, e))?;
    let file = File::open(archive).map_err(|e| VinyxError::io(archive, e))?;
    tar::Archive::new(GzDecoder::new(file))
        .unpack(dest)
        .map_err(|e| VinyxError::io(archive, e))?;
    debug!("Unpacked {:?} into {:?}", archive, dest);
    Ok(())
}

/// [`unpack_tar_gz`] on the blocking thread pool.
pub async fn extract_tar_gz(archive: &Path, dest: &Path) -> Result<()> {
    let (archive, dest) = (archive.to_path_buf(), dest.to_path_buf());
    let task_archive = archive.clone();
    tokio::task::spawn_blocking(move || unpack_tar_gz(&task_archive, &dest))
        .await
        .map_err(|e| VinyxError::io(&archive, std::io::Error::other(e)))?
}

/// Every `.pdbqt` file under `dir`, sorted by path.
///
/// Symlinked directories are not descended into.
pub fn find_ligands(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        for entry in fs::read_dir(&current).map_err(|e| VinyxError::io(&current, e))? {
            let entry = entry.map_err(|e| VinyxError::io(&current, e))?;
            let path = entry.path();
            let file_type = entry.file_type().map_err(|e| VinyxError::io(&path, e))?;
            if file_type.is_dir() {
                pending.push(path);
            } else if path.extension().is_some_and(|ext| ext == "pdbqt") {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use tempfile::tempdir;

    fn build_archive(path: &Path, entries: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, body) in entries {
            let mut header = tar::Header::new_gnu();
            header.set_size(body.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, body.as_bytes()).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[tokio::test]
    async fn test_extract_and_find_ligands() {
        let dir = tempdir().unwrap();
        let archive = dir.path().join("xaaa.xaa.tar.gz");
        build_archive(
            &archive,
            &[
                ("xaaa/ZINC02.pdbqt", "ROOT\n"),
                ("xaaa/ZINC01.pdbqt", "ROOT\n"),
                ("xaaa/readme.txt", "not a ligand\n"),
                ("xaaa/sub/ZINC03.pdbqt", "ROOT\n"),
            ],
        );

        let dest = dir.path().join("ligands");
        extract_tar_gz(&archive, &dest).await.unwrap();

        let ligands = find_ligands(&dest).unwrap();
        assert_eq!(
            ligands,
            vec![
                dest.join("xaaa/ZINC01.pdbqt"),
                dest.join("xaaa/ZINC02.pdbqt"),
                dest.join("xaaa/sub/ZINC03.pdbqt"),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_find_ligands_skips_directory_symlinks() {
        let dir = tempdir().unwrap();
        let ligands = dir.path().join("ligands");
        fs::create_dir_all(ligands.join("xaaa")).unwrap();
        fs::write(ligands.join("xaaa/ZINC01.pdbqt"), "ROOT\n").unwrap();
        std::os::unix::fs::symlink(&ligands, ligands.join("xaaa/loop")).unwrap();

        assert_eq!(find_ligands(&ligands).unwrap(), vec![ligands.join("xaaa/ZINC01.pdbqt")]);
    }

    #[tokio::test]
    async fn test_missing_archive_is_io_error() {
        let dir = tempdir().unwrap();
        let err = extract_tar_gz(&dir.path().join("missing.tar.gz"), &dir.path().join("out"))
            .await
            .unwrap_err();
        assert!(matches!(err, VinyxError::Io { .. }));
    }
}
