use std::io::Write;
use std::path::Path;

use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use crate::error::{Error, Result};

/// Zip the given files, flat, under their file names. Files that do not
/// exist are skipped. Returns the number of files archived.
pub fn write_archive(files: &[&Path], out: &Path) -> Result<usize> {
    if let Some(dir) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;
    }
    let file = std::fs::File::create(out).map_err(|e| Error::io(out, e))?;
    let mut zip_writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    let mut count = 0;
    for path in files {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "skipping missing file");
                continue;
            }
            Err(e) => return Err(Error::io(*path, e)),
        };
        zip_writer.start_file(name, options)?;
        zip_writer.write_all(&bytes).map_err(|e| Error::io(out, e))?;
        count += 1;
    }

    zip_writer.finish()?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn archives_existing_files_and_skips_missing_ones() {
        let dir = tempfile::tempdir().unwrap();
        let tasks = dir.path().join("tasks.json");
        let people = dir.path().join("people.json");
        std::fs::write(&tasks, "[]").unwrap();
        let out = dir.path().join("out").join("backup.zip");

        let count = write_archive(&[tasks.as_path(), people.as_path()], &out).unwrap();
        assert_eq!(count, 1);

        let mut archive = zip::ZipArchive::new(std::fs::File::open(&out).unwrap()).unwrap();
        assert_eq!(archive.len(), 1);
        let mut entry = archive.by_name("tasks.json").unwrap();
        let mut content = String::new();
        entry.read_to_string(&mut content).unwrap();
        assert_eq!(content, "[]");
    }
}
