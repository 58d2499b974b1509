use std::fs::{File, OpenOptions};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const OUTPUT_SUFFIX: &str = "_watermarked";

/// `photo.jpg` becomes `photo_watermarked`.
pub fn output_stem(image_path: &Path) -> String {
    let stem = image_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{}{}", stem, OUTPUT_SUFFIX)
}

/// File name for the `attempt`-th try: `stem.ext`, then `stem(1).ext`, ...
pub fn candidate_name(stem: &str, attempt: u32, extension: &str) -> String {
    if attempt == 0 {
        format!("{}.{}", stem, extension)
    } else {
        format!("{}({}).{}", stem, attempt, extension)
    }
}

/// Create the first free `stem[(n)].ext` in `output_dir` and hand back the
/// open file with its path.
///
/// Each attempt uses `create_new`, so the existence check and the claim are
/// one filesystem operation and an existing file is never overwritten.
pub fn create_output_file(
    output_dir: &Path,
    stem: &str,
    extension: &str,
) -> io::Result<(PathBuf, File)> {
    let mut attempt = 0u32;
    loop {
        let path = output_dir.join(candidate_name(stem, attempt, extension));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                debug!("Output {:?} already exists, trying next name", path);
                attempt = attempt.checked_add(1).ok_or_else(|| {
                    io::Error::other(format!("no free output name for {}", stem))
                })?;
            }
            Err(e) => return Err(e),
        }
    }
}
