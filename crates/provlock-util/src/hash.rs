use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::Path;
use walkdir::WalkDir;

/// Prefix of a package-contents digest.
pub const H1_PREFIX: &str = "h1:";

/// Compute the SHA-256 hash of a file, returning the hex-encoded digest.
///
/// Streams the file content to minimize memory usage.
///
/// # Errors
/// Returns an error if the file cannot be opened or read.
pub fn sha256_file(path: &Path) -> io::Result<String> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];

    loop {
        let bytes_read = reader.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Compute the `h1:` digest of an unpacked package directory.
///
/// Every regular file below `dir` contributes one `"<sha256 hex>  <path>\n"`
/// line, where `<path>` is slash-separated and relative to `dir`. Lines are
/// ordered by path; the digest is the base64 SHA-256 of their concatenation.
///
/// # Errors
/// Returns an error if the directory cannot be walked, a file cannot be read,
/// an entry is not a regular file, or a path is not UTF-8 or contains a newline.
pub fn hash1_dir(dir: &Path) -> io::Result<String> {
    let mut files = Vec::new();

    for entry in WalkDir::new(dir).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        let file_type = entry.file_type();
        if file_type.is_dir() {
            continue;
        }
        if !file_type.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("{} is not a regular file", entry.path().display()),
            ));
        }

        let rel = entry
            .path()
            .strip_prefix(dir)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let name = rel
            .components()
            .map(|c| {
                c.as_os_str().to_str().ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("file name is not valid UTF-8: {}", rel.display()),
                    )
                })
            })
            .collect::<io::Result<Vec<_>>>()?
            .join("/");
        files.push((name, entry.into_path()));
    }

    files.sort_by(|a, b| a.0.cmp(&b.0));

    let mut summary = String::new();
    for (name, path) in &files {
        if name.contains('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file name contains a newline: {name:?}"),
            ));
        }
        summary.push_str(&sha256_file(path)?);
        summary.push_str("  ");
        summary.push_str(name);
        summary.push('\n');
    }

    let digest = Sha256::digest(summary.as_bytes());
    Ok(format!("{H1_PREFIX}{}", STANDARD.encode(digest)))
}
