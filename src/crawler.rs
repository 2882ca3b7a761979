use std::path::Path;

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Produces the code text an analysis provider will review. The dispatcher
/// depends only on this seam, not on how the text was gathered.
pub trait CodeCrawler: Send + Sync {
    fn crawl(&self, path: &Path) -> Result<String>;
}

const SOURCE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "ts", "jsx", "tsx", "go", "java", "c", "h", "cpp", "hpp", "cs", "rb", "php",
    "sh", "sql", "html", "css", "yaml", "yml", "toml", "json",
];

const SKIPPED_DIRS: &[&str] = &["target", "node_modules", "dist", "build", "vendor", "__pycache__"];

/// Walks a file or directory and concatenates source-file contents, each
/// prefixed with a path header. Total collected bytes are capped to keep the
/// provider prompt bounded.
pub struct FsCrawler {
    max_bytes: usize,
}

impl Default for FsCrawler {
    fn default() -> Self {
        Self {
            max_bytes: 256 * 1024,
        }
    }
}

impl FsCrawler {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    fn is_source_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| SOURCE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
            .unwrap_or(false)
    }

    fn is_skipped(entry: &walkdir::DirEntry) -> bool {
        entry
            .file_name()
            .to_str()
            .map(|name| {
                name.starts_with('.')
                    || (entry.file_type().is_dir() && SKIPPED_DIRS.contains(&name))
            })
            .unwrap_or(false)
    }

    /// Cuts `collected` down to the byte cap on a char boundary and appends
    /// the truncation marker.
    fn truncate_collected(&self, collected: &mut String) {
        let mut cut = self.max_bytes;
        while !collected.is_char_boundary(cut) {
            cut -= 1;
        }
        collected.truncate(cut);
        tracing::warn!(
            "Collected code truncated at {} bytes to bound the prompt",
            self.max_bytes
        );
        collected.push_str("\n[truncated]\n");
    }
}

impl CodeCrawler for FsCrawler {
    fn crawl(&self, path: &Path) -> Result<String> {
        tracing::info!("Crawling code from {}", path.display());

        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no such path: {}", path.display()),
            )));
        }

        if path.is_file() {
            let mut contents = std::fs::read_to_string(path)?;
            if contents.len() > self.max_bytes {
                self.truncate_collected(&mut contents);
            }
            return Ok(contents);
        }

        let mut collected = String::new();

        for entry in WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !Self::is_skipped(e))
        {
            let entry = entry.map_err(|e| {
                Error::Io(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
            })?;
            if !entry.file_type().is_file() || !Self::is_source_file(entry.path()) {
                continue;
            }

            // Skip files that are not valid UTF-8 rather than failing the
            // whole crawl.
            let contents = match std::fs::read_to_string(entry.path()) {
                Ok(contents) => contents,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    tracing::debug!("Skipping non-text file {}", entry.path().display());
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
            collected.push_str(&format!("// File: {}\n", relative.display()));
            collected.push_str(&contents);
            collected.push_str("\n\n");

            if collected.len() >= self.max_bytes {
                self.truncate_collected(&mut collected);
                break;
            }
        }

        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crawls_single_file_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("main.py");
        std::fs::write(&file, "print(1)\n").unwrap();

        let code = FsCrawler::default().crawl(&file).unwrap();
        assert_eq!(code, "print(1)\n");
    }

    #[test]
    fn crawls_directory_with_file_headers() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "fn a() {}\n").unwrap();
        std::fs::write(dir.path().join("b.rs"), "fn b() {}\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "not source\n").unwrap();

        let code = FsCrawler::default().crawl(dir.path()).unwrap();
        assert!(code.contains("// File: a.rs"));
        assert!(code.contains("fn b() {}"));
        assert!(!code.contains("not source"));
    }

    #[test]
    fn skips_hidden_and_build_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("target")).unwrap();
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join("target").join("gen.rs"), "fn gen() {}\n").unwrap();
        std::fs::write(dir.path().join(".git").join("hook.sh"), "echo hi\n").unwrap();
        std::fs::write(dir.path().join("lib.rs"), "fn lib() {}\n").unwrap();

        let code = FsCrawler::default().crawl(dir.path()).unwrap();
        assert!(code.contains("fn lib()"));
        assert!(!code.contains("fn gen()"));
        assert!(!code.contains("echo hi"));
    }

    #[test]
    fn caps_collected_bytes() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("big.rs"), "x".repeat(4096)).unwrap();

        let code = FsCrawler::new(1024).crawl(dir.path()).unwrap();
        assert!(code.len() <= 1024 + "\n[truncated]\n".len());
        assert!(code.ends_with("[truncated]\n"));
    }

    #[test]
    fn caps_single_file_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("big.rs");
        std::fs::write(&file, "y".repeat(64 * 1024)).unwrap();

        let code = FsCrawler::new(1024).crawl(&file).unwrap();
        assert!(code.len() <= 1024 + "\n[truncated]\n".len());
        assert!(code.ends_with("[truncated]\n"));
    }

    #[test]
    fn single_file_under_cap_is_returned_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("small.rs");
        std::fs::write(&file, "fn main() {}\n").unwrap();

        let code = FsCrawler::new(1024).crawl(&file).unwrap();
        assert_eq!(code, "fn main() {}\n");
    }

    #[test]
    fn cap_lands_on_a_char_boundary() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("unicode.rs");
        // Three-byte code points guarantee the cap falls mid-character.
        std::fs::write(&file, "编".repeat(2048)).unwrap();

        let code = FsCrawler::new(1024).crawl(&file).unwrap();
        assert!(code.ends_with("[truncated]\n"));
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = FsCrawler::default().crawl(&dir.path().join("nope"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
