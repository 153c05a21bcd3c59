//! Writing a generated tree to disk
//!
//! The tree is written into a hidden staging directory next to the
//! destination and renamed into place once every file is on disk. On failure
//! the staging directory is removed, so the destination either holds the
//! complete tree or does not exist.

use super::{FileTree, GenerateError};
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Filesystem operations used by generation and the post-generation steps
pub trait FileSystem: Send + Sync {
    fn exists(&self, path: &Path) -> impl Future<Output = bool> + Send;

    fn create_dir_all(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;

    fn write(&self, path: &Path, contents: &[u8]) -> impl Future<Output = io::Result<()>> + Send;

    fn read_to_string(&self, path: &Path) -> impl Future<Output = io::Result<String>> + Send;

    fn rename(&self, from: &Path, to: &Path) -> impl Future<Output = io::Result<()>> + Send;

    fn remove_dir_all(&self, path: &Path) -> impl Future<Output = io::Result<()>> + Send;
}

/// `FileSystem` backed by `tokio::fs`
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioFs;

impl FileSystem for TokioFs {
    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path).await
    }

    async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        fs::write(path, contents).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        fs::read_to_string(path).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to).await
    }

    async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::remove_dir_all(path).await
    }
}

/// Staging directory used while writing `dest`: `.<name>.stackforge-staging`
/// in the same parent, so the final rename never crosses filesystems
pub fn staging_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "project".to_string());
    dest.with_file_name(format!(".{}.stackforge-staging", name))
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> GenerateError + '_ {
    move |source| GenerateError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Write `tree` to `dest`, which must not exist yet
pub async fn write_tree<F: FileSystem>(
    fs: &F,
    dest: &Path,
    tree: &FileTree,
) -> Result<(), GenerateError> {
    if fs.exists(dest).await {
        return Err(GenerateError::DestinationExists(dest.to_path_buf()));
    }
    let staging = staging_path(dest);
    if fs.exists(&staging).await {
        return Err(GenerateError::StaleStaging(staging));
    }

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs.create_dir_all(parent).await.map_err(io_error(parent))?;
    }

    log::debug!(
        "Writing {} files to {}",
        tree.len(),
        staging.display()
    );
    let written = match write_files(fs, &staging, tree).await {
        Ok(()) => fs.rename(&staging, dest).await.map_err(io_error(dest)),
        Err(err) => Err(err),
    };

    if let Err(err) = written {
        if let Err(cleanup) = fs.remove_dir_all(&staging).await {
            log::warn!(
                "Failed to remove staging directory {}: {}",
                staging.display(),
                cleanup
            );
        }
        return Err(err);
    }

    log::info!("Wrote {} files to {}", tree.len(), dest.display());
    Ok(())
}

async fn write_files<F: FileSystem>(
    fs: &F,
    root: &Path,
    tree: &FileTree,
) -> Result<(), GenerateError> {
    fs.create_dir_all(root).await.map_err(io_error(root))?;

    for file in tree.files() {
        let target = root.join(&file.path);
        if let Some(parent) = target.parent() {
            fs.create_dir_all(parent).await.map_err(io_error(parent))?;
        }
        fs.write(&target, file.content.as_bytes())
            .await
            .map_err(io_error(&target))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::FileKind;

    fn sample_tree() -> FileTree {
        let mut tree = FileTree::new();
        tree.add("package.json", FileKind::Manifest, "{}\n").unwrap();
        tree.add("src/index.ts", FileKind::Source, "export {};\n")
            .unwrap();
        tree.add("src/routes/health.ts", FileKind::Source, "// health\n")
            .unwrap();
        tree
    }

    /// Delegates to `TokioFs` but fails writes of one file
    struct FailingFs {
        fail_on: &'static str,
    }

    impl FileSystem for FailingFs {
        async fn exists(&self, path: &Path) -> bool {
            TokioFs.exists(path).await
        }

        async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
            TokioFs.create_dir_all(path).await
        }

        async fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
            if path.ends_with(self.fail_on) {
                return Err(io::Error::other("disk full"));
            }
            TokioFs.write(path, contents).await
        }

        async fn read_to_string(&self, path: &Path) -> io::Result<String> {
            TokioFs.read_to_string(path).await
        }

        async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
            TokioFs.rename(from, to).await
        }

        async fn remove_dir_all(&self, path: &Path) -> io::Result<()> {
            TokioFs.remove_dir_all(path).await
        }
    }

    #[test]
    fn test_staging_path_is_a_hidden_sibling() {
        assert_eq!(
            staging_path(Path::new("/tmp/work/my-app")),
            PathBuf::from("/tmp/work/.my-app.stackforge-staging")
        );
    }

    #[tokio::test]
    async fn test_write_tree() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("app");

        write_tree(&TokioFs, &dest, &sample_tree()).await.unwrap();

        assert_eq!(
            std::fs::read_to_string(dest.join("src/routes/health.ts")).unwrap(),
            "// health\n"
        );
        assert!(!staging_path(&dest).exists());
    }

    #[tokio::test]
    async fn test_existing_destination_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("app");
        std::fs::create_dir(&dest).unwrap();

        let result = write_tree(&TokioFs, &dest, &sample_tree()).await;
        assert!(matches!(result, Err(GenerateError::DestinationExists(_))));
    }

    #[tokio::test]
    async fn test_stale_staging_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("app");
        std::fs::create_dir(staging_path(&dest)).unwrap();

        let result = write_tree(&TokioFs, &dest, &sample_tree()).await;
        assert!(matches!(result, Err(GenerateError::StaleStaging(_))));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_failed_write_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("app");
        let fs = FailingFs {
            fail_on: "health.ts",
        };

        let result = write_tree(&fs, &dest, &sample_tree()).await;

        match result {
            Err(GenerateError::Io { path, .. }) => assert!(path.ends_with("health.ts")),
            other => panic!("expected an I/O error, got {:?}", other),
        }
        assert!(!dest.exists());
        assert!(!staging_path(&dest).exists());
    }
}
