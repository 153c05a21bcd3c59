//! In-memory file tree produced by generation

use super::GenerateError;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    Manifest,
    Source,
    Config,
    Documentation,
    EnvironmentTemplate,
}

impl FileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Manifest => "manifest",
            FileKind::Source => "source",
            FileKind::Config => "config",
            FileKind::Documentation => "documentation",
            FileKind::EnvironmentTemplate => "environment-template",
        }
    }
}

/// One file of the generated project
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Relative, '/'-separated
    pub path: String,
    pub content: String,
    pub kind: FileKind,
}

/// Path-unique set of generated files, iterated in path order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTree {
    files: BTreeMap<String, GeneratedFile>,
}

impl FileTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file; a second file at the same path is an error
    pub fn add(
        &mut self,
        path: impl Into<String>,
        kind: FileKind,
        content: impl Into<String>,
    ) -> Result<(), GenerateError> {
        let path = path.into();
        if self.files.contains_key(&path) {
            return Err(GenerateError::DuplicatePath(path));
        }
        let file = GeneratedFile {
            path: path.clone(),
            content: content.into(),
            kind,
        };
        self.files.insert(path, file);
        Ok(())
    }

    pub fn get(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn files(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.values()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Move every file of `other` under `prefix/`
    pub fn merge_under(&mut self, prefix: &str, other: FileTree) -> Result<(), GenerateError> {
        for (path, file) in other.files {
            self.add(format!("{}/{}", prefix, path), file.kind, file.content)?;
        }
        Ok(())
    }
}

/// Line-oriented text builder used by the renderers
#[derive(Debug, Default)]
pub(crate) struct Code {
    buf: String,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        self.buf.push_str(text.as_ref());
        self.buf.push('\n');
        self
    }

    pub fn line_if(&mut self, condition: bool, text: impl AsRef<str>) -> &mut Self {
        if condition {
            self.line(text);
        }
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Append a multi-line chunk; one leading newline is dropped so raw
    /// strings can start on their own line
    pub fn block(&mut self, text: &str) -> &mut Self {
        let text = text.strip_prefix('\n').unwrap_or(text);
        self.buf.push_str(text);
        if !text.ends_with('\n') {
            self.buf.push('\n');
        }
        self
    }

    pub fn block_if(&mut self, condition: bool, text: &str) -> &mut Self {
        if condition {
            self.block(text);
        }
        self
    }

    pub fn finish(&mut self) -> String {
        std::mem::take(&mut self.buf)
    }
}
