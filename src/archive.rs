//! Read-only access to uploaded export archives.
//!
//! The flow only needs two things from an archive: the names of its members
//! and the bytes of one member at a time. Members are addressed by file name;
//! any folder prefix inside the container is ignored.
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("cannot open archive {handle}: {reason}")]
    Unreadable { handle: String, reason: String },
    #[error("member {0} not found")]
    MemberNotFound(String),
    #[error("cannot read member {name}: {reason}")]
    MemberUnreadable { name: String, reason: String },
}

impl ArchiveError {
    pub fn is_missing_member(&self) -> bool {
        matches!(self, ArchiveError::MemberNotFound(_))
    }
}

/// An opened archive.
pub trait MemberSource {
    /// Member file names in container order, folder prefixes stripped.
    fn member_names(&self) -> Vec<String>;

    /// Raw bytes of the first member with file name `name`.
    fn read_member(&self, name: &str) -> Result<Vec<u8>, ArchiveError>;

    /// Member content decoded as UTF-8.
    fn read_text(&self, name: &str) -> Result<String, ArchiveError> {
        let bytes = self.read_member(name)?;
        String::from_utf8(bytes).map_err(|err| ArchiveError::MemberUnreadable {
            name: name.to_string(),
            reason: err.to_string(),
        })
    }
}

/// Turns the host's upload handle into an opened archive.
pub trait ArchiveOpener {
    fn open(&self, handle: &str) -> Result<Box<dyn MemberSource>, ArchiveError>;
}

/// Final path component of a container entry name.
pub fn member_file_name(entry: &str) -> &str {
    entry
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(entry)
}

/// Opens zip files from filesystem paths.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZipOpener;

impl ArchiveOpener for ZipOpener {
    fn open(&self, handle: &str) -> Result<Box<dyn MemberSource>, ArchiveError> {
        Ok(Box::new(ZipMembers::open(Path::new(handle))?))
    }
}

/// A zip file whose entry list has been read once.
///
/// Each member read reopens the container, so reads never share state.
#[derive(Debug, Clone)]
pub struct ZipMembers {
    path: PathBuf,
    entries: Vec<String>,
}

impl ZipMembers {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let unreadable = |reason: String| ArchiveError::Unreadable {
            handle: path.display().to_string(),
            reason,
        };
        let file = File::open(path).map_err(|err| unreadable(err.to_string()))?;
        let archive = zip::ZipArchive::new(file).map_err(|err| unreadable(err.to_string()))?;
        let entries = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .map(str::to_string)
            .collect::<Vec<_>>();
        tracing::debug!(path = %path.display(), entries = entries.len(), "opened zip");
        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    fn resolve(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .map(String::as_str)
            .find(|entry| member_file_name(entry) == name)
    }
}

impl MemberSource for ZipMembers {
    fn member_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|entry| member_file_name(entry).to_string())
            .collect()
    }

    fn read_member(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        let entry = self
            .resolve(name)
            .ok_or_else(|| ArchiveError::MemberNotFound(name.to_string()))?;
        let unreadable = |reason: String| ArchiveError::MemberUnreadable {
            name: name.to_string(),
            reason,
        };
        let file = File::open(&self.path).map_err(|err| unreadable(err.to_string()))?;
        let mut archive = zip::ZipArchive::new(file).map_err(|err| unreadable(err.to_string()))?;
        let mut member = archive
            .by_name(entry)
            .map_err(|err| unreadable(err.to_string()))?;
        let mut bytes = Vec::new();
        member
            .read_to_end(&mut bytes)
            .map_err(|err| unreadable(err.to_string()))?;
        Ok(bytes)
    }
}

/// In-memory archive, for hosts that already hold decoded members.
#[derive(Debug, Clone, Default)]
pub struct MemoryArchive {
    members: Vec<(String, Vec<u8>)>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.members.push((name.into(), bytes.into()));
        self
    }
}

impl MemberSource for MemoryArchive {
    fn member_names(&self) -> Vec<String> {
        self.members
            .iter()
            .map(|(name, _)| member_file_name(name).to_string())
            .collect()
    }

    fn read_member(&self, name: &str) -> Result<Vec<u8>, ArchiveError> {
        self.members
            .iter()
            .find(|(entry, _)| member_file_name(entry) == name)
            .map(|(_, bytes)| bytes.clone())
            .ok_or_else(|| ArchiveError::MemberNotFound(name.to_string()))
    }
}

/// Resolves handles against a fixed set of in-memory archives.
///
/// Unknown handles behave like a corrupt container.
#[derive(Debug, Clone, Default)]
pub struct MemoryOpener {
    archives: BTreeMap<String, MemoryArchive>,
}

impl MemoryOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_archive(mut self, handle: impl Into<String>, archive: MemoryArchive) -> Self {
        self.archives.insert(handle.into(), archive);
        self
    }
}

impl ArchiveOpener for MemoryOpener {
    fn open(&self, handle: &str) -> Result<Box<dyn MemberSource>, ArchiveError> {
        self.archives
            .get(handle)
            .cloned()
            .map(|archive| Box::new(archive) as Box<dyn MemberSource>)
            .ok_or_else(|| ArchiveError::Unreadable {
                handle: handle.to_string(),
                reason: "not a known archive".to_string(),
            })
    }
}
