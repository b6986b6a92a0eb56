use std::collections::{BTreeMap, HashMap};
use std::io::{self, Read};

use chrono::{DateTime, Local};
use thiserror::Error;
use tracing::{trace, warn};

use crate::path;

/// Index of a node in the filesystem arena.
pub type NodeId = usize;

/// Mode bit set on directories, mirroring `S_IFDIR`.
pub const MODE_DIR: u32 = 0o040000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("{op} {path}: file does not exist")]
    NotExist { op: &'static str, path: String },
    #[error("{op} {path}: invalid argument")]
    Invalid { op: &'static str, path: String },
    #[error("{op} {path}: permission denied")]
    Permission { op: &'static str, path: String },
}

const FILE_PERM: u32 = 0o644; // rw-r--r--
const DIR_PERM: u32 = 0o755; // rwxr-xr-x

/// Type bit plus permission bits. Every file and every directory gets the
/// same fixed permissions; nothing here is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMode(u32);

impl FileMode {
    fn file() -> Self {
        FileMode(FILE_PERM)
    }
    fn dir() -> Self {
        FileMode(MODE_DIR | DIR_PERM)
    }
    pub fn is_dir(&self) -> bool {
        self.0 & MODE_DIR != 0
    }
    /// Permission bits only.
    pub fn perm(&self) -> u32 {
        self.0 & 0o777
    }
    pub fn bits(&self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone)]
pub enum VfsNode {
    File {
        name: String,
        content: Vec<u8>,
        mtime: DateTime<Local>,
    },
    Directory {
        name: String,
        children: BTreeMap<String, NodeId>,
        mtime: DateTime<Local>,
    },
}

impl VfsNode {
    fn file(name: &str, content: Vec<u8>) -> Self {
        VfsNode::File {
            name: name.to_string(),
            content,
            mtime: Local::now(),
        }
    }

    fn directory(name: &str) -> Self {
        VfsNode::Directory {
            name: name.to_string(),
            children: BTreeMap::new(),
            mtime: Local::now(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            VfsNode::File { name, .. } | VfsNode::Directory { name, .. } => name,
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, VfsNode::Directory { .. })
    }

    pub fn metadata(&self) -> Metadata {
        match self {
            VfsNode::File { name, content, mtime } => Metadata {
                name: name.clone(),
                size: content.len() as u64,
                is_dir: false,
                modified: *mtime,
                mode: FileMode::file(),
            },
            VfsNode::Directory { name, mtime, .. } => Metadata {
                name: name.clone(),
                size: 0,
                is_dir: true,
                modified: *mtime,
                mode: FileMode::dir(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    pub name: String,
    /// Content length in bytes, 0 for directories.
    pub size: u64,
    pub is_dir: bool,
    pub modified: DateTime<Local>,
    pub mode: FileMode,
}

/// One row of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub is_dir: bool,
}

/// In-memory tree addressed by normalized path.
///
/// Nodes live in an arena. `index` maps every normalized path to its node,
/// and each directory keeps its own `children` for listings. A node only
/// shows up in its parent's listing if the parent directory already existed
/// when the node was added; it stays reachable by path either way.
#[derive(Debug, Clone)]
pub struct VirtualFileSystem {
    nodes: Vec<VfsNode>,
    index: HashMap<String, NodeId>,
}

impl Default for VirtualFileSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFileSystem {
    /// Empty filesystem holding just the root directory.
    pub fn new() -> Self {
        let mut index = HashMap::new();
        index.insert(String::new(), 0);
        Self {
            nodes: vec![VfsNode::directory(".")],
            index,
        }
    }

    /// Number of nodes, root included, so never zero.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// mkdir without -p. Existing directories are left alone; missing
    /// ancestors are not created.
    pub fn add_dir(&mut self, path: &str) {
        let path = path::clean(path);
        if let Some(&id) = self.index.get(&path) {
            if self.nodes[id].is_dir() {
                return;
            }
            let (_, name) = path::split(&path);
            self.nodes[id] = VfsNode::directory(name);
            self.link(&path, id);
            return;
        }

        let (_, name) = path::split(&path);
        self.insert(path.clone(), VfsNode::directory(name));
    }

    /// Create or overwrite a file. The root can't be a file.
    pub fn add_file(&mut self, path: &str, content: impl Into<Vec<u8>>) -> Result<(), FsError> {
        let normalized = path::clean(path);
        if normalized.is_empty() {
            return Err(FsError::Invalid {
                op: "add",
                path: path.to_string(),
            });
        }

        let (_, name) = path::split(&normalized);
        let node = VfsNode::file(name, content.into());
        match self.index.get(&normalized) {
            Some(&id) => {
                self.nodes[id] = node;
                self.link(&normalized, id);
            }
            None => {
                self.insert(normalized, node);
            }
        }
        Ok(())
    }

    fn insert(&mut self, path: String, node: VfsNode) -> NodeId {
        let id = self.nodes.len();
        trace!(path = %path, dir = node.is_dir(), "vfs insert");
        self.nodes.push(node);
        self.link(&path, id);
        self.index.insert(path, id);
        id
    }

    // hook a node into its parent's listing, if the parent dir exists right now
    fn link(&mut self, path: &str, id: NodeId) {
        if path.is_empty() {
            return;
        }
        let (parent_path, name) = path::split(path);
        let parent = self.index.get(parent_path).copied();
        match parent.map(|pid| &mut self.nodes[pid]) {
            Some(VfsNode::Directory { children, .. }) => {
                children.insert(name.to_string(), id);
            }
            _ => {
                warn!(path = %path, parent = %parent_path, "parent directory missing, entry will not be listed");
            }
        }
    }

    // `.` and `""` both mean root; anything else has to be normalized already
    fn lookup(&self, op: &'static str, name: &str) -> Result<NodeId, FsError> {
        let key = if name == "." { "" } else { name };
        if !is_valid_path(key) {
            return Err(FsError::Invalid {
                op,
                path: name.to_string(),
            });
        }
        self.index.get(key).copied().ok_or_else(|| FsError::NotExist {
            op,
            path: name.to_string(),
        })
    }

    pub fn open(&self, name: &str) -> Result<OpenFile<'_>, FsError> {
        let id = self.lookup("open", name)?;
        Ok(OpenFile {
            fs: self,
            id,
            path: name.to_string(),
            offset: 0,
        })
    }

    pub fn stat(&self, name: &str) -> Result<Metadata, FsError> {
        let id = self.lookup("stat", name)?;
        Ok(self.nodes[id].metadata())
    }

    // get file contents as byte slice
    pub fn read_file(&self, name: &str) -> Result<&[u8], FsError> {
        let id = self.lookup("read", name)?;
        match &self.nodes[id] {
            VfsNode::File { content, .. } => Ok(content),
            VfsNode::Directory { .. } => Err(FsError::Invalid {
                op: "read",
                path: name.to_string(),
            }),
        }
    }

    /// Direct children of a directory, sorted by name. `limit <= 0` returns
    /// everything.
    pub fn read_dir(&self, name: &str, limit: isize) -> Result<Vec<DirEntry>, FsError> {
        let id = self.lookup("readdir", name)?;
        self.entries(id, name, limit)
    }

    fn entries(&self, id: NodeId, name: &str, limit: isize) -> Result<Vec<DirEntry>, FsError> {
        let children = match &self.nodes[id] {
            VfsNode::Directory { children, .. } => children,
            VfsNode::File { .. } => {
                return Err(FsError::Invalid {
                    op: "readdir",
                    path: name.to_string(),
                });
            }
        };

        let take = if limit > 0 { limit as usize } else { usize::MAX };
        Ok(children
            .iter()
            .take(take)
            .map(|(name, &child)| DirEntry {
                name: name.clone(),
                is_dir: self.nodes[child].is_dir(),
            })
            .collect())
    }

    /// Every listed path, depth first in name order, starting with the root
    /// as `"."`. Orphaned nodes are skipped.
    pub fn walk(&self) -> Vec<String> {
        let mut out = vec![".".to_string()];
        self.walk_from(0, "", &mut out);
        out
    }

    fn walk_from(&self, id: NodeId, dir: &str, out: &mut Vec<String>) {
        if let VfsNode::Directory { children, .. } = &self.nodes[id] {
            for (name, &child) in children {
                let child_path = path::join(dir, name);
                out.push(child_path.clone());
                self.walk_from(child, &child_path, out);
            }
        }
    }
}

/// Slash-separated, no empty, `.` or `..` segments, no NUL. `""` is the root.
fn is_valid_path(name: &str) -> bool {
    if name.is_empty() {
        return true;
    }
    name.split('/')
        .all(|seg| !seg.is_empty() && seg != "." && seg != ".." && !seg.contains('\0'))
}

/// Handle returned by [`VirtualFileSystem::open`]. Files read sequentially
/// through [`Read`]; directories list through [`OpenFile::read_dir`].
#[derive(Debug)]
pub struct OpenFile<'a> {
    fs: &'a VirtualFileSystem,
    id: NodeId,
    path: String,
    offset: usize,
}

impl OpenFile<'_> {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn stat(&self) -> Metadata {
        self.fs.nodes[self.id].metadata()
    }

    pub fn read_dir(&self, limit: isize) -> Result<Vec<DirEntry>, FsError> {
        self.fs.entries(self.id, &self.path, limit)
    }
}

impl Read for OpenFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let content = match &self.fs.nodes[self.id] {
            VfsNode::File { content, .. } => content,
            VfsNode::Directory { .. } => {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    FsError::Invalid {
                        op: "read",
                        path: self.path.clone(),
                    },
                ));
            }
        };

        let remaining = content.get(self.offset..).unwrap_or_default();
        let n = remaining.len().min(buf.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.offset += n;
        Ok(n)
    }
}
