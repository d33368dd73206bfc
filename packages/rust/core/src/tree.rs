//! Nested record tree for consolidated output.
//!
//! `blog/posts/intro.md` lands at `tree["blog"]["posts"]["intro"]`. Keys
//! keep first-seen insertion order so serialization is reproducible.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::warn;

use mdjson_shared::{CollisionPolicy, MdJsonError, Record, Result};

/// A tree node: a directory level or a document's record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Node {
    Branch(IndexMap<String, Node>),
    Leaf(Record),
}

impl Node {
    fn branch() -> Self {
        Self::Branch(IndexMap::new())
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Self::Leaf(record) => Some(record),
            Self::Branch(_) => None,
        }
    }

    pub fn as_branch(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Self::Branch(children) => Some(children),
            Self::Leaf(_) => None,
        }
    }

    /// Turn this node into a branch (dropping a leaf) and return its children.
    fn make_branch(&mut self) -> &mut IndexMap<String, Node> {
        if let Self::Leaf(_) = self {
            *self = Self::branch();
        }
        match self {
            Self::Branch(children) => children,
            Self::Leaf(_) => unreachable!("leaf was replaced with a branch"),
        }
    }
}

/// The consolidated tree. Owns every node; no back-references.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tree {
    root: IndexMap<String, Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record at the key path derived from `path`.
    ///
    /// Under [`CollisionPolicy::Overwrite`] the later insert wins: it replaces
    /// an existing leaf or branch at the same key, and a leaf standing where a
    /// directory is needed becomes a branch. [`CollisionPolicy::Reject`]
    /// turns each of those cases into [`MdJsonError::PathCollision`].
    pub fn insert(&mut self, path: &str, record: Record, policy: CollisionPolicy) -> Result<()> {
        let keys = key_path(path)?;
        let Some((name, dirs)) = keys.split_last() else {
            return Err(MdJsonError::InvalidPath {
                path: path.to_string(),
            });
        };

        if policy == CollisionPolicy::Reject {
            self.check_free(&keys)?;
        }

        let mut level = &mut self.root;
        for (depth, dir) in dirs.iter().enumerate() {
            let node = level.entry((*dir).to_string()).or_insert_with(Node::branch);
            if let Node::Leaf(_) = node {
                let key = keys[..=depth].join(".");
                warn!(%key, path, "record replaced by directory");
            }
            level = node.make_branch();
        }

        let replaced = level.insert((*name).to_string(), Node::Leaf(record));
        if replaced.is_some() {
            let key = keys.join(".");
            warn!(%key, path, "existing entry overwritten");
        }

        Ok(())
    }

    /// Fail if inserting at `keys` would replace anything.
    fn check_free(&self, keys: &[&str]) -> Result<()> {
        let mut level = &self.root;
        for (depth, key) in keys.iter().enumerate() {
            let is_last = depth + 1 == keys.len();
            match level.get(*key) {
                None => return Ok(()),
                Some(Node::Branch(children)) if !is_last => level = children,
                Some(_) => {
                    return Err(MdJsonError::PathCollision {
                        key: keys[..=depth].join("."),
                    });
                }
            }
        }
        Ok(())
    }

    /// Look up a node by key path.
    pub fn get(&self, keys: &[&str]) -> Option<&Node> {
        let (last, dirs) = keys.split_last()?;
        let mut level = &self.root;
        for dir in dirs {
            level = level.get(*dir)?.as_branch()?;
        }
        level.get(*last)
    }

    /// Top-level keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.root.keys()
    }

    /// Serialize to JSON bytes, compact or pretty-printed.
    pub fn to_json_vec(&self, pretty: bool) -> Result<Vec<u8>> {
        let bytes = if pretty {
            serde_json::to_vec_pretty(self)?
        } else {
            serde_json::to_vec(self)?
        };
        Ok(bytes)
    }
}

/// Split a document path into tree keys, dropping the file extension.
///
/// Empty and `.` segments are ignored.
pub fn key_path(path: &str) -> Result<Vec<&str>> {
    let mut keys: Vec<&str> = path
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();

    let stem = keys.pop().map(strip_extension).unwrap_or_default();
    if stem.is_empty() {
        return Err(MdJsonError::InvalidPath {
            path: path.to_string(),
        });
    }
    keys.push(stem);

    Ok(keys)
}

/// Drop the last `.ext` from a file name. Dotfiles keep their name.
pub(crate) fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}
