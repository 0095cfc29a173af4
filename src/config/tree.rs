//! Directory-shaped hierarchy of `save.toml` files.
//!
//! Nodes live in an arena and refer to each other by [`NodeId`]. Nodes are
//! stored in walk order, so a parent always precedes its children.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, SaveError};

use super::model::{GeneralSection, PluginSection, SectionKind};
use super::parse::parse_config_file;
use super::resolved::ResolvedConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One `save.toml` and its place in the hierarchy.
#[derive(Debug)]
pub struct ConfigNode {
    location: PathBuf,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    sections: Vec<PluginSection>,
    merged: Vec<PluginSection>,
    resolved: Option<ResolvedConfig>,
}

impl ConfigNode {
    /// # Errors
    /// Returns an error if `location` is not an existing regular file.
    pub fn new(location: PathBuf, parent: Option<NodeId>) -> Result<Self> {
        if !location.is_file() {
            return Err(SaveError::Config(format!(
                "{} is not a regular file",
                location.display()
            )));
        }
        Ok(Self {
            location,
            parent,
            children: Vec::new(),
            sections: Vec::new(),
            merged: Vec::new(),
            resolved: None,
        })
    }

    #[must_use]
    pub fn location(&self) -> &Path {
        &self.location
    }

    /// Directory holding the config file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        self.location.parent().unwrap_or_else(|| Path::new("."))
    }

    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Sections declared in this node's own file.
    #[must_use]
    pub fn sections(&self) -> &[PluginSection] {
        &self.sections
    }

    /// Own sections merged with everything inherited from ancestors.
    #[must_use]
    pub fn merged_sections(&self) -> &[PluginSection] {
        &self.merged
    }

    #[must_use]
    pub const fn resolved(&self) -> Option<&ResolvedConfig> {
        self.resolved.as_ref()
    }
}

#[derive(Debug)]
pub struct ConfigTree {
    nodes: Vec<ConfigNode>,
}

impl ConfigTree {
    /// Find every directory under `root` holding a `marker` file and link each
    /// one to the nearest ancestor directory that also holds one.
    ///
    /// # Errors
    /// Returns an error if `root` is not a directory, a directory under it
    /// cannot be read, or no marker is found.
    pub fn discover(root: &Path, marker: &str) -> Result<Self> {
        if !root.is_dir() {
            return Err(SaveError::Config(format!(
                "test root {} is not a directory",
                root.display()
            )));
        }

        let mut tree = Self { nodes: Vec::new() };
        let mut by_dir: HashMap<PathBuf, NodeId> = HashMap::new();

        for entry in WalkDir::new(root).sort_by_file_name() {
            let entry = entry.map_err(|source| SaveError::Walk {
                path: source.path().unwrap_or(root).to_path_buf(),
                source,
            })?;
            if !entry.file_type().is_dir() {
                continue;
            }
            let dir = entry.path();
            let location = dir.join(marker);
            if !location.is_file() {
                continue;
            }
            let parent = dir
                .ancestors()
                .skip(1)
                .find_map(|ancestor| by_dir.get(ancestor).copied());
            let id = tree.add(location, parent)?;
            by_dir.insert(dir.to_path_buf(), id);
        }

        if tree.nodes.is_empty() {
            return Err(SaveError::Config(format!(
                "no {marker} found under {}",
                root.display()
            )));
        }
        debug!(nodes = tree.nodes.len(), root = %root.display(), "discovered config tree");
        Ok(tree)
    }

    /// Append a node. The parent, if any, must already be in the tree.
    ///
    /// # Errors
    /// Returns an error if `location` is not a regular file or `parent` is unknown.
    pub fn add(&mut self, location: PathBuf, parent: Option<NodeId>) -> Result<NodeId> {
        if let Some(parent) = parent
            && parent.0 >= self.nodes.len()
        {
            return Err(SaveError::Config(format!(
                "unknown parent node for {}",
                location.display()
            )));
        }
        let node = ConfigNode::new(location, parent)?;
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        if let Some(parent) = parent {
            self.nodes[parent.0].children.push(id);
        }
        Ok(id)
    }

    /// Parse every node's file, merge sections down the tree and resolve them.
    ///
    /// # Errors
    /// Returns the first parse, merge or validation error in walk order.
    pub fn process_in_place(&mut self) -> Result<()> {
        let parsed: Vec<Result<Vec<PluginSection>>> = self
            .nodes
            .par_iter()
            .map(|node| parse_config_file(&node.location))
            .collect();
        for (node, sections) in self.nodes.iter_mut().zip(parsed) {
            node.sections = sections?;
        }

        for index in 0..self.nodes.len() {
            let inherited = self.nodes[index]
                .parent
                .map(|parent| self.nodes[parent.0].merged.clone())
                .unwrap_or_default();
            let node = &mut self.nodes[index];
            node.merged = merge_sections(&node.sections, &inherited)?;
            node.resolved = Some(ResolvedConfig::resolve(&node.location, &node.merged)?);
            debug!(config = %node.location.display(), sections = node.merged.len(), "resolved config");
        }
        Ok(())
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> &ConfigNode {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All node ids, parents before children.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ids().filter(|id| self.get(*id).parent.is_none())
    }

    /// Nodes sharing the parent of `id`, excluding `id` itself.
    #[must_use]
    pub fn neighbours(&self, id: NodeId) -> Vec<NodeId> {
        match self.get(id).parent {
            Some(parent) => self
                .get(parent)
                .children
                .iter()
                .copied()
                .filter(|other| *other != id)
                .collect(),
            None => self.roots().filter(|other| *other != id).collect(),
        }
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).parent, |current| self.get(*current).parent)
    }
}

/// Merge own sections over inherited ones, kind by kind. `[general]` is
/// always present in the result.
fn merge_sections(
    own: &[PluginSection],
    inherited: &[PluginSection],
) -> Result<Vec<PluginSection>> {
    let mut merged = Vec::new();
    for kind in SectionKind::ALL {
        let child = own.iter().find(|s| s.kind() == kind);
        let parent = inherited.iter().find(|s| s.kind() == kind);
        match (child, parent) {
            (Some(child), Some(parent)) => merged.push(child.merge_with(parent)?),
            (Some(section), None) | (None, Some(section)) => merged.push(section.clone()),
            (None, None) if kind == SectionKind::General => {
                merged.push(PluginSection::General(GeneralSection::default()));
            }
            (None, None) => {}
        }
    }
    Ok(merged)
}

#[cfg(test)]
#[path = "tree_tests.rs"]
mod tests;
