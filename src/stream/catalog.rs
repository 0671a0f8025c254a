//! Immutable stream forest

use super::node::{NodeId, StreamNode};
use crate::error::{Error, Result};
use crate::types::SyncMode;
use serde::Serialize;
use std::collections::HashMap;

/// What `discover` reports for one stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamDescriptor {
    /// Stream name
    pub name: String,
    /// Parent stream name
    pub parent: Option<String>,
    /// Ordered primary key fields
    pub primary_key: Vec<String>,
    /// Always null (full refresh)
    pub replication_key: Option<String>,
    /// Supported sync modes
    pub supported_sync_modes: Vec<SyncMode>,
    /// Schema reference
    pub schema_ref: String,
}

/// The fixed set of stream nodes and their parent edges
///
/// Built once, then shared read-only. Node ids are positions in insertion
/// order, which is also the traversal order among siblings.
#[derive(Debug, Default)]
pub struct Catalog {
    nodes: Vec<StreamNode>,
    parents: Vec<Option<NodeId>>,
    children: Vec<Vec<NodeId>>,
    index: HashMap<String, NodeId>,
}

impl Catalog {
    /// Start building a catalog
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the catalog has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Node by id
    pub fn node(&self, id: NodeId) -> &StreamNode {
        &self.nodes[id]
    }

    /// Look up a node id by stream name
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.index.get(name).copied()
    }

    /// Look up a node id, failing with `StreamNotFound`
    pub fn get(&self, name: &str) -> Result<NodeId> {
        self.find(name).ok_or_else(|| Error::StreamNotFound {
            stream: name.to_string(),
        })
    }

    /// Parent of a node
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id]
    }

    /// Nodes without a parent, in catalog order
    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).filter(|id| self.parents[*id].is_none())
    }

    /// Direct children of a node, in catalog order
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.children[id]
    }

    /// Ancestors of a node, nearest first
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = self.parents[id];
        while let Some(parent) = current {
            out.push(parent);
            current = self.parents[parent];
        }
        out
    }

    /// Iterate all nodes with their ids
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &StreamNode)> {
        self.nodes.iter().enumerate()
    }

    /// Stream names in catalog order
    pub fn names(&self) -> Vec<&str> {
        self.nodes.iter().map(StreamNode::name).collect()
    }

    /// Descriptors for every stream
    pub fn descriptors(&self) -> Vec<StreamDescriptor> {
        self.nodes
            .iter()
            .map(|node| StreamDescriptor {
                name: node.name.clone(),
                parent: node.parent.clone(),
                primary_key: node.primary_key.clone(),
                replication_key: node.replication_key.clone(),
                supported_sync_modes: vec![SyncMode::FullRefresh],
                schema_ref: node.schema_ref.clone(),
            })
            .collect()
    }
}

/// Builder that rejects duplicate names and unknown parents
///
/// A parent must be added before its children, so the parent relation can
/// never contain a cycle.
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    /// Add a node, returning its id
    pub fn add(&mut self, node: StreamNode) -> Result<NodeId> {
        if node.name.is_empty() {
            return Err(Error::catalog("stream name must not be empty"));
        }
        if self.catalog.index.contains_key(&node.name) {
            return Err(Error::catalog(format!(
                "duplicate stream name '{}'",
                node.name
            )));
        }

        let parent = match &node.parent {
            Some(parent) => Some(self.catalog.find(parent).ok_or_else(|| {
                Error::catalog(format!(
                    "stream '{}' refers to unknown parent '{parent}'",
                    node.name
                ))
            })?),
            None => None,
        };

        let id = self.catalog.nodes.len();
        if let Some(parent) = parent {
            self.catalog.children[parent].push(id);
        }
        self.catalog.index.insert(node.name.clone(), id);
        self.catalog.parents.push(parent);
        self.catalog.children.push(Vec::new());
        self.catalog.nodes.push(node);
        Ok(id)
    }

    /// Add a node, builder style
    pub fn with(mut self, node: StreamNode) -> Result<Self> {
        self.add(node)?;
        Ok(self)
    }

    /// Finish building
    pub fn build(self) -> Catalog {
        self.catalog
    }
}
