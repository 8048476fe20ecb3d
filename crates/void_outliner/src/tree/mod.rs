//! Outliner tree: the UI projection of the scene graph.
//!
//! A [`GraphTree`] is rebuilt by the [`TreeReconciler`] on every refresh.
//! Nodes only carry UI state (selection, expansion) and a key back to the
//! object they project; they never own scene data.

mod reconcile;
mod selection;

pub use reconcile::TreeReconciler;
pub use selection::{SelectionManager, SelectionMode, SiblingDirection};

use void_scene::ObjectHandle;

use crate::classify::NodeKind;

/// Fixed top-level rows present in every tree. They are section markers
/// only and never hold children; free sounds and probes sit among the
/// ordinary roots after them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PseudoRoot {
    Scene,
    Sounds,
    ReflectionProbes,
}

impl PseudoRoot {
    pub const ALL: [PseudoRoot; 3] = [
        PseudoRoot::Scene,
        PseudoRoot::Sounds,
        PseudoRoot::ReflectionProbes,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            PseudoRoot::Scene => "__editor__scene__",
            PseudoRoot::Sounds => "__editor__sounds__",
            PseudoRoot::ReflectionProbes => "__editor__reflection_probes__",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PseudoRoot::Scene => "Scene",
            PseudoRoot::Sounds => "Sounds",
            PseudoRoot::ReflectionProbes => "Reflection Probes",
        }
    }
}

/// What a tree node projects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Pseudo(PseudoRoot),
    Object(ObjectHandle),
}

impl NodeKey {
    pub fn object(self) -> Option<ObjectHandle> {
        match self {
            NodeKey::Object(handle) => Some(handle),
            NodeKey::Pseudo(_) => None,
        }
    }
}

impl From<ObjectHandle> for NodeKey {
    fn from(handle: ObjectHandle) -> Self {
        NodeKey::Object(handle)
    }
}

/// One row of the outliner.
#[derive(Clone, Debug)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    pub icon: &'static str,
    pub kind: NodeKind,
    /// The projected object (matched by reference across passes).
    pub key: NodeKey,
    pub children: Vec<GraphNode>,
    pub is_selected: bool,
    pub is_expanded: bool,
    pub disabled: bool,
    /// Whether an expand affordance is shown.
    pub has_caret: bool,
}

impl GraphNode {
    pub fn object(&self) -> Option<ObjectHandle> {
        self.key.object()
    }

    fn pseudo(root: PseudoRoot) -> Self {
        Self {
            id: root.id().to_string(),
            label: root.label().to_string(),
            icon: NodeKind::Scene.icon(),
            kind: NodeKind::Scene,
            key: NodeKey::Pseudo(root),
            children: Vec::new(),
            is_selected: false,
            is_expanded: false,
            disabled: false,
            has_caret: false,
        }
    }
}

/// The projected tree of one reconciliation pass.
#[derive(Clone, Debug, Default)]
pub struct GraphTree {
    roots: Vec<GraphNode>,
    /// Leading top-level rows that range selection never includes.
    fixed_prefix: usize,
}

impl GraphTree {
    pub fn new(roots: Vec<GraphNode>, fixed_prefix: usize) -> Self {
        Self {
            roots,
            fixed_prefix,
        }
    }

    pub fn roots(&self) -> &[GraphNode] {
        &self.roots
    }

    pub fn fixed_prefix_len(&self) -> usize {
        self.fixed_prefix
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// All nodes in depth-first pre-order, the order they were produced.
    /// Collapsed subtrees are included.
    pub fn flatten(&self) -> Vec<&GraphNode> {
        fn walk<'a>(nodes: &'a [GraphNode], out: &mut Vec<&'a GraphNode>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }
        let mut out = Vec::new();
        walk(&self.roots, &mut out);
        out
    }

    pub fn flattened_keys(&self) -> Vec<NodeKey> {
        self.flatten().into_iter().map(|n| n.key).collect()
    }

    /// Child indices leading from the roots to `key`.
    fn path_to(&self, key: NodeKey) -> Option<Vec<usize>> {
        fn walk(nodes: &[GraphNode], key: NodeKey, path: &mut Vec<usize>) -> bool {
            for (i, node) in nodes.iter().enumerate() {
                path.push(i);
                if node.key == key || walk(&node.children, key, path) {
                    return true;
                }
                path.pop();
            }
            false
        }
        let mut path = Vec::new();
        walk(&self.roots, key, &mut path).then_some(path)
    }

    fn node_at(&self, path: &[usize]) -> Option<&GraphNode> {
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get(*first)?;
        for &i in rest {
            node = node.children.get(i)?;
        }
        Some(node)
    }

    pub fn find(&self, key: NodeKey) -> Option<&GraphNode> {
        self.path_to(key).and_then(|p| self.node_at(&p))
    }

    pub fn find_mut(&mut self, key: NodeKey) -> Option<&mut GraphNode> {
        let path = self.path_to(key)?;
        let (first, rest) = path.split_first()?;
        let mut node = self.roots.get_mut(*first)?;
        for &i in rest {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&GraphNode> {
        self.flatten().into_iter().find(|n| n.id == id)
    }

    pub fn contains(&self, key: NodeKey) -> bool {
        self.path_to(key).is_some()
    }

    /// Parent row of `key`, `None` for top-level rows and unknown keys.
    pub fn parent_of(&self, key: NodeKey) -> Option<&GraphNode> {
        let path = self.path_to(key)?;
        if path.len() < 2 {
            return None;
        }
        self.node_at(&path[..path.len() - 1])
    }

    /// Rows sharing the parent of `key`, including `key` itself.
    pub fn siblings_of(&self, key: NodeKey) -> Option<&[GraphNode]> {
        let path = self.path_to(key)?;
        if path.len() < 2 {
            return Some(&self.roots);
        }
        self.node_at(&path[..path.len() - 1])
            .map(|p| p.children.as_slice())
    }

    /// Keys of all ancestors of `key`, nearest first.
    pub fn ancestors_of(&self, key: NodeKey) -> Vec<NodeKey> {
        let Some(path) = self.path_to(key) else {
            return Vec::new();
        };
        (1..path.len())
            .rev()
            .filter_map(|len| self.node_at(&path[..len]).map(|n| n.key))
            .collect()
    }

    pub fn for_each(&self, mut f: impl FnMut(&GraphNode)) {
        fn walk(nodes: &[GraphNode], f: &mut impl FnMut(&GraphNode)) {
            for node in nodes {
                f(node);
                walk(&node.children, f);
            }
        }
        walk(&self.roots, &mut f);
    }

    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut GraphNode)) {
        fn walk(nodes: &mut [GraphNode], f: &mut impl FnMut(&mut GraphNode)) {
            for node in nodes {
                f(&mut *node);
                walk(&mut node.children, f);
            }
        }
        walk(&mut self.roots, &mut f);
    }

    /// Keys of rows flagged selected, in pre-order.
    pub fn selected_keys(&self) -> Vec<NodeKey> {
        let mut keys = Vec::new();
        self.for_each(|n| {
            if n.is_selected {
                keys.push(n.key);
            }
        });
        keys
    }
}
