use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Unique identifier for layout nodes.
pub type NodeId = String;

/// Kind of a parsed layout node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayoutType {
    Component,
    ExternalComponent,
    Stack,
    BottomTabs,
    TopTabs,
    SideMenuRoot,
    SideMenuCenter,
    SideMenuLeft,
    SideMenuRight,
    SplitView,
}

impl LayoutType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayoutType::Component => "Component",
            LayoutType::ExternalComponent => "ExternalComponent",
            LayoutType::Stack => "Stack",
            LayoutType::BottomTabs => "BottomTabs",
            LayoutType::TopTabs => "TopTabs",
            LayoutType::SideMenuRoot => "SideMenuRoot",
            LayoutType::SideMenuCenter => "SideMenuCenter",
            LayoutType::SideMenuLeft => "SideMenuLeft",
            LayoutType::SideMenuRight => "SideMenuRight",
            LayoutType::SplitView => "SplitView",
        }
    }

    /// Leaf kinds that carry a registered component name.
    pub fn is_component(&self) -> bool {
        matches!(self, LayoutType::Component | LayoutType::ExternalComponent)
    }
}

/// Payload carried by every node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    pub options: Value,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pass_props: Option<Value>,
}

impl Default for NodeData {
    fn default() -> Self {
        Self {
            name: None,
            options: Value::Object(Map::new()),
            pass_props: None,
        }
    }
}

/// Parsed layout node handed to the native layer.
///
/// An empty `id` means the crawler has not visited the node yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub id: NodeId,
    #[serde(rename = "type")]
    pub node_type: LayoutType,
    pub data: NodeData,
    pub children: Vec<LayoutNode>,
}

impl LayoutNode {
    pub fn new(node_type: LayoutType) -> Self {
        Self {
            id: NodeId::new(),
            node_type,
            data: NodeData::default(),
            children: Vec::new(),
        }
    }

    pub fn component(name: impl Into<String>) -> Self {
        let mut node = Self::new(LayoutType::Component);
        node.data.name = Some(name.into());
        node
    }

    pub fn with_id(mut self, id: impl Into<NodeId>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.data.options = options;
        self
    }

    pub fn with_children(mut self, children: Vec<LayoutNode>) -> Self {
        self.children = children;
        self
    }

    /// Depth-first search by node id.
    pub fn find(&self, id: &str) -> Option<&LayoutNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Layout bundle sent by `setRoot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootLayout {
    pub root: LayoutNode,
    pub modals: Vec<LayoutNode>,
    pub overlays: Vec<LayoutNode>,
}

/// Recursively merge `overlay` into `base`; objects merge key by key, anything else is replaced.
pub fn merge_options(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(existing) => merge_options(existing, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
