use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

use crate::error::{NavigationError, Result};
use crate::ids::UniqueIdProvider;

use super::core::{LayoutNode, LayoutType, merge_options};
use super::options;

/// Converts declarative layout input into [`LayoutNode`] trees.
pub trait LayoutTransform: Send + Sync {
    fn parse(&self, raw: &Value) -> Result<LayoutNode>;

    /// Assign missing ids and apply inherited defaults, in place.
    fn crawl(&self, node: &mut LayoutNode) -> Result<()>;

    fn process_options(&self, options: &mut Value) -> Result<()>;
}

/// Default parser + crawler pair.
pub struct LayoutTreeTransform {
    ids: Arc<UniqueIdProvider>,
    defaults: Mutex<HashMap<String, Value>>,
}

impl LayoutTreeTransform {
    pub fn new(ids: Arc<UniqueIdProvider>) -> Self {
        Self {
            ids,
            defaults: Mutex::new(HashMap::new()),
        }
    }

    /// Options merged beneath every component named `component_name` during `crawl`.
    pub fn register_default_options(&self, component_name: impl Into<String>, options: Value) {
        if let Ok(mut guard) = self.defaults.lock() {
            guard.insert(component_name.into(), options);
        }
    }

    fn defaults_for(&self, component_name: &str) -> Option<Value> {
        self.defaults
            .lock()
            .ok()
            .and_then(|guard| guard.get(component_name).cloned())
    }

    fn parse_node(&self, raw: &Value) -> Result<LayoutNode> {
        let object = raw
            .as_object()
            .ok_or_else(|| NavigationError::transform("layout must be an object"))?;
        if object.len() != 1 {
            let keys: Vec<&str> = object.keys().map(String::as_str).collect();
            return Err(NavigationError::transform(format!(
                "layout must have exactly one type key (keys: {})",
                keys.join(", ")
            )));
        }

        if let Some(body) = object.get("component") {
            return parse_component(LayoutType::Component, body);
        }
        if let Some(body) = object.get("externalComponent") {
            return parse_component(LayoutType::ExternalComponent, body);
        }
        if let Some(body) = object.get("stack") {
            return self.parse_container(LayoutType::Stack, body);
        }
        if let Some(body) = object.get("bottomTabs") {
            return self.parse_container(LayoutType::BottomTabs, body);
        }
        if let Some(body) = object.get("topTabs") {
            return self.parse_container(LayoutType::TopTabs, body);
        }
        if let Some(body) = object.get("sideMenu") {
            return self.parse_side_menu(body);
        }
        if let Some(body) = object.get("splitView") {
            return self.parse_split_view(body);
        }

        let keys: Vec<&str> = object.keys().map(String::as_str).collect();
        Err(NavigationError::transform(format!(
            "unknown layout type (keys: {})",
            keys.join(", ")
        )))
    }

    fn parse_container(&self, node_type: LayoutType, body: &Value) -> Result<LayoutNode> {
        let body = expect_object(node_type, body)?;
        let mut node = base_node(node_type, body)?;
        if let Some(children) = body.get("children") {
            let children = children.as_array().ok_or_else(|| {
                NavigationError::transform(format!("{}.children must be an array", node_type.as_str()))
            })?;
            node.children = children
                .iter()
                .map(|child| self.parse_node(child))
                .collect::<Result<Vec<_>>>()?;
        }
        Ok(node)
    }

    fn parse_side_menu(&self, body: &Value) -> Result<LayoutNode> {
        let body = expect_object(LayoutType::SideMenuRoot, body)?;
        let mut node = base_node(LayoutType::SideMenuRoot, body)?;

        let center = body
            .get("center")
            .ok_or_else(|| NavigationError::transform("sideMenu requires a center layout"))?;
        node.children
            .push(self.wrap(LayoutType::SideMenuCenter, center)?);
        if let Some(left) = body.get("left") {
            node.children.push(self.wrap(LayoutType::SideMenuLeft, left)?);
        }
        if let Some(right) = body.get("right") {
            node.children.push(self.wrap(LayoutType::SideMenuRight, right)?);
        }
        Ok(node)
    }

    fn parse_split_view(&self, body: &Value) -> Result<LayoutNode> {
        let body = expect_object(LayoutType::SplitView, body)?;
        let mut node = base_node(LayoutType::SplitView, body)?;
        for side in ["master", "detail"] {
            let child = body.get(side).ok_or_else(|| {
                NavigationError::transform(format!("splitView requires a {side} layout"))
            })?;
            node.children.push(self.parse_node(child)?);
        }
        Ok(node)
    }

    fn wrap(&self, node_type: LayoutType, raw: &Value) -> Result<LayoutNode> {
        let child = self.parse_node(raw)?;
        Ok(LayoutNode::new(node_type).with_children(vec![child]))
    }

    fn crawl_node(&self, node: &mut LayoutNode) -> Result<()> {
        if node.id.is_empty() {
            node.id = self.ids.generate(node.node_type.as_str());
        }

        if node.node_type.is_component() {
            let defaults = node
                .data
                .name
                .as_deref()
                .and_then(|name| self.defaults_for(name));
            if let Some(mut merged) = defaults {
                merge_options(&mut merged, &node.data.options);
                node.data.options = merged;
            }
        }

        options::process_options(&mut node.data.options)?;

        for child in &mut node.children {
            self.crawl_node(child)?;
        }
        Ok(())
    }
}

impl LayoutTransform for LayoutTreeTransform {
    fn parse(&self, raw: &Value) -> Result<LayoutNode> {
        self.parse_node(raw)
    }

    fn crawl(&self, node: &mut LayoutNode) -> Result<()> {
        self.crawl_node(node)
    }

    fn process_options(&self, options: &mut Value) -> Result<()> {
        options::process_options(options)
    }
}

fn expect_object(node_type: LayoutType, body: &Value) -> Result<&Map<String, Value>> {
    body.as_object().ok_or_else(|| {
        NavigationError::transform(format!("{} layout must be an object", node_type.as_str()))
    })
}

fn base_node(node_type: LayoutType, body: &Map<String, Value>) -> Result<LayoutNode> {
    let mut node = LayoutNode::new(node_type);
    match body.get("id") {
        None | Some(Value::Null) => {}
        Some(Value::String(id)) => node.id = id.clone(),
        Some(other) => {
            return Err(NavigationError::transform(format!(
                "{} id must be a string, got {other}",
                node_type.as_str()
            )));
        }
    }
    match body.get("options") {
        None | Some(Value::Null) => {}
        Some(options @ Value::Object(_)) => node.data.options = options.clone(),
        Some(other) => {
            return Err(NavigationError::transform(format!(
                "{} options must be an object, got {other}",
                node_type.as_str()
            )));
        }
    }
    Ok(node)
}

fn parse_component(node_type: LayoutType, body: &Value) -> Result<LayoutNode> {
    let body = expect_object(node_type, body)?;
    let mut node = base_node(node_type, body)?;
    let name = body
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            NavigationError::transform(format!("{} requires a name", node_type.as_str()))
        })?;
    node.data.name = Some(name.to_string());
    node.data.pass_props = body.get("passProps").cloned();
    Ok(node)
}
