//! UI schema model and form expansion
//!
//! A UI schema maps field names (or group names) to layout nodes. Expansion
//! walks the schema in insertion order and produces a flat, ordered list of
//! render nodes, rendering every field at most once.
//!
//! Partial schemas are normal: a leaf without a matching field definition, or
//! a group child without a schema entry, renders nothing.

use crate::field::FieldDefinition;
use indexmap::IndexMap;
use schemadash_core::{FieldType, Layout, SelectOption, WidgetType, to_title_case};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default number of rows of a textarea
pub const DEFAULT_TEXTAREA_ROWS: u32 = 3;

/// Layout schema keyed by field or group name, in declaration order
pub type UiSchema = IndexMap<String, UiSchemaNode>;

// ============================================================================
// Schema nodes
// ============================================================================

/// Widget configuration for one field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LeafWidget {
    /// Declared widget; `None` falls back to the field's semantic type
    pub widget: Option<WidgetType>,
    /// Overrides the field's label
    pub label: Option<String>,
    /// Overrides the field's placeholder
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    /// Choices for select, radio and checkbox widgets
    pub options: Vec<SelectOption>,
    /// Textarea rows
    pub rows: Option<u32>,
    /// Direction radio buttons and checkboxes flow in
    pub layout: Option<Layout>,
    pub class_name: Option<String>,
}

impl LeafWidget {
    /// Leaf with a declared widget
    pub fn new(widget: WidgetType) -> Self {
        Self {
            widget: Some(widget),
            ..Self::default()
        }
    }

    pub fn with_options(mut self, options: Vec<SelectOption>) -> Self {
        self.options = options;
        self
    }

    pub fn with_rows(mut self, rows: u32) -> Self {
        self.rows = Some(rows);
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }
}

/// One entry of a UI schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawNode", into = "RawNode")]
pub enum UiSchemaNode {
    /// Widget for the field of the same name
    Leaf(LeafWidget),

    /// Vertical gap
    Spacer {
        height: Option<String>,
        class_name: Option<String>,
    },

    /// Untitled group of child entries
    Group {
        fields: Vec<String>,
        layout: Layout,
        class_name: Option<String>,
    },

    /// Group rendered inside a titled container
    NamedGroup {
        name: String,
        label: String,
        fields: Vec<String>,
        layout: Layout,
        class_name: Option<String>,
    },
}

impl UiSchemaNode {
    /// Leaf node with a declared widget
    pub fn leaf(widget: WidgetType) -> Self {
        UiSchemaNode::Leaf(LeafWidget::new(widget))
    }

    pub fn spacer() -> Self {
        UiSchemaNode::Spacer {
            height: None,
            class_name: None,
        }
    }

    /// Untitled group
    pub fn group<S: Into<String>>(fields: impl IntoIterator<Item = S>, layout: Layout) -> Self {
        UiSchemaNode::Group {
            fields: fields.into_iter().map(Into::into).collect(),
            layout,
            class_name: None,
        }
    }

    /// Titled group
    pub fn named_group<S: Into<String>>(
        name: impl Into<String>,
        label: impl Into<String>,
        fields: impl IntoIterator<Item = S>,
        layout: Layout,
    ) -> Self {
        UiSchemaNode::NamedGroup {
            name: name.into(),
            label: label.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            layout,
            class_name: None,
        }
    }

    /// Check if this node lists child entries
    pub fn is_group(&self) -> bool {
        matches!(self, UiSchemaNode::Group { .. } | UiSchemaNode::NamedGroup { .. })
    }
}

/// Wire shape of a UI schema node, tagged by `uiType`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ui_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    helper_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Vec<SelectOption>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rows: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    height: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    layout: Option<Layout>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    class_name: Option<String>,
}

fn height_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(format!("{}px", n)),
        _ => None,
    }
}

impl From<RawNode> for UiSchemaNode {
    fn from(raw: RawNode) -> Self {
        match raw.ui_type.as_deref() {
            Some("spacer") => UiSchemaNode::Spacer {
                height: raw.height.and_then(height_string),
                class_name: raw.class_name,
            },
            Some("group") => UiSchemaNode::Group {
                fields: raw.fields.unwrap_or_default(),
                layout: raw.layout.unwrap_or_default(),
                class_name: raw.class_name,
            },
            Some("namedGroup") => UiSchemaNode::NamedGroup {
                name: raw.name.unwrap_or_default(),
                label: raw.label.unwrap_or_default(),
                fields: raw.fields.unwrap_or_default(),
                layout: raw.layout.unwrap_or_default(),
                class_name: raw.class_name,
            },
            other => {
                let widget = other.and_then(|name| match name.parse::<WidgetType>() {
                    Ok(widget) => Some(widget),
                    Err(reason) => {
                        tracing::warn!(%reason, "Falling back to the field type");
                        None
                    }
                });
                UiSchemaNode::Leaf(LeafWidget {
                    widget,
                    label: raw.label,
                    placeholder: raw.placeholder,
                    helper_text: raw.helper_text,
                    options: raw.options.unwrap_or_default(),
                    rows: raw.rows,
                    layout: raw.layout,
                    class_name: raw.class_name,
                })
            }
        }
    }
}

impl From<UiSchemaNode> for RawNode {
    fn from(node: UiSchemaNode) -> Self {
        match node {
            UiSchemaNode::Leaf(leaf) => RawNode {
                ui_type: leaf.widget.map(|w| w.as_str().to_string()),
                label: leaf.label,
                placeholder: leaf.placeholder,
                helper_text: leaf.helper_text,
                options: (!leaf.options.is_empty()).then_some(leaf.options),
                rows: leaf.rows,
                layout: leaf.layout,
                class_name: leaf.class_name,
                ..RawNode::default()
            },
            UiSchemaNode::Spacer { height, class_name } => RawNode {
                ui_type: Some("spacer".to_string()),
                height: height.map(serde_json::Value::String),
                class_name,
                ..RawNode::default()
            },
            UiSchemaNode::Group {
                fields,
                layout,
                class_name,
            } => RawNode {
                ui_type: Some("group".to_string()),
                fields: Some(fields),
                layout: Some(layout),
                class_name,
                ..RawNode::default()
            },
            UiSchemaNode::NamedGroup {
                name,
                label,
                fields,
                layout,
                class_name,
            } => RawNode {
                ui_type: Some("namedGroup".to_string()),
                name: Some(name),
                label: Some(label),
                fields: Some(fields),
                layout: Some(layout),
                class_name,
                ..RawNode::default()
            },
        }
    }
}

/// A UI schema with one leaf per field, in `order`.
///
/// Fields with options get a select, booleans a single checkbox, and every
/// other field the default widget of its type.
pub fn default_ui_schema(fields: &[FieldDefinition]) -> UiSchema {
    let mut sorted: Vec<&FieldDefinition> = fields.iter().collect();
    sorted.sort_by_key(|f| f.order);

    sorted
        .into_iter()
        .map(|field| {
            let leaf = if field.has_options() {
                LeafWidget::new(WidgetType::Select).with_options(field.select_options())
            } else if field.field_type == FieldType::Boolean {
                LeafWidget::new(WidgetType::Checkbox)
                    .with_options(vec![SelectOption::new(field.display_label(), "true")])
            } else {
                LeafWidget::new(WidgetType::for_field_type(field.field_type))
            };
            (field.name.clone(), UiSchemaNode::Leaf(leaf))
        })
        .collect()
}

// ============================================================================
// Render nodes
// ============================================================================

/// Concrete input control of a rendered field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "control", rename_all = "camelCase")]
pub enum InputControl {
    /// Multiline text
    TextArea { rows: u32 },
    /// Single choice from a dropdown
    Select { options: Vec<SelectOption> },
    /// Single choice from exclusive buttons
    Radio {
        options: Vec<SelectOption>,
        layout: Layout,
    },
    /// One toggle per option
    CheckboxGroup {
        options: Vec<SelectOption>,
        layout: Layout,
    },
    /// Single-line input
    Input {
        #[serde(rename = "inputType")]
        input_type: FieldType,
    },
}

/// A rendered field
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldNode {
    pub name: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub helper_text: Option<String>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,
    pub control: InputControl,
}

/// One positioned unit of form output
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "node", rename_all = "camelCase")]
pub enum RenderNode {
    Field(FieldNode),
    Spacer {
        key: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        height: Option<String>,
    },
    Group {
        key: String,
        layout: Layout,
        #[serde(skip_serializing_if = "Option::is_none")]
        class_name: Option<String>,
        children: Vec<RenderNode>,
    },
    NamedGroup {
        name: String,
        title: String,
        layout: Layout,
        children: Vec<RenderNode>,
    },
}

impl RenderNode {
    /// Key of this node within its parent
    pub fn key(&self) -> &str {
        match self {
            RenderNode::Field(field) => &field.name,
            RenderNode::Spacer { key, .. } | RenderNode::Group { key, .. } => key,
            RenderNode::NamedGroup { name, .. } => name,
        }
    }

    /// Children of a group, empty for fields and spacers
    pub fn children(&self) -> &[RenderNode] {
        match self {
            RenderNode::Group { children, .. } | RenderNode::NamedGroup { children, .. } => {
                children
            }
            RenderNode::Field(_) | RenderNode::Spacer { .. } => &[],
        }
    }

    /// Names of all fields in this subtree, depth first
    pub fn field_names(&self) -> Vec<&str> {
        match self {
            RenderNode::Field(field) => vec![field.name.as_str()],
            _ => self.children().iter().flat_map(RenderNode::field_names).collect(),
        }
    }
}

/// Names of all rendered fields, depth first
pub fn rendered_field_names(nodes: &[RenderNode]) -> Vec<&str> {
    nodes.iter().flat_map(RenderNode::field_names).collect()
}

// ============================================================================
// Expansion
// ============================================================================

/// Expand a UI schema against field definitions into render nodes.
///
/// Top-level order follows the schema's insertion order; children follow
/// their group's `fields`. A field referenced from several places renders
/// only where it is first reached. Top-level groups are always expanded,
/// even when they already appeared nested inside an earlier group.
pub fn expand(fields: &[FieldDefinition], schema: &UiSchema) -> Vec<RenderNode> {
    let expander = Expander {
        fields: fields.iter().map(|f| (f.name.as_str(), f)).collect(),
        schema,
    };

    let mut rendered = HashSet::new();
    let nodes: Vec<RenderNode> = schema
        .iter()
        .filter_map(|(key, node)| {
            // Top-level groups always expand; only their children are deduplicated.
            if !node.is_group() && !rendered.insert(key.clone()) {
                return None;
            }
            expander.expand_node(key, node, &mut rendered)
        })
        .collect();

    tracing::debug!(
        entries = schema.len(),
        nodes = nodes.len(),
        rendered = rendered.len(),
        "Expanded UI schema"
    );

    nodes
}

struct Expander<'a> {
    fields: HashMap<&'a str, &'a FieldDefinition>,
    schema: &'a UiSchema,
}

impl Expander<'_> {
    fn expand_node(
        &self,
        key: &str,
        node: &UiSchemaNode,
        rendered: &mut HashSet<String>,
    ) -> Option<RenderNode> {
        match node {
            UiSchemaNode::Leaf(leaf) => self.field_node(key, leaf).map(RenderNode::Field),
            UiSchemaNode::Spacer { height, .. } => Some(RenderNode::Spacer {
                key: key.to_string(),
                height: height.clone(),
            }),
            UiSchemaNode::Group {
                fields,
                layout,
                class_name,
            } => Some(RenderNode::Group {
                key: key.to_string(),
                layout: *layout,
                class_name: class_name.clone(),
                children: self.expand_children(fields, rendered),
            }),
            UiSchemaNode::NamedGroup {
                name,
                label,
                fields,
                layout,
                ..
            } => {
                let name = if name.is_empty() { key } else { name.as_str() };
                let title = if label.is_empty() {
                    to_title_case(name)
                } else {
                    label.clone()
                };
                Some(RenderNode::NamedGroup {
                    name: name.to_string(),
                    title,
                    layout: *layout,
                    children: self.expand_children(fields, rendered),
                })
            }
        }
    }

    fn expand_children(
        &self,
        children: &[String],
        rendered: &mut HashSet<String>,
    ) -> Vec<RenderNode> {
        let mut nodes = Vec::new();
        for child in children {
            let Some(node) = self.schema.get(child) else {
                continue;
            };
            if !rendered.insert(child.clone()) {
                continue;
            }
            if let Some(expanded) = self.expand_node(child, node, rendered) {
                nodes.push(expanded);
            }
        }
        nodes
    }

    fn field_node(&self, key: &str, leaf: &LeafWidget) -> Option<FieldNode> {
        let field = self.fields.get(key)?;

        let options = || {
            if leaf.options.is_empty() {
                field.select_options()
            } else {
                leaf.options.clone()
            }
        };
        let layout = leaf.layout.unwrap_or_default();

        let control = match leaf.widget {
            Some(WidgetType::Textarea) => InputControl::TextArea {
                rows: leaf.rows.unwrap_or(DEFAULT_TEXTAREA_ROWS),
            },
            Some(WidgetType::Select) => InputControl::Select { options: options() },
            Some(WidgetType::Radio) => InputControl::Radio {
                options: options(),
                layout,
            },
            Some(WidgetType::Checkbox) => InputControl::CheckboxGroup {
                options: options(),
                layout,
            },
            Some(widget) => InputControl::Input {
                input_type: widget.input_type().unwrap_or(field.field_type),
            },
            None => InputControl::Input {
                input_type: field.field_type,
            },
        };

        Some(FieldNode {
            name: field.name.clone(),
            label: leaf.label.clone().unwrap_or_else(|| field.display_label()),
            placeholder: leaf.placeholder.clone().or_else(|| field.placeholder.clone()),
            helper_text: leaf.helper_text.clone(),
            required: field.required,
            class_name: leaf.class_name.clone(),
            control,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
