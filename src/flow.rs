//! The flow module builds the accept/decline navigation graph between funnel pages.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use crate::offer::Offer;

pub const MAIN_NODE_ID: &str = "main";
pub const THANK_YOU_NODE_ID: &str = "thank_you";

/// What happens when a visitor accepts or declines on a page.
///
/// Serialized as `exit` or `to_<node id>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FlowAction {
    Exit,
    To(String),
}

impl FlowAction {
    pub fn to_node(id: impl Into<String>) -> Self {
        Self::To(id.into())
    }

    /// Id of the node this action leads to, if any.
    pub fn target(&self) -> Option<&str> {
        match self {
            Self::Exit => None,
            Self::To(id) => Some(id),
        }
    }
}

impl fmt::Display for FlowAction {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exit => formatter.write_str("exit"),
            Self::To(id) => write!(formatter, "to_{id}"),
        }
    }
}

impl FromStr for FlowAction {
    type Err = anyhow::Error;

    fn from_str(input: &str) -> Result<Self> {
        if input == "exit" {
            return Ok(Self::Exit);
        }

        match input.strip_prefix("to_") {
            Some(id) if !id.is_empty() => Ok(Self::To(id.to_string())),
            _ => bail!("Malformed flow action: {input}"),
        }
    }
}

impl TryFrom<String> for FlowAction {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<FlowAction> for String {
    fn from(action: FlowAction) -> Self {
        action.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Main,
    Upsell,
    Downsell,
    ThankYou,
}

/// A page in the funnel flow graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    pub name: String,
    pub accept_action: FlowAction,
    pub decline_action: FlowAction,
}

pub fn upsell_id(position: usize) -> String {
    format!("upsell_{position}")
}

pub fn downsell_id(position: usize) -> String {
    format!("downsell_{position}")
}

/// Builds the flow graph for a funnel.
///
/// The main page leads into the upsell chain. Declining upsell `i` leads to
/// downsell `i`, and both answers on a downsell rejoin the chain at upsell
/// `i + 1`, or at the thank-you page after the last upsell. When there are
/// fewer downsells than upsells, declining an upsell without a matching
/// downsell takes that same continuation directly instead of pointing at a
/// `downsell_i` that does not exist, so every decline target resolves.
///
/// The main page always accepts into `upsell_1`, even when there are no
/// upsells; [`validate_flow`] reports that reference as dangling.
pub fn design_funnel_flow(upsells: &[Offer], downsells: &[Offer]) -> Vec<FlowNode> {
    let continuation = |position: usize| {
        if position < upsells.len() {
            FlowAction::to_node(upsell_id(position + 1))
        } else {
            FlowAction::to_node(THANK_YOU_NODE_ID)
        }
    };

    let mut flow = Vec::with_capacity(upsells.len() + downsells.len() + 2);

    flow.push(FlowNode {
        id: MAIN_NODE_ID.to_string(),
        node_type: NodeType::Main,
        name: "Main Sales Page".to_string(),
        accept_action: FlowAction::to_node(upsell_id(1)),
        decline_action: FlowAction::Exit,
    });

    for (index, upsell) in upsells.iter().enumerate() {
        let position = index + 1;
        let decline_action = if position <= downsells.len() {
            FlowAction::to_node(downsell_id(position))
        } else {
            continuation(position)
        };
        flow.push(FlowNode {
            id: upsell_id(position),
            node_type: NodeType::Upsell,
            name: upsell.product_name.clone(),
            accept_action: continuation(position),
            decline_action,
        });
    }

    for (index, downsell) in downsells.iter().enumerate() {
        let position = index + 1;
        flow.push(FlowNode {
            id: downsell_id(position),
            node_type: NodeType::Downsell,
            name: downsell.product_name.clone(),
            accept_action: continuation(position),
            decline_action: continuation(position),
        });
    }

    flow.push(FlowNode {
        id: THANK_YOU_NODE_ID.to_string(),
        node_type: NodeType::ThankYou,
        name: "Thank You Page".to_string(),
        accept_action: FlowAction::Exit,
        decline_action: FlowAction::Exit,
    });

    flow
}

/// Checks that node ids are unique and every `to_<id>` action names a node of the flow.
///
/// # Errors
///
/// Returns an error describing the first duplicate id or dangling action.
pub fn validate_flow(flow: &[FlowNode]) -> Result<()> {
    let mut ids = HashSet::new();
    for node in flow {
        if !ids.insert(node.id.as_str()) {
            bail!("Duplicate flow node id {}", node.id);
        }
    }

    for node in flow {
        for action in [&node.accept_action, &node.decline_action] {
            if let Some(target) = action.target()
                && !ids.contains(target)
            {
                bail!("Node {} points to missing node {target}", node.id);
            }
        }
    }

    Ok(())
}

/// Finds a node by id.
pub fn find_node<'a>(flow: &'a [FlowNode], id: &str) -> Option<&'a FlowNode> {
    flow.iter().find(|node| node.id == id)
}
