//! JSON rendering for the HTTP API.

use serde::{Deserialize, Serialize};

use super::{check_coordinates, DataType, EmptyQueuePolicy, RenderError, Renderer, WireFormat};
use crate::actions::Action;

pub const DEFAULT_ACTIONS_PATH: &str = "/actions";

/// Request body accepted by the actions endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionsRequest {
    pub agent_actions: Vec<AgentActions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentActions {
    pub agent_id: u32,
    pub actions: Vec<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRenderer {
    pub actions_path: String,
}

impl Default for HttpRenderer {
    fn default() -> Self {
        Self {
            actions_path: DEFAULT_ACTIONS_PATH.to_string(),
        }
    }
}

impl HttpRenderer {
    pub fn data_path(&self, agent_id: u32, data_type: DataType) -> String {
        format!("/data/{}/{}", data_type.path_segment(), agent_id)
    }
}

impl Renderer for HttpRenderer {
    type Output = serde_json::Value;

    fn format(&self) -> WireFormat {
        WireFormat::Http
    }

    fn empty_queue(&self) -> EmptyQueuePolicy {
        EmptyQueuePolicy::Reject
    }

    fn render(&self, agent_id: u32, actions: &[Action]) -> Result<serde_json::Value, RenderError> {
        check_coordinates(actions)?;
        let request = ActionsRequest {
            agent_actions: vec![AgentActions {
                agent_id,
                actions: actions.to_vec(),
            }],
        };
        Ok(serde_json::to_value(&request)?)
    }
}
