//! Per-agent session: an [`ActionQueue`] bound to one wire format and the
//! transport that carries it.

use thiserror::Error;

use crate::queue::ActionQueue;
use crate::transport::{CommandTransport, HttpTransport, TransportError};
use crate::wire::{
    ConsoleRenderer, DataType, EmptyQueuePolicy, HttpRenderer, RenderError, Renderer, WireFormat,
};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no actions queued")]
    EmptyQueue,
    #[error("render failed, nothing was sent: {0}")]
    Render(#[from] RenderError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("{operation} is not available on the {format} channel")]
    Unsupported {
        operation: &'static str,
        format: WireFormat,
    },
}

/// Backend reply to a flush or data request.
#[derive(Debug, Clone, PartialEq)]
pub enum FlushReply {
    Text(String),
    Json(serde_json::Value),
}

impl std::fmt::Display for FlushReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlushReply::Text(text) => f.write_str(text),
            FlushReply::Json(value) => write!(f, "{}", value),
        }
    }
}

enum Channel {
    Console {
        renderer: ConsoleRenderer,
        transport: Box<dyn CommandTransport>,
    },
    Http {
        renderer: HttpRenderer,
        transport: Box<dyn HttpTransport>,
    },
}

pub struct AgentSession {
    agent_id: u32,
    queue: ActionQueue,
    channel: Channel,
}

/// Render the queued batch, applying the renderer's empty-queue policy.
///
/// This is exactly what [`AgentSession::flush`] sends, so dry runs can use
/// it without a transport.
pub fn render_batch<R: Renderer>(
    renderer: &R,
    agent_id: u32,
    queue: &ActionQueue,
) -> Result<R::Output, SessionError> {
    if queue.is_empty() && renderer.empty_queue() == EmptyQueuePolicy::Reject {
        return Err(SessionError::EmptyQueue);
    }
    Ok(renderer.render(agent_id, queue.actions())?)
}

impl AgentSession {
    pub fn console(
        agent_id: u32,
        renderer: ConsoleRenderer,
        transport: impl CommandTransport + 'static,
    ) -> Self {
        Self {
            agent_id,
            queue: ActionQueue::new(),
            channel: Channel::Console {
                renderer,
                transport: Box::new(transport),
            },
        }
    }

    pub fn http(
        agent_id: u32,
        renderer: HttpRenderer,
        transport: impl HttpTransport + 'static,
    ) -> Self {
        Self {
            agent_id,
            queue: ActionQueue::new(),
            channel: Channel::Http {
                renderer,
                transport: Box::new(transport),
            },
        }
    }

    pub fn agent_id(&self) -> u32 {
        self.agent_id
    }

    pub fn format(&self) -> WireFormat {
        match &self.channel {
            Channel::Console { .. } => WireFormat::Console,
            Channel::Http { .. } => WireFormat::Http,
        }
    }

    pub fn queue(&self) -> &ActionQueue {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut ActionQueue {
        &mut self.queue
    }

    /// Render and send every queued action in one request.
    ///
    /// The queue is cleared only after the transport reports success. On
    /// any error it is left exactly as it was, so calling `flush` again
    /// re-sends the identical batch.
    pub fn flush(&mut self) -> Result<FlushReply, SessionError> {
        let agent_id = self.agent_id;
        let reply = match &mut self.channel {
            Channel::Console {
                renderer,
                transport,
            } => {
                let command = render_batch(&*renderer, agent_id, &self.queue)?;
                FlushReply::Text(transport.send(&command)?)
            }
            Channel::Http {
                renderer,
                transport,
            } => {
                let body = render_batch(&*renderer, agent_id, &self.queue)?;
                FlushReply::Json(transport.post(&renderer.actions_path, &body)?)
            }
        };
        tracing::info!(
            agent_id,
            actions = self.queue.len(),
            format = %self.format(),
            "flushed action queue"
        );
        self.queue.clear();
        Ok(reply)
    }

    /// Fetch a world snapshot around the agent.
    pub fn get_data(
        &mut self,
        data_type: DataType,
        radius: u32,
    ) -> Result<FlushReply, SessionError> {
        let agent_id = self.agent_id;
        match &mut self.channel {
            Channel::Console {
                renderer,
                transport,
            } => {
                let command = renderer.data_request(agent_id, data_type, radius);
                Ok(FlushReply::Text(transport.send(&command)?))
            }
            Channel::Http {
                renderer,
                transport,
            } => {
                let path = renderer.data_path(agent_id, data_type);
                Ok(FlushReply::Json(transport.get(&path)?))
            }
        }
    }

    /// Reset the scenario for `agent_count` agents.
    pub fn reset(&mut self, agent_count: u32) -> Result<String, SessionError> {
        match &mut self.channel {
            Channel::Console {
                renderer,
                transport,
            } => Ok(transport.send(&renderer.reset(agent_count))?),
            Channel::Http { .. } => Err(SessionError::Unsupported {
                operation: "reset",
                format: WireFormat::Http,
            }),
        }
    }

    /// Ask the backend to start executing what has been delivered.
    pub fn execute(&mut self) -> Result<String, SessionError> {
        match &mut self.channel {
            Channel::Console {
                renderer,
                transport,
            } => Ok(transport.send(&renderer.execute())?),
            Channel::Http { .. } => Err(SessionError::Unsupported {
                operation: "execute",
                format: WireFormat::Http,
            }),
        }
    }
}
