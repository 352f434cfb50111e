use serde::{Deserialize, Serialize};

use crate::domain::{Message, ProjectId};

/// Body of a request to the agent proxy (streaming and non-streaming)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRequest {
    /// Full ordered history, ending with the new user message
    pub input: Vec<Message>,
    pub custom_inputs: CustomInputs,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomInputs {
    pub thread_id: String,
}

impl AgentRequest {
    pub fn new(input: Vec<Message>, thread_id: &ProjectId) -> Self {
        Self {
            input,
            custom_inputs: CustomInputs {
                thread_id: thread_id.to_string(),
            },
            skill_name: None,
        }
    }

    pub fn with_skill(mut self, skill: Option<String>) -> Self {
        self.skill_name = skill;
        self
    }

    pub fn thread_id(&self) -> &str {
        &self.custom_inputs.thread_id
    }

    /// Content of the most recent user message, if any
    pub fn last_user_text(&self) -> Option<&str> {
        self.input
            .iter()
            .rev()
            .find(|m| m.is_user())
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let req = AgentRequest::new(vec![Message::user("hi")], &ProjectId::new("t-1"));
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "input": [{"role": "user", "content": "hi"}],
                "custom_inputs": {"thread_id": "t-1"}
            })
        );

        let tagged = req.with_skill(Some("target-identification".into()));
        let json = serde_json::to_value(&tagged).unwrap();
        assert_eq!(json["skill_name"], "target-identification");
    }

    #[test]
    fn test_last_user_text() {
        let req = AgentRequest::new(
            vec![Message::user("a"), Message::assistant("b"), Message::user("c")],
            &ProjectId::new("t"),
        );
        assert_eq!(req.last_user_text(), Some("c"));
    }
}
