use crate::error::Result;
use serde::Deserialize;
use std::fs;

/// The kind of pipeline event that started this run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Manual dispatch: propose a new release
    Manual,
    /// A pull request was closed, merged or not
    PullRequestClosed { number: Option<u64>, merged: bool },
    /// Anything else is a no-op
    Other(String),
}

#[derive(Debug, Default, Deserialize)]
struct EventPayload {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    pull_request: Option<PullRequestPayload>,
}

#[derive(Debug, Deserialize)]
struct PullRequestPayload {
    #[serde(default)]
    number: Option<u64>,
    #[serde(default)]
    merged: Option<bool>,
}

impl Trigger {
    /// Classify an event by its name and JSON payload
    pub fn from_event(event_name: &str, payload: &serde_json::Value) -> Result<Self> {
        match event_name {
            "workflow_dispatch" => Ok(Trigger::Manual),
            "pull_request" | "pull_request_target" => {
                let payload = EventPayload::deserialize(payload)?;
                if payload.action.as_deref() != Some("closed") {
                    return Ok(Trigger::Other(format!(
                        "{}.{}",
                        event_name,
                        payload.action.as_deref().unwrap_or("unknown")
                    )));
                }

                let pull_request = payload.pull_request;
                Ok(Trigger::PullRequestClosed {
                    number: pull_request
                        .as_ref()
                        .and_then(|pr| pr.number)
                        .or(payload.number),
                    merged: pull_request.and_then(|pr| pr.merged).unwrap_or(false),
                })
            }
            other => Ok(Trigger::Other(other.to_string())),
        }
    }

    /// Load the event payload file and classify it
    ///
    /// A missing path means an empty payload.
    pub fn load(event_name: &str, event_path: Option<&str>) -> Result<Self> {
        let payload = match event_path {
            Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
            None => serde_json::Value::Object(serde_json::Map::new()),
        };
        Self::from_event(event_name, &payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    #[test]
    fn test_workflow_dispatch_is_manual() {
        let trigger = Trigger::from_event("workflow_dispatch", &json!({})).unwrap();
        assert_eq!(trigger, Trigger::Manual);
    }

    #[test]
    fn test_closed_merged_pull_request() {
        let payload = json!({
            "action": "closed",
            "number": 42,
            "pull_request": { "number": 42, "merged": true }
        });
        assert_eq!(
            Trigger::from_event("pull_request", &payload).unwrap(),
            Trigger::PullRequestClosed {
                number: Some(42),
                merged: true
            }
        );
    }

    #[test]
    fn test_closed_without_merge() {
        let payload = json!({
            "action": "closed",
            "pull_request": { "number": 7, "merged": false }
        });
        assert_eq!(
            Trigger::from_event("pull_request_target", &payload).unwrap(),
            Trigger::PullRequestClosed {
                number: Some(7),
                merged: false
            }
        );
    }

    #[test]
    fn test_closed_without_number() {
        let payload = json!({ "action": "closed", "pull_request": { "merged": true } });
        assert_eq!(
            Trigger::from_event("pull_request", &payload).unwrap(),
            Trigger::PullRequestClosed {
                number: None,
                merged: true
            }
        );
    }

    #[test]
    fn test_other_pull_request_actions() {
        let payload = json!({ "action": "opened", "pull_request": { "number": 1 } });
        assert_eq!(
            Trigger::from_event("pull_request", &payload).unwrap(),
            Trigger::Other("pull_request.opened".to_string())
        );
    }

    #[test]
    fn test_unrelated_event() {
        assert_eq!(
            Trigger::from_event("push", &json!({ "ref": "refs/heads/main" })).unwrap(),
            Trigger::Other("push".to_string())
        );
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"action":"closed","pull_request":{{"number":3,"merged":true}}}}"#
        )
        .unwrap();
        file.flush().unwrap();

        let trigger = Trigger::load("pull_request", file.path().to_str()).unwrap();
        assert_eq!(
            trigger,
            Trigger::PullRequestClosed {
                number: Some(3),
                merged: true
            }
        );
    }

    #[test]
    fn test_load_without_payload() {
        assert_eq!(
            Trigger::load("workflow_dispatch", None).unwrap(),
            Trigger::Manual
        );
    }
}
