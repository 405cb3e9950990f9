// Progress tools: an agent's own contributions and the leaderboard

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_enum, json_schema_integer, json_schema_object, json_schema_string,
    optional_count, path_with_query, Tool,
};
use anyhow::{Context, Result};
use biodoc_client::BiodocClient;
use serde::Deserialize;
use std::sync::Arc;

/// Review state of a submitted contribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContributionStatus {
    Pending,
    Approved,
    Rejected,
    Integrated,
    NeedsRevision,
}

impl ContributionStatus {
    pub const ALL: &'static [&'static str] = &[
        "pending",
        "approved",
        "rejected",
        "integrated",
        "needs-revision",
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Integrated => "integrated",
            Self::NeedsRevision => "needs-revision",
        }
    }
}

/// Tool to list the calling agent's contributions
pub struct MyContributionsTool {
    client: Arc<BiodocClient>,
}

impl MyContributionsTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct MyContributionsArgs {
    #[serde(default)]
    status: Option<ContributionStatus>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

#[async_trait::async_trait]
impl Tool for MyContributionsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "my_contributions".to_string(),
            description: "List your own contributions and their review status".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "status": json_schema_enum(ContributionStatus::ALL, "Only contributions in this review state"),
                    "type": json_schema_string("Only contributions of this type")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: MyContributionsArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for my_contributions")?;

        let path = path_with_query(
            "/contributions",
            &[
                ("status", args.status.map(|s| s.as_str().to_string())),
                ("type", args.kind),
            ],
        );
        let contributions = self.client.get(&path).await?;
        Ok(CallToolResult::json(&contributions))
    }
}

/// Tool to show top contributors
pub struct LeaderboardTool {
    client: Arc<BiodocClient>,
}

impl LeaderboardTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct LeaderboardArgs {
    #[serde(default, deserialize_with = "optional_count")]
    limit: Option<u64>,
}

#[async_trait::async_trait]
impl Tool for LeaderboardTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "leaderboard".to_string(),
            description: "Show the agents with the most accepted contributions".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "limit": json_schema_integer("Number of entries (default decided by the server)")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: LeaderboardArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for leaderboard")?;

        let path = path_with_query("/leaderboard", &[("limit", args.limit.map(|l| l.to_string()))]);
        let leaderboard = self.client.get(&path).await?;
        Ok(CallToolResult::json(&leaderboard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::token_client;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_my_contributions_filters() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/contributions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let tool = MyContributionsTool::new(token_client(&server));
        tool.execute(json!({"status": "needs-revision", "type": "scene"}))
            .await
            .unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(
            requests[0].url.query(),
            Some("status=needs-revision&type=scene")
        );
    }

    #[tokio::test]
    async fn test_my_contributions_rejects_unknown_status() {
        let server = MockServer::start().await;

        let tool = MyContributionsTool::new(token_client(&server));
        let result = tool.execute(json!({"status": "archived"})).await;

        assert!(result.is_err());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_leaderboard_limit() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leaderboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"agent": "scribe"}])))
            .mount(&server)
            .await;

        let tool = LeaderboardTool::new(token_client(&server));
        let result = tool.execute(json!({"limit": 3})).await.unwrap();

        assert!(result.text_content().contains("scribe"));
        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("limit=3"));
    }

    #[tokio::test]
    async fn test_leaderboard_limit_accepts_integral_float() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/leaderboard"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let tool = LeaderboardTool::new(token_client(&server));
        tool.execute(json!({"limit": 5.0})).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests[0].url.query(), Some("limit=5"));
    }

    #[tokio::test]
    async fn test_leaderboard_rejects_fractional_limit() {
        let server = MockServer::start().await;

        let tool = LeaderboardTool::new(token_client(&server));
        let err = tool.execute(json!({"limit": 5.5})).await.unwrap_err();

        assert!(format!("{:#}", err).contains("non-negative integer"));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[test]
    fn test_status_names_match_schema() {
        for name in ContributionStatus::ALL {
            let status: ContributionStatus = serde_json::from_value(json!(name)).unwrap();
            assert_eq!(status.as_str(), *name);
        }
    }
}
