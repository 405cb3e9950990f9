// Catalog tools for finding subjects and the work they need

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::assignments::SlugArgs;
use crate::tools::{
    json_schema_enum, json_schema_integer, json_schema_object, json_schema_string,
    optional_count, path_with_query, Tool,
};
use anyhow::{Context, Result};
use biodoc_client::BiodocClient;
use serde::Deserialize;
use std::sync::Arc;

/// Tool to browse the catalog of subjects
pub struct BrowsePeopleTool {
    client: Arc<BiodocClient>,
}

impl BrowsePeopleTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct BrowsePeopleArgs {
    #[serde(default)]
    q: Option<String>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    page: Option<u64>,
    #[serde(default, deserialize_with = "optional_count")]
    limit: Option<u64>,
}

#[async_trait::async_trait]
impl Tool for BrowsePeopleTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "browse_people".to_string(),
            description: "Browse the catalog of documentary subjects, optionally searching by name \
                          or filtering by tag"
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "q": json_schema_string("Search text matched against names and summaries"),
                    "tag": json_schema_string("Only subjects with this tag, e.g. \"Music\""),
                    "page": json_schema_integer("Page number, starting at 1"),
                    "limit": json_schema_integer("Results per page")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: BrowsePeopleArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for browse_people")?;

        let path = path_with_query(
            "/people",
            &[
                ("q", args.q),
                ("tag", args.tag),
                ("page", args.page.map(|p| p.to_string())),
                ("limit", args.limit.map(|l| l.to_string())),
            ],
        );
        let people = self.client.get(&path).await?;
        Ok(CallToolResult::json(&people))
    }
}

/// Tool to get one subject's profile
pub struct GetPersonTool {
    client: Arc<BiodocClient>,
}

impl GetPersonTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetPersonTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_person".to_string(),
            description: "Get the public profile of one documentary subject: biography summary, \
                          tags and current phase"
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "slug": json_schema_string("Subject slug")
                }),
                vec!["slug"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let slug = SlugArgs::parse(arguments, "get_person")?;

        let path = format!("/people/{}", slug);
        let person = self.client.get(&path).await?;
        Ok(CallToolResult::json(&person))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: &'static [&'static str] = &["high", "medium", "low"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// Tool to find subjects that need contributions
pub struct FindNeedsTool {
    client: Arc<BiodocClient>,
}

impl FindNeedsTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
struct FindNeedsArgs {
    #[serde(default)]
    priority: Option<Priority>,
    #[serde(default)]
    tag: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    limit: Option<u64>,
}

#[async_trait::async_trait]
impl Tool for FindNeedsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "find_needs".to_string(),
            description: "Find subjects whose current phase is waiting for contributions, most \
                          urgent first"
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "priority": json_schema_enum(Priority::ALL, "Only needs of this priority"),
                    "tag": json_schema_string("Only subjects with this tag"),
                    "limit": json_schema_integer("Maximum number of results")
                }),
                vec![],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: FindNeedsArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for find_needs")?;

        let path = path_with_query(
            "/needs",
            &[
                ("priority", args.priority.map(|p| p.as_str().to_string())),
                ("tag", args.tag),
                ("limit", args.limit.map(|l| l.to_string())),
            ],
        );
        let needs = self.client.get(&path).await?;
        Ok(CallToolResult::json(&needs))
    }
}
