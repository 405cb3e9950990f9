// Per-subject tools: assignments, contributions, review and confidence

use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{
    json_schema_integer, json_schema_object, json_schema_string, optional_count, slug_segment,
    Tool,
};
use anyhow::{Context, Result};
use biodoc_client::BiodocClient;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct SlugArgs {
    slug: String,
}

impl SlugArgs {
    /// Parse `{"slug": ...}` and return the slug encoded as a path segment.
    pub(crate) fn parse(arguments: serde_json::Value, tool: &str) -> Result<String> {
        let args: Self = serde_json::from_value(arguments)
            .with_context(|| format!("Invalid arguments for {}", tool))?;
        slug_segment(&args.slug, tool)
    }
}

/// Tool to get the next piece of work for a subject
pub struct GetAssignmentTool {
    client: Arc<BiodocClient>,
}

impl GetAssignmentTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for GetAssignmentTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "get_assignment".to_string(),
            description: "Get a work assignment for a documentary subject: the current phase, \
                          what kind of contribution is needed next, and the context to write it."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "slug": json_schema_string("Subject slug, e.g. \"ada-lovelace\"")
                }),
                vec!["slug"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let slug = SlugArgs::parse(arguments, "get_assignment")?;

        let path = format!("/assignment/{}", slug);
        let assignment = self.client.get(&path).await?;
        Ok(CallToolResult::json(&assignment))
    }
}

#[derive(Debug, Deserialize)]
struct SubmitContributionArgs {
    slug: String,
    #[serde(rename = "type")]
    kind: String,
    content: String,
    #[serde(default)]
    source_url: Option<String>,
    #[serde(default, deserialize_with = "optional_count")]
    scene_id: Option<u64>,
    #[serde(default)]
    liberty_note: Option<String>,
}

/// Outbound body of a contribution.
///
/// `scene_id` is sent whenever it was supplied, including 0. The string
/// fields are left out when absent or empty.
#[derive(Debug, Serialize)]
struct ContributionBody<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scene_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    liberty_note: Option<&'a str>,
}

impl<'a> From<&'a SubmitContributionArgs> for ContributionBody<'a> {
    fn from(args: &'a SubmitContributionArgs) -> Self {
        fn non_empty(value: &Option<String>) -> Option<&str> {
            value.as_deref().filter(|v| !v.is_empty())
        }

        Self {
            kind: &args.kind,
            content: &args.content,
            source_url: non_empty(&args.source_url),
            scene_id: args.scene_id,
            liberty_note: non_empty(&args.liberty_note),
        }
    }
}

/// Tool to submit a contribution for a subject
pub struct SubmitContributionTool {
    client: Arc<BiodocClient>,
}

impl SubmitContributionTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SubmitContributionTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "submit_contribution".to_string(),
            description: "Submit a contribution (research fact, narrative passage, scene, visual \
                          or sound direction) for a documentary subject. Valid types depend on \
                          the subject's current phase; call get_assignment first."
                .to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "slug": json_schema_string("Subject slug"),
                    "type": json_schema_string("Contribution type, as named by the assignment"),
                    "content": json_schema_string("The contribution itself"),
                    "source_url": json_schema_string("URL backing a factual claim"),
                    "scene_id": json_schema_integer("Scene this contribution belongs to"),
                    "liberty_note": json_schema_string("Note describing any dramatic liberty taken with the facts")
                }),
                vec!["slug", "type", "content"],
            ),
        }
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
        let args: SubmitContributionArgs = serde_json::from_value(arguments)
            .context("Invalid arguments for submit_contribution")?;

        let path = format!("/contribute/{}", slug_segment(&args.slug, "submit_contribution")?);
        let body = ContributionBody::from(&args);
        let receipt = self.client.post(&path, &body).await?;
        Ok(CallToolResult::json(&receipt))
    }
}

/// Tool to review a subject's progress across phases
pub struct ReviewPersonTool {
    client: Arc<BiodocClient>,
}

impl ReviewPersonTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ReviewPersonTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "review_person".to_string(),
            description: "Review everything gathered so far for a subject, phase by phase, \
                          including open gaps."
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
        let slug = SlugArgs::parse(arguments, "review_person")?;

        let path = format!("/review/{}", slug);
        let review = self.client.get(&path).await?;
        Ok(CallToolResult::json(&review))
    }
}

/// Tool to check how well-sourced a subject's material is
pub struct CheckConfidenceTool {
    client: Arc<BiodocClient>,
}

impl CheckConfidenceTool {
    pub fn new(client: Arc<BiodocClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for CheckConfidenceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: "check_confidence".to_string(),
            description: "Check the confidence score of a subject's material: how much of it is \
                          sourced, disputed, or still unverified."
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
        let slug = SlugArgs::parse(arguments, "check_confidence")?;

        let path = format!("/confidence/{}", slug);
        let confidence = self.client.get(&path).await?;
        Ok(CallToolResult::json(&confidence))
    }
}
