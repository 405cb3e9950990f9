// Tool registry and the dispatch boundary every tool call goes through

use crate::protocol::{CallToolResult, ToolSchema};
use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool executor trait
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Get the tool schema for MCP
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with given arguments
    async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult>;
}

/// Returned by [`ToolRegistry::call`] for names nobody registered.
#[derive(Debug, thiserror::Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

/// Tool registry for managing available tools
///
/// Built once at startup and only read afterwards.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. A later tool with the same name replaces the earlier one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.schema().name;
        if self.tools.insert(name.clone(), tool).is_none() {
            self.order.push(name);
        }
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all tool schemas, in registration order
    pub fn list_schemas(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.schema())
            .collect()
    }

    /// Check if a tool exists
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Invoke a tool by name.
    ///
    /// Only an unknown name fails; anything the tool itself does wrong comes
    /// back as an error envelope.
    pub async fn call(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<CallToolResult, UnknownTool> {
        let tool = self
            .get(name)
            .ok_or_else(|| UnknownTool(name.to_string()))?;
        Ok(guarded(name, tool, arguments).await)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run one tool and turn every failure into an error envelope.
///
/// The tool runs on its own task so a panic ends up here as well.
pub async fn guarded(
    name: &str,
    tool: Arc<dyn Tool>,
    arguments: serde_json::Value,
) -> CallToolResult {
    let arguments = if arguments.is_null() {
        serde_json::json!({})
    } else {
        arguments
    };

    tracing::debug!(tool = name, "Calling tool");
    let outcome = tokio::spawn(async move { tool.execute(arguments).await }).await;

    match outcome {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => {
            let message = format!("{:#}", e);
            tracing::warn!(tool = name, error = %message, "Tool call failed");
            CallToolResult::error(message)
        }
        Err(e) => {
            tracing::error!(tool = name, error = %e, "Tool call aborted");
            CallToolResult::error(format!("Tool {} aborted: {}", name, e))
        }
    }
}

// Helper functions for creating tool schemas

pub fn json_schema_object(properties: serde_json::Value, required: Vec<&str>) -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

pub fn json_schema_string(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "description": description
    })
}

pub fn json_schema_integer(description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "integer",
        "minimum": 0,
        "description": description
    })
}

pub fn json_schema_enum(values: &[&str], description: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "enum": values,
        "description": description
    })
}

/// Deserialize an optional count such as `page`, `limit` or `scene_id`.
///
/// Accepts any non-negative integer, including integral floats like `5.0`
/// that some clients send for every number.
pub fn optional_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    use serde::Deserialize;

    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Some(count) = number.as_u64() {
        return Ok(Some(count));
    }
    match number.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => Ok(Some(f as u64)),
        _ => Err(D::Error::custom(format!(
            "expected a non-negative integer, got {}",
            number
        ))),
    }
}

// Helper functions for building request paths

/// Encode a single path segment (slugs are passed through otherwise untouched).
pub fn path_segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Encode a subject slug for use as a path segment.
///
/// Empty, `.` and `..` are rejected: percent-encoding leaves dots alone, so
/// they would address a different route once the URL is resolved.
pub fn slug_segment(slug: &str, tool: &str) -> Result<String> {
    anyhow::ensure!(!slug.is_empty(), "Invalid arguments for {}: slug is empty", tool);
    anyhow::ensure!(
        slug != "." && slug != "..",
        "Invalid arguments for {}: slug {:?} is not a subject",
        tool,
        slug
    );
    Ok(path_segment(slug))
}

/// Append the supplied query pairs to `path`. Absent values are left out entirely.
pub fn path_with_query(path: &str, pairs: &[(&str, Option<String>)]) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    let mut any = false;
    for (key, value) in pairs {
        if let Some(value) = value {
            query.append_pair(key, value);
            any = true;
        }
    }

    if any {
        format!("{}?{}", path, query.finish())
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::ToolContent;
    use anyhow::bail;
    use serde_json::json;

    struct EchoTool;

    #[async_trait::async_trait]
    impl Tool for EchoTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "echo".to_string(),
                description: "Echo the arguments".to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, arguments: serde_json::Value) -> Result<CallToolResult> {
            Ok(CallToolResult::json(&arguments))
        }
    }

    struct FailingTool;

    #[async_trait::async_trait]
    impl Tool for FailingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "fail".to_string(),
                description: "Always fails".to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
            bail!("remote went away")
        }
    }

    struct PanickingTool;

    #[async_trait::async_trait]
    impl Tool for PanickingTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "panic".to_string(),
                description: "Panics".to_string(),
                input_schema: json_schema_object(json!({}), vec![]),
            }
        }

        async fn execute(&self, _arguments: serde_json::Value) -> Result<CallToolResult> {
            panic!("boom")
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));
        registry.register(Arc::new(FailingTool));
        registry.register(Arc::new(PanickingTool));
        registry
    }

    #[test]
    fn test_list_schemas_keeps_registration_order() {
        let names: Vec<String> = registry().list_schemas().into_iter().map(|s| s.name).collect();

        assert_eq!(names, vec!["echo", "fail", "panic"]);
    }

    #[test]
    fn test_register_same_name_replaces() {
        let mut registry = registry();
        registry.register(Arc::new(EchoTool));

        assert_eq!(registry.len(), 3);
        assert!(registry.contains("echo"));
    }

    #[tokio::test]
    async fn test_null_arguments_become_empty_object() {
        let result = registry().call("echo", serde_json::Value::Null).await.unwrap();

        assert!(!result.is_error());
        assert_eq!(result.text_content(), "{}");
    }

    #[tokio::test]
    async fn test_error_becomes_envelope() {
        let result = registry().call("fail", json!({})).await.unwrap();

        assert!(result.is_error());
        assert_eq!(result.content.len(), 1);
        match &result.content[0] {
            ToolContent::Text { text } => assert_eq!(text, "Error: remote went away"),
        }
    }

    #[tokio::test]
    async fn test_panic_becomes_envelope() {
        let result = registry().call("panic", json!({})).await.unwrap();

        assert!(result.is_error());
        assert!(result.text_content().contains("panic"));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry().call("nope", json!({})).await.unwrap_err();

        assert_eq!(err.to_string(), "Unknown tool: nope");
    }

    #[test]
    fn test_path_with_query_skips_absent_values() {
        assert_eq!(path_with_query("/people", &[("q", None), ("tag", None)]), "/people");
        assert_eq!(
            path_with_query("/people", &[("q", None), ("tag", Some("Music".to_string()))]),
            "/people?tag=Music"
        );
        assert_eq!(
            path_with_query(
                "/people",
                &[("q", Some("ada lovelace".to_string())), ("page", Some("2".to_string()))]
            ),
            "/people?q=ada+lovelace&page=2"
        );
    }

    #[test]
    fn test_slug_segment_rejects_dot_segments() {
        assert_eq!(slug_segment("ada-lovelace", "t").unwrap(), "ada-lovelace");
        assert_eq!(slug_segment("j.r.r-tolkien", "t").unwrap(), "j.r.r-tolkien");

        for slug in ["", ".", ".."] {
            let err = slug_segment(slug, "get_person").unwrap_err();
            assert!(err.to_string().starts_with("Invalid arguments for get_person"));
        }
    }

    #[derive(Debug, serde::Deserialize)]
    struct Counted {
        #[serde(default, deserialize_with = "optional_count")]
        limit: Option<u64>,
    }

    fn count(arguments: serde_json::Value) -> std::result::Result<Option<u64>, serde_json::Error> {
        serde_json::from_value::<Counted>(arguments).map(|c| c.limit)
    }

    #[test]
    fn test_optional_count_accepts_integers() {
        assert_eq!(count(json!({})).unwrap(), None);
        assert_eq!(count(json!({"limit": null})).unwrap(), None);
        assert_eq!(count(json!({"limit": 0})).unwrap(), Some(0));
        assert_eq!(count(json!({"limit": 5.0})).unwrap(), Some(5));
        assert_eq!(count(json!({"limit": 5_000_000_000u64})).unwrap(), Some(5_000_000_000));
    }

    #[test]
    fn test_optional_count_rejects_fractions_and_negatives() {
        for bad in [json!(5.5), json!(-1), json!(-2.0), json!("5"), json!(true)] {
            assert!(count(json!({ "limit": bad })).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_path_segment_encodes_reserved_characters() {
        assert_eq!(path_segment("ada-lovelace"), "ada-lovelace");
        assert_eq!(path_segment("a/b c"), "a%2Fb%20c");
    }
}
