pub mod assignments;
pub mod people;
pub mod progress;
mod registry;

pub use assignments::{
    CheckConfidenceTool, GetAssignmentTool, ReviewPersonTool, SubmitContributionTool,
};
pub use people::{BrowsePeopleTool, FindNeedsTool, GetPersonTool, Priority};
pub use progress::{ContributionStatus, LeaderboardTool, MyContributionsTool};
pub use registry::{
    guarded, json_schema_enum, json_schema_integer, json_schema_object, json_schema_string,
    optional_count, path_segment, path_with_query, slug_segment, Tool, ToolRegistry, UnknownTool,
};

use biodoc_client::BiodocClient;
use std::sync::Arc;

/// Registry holding every Biodoc tool, all sharing one client.
pub fn biodoc_registry(client: Arc<BiodocClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(GetAssignmentTool::new(client.clone())));
    registry.register(Arc::new(SubmitContributionTool::new(client.clone())));
    registry.register(Arc::new(ReviewPersonTool::new(client.clone())));
    registry.register(Arc::new(BrowsePeopleTool::new(client.clone())));
    registry.register(Arc::new(GetPersonTool::new(client.clone())));
    registry.register(Arc::new(FindNeedsTool::new(client.clone())));
    registry.register(Arc::new(MyContributionsTool::new(client.clone())));
    registry.register(Arc::new(LeaderboardTool::new(client.clone())));
    registry.register(Arc::new(CheckConfidenceTool::new(client)));

    registry
}
