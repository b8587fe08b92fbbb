//! Generic, shared registries for tools, resources, prompts and roots, each
//! broadcasting a `notifications/*/list_changed` message through a
//! [`ConnectionManager`] whenever their contents change.
//!
//! `Tool`, `Resource` and `Prompt` are all keyed by a plain `String` `name`,
//! but `Root::name` is `Option<String>` — rather than requiring a `Named`
//! trait every item type would need to implement differently, callers pass
//! the key explicitly at `register`/`unregister` time. Roots are keyed by
//! `uri`.

use std::collections::HashMap;
use std::sync::Arc;

use mcprt_core::protocol::jsonrpc::JsonRpcRequest;
use mcprt_core::protocol::JsonRpcMessage;
use mcprt_core::types::resources::ResourceTemplate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::connection_manager::ConnectionManager;

/// A keyed collection of items of type `T`, with change notifications.
pub struct Registry<T: Clone + Send + Sync> {
    items: RwLock<HashMap<String, T>>,
    notification_method: &'static str,
}

impl<T: Clone + Send + Sync> Registry<T> {
    pub fn new(notification_method: &'static str) -> Self {
        Self {
            items: RwLock::new(HashMap::new()),
            notification_method,
        }
    }

    /// Insert or replace `item` under `key`, then broadcast a
    /// `list_changed` notification over `connections`.
    pub async fn register(&self, key: String, item: T, connections: &ConnectionManager) {
        self.items.write().await.insert(key, item);
        self.announce(connections).await;
    }

    /// Same as [`Registry::register`] but returns `true` if `key` already
    /// existed (useful for duplicate-registration checks upstream).
    pub async fn register_checked(&self, key: String, item: T, connections: &ConnectionManager) -> bool {
        let existed = self.items.write().await.insert(key, item).is_some();
        self.announce(connections).await;
        existed
    }

    pub async fn unregister(&self, key: &str, connections: &ConnectionManager) -> Option<T> {
        let removed = self.items.write().await.remove(key);
        if removed.is_some() {
            self.announce(connections).await;
        }
        removed
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        self.items.read().await.get(key).cloned()
    }

    pub async fn contains(&self, key: &str) -> bool {
        self.items.read().await.contains_key(key)
    }

    pub async fn list(&self) -> Vec<T> {
        self.items.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    async fn announce(&self, connections: &ConnectionManager) {
        debug!(method = self.notification_method, "broadcasting list_changed");
        let notification = JsonRpcRequest::notification(self.notification_method.to_string(), None);
        connections.broadcast(JsonRpcMessage::Notification(notification)).await;
    }
}

/// Matches a concrete URI against a set of registered [`ResourceTemplate`]s,
/// recovering the variable bindings that would reproduce it via
/// `ResourceTemplate::expand`. `ResourceTemplate` only supports the forward
/// direction (template + variables -> URI); this builds the inverse lookup
/// resource reads need to resolve a URI back to whichever template (if any)
/// produced its shape.
pub struct TemplateMatcher {
    templates: RwLock<Vec<ResourceTemplate>>,
}

/// The result of successfully matching a URI against a registered template.
#[derive(Debug, Clone)]
pub struct TemplateMatch {
    pub template: ResourceTemplate,
    pub variables: HashMap<String, String>,
}

impl TemplateMatcher {
    pub fn new() -> Self {
        Self {
            templates: RwLock::new(Vec::new()),
        }
    }

    pub async fn register(&self, template: ResourceTemplate) {
        self.templates.write().await.push(template);
    }

    pub async fn list(&self) -> Vec<ResourceTemplate> {
        self.templates.read().await.clone()
    }

    pub async fn clear(&self) {
        self.templates.write().await.clear();
    }

    /// Find the first registered template whose shape matches `uri`,
    /// returning the variable bindings that produced it.
    pub async fn match_uri(&self, uri: &str) -> Option<TemplateMatch> {
        for template in self.templates.read().await.iter() {
            if let Some(variables) = match_template(&template.uri_template, uri) {
                return Some(TemplateMatch {
                    template: template.clone(),
                    variables,
                });
            }
        }
        None
    }
}

impl Default for TemplateMatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Converts an RFC 6570-style template (`{var}` placeholders only, the
/// subset `ResourceTemplate::parse_variables` itself understands) into an
/// anchored regex with one named capture group per variable, then matches
/// it against `uri`.
fn match_template(template: &str, uri: &str) -> Option<HashMap<String, String>> {
    let mut pattern = String::from("^");
    let mut var_names = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        pattern.push_str(&regex::escape(&rest[..start]));
        let after = &rest[start + 1..];
        let end = after.find('}')?;
        let var_name = after[..end].trim().to_string();
        pattern.push_str(&format!("(?P<{}>[^/]+)", sanitize_group_name(&var_name)));
        var_names.push(var_name);
        rest = &after[end + 1..];
    }
    pattern.push_str(&regex::escape(rest));
    pattern.push('$');

    let re = regex::Regex::new(&pattern).ok()?;
    let caps = re.captures(uri)?;

    let mut variables = HashMap::new();
    for name in &var_names {
        let group = sanitize_group_name(name);
        if let Some(value) = caps.name(&group) {
            variables.insert(name.clone(), value.as_str().to_string());
        }
    }
    Some(variables)
}

/// Regex named capture groups only allow `[a-zA-Z_][a-zA-Z0-9_]*`; template
/// variable names are validated elsewhere to match that already, but this
/// keeps `match_template` safe even against a template that skipped
/// validation.
fn sanitize_group_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcprt_core::types::tools::Tool;
    use std::time::Duration;

    fn new_manager() -> ConnectionManager {
        ConnectionManager::new(16, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn register_and_list_round_trips() {
        let registry: Registry<Tool> = Registry::new("notifications/tools/list_changed");
        let manager = new_manager();
        let tool = Tool {
            name: "echo".to_string(),
            description: "echoes input".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
            output_schema: None,
            annotations: None,
        };
        registry.register("echo".to_string(), tool.clone(), &manager).await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.contains("echo").await);
        let listed = registry.get("echo").await.unwrap();
        assert_eq!(listed.name, "echo");
    }

    #[tokio::test]
    async fn unregister_removes_the_item() {
        let registry: Registry<Tool> = Registry::new("notifications/tools/list_changed");
        let manager = new_manager();
        let tool = Tool {
            name: "echo".to_string(),
            description: "echoes input".to_string(),
            input_schema: serde_json::json!({"type": "object"}),
            output_schema: None,
            annotations: None,
        };
        registry.register("echo".to_string(), tool, &manager).await;
        let removed = registry.unregister("echo", &manager).await;
        assert!(removed.is_some());
        assert!(registry.is_empty().await);
    }

    #[test]
    fn matches_a_single_variable_template() {
        let bindings = match_template("file:///{path}", "file:///tmp/a.txt").unwrap();
        assert_eq!(bindings.get("path").unwrap(), "tmp");
    }

    #[test]
    fn matches_multiple_variables() {
        let bindings = match_template("repo://{owner}/{name}/issues/{id}", "repo://acme/widgets/issues/42").unwrap();
        assert_eq!(bindings.get("owner").unwrap(), "acme");
        assert_eq!(bindings.get("name").unwrap(), "widgets");
        assert_eq!(bindings.get("id").unwrap(), "42");
    }

    #[test]
    fn rejects_a_non_matching_uri() {
        assert!(match_template("repo://{owner}/{name}", "nope://acme/widgets").is_none());
    }

    #[tokio::test]
    async fn template_matcher_finds_the_first_match() {
        let matcher = TemplateMatcher::new();
        matcher
            .register(ResourceTemplate {
                uri_template: "repo://{owner}/{name}".to_string(),
                name: "repo".to_string(),
                description: None,
                mime_type: None,
            })
            .await;
        let found = matcher.match_uri("repo://acme/widgets").await.unwrap();
        assert_eq!(found.variables.get("owner").unwrap(), "acme");
    }
}
