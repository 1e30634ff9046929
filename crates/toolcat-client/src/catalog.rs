use toolcat_core::ToolRecord;
use tracing::info;

use crate::{ApiClient, ApiError};

/// Tools fetched from the API plus the record picked for editing.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: Vec<ToolRecord>,
    selected: Option<ToolRecord>,
}

impl Catalog {
    pub fn new(tools: Vec<ToolRecord>) -> Self {
        Self {
            tools,
            selected: None,
        }
    }

    pub fn tools(&self) -> &[ToolRecord] {
        &self.tools
    }

    pub fn selected(&self) -> Option<&ToolRecord> {
        self.selected.as_ref()
    }

    pub fn select(&mut self, tool: Option<ToolRecord>) {
        self.selected = tool;
    }

    /// Select the fetched record with `id`; returns false when none matches.
    pub fn select_by_id(&mut self, id: &str) -> bool {
        self.selected = self.find(id).cloned();
        self.selected.is_some()
    }

    pub fn find(&self, id: &str) -> Option<&ToolRecord> {
        self.tools.iter().find(|t| t.id.as_deref() == Some(id))
    }

    pub fn search(&self, query: &str) -> Vec<&ToolRecord> {
        self.tools.iter().filter(|t| t.matches_query(query)).collect()
    }

    /// Replace the list with a fresh fetch. On failure the previous list stays.
    pub async fn refresh(&mut self, client: &ApiClient) -> Result<usize, ApiError> {
        let tools = client.list_tools().await?;
        info!(count = tools.len(), "loaded tools from API");
        self.tools = tools;
        Ok(self.tools.len())
    }

    pub async fn delete(&mut self, client: &ApiClient, id: &str) -> Result<(), ApiError> {
        client.delete_tool(id).await?;
        self.tools.retain(|t| t.id.as_deref() != Some(id));
        if self.selected.as_ref().and_then(|t| t.id.as_deref()) == Some(id) {
            self.selected = None;
        }
        info!(id, "deleted tool");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{spawn, MockApi};
    use crate::ClientConfig;

    fn tool(id: &str, title: &str) -> ToolRecord {
        ToolRecord {
            id: Some(id.to_string()),
            title: title.to_string(),
            ..ToolRecord::default()
        }
    }

    #[test]
    fn select_by_id_uses_fetched_list() {
        let mut catalog = Catalog::new(vec![tool("a", "Alpha"), tool("b", "Beta")]);
        assert!(catalog.select_by_id("b"));
        assert_eq!(catalog.selected().unwrap().title, "Beta");
        assert!(!catalog.select_by_id("zzz"));
        assert!(catalog.selected().is_none());
    }

    #[test]
    fn search_filters_in_order() {
        let catalog = Catalog::new(vec![tool("a", "Chat Alpha"), tool("b", "Beta"), tool("c", "chat gamma")]);
        let titles: Vec<_> = catalog.search("CHAT").iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Chat Alpha", "chat gamma"]);
    }

    #[tokio::test]
    async fn refresh_then_delete_updates_local_list() {
        let api = MockApi::default();
        let base = spawn(api.clone()).await;
        let client = ApiClient::new(&ClientConfig::with_api_url(base)).unwrap();

        let mut catalog = Catalog::default();
        assert_eq!(catalog.refresh(&client).await.unwrap(), 2);
        catalog.select_by_id("t1");

        catalog.delete(&client, "t1").await.unwrap();
        assert_eq!(catalog.tools().len(), 1);
        assert_eq!(catalog.tools()[0].id.as_deref(), Some("t2"));
        assert!(catalog.selected().is_none());
        assert_eq!(api.recorded()[1].path, "/delete/t1");
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_list() {
        let api = MockApi {
            fail_status: Some(503),
            ..MockApi::default()
        };
        let base = spawn(api).await;
        let client = ApiClient::new(&ClientConfig::with_api_url(base)).unwrap();

        let mut catalog = Catalog::new(vec![tool("x", "Existing")]);
        assert!(catalog.refresh(&client).await.is_err());
        assert_eq!(catalog.tools().len(), 1);
    }
}
