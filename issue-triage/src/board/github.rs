//! GitHub Projects (v2) board over GraphQL.

use super::{BoardError, BoardItem, ProjectBoard};
use crate::config::BoardSettings;
use crate::repository::Repository;
use async_trait::async_trait;
use octocrab::Octocrab;
use serde_json::{json, Value};
use tracing::{debug, info_span, Instrument};

const LIST_ITEMS_QUERY: &str = r"
query($owner: String!, $number: Int!, $cursor: String) {
  owner: __OWNER_FIELD__(login: $owner) {
    projectV2(number: $number) {
      items(first: 100, after: $cursor) {
        pageInfo { hasNextPage endCursor }
        nodes {
          id
          content {
            ... on Issue { number repository { nameWithOwner } }
          }
        }
      }
    }
  }
}";

const ADD_ITEM_MUTATION: &str = r"
mutation($project: ID!, $content: ID!) {
  addProjectV2ItemById(input: {projectId: $project, contentId: $content}) {
    item { id }
  }
}";

const SET_STATUS_MUTATION: &str = r"
mutation($project: ID!, $item: ID!, $field: ID!, $option: String!) {
  updateProjectV2ItemFieldValue(
    input: {projectId: $project, itemId: $item, fieldId: $field, value: {singleSelectOptionId: $option}}
  ) {
    projectV2Item { id }
  }
}";

/// Project board backed by the GitHub GraphQL API.
#[derive(Debug, Clone)]
pub struct GitHubProjectBoard {
    octocrab: Octocrab,
    owner: String,
    settings: BoardSettings,
}

impl GitHubProjectBoard {
    /// Creates a board for the project owned by `owner`.
    pub fn new(octocrab: Octocrab, owner: impl Into<String>, settings: BoardSettings) -> Self {
        Self {
            octocrab,
            owner: owner.into(),
            settings,
        }
    }

    async fn execute(&self, query: &str, variables: Value) -> Result<Value, BoardError> {
        let payload = json!({ "query": query, "variables": variables });
        let response: Value = self.octocrab.graphql(&payload).await?;
        check_errors(&response)?;
        Ok(response)
    }
}

/// Fails on a non-empty `errors` array.
fn check_errors(response: &Value) -> Result<(), BoardError> {
    match response.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => {
            let messages: Vec<&str> = errors
                .iter()
                .map(|e| e.get("message").and_then(Value::as_str).unwrap_or("unknown error"))
                .collect();
            Err(BoardError::GraphQl(messages.join("; ")))
        }
        _ => Ok(()),
    }
}

/// One page of items: the parsed items and the cursor of the next page.
fn parse_items_page(response: &Value) -> Result<(Vec<BoardItem>, Option<String>), BoardError> {
    let items = response
        .pointer("/data/owner/projectV2/items")
        .ok_or_else(|| BoardError::Malformed("missing project items".to_string()))?;

    let nodes = items
        .get("nodes")
        .and_then(Value::as_array)
        .ok_or_else(|| BoardError::Malformed("missing item nodes".to_string()))?;

    // Draft issues and pull requests have no issue number; they are skipped.
    let parsed = nodes
        .iter()
        .filter_map(|node| {
            Some(BoardItem {
                item_id: node.get("id")?.as_str()?.to_string(),
                issue_number: node.pointer("/content/number")?.as_u64()?,
                repository: node
                    .pointer("/content/repository/nameWithOwner")?
                    .as_str()?
                    .to_string(),
            })
        })
        .collect();

    let has_next = items
        .pointer("/pageInfo/hasNextPage")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let cursor = items
        .pointer("/pageInfo/endCursor")
        .and_then(Value::as_str)
        .filter(|_| has_next)
        .map(str::to_string);

    Ok((parsed, cursor))
}

#[async_trait]
impl ProjectBoard for GitHubProjectBoard {
    async fn list_items(&self) -> Result<Vec<BoardItem>, BoardError> {
        let span = info_span!("list_board_items", project = self.settings.project_number);
        async {
            let query =
                LIST_ITEMS_QUERY.replace("__OWNER_FIELD__", self.settings.owner_kind.graphql_field());
            let mut items = Vec::new();
            let mut cursor: Option<String> = None;

            loop {
                let variables = json!({
                    "owner": self.owner,
                    "number": self.settings.project_number,
                    "cursor": cursor,
                });
                let response = self.execute(&query, variables).await?;
                let (page, next) = parse_items_page(&response)?;
                items.extend(page);
                match next {
                    Some(next) => cursor = Some(next),
                    None => break,
                }
            }

            debug!(count = items.len(), "Listed board items");
            Ok(items)
        }
        .instrument(span)
        .await
    }

    async fn add_item(&self, repository: &Repository, number: u64) -> Result<String, BoardError> {
        let issue = self
            .octocrab
            .issues(&repository.owner, &repository.name)
            .get(number)
            .await?;

        let variables = json!({
            "project": self.settings.project_id,
            "content": issue.node_id,
        });
        let response = self.execute(ADD_ITEM_MUTATION, variables).await?;

        response
            .pointer("/data/addProjectV2ItemById/item/id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BoardError::Malformed("add item returned no id".to_string()))
    }

    async fn set_status(&self, item_id: &str, option_id: &str) -> Result<(), BoardError> {
        let variables = json!({
            "project": self.settings.project_id,
            "item": item_id,
            "field": self.settings.status_field_id,
            "option": option_id,
        });
        let response = self.execute(SET_STATUS_MUTATION, variables).await?;

        response
            .pointer("/data/updateProjectV2ItemFieldValue/projectV2Item/id")
            .and_then(Value::as_str)
            .map(|_| ())
            .ok_or_else(|| BoardError::Malformed("status update returned no item".to_string()))
    }
}
