//! Chart-of-Accounts tree builder
//!
//! Builds the account hierarchy from the flat account list. Orphaned
//! parent references and parent cycles never fail the build: the
//! affected node is promoted to a root and a warning is recorded, so
//! every consumer can recurse over the result safely.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::repos::account_repo::{self, Account, AccountError, AccountType};

/// One node of the account hierarchy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountNode {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub name_secondary: Option<String>,
    pub account_type: AccountType,
    pub is_header: bool,
    pub currency: String,
    pub description: Option<String>,
    /// Depth in the tree; roots are level 1, children parent level + 1
    pub level: u32,
    pub children: Vec<AccountNode>,
}

/// Non-fatal findings from a tree build
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeWarning {
    /// parent_account_id references an account that doesn't exist;
    /// the node was promoted to a root
    OrphanParent { code: String, missing_parent_id: Uuid },
    /// the node's parent chain loops back on itself; the cycle was
    /// broken by promoting this node to a root
    ParentCycle { code: String },
}

/// Result of a chart-of-accounts tree build
#[derive(Debug, Clone)]
pub struct CoaTree {
    pub roots: Vec<AccountNode>,
    pub warnings: Vec<TreeWarning>,
}

/// Errors that can occur fetching the account tree
#[derive(Debug, Error)]
pub enum CoaTreeError {
    #[error("Account repository error: {0}")]
    Account(#[from] AccountError),
}

/// Build the account hierarchy from a flat account list
///
/// - accounts with a null parent become roots (level 1)
/// - accounts whose parent exists become its children (level = parent + 1)
/// - accounts whose parent is missing become roots with an `OrphanParent`
///   warning
/// - parent cycles are broken at the member with the smallest code, which
///   becomes a root with a `ParentCycle` warning
/// - siblings (and roots) are sorted by account code ascending
pub fn build_account_tree(accounts: &[Account]) -> CoaTree {
    let index_by_id: HashMap<Uuid, usize> = accounts
        .iter()
        .enumerate()
        .map(|(idx, acc)| (acc.id, idx))
        .collect();

    let mut children_of: HashMap<Uuid, Vec<usize>> = HashMap::new();
    let mut root_indices: Vec<usize> = Vec::new();
    let mut warnings: Vec<TreeWarning> = Vec::new();

    for (idx, account) in accounts.iter().enumerate() {
        match account.parent_account_id {
            None => root_indices.push(idx),
            Some(parent_id) if index_by_id.contains_key(&parent_id) => {
                children_of.entry(parent_id).or_default().push(idx);
            }
            Some(parent_id) => {
                warnings.push(TreeWarning::OrphanParent {
                    code: account.code.clone(),
                    missing_parent_id: parent_id,
                });
                root_indices.push(idx);
            }
        }
    }

    let mut visited = vec![false; accounts.len()];
    let mut roots: Vec<AccountNode> = root_indices
        .iter()
        .map(|&idx| build_node(idx, 1, accounts, &children_of, &mut visited))
        .collect();

    // Anything still unvisited sits on a parent cycle: no root can reach
    // it. Break each cycle at its smallest code and keep going.
    while let Some(idx) = smallest_unvisited(accounts, &visited) {
        warnings.push(TreeWarning::ParentCycle {
            code: accounts[idx].code.clone(),
        });
        roots.push(build_node(idx, 1, accounts, &children_of, &mut visited));
    }

    roots.sort_by(|a, b| a.code.cmp(&b.code));

    CoaTree { roots, warnings }
}

fn build_node(
    idx: usize,
    level: u32,
    accounts: &[Account],
    children_of: &HashMap<Uuid, Vec<usize>>,
    visited: &mut Vec<bool>,
) -> AccountNode {
    visited[idx] = true;
    let account = &accounts[idx];

    let child_indices: Vec<usize> = children_of
        .get(&account.id)
        .map(|indices| indices.iter().filter(|&&child| !visited[child]).copied().collect())
        .unwrap_or_default();

    let mut children: Vec<AccountNode> = child_indices
        .into_iter()
        .map(|child| build_node(child, level + 1, accounts, children_of, visited))
        .collect();

    children.sort_by(|a, b| a.code.cmp(&b.code));

    AccountNode {
        id: account.id,
        code: account.code.clone(),
        name: account.name.clone(),
        name_secondary: account.name_secondary.clone(),
        account_type: account.account_type,
        is_header: account.is_header,
        currency: account.currency.clone(),
        description: account.description.clone(),
        level,
        children,
    }
}

fn smallest_unvisited(accounts: &[Account], visited: &[bool]) -> Option<usize> {
    accounts
        .iter()
        .enumerate()
        .filter(|&(idx, _)| !visited[idx])
        .min_by(|(_, a), (_, b)| a.code.cmp(&b.code))
        .map(|(idx, _)| idx)
}

/// Fetch the active chart of accounts and build its hierarchy
pub async fn get_account_tree(pool: &PgPool) -> Result<CoaTree, CoaTreeError> {
    let accounts = account_repo::list_active(pool).await?;
    let tree = build_account_tree(&accounts);

    for warning in &tree.warnings {
        match warning {
            TreeWarning::OrphanParent {
                code,
                missing_parent_id,
            } => tracing::warn!(
                account_code = %code,
                missing_parent_id = %missing_parent_id,
                "Account references a missing parent; treated as root"
            ),
            TreeWarning::ParentCycle { code } => tracing::warn!(
                account_code = %code,
                "Parent cycle detected in chart of accounts; broken at this account"
            ),
        }
    }

    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(id: u128, code: &str, parent: Option<u128>) -> Account {
        Account {
            id: Uuid::from_u128(id),
            code: code.to_string(),
            name: format!("Account {code}"),
            name_secondary: None,
            account_type: AccountType::Asset,
            parent_account_id: parent.map(Uuid::from_u128),
            is_header: false,
            is_active: true,
            currency: "USD".to_string(),
            description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_three_level_chain() {
        let accounts = vec![
            account(1, "1", None),
            account(2, "11", Some(1)),
            account(3, "1101", Some(2)),
        ];

        let tree = build_account_tree(&accounts);

        assert!(tree.warnings.is_empty());
        assert_eq!(tree.roots.len(), 1);
        let root = &tree.roots[0];
        assert_eq!(root.code, "1");
        assert_eq!(root.level, 1);
        assert_eq!(root.children[0].code, "11");
        assert_eq!(root.children[0].level, 2);
        assert_eq!(root.children[0].children[0].code, "1101");
        assert_eq!(root.children[0].children[0].level, 3);
    }

    #[test]
    fn test_orphan_promoted_to_root() {
        let accounts = vec![account(1, "1", None), account(2, "21", Some(99))];

        let tree = build_account_tree(&accounts);

        assert_eq!(tree.roots.len(), 2);
        assert_eq!(
            tree.warnings,
            vec![TreeWarning::OrphanParent {
                code: "21".to_string(),
                missing_parent_id: Uuid::from_u128(99),
            }]
        );
        assert!(tree.roots.iter().all(|r| r.level == 1));
    }

    #[test]
    fn test_sibling_ordering() {
        let accounts = vec![
            account(1, "1", None),
            account(4, "13", Some(1)),
            account(2, "11", Some(1)),
            account(3, "12", Some(1)),
        ];

        let tree = build_account_tree(&accounts);

        let codes: Vec<&str> = tree.roots[0]
            .children
            .iter()
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(codes, vec!["11", "12", "13"]);
    }

    #[test]
    fn test_cycle_is_broken_not_looped() {
        // 2 -> 3 -> 2 is a cycle unreachable from any root
        let accounts = vec![
            account(1, "1", None),
            account(2, "20", Some(3)),
            account(3, "30", Some(2)),
        ];

        let tree = build_account_tree(&accounts);

        assert_eq!(tree.roots.len(), 2);
        assert_eq!(
            tree.warnings,
            vec![TreeWarning::ParentCycle {
                code: "20".to_string()
            }]
        );
        // the promoted cycle member keeps its surviving child edge
        let cycle_root = tree.roots.iter().find(|r| r.code == "20").unwrap();
        assert_eq!(cycle_root.level, 1);
        assert_eq!(cycle_root.children.len(), 1);
        assert_eq!(cycle_root.children[0].code, "30");
        assert_eq!(cycle_root.children[0].level, 2);
        assert!(cycle_root.children[0].children.is_empty());
    }

    #[test]
    fn test_levels_match_parent_plus_one() {
        let accounts = vec![
            account(1, "1", None),
            account(2, "11", Some(1)),
            account(3, "12", Some(1)),
            account(4, "1201", Some(3)),
            account(5, "2", None),
        ];

        let tree = build_account_tree(&accounts);

        fn assert_levels(node: &AccountNode) {
            for child in &node.children {
                assert_eq!(child.level, node.level + 1);
                assert_levels(child);
            }
        }
        for root in &tree.roots {
            assert_eq!(root.level, 1);
            assert_levels(root);
        }
    }

    #[test]
    fn test_empty_input() {
        let tree = build_account_tree(&[]);
        assert!(tree.roots.is_empty());
        assert!(tree.warnings.is_empty());
    }
}
