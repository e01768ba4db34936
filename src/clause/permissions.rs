//! `permissions` clause: match objects a set of users can access at a given level
//!
//! Permission entries live in the nested `userPermissions` collection, each with a
//! zone-qualified `user` (`alice#iplant`) and a `permission` of read, write or own.
//!
//! Users that already carry a zone are matched verbatim with one `terms` query;
//! bare users are matched in any zone with one `alice#*` wildcard each. With
//! `exact` set every user is matched verbatim. The permission filter depends on
//! the level and on `permission_recurse`:
//!
//! | permission | recurse | levels matched      |
//! |------------|---------|---------------------|
//! | read       | false   | read                |
//! | read       | true    | any (no filter)     |
//! | write      | false   | write               |
//! | write      | true    | write, own          |
//! | own        | either  | own                 |

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::clause::utils::{decode_args, USER_DELIMITER};
use crate::dsl::{ClauseArgs, ClauseDocumentation, ClauseRegistry};
use crate::error::{QueryDslError, Result};
use crate::query::{
    BackendQuery, BoolQuery, MinimumShouldMatch, NestedQuery, TermQuery, TermsQuery,
    WildcardQuery,
};

pub const TYPE_KEY: &str = "permissions";

pub const PERMISSIONS_PATH: &str = "userPermissions";
pub const USER_FIELD: &str = "userPermissions.user";
pub const PERMISSION_FIELD: &str = "userPermissions.permission";

/// Access level recorded on a permission entry
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Permission {
    Read,
    Write,
    Own,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
            Permission::Own => "own",
        }
    }

    /// Levels an entry may hold to satisfy this permission
    ///
    /// `None` means any level satisfies it and no permission filter is needed.
    pub fn required_levels(&self, recurse: bool) -> Option<Vec<Permission>> {
        match (self, recurse) {
            (Permission::Own, _) => Some(vec![Permission::Own]),
            (Permission::Write, true) => Some(vec![Permission::Write, Permission::Own]),
            (Permission::Read, true) => None,
            (level, false) => Some(vec![*level]),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = QueryDslError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "read" => Ok(Permission::Read),
            "write" => Ok(Permission::Write),
            "own" => Ok(Permission::Own),
            "" => Err(QueryDslError::InvalidArguments(
                "no permission was passed, expected one of read, write or own".to_string(),
            )),
            other => Err(QueryDslError::InvalidArguments(format!(
                "unknown permission {:?}, expected one of read, write or own",
                other
            ))),
        }
    }
}

/// Users split by how they are matched
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UserPartition {
    /// Matched verbatim
    pub exact: Vec<String>,
    /// Wildcard patterns matching a bare user in any zone
    pub wildcard: Vec<String>,
}

/// Split users into verbatim matches and any-zone wildcard patterns
pub fn partition_users(users: &[String], exact: bool) -> UserPartition {
    let mut partition = UserPartition::default();
    for user in users {
        if exact || user.contains(USER_DELIMITER) {
            partition.exact.push(user.clone());
        } else {
            partition
                .wildcard
                .push(format!("{}{}*", user, USER_DELIMITER));
        }
    }
    partition
}

/// Reject an empty user list and blank user names
///
/// A blank name would become the pattern `#*` and match every user.
fn check_users(users: &[String]) -> Result<()> {
    if users.is_empty() {
        return Err(QueryDslError::InvalidRequest(
            "no users were passed, cannot create clause".to_string(),
        ));
    }
    if users.iter().any(|user| user.trim().is_empty()) {
        return Err(QueryDslError::InvalidArguments(
            "users may not contain an empty name".to_string(),
        ));
    }
    Ok(())
}

/// Build the nested permission query
pub fn permission_query(
    users: &[String],
    permission: Permission,
    recurse: bool,
    exact: bool,
) -> Result<NestedQuery> {
    check_users(users)?;

    let partition = partition_users(users, exact);
    let mut user_clauses: Vec<BackendQuery> = Vec::new();
    if !partition.exact.is_empty() {
        user_clauses.push(Box::new(TermsQuery::new(USER_FIELD, partition.exact)));
    }
    for pattern in partition.wildcard {
        user_clauses.push(Box::new(WildcardQuery::new(USER_FIELD, pattern)));
    }

    let user_match: Option<BackendQuery> = if user_clauses.len() > 1 {
        let any_user = user_clauses
            .into_iter()
            .fold(BoolQuery::new(), |query, clause| query.should_boxed(clause))
            .with_minimum_should_match(MinimumShouldMatch::Count(1));
        Some(Box::new(any_user))
    } else {
        user_clauses.pop()
    };

    let levels = permission.required_levels(recurse);
    let permission_match: Option<BackendQuery> = levels.map(|levels| match levels.as_slice() {
        [single] => Box::new(TermQuery::new(PERMISSION_FIELD, single.as_str())) as BackendQuery,
        many => Box::new(TermsQuery::new(
            PERMISSION_FIELD,
            many.iter().map(|level| level.as_str().to_string()).collect(),
        )),
    });

    trace!(
        %permission,
        recurse,
        exact,
        filtered = permission_match.is_some(),
        "built permission query"
    );

    let inner = permission_match
        .into_iter()
        .chain(user_match)
        .fold(BoolQuery::new(), |query, clause| query.must_boxed(clause));

    Ok(NestedQuery::new(PERMISSIONS_PATH, inner))
}

#[derive(Debug, Deserialize)]
struct PermissionsArgs {
    users: Vec<String>,
    #[serde(default)]
    permission: String,
    #[serde(default, alias = "permissionRecurse")]
    permission_recurse: bool,
    #[serde(default)]
    exact: bool,
}

impl PermissionsArgs {
    fn decode(cancel: &CancellationToken, args: &ClauseArgs) -> Result<(Self, Permission)> {
        let decoded: PermissionsArgs = decode_args(cancel, args)?;
        let permission: Permission = decoded.permission.parse()?;
        Ok((decoded, permission))
    }
}

pub fn documentation() -> ClauseDocumentation {
    ClauseDocumentation::new("Searches for objects that one or more users hold a given permission on")
        .arg(
            "users",
            "[]string",
            "The users to check, either bare (any zone) or qualified as user#zone",
        )
        .arg("permission", "string", "The permission level: read, write or own")
        .arg(
            "permission_recurse",
            "bool",
            "Whether higher levels also satisfy the requested one (write also matches own, read matches anything)",
        )
        .arg(
            "exact",
            "bool",
            "Match every user verbatim instead of adding an implicit zone wildcard",
        )
}

pub fn process(cancel: &CancellationToken, args: &ClauseArgs) -> Result<BackendQuery> {
    let (args, permission) = PermissionsArgs::decode(cancel, args)?;
    let query = permission_query(&args.users, permission, args.permission_recurse, args.exact)?;
    Ok(Box::new(query))
}

pub fn summarize(cancel: &CancellationToken, args: &ClauseArgs) -> Result<String> {
    let (args, permission) = PermissionsArgs::decode(cancel, args)?;
    check_users(&args.users)?;

    let op = if args.exact { '=' } else { '~' };
    let recurse = if args.permission_recurse { "+" } else { "" };
    Ok(format!(
        "permission{}{}{}[{}]",
        op,
        permission,
        recurse,
        args.users.join(",")
    ))
}

pub fn register(registry: &mut ClauseRegistry) {
    registry.register_summarized(TYPE_KEY, process, documentation(), summarize);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::QueryNode;
    use serde_json::{json, Value};

    fn args(value: Value) -> ClauseArgs {
        value.as_object().cloned().unwrap_or_default()
    }

    fn users(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_required_levels() {
        assert_eq!(Permission::Own.required_levels(false), Some(vec![Permission::Own]));
        assert_eq!(Permission::Own.required_levels(true), Some(vec![Permission::Own]));
        assert_eq!(
            Permission::Write.required_levels(true),
            Some(vec![Permission::Write, Permission::Own])
        );
        assert_eq!(Permission::Write.required_levels(false), Some(vec![Permission::Write]));
        assert_eq!(Permission::Read.required_levels(false), Some(vec![Permission::Read]));
        assert_eq!(Permission::Read.required_levels(true), None);
    }

    #[test]
    fn test_parse_permission() {
        assert_eq!("write".parse::<Permission>().unwrap(), Permission::Write);
        assert!("".parse::<Permission>().is_err());
        assert!("admin".parse::<Permission>().is_err());
    }

    #[test]
    fn test_partition_users() {
        let partition = partition_users(&users(&["mian#foo", "mian"]), false);
        assert_eq!(partition.exact, vec!["mian#foo"]);
        assert_eq!(partition.wildcard, vec!["mian#*"]);

        let partition = partition_users(&users(&["mian", "ipctest#z"]), true);
        assert_eq!(partition.exact, vec!["mian", "ipctest#z"]);
        assert!(partition.wildcard.is_empty());
    }

    #[test]
    fn test_single_bare_user_own() {
        let query = permission_query(&users(&["alice"]), Permission::Own, false, false).unwrap();
        assert_eq!(
            query.source(),
            json!({
                "nested": {
                    "path": "userPermissions",
                    "query": { "bool": { "must": [
                        { "term": { "userPermissions.permission": "own" } },
                        { "wildcard": { "userPermissions.user": { "wildcard": "alice#*" } } }
                    ] } }
                }
            })
        );
    }

    #[test]
    fn test_qualified_user_is_exact() {
        let query =
            permission_query(&users(&["alice#zoneA"]), Permission::Own, false, false).unwrap();
        assert_eq!(
            query.source()["nested"]["query"]["bool"]["must"][1],
            json!({ "terms": { "userPermissions.user": ["alice#zoneA"] } })
        );
    }

    #[test]
    fn test_exact_flag_skips_wildcards() {
        let query = permission_query(&users(&["mian"]), Permission::Own, false, true).unwrap();
        assert_eq!(
            query.source()["nested"]["query"]["bool"]["must"][1],
            json!({ "terms": { "userPermissions.user": ["mian"] } })
        );
    }

    #[test]
    fn test_write_recursive_mixed_users() {
        let query =
            permission_query(&users(&["alice", "bob#z"]), Permission::Write, true, false).unwrap();
        assert_eq!(
            query.source()["nested"]["query"]["bool"]["must"],
            json!([
                { "terms": { "userPermissions.permission": ["write", "own"] } },
                { "bool": {
                    "should": [
                        { "terms": { "userPermissions.user": ["bob#z"] } },
                        { "wildcard": { "userPermissions.user": { "wildcard": "alice#*" } } }
                    ],
                    "minimum_should_match": 1
                } }
            ])
        );
    }

    #[test]
    fn test_read_recursive_has_no_permission_filter() {
        let query = permission_query(&users(&["alice"]), Permission::Read, true, false).unwrap();
        assert_eq!(
            query.source()["nested"]["query"]["bool"]["must"],
            json!([{ "wildcard": { "userPermissions.user": { "wildcard": "alice#*" } } }])
        );
    }

    #[test]
    fn test_processor_validation() {
        let cancel = CancellationToken::new();
        let failing = [
            json!({ "users": [666], "permission": "own" }),
            json!({ "users": 444, "permission": "own" }),
            json!({ "permission": "own" }),
            json!({ "users": [], "permission": "own" }),
            json!({ "users": ["mian"] }),
            json!({ "users": ["mian"], "permission": "admin" }),
        ];
        for case in failing {
            assert!(process(&cancel, &args(case.clone())).is_err(), "expected {} to fail", case);
        }

        let query = process(
            &cancel,
            &args(json!({ "users": ["ipctest", "mian"], "permission": "own" })),
        )
        .unwrap();
        assert_eq!(query.query_type(), "nested");
    }

    #[test]
    fn test_blank_user_names_rejected() {
        let cancel = CancellationToken::new();
        for users in [json!([""]), json!(["alice", "  "])] {
            let err = process(&cancel, &args(json!({ "users": users, "permission": "read" })))
                .unwrap_err();
            assert!(matches!(err, QueryDslError::InvalidArguments(_)), "got {:?}", err);
        }

        assert!(permission_query(&users(&[""]), Permission::Read, false, false).is_err());
        assert!(summarize(&cancel, &args(json!({ "users": [""], "permission": "own" }))).is_err());
    }

    #[test]
    fn test_camel_case_recurse_alias() {
        let cancel = CancellationToken::new();
        let query = process(
            &cancel,
            &args(json!({ "users": ["a"], "permission": "read", "permissionRecurse": true })),
        )
        .unwrap();
        assert_eq!(query.source()["nested"]["query"]["bool"]["must"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_summary() {
        let cancel = CancellationToken::new();
        assert_eq!(
            summarize(
                &cancel,
                &args(json!({
                    "users": ["alice", "bob#z"],
                    "permission": "write",
                    "permission_recurse": true
                }))
            )
            .unwrap(),
            "permission~write+[alice,bob#z]"
        );
        assert_eq!(
            summarize(
                &cancel,
                &args(json!({ "users": ["alice"], "permission": "own", "exact": true }))
            )
            .unwrap(),
            "permission=own[alice]"
        );
        assert!(summarize(&cancel, &args(json!({ "users": [], "permission": "own" }))).is_err());
    }
}
