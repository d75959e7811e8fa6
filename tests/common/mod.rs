//! Shared fixtures for integration tests.

use std::sync::Arc;

use chain_router::config::{build_endpoints, parse_config, Endpoints};
use chain_router::router::{Chain, ChainSet, ParamSchema, Token};

/// Typed record for the user-group scenario.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GroupParams {
    pub tp: String,
    pub gid: u64,
    pub status: String,
    pub id: i32,
}

pub fn group_schema() -> Arc<ParamSchema<GroupParams>> {
    Arc::new(
        ParamSchema::new("GroupParams")
            .string("Tp", |p: &mut GroupParams, v| p.tp = v)
            .integer("GID", |p: &mut GroupParams, v: u64| p.gid = v)
            .string("Status", |p: &mut GroupParams, v| p.status = v)
            .integer("ID", |p: &mut GroupParams, v: i32| p.id = v),
    )
}

/// The five chains of the user-group scenario, unprepared.
pub fn group_chains() -> ChainSet<GroupParams> {
    ChainSet::new(group_schema())
        .chain(
            Chain::new("group-status")
                .token("group", "Tp")
                .token(r"\d+", "GID")
                .token("active|blocked", "Status"),
        )
        .chain(Chain::new("status").token("active|blocked", "Status"))
        .chain(Chain::new("by-id").token(r"\d+", "ID"))
        .chain(
            Chain::new("group")
                .token("group", "Tp")
                .push(Token::new(r"\d+", "GID").describe("group id")),
        )
        .chain(Chain::new("all").token("", "Tp"))
}

#[allow(dead_code)]
pub const ROUTES: &str = r#"
[server]
bind_address = "127.0.0.1:0"
request_timeout_secs = 5

[[endpoints]]
prefix = "/users"
summary = "Users"
description = "User lookup"
params = { Tp = "string", GID = "u64", Status = "string", ID = "i32" }

[endpoints.methods.GET]
summary = "Read users"

[[endpoints.methods.GET.chains]]
name = "group-status"
tokens = [
    { expr = "group", var = "Tp" },
    { expr = '\d+', var = "GID" },
    { expr = "active|blocked", var = "Status" },
]

[[endpoints.methods.GET.chains]]
name = "status"
tokens = [{ expr = "active|blocked", var = "Status" }]

[[endpoints.methods.GET.chains]]
name = "by-id"
tokens = [{ expr = '\d+', var = "ID", description = "user id" }]

[[endpoints.methods.GET.chains]]
name = "all"
tokens = [{ expr = "", var = "Tp" }]

[[endpoints.methods.PUT.chains]]
name = "update"
tokens = [{ expr = '\d+', var = "ID" }]

[[endpoints]]
prefix = "/files"
params = { Root = "string" }

[[endpoints.methods.GET.chains]]
name = "any"
default = true
tail = true
tokens = [{ expr = "[a-z]+", var = "Root" }]
"#;

#[allow(dead_code)]
pub fn endpoints() -> Endpoints {
    build_endpoints(&parse_config(ROUTES).unwrap()).unwrap()
}
