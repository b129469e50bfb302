//! Boot-sequence operations.
//!
//! Each `BootStep` names an op tag; the registry maps the tag to an
//! `ActionBuilder` that turns the step's `data` into chain actions.

use std::collections::HashMap;

use bios_core::constants::{PRODUCERS_ACCOUNT, SYSTEM_ACCOUNT, TOKEN_ACCOUNT};
use bios_core::{AccountName, Action, Authority, BiosError, BootStep, PermissionLevel, PublicKey};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::context::LaunchContext;

/// Builds the actions for one boot step.
pub trait ActionBuilder: Send + Sync {
    fn build(&self, data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError>;
}

impl<F> ActionBuilder for F
where
    F: Fn(&Value, &LaunchContext) -> Result<Vec<Action>, BiosError> + Send + Sync,
{
    fn build(&self, data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
        self(data, ctx)
    }
}

/// Op tag → builder.
pub struct OpRegistry {
    builders: HashMap<String, Box<dyn ActionBuilder>>,
}

impl OpRegistry {
    pub fn empty() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Registry with every built-in op.
    pub fn builtin() -> Self {
        let mut ops = Self::empty();
        ops.register("system.newaccount", new_account);
        ops.register("system.setcode", set_code);
        ops.register("system.setpriv", set_priv);
        ops.register("token.create", token_create);
        ops.register("token.issue", token_issue);
        ops.register("producers.create_accounts", create_producer_accounts);
        ops.register("producers.enrich", enrich_producers);
        ops.register("snapshot.create_accounts", create_snapshot_accounts);
        ops.register("snapshot.transfer", snapshot_transfer);
        ops.register("system.setprods", set_prods);
        ops.register("system.resign_accounts", resign_accounts);
        ops.register("system.disable_accounts", disable_accounts);
        ops.register("raw", raw);
        ops
    }

    /// Add or replace the builder for `tag`.
    pub fn register(&mut self, tag: &str, builder: impl ActionBuilder + 'static) {
        self.builders.insert(tag.to_string(), Box::new(builder));
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.builders.contains_key(tag)
    }

    /// Resolve the step's op and build its actions.
    pub fn actions_for(&self, step: &BootStep, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
        let builder = self
            .builders
            .get(&step.op)
            .ok_or_else(|| BiosError::UnknownOperation(step.op.clone()))?;
        builder.build(&step.data, ctx).map_err(|e| BiosError::ActionBuild {
            step: step.label.clone(),
            reason: e.to_string(),
        })
    }
}

impl Default for OpRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn args<T: DeserializeOwned>(data: &Value) -> Result<T, BiosError> {
    let data = if data.is_null() { json!({}) } else { data.clone() };
    serde_json::from_value(data).map_err(|e| BiosError::Serialization(format!("op arguments: {e}")))
}

fn system() -> AccountName {
    AccountName::from(SYSTEM_ACCOUNT)
}

fn newaccount(creator: &AccountName, name: &AccountName, owner: &Authority, active: &Authority) -> Action {
    Action::new(
        SYSTEM_ACCOUNT,
        "newaccount",
        creator,
        json!({
            "creator": creator,
            "name": name,
            "owner": owner,
            "active": active,
        }),
    )
}

fn transfer(from: &AccountName, to: &AccountName, quantity: &str, memo: &str) -> Action {
    Action::new(
        TOKEN_ACCOUNT,
        "transfer",
        from,
        json!({
            "from": from,
            "to": to,
            "quantity": quantity,
            "memo": memo,
        }),
    )
}

/// `updateauth` authorized by the account's own owner permission.
fn updateauth(account: &AccountName, permission: &str, parent: &str, auth: Authority) -> Action {
    Action {
        account: system(),
        name: "updateauth".into(),
        authorization: vec![PermissionLevel::new(account, "owner")],
        data: json!({
            "account": account,
            "permission": permission,
            "parent": parent,
            "auth": auth,
        }),
    }
}

// ── System ───────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct NewAccountArgs {
    #[serde(default = "system")]
    creator: AccountName,
    new_account: AccountName,
    pubkey: PublicKey,
}

fn new_account(data: &Value, _ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: NewAccountArgs = args(data)?;
    let auth = Authority::single_key(a.pubkey);
    Ok(vec![newaccount(&a.creator, &a.new_account, &auth, &auth)])
}

#[derive(Deserialize)]
struct SetCodeArgs {
    account: AccountName,
    contract_name: String,
}

fn set_code(data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: SetCodeArgs = args(data)?;
    let contract = ctx.config.contracts.get(&a.contract_name).ok_or_else(|| {
        BiosError::Configuration(format!("contract {:?} not in config.contracts", a.contract_name))
    })?;
    let code = std::fs::read(&contract.code_path).map_err(|e| {
        BiosError::Configuration(format!("reading {}: {e}", contract.code_path.display()))
    })?;
    let abi_text = std::fs::read_to_string(&contract.abi_path).map_err(|e| {
        BiosError::Configuration(format!("reading {}: {e}", contract.abi_path.display()))
    })?;
    let abi: Value = serde_json::from_str(&abi_text)?;

    Ok(vec![
        Action::new(
            SYSTEM_ACCOUNT,
            "setcode",
            &a.account,
            json!({
                "account": a.account,
                "vmtype": 0,
                "vmversion": 0,
                "code": hex::encode(code),
            }),
        ),
        Action::new(
            SYSTEM_ACCOUNT,
            "setabi",
            &a.account,
            json!({ "account": a.account, "abi": abi }),
        ),
    ])
}

#[derive(Deserialize)]
struct AccountArg {
    account: AccountName,
}

fn set_priv(data: &Value, _ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: AccountArg = args(data)?;
    Ok(vec![Action::new(
        SYSTEM_ACCOUNT,
        "setpriv",
        SYSTEM_ACCOUNT,
        json!({ "account": a.account, "is_priv": 1 }),
    )])
}

/// The first 21 block producers after the boot node, with their signing keys.
fn set_prods(_data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let schedule: Vec<Value> = ctx
        .schedule
        .appointed()
        .iter()
        .map(|p| {
            json!({
                "producer_name": p.account_name,
                "block_signing_key": p.initial_block_signing_public_key,
            })
        })
        .collect();
    Ok(vec![Action::new(
        SYSTEM_ACCOUNT,
        "setprods",
        SYSTEM_ACCOUNT,
        json!({ "schedule": schedule }),
    )])
}

#[derive(Deserialize)]
struct ResignArgs {
    accounts: Vec<AccountName>,
    #[serde(default)]
    to: Option<AccountName>,
}

/// Hand owner and active over to another account's active permission.
/// The system account goes to the producers account unless `to` is given.
fn resign_accounts(data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: ResignArgs = args(data)?;
    let mut out = Vec::new();
    for account in kept_accounts(&a.accounts, ctx) {
        let to = match &a.to {
            Some(to) => to.clone(),
            None if account.as_str() == SYSTEM_ACCOUNT => AccountName::from(PRODUCERS_ACCOUNT),
            None => system(),
        };
        out.push(updateauth(account, "active", "owner", Authority::delegated(&to, "active")));
        out.push(updateauth(account, "owner", "", Authority::delegated(&to, "active")));
    }
    Ok(out)
}

#[derive(Deserialize)]
struct AccountsArg {
    accounts: Vec<AccountName>,
}

/// Zero-threshold owner and active; nothing can sign for the account again.
fn disable_accounts(data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: AccountsArg = args(data)?;
    let mut out = Vec::new();
    for account in kept_accounts(&a.accounts, ctx) {
        out.push(updateauth(account, "active", "owner", Authority::disabled()));
        out.push(updateauth(account, "owner", "", Authority::disabled()));
    }
    Ok(out)
}

/// Accounts to lock down, minus the system account in debug mode.
fn kept_accounts<'a>(
    accounts: &'a [AccountName],
    ctx: &LaunchContext,
) -> impl Iterator<Item = &'a AccountName> {
    let keep_system = ctx.config.debug.keep_system_account;
    accounts
        .iter()
        .filter(move |a| !(keep_system && a.as_str() == SYSTEM_ACCOUNT))
}

// ── Token ────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TokenCreateArgs {
    account: AccountName,
    amount: String,
}

fn token_create(data: &Value, _ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: TokenCreateArgs = args(data)?;
    Ok(vec![Action::new(
        TOKEN_ACCOUNT,
        "create",
        TOKEN_ACCOUNT,
        json!({ "issuer": a.account, "maximum_supply": a.amount }),
    )])
}

#[derive(Deserialize)]
struct TokenIssueArgs {
    account: AccountName,
    amount: String,
    #[serde(default)]
    memo: String,
}

fn token_issue(data: &Value, _ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: TokenIssueArgs = args(data)?;
    Ok(vec![Action::new(
        TOKEN_ACCOUNT,
        "issue",
        SYSTEM_ACCOUNT,
        json!({ "to": a.account, "quantity": a.amount, "memo": a.memo }),
    )])
}

// ── Producers ────────────────────────────────────────────────────────────────

/// One account per schedule entry, clones included, with the entry's own
/// owner and active authorities.
fn create_producer_accounts(_data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let creator = system();
    Ok(ctx
        .schedule
        .producers()
        .iter()
        .map(|p| newaccount(&creator, &p.account_name, &p.authority.owner, &p.authority.active))
        .collect())
}

#[derive(Deserialize)]
struct AmountArg {
    amount: String,
}

fn enrich_producers(data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    if !ctx.config.debug.enrich_producers {
        return Ok(Vec::new());
    }
    let a: AmountArg = args(data)?;
    let from = system();
    Ok(ctx
        .schedule
        .producers()
        .iter()
        .map(|p| transfer(&from, &p.account_name, &a.amount, "Enrich producer"))
        .collect())
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct SnapshotArgs {
    #[serde(default = "system", alias = "from")]
    creator: AccountName,
    #[serde(default)]
    memo: String,
}

fn create_snapshot_accounts(data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: SnapshotArgs = args(data)?;
    Ok(ctx
        .snapshot
        .truncated(ctx.config.debug.truncate_snapshot)
        .iter()
        .map(|line| {
            let auth = Authority::single_key(line.public_key.clone());
            newaccount(&a.creator, &line.account_name, &auth, &auth)
        })
        .collect())
}

fn snapshot_transfer(data: &Value, ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: SnapshotArgs = args(data)?;
    Ok(ctx
        .snapshot
        .truncated(ctx.config.debug.truncate_snapshot)
        .iter()
        .map(|line| transfer(&a.creator, &line.account_name, &line.balance, &a.memo))
        .collect())
}

// ── Raw ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct RawArgs {
    actions: Vec<Action>,
}

fn raw(data: &Value, _ctx: &LaunchContext) -> Result<Vec<Action>, BiosError> {
    let a: RawArgs = args(data)?;
    Ok(a.actions)
}
