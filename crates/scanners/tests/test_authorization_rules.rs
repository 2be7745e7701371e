//! End-to-end checks for the authorization rules over whole contract files.

use anyhow::Result;
use vigil_scanners::{
    lower_file, AnalysisContext, ContractModel, MissingExecuteAuthorizationScanner,
    MissingMigrateAuthorizationScanner, Scanner, ScopeConfig,
};

fn context_at(path: &str, source: &str) -> Result<AnalysisContext> {
    let mut model = ContractModel::new();
    lower_file(&mut model, path, source)?;
    Ok(AnalysisContext::new(model))
}

fn context(source: &str) -> Result<AnalysisContext> {
    context_at("src/contract.rs", source)
}

const SELF_SERVE_WITHDRAW: &str = r#"
#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::Withdraw { amount } => execute_withdraw(deps, info, amount),
    }
}

pub fn execute_withdraw(
    deps: DepsMut,
    info: MessageInfo,
    amount: Uint128,
) -> Result<Response, ContractError> {
    let balance = BALANCES.load(deps.storage, &info.sender)?;
    BALANCES.save(deps.storage, &info.sender, &balance.checked_sub(amount)?)?;
    Ok(Response::new())
}
"#;

const UNGUARDED_UPDATE_CONFIG: &str = r#"
#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::UpdateConfig { new_owner } => execute_update_config(deps, new_owner),
    }
}

pub fn execute_update_config(
    deps: DepsMut,
    new_owner: String,
) -> Result<Response, ContractError> {
    let mut config = CONFIG.load(deps.storage)?;
    config.owner = new_owner;
    CONFIG.save(deps.storage, &config)?;
    Ok(Response::new())
}
"#;

const GUARDED_UPDATE_CONFIG: &str = r#"
#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::UpdateConfig { new_owner } => execute_update_config(deps, info, new_owner),
    }
}

pub fn execute_update_config(
    deps: DepsMut,
    info: MessageInfo,
    new_owner: String,
) -> Result<Response, ContractError> {
    let config = CONFIG.load(deps.storage)?;
    if info.sender != config.owner {
        return Err(ContractError::Unauthorized {});
    }
    CONFIG.save(deps.storage, &Config { owner: new_owner })?;
    Ok(Response::new())
}
"#;

#[test]
fn test_self_serve_withdraw_not_flagged() -> Result<()> {
    let context = context(SELF_SERVE_WITHDRAW)?;
    let findings = MissingExecuteAuthorizationScanner::new().scan(&context)?;
    assert!(findings.is_empty(), "unexpected: {findings:#?}");
    Ok(())
}

#[test]
fn test_unguarded_config_write_flagged_once() -> Result<()> {
    let context = context(UNGUARDED_UPDATE_CONFIG)?;
    let findings = MissingExecuteAuthorizationScanner::new().scan(&context)?;
    assert_eq!(findings.len(), 1, "got: {findings:#?}");
    assert_eq!(findings[0].scanner_id, "missing-execute-authorization");
    let affected = findings[0]
        .metadata
        .as_ref()
        .map(|m| m.affected_functions.clone())
        .unwrap_or_default();
    assert!(affected.contains(&"execute_update_config".to_string()));
    Ok(())
}

#[test]
fn test_guarded_config_write_clean() -> Result<()> {
    let context = context(GUARDED_UPDATE_CONFIG)?;
    let findings = MissingExecuteAuthorizationScanner::new().scan(&context)?;
    assert!(findings.is_empty(), "unexpected: {findings:#?}");
    Ok(())
}

#[test]
fn test_helper_guard_recognized_one_hop() -> Result<()> {
    let context = context(
        r#"
#[entry_point]
pub fn execute(
    deps: DepsMut,
    env: Env,
    info: MessageInfo,
    msg: ExecuteMsg,
) -> Result<Response, ContractError> {
    match msg {
        ExecuteMsg::SetFee { fee } => execute_set_fee(deps, info, fee),
    }
}

fn ensure_admin(deps: &DepsMut, info: &MessageInfo) -> Result<(), ContractError> {
    let admin = ADMIN.load(deps.storage)?;
    if info.sender != admin {
        return Err(ContractError::Unauthorized {});
    }
    Ok(())
}

pub fn execute_set_fee(
    deps: DepsMut,
    info: MessageInfo,
    fee: Decimal,
) -> Result<Response, ContractError> {
    ensure_admin(&deps, &info)?;
    FEE.save(deps.storage, &fee)?;
    Ok(Response::new())
}
"#,
    )?;
    let findings = MissingExecuteAuthorizationScanner::new().scan(&context)?;
    assert!(findings.is_empty(), "unexpected: {findings:#?}");
    Ok(())
}

#[test]
fn test_unguarded_migrate_flagged() -> Result<()> {
    let context = context(
        r#"
#[entry_point]
pub fn migrate(deps: DepsMut, env: Env, msg: MigrateMsg) -> Result<Response, ContractError> {
    CONFIG.save(deps.storage, &msg.new_config)?;
    Ok(Response::new())
}
"#,
    )?;
    let findings = MissingMigrateAuthorizationScanner::new().scan(&context)?;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].scanner_id, "missing-migrate-authorization");
    Ok(())
}

#[test]
fn test_findings_only_shrink_when_file_becomes_test_scoped() -> Result<()> {
    let in_scope = context_at("src/contract.rs", UNGUARDED_UPDATE_CONFIG)?;
    let test_scoped = context_at("src/contract_test.rs", UNGUARDED_UPDATE_CONFIG)?;

    let scanner = MissingExecuteAuthorizationScanner::new();
    let before = scanner.scan(&in_scope)?;
    let after = scanner.scan(&test_scoped)?;

    assert_eq!(before.len(), 1);
    assert!(after.is_empty());
    Ok(())
}

#[test]
fn test_excluded_dirs_produce_no_findings() -> Result<()> {
    let context = context_at("target/debug/generated.rs", UNGUARDED_UPDATE_CONFIG)?;
    let findings = MissingExecuteAuthorizationScanner::new().scan(&context)?;
    assert!(findings.is_empty());

    let scope = ScopeConfig::default();
    assert!(!scope.is_in_scope("target/debug/generated.rs"));
    Ok(())
}
