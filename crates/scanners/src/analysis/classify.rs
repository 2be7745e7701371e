//! Entity classification: entry points, storage operations, sender
//! accesses, and dispatch matches.
//!
//! Everything here is a pure function over the model. Ambiguity always
//! resolves to "not classified" rather than an error.

use crate::model::{ContractModel, ExprId, ExprKind, FuncId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Instantiate,
    Execute,
    Query,
    Migrate,
    Reply,
    IbcOpen,
    IbcConnect,
    IbcClose,
    IbcReceive,
    IbcAck,
    IbcTimeout,
}

impl EntryKind {
    /// The reserved entry-point names the host runtime invokes.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "instantiate" => Some(Self::Instantiate),
            "execute" => Some(Self::Execute),
            "query" => Some(Self::Query),
            "migrate" => Some(Self::Migrate),
            "reply" => Some(Self::Reply),
            "ibc_channel_open" => Some(Self::IbcOpen),
            "ibc_channel_connect" => Some(Self::IbcConnect),
            "ibc_channel_close" => Some(Self::IbcClose),
            "ibc_packet_receive" => Some(Self::IbcReceive),
            "ibc_packet_ack" => Some(Self::IbcAck),
            "ibc_packet_timeout" => Some(Self::IbcTimeout),
            _ => None,
        }
    }

    pub fn is_ibc(&self) -> bool {
        matches!(
            self,
            Self::IbcOpen
                | Self::IbcConnect
                | Self::IbcClose
                | Self::IbcReceive
                | Self::IbcAck
                | Self::IbcTimeout
        )
    }
}

/// Attribute detection first, reserved-name fallback second. The fallback
/// requires at least two parameters so a stray helper named `execute` with
/// one argument is not mistaken for a handler. Both strategies classify by
/// name, so they cannot disagree when both apply.
pub fn classify_entry_point(model: &ContractModel, func: FuncId) -> Option<EntryKind> {
    let f = model.func(func);
    if f.attrs.iter().any(|a| a.contains("entry_point")) {
        return EntryKind::from_name(&f.name);
    }
    if f.params.len() >= 2 {
        return EntryKind::from_name(&f.name);
    }
    None
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOpKind {
    Read,
    Write,
    Delete,
}

/// Exact identifier equality only; substring matching here would
/// misclassify user methods with similar names.
pub fn classify_storage_op(method: &str) -> Option<StorageOpKind> {
    match method {
        "save" | "update" => Some(StorageOpKind::Write),
        "load" | "may_load" => Some(StorageOpKind::Read),
        "remove" => Some(StorageOpKind::Delete),
        _ => None,
    }
}

/// Storage operations performed by a function, with their call sites.
pub fn storage_ops(model: &ContractModel, func: FuncId) -> Vec<(ExprId, StorageOpKind)> {
    model
        .exprs_of(func)
        .filter_map(|(id, e)| match &e.kind {
            ExprKind::MethodCall { method, .. } => {
                classify_storage_op(method).map(|kind| (id, kind))
            }
            _ => None,
        })
        .collect()
}

pub fn writes_storage(model: &ContractModel, func: FuncId) -> bool {
    storage_ops(model, func)
        .iter()
        .any(|(_, kind)| *kind == StorageOpKind::Write)
}

/// Last path segment, tolerant of the token-spaced form (`Item :: new`).
pub fn path_tail(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path).trim()
}

/// A call site declares a storage handle iff its callee path ends in `new`,
/// its first argument is a string literal, and it does not sit inside a
/// function that takes parameters — i.e. it is a const/static initializer.
pub fn storage_declaration_key(model: &ContractModel, expr: ExprId) -> Option<String> {
    let node = model.expr(expr);
    let (callee, args) = match &node.kind {
        ExprKind::Call { callee, args } => (callee, args),
        _ => return None,
    };
    if path_tail(callee) != "new" || !callee.contains("::") {
        return None;
    }
    if let Some(func) = node.func {
        if !model.func(func).params.is_empty() {
            return None;
        }
    }
    let first = args.first()?;
    match &model.expr(*first).kind {
        ExprKind::Lit {
            str_value: Some(key),
        } => Some(key.clone()),
        _ => None,
    }
}

/// A read of the caller identity: field named exactly `sender` on a
/// container whose text mentions `info`. Deliberately a containment check,
/// not a type check — precise type resolution is unavailable, and renamed
/// info parameters are an accepted source of rare misses.
pub fn is_sender_access(model: &ContractModel, expr: ExprId) -> bool {
    match &model.expr(expr).kind {
        ExprKind::Field { base, field } => {
            field == "sender" && model.expr(*base).text.contains("info")
        }
        _ => false,
    }
}

pub fn sender_accesses(model: &ContractModel, func: FuncId) -> Vec<ExprId> {
    model
        .exprs_of(func)
        .filter(|(id, _)| is_sender_access(model, *id))
        .map(|(id, _)| id)
        .collect()
}

/// Whole-word occurrence over identifier tokens.
pub fn contains_word(text: &str, word: &str) -> bool {
    text.split(|c: char| !c.is_alphanumeric() && c != '_')
        .any(|tok| tok == word)
}

/// Does this match expression route the handler's incoming message? First
/// try the enclosing handler's last parameter (the conventional message
/// argument), then fall back to a standalone `msg` token so renamed
/// parameters are still caught without matching every `match` in the body.
pub fn is_dispatch_match(model: &ContractModel, expr: ExprId, handler: FuncId) -> bool {
    let scrutinee = match &model.expr(expr).kind {
        ExprKind::Match { scrutinee, .. } => *scrutinee,
        _ => return false,
    };
    let text = &model.expr(scrutinee).text;
    if let Some(param) = model.func(handler).last_param() {
        if text == &param.name || text.contains(&param.name) {
            return true;
        }
    }
    contains_word(text, "msg")
}

/// Callee identifier for any call-shaped expression: the method name for
/// method calls, the last path segment for free/path calls.
pub fn call_name(model: &ContractModel, expr: ExprId) -> Option<String> {
    match &model.expr(expr).kind {
        ExprKind::MethodCall { method, .. } => Some(method.clone()),
        ExprKind::Call { callee, .. } => Some(path_tail(callee).to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lower_file;

    fn model_of(src: &str) -> ContractModel {
        let mut model = ContractModel::new();
        lower_file(&mut model, "src/contract.rs", src).unwrap();
        model
    }

    fn func_id(model: &ContractModel, name: &str) -> FuncId {
        model
            .functions()
            .find(|(_, f)| f.name == name)
            .map(|(id, _)| id)
            .unwrap()
    }

    #[test]
    fn test_entry_point_by_attribute() {
        let model = model_of(
            r#"
#[entry_point]
pub fn migrate(deps: DepsMut, env: Env, msg: MigrateMsg) -> Result<Response, ContractError> {
    Ok(Response::new())
}
"#,
        );
        assert_eq!(
            classify_entry_point(&model, func_id(&model, "migrate")),
            Some(EntryKind::Migrate)
        );
    }

    #[test]
    fn test_entry_point_by_name_fallback() {
        let model = model_of(
            r#"
pub fn ibc_packet_receive(deps: DepsMut, env: Env, msg: IbcPacketReceiveMsg) -> Result<IbcReceiveResponse, ContractError> {
    Ok(IbcReceiveResponse::new())
}
"#,
        );
        assert_eq!(
            classify_entry_point(&model, func_id(&model, "ibc_packet_receive")),
            Some(EntryKind::IbcReceive)
        );
    }

    #[test]
    fn test_name_fallback_requires_two_params() {
        let model = model_of("pub fn execute(x: u32) -> u32 { x }");
        assert_eq!(classify_entry_point(&model, func_id(&model, "execute")), None);
    }

    #[test]
    fn test_classification_is_idempotent() {
        let model = model_of(
            "#[entry_point]\npub fn execute(deps: DepsMut, env: Env, info: MessageInfo, msg: ExecuteMsg) -> Result<Response, ContractError> { Ok(Response::new()) }",
        );
        let id = func_id(&model, "execute");
        let first = classify_entry_point(&model, id);
        let second = classify_entry_point(&model, id);
        assert_eq!(first, second);
        assert_eq!(first, Some(EntryKind::Execute));
    }

    #[test]
    fn test_storage_op_exact_match_only() {
        assert_eq!(classify_storage_op("save"), Some(StorageOpKind::Write));
        assert_eq!(classify_storage_op("update"), Some(StorageOpKind::Write));
        assert_eq!(classify_storage_op("load"), Some(StorageOpKind::Read));
        assert_eq!(classify_storage_op("may_load"), Some(StorageOpKind::Read));
        assert_eq!(classify_storage_op("remove"), Some(StorageOpKind::Delete));
        assert_eq!(classify_storage_op("save_all"), None);
        assert_eq!(classify_storage_op("preload"), None);
    }

    #[test]
    fn test_storage_declaration_key() {
        let model = model_of(r#"pub const CONFIG: Item<Config> = Item::new("config");"#);
        let file = model.files().next().unwrap().0;
        let keys: Vec<String> = model
            .initializer_exprs(file)
            .filter_map(|(id, _)| storage_declaration_key(&model, id))
            .collect();
        assert_eq!(keys, vec!["config".to_string()]);
    }

    #[test]
    fn test_storage_declaration_rejects_function_scope() {
        let model = model_of(
            r#"
pub fn build(deps: DepsMut) {
    let item = Item::new("config");
}
"#,
        );
        let any = model
            .exprs_of(func_id(&model, "build"))
            .filter_map(|(id, _)| storage_declaration_key(&model, id))
            .next();
        assert!(any.is_none());
    }

    #[test]
    fn test_sender_access() {
        let model = model_of(
            r#"
pub fn handler(info: MessageInfo, config: Config) -> bool {
    info.sender == config.admin
}
"#,
        );
        let senders = sender_accesses(&model, func_id(&model, "handler"));
        assert_eq!(senders.len(), 1);
    }

    #[test]
    fn test_sender_access_requires_info_container() {
        let model = model_of(
            r#"
pub fn handler(packet: Packet) -> String {
    packet.sender
}
"#,
        );
        assert!(sender_accesses(&model, func_id(&model, "handler")).is_empty());
    }

    #[test]
    fn test_dispatch_match_by_param_name() {
        let model = model_of(
            r#"
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, incoming: ExecuteMsg) -> Result<Response, ContractError> {
    match incoming {
        ExecuteMsg::Noop {} => Ok(Response::new()),
    }
}
"#,
        );
        let handler = func_id(&model, "execute");
        let m = model
            .exprs_of(handler)
            .find(|(_, e)| matches!(e.kind, ExprKind::Match { .. }))
            .unwrap()
            .0;
        assert!(is_dispatch_match(&model, m, handler));
    }

    #[test]
    fn test_non_dispatch_match_not_matched() {
        let model = model_of(
            r#"
pub fn execute(deps: DepsMut, env: Env, info: MessageInfo, incoming: ExecuteMsg) -> Result<Response, ContractError> {
    match deps.querier.query_balance() {
        Ok(_) => Ok(Response::new()),
    }
}
"#,
        );
        let handler = func_id(&model, "execute");
        let m = model
            .exprs_of(handler)
            .find(|(_, e)| matches!(e.kind, ExprKind::Match { .. }))
            .unwrap()
            .0;
        assert!(!is_dispatch_match(&model, m, handler));
    }

    #[test]
    fn test_contains_word() {
        assert!(contains_word("match msg {", "msg"));
        assert!(!contains_word("wrapped_msgs", "msg"));
    }
}
