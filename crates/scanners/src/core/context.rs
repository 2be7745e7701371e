use crate::model::{ContractModel, FileId, FuncId, Function};

/// Path-based scope classification, supplied by the external driver and
/// threaded through every rule call as an explicit value rather than
/// ambient state, so one process can run concurrent analysis sessions with
/// different scopes.
#[derive(Debug, Clone)]
pub struct ScopeConfig {
    /// Directory components that mark dependency or build-artifact trees.
    pub excluded_dirs: Vec<String>,
    /// File-stem suffixes that mark test modules by naming convention.
    pub test_suffixes: Vec<String>,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            excluded_dirs: ["target", "artifacts", "schema", "node_modules", ".cargo"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            test_suffixes: ["_test", "_tests"].iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl ScopeConfig {
    fn components(path: &str) -> impl Iterator<Item = &str> {
        path.split(['/', '\\']).filter(|c| !c.is_empty())
    }

    pub fn is_in_scope(&self, path: &str) -> bool {
        !Self::components(path).any(|c| self.excluded_dirs.iter().any(|d| d == c))
    }

    /// Test files by naming convention: a `tests/` directory component, a
    /// `tests.rs` / `test.rs` file, or a `_test`/`_tests` stem suffix.
    pub fn is_test_file(&self, path: &str) -> bool {
        if Self::components(path).any(|c| c == "tests") {
            return true;
        }
        let stem = Self::components(path)
            .last()
            .unwrap_or(path)
            .trim_end_matches(".rs");
        stem == "tests" || stem == "test" || self.test_suffixes.iter().any(|s| stem.ends_with(s))
    }
}

/// Engine-level knobs; rule semantics never depend on these.
#[derive(Debug, Clone)]
pub struct ScannerConfig {
    pub parallel_execution: bool,
    pub deduplication_enabled: bool,
    pub min_severity: Option<crate::core::Severity>,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            parallel_execution: true,
            deduplication_enabled: true,
            min_severity: None,
        }
    }
}

/// Everything a scanner gets: the immutable model plus the scope predicate.
/// Shared by reference across worker threads; nothing here is mutable
/// during analysis.
pub struct AnalysisContext {
    model: ContractModel,
    scope: ScopeConfig,
    config: ScannerConfig,
}

impl AnalysisContext {
    pub fn new(model: ContractModel) -> Self {
        Self::with_config(model, ScopeConfig::default(), ScannerConfig::default())
    }

    pub fn with_config(model: ContractModel, scope: ScopeConfig, config: ScannerConfig) -> Self {
        Self {
            model,
            scope,
            config,
        }
    }

    pub fn model(&self) -> &ContractModel {
        &self.model
    }

    pub fn scope(&self) -> &ScopeConfig {
        &self.scope
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn file_path(&self, file: FileId) -> &str {
        &self.model.file(file).path
    }

    /// Functions in in-scope files; the baseline iteration for every rule.
    pub fn scoped_functions(&self) -> impl Iterator<Item = (FuncId, &Function)> {
        self.model
            .functions()
            .filter(|(_, f)| self.scope.is_in_scope(&self.model.file(f.file).path))
    }

    /// Test classification for the rules that exclude test code: either the
    /// file is a test file by name convention, or the function itself sits
    /// in a test module.
    pub fn is_test_function(&self, func: FuncId) -> bool {
        let f = self.model.func(func);
        f.is_test || self.scope.is_test_file(&self.model.file(f.file).path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_excludes_build_dirs() {
        let scope = ScopeConfig::default();
        assert!(scope.is_in_scope("contracts/vault/src/contract.rs"));
        assert!(!scope.is_in_scope("target/debug/build/out.rs"));
        assert!(!scope.is_in_scope("contracts/vault/schema/raw.rs"));
    }

    #[test]
    fn test_test_file_conventions() {
        let scope = ScopeConfig::default();
        assert!(scope.is_test_file("contracts/vault/tests/integration.rs"));
        assert!(scope.is_test_file("src/contract_test.rs"));
        assert!(scope.is_test_file("src/multitest_tests.rs"));
        assert!(scope.is_test_file("src/tests.rs"));
        assert!(!scope.is_test_file("src/contract.rs"));
        assert!(!scope.is_test_file("src/attest.rs"));
    }
}
