use crate::error::RegistryError;
use crate::ir::{ErrorKind, TranslationResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// One registered user function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryEntry {
    pub name: String,
    pub arity: usize,
    /// Last-modified marker, kept as written.
    pub marker: String,
}

/// Known user functions and their arities.
///
/// The on-disk form is one `name - arity - marker` record per line. The
/// marker may itself contain `-` (dates usually do).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the default registry path: ~/.nested_fit/func_names.dat
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".nested_fit").join("func_names.dat"))
    }

    pub fn parse(content: &str) -> Result<Self, RegistryError> {
        let mut registry = Self::new();

        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.splitn(3, '-').map(str::trim);
            let (Some(name), Some(arity)) = (fields.next(), fields.next()) else {
                return Err(RegistryError::MalformedRecord {
                    line: idx + 1,
                    text: line.to_string(),
                });
            };
            if name.is_empty() {
                return Err(RegistryError::MalformedRecord {
                    line: idx + 1,
                    text: line.to_string(),
                });
            }
            let arity = arity.parse().map_err(|_| RegistryError::InvalidArity {
                line: idx + 1,
                value: arity.to_string(),
            })?;
            let marker = fields.next().unwrap_or_default().to_string();

            if registry.get(name).is_some() {
                log::debug!("Function `{}` registered twice, keeping line {}", name, idx + 1);
            }
            registry.insert(RegistryEntry {
                name: name.to_string(),
                arity,
                marker,
            });
        }

        Ok(registry)
    }

    pub fn load(path: &Path) -> Result<Self, RegistryError> {
        let content = std::fs::read_to_string(path).map_err(|source| RegistryError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let registry = Self::parse(&content)?;
        log::info!("Loaded {} functions from {:?}", registry.len(), path);
        Ok(registry)
    }

    pub fn insert(&mut self, entry: RegistryEntry) {
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn get(&self, name: &str) -> Option<&RegistryEntry> {
        self.entries.get(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = &RegistryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A function call the registry rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ValidationFailure {
    UnknownFunction {
        name: String,
    },
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
}

impl ValidationFailure {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationFailure::UnknownFunction { .. } => ErrorKind::UnknownFunction,
            ValidationFailure::ArityMismatch { .. } => ErrorKind::ArityMismatch,
        }
    }
}

/// Checks every function call of `result` against `registry`.
///
/// All failures are returned in call order. The result's single status slot
/// receives the last one, matching what the Fortran caller reads; a result
/// without failures keeps its status.
pub fn validate(result: &mut TranslationResult, registry: &Registry) -> Vec<ValidationFailure> {
    let mut failures = Vec::new();

    for call in &result.functions {
        match registry.get(&call.name) {
            None => {
                log::error!(
                    "Error on function call `{}`: Function is not declared in the function registry.",
                    call.name
                );
                failures.push(ValidationFailure::UnknownFunction {
                    name: call.name.clone(),
                });
            }
            Some(entry) if entry.arity != call.arity => {
                log::error!(
                    "Error on function call `{}`: Function takes {} parameters, but {} were specified.",
                    call.name,
                    entry.arity,
                    call.arity
                );
                failures.push(ValidationFailure::ArityMismatch {
                    name: call.name.clone(),
                    expected: entry.arity,
                    found: call.arity,
                });
            }
            Some(_) => {}
        }
    }

    if let Some(last) = failures.last() {
        result.status = last.kind();
    }
    failures
}

/// Reads the registry at `path` and validates against it. The file is read on
/// every call.
pub fn validate_with_registry_file(
    result: &mut TranslationResult,
    path: &Path,
) -> Result<Vec<ValidationFailure>, RegistryError> {
    let registry = Registry::load(path)?;
    Ok(validate(result, &registry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::FunctionCall;

    fn result_with_calls(calls: &[(&str, usize)]) -> TranslationResult {
        TranslationResult {
            latex: String::new(),
            infix: String::new(),
            parameters: Vec::new(),
            functions: calls
                .iter()
                .map(|(name, arity)| FunctionCall::new(name, *arity).unwrap())
                .collect(),
            status: ErrorKind::None,
        }
    }

    #[test]
    fn test_parse_records() {
        let registry = Registry::parse("gauss - 3 - 2023-07-26\n\n  f-2-x \n").unwrap();
        assert_eq!(registry.len(), 2);
        let gauss = registry.get("gauss").unwrap();
        assert_eq!(gauss.arity, 3);
        assert_eq!(gauss.marker, "2023-07-26");
        assert_eq!(registry.get("f").unwrap().marker, "x");
    }

    #[test]
    fn test_parse_without_marker() {
        let registry = Registry::parse("f - 1").unwrap();
        assert_eq!(registry.get("f").unwrap().marker, "");
    }

    #[test]
    fn test_parse_rejects_bad_records() {
        assert!(matches!(
            Registry::parse("f 2 date"),
            Err(RegistryError::MalformedRecord { line: 1, .. })
        ));
        assert!(matches!(
            Registry::parse("f - 1 - a\ng - two - b"),
            Err(RegistryError::InvalidArity { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_keeps_last() {
        let registry = Registry::parse("f - 1 - a\nf - 2 - b").unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("f").unwrap().arity, 2);
    }

    #[test]
    fn test_validate_arity_and_unknown() {
        let registry = Registry::parse("f - 2 - m").unwrap();

        let mut ok = result_with_calls(&[("f", 2)]);
        assert!(validate(&mut ok, &registry).is_empty());
        assert_eq!(ok.status, ErrorKind::None);

        let mut mismatch = result_with_calls(&[("f", 1)]);
        let failures = validate(&mut mismatch, &registry);
        assert_eq!(
            failures,
            vec![ValidationFailure::ArityMismatch {
                name: "f".to_string(),
                expected: 2,
                found: 1
            }]
        );
        assert_eq!(mismatch.status, ErrorKind::ArityMismatch);

        let mut unknown = result_with_calls(&[("g", 1)]);
        validate(&mut unknown, &registry);
        assert_eq!(unknown.status, ErrorKind::UnknownFunction);
    }

    #[test]
    fn test_last_failure_wins_status() {
        let registry = Registry::parse("f - 2 - m").unwrap();
        let mut result = result_with_calls(&[("g", 1), ("f", 1), ("f", 2)]);
        let failures = validate(&mut result, &registry);
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].kind(), ErrorKind::UnknownFunction);
        assert_eq!(result.status, ErrorKind::ArityMismatch);
    }
}
