//! GitHub Actions workflow scanning.
//!
//! Every step whose `uses` starts with a configured node setup action
//! contributes its `with.node-version`. Expressions referring to the job
//! matrix, to environment variables or to another job's outputs are expanded
//! to the literal tokens they stand for.


use crate::error::{DetectError, Result};
use crate::loader::{load_yaml, Loader};
use crate::report::GithubActionsReport;
use crate::resolver::{resolve_tokens, VersionResolver};
use crate::tree::{Mapping, Node};
use indexmap::{IndexMap, IndexSet};
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

pub const WORKFLOWS_DIR: &str = ".github/workflows";

/// The body of a `${{ ... }}` expression spanning the whole value.
static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\$\{\{\s*(?P<expr>.+?)\s*\}\}$").expect("invalid expression regex")
});

static FROM_JSON_NEEDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^fromjson\(\s*needs\.(?P<job>[\w-]+)\.outputs\.(?P<output>[\w-]+)\s*\)$")
        .expect("invalid fromJSON regex")
});

/// Detect the versions a package's workflows set up.
///
/// Returns `Ok(None)` when the package has no workflows folder.
pub fn detect(
    loader: &dyn Loader,
    resolver: &dyn VersionResolver,
    setup_node_actions: &[String],
) -> Result<Option<GithubActionsReport>> {
    let files = loader.load_folder(WORKFLOWS_DIR)?;
    if files.is_empty() {
        debug!("No {}", WORKFLOWS_DIR);
        return Ok(None);
    }

    let mut raw = IndexSet::new();
    let mut by_file = IndexMap::new();

    for file in files
        .iter()
        .filter(|f| f.ends_with(".yml") || f.ends_with(".yaml"))
    {
        let workflow = load_yaml(loader, &format!("{}/{}", WORKFLOWS_DIR, file))?;
        let tokens = scan_workflow(&workflow, file, setup_node_actions)?;

        raw.extend(tokens.iter().cloned());
        by_file.insert(file.clone(), tokens);
    }

    let raw: Vec<String> = raw.into_iter().collect();
    let resolved = resolve_tokens(resolver, &raw, false)?;

    Ok(Some(GithubActionsReport {
        raw,
        resolved,
        by_file,
    }))
}

/// Raw node version tokens of one workflow, in first-seen order.
pub fn scan_workflow(
    workflow: &Mapping,
    file: &str,
    setup_node_actions: &[String],
) -> Result<Vec<String>> {
    let mut tokens = IndexSet::new();

    let Some(jobs) = workflow.get("jobs").and_then(Node::as_mapping) else {
        return Ok(Vec::new());
    };

    for (job_name, job) in jobs {
        let context = JobContext {
            file,
            workflow,
            jobs,
            job_name,
            job,
        };

        let steps = job.get("steps").map(Node::as_list).unwrap_or_default();
        for step in steps {
            let uses = step.get("uses").and_then(Node::as_str).unwrap_or_default();
            if !setup_node_actions
                .iter()
                .any(|prefix| uses.starts_with(prefix.as_str()))
            {
                continue;
            }

            let Some(node_version) = step.get("with").and_then(|w| w.get("node-version")) else {
                debug!(%file, job = %job_name, "setup-node step without node-version");
                continue;
            };

            for value in node_version.as_list().iter().filter_map(Node::as_str) {
                tokens.extend(context.expand(value, step)?);
            }
        }
    }

    Ok(tokens.into_iter().collect())
}

struct JobContext<'w> {
    file: &'w str,
    workflow: &'w Mapping,
    jobs: &'w Mapping,
    job_name: &'w str,
    job: &'w Node,
}

impl JobContext<'_> {
    /// Tokens a `node-version` value stands for.
    fn expand(&self, value: &str, step: &Node) -> Result<Vec<String>> {
        let Some(expr) = expression(value) else {
            return Ok(vec![value.to_string()]);
        };

        if let Some(path) = expr.strip_prefix("matrix.") {
            return self.matrix(path);
        }

        if let Some(name) = expr.strip_prefix("env.") {
            return self.env(name, step).map(|token| vec![token]);
        }

        if FROM_JSON_NEEDS.is_match(expr) {
            return self.needs_output(expr);
        }

        debug!(file = %self.file, job = %self.job_name, %value, "Unsupported expression kept as written");
        Ok(vec![value.to_string()])
    }

    /// `strategy.matrix.<path>` plus every `strategy.matrix.include[*].<path>`.
    fn matrix(&self, path: &str) -> Result<Vec<String>> {
        let matrix = self.job.get("strategy").and_then(|s| s.get("matrix"));

        if let Some(Node::Scalar(expr)) = matrix {
            warn!(file = %self.file, job = %self.job_name, %expr, "Skipping computed matrix");
            return Ok(Vec::new());
        }

        let (name, rest) = match path.split_once('.') {
            Some((name, rest)) => (name, Some(rest)),
            None => (path, None),
        };

        let declared = matrix.and_then(|m| m.get(name));
        let includes: Vec<&Node> = matrix
            .and_then(|m| m.get("include"))
            .map(Node::as_list)
            .unwrap_or_default()
            .iter()
            .filter_map(|include| include.get(name))
            .collect();

        if declared.is_none() && includes.is_empty() {
            return Err(DetectError::ConfigError(format!(
                "Unable to find matrix variable '{}' for job '{}' in {}",
                name, self.job_name, self.file
            )));
        }

        let mut tokens = Vec::new();
        for value in declared.into_iter().chain(includes) {
            for item in value.as_list() {
                let item = match rest {
                    Some(rest) => rest.split('.').try_fold(item, |node, key| node.get(key)),
                    None => Some(item),
                };

                let Some(text) = item.and_then(Node::as_str) else {
                    continue;
                };

                match expression(text) {
                    Some(expr) if FROM_JSON_NEEDS.is_match(expr) => {
                        tokens.extend(self.needs_output(expr)?)
                    }
                    _ => tokens.push(text.to_string()),
                }
            }
        }

        Ok(tokens)
    }

    /// `env.<name>` from the step, the job or the workflow, in that order.
    fn env(&self, name: &str, step: &Node) -> Result<String> {
        let workflow_env = self.workflow.get("env");

        [step.get("env"), self.job.get("env"), workflow_env]
            .into_iter()
            .flatten()
            .find_map(|env| env.get(name).and_then(Node::as_str))
            .map(str::to_string)
            .ok_or_else(|| {
                DetectError::ConfigError(format!(
                    "Unable to find env variable '{}' for job '{}' in {}",
                    name, self.job_name, self.file
                ))
            })
    }

    /// Literal values behind `fromJSON(needs.<job>.outputs.<output>)`.
    fn needs_output(&self, expr: &str) -> Result<Vec<String>> {
        let Some(captures) = FROM_JSON_NEEDS.captures(expr) else {
            return Ok(Vec::new());
        };
        let (job, output) = (&captures["job"], &captures["output"]);

        let value = self
            .jobs
            .get(job)
            .and_then(|j| j.get("outputs"))
            .and_then(|outputs| outputs.get(output))
            .and_then(Node::as_str)
            .ok_or_else(|| {
                DetectError::ConfigError(format!(
                    "Unable to find output '{}' of job '{}' for job '{}' in {}",
                    output, job, self.job_name, self.file
                ))
            })?;

        match serde_json::from_str::<serde_json::Value>(value) {
            Ok(serde_json::Value::Array(items)) => Ok(items.iter().filter_map(json_token).collect()),
            Ok(scalar) => Ok(json_token(&scalar).into_iter().collect()),
            Err(_) => {
                warn!(file = %self.file, job = %job, %output, "Skipping computed job output");
                Ok(Vec::new())
            }
        }
    }
}

fn expression(value: &str) -> Option<&str> {
    EXPRESSION
        .captures(value.trim())
        .and_then(|captures| captures.name("expr"))
        .map(|expr| expr.as_str())
}

fn json_token(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
