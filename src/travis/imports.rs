//! Travis `import` preprocessing.
//!
//! Imports are resolved depth first: each imported document has its own imports
//! applied before it is merged into the importing document, in declared order.
//! The chain of sources from the root document down to the current one is the
//! breadcrumb used to detect cycles.

use super::merge::MergeMode;
use super::TRAVIS_YML;
use crate::error::{DetectError, Result};
use crate::loader::{LoadCache, Loader, LoaderFactory, Target};
use crate::tree::{parse_mapping, Mapping, Node};
use tracing::{debug, warn};

const IMPORT_KEY: &str = "import";

/// A normalized `import` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDirective {
    /// Path within the current repository, or `owner/repo:path`.
    pub source: String,
    pub mode: MergeMode,
}

impl ImportDirective {
    /// Split a cross-repository source into `(owner/repo, path)`.
    fn remote(&self) -> Option<(&str, &str)> {
        self.source.split_once(':')
    }
}

/// Applies `import` directives to a Travis document.
pub struct ImportResolver<'a> {
    loader: &'a dyn Loader,
    loaders: &'a dyn LoaderFactory,
    cache: &'a LoadCache,
}

impl<'a> ImportResolver<'a> {
    /// `loader` serves same-repository imports; `loaders` opens the repositories
    /// named by `owner/repo:path` imports.
    pub fn new(loader: &'a dyn Loader, loaders: &'a dyn LoaderFactory, cache: &'a LoadCache) -> Self {
        Self {
            loader,
            loaders,
            cache,
        }
    }

    /// Resolve every import of `tree` in place.
    ///
    /// Afterwards `tree` holds no `import` key. A tree without imports is left untouched.
    pub fn apply(&self, tree: &mut Mapping) -> Result<()> {
        self.apply_nested(tree, None, &[TRAVIS_YML.to_string()])
    }

    fn apply_nested(
        &self,
        tree: &mut Mapping,
        relative_to: Option<&ImportDirective>,
        breadcrumb: &[String],
    ) -> Result<()> {
        let directives = match tree.get(IMPORT_KEY) {
            None => return Ok(()),
            Some(imports) => normalize_imports(imports, relative_to)?,
        };

        let context = context_name(relative_to);

        for directive in directives {
            if let Some(position) = breadcrumb.iter().position(|s| *s == directive.source) {
                let first_imported_in = match position {
                    0 => "the root document",
                    n => breadcrumb[n - 1].as_str(),
                };
                return Err(DetectError::ConfigError(format!(
                    "Circular import of {} in {} (first imported in {}): {} -> {}",
                    directive.source,
                    context,
                    first_imported_in,
                    breadcrumb.join(" -> "),
                    directive.source
                )));
            }

            let bytes = self.load_source(&directive)?;
            let mut imported = parse_mapping(&bytes, &directive.source)?;

            let mut trail = breadcrumb.to_vec();
            trail.push(directive.source.clone());
            self.apply_nested(&mut imported, Some(&directive), &trail)?;
            imported.shift_remove(IMPORT_KEY);

            debug!(source = %directive.source, mode = directive.mode.as_str(), "Merging import");
            directive.mode.apply(tree, &imported);
        }

        tree.shift_remove(IMPORT_KEY);
        Ok(())
    }

    fn load_source(&self, directive: &ImportDirective) -> Result<Vec<u8>> {
        match directive.remote() {
            Some((repository, path)) => {
                let loader = self
                    .loaders
                    .open(&Target::Repository(format!("https://github.com/{}", repository)))?;
                self.cache
                    .get_or_load(&loader.resource_id(path), || loader.load_file(path))
            }
            None => {
                let path = directive.source.as_str();
                self.cache
                    .get_or_load(&self.loader.resource_id(path), || self.loader.load_file(path))
            }
        }
    }
}

fn context_name(relative_to: Option<&ImportDirective>) -> &str {
    relative_to.map_or(TRAVIS_YML, |d| d.source.as_str())
}

/// Normalize the value of an `import` key into directives.
///
/// Conditional entries (`if:`) are validated like any other entry and then
/// dropped, since conditions are not evaluated.
pub fn normalize_imports(
    imports: &Node,
    relative_to: Option<&ImportDirective>,
) -> Result<Vec<ImportDirective>> {
    let context = context_name(relative_to);
    let mut directives = Vec::new();

    for entry in imports.as_list() {
        let (original, mode, condition) = match entry {
            Node::Scalar(source) => (source.as_str(), None, None),
            Node::Mapping(fields) => {
                let source = fields.get("source").and_then(Node::as_str).ok_or_else(|| {
                    DetectError::ConfigError(format!("Import without a source in {}", context))
                })?;
                let mode = fields.get("mode").and_then(Node::as_str);
                let condition = fields
                    .get("if")
                    .and_then(Node::as_str)
                    .filter(|c| !c.is_empty());
                (source, mode, condition)
            }
            _ => {
                return Err(DetectError::ConfigError(format!(
                    "Unsupported import entry in {}",
                    context
                )));
            }
        };

        let source = resolve_source(original, relative_to);

        if source.contains('@') {
            return Err(DetectError::ConfigError(format!(
                "Importing at commitish unsupported in {}: {}",
                context, original
            )));
        }

        let mode = match mode {
            None => MergeMode::default(),
            Some(name) => MergeMode::from_str(name).ok_or_else(|| {
                DetectError::ConfigError(format!(
                    "Invalid merge mode for {} in {}: {}",
                    original, context, name
                ))
            })?,
        };

        if let Some(condition) = condition {
            warn!(%source, %condition, "Skipping conditional import; conditions are not evaluated");
            continue;
        }

        directives.push(ImportDirective { source, mode });
    }

    Ok(directives)
}

/// Resolve a source as written in the document imported via `relative_to`.
///
/// `./x.yml` is a sibling of the importing document. Other sources are
/// absolute within the importing document's repository.
fn resolve_source(source: &str, relative_to: Option<&ImportDirective>) -> String {
    if let Some(stripped) = source.strip_prefix("./") {
        return match relative_to {
            Some(parent) => match parent.remote() {
                Some((repository, path)) => format!("{}:{}", repository, sibling(path, stripped)),
                None => sibling(&parent.source, stripped),
            },
            None => stripped.to_string(),
        };
    }

    match relative_to.and_then(ImportDirective::remote) {
        Some((repository, _)) if !source.contains(':') => format!("{}:{}", repository, source),
        _ => source.to_string(),
    }
}

/// `name` next to the document at `path`.
fn sibling(path: &str, name: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, _)) => format!("{}/{}", dir, name),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryLoader, MemoryLoaders};
    use crate::tree::parse_yaml;

    fn directive(source: &str) -> ImportDirective {
        ImportDirective {
            source: source.to_string(),
            mode: MergeMode::default(),
        }
    }

    fn yaml(text: &str) -> Node {
        parse_yaml(text.as_bytes()).unwrap()
    }

    #[test]
    fn test_normalize_string_and_object_entries() {
        let imports = yaml(
            "- partials/a.yml\n- source: partials/b.yml\n  mode: deep_merge_prepend\n",
        );
        let directives = normalize_imports(&imports, None).unwrap();

        assert_eq!(
            directives,
            vec![
                directive("partials/a.yml"),
                ImportDirective {
                    source: "partials/b.yml".to_string(),
                    mode: MergeMode::DeepMergePrepend,
                },
            ]
        );
    }

    #[test]
    fn test_normalize_single_entry() {
        let directives = normalize_imports(&yaml("source: partials/a.yml"), None).unwrap();
        assert_eq!(directives, vec![directive("partials/a.yml")]);
    }

    #[test]
    fn test_dot_slash_is_stripped_at_root() {
        let directives = normalize_imports(&yaml("./partials/a.yml"), None).unwrap();
        assert_eq!(directives[0].source, "partials/a.yml");
    }

    #[test]
    fn test_dot_slash_resolves_as_sibling() {
        let parent = directive("ci/partials/indirect.yml");
        let directives = normalize_imports(&yaml("./node-14.yml"), Some(&parent)).unwrap();
        assert_eq!(directives[0].source, "ci/partials/node-14.yml");
    }

    #[test]
    fn test_absolute_source_in_remote_document_stays_in_that_repository() {
        let parent = directive("owner/repo:ci/indirect.yml");

        let sibling = normalize_imports(&yaml("./node.yml"), Some(&parent)).unwrap();
        assert_eq!(sibling[0].source, "owner/repo:ci/node.yml");

        let absolute = normalize_imports(&yaml("shared/node.yml"), Some(&parent)).unwrap();
        assert_eq!(absolute[0].source, "owner/repo:shared/node.yml");

        let other = normalize_imports(&yaml("other/repo:node.yml"), Some(&parent)).unwrap();
        assert_eq!(other[0].source, "other/repo:node.yml");
    }

    #[test]
    fn test_sibling_of_remote_root_document_keeps_repository() {
        let parent = directive("owner/repo:indirect.yml");

        let sibling = normalize_imports(&yaml("./node.yml"), Some(&parent)).unwrap();
        assert_eq!(sibling[0].source, "owner/repo:node.yml");
    }

    #[test]
    fn test_remote_root_fragment_loads_sibling_from_same_repository() {
        let loader = MemoryLoader::new("local", &[]);
        let remote = MemoryLoader::new(
            "owner/shared",
            &[
                ("indirect.yml", "import: ./node.yml\n"),
                ("node.yml", "node_js: [\"14\"]\n"),
            ],
        );
        let loaders = MemoryLoaders::default().with_repository("owner/shared", remote.clone());
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(b"import: owner/shared:indirect.yml\n", TRAVIS_YML).unwrap();
        resolver.apply(&mut tree).unwrap();

        assert_eq!(tree.get("node_js"), Some(&Node::Sequence(vec!["14".into()])));
        assert_eq!(remote.loaded(), vec!["indirect.yml", "node.yml"]);
        assert!(loader.loaded().is_empty());
    }

    #[test]
    fn test_invalid_merge_mode_names_source_and_context() {
        let imports = yaml("source: partials/node-12.yml\nmode: no_such_merge_mode\n");

        let err = normalize_imports(&imports, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid merge mode for partials/node-12.yml in .travis.yml: no_such_merge_mode"
        );

        let parent = directive("partials/merge-invalid.yml");
        let err = normalize_imports(&imports, Some(&parent)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid merge mode for partials/node-12.yml in partials/merge-invalid.yml: no_such_merge_mode"
        );
    }

    #[test]
    fn test_commitish_is_rejected() {
        let err = normalize_imports(&yaml("partials/node-14.yml@main"), None).unwrap_err();
        assert!(matches!(err, DetectError::ConfigError(_)));
        assert_eq!(
            err.to_string(),
            "Importing at commitish unsupported in .travis.yml: partials/node-14.yml@main"
        );
    }

    #[test]
    fn test_conditional_imports_are_dropped() {
        let imports = yaml(
            "- source: partials/node-14.yml\n  if: branch = main\n- partials/node-12.yml\n",
        );
        let directives = normalize_imports(&imports, None).unwrap();
        assert_eq!(directives, vec![directive("partials/node-12.yml")]);
    }

    #[test]
    fn test_import_without_source_is_rejected() {
        let err = normalize_imports(&yaml("mode: merge"), None).unwrap_err();
        assert!(err.to_string().contains("without a source"));
    }

    #[test]
    fn test_apply_without_import_is_identity() {
        let loader = MemoryLoader::new("local", &[]);
        let loaders = MemoryLoaders::default();
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(b"language: node_js\nnode_js: [10]\n", TRAVIS_YML).unwrap();
        let before = tree.clone();
        resolver.apply(&mut tree).unwrap();

        assert_eq!(tree, before);
        assert!(loader.loaded().is_empty());
    }

    #[test]
    fn test_apply_removes_import_key() {
        let loader = MemoryLoader::new("local", &[("partials/node-14.yml", "node_js: 14\n")]);
        let loaders = MemoryLoaders::default();
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(b"import: partials/node-14.yml\n", TRAVIS_YML).unwrap();
        resolver.apply(&mut tree).unwrap();

        assert!(!tree.contains_key("import"));
        assert_eq!(tree.get("node_js"), Some(&Node::from("14")));
    }

    #[test]
    fn test_circular_import_is_fatal() {
        let loader = MemoryLoader::new(
            "local",
            &[
                ("partials/a.yml", "import: partials/b.yml\n"),
                ("partials/b.yml", "import: partials/a.yml\n"),
            ],
        );
        let loaders = MemoryLoaders::default();
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(b"import: partials/a.yml\n", TRAVIS_YML).unwrap();
        let err = resolver.apply(&mut tree).unwrap_err();

        assert!(matches!(err, DetectError::ConfigError(_)));
        assert_eq!(
            err.to_string(),
            "Circular import of partials/a.yml in partials/b.yml (first imported in .travis.yml): \
             .travis.yml -> partials/a.yml -> partials/b.yml -> partials/a.yml"
        );
    }

    #[test]
    fn test_self_import_is_fatal() {
        let loader = MemoryLoader::new("local", &[("partials/self.yml", "import: ./self.yml\n")]);
        let loaders = MemoryLoaders::default();
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(b"import: partials/self.yml\n", TRAVIS_YML).unwrap();
        let err = resolver.apply(&mut tree).unwrap_err();
        assert!(err.to_string().starts_with("Circular import of partials/self.yml"));
    }

    #[test]
    fn test_same_fragment_twice_is_not_a_cycle() {
        let loader = MemoryLoader::new(
            "local",
            &[
                ("partials/a.yml", "import: partials/common.yml\n"),
                ("partials/b.yml", "import: partials/common.yml\n"),
                ("partials/common.yml", "node_js: [10]\n"),
            ],
        );
        let loaders = MemoryLoaders::default();
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree =
            parse_mapping(b"import: [partials/a.yml, partials/b.yml]\n", TRAVIS_YML).unwrap();
        resolver.apply(&mut tree).unwrap();

        assert_eq!(
            tree.get("node_js"),
            Some(&Node::Sequence(vec!["10".into(), "10".into()]))
        );
        // The shared fragment is fetched once.
        assert_eq!(
            loader
                .loaded()
                .iter()
                .filter(|p| p.as_str() == "partials/common.yml")
                .count(),
            1
        );
    }

    #[test]
    fn test_missing_import_propagates_not_found() {
        let loader = MemoryLoader::new("local", &[]);
        let loaders = MemoryLoaders::default();
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(b"import: partials/missing.yml\n", TRAVIS_YML).unwrap();
        let err = resolver.apply(&mut tree).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_remote_import_uses_repository_loader() {
        let loader = MemoryLoader::new("local", &[]);
        let remote = MemoryLoader::new(
            "owner/shared",
            &[
                ("ci/indirect.yml", "import: ./node.yml\nlanguage: node_js\n"),
                ("ci/node.yml", "node_js: [\"14\"]\n"),
            ],
        );
        let loaders = MemoryLoaders::default().with_repository("owner/shared", remote.clone());
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(b"import: owner/shared:ci/indirect.yml\n", TRAVIS_YML).unwrap();
        resolver.apply(&mut tree).unwrap();

        assert_eq!(tree.get("language"), Some(&Node::from("node_js")));
        assert_eq!(tree.get("node_js"), Some(&Node::Sequence(vec!["14".into()])));
        assert_eq!(remote.loaded(), vec!["ci/indirect.yml", "ci/node.yml"]);
        assert!(loader.loaded().is_empty());
    }

    #[test]
    fn test_imports_merge_in_declared_order() {
        let loader = MemoryLoader::new(
            "local",
            &[
                ("partials/node-10.yml", "node_js: [\"10\"]\n"),
                ("partials/node-12.yml", "node_js: [\"12\"]\n"),
                ("partials/node-14.yml", "node_js: [\"14\"]\n"),
            ],
        );
        let loaders = MemoryLoaders::default();
        let cache = LoadCache::new();
        let resolver = ImportResolver::new(&loader, &loaders, &cache);

        let mut tree = parse_mapping(
            br#"
node_js: ["8"]
import:
  - partials/node-10.yml
  - source: partials/node-12.yml
    mode: deep_merge_prepend
  - source: partials/node-14.yml
    mode: deep_merge_append
"#,
            TRAVIS_YML,
        )
        .unwrap();
        resolver.apply(&mut tree).unwrap();

        assert_eq!(
            tree.get("node_js"),
            Some(&Node::Sequence(vec![
                "12".into(),
                "8".into(),
                "10".into(),
                "14".into()
            ]))
        );
    }
}
