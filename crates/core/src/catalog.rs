//! The error catalog — every numbered error Smelter can raise.
//!
//! Errors are grouped into categories, each owning an inclusive id range.
//! A catalog is built once at startup, validated, and then shared read-only
//! (typically behind an `Arc`) with whatever needs to resolve error ids.
//!
//! ## Id ranges of the built-in catalog
//!
//! | Range   | Category         |
//! |---------|------------------|
//! | 1-99    | General          |
//! | 100-199 | Network          |
//! | 200-299 | Task definitions |
//! | 300-399 | Arguments        |
//! | 600-699 | Built-in tasks   |
//! | 800-899 | Plugins          |

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Category ──────────────────────────────────────────────────────────────

/// A family of errors owning the id range `min..=max`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorCategory {
    /// Human-readable title, e.g. "Network".
    pub title: String,
    /// Short SCREAMING_SNAKE_CASE name, e.g. "NETWORK".
    pub name: String,
    /// Lowest id in the range.
    pub min: u32,
    /// Highest id in the range.
    pub max: u32,
}

impl ErrorCategory {
    /// A category owning the inclusive range `min..=max`.
    pub fn new(title: impl Into<String>, name: impl Into<String>, min: u32, max: u32) -> Self {
        Self {
            title: title.into(),
            name: name.into(),
            min,
            max,
        }
    }

    /// Whether `id` falls inside this category's range.
    pub fn contains(&self, id: u32) -> bool {
        (self.min..=self.max).contains(&id)
    }
}

// ── Descriptor ────────────────────────────────────────────────────────────

/// Static description of one numbered error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    /// Stable numeric id.
    pub number: u32,
    /// Message template, see [`crate::template`].
    pub message: String,
    /// Short title.
    pub title: String,
    /// Longer explanation, usually with a hint on how to fix it.
    pub description: String,
    /// Whether occurrences should be sent to analytics.
    #[serde(default = "default_true")]
    pub should_be_reported: bool,
}

fn default_true() -> bool {
    true
}

impl ErrorDescriptor {
    pub fn new(
        number: u32,
        title: impl Into<String>,
        message: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            number,
            message: message.into(),
            title: title.into(),
            description: description.into(),
            should_be_reported: true,
        }
    }

    /// Mark this error as not worth reporting.
    pub fn unreported(mut self) -> Self {
        self.should_be_reported = false;
        self
    }
}

/// A resolved catalog entry: descriptor plus its canonical name and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Canonical SCREAMING_SNAKE_CASE name, e.g. "INVALID_RPC_URL".
    pub name: String,
    /// The category owning this entry's id.
    pub category: ErrorCategory,
    pub descriptor: ErrorDescriptor,
}

impl CatalogEntry {
    pub fn number(&self) -> u32 {
        self.descriptor.number
    }
}

// ── Catalog ───────────────────────────────────────────────────────────────

/// Immutable, validated mapping from error id to [`CatalogEntry`].
#[derive(Debug, Clone)]
pub struct ErrorCatalog {
    categories: Vec<ErrorCategory>,
    entries: BTreeMap<u32, CatalogEntry>,
    names: HashMap<String, u32>,
}

impl ErrorCatalog {
    /// Start building a catalog.
    pub fn builder() -> CatalogBuilder {
        CatalogBuilder::default()
    }

    /// A catalog with no categories and no errors.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
            entries: BTreeMap::new(),
            names: HashMap::new(),
        }
    }

    /// Look up an error by id.
    pub fn lookup(&self, id: u32) -> Option<&CatalogEntry> {
        self.entries.get(&id)
    }

    /// Look up an error by its canonical name.
    pub fn by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.names.get(name).and_then(|id| self.entries.get(id))
    }

    /// The category whose range contains `id`, registered or not.
    pub fn category_for(&self, id: u32) -> Option<&ErrorCategory> {
        self.categories.iter().find(|c| c.contains(id))
    }

    /// All categories, ordered by range.
    pub fn categories(&self) -> &[ErrorCategory] {
        &self.categories
    }

    /// Entries ordered by id.
    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a catalog from TOML.
    ///
    /// ```toml
    /// [[categories]]
    /// title = "Network"
    /// name = "NETWORK"
    /// min = 100
    /// max = 199
    ///
    /// [[categories.errors]]
    /// name = "INVALID_RPC_URL"
    /// number = 104
    /// title = "Invalid RPC URL"
    /// message = "Invalid URL %url% for network %network%"
    /// description = "Check the url of your network config."
    /// ```
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Self::builder().toml(toml_str)?.build()
    }

    /// Lay the categories and errors of a TOML catalog over this one.
    ///
    /// A category already present here may be repeated verbatim to add
    /// errors to it. Any conflict with existing ids, names or ranges is
    /// rejected like in [`CatalogBuilder::build`].
    pub fn extend_from_toml(&self, toml_str: &str) -> Result<Self> {
        self.to_builder().toml(toml_str)?.build()
    }

    /// A builder seeded with every category and error of this catalog.
    pub fn to_builder(&self) -> CatalogBuilder {
        CatalogBuilder {
            categories: self.categories.clone(),
            errors: self
                .entries
                .values()
                .map(|e| (e.category.name.clone(), e.name.clone(), e.descriptor.clone()))
                .collect(),
        }
    }

    /// The built-in Smelter catalog.
    pub fn with_defaults() -> Self {
        let mut builder = Self::builder();
        for (title, name, min, max) in DEFAULT_CATEGORIES {
            builder = builder.category(ErrorCategory::new(*title, *name, *min, *max));
        }
        for e in DEFAULT_ERRORS {
            let descriptor = ErrorDescriptor::new(e.number, e.title, e.message, e.description);
            let descriptor = if e.reported {
                descriptor
            } else {
                descriptor.unreported()
            };
            builder = builder.error(e.category, e.name, descriptor);
        }
        // The table is covered by `default_catalog_is_valid`; an inconsistency
        // there is a bug in this file.
        builder
            .build()
            .unwrap_or_else(|e| panic!("built-in error catalog is inconsistent: {e}"))
    }
}

impl Default for ErrorCatalog {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ── Builder ───────────────────────────────────────────────────────────────

/// Collects categories and errors, validating everything in [`build`](Self::build).
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    categories: Vec<ErrorCategory>,
    errors: Vec<(String, String, ErrorDescriptor)>,
}

impl CatalogBuilder {
    /// Register a category.
    pub fn category(mut self, category: ErrorCategory) -> Self {
        self.categories.push(category);
        self
    }

    /// Register an error under the category named `category`.
    pub fn error(
        mut self,
        category: &str,
        name: impl Into<String>,
        descriptor: ErrorDescriptor,
    ) -> Self {
        self.errors
            .push((category.to_string(), name.into(), descriptor));
        self
    }

    /// Register the categories and errors of a TOML catalog document.
    ///
    /// A category identical to one already registered is not added twice.
    pub fn toml(mut self, toml_str: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(toml_str)?;
        for category in file.categories {
            let name = category.name.clone();
            let parsed = ErrorCategory::new(category.title, category.name, category.min, category.max);
            if !self.categories.contains(&parsed) {
                self.categories.push(parsed);
            }
            for error in category.errors {
                let descriptor = ErrorDescriptor {
                    number: error.number,
                    message: error.message,
                    title: error.title,
                    description: error.description,
                    should_be_reported: error.should_be_reported,
                };
                self = self.error(&name, error.name, descriptor);
            }
        }
        Ok(self)
    }

    /// Validate and freeze the catalog.
    pub fn build(self) -> Result<ErrorCatalog> {
        let mut categories = self.categories;
        categories.sort_by_key(|c| c.min);

        for c in &categories {
            if c.min > c.max {
                return Err(Error::catalog(format!(
                    "category {} has an empty range {}..={}",
                    c.name, c.min, c.max
                )));
            }
        }
        for pair in categories.windows(2) {
            if pair[0].max >= pair[1].min {
                return Err(Error::catalog(format!(
                    "categories {} and {} have overlapping ranges",
                    pair[0].name, pair[1].name
                )));
            }
        }

        let by_name: HashMap<&str, &ErrorCategory> =
            categories.iter().map(|c| (c.name.as_str(), c)).collect();
        if by_name.len() != categories.len() {
            return Err(Error::catalog("category names must be unique"));
        }

        let mut entries: BTreeMap<u32, CatalogEntry> = BTreeMap::new();
        let mut names: HashMap<String, u32> = HashMap::new();

        for (category_name, name, descriptor) in self.errors {
            let category = by_name.get(category_name.as_str()).ok_or_else(|| {
                Error::catalog(format!(
                    "error {name} references unknown category {category_name}"
                ))
            })?;
            let id = descriptor.number;
            if !category.contains(id) {
                return Err(Error::catalog(format!(
                    "error {name} has id {id} outside category {} ({}..={})",
                    category.name, category.min, category.max
                )));
            }
            if let Some(prev) = entries.get(&id).map(|e| e.name.as_str()) {
                return Err(Error::catalog(format!(
                    "error id {id} is used by both {prev} and {name}"
                )));
            }
            if names.insert(name.clone(), id).is_some() {
                return Err(Error::catalog(format!("error name {name} is used twice")));
            }
            entries.insert(
                id,
                CatalogEntry {
                    name,
                    category: (*category).clone(),
                    descriptor,
                },
            );
        }

        Ok(ErrorCatalog {
            categories,
            entries,
            names,
        })
    }
}

// ── TOML schema ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    categories: Vec<CategoryFile>,
}

#[derive(Debug, Deserialize)]
struct CategoryFile {
    title: String,
    name: String,
    min: u32,
    max: u32,
    #[serde(default)]
    errors: Vec<ErrorFile>,
}

#[derive(Debug, Deserialize)]
struct ErrorFile {
    name: String,
    number: u32,
    title: String,
    message: String,
    #[serde(default)]
    description: String,
    #[serde(default = "default_true")]
    should_be_reported: bool,
}

// ── Built-in table ────────────────────────────────────────────────────────

struct DefaultError {
    category: &'static str,
    number: u32,
    name: &'static str,
    title: &'static str,
    message: &'static str,
    description: &'static str,
    reported: bool,
}

const DEFAULT_CATEGORIES: &[(&str, &str, u32, u32)] = &[
    ("General", "GENERAL", 1, 99),
    ("Network", "NETWORK", 100, 199),
    ("Task definitions", "TASK_DEFINITIONS", 200, 299),
    ("Arguments", "ARGUMENTS", 300, 399),
    ("Built-in tasks", "BUILTIN_TASKS", 600, 699),
    ("Plugins", "PLUGINS", 800, 899),
];

const DEFAULT_ERRORS: &[DefaultError] = &[
    // General
    DefaultError {
        category: "GENERAL",
        number: 1,
        name: "NOT_INSIDE_PROJECT",
        title: "You are not inside a Smelter project",
        message: "You are not inside a Smelter project.",
        description: "You are trying to run Smelter outside of a project. \
                      Create a smelter.toml or move into a directory that has one.",
        reported: false,
    },
    DefaultError {
        category: "GENERAL",
        number: 2,
        name: "UNSUPPORTED_RUNTIME_VERSION",
        title: "Unsupported runtime version",
        message: "Smelter doesn't support your runtime version. It should be %requirement%.",
        description: "Upgrade your runtime to a supported version.",
        reported: true,
    },
    DefaultError {
        category: "GENERAL",
        number: 3,
        name: "CONTEXT_ALREADY_CREATED",
        title: "Smelter context already created",
        message: "Smelter context is already created.",
        description: "The runtime context was initialized twice. This is a bug, please report it.",
        reported: true,
    },
    DefaultError {
        category: "GENERAL",
        number: 4,
        name: "CONFIG_NOT_FOUND",
        title: "Config file not found",
        message: "Config file %path% not found.",
        description: "Make sure the config path you passed exists.",
        reported: false,
    },
    DefaultError {
        category: "GENERAL",
        number: 5,
        name: "INVALID_CONFIG",
        title: "Invalid Smelter config",
        message: "Invalid config: %errors%",
        description: "Fix the listed fields in your smelter.toml.",
        reported: false,
    },
    // Network
    DefaultError {
        category: "NETWORK",
        number: 100,
        name: "NETWORK_NOT_FOUND",
        title: "Selected network doesn't exist",
        message: "Network %network% doesn't exist",
        description: "Check the networks table of your config.",
        reported: false,
    },
    DefaultError {
        category: "NETWORK",
        number: 101,
        name: "CONNECTION_REFUSED",
        title: "Cannot connect to the network",
        message: "Cannot connect to the network %network%. Please make sure your node is running.",
        description: "The node at the configured url refused the connection.",
        reported: true,
    },
    DefaultError {
        category: "NETWORK",
        number: 102,
        name: "REQUEST_TIMEOUT",
        title: "Network request timed out",
        message: "Request to %url% timed out after %seconds%s",
        description: "The node took too long to answer. Try again or raise the timeout.",
        reported: true,
    },
    DefaultError {
        category: "NETWORK",
        number: 103,
        name: "MISSING_CREDENTIALS",
        title: "Missing network credentials",
        message: "Network %network% requires credentials but none were configured.",
        description: "Add credentials for this network to your config.",
        reported: false,
    },
    DefaultError {
        category: "NETWORK",
        number: 104,
        name: "INVALID_RPC_URL",
        title: "Invalid RPC URL",
        message: "Invalid URL %url% for network %network%",
        description: "The url of a network config must be a valid http(s) url.",
        reported: true,
    },
    // Task definitions
    DefaultError {
        category: "TASK_DEFINITIONS",
        number: 200,
        name: "PARAM_AFTER_VARIADIC",
        title: "Could not add positional param",
        message: "Could not set positional param %paramName% for task %taskName% because \
                  there is already a variadic positional param and it has to be the last one.",
        description: "Variadic positional params must be the last param of a task.",
        reported: true,
    },
    DefaultError {
        category: "TASK_DEFINITIONS",
        number: 201,
        name: "PARAM_ALREADY_DEFINED",
        title: "Could not add param",
        message: "Could not set param %paramName% for task %taskName% because its name is already used.",
        description: "Every param of a task needs a unique name.",
        reported: true,
    },
    DefaultError {
        category: "TASK_DEFINITIONS",
        number: 202,
        name: "DEFAULT_IN_MANDATORY_PARAM",
        title: "Default value in mandatory param",
        message: "Default value for param %paramName% of task %taskName% doesn't make sense because it's mandatory.",
        description: "Make the param optional or drop its default value.",
        reported: true,
    },
    DefaultError {
        category: "TASK_DEFINITIONS",
        number: 203,
        name: "OVERRIDE_NO_MANDATORY_PARAMS",
        title: "Attempted to add mandatory params to an overridden task",
        message: "Redefinition of task %taskName% failed. You can't add mandatory (non optional) param definitions in an overridden task.",
        description: "Overridden tasks may only add optional params.",
        reported: true,
    },
    // Arguments
    DefaultError {
        category: "ARGUMENTS",
        number: 300,
        name: "INVALID_ENV_VAR_VALUE",
        title: "Invalid environment variable value",
        message: "Invalid environment variable %varName%'s value: %value%",
        description: "Fix the value of the environment variable.",
        reported: false,
    },
    DefaultError {
        category: "ARGUMENTS",
        number: 301,
        name: "INVALID_VALUE_FOR_TYPE",
        title: "Invalid argument type",
        message: "Invalid value %value% for argument %name% of type %type%",
        description: "The value passed doesn't match the declared type of the argument.",
        reported: false,
    },
    DefaultError {
        category: "ARGUMENTS",
        number: 302,
        name: "INVALID_INPUT_FILE",
        title: "Invalid file argument",
        message: "Invalid argument %name%: File %value% doesn't exist or is not a readable file.",
        description: "Pass a path to an existing, readable file.",
        reported: false,
    },
    DefaultError {
        category: "ARGUMENTS",
        number: 303,
        name: "UNRECOGNIZED_TASK",
        title: "Unrecognized task",
        message: "Unrecognized task %task%",
        description: "Run `smelter help` to list the available tasks.",
        reported: false,
    },
    DefaultError {
        category: "ARGUMENTS",
        number: 304,
        name: "MISSING_TASK_ARGUMENT",
        title: "Missing task argument",
        message: "Missing parameter %param% in task %task%",
        description: "Pass every mandatory param of the task.",
        reported: false,
    },
    // Built-in tasks
    DefaultError {
        category: "BUILTIN_TASKS",
        number: 600,
        name: "COMPILE_FAILURE",
        title: "Compilation failed",
        message: "Compilation failed",
        description: "Your sources failed to compile. Fix the reported errors and try again.",
        reported: false,
    },
    DefaultError {
        category: "BUILTIN_TASKS",
        number: 601,
        name: "RUN_FILE_NOT_FOUND",
        title: "Script doesn't exist",
        message: "Script %script% doesn't exist.",
        description: "Check the path of the script you tried to run.",
        reported: false,
    },
    DefaultError {
        category: "BUILTIN_TASKS",
        number: 602,
        name: "RUN_SCRIPT_ERROR",
        title: "Error running script",
        message: "Error running script {%script%}: %error%",
        description: "The script failed while it was run by Smelter.",
        reported: true,
    },
    // Plugins
    DefaultError {
        category: "PLUGINS",
        number: 800,
        name: "NOT_INSTALLED",
        title: "Plugin not installed",
        message: "Plugin %plugin% is not installed.",
        description: "Install the plugin before enabling it in your config.",
        reported: false,
    },
    DefaultError {
        category: "PLUGINS",
        number: 801,
        name: "MISSING_DEPENDENCY",
        title: "Plugin dependency not installed",
        message: "Plugin %plugin% requires %dependency% to be installed.",
        description: "Install the listed dependency of the plugin.",
        reported: false,
    },
];
