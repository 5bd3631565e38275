//! Declaration types: features, tables, fields and HTTP-triggered workflows.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Relationship {
    ManyToOne,
    OneToOne,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum FieldKind {
    ShortText,
    LongText,
    Url,
    Datetime,
    /// Foreign key to another table's `id`. Stored as `<name>_id`.
    Relation {
        references: String,
        relationship: Relationship,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldConfig {
    pub fn short_text(name: &str) -> Self {
        Self::new(name, FieldKind::ShortText)
    }

    pub fn long_text(name: &str) -> Self {
        Self::new(name, FieldKind::LongText)
    }

    pub fn url(name: &str) -> Self {
        Self::new(name, FieldKind::Url)
    }

    pub fn datetime(name: &str) -> Self {
        Self::new(name, FieldKind::Datetime)
    }

    pub fn relation(name: &str, references: &str, relationship: Relationship) -> Self {
        Self::new(
            name,
            FieldKind::Relation {
                references: references.to_string(),
                relationship,
            },
        )
    }

    fn new(name: &str, kind: FieldKind) -> Self {
        FieldConfig {
            name: name.to_string(),
            kind,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub fields: Vec<FieldConfig>,
}

impl TableConfig {
    pub fn new(name: &str, fields: Vec<FieldConfig>) -> Self {
        TableConfig {
            name: name.to_string(),
            fields,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    Body,
    Query,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    #[default]
    String,
    Integer,
}

/// Per-input checks, applied in order: presence, coercion, trim, length, range, format.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub kind: ValueKind,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub trim: bool,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

impl ValidationRule {
    pub fn string() -> Self {
        ValidationRule::default()
    }

    pub fn integer() -> Self {
        ValidationRule {
            kind: ValueKind::Integer,
            ..ValidationRule::default()
        }
    }

    pub fn uuid() -> Self {
        ValidationRule::string().format("uuid")
    }

    pub fn url() -> Self {
        ValidationRule::string().format("url")
    }

    pub fn format(mut self, format: &str) -> Self {
        self.format = Some(format.to_string());
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn min_length(mut self, n: u32) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn minimum(mut self, n: f64) -> Self {
        self.minimum = Some(n);
        self
    }

    pub fn maximum(mut self, n: f64) -> Self {
        self.maximum = Some(n);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default = Some(value);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InputField {
    pub name: String,
    pub source: InputSource,
    pub rule: ValidationRule,
}

impl InputField {
    pub fn body(name: &str, rule: ValidationRule) -> Self {
        InputField {
            name: name.to_string(),
            source: InputSource::Body,
            rule,
        }
    }

    pub fn query(name: &str, rule: ValidationRule) -> Self {
        InputField {
            name: name.to_string(),
            source: InputSource::Query,
            rule,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpTrigger {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub input: Vec<InputField>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub name: String,
    /// Route prefix; the workflow is served at `/{tag}{trigger.path}`.
    pub tag: String,
    pub trigger: HttpTrigger,
}

impl WorkflowConfig {
    pub fn http(name: &str, tag: &str, method: HttpMethod, path: &str, input: Vec<InputField>) -> Self {
        WorkflowConfig {
            name: name.to_string(),
            tag: tag.to_string(),
            trigger: HttpTrigger {
                method,
                path: path.to_string(),
                input,
            },
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FeatureConfig {
    pub name: String,
    pub tables: Vec<TableConfig>,
    pub workflows: Vec<WorkflowConfig>,
}

/// All declarations for one process, built once at start-up.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AppConfig {
    /// PostgreSQL schema holding every declared table.
    pub schema: String,
    /// Tables owned by other services (e.g. `users` from the identity provider). Relations may
    /// reference them; they are never queried or joined.
    #[serde(default)]
    pub external_tables: Vec<String>,
    pub features: Vec<FeatureConfig>,
}
