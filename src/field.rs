use std::fmt;

/// Separator used to split list fields when no `envsep` is declared
pub const DEFAULT_SEPARATOR: &str = ",";

/// Binding metadata for one field, derived once from its tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name of the struct field, for diagnostics
    pub field: &'static str,
    /// Environment key to resolve
    pub key: &'static str,
    /// Whether absence after the default is fatal
    pub required: bool,
    /// Raw text used only when the key is absent
    pub default: Option<&'static str>,
    /// Delimiter for list fields
    pub separator: &'static str,
    /// Decode the raw text as JSON instead of primitive conversion
    pub json: bool,
    /// Validation rule, e.g. `min=1,max=10`
    pub rule: Option<&'static str>,
}

impl FieldDescriptor {
    pub const fn new(key: &'static str) -> Self {
        Self {
            field: key,
            key,
            required: false,
            default: None,
            separator: DEFAULT_SEPARATOR,
            json: false,
            rule: None,
        }
    }

    pub const fn field(mut self, field: &'static str) -> Self {
        self.field = field;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_value(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn separator(mut self, separator: &'static str) -> Self {
        self.separator = separator;
        self
    }

    pub const fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub const fn rule(mut self, rule: &'static str) -> Self {
        self.rule = Some(rule);
        self
    }

    /// The default, ignoring an empty one
    pub fn default_text(&self) -> Option<&'static str> {
        self.default.filter(|d| !d.is_empty())
    }

    /// The separator, falling back to `,` when empty
    pub fn separator_text(&self) -> &'static str {
        if self.separator.is_empty() {
            DEFAULT_SEPARATOR
        } else {
            self.separator
        }
    }

    pub fn rule_text(&self) -> Option<&'static str> {
        self.rule.filter(|r| !r.trim().is_empty())
    }
}

/// Semantic type of a bindable field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Bool,
    Int(u32),
    Uint(u32),
    Float(u32),
    Duration,
    Url,
    List(Box<FieldKind>),
    Optional(Box<FieldKind>),
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::String => write!(f, "string"),
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::Int(bits) => write!(f, "i{bits}"),
            FieldKind::Uint(bits) => write!(f, "u{bits}"),
            FieldKind::Float(bits) => write!(f, "f{bits}"),
            FieldKind::Duration => write!(f, "duration"),
            FieldKind::Url => write!(f, "url"),
            FieldKind::List(elem) => write!(f, "list of {elem}"),
            FieldKind::Optional(inner) => write!(f, "optional {inner}"),
        }
    }
}
