//! Shared vocabulary and the reserved-prefix patterns.

use lazy_static::lazy_static;
use regex::Regex;

// ============================================================================
// UI Vocabulary
// ============================================================================

/// Substrings that mark a token as UI-ish. Gate for the two broad extractors.
const UI_VOCABULARY: &[&str] = &[
    "button", "btn", "modal", "dialog", "popup", "popover", "tooltip", "dropdown",
    "select", "combo", "picker", "calendar", "date", "input", "field", "textarea",
    "checkbox", "radio", "switch", "toggle", "slider", "table", "grid", "row",
    "column", "cell", "list", "tree", "tab", "menu", "nav", "sidebar", "header",
    "footer", "panel", "card", "form", "chart", "graph", "badge", "chip", "tag",
    "avatar", "icon", "image", "upload", "stepper", "wizard", "pagination",
    "breadcrumb", "accordion", "toast", "alert", "banner", "spinner", "loader",
    "progress", "search", "filter", "layout", "drawer", "toolbar", "editor",
];

/// Common runtime/platform type names that look like multi-word PascalCase
/// identifiers but never name a UI component of this project
const PLATFORM_TYPE_DENYLIST: &[&str] = &[
    "TypeError",
    "ReferenceError",
    "SyntaxError",
    "RangeError",
    "ReadonlyArray",
    "ArrayBuffer",
    "DataView",
    "WeakMap",
    "WeakSet",
    "JsonObject",
    "HttpClient",
    "HttpRequest",
    "HttpResponse",
    "HttpHeaders",
    "HttpErrorResponse",
    "EventEmitter",
    "ElementRef",
    "ViewChild",
    "NgModule",
    "FormControl",
    "FormGroup",
    "FormBuilder",
    "ChangeDetectorRef",
    "OnInit",
    "OnDestroy",
    "AfterViewInit",
    "HTMLElement",
    "HTMLInputElement",
    "HTMLDivElement",
    "MouseEvent",
    "KeyboardEvent",
    "NullPointerException",
    "JavaScript",
    "TypeScript",
    "GitHub",
    "GitLab",
    "PowerShell",
    "LocalStorage",
    "SessionStorage",
    "PostgreSQL",
    "MySql",
    "MongoDb",
];

lazy_static! {
    /// Two or more capitalized segments: `DataTable`, `UserProfileCard`
    pub static ref RE_MULTI_PASCAL: Regex =
        Regex::new(r"\b[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]+)+\b").unwrap();

    /// Anchored form used to rank candidates
    pub static ref RE_PASCAL_STRUCTURED: Regex =
        Regex::new(r"^[A-Z][a-z0-9]+(?:[A-Z][a-z0-9]+)+").unwrap();

    /// `word(-word)+`
    pub static ref RE_KEBAB: Regex =
        Regex::new(r"\b[a-z][a-z0-9]*(?:-[a-z0-9]+)+\b").unwrap();
}

/// Whether a token plausibly names a UI component
pub fn looks_like_component_name(name: &str) -> bool {
    if name.chars().count() < 3 {
        return false;
    }
    if name.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return false;
    }
    let lower = name.to_lowercase();
    UI_VOCABULARY.iter().any(|term| lower.contains(term))
}

pub fn is_platform_type(name: &str) -> bool {
    PLATFORM_TYPE_DENYLIST.contains(&name)
}

// ============================================================================
// Reserved Prefix
// ============================================================================

/// Patterns derived from the component library's namespace token.
///
/// A prefix of `cfa` matches `CfaDataTable`, `cfa-data-table` and the name
/// segment of `@cfa/data-table`.
#[derive(Debug, Clone)]
pub struct ReservedPrefix {
    lower: String,
    pascal: String,
    re_pascal: Regex,
    re_kebab: Regex,
    re_import: Regex,
}

impl ReservedPrefix {
    pub fn new(prefix: &str) -> Result<Self, regex::Error> {
        let lower = prefix.trim().to_lowercase();
        let pascal = capitalize(&lower);
        let lower_esc = regex::escape(&lower);
        let pascal_esc = regex::escape(&pascal);

        Ok(Self {
            re_pascal: Regex::new(&format!(r"\b{}[A-Z][A-Za-z0-9]*\b", pascal_esc))?,
            re_kebab: Regex::new(&format!(r"\b{}(?:-[a-z0-9]+)+\b", lower_esc))?,
            re_import: Regex::new(&format!(r"@{}/([a-z0-9]+(?:-[a-z0-9]+)*)", lower_esc))?,
            lower,
            pascal,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.lower
    }

    /// `CfaX...` or `cfa-...`
    pub fn is_prefixed(&self, name: &str) -> bool {
        let kebab = format!("{}-", self.lower);
        if name.starts_with(&kebab) && name.len() > kebab.len() {
            return true;
        }
        name.strip_prefix(&self.pascal)
            .and_then(|rest| rest.chars().next())
            .is_some_and(|c| c.is_ascii_uppercase())
    }

    pub fn pascal_matches<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.re_pascal.find_iter(text).map(|m| m.as_str()).collect()
    }

    pub fn kebab_matches<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.re_kebab.find_iter(text).map(|m| m.as_str()).collect()
    }

    /// Trailing name segment of each `@prefix/name` path
    pub fn import_matches<'t>(&self, text: &'t str) -> Vec<&'t str> {
        self.re_import
            .captures_iter(text)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect()
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

// ============================================================================
// Tests
// ============================================================================
