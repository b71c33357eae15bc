//! Minimal HCL writer
//!
//! Emits blocks, attributes, maps and lists with two-space indentation.
//! Output depends only on the calls made, so identical input renders
//! byte-for-byte identical text.

use permit_export_core::WarningCollector;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Quote and escape a string literal
///
/// Besides the usual escapes, `${` and `%{` are doubled so that no value
/// can introduce an interpolation or template directive.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');

    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '$' | '%' if chars.peek() == Some(&'{') => {
                out.push(c);
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out.push('"');
    out
}

/// Turn an arbitrary key into a valid block label / identifier
///
/// Characters outside `[A-Za-z0-9_-]` become `_`; a leading digit or
/// hyphen gets a `_` prefix.
pub fn sanitize_label(key: &str) -> String {
    let mut label: String = key
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    match label.chars().next() {
        None => label.push('_'),
        Some(c) if c.is_ascii_digit() || c == '-' => label.insert(0, '_'),
        _ => {}
    }

    label
}

/// Labels handed out during one export, shared by every stage
///
/// Blocks are registered under their entity key; references are resolved
/// through the same table, so a reference always names the block that was
/// actually emitted for that key, including a suffixed one.
#[derive(Debug, Clone, Default)]
pub struct LabelRegistry {
    inner: Arc<Mutex<HashMap<&'static str, TypeLabels>>>,
}

#[derive(Debug, Default)]
struct TypeLabels {
    used: HashSet<String>,
    by_key: HashMap<String, String>,
    emitted: HashSet<String>,
}

impl TypeLabels {
    fn unique(&mut self, base: &str) -> String {
        let base = sanitize_label(base);
        if self.used.insert(base.clone()) {
            return base;
        }

        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if self.used.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl LabelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_type<R>(
        &self,
        resource_type: &'static str,
        f: impl FnOnce(&mut TypeLabels) -> R,
    ) -> R {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(inner.entry(resource_type).or_default())
    }

    /// Reserve a label for an entity a later stage will emit
    ///
    /// Lets an earlier stage reference it. Declaring the same key twice
    /// returns the same label.
    pub fn declare(&self, resource_type: &'static str, key: &str, base: &str) -> String {
        self.with_type(resource_type, |labels| {
            if let Some(label) = labels.by_key.get(key) {
                return label.clone();
            }
            let label = labels.unique(base);
            labels.by_key.insert(key.to_string(), label.clone());
            label
        })
    }

    /// Label for a block about to be emitted, derived from its key
    pub fn allocate(
        &self,
        resource_type: &'static str,
        key: &str,
        warnings: &WarningCollector,
    ) -> String {
        self.allocate_as(resource_type, key, key, warnings)
    }

    /// Label for a block about to be emitted, derived from `base`
    ///
    /// A label that had to be suffixed `_2`, `_3`, ... is reported. A key
    /// emitted twice gets a fresh label; references keep resolving to the
    /// first block.
    pub fn allocate_as(
        &self,
        resource_type: &'static str,
        key: &str,
        base: &str,
        warnings: &WarningCollector,
    ) -> String {
        let label = self.with_type(resource_type, |labels| {
            if labels.emitted.insert(key.to_string()) {
                if let Some(label) = labels.by_key.get(key) {
                    return label.clone();
                }
                let label = labels.unique(base);
                labels.by_key.insert(key.to_string(), label.clone());
                label
            } else {
                labels.unique(base)
            }
        });

        if label != sanitize_label(base) {
            warnings.add(format!(
                "{} '{}' collides with another label after sanitization; renamed to '{}'",
                resource_type, key, label
            ));
        }
        label
    }

    /// Reference expression `<resource_type>.<label>` for a registered key
    pub fn resolve(&self, resource_type: &'static str, key: &str) -> Option<String> {
        self.with_type(resource_type, |labels| {
            labels
                .by_key
                .get(key)
                .map(|label| format!("{}.{}", resource_type, label))
        })
    }
}

/// Render a JSON value as an inline HCL expression
///
/// Object keys come out in serde_json's map order (sorted), so the same
/// value always renders the same way.
pub fn json_expr(value: &serde_json::Value) -> String {
    use serde_json::Value;

    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(json_expr).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) if map.is_empty() => "{}".to_string(),
        Value::Object(map) => {
            let entries: Vec<String> = map
                .iter()
                .map(|(k, v)| format!("{} = {}", quote(k), json_expr(v)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
    }
}

/// Line-oriented HCL builder
#[derive(Debug, Default)]
pub struct HclWriter {
    out: String,
    depth: usize,
}

impl HclWriter {
    pub fn new() -> Self {
        Self::default()
    }

    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    /// `# text`
    pub fn comment(&mut self, text: &str) {
        self.line(&format!("# {}", text));
    }

    pub fn blank_line(&mut self) {
        self.out.push('\n');
    }

    /// `<kind> "label1" "label2" {`
    pub fn open_block(&mut self, kind: &str, labels: &[&str]) {
        let mut header = kind.to_string();
        for label in labels {
            header.push(' ');
            header.push_str(&quote(label));
        }
        header.push_str(" {");
        self.line(&header);
        self.depth += 1;
    }

    /// `resource "<resource_type>" "<label>" {`
    pub fn open_resource(&mut self, resource_type: &str, label: &str) {
        self.open_block("resource", &[resource_type, label]);
    }

    /// `name = {`
    pub fn open_map(&mut self, name: &str) {
        self.line(&format!("{} = {{", name));
        self.depth += 1;
    }

    /// `"key" = {`
    pub fn open_map_entry(&mut self, key: &str) {
        self.line(&format!("{} = {{", quote(key)));
        self.depth += 1;
    }

    /// Close the innermost block or map
    pub fn close(&mut self) {
        self.depth = self.depth.saturating_sub(1);
        self.line("}");
    }

    /// `name = "value"`
    pub fn string(&mut self, name: &str, value: &str) {
        self.line(&format!("{} = {}", name, quote(value)));
    }

    /// `name = "value"`, omitted when `value` is `None` or empty
    pub fn optional_string(&mut self, name: &str, value: Option<&str>) {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.string(name, value);
        }
    }

    /// `name = <expression>`, unquoted
    pub fn expr(&mut self, name: &str, expression: &str) {
        self.line(&format!("{} = {}", name, expression));
    }

    /// `name = ["a", "b"]`
    pub fn string_list<S: AsRef<str>>(&mut self, name: &str, values: &[S]) {
        let items: Vec<String> = values.iter().map(|v| quote(v.as_ref())).collect();
        self.expr(name, &format!("[{}]", items.join(", ")));
    }

    /// `name = [a.b, c.d]`, unquoted; omitted when empty
    pub fn expr_list<S: AsRef<str>>(&mut self, name: &str, expressions: &[S]) {
        if expressions.is_empty() {
            return;
        }
        let items: Vec<&str> = expressions.iter().map(|e| e.as_ref()).collect();
        self.expr(name, &format!("[{}]", items.join(", ")));
    }

    pub fn finish(self) -> String {
        self.out
    }
}
