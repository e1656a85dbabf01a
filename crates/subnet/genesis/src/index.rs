//! Span-recording renderer
//!
//! The document is written out by hand in the same layout as
//! `serde_json::to_string_pretty`, and every subtree records its own byte and
//! line range as it is written. Lookups are therefore exact even when a value
//! happens to contain text that looks like a key.
//!
//! Paths are dotted: `config.feeConfig.gasLimit`, `alloc.<address>.balance`,
//! `config.txAllowListConfig.adminAddresses.0`. On top of the document paths
//! the index carries logical aliases (`chainId`, `feeConfig.*`,
//! `tokenAllocations`, `tokenAllocations.<i>`, `predeploy.<name>`,
//! `<precompile>`, `genesis`).

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::{Precompile, RenderError, Synthesized, paths};

/// What a span covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// A complete JSON value at a document path
    Value,
    /// A logical name for a complete JSON value
    Alias,
    /// A run of object members (`"k": v, ...`), not a value on its own
    Members,
}

/// Location of a path in the rendered text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset, exclusive
    pub end: usize,
    /// First line, 1-based
    pub start_line: usize,
    /// Last line, 1-based
    pub end_line: usize,
    /// What the span covers
    pub kind: SpanKind,
}

impl Span {
    /// Text covered by the span
    pub fn text<'a>(&self, rendered: &'a str) -> &'a str {
        &rendered[self.start..self.end]
    }

    /// Whether a byte offset falls inside the span
    pub const fn contains(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Length in bytes
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the span is empty
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    const fn with_kind(mut self, kind: SpanKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Mapping from path to its span in the rendered document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathIndex {
    spans: BTreeMap<String, Span>,
}

impl PathIndex {
    /// Span of an exact path
    pub fn get(&self, path: &str) -> Option<&Span> {
        self.spans.get(path)
    }

    /// Span of a path, or of its nearest indexed ancestor.
    ///
    /// `tokenAllocations.3.address` resolves to `tokenAllocations.3` when
    /// the field itself has no span of its own.
    pub fn resolve<'a>(&self, path: &'a str) -> Option<(&'a str, &Span)> {
        let mut candidate = path;
        loop {
            if let Some(span) = self.spans.get(candidate) {
                return Some((candidate, span));
            }
            candidate = &candidate[..candidate.rfind('.')?];
        }
    }

    /// Deepest document path whose value contains `offset`
    pub fn path_at(&self, offset: usize) -> Option<&str> {
        self.spans
            .iter()
            .filter(|(_, span)| span.kind == SpanKind::Value && span.contains(offset))
            .min_by_key(|(_, span)| span.len())
            .map(|(path, _)| path.as_str())
    }

    /// All indexed paths with their spans, sorted by path
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Span)> {
        self.spans.iter().map(|(path, span)| (path.as_str(), span))
    }

    /// Number of indexed paths
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Whether nothing is indexed
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    fn insert(&mut self, path: impl Into<String>, span: Span) {
        self.spans.insert(path.into(), span);
    }

    fn alias(&mut self, alias: impl Into<String>, target: &str) {
        if let Some(span) = self.spans.get(target).copied() {
            self.insert(alias, span.with_kind(SpanKind::Alias));
        }
    }
}

/// A serialized document together with its path index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Pretty-printed JSON
    pub text: String,
    /// Path index over `text`
    pub index: PathIndex,
}

impl Rendered {
    /// Serialized size in bytes
    pub fn size(&self) -> usize {
        self.text.len()
    }

    /// Text at a path, if indexed
    pub fn text_at(&self, path: &str) -> Option<&str> {
        self.index.get(path).map(|span| span.text(&self.text))
    }
}

/// Render a synthesized document and index it.
pub fn render(synthesized: &Synthesized) -> Result<Rendered, RenderError> {
    let value = serde_json::to_value(&synthesized.document)?;

    let mut writer = Writer::default();
    writer.write_value(String::new(), &value, 0)?;
    let Writer { out, mut index, member_starts, .. } = writer;

    add_aliases(&mut index, &member_starts, synthesized)?;

    Ok(Rendered { text: out, index })
}

fn add_aliases(
    index: &mut PathIndex,
    member_starts: &HashMap<String, (usize, usize)>,
    synthesized: &Synthesized,
) -> Result<(), RenderError> {
    index.alias(paths::CHAIN_ID, "config.chainId");
    index.alias(paths::FEE_CONFIG, "config.feeConfig");
    let fee_keys: Vec<String> = index
        .iter()
        .filter_map(|(path, _)| path.strip_prefix("config.feeConfig."))
        .map(str::to_owned)
        .collect();
    for key in fee_keys {
        index.alias(paths::fee_field(&key), &format!("config.feeConfig.{key}"));
    }

    for precompile in Precompile::ALL {
        index.alias(precompile.name(), &precompile.path());
    }

    let mut allocation_paths = Vec::new();
    for (i, slot) in synthesized.summary.slots.iter().enumerate() {
        let Some(address) = slot else { continue };
        let path = format!("alloc.{}", address_key(address)?);
        index.alias(paths::allocation(i), &path);
        index.alias(paths::allocation_field(i, "amount"), &format!("{path}.balance"));
        if !allocation_paths.contains(&path) {
            allocation_paths.push(path);
        }
    }

    let first = allocation_paths.first().and_then(|p| member_starts.get(p));
    let last = allocation_paths.last().and_then(|p| index.get(p)).copied();
    if let (Some(&(start, start_line)), Some(last)) = (first, last) {
        let span = Span { start, end: last.end, start_line, end_line: last.end_line, kind: SpanKind::Members };
        index.insert(paths::TOKEN_ALLOCATIONS, span);
    }

    for predeploy in &synthesized.predeploys {
        let path = format!("alloc.{}", address_key(&predeploy.address())?);
        index.alias(paths::predeploy(predeploy.name()), &path);
    }

    Ok(())
}

/// Key an address gets in the serialized `alloc` object
fn address_key(address: &alloy_primitives::Address) -> Result<String, RenderError> {
    Ok(match serde_json::to_value(address)? {
        Value::String(key) => key,
        other => other.to_string(),
    })
}

#[derive(Default)]
struct Writer {
    out: String,
    line: usize,
    index: PathIndex,
    /// Start offset and line of each object member, key included
    member_starts: HashMap<String, (usize, usize)>,
}

impl Writer {
    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        self.line += 1;
        for _ in 0..depth {
            self.out.push_str("  ");
        }
    }

    fn write_value(&mut self, path: String, value: &Value, depth: usize) -> Result<(), RenderError> {
        let start = self.out.len();
        let start_line = self.line + 1;

        match value {
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.out.push_str(&n.to_string()),
            Value::String(s) => self.out.push_str(&serde_json::to_string(s)?),
            Value::Array(items) if items.is_empty() => self.out.push_str("[]"),
            Value::Array(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.newline(depth + 1);
                    self.write_value(join(&path, &i.to_string()), item, depth + 1)?;
                }
                self.newline(depth);
                self.out.push(']');
            }
            Value::Object(map) if map.is_empty() => self.out.push_str("{}"),
            Value::Object(map) => {
                self.out.push('{');
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        self.out.push(',');
                    }
                    self.newline(depth + 1);
                    let child = join(&path, key);
                    self.member_starts.insert(child.clone(), (self.out.len(), self.line + 1));
                    self.out.push_str(&serde_json::to_string(key)?);
                    self.out.push_str(": ");
                    self.write_value(child, item, depth + 1)?;
                }
                self.newline(depth);
                self.out.push('}');
            }
        }

        let span = Span {
            start,
            end: self.out.len(),
            start_line,
            end_line: self.line + 1,
            kind: SpanKind::Value,
        };
        if path.is_empty() {
            self.index.insert(paths::GENESIS, span.with_kind(SpanKind::Alias));
        } else {
            self.index.insert(path, span);
        }
        Ok(())
    }
}

fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() { child.to_owned() } else { format!("{parent}.{child}") }
}
