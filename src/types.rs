use serde::{Deserialize, Serialize};

/// File extensions recognized as JavaScript/TypeScript source code.
pub const SOURCE_EXTENSIONS: [&str; 4] = ["js", "ts", "jsx", "tsx"];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Scan,
    BranchInfo,
}

/// One function discovered while parsing a source file.
///
/// Immutable after construction; owned by the [`ParsedFile`] that contains it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParsedFunction {
    /// Declared name, or `"anonymous"` when the declaration carries no identifier
    /// (e.g. a default-exported anonymous function).
    pub name: String,
    /// Parameter identifier names in declaration order. A parameter without a
    /// simple identifier (destructuring, etc.) is recorded as `"param"`.
    pub params: Vec<String>,
    /// Return type annotation when it is a simple named type.
    pub return_type: Option<String>,
    pub is_async: bool,
    pub is_exported: bool,
    /// 1-based source line; `0` when position info is unavailable.
    pub start_line: usize,
    pub end_line: usize,
}

/// Result of parsing a single source file. Regenerated on every parse call.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParsedFile {
    pub file_path: String,
    pub functions: Vec<ParsedFunction>,
    /// Module specifiers of `import ... from "<specifier>"` statements, in order.
    pub imports: Vec<String>,
    /// Exported names: function declarations, re-exported (public) names, and
    /// the literal `"default"` for default exports.
    pub exports: Vec<String>,
}

impl ParsedFile {
    pub fn new(file_path: String) -> Self {
        Self {
            file_path,
            functions: Vec::new(),
            imports: Vec::new(),
            exports: Vec::new(),
        }
    }
}
