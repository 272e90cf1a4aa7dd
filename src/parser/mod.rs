//! JavaScript/TypeScript source parsing via the OXC AST parser.
//!
//! Extracts the function inventory, import specifiers, and exported names
//! from a single source file. TypeScript syntax is always enabled; JSX is
//! enabled only for `.jsx`/`.tsx` files to avoid conflicts with TypeScript
//! generics (`const fn = <T>(...) =>` parses as a JSX tag with JSX on).

mod visitor;

use std::path::Path;

use oxc_allocator::Allocator;
use oxc_ast_visit::Visit;
use oxc_parser::Parser;
use oxc_span::SourceType;

use crate::types::ParsedFile;
use visitor::Extractor;

/// Error type for source parsing
#[derive(Debug)]
pub enum ParseError {
    /// File could not be read
    Io {
        path: String,
        source: std::io::Error,
    },
    /// Source contained syntax errors
    Syntax { path: String, message: String },
}

impl ParseError {
    /// Path of the file that failed to parse.
    pub fn path(&self) -> &str {
        match self {
            ParseError::Io { path, .. } => path,
            ParseError::Syntax { path, .. } => path,
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            ParseError::Syntax { path, message } => {
                write!(f, "syntax error in {}: {}", path, message)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io { source, .. } => Some(source),
            ParseError::Syntax { .. } => None,
        }
    }
}

/// Parse source text, extracting functions, imports, and exports.
///
/// `file_path` determines the dialect (extension) and is carried through to
/// the result; the file itself is not touched.
pub fn parse_source(content: &str, file_path: &str) -> Result<ParsedFile, ParseError> {
    let allocator = Allocator::default();

    let path = Path::new(file_path);
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    let is_jsx_file = ext == "tsx" || ext == "jsx";
    let source_type = SourceType::from_path(path)
        .unwrap_or_default()
        .with_typescript(true)
        .with_jsx(is_jsx_file);

    let ret = Parser::new(&allocator, content, source_type).parse();
    if ret.panicked || !ret.errors.is_empty() {
        let message = if ret.errors.is_empty() {
            "parser gave up".to_string()
        } else {
            ret.errors
                .iter()
                .take(3)
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        };
        return Err(ParseError::Syntax {
            path: file_path.to_string(),
            message,
        });
    }

    let mut extractor = Extractor::new(file_path.to_string(), content);
    extractor.visit_program(&ret.program);
    Ok(extractor.file)
}

/// Read and parse a file from disk.
pub fn parse_file(path: &Path) -> Result<ParsedFile, ParseError> {
    let display = path.display().to_string();
    let content = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: display.clone(),
        source,
    })?;
    parse_source(&content, &display)
}
