//! AST visitor that collects functions, imports, and exports.
//!
//! The extractor walks statements rather than raw function nodes so that
//! export context is known at the point a declaration is recorded. Arrow
//! functions and function expressions bound through `const foo = ...` are
//! recorded under the binding name but never flagged as exported; only
//! `export function` declarations carry the exported flag.

use oxc_ast::ast::*;
use oxc_ast_visit::{Visit, walk};
use oxc_span::Span;

use crate::types::{ParsedFile, ParsedFunction};

pub(super) struct Extractor<'a> {
    pub file: ParsedFile,
    source_text: &'a str,
}

impl<'a> Extractor<'a> {
    pub(super) fn new(file_path: String, source_text: &'a str) -> Self {
        Self {
            file: ParsedFile::new(file_path),
            source_text,
        }
    }

    /// 1-based line number for a span offset.
    fn get_line(&self, offset: u32) -> usize {
        let capped = std::cmp::min(offset as usize, self.source_text.len());
        self.source_text[..capped]
            .bytes()
            .filter(|b| *b == b'\n')
            .count()
            + 1
    }

    fn line_range(&self, span: Span) -> (usize, usize) {
        (self.get_line(span.start), self.get_line(span.end))
    }

    fn record_function(&mut self, f: &Function<'a>, name: String, is_exported: bool, span: Span) {
        let (start_line, end_line) = self.line_range(span);
        self.file.functions.push(ParsedFunction {
            name,
            params: extract_params(&f.params),
            return_type: f
                .return_type
                .as_ref()
                .and_then(|ann| type_to_string(&ann.type_annotation)),
            is_async: f.r#async,
            is_exported,
            start_line,
            end_line,
        });
    }

    fn record_arrow(&mut self, f: &ArrowFunctionExpression<'a>, name: String, span: Span) {
        let (start_line, end_line) = self.line_range(span);
        self.file.functions.push(ParsedFunction {
            name,
            params: extract_params(&f.params),
            return_type: f
                .return_type
                .as_ref()
                .and_then(|ann| type_to_string(&ann.type_annotation)),
            is_async: f.r#async,
            // Arrow bindings are recorded under their binding name but are
            // not treated as exported declarations.
            is_exported: false,
            start_line,
            end_line,
        });
    }

    fn record_declarators(&mut self, var: &VariableDeclaration<'a>) {
        for d in &var.declarations {
            let BindingPattern::BindingIdentifier(id) = &d.id else {
                continue;
            };
            match &d.init {
                Some(Expression::ArrowFunctionExpression(f)) => {
                    self.record_arrow(f, id.name.to_string(), d.span);
                }
                Some(Expression::FunctionExpression(f)) => {
                    self.record_function(f, id.name.to_string(), false, d.span);
                }
                _ => {}
            }
        }
    }
}

/// Parameter identifier names in declaration order. Destructuring and other
/// non-identifier patterns collapse to `"param"`.
fn extract_params(params: &FormalParameters<'_>) -> Vec<String> {
    let mut names: Vec<String> = params
        .items
        .iter()
        .map(|param| pattern_name(&param.pattern))
        .collect();
    if let Some(rest) = &params.rest {
        names.push(pattern_name(&rest.rest.argument));
    }
    names
}

fn pattern_name(pattern: &BindingPattern<'_>) -> String {
    match pattern {
        BindingPattern::BindingIdentifier(id) => id.name.to_string(),
        BindingPattern::AssignmentPattern(assign) => pattern_name(&assign.left),
        _ => "param".to_string(),
    }
}

/// Render a return type annotation when it is a simple named or keyword type.
/// Inline unions, object types, and other complex constructs resolve to `None`.
fn type_to_string(ty: &TSType<'_>) -> Option<String> {
    match ty {
        TSType::TSTypeReference(r) => Some(type_name_to_string(&r.type_name)),
        TSType::TSStringKeyword(_) => Some("string".to_string()),
        TSType::TSNumberKeyword(_) => Some("number".to_string()),
        TSType::TSBooleanKeyword(_) => Some("boolean".to_string()),
        TSType::TSVoidKeyword(_) => Some("void".to_string()),
        TSType::TSAnyKeyword(_) => Some("any".to_string()),
        _ => None,
    }
}

fn type_name_to_string(name: &TSTypeName<'_>) -> String {
    match name {
        TSTypeName::IdentifierReference(id) => id.name.to_string(),
        TSTypeName::QualifiedName(q) => {
            format!("{}.{}", type_name_to_string(&q.left), q.right.name)
        }
        TSTypeName::ThisExpression(_) => "This".to_string(),
    }
}

fn module_export_name(name: &ModuleExportName<'_>) -> String {
    match name {
        ModuleExportName::IdentifierName(id) => id.name.to_string(),
        ModuleExportName::IdentifierReference(id) => id.name.to_string(),
        ModuleExportName::StringLiteral(lit) => lit.value.to_string(),
    }
}

fn property_key_name(key: &PropertyKey<'_>) -> String {
    match key {
        PropertyKey::StaticIdentifier(id) => id.name.to_string(),
        PropertyKey::PrivateIdentifier(id) => format!("#{}", id.name),
        PropertyKey::StringLiteral(lit) => lit.value.to_string(),
        _ => "anonymous".to_string(),
    }
}

impl<'a> Visit<'a> for Extractor<'a> {
    fn visit_import_declaration(&mut self, decl: &ImportDeclaration<'a>) {
        self.file.imports.push(decl.source.value.to_string());
    }

    fn visit_statement(&mut self, stmt: &Statement<'a>) {
        match stmt {
            Statement::FunctionDeclaration(f) => {
                let name = f
                    .id
                    .as_ref()
                    .map(|id| id.name.to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                self.record_function(f, name, false, f.span);
            }
            Statement::VariableDeclaration(var) => {
                self.record_declarators(var);
            }
            _ => {}
        }
        walk::walk_statement(self, stmt);
    }

    fn visit_export_named_declaration(&mut self, decl: &ExportNamedDeclaration<'a>) {
        if decl.source.is_some() {
            // Re-export: the exported (possibly aliased) names become public.
            for spec in &decl.specifiers {
                self.file.exports.push(module_export_name(&spec.exported));
            }
            return;
        }

        if let Some(declaration) = &decl.declaration {
            match declaration {
                Declaration::FunctionDeclaration(f) => {
                    let name = f
                        .id
                        .as_ref()
                        .map(|id| id.name.to_string())
                        .unwrap_or_else(|| "anonymous".to_string());
                    self.file.exports.push(name.clone());
                    self.record_function(f, name, true, decl.span);
                }
                Declaration::VariableDeclaration(var) => {
                    for d in &var.declarations {
                        if let BindingPattern::BindingIdentifier(id) = &d.id {
                            self.file.exports.push(id.name.to_string());
                        }
                    }
                    self.record_declarators(var);
                }
                Declaration::ClassDeclaration(c) => {
                    if let Some(id) = &c.id {
                        self.file.exports.push(id.name.to_string());
                    }
                }
                Declaration::TSInterfaceDeclaration(i) => {
                    self.file.exports.push(i.id.name.to_string());
                }
                Declaration::TSTypeAliasDeclaration(t) => {
                    self.file.exports.push(t.id.name.to_string());
                }
                Declaration::TSEnumDeclaration(e) => {
                    self.file.exports.push(e.id.name.to_string());
                }
                _ => {}
            }
        }

        // export { foo, bar as baz };
        for spec in &decl.specifiers {
            self.file.exports.push(module_export_name(&spec.exported));
        }

        walk::walk_export_named_declaration(self, decl);
    }

    fn visit_export_default_declaration(&mut self, decl: &ExportDefaultDeclaration<'a>) {
        // Default exports are always recorded under the name "default" so
        // they match `import X from './file'` lookups.
        self.file.exports.push("default".to_string());

        match &decl.declaration {
            ExportDefaultDeclarationKind::FunctionDeclaration(f) => {
                let name = f
                    .id
                    .as_ref()
                    .map(|id| id.name.to_string())
                    .unwrap_or_else(|| "anonymous".to_string());
                self.record_function(f, name, true, decl.span);
            }
            ExportDefaultDeclarationKind::ArrowFunctionExpression(f) => {
                self.record_arrow(f, "anonymous".to_string(), decl.span);
            }
            _ => {}
        }

        walk::walk_export_default_declaration(self, decl);
    }

    fn visit_method_definition(&mut self, def: &MethodDefinition<'a>) {
        let name = property_key_name(&def.key);
        let span = def.span;
        self.record_function(&def.value, name, false, span);
        walk::walk_method_definition(self, def);
    }
}
