//! Extracts the paths a source file names.

use syn::visit::{self, Visit};

/// How a path appeared in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Usage {
    /// Inside a `use` declaration.
    Import,
    /// As the callee of a call expression.
    Call,
    /// Anywhere else: types, patterns, values, macros.
    Mention,
}

/// One path and where it occurred.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Reference {
    pub segments: Vec<String>,
    pub usage: Usage,
    /// Inside `#[cfg(test)]` items or test functions.
    pub in_test: bool,
}

impl Reference {
    pub(crate) fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    pub(crate) fn ends_with(&self, tail: &[&str]) -> bool {
        self.segments.len() >= tail.len()
            && self
                .segments
                .iter()
                .rev()
                .zip(tail.iter().rev())
                .all(|(segment, expected)| segment == expected)
    }
}

pub(crate) fn references(file: &syn::File) -> Vec<Reference> {
    let mut scanner = Scanner::default();
    scanner.visit_file(file);
    scanner.found
}

#[derive(Default)]
struct Scanner {
    test_depth: usize,
    found: Vec<Reference>,
}

fn is_test_only(attrs: &[syn::Attribute]) -> bool {
    attrs.iter().any(|attr| {
        let path = attr.path();
        if path.is_ident("cfg") {
            return attr
                .parse_args::<syn::Ident>()
                .is_ok_and(|ident| ident == "test");
        }
        path.segments
            .last()
            .is_some_and(|segment| segment.ident == "test" || segment.ident == "rstest")
    })
}

fn segments_of(path: &syn::Path) -> Vec<String> {
    path.segments
        .iter()
        .map(|segment| segment.ident.to_string())
        .collect()
}

impl Scanner {
    fn record(&mut self, segments: Vec<String>, usage: Usage) {
        if segments.is_empty() {
            return;
        }
        self.found.push(Reference {
            segments,
            usage,
            in_test: self.test_depth > 0,
        });
    }

    fn within(&mut self, attrs: &[syn::Attribute], walk: impl FnOnce(&mut Self)) {
        let test_only = is_test_only(attrs);
        if test_only {
            self.test_depth += 1;
        }
        walk(self);
        if test_only {
            self.test_depth -= 1;
        }
    }

    fn record_use(&mut self, tree: &syn::UseTree, prefix: &mut Vec<String>) {
        match tree {
            syn::UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.record_use(&path.tree, prefix);
                prefix.pop();
            }
            syn::UseTree::Name(name) => {
                let mut segments = prefix.clone();
                segments.push(name.ident.to_string());
                self.record(segments, Usage::Import);
            }
            syn::UseTree::Rename(rename) => {
                let mut segments = prefix.clone();
                segments.push(rename.ident.to_string());
                self.record(segments, Usage::Import);
            }
            syn::UseTree::Glob(_) => self.record(prefix.clone(), Usage::Import),
            syn::UseTree::Group(group) => {
                for item in &group.items {
                    self.record_use(item, prefix);
                }
            }
        }
    }
}

impl<'ast> Visit<'ast> for Scanner {
    fn visit_item_mod(&mut self, node: &'ast syn::ItemMod) {
        self.within(&node.attrs, |scanner| visit::visit_item_mod(scanner, node));
    }

    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        self.within(&node.attrs, |scanner| visit::visit_item_fn(scanner, node));
    }

    fn visit_item_impl(&mut self, node: &'ast syn::ItemImpl) {
        self.within(&node.attrs, |scanner| visit::visit_item_impl(scanner, node));
    }

    fn visit_impl_item_fn(&mut self, node: &'ast syn::ImplItemFn) {
        self.within(&node.attrs, |scanner| {
            visit::visit_impl_item_fn(scanner, node);
        });
    }

    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.within(&node.attrs, |scanner| {
            scanner.record_use(&node.tree, &mut Vec::new());
        });
    }

    fn visit_expr_call(&mut self, node: &'ast syn::ExprCall) {
        if let syn::Expr::Path(callee) = node.func.as_ref() {
            self.record(segments_of(&callee.path), Usage::Call);
        }
        visit::visit_expr_call(self, node);
    }

    fn visit_path(&mut self, node: &'ast syn::Path) {
        self.record(segments_of(node), Usage::Mention);
        visit::visit_path(self, node);
    }
}
