//! Generated Go source files.

use std::collections::BTreeMap;

/// Line placed after the header of every generated file.
pub const GENERATED_MARKER: &str = "// Code generated by resgen. DO NOT EDIT.";

/// One generated method: signature, doc line and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoMethod {
    receiver: String,
    type_name: String,
    name: String,
    params: String,
    results: String,
    body: Vec<String>,
}

impl GoMethod {
    /// Starts a method `name` on a pointer to `type_name`.
    #[must_use]
    pub fn new(receiver: &str, type_name: &str, name: &str) -> Self {
        Self {
            receiver: receiver.to_string(),
            type_name: type_name.to_string(),
            name: name.to_string(),
            params: String::new(),
            results: String::new(),
            body: Vec::new(),
        }
    }

    /// Sets the parameter list, without parentheses.
    #[must_use]
    pub fn params(mut self, params: impl Into<String>) -> Self {
        self.params = params.into();
        self
    }

    /// Sets the result type.
    #[must_use]
    pub fn returns(mut self, results: impl Into<String>) -> Self {
        self.results = results.into();
        self
    }

    /// Appends a body line. Nested blocks carry their own extra tabs.
    #[must_use]
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.body.push(line.into());
        self
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renders the method as Go source.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("// {} of this {}.\n", self.name, self.type_name));
        output.push_str(&format!(
            "func ({} *{}) {}({})",
            self.receiver, self.type_name, self.name, self.params
        ));
        if !self.results.is_empty() {
            output.push_str(&format!(" {}", self.results));
        }
        output.push_str(" {\n");
        for line in &self.body {
            output.push_str(&format!("\t{}\n", line));
        }
        output.push_str("}\n");
        output
    }
}

/// The content of one generated file: the output unit for one package and
/// one category.
#[derive(Debug, Clone, Default)]
pub struct GoFile {
    header: String,
    package_name: String,
    package_path: String,
    aliases: BTreeMap<String, String>,
    imports: BTreeMap<String, String>,
    methods: Vec<GoMethod>,
}

impl GoFile {
    /// Creates an empty file for the package `package_name` at import path
    /// `package_path`.
    #[must_use]
    pub fn new(package_name: &str, package_path: &str) -> Self {
        Self {
            package_name: package_name.to_string(),
            package_path: package_path.to_string(),
            ..Self::default()
        }
    }

    /// Sets the header text placed at the top of the file.
    #[must_use]
    pub fn with_header(mut self, header: &str) -> Self {
        self.header = header.to_string();
        self
    }

    /// Sets preferred aliases by import path.
    #[must_use]
    pub fn with_import_aliases(mut self, aliases: &BTreeMap<String, String>) -> Self {
        self.aliases = aliases.clone();
        self
    }

    /// Returns the package name.
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Returns a reference to `name` in the package at `path`, recording the
    /// import.
    ///
    /// Names in the file's own package are returned bare.
    pub fn qual(&mut self, path: &str, name: &str) -> String {
        if path == self.package_path {
            return name.to_string();
        }
        if let Some(alias) = self.imports.get(path) {
            return format!("{}.{}", alias, name);
        }

        let preferred = self
            .aliases
            .get(path)
            .cloned()
            .unwrap_or_else(|| default_alias(path));
        let mut alias = preferred.clone();
        let mut n = 1;
        while self.imports.values().any(|a| *a == alias) {
            alias = format!("{}{}", preferred, n);
            n += 1;
        }

        let qualified = format!("{}.{}", alias, name);
        self.imports.insert(path.to_string(), alias);
        qualified
    }

    /// Appends a method.
    pub fn add(&mut self, method: GoMethod) {
        self.methods.push(method);
    }

    /// Returns the methods in emission order.
    #[must_use]
    pub fn methods(&self) -> &[GoMethod] {
        &self.methods
    }

    /// Returns the imports recorded so far, by path.
    #[must_use]
    pub fn imports(&self) -> &BTreeMap<String, String> {
        &self.imports
    }

    /// Returns true if no method has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Renders the complete file.
    #[must_use]
    pub fn render(&self) -> String {
        let mut output = String::new();

        let header = self.header.trim_end();
        if !header.is_empty() {
            output.push_str(&render_header(header));
            output.push_str("\n\n");
        }
        output.push_str(GENERATED_MARKER);
        output.push_str("\n\n");
        output.push_str(&format!("package {}\n\n", self.package_name));

        match self.imports.len() {
            0 => {}
            1 => {
                for (path, alias) in &self.imports {
                    output.push_str(&format!("import {} \"{}\"\n\n", alias, path));
                }
            }
            _ => {
                output.push_str("import (\n");
                for (path, alias) in &self.imports {
                    output.push_str(&format!("\t{} \"{}\"\n", alias, path));
                }
                output.push_str(")\n\n");
            }
        }

        let methods: Vec<String> = self.methods.iter().map(GoMethod::render).collect();
        output.push_str(&methods.join("\n"));
        output
    }
}

/// Alias used for imports without a configured one: the last path element,
/// stripped of characters Go identifiers cannot hold.
fn default_alias(path: &str) -> String {
    let last = path.rsplit('/').next().unwrap_or(path);
    let alias: String = last
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect();
    match alias.chars().next() {
        Some(c) if !c.is_ascii_digit() => alias,
        _ => format!("pkg{}", alias),
    }
}

/// Header text that is already a Go comment is kept as is, anything else is
/// turned into line comments.
fn render_header(header: &str) -> String {
    let trimmed = header.trim_start();
    if trimmed.starts_with("//") || trimmed.starts_with("/*") {
        return header.to_string();
    }
    header
        .lines()
        .map(|line| {
            if line.is_empty() {
                "//".to_string()
            } else {
                format!("// {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
