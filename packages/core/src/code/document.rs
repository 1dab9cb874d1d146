//! Code Document
//!
//! Owned intermediate representation of one generated C# source file. The
//! template engine builds it, code transformers mutate it in place, and the
//! emitter turns it into text.

use crate::config::is_identifier;
use bitflags::bitflags;
use indexmap::IndexSet;
use smallvec::SmallVec;

/// Return type of helper methods.
pub const HELPER_RESULT_TYPE: &str = "System.Web.WebPages.HelperResult";

/// One compilable source file: a namespace holding the primary generated class
/// and any companion types transformers add next to it.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeDocument {
    pub namespace: String,
    /// `using` directives, in first-seen order without duplicates.
    pub imports: IndexSet<String>,
    pub class: CodeClass,
    pub additional_types: Vec<CodeClass>,
}

impl CodeDocument {
    pub fn new(namespace: impl Into<String>, class: CodeClass) -> Self {
        Self {
            namespace: namespace.into(),
            imports: IndexSet::new(),
            class,
            additional_types: Vec::new(),
        }
    }

    /// The primary class followed by the additional types, in emission order.
    pub fn types(&self) -> impl Iterator<Item = &CodeClass> {
        std::iter::once(&self.class).chain(self.additional_types.iter())
    }
}

/// Visibility of a top-level type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TypeVisibility {
    #[default]
    Public,
    Internal,
}

impl TypeVisibility {
    /// Parse a visibility keyword; anything unrecognised is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(TypeVisibility::Public),
            "internal" => Some(TypeVisibility::Internal),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            TypeVisibility::Public => "public",
            TypeVisibility::Internal => "internal",
        }
    }
}

/// A class declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeClass {
    pub name: String,
    pub visibility: TypeVisibility,
    pub is_partial: bool,
    /// The single base type, if any.
    pub base_type: Option<TypeReference>,
    pub attributes: Vec<CodeAttribute>,
    pub members: Vec<Member>,
    /// Wraps the declaration in `#region <label>` / `#endregion`.
    pub region: Option<String>,
}

impl CodeClass {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            visibility: TypeVisibility::Public,
            is_partial: false,
            base_type: None,
            attributes: Vec::new(),
            members: Vec::new(),
            region: None,
        }
    }

    pub fn method(&self, name: &str) -> Option<&CodeMethod> {
        self.members.iter().find_map(|m| match m {
            Member::Method(method) if method.name == name => Some(method),
            _ => None,
        })
    }

    pub fn method_mut(&mut self, name: &str) -> Option<&mut CodeMethod> {
        self.members.iter_mut().find_map(|m| match m {
            Member::Method(method) if method.name == name => Some(method),
            _ => None,
        })
    }

    pub fn has_member(&self, name: &str) -> bool {
        self.members.iter().any(|m| m.name() == Some(name))
    }

    /// Remove the methods called `name`, returning whether any existed.
    pub fn remove_method(&mut self, name: &str) -> bool {
        let before = self.members.len();
        self.members
            .retain(|m| !matches!(m, Member::Method(method) if method.name == name));
        before != self.members.len()
    }

    /// Remove every constructor, returning how many were removed.
    pub fn remove_constructors(&mut self) -> usize {
        let before = self.members.len();
        self.members
            .retain(|m| !matches!(m, Member::Constructor(_)));
        before - self.members.len()
    }
}

/// Reference to a (possibly generic) type, e.g. `WebViewPage<dynamic>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeReference {
    pub name: String,
    pub type_arguments: Vec<TypeReference>,
}

impl TypeReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_arguments: Vec::new(),
        }
    }

    pub fn generic(name: impl Into<String>, arguments: Vec<TypeReference>) -> Self {
        Self {
            name: name.into(),
            type_arguments: arguments,
        }
    }

    /// Parse `Name`, `Name<Arg>` or `Name<A, B<C>>`. Returns `None` for empty or
    /// unbalanced input.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let Some(open) = text.find('<') else {
            return if text.contains('>') || text.contains(',') {
                None
            } else {
                Some(Self::new(text))
            };
        };
        if !text.ends_with('>') {
            return None;
        }
        let name = text[..open].trim();
        if name.is_empty() {
            return None;
        }
        let inner = &text[open + 1..text.len() - 1];

        let mut arguments = Vec::new();
        let mut depth = 0usize;
        let mut start = 0usize;
        for (i, ch) in inner.char_indices() {
            match ch {
                '<' => depth += 1,
                '>' => depth = depth.checked_sub(1)?,
                ',' if depth == 0 => {
                    arguments.push(Self::parse(&inner[start..i])?);
                    start = i + 1;
                }
                _ => {}
            }
        }
        if depth != 0 {
            return None;
        }
        arguments.push(Self::parse(&inner[start..])?);
        Some(Self::generic(name, arguments))
    }
}

impl std::fmt::Display for TypeReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if !self.type_arguments.is_empty() {
            f.write_str("<")?;
            for (i, arg) in self.type_arguments.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}", arg)?;
            }
            f.write_str(">")?;
        }
        Ok(())
    }
}

/// An attribute applied to a type. Arguments are rendered C# expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    pub name: String,
    pub arguments: SmallVec<[String; 2]>,
}

impl CodeAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: SmallVec::new(),
        }
    }

    /// Append a string-literal argument.
    pub fn with_string(mut self, value: &str) -> Self {
        self.arguments.push(csharp_string_literal(value));
        self
    }
}

bitflags! {
    /// Modifiers of a class member.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemberModifiers: u16 {
        const PUBLIC = 1 << 0;
        const PROTECTED = 1 << 1;
        const INTERNAL = 1 << 2;
        const PRIVATE = 1 << 3;
        const STATIC = 1 << 4;
        const VIRTUAL = 1 << 5;
        const OVERRIDE = 1 << 6;
        const ABSTRACT = 1 << 7;
    }
}

impl MemberModifiers {
    /// C# keywords in declaration order, e.g. `["public", "override"]`.
    pub fn keywords(self) -> Vec<&'static str> {
        const ORDER: [(MemberModifiers, &str); 8] = [
            (MemberModifiers::PUBLIC, "public"),
            (MemberModifiers::PROTECTED, "protected"),
            (MemberModifiers::INTERNAL, "internal"),
            (MemberModifiers::PRIVATE, "private"),
            (MemberModifiers::STATIC, "static"),
            (MemberModifiers::ABSTRACT, "abstract"),
            (MemberModifiers::VIRTUAL, "virtual"),
            (MemberModifiers::OVERRIDE, "override"),
        ];
        ORDER
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, keyword)| *keyword)
            .collect()
    }
}

/// Maps generated code back to a template line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePragma {
    pub line: usize,
    pub file: String,
}

/// A statement inside a method, constructor or accessor body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// `WriteLiteral("...");`
    WriteLiteral(String),
    /// `Write(<expression>);`
    Write {
        expression: String,
        pragma: Option<LinePragma>,
    },
    /// Template code copied verbatim.
    Code {
        code: String,
        pragma: Option<LinePragma>,
    },
    /// `WriteLiteralTo(<writer>, "...");`
    WriteLiteralTo { writer: String, text: String },
    /// `WriteTo(<writer>, <expression>);`
    WriteTo {
        writer: String,
        expression: String,
        pragma: Option<LinePragma>,
    },
    /// `return new HelperResult(<writer> => { <body> });`
    HelperResult { writer: String, body: Vec<Statement> },
    /// `return <expression>;`
    Return(String),
    /// Generator-authored block of C# emitted with the body indent.
    Snippet(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub type_name: String,
    pub name: String,
    /// Rendered default value expression.
    pub default: Option<String>,
}

impl Parameter {
    pub fn new(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            name: name.into(),
            default: None,
        }
    }

    /// Parse a C# parameter list such as `string name, int count = 1`.
    /// Modifiers like `this` or `params` stay part of the type.
    pub fn parse_list(text: &str) -> Option<Vec<Parameter>> {
        let mut parameters = Vec::new();
        let mut rest = text.trim();
        if rest.is_empty() {
            return Some(parameters);
        }
        loop {
            match find_top_level(rest, ',') {
                Some(comma) => {
                    parameters.push(Self::parse(&rest[..comma])?);
                    rest = &rest[comma + 1..];
                }
                None => {
                    parameters.push(Self::parse(rest)?);
                    return Some(parameters);
                }
            }
        }
    }

    fn parse(text: &str) -> Option<Self> {
        let (declaration, default) = match find_top_level(text, '=') {
            Some(eq) => (&text[..eq], Some(text[eq + 1..].trim())),
            None => (text, None),
        };
        let (type_name, name) = declaration.trim().rsplit_once(char::is_whitespace)?;
        let type_name = type_name.trim();
        if type_name.is_empty() || !is_identifier(name) || default == Some("") {
            return None;
        }
        Some(Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            default: default.map(str::to_string),
        })
    }
}

/// Byte offset of the first `separator` outside brackets and literals.
fn find_top_level(text: &str, separator: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if let Some(open) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == open {
                quote = None;
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '<' | '(' | '[' | '{' => depth += 1,
            '>' | ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ if c == separator && depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeConstructor {
    pub modifiers: MemberModifiers,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeField {
    pub name: String,
    pub type_name: String,
    pub modifiers: MemberModifiers,
    pub initializer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeProperty {
    pub name: String,
    pub type_name: String,
    pub modifiers: MemberModifiers,
    pub getter: Option<Vec<Statement>>,
    pub setter: Option<Vec<Statement>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMethod {
    pub name: String,
    /// `None` renders as `void`.
    pub return_type: Option<String>,
    pub modifiers: MemberModifiers,
    pub parameters: Vec<Parameter>,
    pub body: Vec<Statement>,
}

impl CodeMethod {
    pub fn new(name: impl Into<String>, modifiers: MemberModifiers) -> Self {
        Self {
            name: name.into(),
            return_type: None,
            modifiers,
            parameters: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// A class member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Member {
    Field(CodeField),
    /// Verbatim class-level code, e.g. a `@functions` block.
    Snippet(String),
    Constructor(CodeConstructor),
    Property(CodeProperty),
    Method(CodeMethod),
}

impl Member {
    pub fn name(&self) -> Option<&str> {
        match self {
            Member::Field(f) => Some(&f.name),
            Member::Property(p) => Some(&p.name),
            Member::Method(m) => Some(&m.name),
            Member::Snippet(_) | Member::Constructor(_) => None,
        }
    }
}

/// Quote `value` as a C# regular string literal.
pub fn csharp_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
