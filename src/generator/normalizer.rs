//! Best-effort cleanup of a file after members were generated into it.
//!
//! Every step works on the printed text of the file and hands its result to
//! the next one. A step's output is only kept if it still parses; the
//! reformat step must also keep the token stream intact. Rejected steps turn
//! into [`NormalizationWarning`]s and never undo the insertion itself.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::ops::Range;

use tracing::debug;

use crate::error::{NormalizationWarning, NormalizeStep};
use crate::known_types::{self, AndroidFlavor, IMPLICIT_PACKAGE};
use crate::models::{DeclarationNode, TypePath};
use crate::parser::compilation_unit::indentation_at;
use crate::parser::lexer::{is_ident_part, significant, tokenize, Token, TokenKind};
use crate::parser::{ImportDecl, JavaFile};

/// What normalization may touch
#[derive(Debug, Clone)]
pub struct NormalizeScope {
    /// The host the members were generated into
    pub target: TypePath,
    /// The generated members
    pub generated: Vec<DeclarationNode>,
}

/// Steps that changed the file and steps that were skipped
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub applied: Vec<NormalizeStep>,
    pub warnings: Vec<NormalizationWarning>,
}

/// Post-insertion cleanup of a document
pub trait Normalize<D: ?Sized> {
    fn normalize(&self, document: &mut D, scope: &NormalizeScope) -> NormalizeReport;
}

/// Leaves the document as inserted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNormalizer;

impl<D: ?Sized> Normalize<D> for NoopNormalizer {
    fn normalize(&self, _document: &mut D, _scope: &NormalizeScope) -> NormalizeReport {
        NormalizeReport::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizeOptions {
    pub shorten_references: bool,
    pub add_missing_imports: bool,
    pub organize_imports: bool,
    pub reformat: bool,
    pub indent_width: usize,
    pub continuation_indent: usize,
    pub max_blank_lines: usize,
    /// Simple name to fully-qualified name, used to import generated references
    pub known_imports: BTreeMap<String, String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            shorten_references: true,
            add_missing_imports: true,
            organize_imports: true,
            reformat: true,
            indent_width: 4,
            continuation_indent: 8,
            max_blank_lines: 1,
            known_imports: known_imports(AndroidFlavor::default()),
        }
    }
}

/// The built-in import table for a flavor, as owned strings
pub fn known_imports(flavor: AndroidFlavor) -> BTreeMap<String, String> {
    known_types::default_imports(flavor)
        .into_iter()
        .map(|(name, path)| (name.to_string(), path.to_string()))
        .collect()
}

type Step = fn(&JavaNormalizer, &str, &NormalizeScope) -> Result<String, String>;

/// Normalizer for Java compilation units
#[derive(Debug, Clone, Default)]
pub struct JavaNormalizer {
    options: NormalizeOptions,
}

impl JavaNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &NormalizeOptions {
        &self.options
    }

    /// Rewrite `a.b.Type` to `Type` inside the host, importing `a.b.Type`
    fn shorten_references(&self, text: &str, scope: &NormalizeScope) -> Result<String, String> {
        let file = parse(text)?;
        let host = host_span(&file, &scope.target)?;
        let all = tokenize(text).map_err(|e| e.to_string())?;
        let tokens = significant(&all);
        let body_start = header_end(&file);

        let unqualified: HashSet<&str> = tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| {
                t.offset >= body_start && t.kind == TokenKind::Ident && !after_dot(&tokens, *i)
            })
            .map(|(_, t)| t.text)
            .collect();
        // fields, parameters and locals; a chain starting with one is member access
        let variables: HashSet<&str> = tokens
            .iter()
            .enumerate()
            .filter(|(i, t)| {
                t.offset >= body_start
                    && t.kind == TokenKind::Ident
                    && starts_lowercase(t.text)
                    && !known_types::is_reserved_word(t.text)
                    && !after_dot(&tokens, *i)
                    && !tokens.get(i + 1).is_some_and(|next| next.is_punct('.'))
            })
            .map(|(_, t)| t.text)
            .collect();
        let imported: HashMap<&str, &str> = file
            .imports()
            .iter()
            .filter(|i| !i.is_static && !i.is_wildcard())
            .map(|i| (i.simple_name(), i.path.as_str()))
            .collect();
        let declared = file.declared_type_names();

        let mut chosen: HashMap<&str, String> = HashMap::new();
        let mut removals: Vec<Range<usize>> = Vec::new();
        let mut i = 0;

        while i < tokens.len() {
            let token = tokens[i];
            if !host.contains(&token.offset)
                || token.kind != TokenKind::Ident
                || after_dot(&tokens, i)
                || !starts_lowercase(token.text)
                || known_types::is_reserved_word(token.text)
            {
                i += 1;
                continue;
            }

            let mut chain = vec![i];
            let mut j = i;
            while j + 2 < tokens.len()
                && tokens[j + 1].is_punct('.')
                && tokens[j + 2].kind == TokenKind::Ident
            {
                j += 2;
                chain.push(j);
            }
            i = j + 1;

            if variables.contains(token.text) {
                continue;
            }
            let Some(k) = chain.iter().position(|&idx| !starts_lowercase(tokens[idx].text)) else {
                continue;
            };
            let class = tokens[chain[k]];
            if k < 2
                || !starts_uppercase(class.text)
                || !class.text.chars().any(|c| c.is_ascii_lowercase())
            {
                continue;
            }
            if k + 1 == chain.len() && !in_type_position(&tokens, chain[0], chain[k]) {
                continue;
            }

            let qualified = chain[..=k]
                .iter()
                .map(|&idx| tokens[idx].text)
                .collect::<Vec<_>>()
                .join(".");
            let unambiguous = match chosen.get(class.text) {
                Some(previous) => *previous == qualified,
                None => match imported.get(class.text) {
                    Some(path) => *path == qualified,
                    None => !declared.contains(class.text) && !unqualified.contains(class.text),
                },
            };
            if !unambiguous {
                continue;
            }

            chosen.insert(class.text, qualified);
            removals.push(tokens[chain[0]].offset..class.offset);
        }

        if removals.is_empty() {
            return Ok(text.to_string());
        }

        let mut output = text.to_string();
        for range in removals.into_iter().rev() {
            output.replace_range(range, "");
        }

        let existing: HashSet<&str> = file.imports().iter().map(|i| i.path.as_str()).collect();
        let additions: BTreeSet<String> = chosen
            .into_values()
            .filter(|path| !existing.contains(path.as_str()))
            .filter(|path| known_types::package_of(path) != IMPLICIT_PACKAGE)
            .collect();
        debug!(count = additions.len(), "shortened qualified references");

        Ok(insert_imports(&output, &file, &additions))
    }

    /// Import simple names used by the generated members from the known-types table
    fn add_missing_imports(&self, text: &str, scope: &NormalizeScope) -> Result<String, String> {
        let file = parse(text)?;
        let declared = file.declared_type_names();

        let mut referenced = BTreeSet::new();
        for node in &scope.generated {
            let all = tokenize(node.source()).map_err(|e| e.to_string())?;
            let tokens = significant(&all);
            for (i, token) in tokens.iter().enumerate() {
                if token.kind == TokenKind::Ident
                    && starts_uppercase(token.text)
                    && !after_dot(&tokens, i)
                {
                    referenced.insert(token.text.to_string());
                }
            }
        }

        let mut additions = BTreeSet::new();
        for name in &referenced {
            let Some(path) = self.options.known_imports.get(name) else {
                continue;
            };
            let package = known_types::package_of(path);
            if declared.contains(name)
                || package == IMPLICIT_PACKAGE
                || file.package() == Some(package)
            {
                continue;
            }

            let covered = file.imports().iter().filter(|i| !i.is_static).any(|i| {
                i.simple_name() == name.as_str()
                    || (i.is_wildcard() && known_types::package_of(&i.path) == package)
            });
            if !covered {
                additions.insert(path.clone());
            }
        }
        debug!(count = additions.len(), "resolved missing imports");

        Ok(insert_imports(text, &file, &additions))
    }

    /// Drop unused and duplicate imports, re-rendering the block if it changed
    fn optimize_imports(&self, text: &str, _scope: &NormalizeScope) -> Result<String, String> {
        let file = parse(text)?;
        let imports = file.imports();
        let (Some(first), Some(last)) = (imports.first(), imports.last()) else {
            return Ok(text.to_string());
        };
        let block = first.span.start..last.span.end;
        let all = tokenize(text).map_err(|e| e.to_string())?;

        let mut used: HashSet<&str> = HashSet::new();
        for token in all.iter().filter(|t| t.offset >= block.end) {
            match token.kind {
                TokenKind::Ident => {
                    used.insert(token.text);
                }
                // `{@link Type}` keeps an import alive
                TokenKind::DocComment => {
                    let words = token.text.split(|c: char| !is_ident_part(c));
                    used.extend(words.filter(|w| !w.is_empty()));
                }
                _ => {}
            }
        }

        let mut seen = HashSet::new();
        let mut kept: Vec<&ImportDecl> = Vec::new();
        let mut changed = false;
        for import in imports {
            if !seen.insert((import.is_static, import.path.as_str())) {
                changed = true;
            } else if import.is_wildcard() || used.contains(import.simple_name()) {
                kept.push(import);
            } else {
                debug!(import = %import.path, "dropping unused import");
                changed = true;
            }
        }

        if !changed {
            return Ok(text.to_string());
        }
        if all
            .iter()
            .any(|t| t.kind.is_comment() && block.contains(&t.offset))
        {
            return Err("import block contains comments".to_string());
        }

        kept.sort_by(|a, b| (a.is_static, &a.path).cmp(&(b.is_static, &b.path)));
        let mut rendered = String::new();
        for (i, import) in kept.iter().enumerate() {
            if i > 0 {
                rendered.push('\n');
                if import.is_static && !kept[i - 1].is_static {
                    rendered.push('\n');
                }
            }
            rendered.push_str(&import.to_source());
        }

        let mut end = block.end;
        if kept.is_empty() {
            let rest = &text[end..];
            end += rest.len() - rest.trim_start().len();
        }

        let mut output = String::with_capacity(text.len());
        output.push_str(&text[..block.start]);
        output.push_str(&rendered);
        output.push_str(&text[end..]);
        Ok(output)
    }

    /// Re-indent the host declaration
    fn reformat(&self, text: &str, scope: &NormalizeScope) -> Result<String, String> {
        let file = parse(text)?;
        let host = host_span(&file, &scope.target)?;
        let tokens = tokenize(text).map_err(|e| e.to_string())?;

        let base = indentation_at(text, host.start);
        let unit = " ".repeat(self.options.indent_width);
        let continuation = " ".repeat(self.options.continuation_indent);
        let region_start = text[..host.start].rfind('\n').map(|i| i + 1).unwrap_or(0);

        let mut output = String::with_capacity(text.len());
        output.push_str(&text[..region_start]);

        let mut frames = vec![Frame::default()];
        let mut previous: Option<Token<'_>> = None;
        let mut cursor = 0;
        let mut blank_run = 0;
        let mut start = region_start;

        for line in text[region_start..].split_inclusive('\n') {
            let end = start + line.len();
            let (content, ending) = split_line_ending(line);

            while cursor < tokens.len() && tokens[cursor].end() <= start {
                cursor += 1;
            }
            let spanning = tokens
                .get(cursor)
                .filter(|t| t.offset < start && t.kind != TokenKind::Whitespace)
                .copied();
            let own: Vec<Token<'_>> = tokens[cursor..]
                .iter()
                .take_while(|t| t.offset < end)
                .filter(|t| t.offset >= start && t.kind != TokenKind::Whitespace)
                .copied()
                .collect();

            let depth = frames.len() - 1;
            let label = is_case_label(&own);
            let (rendered, collapsible) = if start == region_start {
                (content.trim_end().to_string(), false)
            } else if let Some(token) = spanning {
                if token.kind.is_comment() {
                    let trimmed = content.trim();
                    let pad = if trimmed.starts_with('*') { " " } else { "" };
                    let aligned = if trimmed.is_empty() {
                        String::new()
                    } else {
                        format!("{}{}{}{}", base, unit.repeat(depth), pad, trimmed)
                    };
                    (aligned, false)
                } else {
                    (content.to_string(), false)
                }
            } else if content.trim().is_empty() {
                (String::new(), true)
            } else {
                let frame = frames.last().copied().unwrap_or_default();
                let mut level = depth;
                let mut continued = false;

                if let Some(lead) = own.first() {
                    let closes = lead.is_punct('}');
                    if closes {
                        level = level.saturating_sub(1);
                    } else if frame.in_case && !label {
                        level += 1;
                    }

                    if frame.parens > 0 {
                        continued = !closes && !lead.is_punct(')') && !lead.is_punct(']');
                    } else if !lead.kind.is_comment() {
                        continued = previous.is_some_and(|p| ends_expression_line(&p))
                            || starts_expression_line(&own);
                    }
                }

                let extra = if continued { continuation.as_str() } else { "" };
                (format!("{}{}{}{}", base, unit.repeat(level), extra, content.trim()), false)
            };

            if rendered.is_empty() && collapsible {
                blank_run += 1;
                if blank_run <= self.options.max_blank_lines {
                    output.push_str(ending);
                }
            } else {
                blank_run = 0;
                output.push_str(&rendered);
                output.push_str(ending);
            }

            let frame_index = frames.len() - 1;
            for token in own.iter().filter(|t| !t.kind.is_comment()) {
                match token.text {
                    "{" => frames.push(Frame::default()),
                    "}" if frames.len() > 1 => {
                        frames.pop();
                    }
                    "(" | "[" => {
                        if let Some(frame) = frames.last_mut() {
                            frame.parens += 1;
                        }
                    }
                    ")" | "]" => {
                        if let Some(frame) = frames.last_mut() {
                            frame.parens = frame.parens.saturating_sub(1);
                        }
                    }
                    _ => {}
                }
                previous = Some(*token);
            }
            if label {
                if let Some(frame) = frames.get_mut(frame_index) {
                    frame.in_case = true;
                }
            }

            start = end;
            if end >= host.end {
                break;
            }
        }

        output.push_str(&text[start..]);

        if !same_tokens(text, &output)? {
            return Err("reformatting would change the token stream".to_string());
        }
        Ok(output)
    }
}

impl Normalize<JavaFile> for JavaNormalizer {
    fn normalize(&self, document: &mut JavaFile, scope: &NormalizeScope) -> NormalizeReport {
        let steps: [(NormalizeStep, bool, Step); 4] = [
            (
                NormalizeStep::ShortenReferences,
                self.options.shorten_references,
                Self::shorten_references,
            ),
            (
                NormalizeStep::AddImports,
                self.options.add_missing_imports,
                Self::add_missing_imports,
            ),
            (
                NormalizeStep::OptimizeImports,
                self.options.organize_imports,
                Self::optimize_imports,
            ),
            (NormalizeStep::Reformat, self.options.reformat, Self::reformat),
        ];

        let mut report = NormalizeReport::default();
        let mut text = document.to_source();

        for (step, enabled, run) in steps {
            if !enabled {
                continue;
            }
            let result = run(self, &text, scope).and_then(|next| parse(&next).map(|_| next));
            match result {
                Ok(next) => {
                    if next != text {
                        debug!(%step, "normalization step applied");
                        report.applied.push(step);
                    }
                    text = next;
                }
                Err(message) => report.warnings.push(NormalizationWarning::new(step, message)),
            }
        }

        match JavaFile::parse(&text) {
            Ok(file) => *document = file,
            Err(err) => report
                .warnings
                .push(NormalizationWarning::new(NormalizeStep::Reparse, err.to_string())),
        }

        report
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Frame {
    /// Open parentheses and brackets in this brace level
    parens: usize,
    /// Inside the statements of a `case ...:` label
    in_case: bool,
}

fn parse(text: &str) -> Result<JavaFile, String> {
    JavaFile::parse(text).map_err(|e| e.to_string())
}

fn host_span(file: &JavaFile, target: &TypePath) -> Result<Range<usize>, String> {
    file.find_type(target)
        .map(|host| host.span.clone())
        .ok_or_else(|| format!("class `{}` not found", target))
}

/// Offset where type declarations may begin
fn header_end(file: &JavaFile) -> usize {
    file.imports()
        .last()
        .map(|i| i.span.end)
        .or(file.package_end())
        .unwrap_or(0)
}

fn insert_imports(text: &str, file: &JavaFile, paths: &BTreeSet<String>) -> String {
    if paths.is_empty() {
        return text.to_string();
    }

    let statements = paths
        .iter()
        .map(|path| ImportDecl::new(path.as_str(), false).to_source())
        .collect::<Vec<_>>()
        .join("\n");

    let mut output = text.to_string();
    if let Some(last) = file.imports().last() {
        output.insert_str(last.span.end, &format!("\n{}", statements));
    } else if let Some(end) = file.package_end() {
        output.insert_str(end, &format!("\n\n{}", statements));
    } else {
        output.insert_str(0, &format!("{}\n\n", statements));
    }
    output
}

fn after_dot(tokens: &[Token<'_>], index: usize) -> bool {
    index > 0 && tokens[index - 1].is_punct('.')
}

/// Whether the chain `tokens[first..=last]` names a type rather than a value:
/// after `new`, `@`, `<` or a type-list keyword, or before a declared name,
/// type arguments, `[]` or `...`
fn in_type_position(tokens: &[Token<'_>], first: usize, last: usize) -> bool {
    const TYPE_KEYWORDS: &[&str] = &["new", "extends", "implements", "throws", "instanceof"];

    if first > 0 {
        let previous = &tokens[first - 1];
        if previous.is_punct('@')
            || previous.is_punct('<')
            || TYPE_KEYWORDS.iter().any(|word| previous.is_ident(word))
        {
            return true;
        }
    }

    let next = |offset: usize| tokens.get(last + offset);
    let Some(following) = next(1) else {
        return false;
    };
    match following.kind {
        TokenKind::Ident => !known_types::is_reserved_word(following.text),
        TokenKind::Punct if following.is_punct('<') => next(2).is_some_and(|t| {
            t.is_punct('>')
                || t.is_punct('?')
                || (t.kind == TokenKind::Ident && starts_uppercase(t.text))
        }),
        TokenKind::Punct if following.is_punct('[') => next(2).is_some_and(|t| t.is_punct(']')),
        TokenKind::Punct if following.is_punct('.') => next(2).is_some_and(|t| t.is_punct('.')),
        _ => false,
    }
}

fn starts_lowercase(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_lowercase())
}

fn starts_uppercase(word: &str) -> bool {
    word.starts_with(|c: char| c.is_ascii_uppercase())
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}

/// `case X:` or `default:` on its own line
fn is_case_label(line: &[Token<'_>]) -> bool {
    let mut significant = line.iter().filter(|t| !t.kind.is_comment());
    let starts = significant
        .next()
        .is_some_and(|t| t.is_ident("case") || t.is_ident("default"));
    starts && significant.last().is_some_and(|t| t.is_punct(':'))
}

/// A line ending in a binary operator continues on the next one
fn ends_expression_line(token: &Token<'_>) -> bool {
    token.kind == TokenKind::Punct && "=+-*/%&|^?".contains(token.text)
}

/// A line starting with `.` or a binary operator continues the previous one
fn starts_expression_line(line: &[Token<'_>]) -> bool {
    let Some(lead) = line.first() else {
        return false;
    };
    if lead.kind != TokenKind::Punct {
        return false;
    }
    match lead.text {
        "." | "?" | ":" | "&" | "|" | "^" | "*" | "/" | "%" | "=" => true,
        // `++i;` and `--i;` are statements
        "+" | "-" => !line.get(1).is_some_and(|next| next.text == lead.text),
        _ => false,
    }
}

/// Same tokens in the same order; whitespace inside comments is ignored
fn same_tokens(before: &str, after: &str) -> Result<bool, String> {
    fn key(token: &Token<'_>) -> String {
        if token.kind.is_comment() {
            token.text.split_whitespace().collect()
        } else {
            token.text.to_string()
        }
    }

    let before = tokenize(before).map_err(|e| e.to_string())?;
    let after = tokenize(after).map_err(|e| e.to_string())?;
    let before = before.iter().filter(|t| t.kind != TokenKind::Whitespace).map(key);
    let after = after.iter().filter(|t| t.kind != TokenKind::Whitespace).map(key);
    Ok(before.eq(after))
}
