//! Class-name pattern normalization for the selection filter contract.
//!
//! User-facing include/exclude patterns arrive in a filesystem-glob flavor:
//! they may point at compiled class files (`com/example/FooTest.class`) or at
//! dotted class names (`com.example.FooTest`), with `*`, `**` and `?`
//! wildcards. The spawned selection process expects one precise matching
//! form, so both spellings must converge here: a single wrong separator
//! breaks test selection silently at runtime.
//!
//! Normalization applies three rewrites, strictly in this order:
//!
//! 1. strip a trailing `.class` extension,
//! 2. replace path separators (`/`, `\`) with dots,
//! 3. collapse separator dots around a recursive wildcard (`.**.` → `**`).
//!
//! Step 2 must run after step 1 so a stripped extension is not dot-mangled;
//! step 3 must run after step 2 so it sees the dot-normalized form.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

/// A pattern that failed to compile into its exact matching form.
#[derive(Debug, Error)]
pub enum PatternError {
    /// More than two consecutive `*` characters.
    #[error("unsupported wildcard run in pattern '{pattern}'")]
    UnsupportedWildcard { pattern: String },

    /// The rewritten pattern is not syntactically valid.
    #[error("pattern '{pattern}' does not compile: {source}")]
    Invalid {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

fn double_wildcard_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\.?\*\*\.?").expect("static pattern compiles"))
}

fn strip_class_suffix(mut pattern: &str) -> &str {
    while let Some(stripped) = pattern.strip_suffix(".class") {
        pattern = stripped;
    }
    pattern
}

/// Rewrite a glob-flavored class selector into its dotted canonical form.
///
/// Idempotent: normalizing an already-normalized pattern is a no-op. The
/// wildcard collapse only eats separator dots, which `**` matches anyway, so
/// matching semantics are unchanged.
pub fn normalize(pattern: &str) -> String {
    let stripped = strip_class_suffix(pattern);
    let dotted: String = stripped
        .chars()
        .map(|c| match c {
            '/' | '\\' => '.',
            c => c,
        })
        .collect();

    let re = double_wildcard_re();
    let mut current = dotted;
    loop {
        let next = re.replace_all(&current, "**").into_owned();
        if next == current {
            return current;
        }
        current = next;
    }
}

/// A compiled class-name pattern.
///
/// `source()` is the exact-match form emitted on the `-n`/`-N` arguments of
/// the spawned process; `matches()` applies it anchored to a full class
/// name. A single wildcard matches any run of characters except a dot, a
/// double wildcard matches across dots.
#[derive(Debug, Clone)]
pub struct ClassPattern {
    source: String,
    regex: Regex,
}

impl ClassPattern {
    /// Normalize and compile a raw glob-flavored pattern.
    pub fn compile(raw: &str) -> Result<Self, PatternError> {
        let normalized = normalize(raw);
        let mut source = String::with_capacity(normalized.len() + 8);
        let mut chars = normalized.chars().peekable();
        while let Some(c) = chars.next() {
            match c {
                '*' => {
                    let mut run = 1;
                    while chars.peek() == Some(&'*') {
                        chars.next();
                        run += 1;
                    }
                    match run {
                        1 => source.push_str("[^.]*"),
                        2 => source.push_str(".*"),
                        _ => {
                            return Err(PatternError::UnsupportedWildcard {
                                pattern: raw.to_string(),
                            });
                        }
                    }
                }
                '?' => source.push_str("[^.]"),
                c => {
                    let mut buf = [0u8; 4];
                    source.push_str(&regex::escape(c.encode_utf8(&mut buf)));
                }
            }
        }
        let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| PatternError::Invalid {
            pattern: raw.to_string(),
            source: e,
        })?;
        Ok(Self { source, regex })
    }

    /// The explicit match-everything pattern, emitted when no class include
    /// was configured.
    pub fn match_all() -> Self {
        Self::compile("**").expect("match-everything pattern compiles")
    }

    /// Exact-match form for the spawned process's argument contract.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether a fully qualified class name matches this pattern.
    pub fn matches(&self, class_name: &str) -> bool {
        self.regex.is_match(class_name)
    }
}
