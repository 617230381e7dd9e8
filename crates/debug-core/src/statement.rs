use crate::language::Language;

/// Prefix every synthesized statement prints at runtime.
pub const DEBUG_TAG: &str = "[DEBUG]";

/// Trailing comment marker identifying lines eligible for removal.
///
/// This is the sole contract between injection and removal: every statement
/// the injector writes carries it, and the remover strips exactly the lines
/// containing it. Never change one side without the other.
pub const REMOVAL_MARKER: &str = "AUTO-DEBUG";

/// Requested logging idiom. Currently advisory: each language renders its
/// single native idiom regardless of the hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogStyle {
    Console,
    Print,
    Logger,
}

impl LogStyle {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "console" => Some(LogStyle::Console),
            "print" => Some(LogStyle::Print),
            "logger" => Some(LogStyle::Logger),
            _ => None,
        }
    }
}

/// Render one diagnostic-output statement in the target language's idiom.
///
/// Pure and total: same inputs always produce the same single line, tagged
/// with [`DEBUG_TAG`] and [`REMOVAL_MARKER`].
pub fn render_statement(
    language: Language,
    message: &str,
    variables: &[String],
    _style: Option<LogStyle>,
) -> String {
    match language {
        Language::Python => {
            if variables.is_empty() {
                format!("print(\"{DEBUG_TAG} {message}\")  # {REMOVAL_MARKER}")
            } else {
                let vars = variables
                    .iter()
                    .map(|v| format!("{v}={{{v}}}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("print(f\"{DEBUG_TAG} {message}: {vars}\")  # {REMOVAL_MARKER}")
            }
        }
        Language::Ruby => {
            if variables.is_empty() {
                format!("puts \"{DEBUG_TAG} {message}\"  # {REMOVAL_MARKER}")
            } else {
                let vars = variables
                    .iter()
                    .map(|v| format!("#{{{v}}}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("puts \"{DEBUG_TAG} {message}: {vars}\"  # {REMOVAL_MARKER}")
            }
        }
        Language::Go => {
            if variables.is_empty() {
                format!("fmt.Println(\"{DEBUG_TAG} {message}\") // {REMOVAL_MARKER}")
            } else {
                let args = variables.join(", ");
                format!(
                    "fmt.Printf(\"{DEBUG_TAG} {message}: %+v\\n\", {args}) // {REMOVAL_MARKER}"
                )
            }
        }
        Language::Java => {
            if variables.is_empty() {
                format!("System.out.println(\"{DEBUG_TAG} {message}\"); // {REMOVAL_MARKER}")
            } else {
                let vars = variables.join(" + \", \" + ");
                format!(
                    "System.out.println(\"{DEBUG_TAG} {message}: \" + {vars}); // {REMOVAL_MARKER}"
                )
            }
        }
        Language::Rust => {
            if variables.is_empty() {
                format!("println!(\"{DEBUG_TAG} {message}\"); // {REMOVAL_MARKER}")
            } else {
                let holes = variables
                    .iter()
                    .map(|v| format!("{v}={{:?}}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                let args = variables.join(", ");
                format!(
                    "println!(\"{DEBUG_TAG} {message}: {holes}\", {args}); // {REMOVAL_MARKER}"
                )
            }
        }
        Language::TypeScript | Language::JavaScript => {
            if variables.is_empty() {
                format!("console.log(\"{DEBUG_TAG} {message}\"); // {REMOVAL_MARKER}")
            } else {
                let args = variables.join(", ");
                format!("console.log(\"{DEBUG_TAG} {message}:\", {args}); // {REMOVAL_MARKER}")
            }
        }
    }
}
