//! Task families and their closed sets of classifications.
//!
//! Each family carries everything the shared pipeline needs to run it: the
//! keyword table used for classification, the section headings expected in a
//! response, the language tags accepted for code blocks, and the fixed output
//! file names.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::classifier::{KeywordTable, classify, score};

/// Language tags accepted on fenced code blocks in a response.
pub const CODE_LANGUAGES: &[&str] = &["javascript", "js", "typescript", "ts", "jsx", "tsx"];

/// Agent family a task is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskFamily {
    Security,
    Performance,
    Question,
}

impl TaskFamily {
    pub const ALL: [TaskFamily; 3] = [Self::Security, Self::Performance, Self::Question];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Security => "security",
            Self::Performance => "performance",
            Self::Question => "question",
        }
    }

    /// Classify `spec` with this family's built-in keyword table.
    pub fn classify(self, spec: &str) -> Classification {
        match self {
            Self::Security => Classification::Security(classify(spec, &SecurityFocus::table())),
            Self::Performance => {
                Classification::Performance(classify(spec, &PerformanceFocus::table()))
            }
            Self::Question => Classification::Question(classify(spec, &QuestionKind::table())),
        }
    }

    /// Per-variant keyword hit counts, in declaration order.
    pub fn scores(self, spec: &str) -> Vec<(Classification, usize)> {
        match self {
            Self::Security => score(spec, &SecurityFocus::table())
                .into_iter()
                .map(|(focus, hits)| (Classification::Security(focus), hits))
                .collect(),
            Self::Performance => score(spec, &PerformanceFocus::table())
                .into_iter()
                .map(|(focus, hits)| (Classification::Performance(focus), hits))
                .collect(),
            Self::Question => score(spec, &QuestionKind::table())
                .into_iter()
                .map(|(kind, hits)| (Classification::Question(kind), hits))
                .collect(),
        }
    }

    /// Heading of the analysis section requested from the backend.
    pub fn analysis_title(self) -> &'static str {
        match self {
            Self::Security => "Análisis de Vulnerabilidades",
            Self::Performance => "Análisis de Rendimiento",
            Self::Question => "Respuesta",
        }
    }

    /// Heading of the remediation section requested from the backend.
    pub fn remediation_title(self) -> &'static str {
        match self {
            Self::Security => "Correcciones Recomendadas",
            Self::Performance => "Optimizaciones Recomendadas",
            Self::Question => "Ejemplos",
        }
    }

    pub fn section_titles(self) -> [&'static str; 2] {
        [self.analysis_title(), self.remediation_title()]
    }

    pub fn language_hints(self) -> &'static [&'static str] {
        CODE_LANGUAGES
    }

    /// Output file names written for this family. Stable across runs.
    pub fn output_files(self) -> OutputFiles {
        match self {
            Self::Security => OutputFiles {
                analysis: "security-analysis.md",
                remediation: "security-fixes.md",
                code: "secure-code.js",
                response: "response.md",
            },
            Self::Performance => OutputFiles {
                analysis: "performance-analysis.md",
                remediation: "optimizations.md",
                code: "optimized-code.js",
                response: "response.md",
            },
            Self::Question => OutputFiles {
                analysis: "answer.md",
                remediation: "examples.md",
                code: "example-code.js",
                response: "response.md",
            },
        }
    }
}

impl fmt::Display for TaskFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskFamily {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|family| family.as_str() == value)
            .ok_or_else(|| {
                format!("unknown task family '{value}' (expected security, performance or question)")
            })
    }
}

/// File names a family writes under its output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputFiles {
    pub analysis: &'static str,
    pub remediation: &'static str,
    pub code: &'static str,
    pub response: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityFocus {
    Auth,
    Api,
    Code,
}

impl SecurityFocus {
    pub fn table() -> KeywordTable<Self> {
        KeywordTable::new(Self::Code)
            .with(
                Self::Auth,
                &[
                    "authentic",
                    "authoriz",
                    "login",
                    "password",
                    "jwt",
                    "token",
                    "session",
                    "oauth",
                    "credential",
                ],
            )
            .with(
                Self::Api,
                &[
                    "api",
                    "endpoint",
                    "rest api",
                    "rest endpoint",
                    "restful",
                    "graphql",
                    "cors",
                    "rate limit",
                    "route",
                ],
            )
            .with(
                Self::Code,
                &[
                    "injection", "vulnerability", "xss", "sql", "sanitiz", "csrf", "dependenc",
                    "secret",
                ],
            )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Api => "api",
            Self::Code => "code",
        }
    }

    fn code_hint(self) -> &'static str {
        match self {
            Self::Auth => "token",
            Self::Api => "endpoint",
            Self::Code => "sanitize",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceFocus {
    Frontend,
    Backend,
    Database,
    Algorithm,
    Mobile,
    Network,
    General,
}

impl PerformanceFocus {
    pub fn table() -> KeywordTable<Self> {
        KeywordTable::new(Self::General)
            .with(
                Self::Frontend,
                &[
                    "frontend",
                    "front-end",
                    "react",
                    "render",
                    "component",
                    "bundle",
                    "css",
                    "virtual dom",
                    "webpack",
                ],
            )
            .with(
                Self::Backend,
                &[
                    "backend",
                    "back-end",
                    "server",
                    "node.js",
                    "nodejs",
                    "express.js",
                    "expressjs",
                    "cache",
                    "throughput",
                    "latency",
                ],
            )
            .with(
                Self::Database,
                &[
                    "database",
                    "query",
                    "queries",
                    "sql",
                    "index",
                    "prisma",
                    "sequelize",
                    "postgres",
                    "mongo",
                ],
            )
            .with(
                Self::Algorithm,
                &["algorithm", "complexity", "loop", "sorting", "recursi", "big-o", "o(n"],
            )
            .with(
                Self::Mobile,
                &["mobile", "android", "ios app", "iphone", "react native", "battery"],
            )
            .with(
                Self::Network,
                &[
                    "network", "http", "bandwidth", "cdn", "compression", "payload", "websocket",
                ],
            )
            .with(Self::General, &["general", "overall", "profil"])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Frontend => "frontend",
            Self::Backend => "backend",
            Self::Database => "database",
            Self::Algorithm => "algorithm",
            Self::Mobile => "mobile",
            Self::Network => "network",
            Self::General => "general",
        }
    }

    fn code_hint(self) -> &'static str {
        match self {
            Self::Frontend => "component",
            Self::Backend => "cache",
            Self::Database => "query",
            Self::Algorithm => "function",
            Self::Mobile => "list",
            Self::Network => "request",
            Self::General => "measure",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Architecture,
    Implementation,
    Debugging,
    General,
}

impl QuestionKind {
    pub fn table() -> KeywordTable<Self> {
        KeywordTable::new(Self::General)
            .with(
                Self::Architecture,
                &[
                    "architecture",
                    "design",
                    "structure",
                    "pattern",
                    "module",
                    "layered",
                    "layering",
                ],
            )
            .with(
                Self::Implementation,
                &["implement", "how do i", "how to", "example", "build", "create"],
            )
            .with(
                Self::Debugging,
                &["error", "bug", "debug", "fail", "crash", "exception", "broken"],
            )
            .with(Self::General, &["what is", "explain", "why"])
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::Implementation => "implementation",
            Self::Debugging => "debugging",
            Self::General => "general",
        }
    }

    fn code_hint(self) -> &'static str {
        match self {
            Self::Architecture => "module",
            Self::Implementation => "example",
            Self::Debugging => "error",
            Self::General => "example",
        }
    }
}

/// Closed classification of a task within its family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "family", content = "variant", rename_all = "lowercase")]
pub enum Classification {
    Security(SecurityFocus),
    Performance(PerformanceFocus),
    Question(QuestionKind),
}

impl Classification {
    pub fn family(self) -> TaskFamily {
        match self {
            Self::Security(_) => TaskFamily::Security,
            Self::Performance(_) => TaskFamily::Performance,
            Self::Question(_) => TaskFamily::Question,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Security(focus) => focus.as_str(),
            Self::Performance(focus) => focus.as_str(),
            Self::Question(kind) => kind.as_str(),
        }
    }

    /// Content hint used to pick the most relevant code block of a response.
    pub fn code_hint(self) -> &'static str {
        match self {
            Self::Security(focus) => focus.code_hint(),
            Self::Performance(focus) => focus.code_hint(),
            Self::Question(kind) => kind.code_hint(),
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.family(), self.label())
    }
}
