//! Extraction of named sections and fenced code blocks from free-text responses.
//!
//! Responses are unstructured: any section or block may be missing, truncated,
//! or repeated. Every function here degrades to empty output instead of
//! failing.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Opening fence line with its optional language tag.
///
/// Any line starting with three backticks opens a block. Only a bare
/// triple-backtick line closes one, so a tagged line such as ```` ```js ````
/// inside a block is content.
static FENCE_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t]*```[ \t]*([A-Za-z0-9_+#.-]*)").expect("fence pattern is valid")
});

/// A fenced code block found in a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language tag as written after the opening fence, lower-cased.
    pub language: String,
    /// Block content between the fences, without the final line break.
    pub body: String,
}

/// Sections and code blocks extracted from one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedArtifactSet {
    pub sections: BTreeMap<String, String>,
    pub code_blocks: Vec<CodeBlock>,
}

impl ExtractedArtifactSet {
    /// Extract `titles` and the code blocks tagged with `language_hints`.
    pub fn from_response(text: &str, titles: &[&str], language_hints: &[&str]) -> Self {
        Self {
            sections: extract_sections(text, titles),
            code_blocks: extract_code_blocks(text, language_hints),
        }
    }

    /// Body of `title`, or `""` when the response lacked that heading.
    pub fn section(&self, title: &str) -> &str {
        self.sections.get(title).map(String::as_str).unwrap_or("")
    }

    /// Titles whose body came back empty, in sorted order.
    pub fn missing_sections(&self) -> Vec<&str> {
        self.sections
            .iter()
            .filter(|(_, body)| body.is_empty())
            .map(|(title, _)| title.as_str())
            .collect()
    }

    pub fn select_code(&self, content_hint: &str) -> String {
        select_code_block(&self.code_blocks, content_hint)
    }
}

/// Map each requested title to the body under its `## ` heading.
///
/// Headings match case-insensitively. A body runs until the next `## `
/// heading or end of text and is trimmed of surrounding whitespace only.
/// Headings inside fenced blocks are ignored. Missing titles map to `""`;
/// when a heading repeats, the first occurrence wins.
pub fn extract_sections(text: &str, titles: &[&str]) -> BTreeMap<String, String> {
    let headings = scan(text).headings;
    let mut sections = BTreeMap::new();
    for title in titles {
        let wanted = title.trim().to_lowercase();
        let body = headings
            .iter()
            .find(|heading| heading.title.to_lowercase() == wanted)
            .map(|heading| text[heading.body_start..heading.body_end].trim().to_string())
            .unwrap_or_default();
        sections.insert((*title).to_string(), body);
    }
    sections
}

/// Collect fenced blocks whose language tag is one of `language_hints`, in
/// document order. Unterminated fences are skipped.
pub fn extract_code_blocks(text: &str, language_hints: &[&str]) -> Vec<CodeBlock> {
    scan(text)
        .fences
        .into_iter()
        .filter(|fence| {
            language_hints
                .iter()
                .any(|hint| hint.eq_ignore_ascii_case(fence.language))
        })
        .map(|fence| {
            let body = fence
                .body
                .strip_suffix('\n')
                .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
                .unwrap_or(fence.body);
            CodeBlock {
                language: fence.language.to_lowercase(),
                body: body.to_string(),
            }
        })
        .collect()
}

/// Pick the first block whose body mentions `content_hint`.
///
/// Matching ignores case and simple plural forms. Falls back to the first
/// block, then to `""` when there are no blocks.
pub fn select_code_block(blocks: &[CodeBlock], content_hint: &str) -> String {
    let forms = hint_forms(content_hint);
    let matched = if forms.is_empty() {
        None
    } else {
        blocks.iter().find(|block| {
            let body = block.body.to_lowercase();
            forms.iter().any(|form| body.contains(form.as_str()))
        })
    };
    matched
        .or_else(|| blocks.first())
        .map(|block| block.body.clone())
        .unwrap_or_default()
}

/// Singular and plural spellings of a hint, lower-cased.
fn hint_forms(hint: &str) -> Vec<String> {
    let hint = hint.trim().to_lowercase();
    if hint.is_empty() {
        return Vec::new();
    }
    let singular = singularize(&hint);
    let plural = pluralize(&singular);
    let mut forms = vec![singular];
    if !forms.contains(&plural) {
        forms.push(plural);
    }
    forms
}

fn singularize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("ies")
        && !stem.is_empty()
    {
        return format!("{stem}y");
    }
    for suffix in ["ches", "shes", "sses", "xes"] {
        if word.ends_with(suffix) {
            return word[..word.len() - 2].to_string();
        }
    }
    if let Some(stem) = word.strip_suffix('s')
        && !stem.is_empty()
        && !stem.ends_with(['s', 'u', 'i'])
    {
        return stem.to_string();
    }
    word.to_string()
}

fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y')
        && !stem.is_empty()
        && !stem.ends_with(['a', 'e', 'i', 'o', 'u'])
    {
        return format!("{stem}ies");
    }
    if ["ch", "sh", "s", "x"].iter().any(|suffix| word.ends_with(suffix)) {
        return format!("{word}es");
    }
    format!("{word}s")
}

#[derive(Debug)]
struct Heading<'a> {
    title: &'a str,
    body_start: usize,
    body_end: usize,
}

#[derive(Debug)]
struct Fence<'a> {
    language: &'a str,
    /// Lines between the fences, including the last line break.
    body: &'a str,
}

#[derive(Debug, Default)]
struct Layout<'a> {
    headings: Vec<Heading<'a>>,
    fences: Vec<Fence<'a>>,
}

/// Line-oriented scan for level-two headings and closed fenced blocks.
///
/// Headings inside a fence are not headings. A fence left open at end of
/// text yields no block and hides any heading after it.
fn scan(text: &str) -> Layout<'_> {
    let mut layout = Layout::default();
    let mut open: Option<(&str, usize)> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let line_start = offset;
        offset += line.len();
        let content = line.trim_end_matches(['\n', '\r']);

        if let Some((language, body_start)) = open {
            if content.trim() == "```" {
                layout.fences.push(Fence {
                    language,
                    body: &text[body_start..line_start],
                });
                open = None;
            }
            continue;
        }
        if let Some(caps) = FENCE_OPEN_RE.captures(content) {
            let language = caps.get(1).map_or("", |tag| tag.as_str());
            open = Some((language, offset));
            continue;
        }
        if let Some(title) = content.trim_start().strip_prefix("## ") {
            if let Some(previous) = layout.headings.last_mut() {
                previous.body_end = line_start;
            }
            layout.headings.push(Heading {
                title: title.trim(),
                body_start: offset,
                body_end: text.len(),
            });
        }
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECURITY_REPLY: &str = "\
# Informe

## Análisis de Vulnerabilidades

Se detectó una inyección SQL en `/api/users`.

## Correcciones Recomendadas

Usa consultas parametrizadas:

```javascript
const rows = await db.query('SELECT * FROM users WHERE id = $1', [id]);
```
";

    #[test]
    fn single_heading_round_trips_body() {
        let sections = extract_sections("## Title\nB", &["Title"]);
        assert_eq!(sections.get("Title").map(String::as_str), Some("B"));
    }

    #[test]
    fn body_keeps_inner_text_and_trims_only_edges() {
        let text = "## Title\n\n  line one\n\n  line two  \n\n";
        let sections = extract_sections(text, &["Title"]);
        assert_eq!(sections["Title"], "line one\n\n  line two");
    }

    #[test]
    fn missing_heading_yields_empty_string() {
        let sections = extract_sections("no headings here", &["Resumen", "Detalles"]);
        assert_eq!(sections["Resumen"], "");
        assert_eq!(sections["Detalles"], "");
        assert_eq!(extract_sections("", &["X"])["X"], "");
    }

    #[test]
    fn heading_match_is_case_insensitive() {
        let sections = extract_sections(SECURITY_REPLY, &["análisis de vulnerabilidades"]);
        assert_eq!(
            sections["análisis de vulnerabilidades"],
            "Se detectó una inyección SQL en `/api/users`."
        );
    }

    #[test]
    fn section_stops_at_next_level_two_heading_only() {
        let text = "## A\nalpha\n### A.1\nnested\n## B\nbeta";
        let sections = extract_sections(text, &["A", "B"]);
        assert_eq!(sections["A"], "alpha\n### A.1\nnested");
        assert_eq!(sections["B"], "beta");
    }

    #[test]
    fn headings_inside_fences_are_ignored() {
        let text = "## Script\n```python\n## not a heading\nprint(1)\n```\n## Next\nafter";
        let sections = extract_sections(text, &["Script", "not a heading", "Next"]);
        assert!(sections["Script"].contains("## not a heading"));
        assert_eq!(sections["not a heading"], "");
        assert_eq!(sections["Next"], "after");
    }

    #[test]
    fn repeated_heading_keeps_first_occurrence() {
        let text = "## Dup\nfirst\n## Dup\nsecond";
        assert_eq!(extract_sections(text, &["Dup"])["Dup"], "first");
    }

    #[test]
    fn crlf_text_is_supported() {
        let text = "## Title\r\nbody\r\n## Other\r\nrest\r\n";
        let sections = extract_sections(text, &["Title", "Other"]);
        assert_eq!(sections["Title"], "body");
        assert_eq!(sections["Other"], "rest");
    }

    #[test]
    fn code_blocks_are_collected_in_order_by_language() {
        let text = "```js\none()\n```\n```python\nskip()\n```\n```TypeScript\ntwo()\n```";
        let blocks = extract_code_blocks(text, &["js", "typescript"]);
        assert_eq!(
            blocks,
            vec![
                CodeBlock {
                    language: "js".to_string(),
                    body: "one()".to_string()
                },
                CodeBlock {
                    language: "typescript".to_string(),
                    body: "two()".to_string()
                },
            ]
        );
    }

    #[test]
    fn unterminated_and_untagged_fences_are_skipped() {
        let text = "```\nplain\n```\n```js\nnever closed";
        assert!(extract_code_blocks(text, &["js"]).is_empty());
    }

    #[test]
    fn empty_block_has_empty_body() {
        let blocks = extract_code_blocks("```js\n```\n", &["js"]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "");
    }

    #[test]
    fn opener_is_not_taken_as_closing_fence() {
        let text = "```js\nfirst()\n```js\nsecond()\n```";
        let blocks = extract_code_blocks(text, &["js"]);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].body, "first()\n```js\nsecond()");
    }

    #[test]
    fn tagged_line_inside_block_does_not_hide_later_headings() {
        let text = "## A\n```js\nfirst()\n```js\nsecond()\n```\n## B\nbeta";
        assert_eq!(extract_code_blocks(text, &["js"]).len(), 1);
        let sections = extract_sections(text, &["A", "B"]);
        assert_eq!(sections["A"], "```js\nfirst()\n```js\nsecond()\n```");
        assert_eq!(sections["B"], "beta");
    }

    #[test]
    fn untagged_block_hides_headings_but_yields_no_code() {
        let text = "## A\n```\n## fake\n```\n## B\nbeta";
        assert!(extract_code_blocks(text, &["js"]).is_empty());
        let sections = extract_sections(text, &["fake", "B"]);
        assert_eq!(sections["fake"], "");
        assert_eq!(sections["B"], "beta");
    }

    #[test]
    fn select_without_blocks_is_empty() {
        assert_eq!(select_code_block(&[], "query"), "");
        let blocks = extract_code_blocks("no fences at all", &["js"]);
        assert_eq!(select_code_block(&blocks, "query"), "");
    }

    #[test]
    fn select_without_match_returns_first_block_verbatim() {
        let text = "```js\n  const a = 1;\n```\n```js\nconst b = 2;\n```";
        let blocks = extract_code_blocks(text, &["js"]);
        assert_eq!(select_code_block(&blocks, "websocket"), "  const a = 1;");
    }

    #[test]
    fn select_prefers_hint_match_ignoring_case_and_plurals() {
        let text = "```js\nconst a = 1;\n```\n```js\nrunQueries(DB);\n```\n```js\nlistComponents();\n```";
        let blocks = extract_code_blocks(text, &["js"]);
        assert_eq!(select_code_block(&blocks, "query"), "runQueries(DB);");
        assert_eq!(select_code_block(&blocks, "Components"), "listComponents();");
        assert_eq!(select_code_block(&blocks, "db"), "runQueries(DB);");
    }

    #[test]
    fn select_with_blank_hint_falls_back_to_first() {
        let blocks = extract_code_blocks("```js\nfirst\n```\n```js\nsecond\n```", &["js"]);
        assert_eq!(select_code_block(&blocks, "  "), "first");
    }

    #[test]
    fn hint_forms_cover_common_plurals() {
        assert_eq!(hint_forms("query"), vec!["query", "queries"]);
        assert_eq!(hint_forms("queries"), vec!["query", "queries"]);
        assert_eq!(hint_forms("Components"), vec!["component", "components"]);
        assert_eq!(hint_forms("cache"), vec!["cache", "caches"]);
        assert_eq!(hint_forms("matches"), vec!["match", "matches"]);
        assert_eq!(hint_forms("access"), vec!["access", "accesses"]);
        assert_eq!(hint_forms("key"), vec!["key", "keys"]);
        assert_eq!(hint_forms("status"), vec!["status", "statuses"]);
        assert_eq!(hint_forms("bus"), vec!["bus", "buses"]);
    }

    #[test]
    fn words_ending_in_us_keep_their_stem() {
        let text = "```js\n// statute of limitations\n```\n```js\nres.status(500);\n```";
        let blocks = extract_code_blocks(text, &["js"]);
        assert_eq!(select_code_block(&blocks, "status"), "res.status(500);");
    }

    #[test]
    fn artifact_set_reports_sections_and_code() {
        let set = ExtractedArtifactSet::from_response(
            SECURITY_REPLY,
            &["Análisis de Vulnerabilidades", "Correcciones Recomendadas", "Resumen"],
            &["javascript"],
        );
        assert!(!set.section("Análisis de Vulnerabilidades").is_empty());
        assert!(
            set.section("Correcciones Recomendadas")
                .starts_with("Usa consultas parametrizadas:")
        );
        assert_eq!(set.section("Resumen"), "");
        assert_eq!(set.section("Unrequested"), "");
        assert_eq!(set.missing_sections(), vec!["Resumen"]);
        assert_eq!(
            set.select_code("query"),
            "const rows = await db.query('SELECT * FROM users WHERE id = $1', [id]);"
        );
    }
}
