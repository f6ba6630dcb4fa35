//! Deterministic keyword-frequency classification of task specs.

/// Ordered keyword lists for the variants of one task family.
///
/// Declaration order is the tie-break order. The designated default wins
/// when no keyword of any variant occurs in the spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordTable<V> {
    entries: Vec<(V, Vec<String>)>,
    default: V,
}

impl<V: Copy + PartialEq> KeywordTable<V> {
    /// Create an empty table whose all-zero outcome is `default`.
    pub fn new(default: V) -> Self {
        Self {
            entries: Vec::new(),
            default,
        }
    }

    /// Append `variant` with its keywords. Keywords are lower-cased and
    /// de-duplicated; empty keywords are ignored.
    pub fn with(mut self, variant: V, keywords: &[&str]) -> Self {
        let mut lowered: Vec<String> = Vec::with_capacity(keywords.len());
        for keyword in keywords {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty() && !lowered.contains(&keyword) {
                lowered.push(keyword);
            }
        }
        match self.entries.iter_mut().find(|(existing, _)| *existing == variant) {
            Some((_, existing)) => {
                for keyword in lowered {
                    if !existing.contains(&keyword) {
                        existing.push(keyword);
                    }
                }
            }
            None => self.entries.push((variant, lowered)),
        }
        self
    }

    pub fn default_variant(&self) -> V {
        self.default
    }

    pub fn variants(&self) -> impl Iterator<Item = V> + '_ {
        self.entries.iter().map(|(variant, _)| *variant)
    }

    pub fn keywords(&self, variant: V) -> &[String] {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == variant)
            .map(|(_, keywords)| keywords.as_slice())
            .unwrap_or(&[])
    }
}

/// Score every variant of `table` against `spec`, in declaration order.
///
/// A keyword contributes at most once no matter how often it repeats.
pub fn score<V: Copy + PartialEq>(spec: &str, table: &KeywordTable<V>) -> Vec<(V, usize)> {
    let lowered = spec.to_lowercase();
    table
        .entries
        .iter()
        .map(|(variant, keywords)| {
            let hits = keywords
                .iter()
                .filter(|keyword| lowered.contains(keyword.as_str()))
                .count();
            (*variant, hits)
        })
        .collect()
}

/// Pick the variant with the strictly highest keyword count.
///
/// Ties go to the first-declared variant; an all-zero score resolves to the
/// table's default.
pub fn classify<V: Copy + PartialEq>(spec: &str, table: &KeywordTable<V>) -> V {
    let mut best: Option<(V, usize)> = None;
    for (variant, hits) in score(spec, table) {
        if best.is_none_or(|(_, top)| hits > top) {
            best = Some((variant, hits));
        }
    }
    match best {
        Some((variant, hits)) if hits > 0 => variant,
        _ => table.default,
    }
}
