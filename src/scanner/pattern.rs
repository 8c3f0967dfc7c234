/// Case-insensitive name patterns where `*` matches any run of characters.
///
/// No other character is special: `?`, `[` and friends match themselves.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<Vec<char>>,
    sources: Vec<String>,
}

impl PatternSet {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sources: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let patterns = sources
            .iter()
            .map(|p| p.to_lowercase().chars().collect())
            .collect();

        Self { patterns, sources }
    }

    /// True when `name` matches at least one pattern.
    pub fn matches(&self, name: &str) -> bool {
        let name: Vec<char> = name.to_lowercase().chars().collect();
        self.patterns
            .iter()
            .any(|pattern| wildcard_match(pattern, &name))
    }

    pub fn patterns(&self) -> &[String] {
        &self.sources
    }
}

// Greedy match with single-star backtracking. Linear in practice for the
// short directory names this is used on.
fn wildcard_match(pattern: &[char], name: &[char]) -> bool {
    let (mut p, mut n) = (0, 0);
    let mut last_star: Option<usize> = None;
    let mut resume_at = 0;

    while n < name.len() {
        if p < pattern.len() && pattern[p] == '*' {
            last_star = Some(p);
            p += 1;
            resume_at = n;
        } else if p < pattern.len() && pattern[p] == name[n] {
            p += 1;
            n += 1;
        } else if let Some(star) = last_star {
            p = star + 1;
            resume_at += 1;
            n = resume_at;
        } else {
            return false;
        }
    }

    while p < pattern.len() && pattern[p] == '*' {
        p += 1;
    }

    p == pattern.len()
}
