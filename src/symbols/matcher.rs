//! Camel-hump prefix matching for class names and namespaces.

/// Matches names the way completion popups do: every pattern character must
/// match either the next character of the current word or the first
/// character of a later word, ignoring case.
///
/// `FoBa` matches `FooBar`, `fbar` matches `FooBar`, `Baz` matches
/// `BazController` but not `BarController`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CamelHumpMatcher {
    pattern: Vec<char>,
}

impl CamelHumpMatcher {
    /// Create a matcher; whitespace in `pattern` is ignored.
    pub fn new(pattern: &str) -> Self {
        Self { pattern: pattern.chars().filter(|c| !c.is_whitespace()).collect() }
    }

    /// The pattern as typed, without whitespace.
    pub fn pattern(&self) -> String {
        self.pattern.iter().collect()
    }

    /// The match must start at the first character of `name`.
    pub fn is_start_match(&self, name: &str) -> bool {
        let name: Vec<char> = name.chars().collect();
        let Some(&first) = self.pattern.first() else {
            return true;
        };
        !name.is_empty() && same(first, name[0]) && self.tails(&name)[1]
    }

    /// The match may start at any word of `name`.
    pub fn prefix_matches(&self, name: &str) -> bool {
        let name: Vec<char> = name.chars().collect();
        let Some(&first) = self.pattern.first() else {
            return true;
        };
        let tails = self.tails(&name);
        word_starts(&name).any(|start| same(first, name[start]) && tails[start + 1])
    }

    /// `tails[i]`: the pattern minus its first character matches `name`
    /// from index `i` on.
    ///
    /// Filled one pattern character at a time, from the last one back, so
    /// the cost is O(pattern × name).
    fn tails(&self, name: &[char]) -> Vec<bool> {
        let mut is_start = vec![false; name.len()];
        for start in word_starts(name) {
            is_start[start] = true;
        }

        let mut next = vec![true; name.len() + 1];
        for &wanted in self.pattern.get(1..).unwrap_or_default().iter().rev() {
            let mut row = vec![false; name.len() + 1];
            // some word start after `ni` continues the match
            let mut later = false;
            for ni in (0..=name.len()).rev() {
                let here = ni < name.len() && same(wanted, name[ni]) && next[ni + 1];
                row[ni] = here || later;
                if here && is_start[ni] {
                    later = true;
                }
            }
            next = row;
        }
        next
    }
}

fn same(a: char, b: char) -> bool {
    a.eq_ignore_ascii_case(&b) || a.to_lowercase().eq(b.to_lowercase())
}

fn is_separator(c: char) -> bool {
    !c.is_alphanumeric()
}

/// Indices where a new word begins.
fn word_starts(name: &[char]) -> impl Iterator<Item = usize> + '_ {
    (0..name.len()).filter(move |&i| {
        let c = name[i];
        if is_separator(c) {
            return false;
        }
        if i == 0 {
            return true;
        }
        let prev = name[i - 1];
        if is_separator(prev) {
            return true;
        }
        if c.is_uppercase() && !prev.is_uppercase() {
            return true;
        }
        // `HTMLParser`: the `P` starts a word
        c.is_uppercase() && name.get(i + 1).is_some_and(|next| next.is_lowercase())
    })
}
