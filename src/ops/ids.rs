use chrono::Utc;
use rand::Rng;

/// Kind of entity an id is generated for; determines the id prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdKind {
    Topic,
    SubTopic,
    Question,
}

impl IdKind {
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::Topic => "topic",
            IdKind::SubTopic => "sub",
            IdKind::Question => "q",
        }
    }
}

const SUFFIX_LEN: usize = 4;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate an id like `q-m1x2k3l4-7fz0`: kind prefix, base36 millisecond
/// timestamp, short random suffix. Unique within a session with overwhelming
/// probability; not globally unique.
pub fn generate_id(kind: IdKind) -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}-{}", kind.prefix(), to_base36(millis), suffix)
}

fn to_base36(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while n > 0 {
        digits.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

/// Lower-case a display name and join whitespace runs with single hyphens:
/// `"Arrays  & Sorting"` → `"arrays-&-sorting"`.
pub fn slugify(name: &str) -> String {
    name.split_whitespace()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join("-")
}

/// Return `base` if unused, else the first of `base-2`, `base-3`, … not in `taken`.
pub fn dedupe_slug<'a, I>(base: &str, taken: I) -> String
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let is_taken = |candidate: &str| taken.clone().into_iter().any(|t| t == candidate);
    if !is_taken(base) {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !is_taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn generated_ids_carry_kind_prefix() {
        assert!(generate_id(IdKind::Topic).starts_with("topic-"));
        assert!(generate_id(IdKind::SubTopic).starts_with("sub-"));
        assert!(generate_id(IdKind::Question).starts_with("q-"));
    }

    #[test]
    fn generated_ids_are_distinct_within_a_burst() {
        let ids: HashSet<String> = (0..200).map(|_| generate_id(IdKind::Question)).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn base36_encoding() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(35), "z");
        assert_eq!(to_base36(36), "10");
    }

    #[test]
    fn slugify_lowercases_and_hyphenates_whitespace_runs() {
        assert_eq!(slugify("Arrays & Sorting"), "arrays-&-sorting");
        assert_eq!(slugify("  Binary   Search\tTrees "), "binary-search-trees");
        assert_eq!(slugify("Easy"), "easy");
    }

    #[test]
    fn dedupe_slug_appends_counter() {
        let taken = ["easy", "easy-2"];
        assert_eq!(dedupe_slug("easy", taken.iter().copied()), "easy-3");
        assert_eq!(dedupe_slug("hard", taken.iter().copied()), "hard");
    }
}
