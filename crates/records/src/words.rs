//! "A, B, and C" list grammar.
//!
//! The same grammar is used for display strings and for flattening author
//! and narrator lists into a single column, so [`split_words`] must stay the
//! exact inverse of [`join_words`].

const PAIR_SEPARATOR: &str = " and ";
const LIST_SEPARATOR: &str = ", ";
const TAIL_SEPARATOR: &str = ", and ";

/// Joins words with an Oxford comma.
///
/// - `[]` → `""`
/// - `["A"]` → `"A"`
/// - `["A", "B"]` → `"A and B"`
/// - `["A", "B", "C"]` → `"A, B, and C"`
pub fn join_words<S: AsRef<str>>(words: &[S]) -> String {
    match words {
        [] => String::new(),
        [only] => only.as_ref().to_string(),
        [first, second] => format!("{}{PAIR_SEPARATOR}{}", first.as_ref(), second.as_ref()),
        [head @ .., tail] => {
            let head = head.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(LIST_SEPARATOR);
            format!("{head}{TAIL_SEPARATOR}{}", tail.as_ref())
        },
    }
}

/// Splits a string produced by [`join_words`] back into its words.
///
/// Names containing a literal `", "` or `" and "` can't be told apart from
/// separators; those don't survive the round trip.
pub fn split_words(joined: &str) -> Vec<String> {
    let joined = joined.trim();
    if joined.is_empty() {
        return Vec::new();
    }
    if let Some((head, tail)) = joined.rsplit_once(TAIL_SEPARATOR) {
        let mut words = head.split(LIST_SEPARATOR).map(str::to_string).collect::<Vec<_>>();
        words.push(tail.to_string());
        return words;
    }
    if let Some((first, second)) = joined.split_once(PAIR_SEPARATOR) {
        return vec![first.to_string(), second.to_string()];
    }
    vec![joined.to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(&[], "")]
    #[case(&["A"], "A")]
    #[case(&["A", "B"], "A and B")]
    #[case(&["A", "B", "C"], "A, B, and C")]
    #[case(&["Neil Gaiman", "Terry Pratchett", "Stephen Briggs", "Tony Robinson"], "Neil Gaiman, Terry Pratchett, Stephen Briggs, and Tony Robinson")]
    fn test_join_words(#[case] words: &[&str], #[case] expected: &str) {
        assert_eq!(join_words(words), expected);
    }

    #[rstest]
    #[case(&["Ursula K. Le Guin"])]
    #[case(&["Ray Porter", "Kate Reading"])]
    #[case(&["A", "B", "C"])]
    #[case(&["Jim Dale", "Stephen Fry", "Kobna Holdbrook-Smith", "Imelda Staunton"])]
    #[case(&["One", "Two", "Three", "Four", "Five"])]
    fn test_split_inverts_join(#[case] words: &[&str]) {
        assert_eq!(split_words(&join_words(words)), words);
    }

    #[test]
    fn test_split_empty() {
        assert!(split_words("").is_empty());
        assert!(split_words("   ").is_empty());
    }
}
