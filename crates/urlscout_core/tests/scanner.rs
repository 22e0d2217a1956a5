use pretty_assertions::assert_eq;
use urlscout_core::{last_url_token, BracketScanner};

#[test]
fn single_group_emits_its_url() {
    assert_eq!(
        BracketScanner::scan("foo [ www.google.com ] bar"),
        vec!["www.google.com"]
    );
}

#[test]
fn last_url_in_group_wins() {
    let text = "[first https://a.example.com then http://b.example.com/x?y=1 and www.c.example.com]";
    assert_eq!(BracketScanner::scan(text), vec!["www.c.example.com"]);
}

#[test]
fn nested_groups_are_flattened_into_outer_group() {
    assert_eq!(
        BracketScanner::scan("multiple levels[ [www.first.com] www.second.com]"),
        vec!["www.second.com"]
    );
}

#[test]
fn inner_group_url_is_used_when_it_is_the_last_one() {
    assert_eq!(
        BracketScanner::scan("[www.first.com [ https://inner.example.org ] ]"),
        vec!["https://inner.example.org"]
    );
}

#[test]
fn unclosed_group_emits_nothing() {
    assert!(BracketScanner::scan("unclosed [ www.google.com ").is_empty());
}

#[test]
fn urls_outside_brackets_are_ignored() {
    assert!(BracketScanner::scan("see https://example.com and www.example.org").is_empty());
    assert_eq!(
        BracketScanner::scan("www.outside.com [www.inside.com] https://after.com"),
        vec!["www.inside.com"]
    );
}

#[test]
fn stray_closing_brackets_are_no_ops() {
    let mut scanner = BracketScanner::new();
    assert!(scanner.feed("]]] text ]").is_empty());
    assert!(!scanner.is_inside_group());
    assert_eq!(scanner.feed("[www.ok.com]]"), vec!["www.ok.com"]);
    assert!(!scanner.is_inside_group());
}

#[test]
fn groups_without_urls_emit_nothing() {
    assert_eq!(
        BracketScanner::scan("[nothing here] [ftp://not.matched] [www.yes.com]"),
        vec!["www.yes.com"]
    );
}

#[test]
fn one_candidate_per_group_in_closing_order() {
    let text = "[a www.one.com] middle [https://two.com] [no url] [HTTP://THREE.COM/path]";
    assert_eq!(
        BracketScanner::scan(text),
        vec!["www.one.com", "https://two.com", "HTTP://THREE.COM/path"]
    );
}

#[test]
fn escaped_brackets_do_not_change_depth() {
    // The escaped `]` stays inside the group, so both URLs share it.
    assert_eq!(
        BracketScanner::scan(r"[ www.a.com \] www.b.com ]"),
        vec!["www.b.com"]
    );
    // An escaped `[` at depth zero never opens a group.
    assert!(BracketScanner::scan(r"\[ www.a.com ]").is_empty());
}

#[test]
fn escaped_brackets_are_not_structural_delimiters_in_output() {
    let found = BracketScanner::scan(r"[see \[note\] https://example.com/a ]");
    assert_eq!(found, vec!["https://example.com/a"]);
    assert!(found.iter().all(|url| !url.contains('[') && !url.contains(']')));
}

#[test]
fn escaped_backslash_does_not_escape_the_bracket() {
    assert_eq!(BracketScanner::scan(r"\\[ www.a.com ]"), vec!["www.a.com"]);
}

#[test]
fn streaming_matches_batch_scan_for_every_split() {
    let text = r"intro [ www.a.com ] x [ nested [ https://b.com ] \] tail www.c.com ] [www.d.com";
    let expected = BracketScanner::scan(text);
    assert_eq!(expected, vec!["www.a.com", "www.c.com"]);

    let chars: Vec<char> = text.chars().collect();
    for split in 0..=chars.len() {
        let head: String = chars[..split].iter().collect();
        let tail: String = chars[split..].iter().collect();
        let mut scanner = BracketScanner::new();
        let mut found = scanner.feed(&head);
        found.extend(scanner.feed(&tail));
        assert_eq!(found, expected, "split at {split}");
    }
}

#[test]
fn open_group_survives_across_chunks() {
    let mut scanner = BracketScanner::new();
    assert!(scanner.feed("before [ https://exam").is_empty());
    assert!(scanner.is_inside_group());
    assert!(scanner.feed("ple.com/path").is_empty());
    assert_eq!(scanner.feed(" ] after"), vec!["https://example.com/path"]);
    assert!(!scanner.is_inside_group());
}

#[test]
fn url_token_is_case_insensitive_and_stops_at_whitespace_or_brackets() {
    assert_eq!(last_url_token("go HtTpS://x.io/a b"), Some("HtTpS://x.io/a"));
    assert_eq!(last_url_token("no links here"), None);
    assert_eq!(last_url_token("www.a.com\tthen"), Some("www.a.com"));
}
