use aichemy_types::*;

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");

    let long = "What diseases are associated with EGFR and which drugs target it";
    let truncated = truncate(long, 20);
    assert_eq!(truncated, "What diseases are as...");
}

#[test]
fn test_truncate_multibyte() {
    let s = "αβγδεζηθ";
    assert_eq!(truncate(s, 3), "αβγ...");
}

#[test]
fn test_single_line() {
    assert_eq!(single_line("  a\n\nb   c "), "a b c");
}
