use std::collections::HashSet;

use lenfuzz::grammar::{parse_grammar, LoadedGrammar};
use lenfuzz::Session;

fn load(text: &str) -> LoadedGrammar {
    parse_grammar(text, None).unwrap()
}

#[test]
fn left_recursion_terminates() {
    let loaded = load(r#"root -> root "b" | "c" ;"#);
    let g = &loaded.grammar;
    let mut session = Session::new(g);

    assert_eq!(session.count(loaded.start, 0).unwrap(), 0);
    for length in 1..=12 {
        let def = session.definition_of(loaded.start, length).unwrap();
        assert_eq!(session.count_of(def), 1);

        let expected = format!("c{}", "b".repeat(length - 1));
        assert_eq!(session.string_at(def, 0).unwrap().render_lossy(g), expected);
    }

    assert_eq!(session.stats().cycle_cuts, 0);
}

#[test]
fn ambiguous_concatenation_counts_derivations() {
    // number of binary bracketings of n letters
    let loaded = load(r#"root -> root root | "a" ;"#);
    let mut session = Session::new(&loaded.grammar);

    let counts: Vec<_> = session
        .length_spectrum(loaded.start, 1..=7)
        .unwrap()
        .into_iter()
        .map(|(_, count)| count)
        .collect();
    assert_eq!(counts, vec![1, 1, 2, 5, 14, 42, 132]);

    let def = session.definition_of(loaded.start, 5).unwrap();
    assert_eq!(session.all_strings(def).len(), 1);
    assert_eq!(session.stats().cycle_cuts, 0);
}

#[test]
fn unit_cycle_is_cut() {
    let text = r#"
        start = "a"
        a -> b | "y" ;
        b -> a | "x" ;
    "#;
    let loaded = load(text);
    let g = &loaded.grammar;
    let a = loaded.start;
    let b = g.symbol_by_name("b").unwrap();

    let mut session = Session::new(g);
    let def = session.definition_of(a, 1).unwrap();
    assert_eq!(session.count_of(def), 2);

    let strings: HashSet<_> = session
        .all_strings(def)
        .iter()
        .map(|s| s.render_lossy(g))
        .collect();
    assert_eq!(strings, HashSet::from(["x".to_string(), "y".to_string()]));
    assert!(session.stats().cycle_cuts > 0);

    // b after a must not reuse a's view of the cycle
    assert_eq!(session.count(b, 1).unwrap(), 2);
    assert_eq!(Session::new(g).count(b, 1).unwrap(), 2);
    assert_eq!(session.count(a, 2).unwrap(), 0);
}

#[test]
fn nullable_cycle_is_cut() {
    let loaded = load(r#"root -> root root | "a" | Nothing ;"#);
    let mut session = Session::new(&loaded.grammar);

    let def = session.definition_of(loaded.start, 2).unwrap();
    let count = session.count_of(def);
    assert!(count > 0);

    let all = session.all_strings(def);
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].render_lossy(&loaded.grammar), "aa");

    for rank in 0..count {
        assert_eq!(session.string_at(def, rank).unwrap(), all[0]);
    }
}

#[test]
fn nullable_cycle_stays_memoized() {
    let loaded = load(r#"root -> root root | "a" | Nothing ;"#);
    let mut session = Session::new(&loaded.grammar);

    // the empty tail is never split off, so only bracketings of "a"s count
    assert_eq!(
        session.count(loaded.start, 30).unwrap(),
        1_002_242_216_651_368
    );

    let stats = session.stats();
    assert!(stats.definitions < 200, "{stats:?}");
    assert!(stats.rule_definitions < 200, "{stats:?}");
    assert!(stats.cycle_cuts <= 30, "{stats:?}");

    assert_eq!(
        session.count(loaded.start, 30).unwrap(),
        1_002_242_216_651_368
    );
    assert_eq!(session.stats(), stats);
}
