use rstest::rstest;
use treeselect::evaluator::NthFormula;

#[rstest]
#[case("odd", 2, 1)]
#[case("EVEN", 2, 0)]
#[case("2n+1", 2, 1)]
#[case("2n + 1", 2, 1)]
#[case("-n+3", -1, 3)]
#[case("+n", 1, 0)]
#[case("n", 1, 0)]
#[case("3n-2", 3, -2)]
#[case("-2n", -2, 0)]
#[case("5", 0, 5)]
#[case("-1", 0, -1)]
#[case("+4", 0, 4)]
fn parses(#[case] raw: &str, #[case] a: i32, #[case] b: i32) {
    assert_eq!(NthFormula::parse(raw), Some(NthFormula::new(a, b)));
}

#[rstest]
#[case("")]
#[case("foo")]
#[case("2n+")]
#[case("n2")]
#[case("2x+1")]
#[case("--n")]
#[case("1.5")]
fn rejects(#[case] raw: &str) {
    assert_eq!(NthFormula::parse(raw), None);
}

#[rstest]
#[case(NthFormula::new(2, 1), &[1, 3, 5])]
#[case(NthFormula::new(2, 0), &[2, 4])]
#[case(NthFormula::new(-1, 2), &[1, 2])]
#[case(NthFormula::new(0, 3), &[3])]
#[case(NthFormula::new(3, -2), &[1, 4])]
#[case(NthFormula::new(1, 4), &[4, 5])]
#[case(NthFormula::new(0, 0), &[])]
#[case(NthFormula::new(-2, 0), &[])]
fn matches_positions_one_to_five(#[case] formula: NthFormula, #[case] expected: &[usize]) {
    let hits: Vec<usize> = (1..=5).filter(|&p| formula.matches(p)).collect();
    assert_eq!(hits, expected);
}

#[rstest]
#[case(NthFormula::new(0, 3), "3")]
#[case(NthFormula::new(1, 0), "n")]
#[case(NthFormula::new(-1, 3), "-n+3")]
#[case(NthFormula::new(2, -1), "2n-1")]
#[case(NthFormula::FIRST, "1")]
fn renders(#[case] formula: NthFormula, #[case] expected: &str) {
    assert_eq!(formula.to_string(), expected);
}
