//! Unit tests for crossover classification

use coinbot::models::{CrossState, Recommendation};
use coinbot::signals::classify;

#[test]
fn test_upward_cross_is_buy() {
    let t = classify(1.0, 2.0, 2.0, 1.0);
    assert_eq!(t.before, CrossState::Low);
    assert_eq!(t.after, CrossState::High);
    assert_eq!(t.recommendation(), Recommendation::Buy);
    assert_eq!(t.to_string(), "low-high");
}

#[test]
fn test_downward_cross_is_sell() {
    let t = classify(2.0, 1.0, 1.0, 2.0);
    assert_eq!(t.recommendation(), Recommendation::Sell);
}

#[test]
fn test_no_cross_is_none() {
    assert_eq!(
        classify(2.0, 3.0, 1.0, 1.0).recommendation(),
        Recommendation::None
    );
    assert_eq!(
        classify(1.0, 1.0, 2.0, 3.0).recommendation(),
        Recommendation::None
    );
}

#[test]
fn test_equal_emas_count_as_low() {
    // zero difference before, positive after
    assert_eq!(
        classify(1.0, 2.0, 1.0, 1.0).recommendation(),
        Recommendation::Buy
    );
    // positive before, zero after
    assert_eq!(
        classify(2.0, 1.0, 1.0, 1.0).recommendation(),
        Recommendation::Sell
    );
}

#[test]
fn test_boundary_differences() {
    // (short - long) before, after
    let cases = [
        ((0.0, 0.0), Recommendation::None),
        ((-1.0, 1.0), Recommendation::Buy),
        ((1.0, -1.0), Recommendation::Sell),
        ((5.0, 3.0), Recommendation::None),
    ];
    for ((before, after), expected) in cases {
        let t = classify(10.0 + before, 10.0 + after, 10.0, 10.0);
        assert_eq!(t.recommendation(), expected, "{} -> {}", before, after);
    }
}
