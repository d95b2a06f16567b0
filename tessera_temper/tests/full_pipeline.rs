// End-to-end integration tests for the tuning pipeline.
//
// Each test follows the real data flow: literal AST nodes become exact
// quantities, quantities become domain-tagged intervals, intervals are
// combined by interval arithmetic, collected into vals, folded into a
// temperament, and the temperament retunes or respells intervals handed
// back to it. Numeric expectations are standard results from the regular
// temperament literature (meantone throughout).

use tessera_number::fraction::Fraction;
use tessera_number::monzo::TimeMonzo;
use tessera_number::quantity::TimeQuantity;
use tessera_number::real::TimeReal;

use tessera_temper::basis::{ValBasis, Weighting};
use tessera_temper::context::RootContext;
use tessera_temper::interval::{Domain, Interval, Inverse};
use tessera_temper::literal::IntervalLiteral;
use tessera_temper::temperament::{Temperament, TemperamentOptions};
use tessera_temper::val::Val;

fn fraction(n: i64, d: i64) -> Fraction {
    Fraction::new(n, d).unwrap()
}

fn log_interval(n: i64, d: i64) -> Interval {
    Interval::new(
        TimeQuantity::from_fraction(&fraction(n, d), 3),
        Domain::Logarithmic,
    )
}

fn five_limit() -> ValBasis {
    ValBasis::standard(3).unwrap()
}

fn meantone() -> Temperament {
    let twelve = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
    let nineteen = Val::from_array(&[19, 30, 44], five_limit()).unwrap();
    Temperament::from_vals(&[twelve, nineteen], TemperamentOptions::default()).unwrap()
}

// ---------------------------------------------------------------------------
// Literal to quantity to interval
// ---------------------------------------------------------------------------

/// A fraction literal becomes an exact monzo, survives interval
/// arithmetic, and renders back to the same text.
#[test]
fn literal_to_interval_and_back() {
    let context = RootContext::new(3);
    let literal = IntervalLiteral::Fraction {
        numerator: "3".to_string(),
        denominator: "2".to_string(),
    };
    let quantity = literal.to_quantity(context.number_of_components).unwrap();
    let fifth = Interval::new(quantity, Domain::Logarithmic);

    let fourth = log_interval(4, 3);
    let octave = fifth.add(&fourth).unwrap();
    let rendered = octave.realize_node(&context).unwrap();
    assert_eq!(rendered.to_string(), "2");
}

/// Stacking four meantone fifths and reducing lands on the major third
/// region: 81/64 exactly in just intonation.
#[test]
fn stacked_fifths_reduce_to_a_third() {
    let fifth = log_interval(3, 2);
    let four = Interval::new(TimeQuantity::from_fraction(&fraction(4, 1), 3), Domain::Linear);
    let stacked = fifth.mul(&four).unwrap();
    let octave = log_interval(2, 1);
    let third = stacked.reduce(&octave).unwrap();
    assert_eq!(
        third.value().to_fraction().unwrap(),
        fraction(81, 64)
    );
}

/// The logarithmic inverse of 12 equal steps of the octave is the 12-note
/// octave ruler.
#[test]
fn equal_step_inverse_is_a_val() {
    let literal = IntervalLiteral::Nedji {
        steps: 1,
        divisions: 12,
        equave_numerator: None,
        equave_denominator: None,
    };
    let step = Interval::new(literal.to_quantity(3).unwrap(), Domain::Logarithmic);
    let Inverse::Val(val) = step.inverse().unwrap() else {
        panic!("expected a val");
    };
    assert_eq!(val.divisions(), Fraction::from_integer(12));
}

// ---------------------------------------------------------------------------
// Vals and temperaments
// ---------------------------------------------------------------------------

/// Combining the 12- and 19-tone vals gives meantone, whose supporting
/// equal division is their 31-tone sum.
#[test]
fn meantone_from_two_vals() {
    let temperament = meantone();
    assert_eq!(temperament.rank(), 2);
    let tune = temperament.tune().unwrap();
    assert_eq!(
        tune.sval(),
        vec![
            Fraction::from_integer(31),
            Fraction::from_integer(49),
            Fraction::from_integer(72)
        ]
    );
}

/// The comma route produces the same canonical mapping and knows its own
/// comma: 81/80 is tempered to zero cents.
#[test]
fn meantone_from_its_comma() {
    let comma = TimeMonzo::from_fraction(&fraction(81, 80), 3);
    let from_commas = Temperament::from_commas(
        &[comma.clone()],
        Some(five_limit()),
        false,
        TemperamentOptions::default(),
    )
    .unwrap();
    assert_eq!(from_commas.mapping(), meantone().mapping());

    let commas = from_commas.comma_basis().unwrap();
    assert_eq!(commas.size(), 1);
    assert!(commas.value()[0].equals(&comma.with_components(3)));

    let tempered = from_commas.temper(&TimeQuantity::Monzo(comma)).unwrap();
    assert!(tempered.total_cents().abs() < 1e-6);
    assert!((from_commas.error_te() - 1.58).abs() < 0.05);
}

/// Applying a temperament to a scale retunes every exact interval to its
/// optimal cents while leaving inexact values alone.
#[test]
fn tempering_a_scale() {
    let temperament = meantone();
    let scale = vec![
        log_interval(9, 8),
        log_interval(5, 4),
        log_interval(3, 2),
        log_interval(2, 1),
        Interval::new(
            TimeQuantity::Real(TimeReal::from_cents(950.0)),
            Domain::Logarithmic,
        ),
    ];
    let tempered = temperament.temper_all(&scale).unwrap();

    let tuning = temperament.subgroup_mapping();
    let fifth = tuning[1] - tuning[0];
    assert!((tempered[2].value().total_cents() - fifth).abs() < 1e-9);
    assert!((tempered[3].value().total_cents() - tuning[0]).abs() < 1e-9);
    // The real passenger is untouched.
    assert!((tempered[4].value().total_cents() - 950.0).abs() < 1e-12);

    // In meantone four fifths less two octaves make the major third.
    let third = tempered[1].value().total_cents();
    assert!((third - (4.0 * fifth - 2.0 * tuning[0])).abs() < 1e-6);
}

/// Respelling rewrites wolf intervals as their simple meantone
/// equivalents without changing their tempered size.
#[test]
fn respelling_preserves_tempered_size() {
    let temperament = meantone();
    let wolf = TimeMonzo::from_fraction(&fraction(8192, 6561), 3);
    let simple = temperament.respell(&wolf).unwrap();
    assert_eq!(simple.to_fraction().unwrap(), fraction(32, 25));

    let before = temperament.temper(&TimeQuantity::Monzo(wolf)).unwrap();
    let after = temperament.temper(&TimeQuantity::Monzo(simple)).unwrap();
    assert!((before.total_cents() - after.total_cents()).abs() < 1e-6);
}

/// A basis can re-express intervals and foreign vals in its own
/// coordinates.
#[test]
fn rebasing_through_a_subgroup() {
    let basis = ValBasis::new(vec![
        TimeMonzo::from_i64(2, 3),
        TimeMonzo::from_i64(3, 3),
        TimeMonzo::from_i64(5, 3),
    ])
    .unwrap();
    let comma = Interval::new(
        TimeQuantity::from_fraction(&fraction(81, 80), 3),
        Domain::Logarithmic,
    );
    let rebased = basis.rebase_interval(&comma).unwrap();
    let node = rebased.node().unwrap();
    assert_eq!(node.to_string(), "[-4 4 -1>@2.3.5");

    let twelve = Val::from_array(&[12, 19, 28], five_limit()).unwrap();
    let rebased_val = basis.rebase_val(&twelve).unwrap();
    assert_eq!(rebased_val.divisions(), Fraction::from_integer(12));
}

/// Tenney-reducing a redundant comma basis keeps it spanning the same
/// lattice, and a second reduction changes nothing.
#[test]
fn lattice_reduction_is_stable() {
    let clumsy = ValBasis::new(vec![
        TimeMonzo::from_fraction(&fraction(81, 80), 3),
        TimeMonzo::from_fraction(&fraction(6561, 6250), 3),
    ])
    .unwrap();
    let reduced = clumsy.lll(Weighting::Tenney).unwrap();
    let again = reduced.lll(Weighting::Tenney).unwrap();
    for (a, b) in reduced.value().iter().zip(again.value().iter()) {
        assert!(a.equals(b) || a.equals(&b.recip().unwrap()));
    }
    // The original commas are still inside the reduced lattice.
    for generator in clumsy.value() {
        assert!(reduced.to_subgroup_monzo(generator).is_ok());
    }
}

// ---------------------------------------------------------------------------
// Degenerate and asymmetric paths
// ---------------------------------------------------------------------------

/// Reducing by a unison-equivalent equave: the exact path reports an
/// error, the inexact path answers NaN.
#[test]
fn degenerate_reduction_asymmetry() {
    let octave = TimeQuantity::Monzo(TimeMonzo::from_i64(2, 3));
    let unison = TimeQuantity::Monzo(TimeMonzo::one(3));
    assert!(octave.reduce(&unison).is_err());

    let real_octave = TimeQuantity::Real(TimeReal::scalar(2.0));
    let real_unison = TimeQuantity::Real(TimeReal::scalar(1.0));
    let reduced = real_octave.reduce(&real_unison).unwrap();
    assert!(reduced.value().is_nan());
}

// ---------------------------------------------------------------------------
// Interchange
// ---------------------------------------------------------------------------

/// A whole interval, cached spelling included, survives the JSON wire.
#[test]
fn interval_json_interchange() {
    let mut fifth = Interval::with_node(
        TimeQuantity::from_fraction(&fraction(3, 2), 3),
        Domain::Logarithmic,
        IntervalLiteral::from_fraction(&fraction(3, 2)),
    );
    fifth.set_label("P5");
    fifth.track(3);

    let json = serde_json::to_string(&fifth).unwrap();
    let back: Interval = serde_json::from_str(&json).unwrap();
    assert!(back.strict_equals(&fifth));
    assert_eq!(back.label(), "P5");
    assert!(back.tracking_ids().contains(&3));
    assert_eq!(back.node().unwrap().to_string(), "3/2");
}

/// Vals and bases round-trip as tagged objects.
#[test]
fn val_and_basis_json_interchange() {
    let val = Val::from_array(&[31, 49, 72], five_limit()).unwrap();
    let json = serde_json::to_string(&val).unwrap();
    assert!(json.contains("\"type\":\"Val\""));
    let back: Val = serde_json::from_str(&json).unwrap();
    assert!(back.strict_equals(&val));
}
