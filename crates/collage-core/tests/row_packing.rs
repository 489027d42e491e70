use collage_core::packer::{PackState, SizedImage, Verdict, evaluate, fill_rows, transition};
use collage_core::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn cfg(width: u32, row_height: u32) -> CollageConfig {
    CollageConfig::builder()
        .with_dimensions(width, row_height)
        .build()
}

fn row_keys(layout: &Layout<&'static str>) -> Vec<Vec<&'static str>> {
    layout.rows.iter().map(|r| r.items.clone()).collect()
}

#[test]
fn three_squares_soft_wrap_into_one_row() {
    let items = vec![("a", 100, 100), ("b", 100, 100), ("c", 100, 100)];
    let layout = pack_sizes(items, &cfg(250, 100)).expect("pack");

    assert_eq!(row_keys(&layout), vec![vec!["a", "b", "c"]]);
    assert_eq!(layout.attempts, 1);
    assert_eq!(layout.row_height, 100);
    let row = &layout.rows[0];
    assert_eq!(row.extent, 306);
    assert!((row.coefficient - 306.0 / 250.0).abs() < 1e-12);
}

#[test]
fn wrap_check_is_strictly_greater_than_width() {
    // Exactly reaching the width keeps the row open for one more image.
    let c = CollageConfig::builder()
        .with_dimensions(250, 100)
        .margin(0)
        .build();
    let layout = pack_sizes(vec![("a", 125, 100), ("b", 125, 100), ("c", 50, 100)], &c)
        .expect("pack");
    assert_eq!(row_keys(&layout), vec![vec!["a", "b", "c"]]);

    // One pixel more closes it, which orphans "c" and forces a smaller row height.
    let layout = pack_sizes(vec![("a", 126, 100), ("b", 126, 100), ("c", 50, 100)], &c)
        .expect("pack");
    assert_eq!(layout.attempts, 2);
    assert_eq!(layout.row_height, 90);
    assert_eq!(row_keys(&layout), vec![vec!["a", "b", "c"]]);
}

#[test]
fn single_image_is_accepted_immediately() {
    let layout = pack_sizes(vec![("only", 4000, 3000)], &cfg(800, 200)).expect("pack");
    assert_eq!(layout.rows.len(), 1);
    assert_eq!(layout.attempts, 1);
    assert_eq!(layout.row_height, 200);
}

#[test]
fn empty_input_is_an_error() {
    let result = pack_sizes(Vec::<(String, u32, u32)>::new(), &cfg(800, 200));
    assert!(matches!(result, Err(CollageError::EmptyInput)));

    let keys: Vec<String> = vec![];
    let result = pack(&keys, &MemorySource::new(), &cfg(800, 200));
    assert!(matches!(result, Err(CollageError::EmptyInput)));
}

#[test]
fn orphan_rows_are_eliminated() {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    for round in 0..50 {
        let n = rng.gen_range(2..30);
        let items: Vec<(usize, u32, u32)> = (0..n)
            .map(|i| (i, rng.gen_range(50..400), rng.gen_range(50..400)))
            .collect();
        let layout = pack_sizes(items, &cfg(1000, 200)).expect("pack");
        assert!(
            layout.rows.len() == 1 || layout.rows.iter().all(|r| r.len() >= 2),
            "round {round}: rows {:?}",
            layout.rows.iter().map(|r| r.len()).collect::<Vec<_>>()
        );
        assert!(!layout.has_orphans());
        assert!(layout.row_height <= 200 && layout.row_height >= 1);
    }
}

#[test]
fn order_is_preserved_and_failed_loads_are_dropped() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut source = MemorySource::new();
    let mut keys = Vec::new();
    let mut expected = Vec::new();
    for i in 0..40 {
        let key = format!("img_{i:02}");
        // every seventh reference has nothing behind it
        if i % 7 != 3 {
            let (w, h) = (rng.gen_range(20..120), rng.gen_range(20..120));
            source.insert(key.clone(), image::DynamicImage::new_rgb8(w, h));
            expected.push(key.clone());
        }
        keys.push(key);
    }
    let layout = pack(&keys, &source, &cfg(600, 80)).expect("pack");
    let placed: Vec<String> = layout.keys().cloned().collect();
    assert_eq!(placed, expected);
    assert_eq!(layout.skipped, vec!["img_03", "img_10", "img_17", "img_24", "img_31", "img_38"]);
}

#[test]
fn row_extent_is_packed_widths_plus_margins() {
    let c = cfg(500, 120);
    let sizes = vec![(0, 640, 480), (1, 480, 640), (2, 1920, 1080), (3, 300, 300), (4, 1200, 800), (5, 90, 400)];
    let layout = pack_sizes(sizes.clone(), &c).expect("pack");
    for row in &layout.rows {
        let sum: u32 = row
            .items
            .iter()
            .map(|k| {
                let (_, w, h) = sizes[*k];
                SizedImage::new(*k, w, h).packed_width(c.width, layout.row_height) + c.margin
            })
            .sum();
        assert_eq!(row.extent, sum);
        assert!((row.coefficient * c.width as f64 - sum as f64).abs() < 1e-6);
    }
}

#[test]
fn fill_rows_closes_trailing_row_even_when_empty() {
    let rows = fill_rows::<&str>(&[], 100, 50, 2);
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_empty());
    assert_eq!(rows[0].coefficient, 0.0);
}

#[test]
fn state_machine_steps_through_packing_and_evaluation() {
    let c = cfg(250, 100);
    let items = vec![
        SizedImage::new("a", 250, 100),
        SizedImage::new("b", 250, 100),
        SizedImage::new("c", 100, 100),
    ];

    let s = PackState::start(&c);
    assert!(matches!(s, PackState::Packing { row_height: 100, attempt: 1 }));

    let s = transition(s, &items, &[], &c);
    let PackState::Evaluating { ref rows, .. } = s else {
        panic!("expected Evaluating");
    };
    assert_eq!(evaluate(rows), Verdict::Orphaned);

    let s = transition(s, &items, &[], &c);
    assert!(matches!(s, PackState::Packing { row_height: 90, attempt: 2 }));

    // Run to convergence; Converged is a fixpoint.
    let mut s = s;
    while !s.is_converged() {
        s = transition(s, &items, &[], &c);
    }
    let again = transition(s.clone(), &items, &[], &c);
    let (PackState::Converged(a), PackState::Converged(b)) = (s, again) else {
        panic!("expected Converged");
    };
    assert_eq!(a.rows, b.rows);
    assert!(!a.has_orphans());
}

#[test]
fn exhausted_row_height_still_terminates() {
    // Each strip fills the whole width at any row height >= 3 px, so the second one
    // is always orphaned; the search gives up before the height reaches zero.
    let layout = pack_sizes(vec![("a", 1000, 10), ("b", 1000, 10)], &cfg(250, 100)).expect("pack");
    assert_eq!(layout.rows.len(), 2);
    assert_eq!(layout.row_height, 10);
    assert_eq!(layout.attempts, 10);
}

#[test]
fn verdicts() {
    let one = vec![Row::close(10, 100, vec!["a"])];
    assert_eq!(evaluate(&one), Verdict::SingleRow);
    let balanced = vec![Row::close(110, 100, vec!["a", "b"]), Row::close(60, 100, vec!["c", "d"])];
    assert_eq!(evaluate(&balanced), Verdict::Balanced);
    let orphaned = vec![Row::close(110, 100, vec!["a", "b"]), Row::close(60, 100, vec!["c"])];
    assert_eq!(evaluate(&orphaned), Verdict::Orphaned);
}
