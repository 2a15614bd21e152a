use upset_engine::domain::grid::GridAxis;
use upset_engine::domain::scale::Orientation;
use upset_engine::{
    CombinationRequest, GridBox, LinearScale, LogScale, NumericScale, NumericTick, SetList,
    TickOptions, generate_combinations, grid_layout,
};

/// Check ordering and label spacing of a tick list
fn assert_ticks_valid<S: NumericScale>(scale: &S, ticks: &[NumericTick], context: &str) {
    assert!(!ticks.is_empty(), "{}", context);
    assert!(
        ticks.windows(2).all(|w| w[0].value < w[1].value),
        "ticks not increasing: {}",
        context
    );

    let options = scale.tick_options();
    let labeled: Vec<(f64, f64)> = ticks
        .iter()
        .filter_map(|t| {
            let label = t.label.as_ref()?;
            Some((scale.map(t.value), options.label_extent(label)))
        })
        .collect();
    for w in labeled.windows(2) {
        let gap = (w[1].0 - w[0].0).abs();
        assert!(
            gap >= (w[0].1 + w[1].1) / 2.0 - 1e-9,
            "labels overlap: {}",
            context
        );
    }
}

#[test]
fn test_linear_ticks_properties() {
    for max in [1.0, 3.0, 7.0, 10.0, 42.0, 99.0, 100.0, 350.0, 1234.0, 98765.0] {
        for length in [40.0, 120.0, 300.0, 800.0] {
            for orientation in [Orientation::Horizontal, Orientation::Vertical] {
                let options = TickOptions::default().with_orientation(orientation);
                let scale = LinearScale::new(max, (length, 0.0), options);
                let context = format!("max {}, length {}, {:?}", max, length, orientation);

                assert!((scale.map(max) - 0.0).abs() < 1e-9, "{}", context);
                assert_ticks_valid(&scale, &scale.ticks(), &context);
            }
        }
    }
}

#[test]
fn test_log_ticks_properties() {
    for max in [2.0, 10.0, 150.0, 1000.0, 123456.0] {
        for length in [50.0, 200.0, 600.0] {
            let options = TickOptions::default().with_orientation(Orientation::Vertical);
            let scale = LogScale::new(max, (0.0, length), options);
            let context = format!("max {}, length {}", max, length);

            assert!((scale.map(max) - length).abs() < 1e-9, "{}", context);
            assert_ticks_valid(&scale, &scale.ticks(), &context);
        }
    }
}

#[test]
fn test_linear_scenario_ten_over_two_hundred() {
    let options = TickOptions::default()
        .with_orientation(Orientation::Vertical)
        .with_font_size(10.0);
    let scale = LinearScale::new(10.0, (0.0, 200.0), options);
    let values: Vec<f64> = scale.ticks().iter().map(|t| t.value).collect();
    assert_eq!(values, (0..=10).map(f64::from).collect::<Vec<_>>());
}

#[test]
fn test_grid_neighbors_differ_in_one_set() {
    for n in 0..=8 {
        let layout = grid_layout(n, GridBox::default()).unwrap();
        let mask_at = |col: usize, row: usize| layout.subset_of(col, row).unwrap();

        for row in 0..layout.rows {
            for col in 0..layout.cols {
                let here = mask_at(col, row);
                // wrap-around neighbors count as adjacent
                let right = mask_at((col + 1) % layout.cols, row);
                let below = mask_at(col, (row + 1) % layout.rows);
                if layout.cols > 1 {
                    assert_eq!((here ^ right).count_ones(), 1, "n {} at ({}, {})", n, col, row);
                }
                if layout.rows > 1 {
                    assert_eq!((here ^ below).count_ones(), 1, "n {} at ({}, {})", n, col, row);
                }
            }
        }
    }
}

#[test]
fn test_grid_one_set_apart_means_adjacent_up_to_four_sets() {
    for n in 1..=4 {
        let layout = grid_layout(n, GridBox::default()).unwrap();
        let torus_distance = |a: usize, b: usize, len: usize| {
            let d = a.abs_diff(b);
            d.min(len - d)
        };

        for mask in 0..(1u32 << n) {
            for bit in 0..n {
                let a = layout.cell_of_mask(mask).unwrap();
                let b = layout.cell_of_mask(mask ^ (1 << bit)).unwrap();
                let distance = torus_distance(a.col, b.col, layout.cols)
                    + torus_distance(a.row, b.row, layout.rows);
                assert_eq!(distance, 1, "n {} mask {:b} bit {}", n, mask, bit);
            }
        }
    }
}

#[test]
fn test_grid_places_generated_combinations() {
    let sets = SetList::from_sets(
        4,
        [
            ("A", upset_engine::domain::set::elem_ids(&[0, 1])),
            ("B", upset_engine::domain::set::elem_ids(&[1, 2])),
            ("C", upset_engine::domain::set::elem_ids(&[1, 3])),
        ],
    )
    .unwrap();
    let combinations =
        generate_combinations(&sets, &CombinationRequest::default().with_include_empty(true)).unwrap();
    let layout = grid_layout(sets.len(), GridBox::new(300.0, 200.0)).unwrap();

    let mut cells: Vec<(usize, usize)> = combinations
        .iter()
        .map(|c| {
            let cell = layout.place(c).unwrap();
            (cell.col, cell.row)
        })
        .collect();
    cells.sort();
    cells.dedup();
    assert_eq!(cells.len(), combinations.len());

    let spans = layout.labels(GridAxis::Rows);
    assert!(spans.iter().all(|s| s.set == 2));
    assert_eq!(spans.len(), 2);
}
