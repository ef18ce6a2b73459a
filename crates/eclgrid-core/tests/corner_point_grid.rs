use eclgrid_core::grid::InitPath;
use eclgrid_core::{Deck, EclipseGrid, GridError};
use tempfile::TempDir;

/// 2x2x1 grid over the unit square, one metre thick.
fn unit_square_deck(actnum: &str) -> Deck {
    let mut coord = String::new();
    for j in 0..3 {
        for i in 0..3 {
            let (x, y) = (f64::from(i) * 0.5, f64::from(j) * 0.5);
            coord.push_str(&format!(" {x} {y} 0 {x} {y} 1\n"));
        }
    }
    let text = format!(
        "RUNSPEC\nSPECGRID\n 2 2 1 1 F /\nGRID\nMAPUNITS\n 'FEET' /\nMAPAXES\n 0 1 0 0 1 0 /\n\
         COORD\n{coord} /\nZCORN\n 16*0 16*1 /\nACTNUM\n {actnum} /\n"
    );
    Deck::parse(&text).expect("deck should parse")
}

#[test]
fn inactive_cell_has_no_active_index() {
    let grid = EclipseGrid::from_deck(&unit_square_deck("1 1 0 1")).expect("grid");

    assert_eq!(grid.init_path(), InitPath::CornerPoint);
    assert_eq!(grid.num_active(), 3);
    assert!(matches!(
        grid.active_index(2),
        Err(GridError::InactiveCell(2))
    ));
    assert_eq!(grid.global_index(2).expect("third active cell"), 3);
    assert!((grid.cell_volume(0).expect("volume") - 0.25).abs() < 1e-12);
}

#[test]
fn active_and_global_indices_are_inverse() {
    let grid = EclipseGrid::from_deck(&unit_square_deck("0 1 0 1")).expect("grid");

    for active in 0..grid.num_active() {
        let global = grid.global_index(active).expect("active index in range");
        assert_eq!(grid.active_index(global).expect("cell is active"), active);
    }
    for global in 0..grid.cartesian_size() {
        let active = grid.cell_active(global).expect("global index in range");
        assert_eq!(grid.active_index(global).is_ok(), active);
    }

    let compressed = grid
        .compressed_vector(&[1.0, 2.0, 3.0, 4.0])
        .expect("global length");
    assert_eq!(compressed, vec![2.0, 4.0]);
    assert_eq!(
        grid.compressed_vector(&compressed).expect("already compressed"),
        compressed
    );
}

#[test]
fn egrid_round_trip_keeps_geometry_and_activity() {
    let temp = TempDir::new().expect("tempdir should be created");
    let path = temp.path().join("UNIT.EGRID");
    let grid = EclipseGrid::from_deck(&unit_square_deck("1 1 0 1")).expect("grid");
    grid.save_egrid(&path).expect("EGRID should be written");

    let loaded = EclipseGrid::from_egrid(&path).expect("EGRID should load");
    assert_eq!(loaded.init_path(), InitPath::Egrid);
    assert_eq!(loaded.dims(), grid.dims());
    assert_eq!(loaded.coord(), grid.coord());
    assert_eq!(loaded.zcorn(), grid.zcorn());
    assert_eq!(loaded.actnum(), grid.actnum());
    assert_eq!(loaded.num_active(), 3);

    let axes = loaded.map_axes().expect("MAPAXES should survive");
    assert_eq!(axes.input(), [0.0, 1.0, 0.0, 0.0, 1.0, 0.0]);
    assert_eq!(
        axes.map_units().map(|unit| unit.as_str()),
        Some("FEET")
    );
}

#[test]
fn missing_egrid_is_an_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let error = EclipseGrid::from_egrid(temp.path().join("NONE.EGRID")).expect_err("no file");
    assert!(matches!(error, GridError::EclFile(_)));
}
