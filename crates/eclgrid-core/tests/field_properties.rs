use eclgrid_core::{Deck, EclipseGrid, EclipseState, FieldPropsError, FieldPropsManager};

fn deck(body: &str) -> Deck {
    let text = format!(
        "RUNSPEC\nDIMENS\n 2 2 2 /\nGRID\nDXV\n 2*10 /\nDYV\n 2*10 /\nDZV\n 2*1 /\n\
         DEPTHZ\n 9*2000 /\n{body}"
    );
    Deck::parse(&text).expect("deck should parse")
}

fn manager(deck: &Deck) -> FieldPropsManager {
    let grid = EclipseGrid::from_deck(deck).expect("grid");
    FieldPropsManager::new(deck, &grid).expect("field properties")
}

#[test]
fn region_defaults_are_created_on_first_access() {
    let mut props = manager(&deck(""));

    assert!(!props.has::<i32>("SATNUM"));
    let satnum = props.get::<i32>("SATNUM").expect("SATNUM has a default");
    assert_eq!(satnum, &[1; 8]);
    assert!(props.has::<i32>("SATNUM"));
    assert_eq!(props.defaulted::<i32>("SATNUM").expect("stored"), vec![true; 8]);
}

#[test]
fn inactive_cells_are_not_stored() {
    let mut props = manager(&deck(
        "ACTNUM\n 1 1 1 0 1 1 1 1 /\nPORO\n 0.1 0.2 0.3 0.4 0.5 0.6 0.7 0.8 /\n",
    ));

    assert_eq!(props.active_size(), 7);
    assert_eq!(
        props.get::<f64>("PORO").expect("PORO"),
        &[0.1, 0.2, 0.3, 0.5, 0.6, 0.7, 0.8]
    );
    let global = props.get_global::<f64>("PORO").expect("PORO");
    assert_eq!(global.len(), 8);
    assert_eq!(global[3], 0.0);
}

#[test]
fn edit_operations_follow_deck_order() {
    let mut props = manager(&deck(
        "PERMX\n 8*100 /\nEQUALS\n PERMY 50 /\n PERMX 10 1 1 1 1 1 2 /\n/\n\
         MULTIPLY\n PERMX 2 /\n/\nREGIONS\nFLUXNUM\n 4*1 4*2 /\nEQUALREG\n PERMZ 5 2 F /\n/\n",
    ));

    let permx = props.get::<f64>("PERMX").expect("PERMX");
    assert_eq!(permx, &[20.0, 200.0, 200.0, 200.0, 20.0, 200.0, 200.0, 200.0]);
    assert_eq!(props.get::<f64>("PERMY").expect("PERMY"), &[50.0; 8]);

    let error = props.try_get::<f64>("PERMZ").expect_err("only region 2 is set");
    assert!(matches!(error, FieldPropsError::Incomplete(_)));
    let copy = props.get_copy::<f64>("PERMX").expect("copy");
    assert_eq!(copy.len(), 8);
}

#[test]
fn state_removes_zero_pore_volume_cells_everywhere() {
    let deck = deck("PORO\n 0.2 0.2 0.2 0 0.2 0.2 0.2 0.2 /\nREGIONS\nSATNUM\n 8*3 /\n");
    let mut state = EclipseState::new(&deck).expect("state");

    assert_eq!(state.deactivated().zero_pore_volume, 1);
    assert_eq!(state.grid().num_active(), 7);
    let props = state.field_props_mut();
    assert_eq!(props.active_size(), 7);
    assert_eq!(props.get::<i32>("SATNUM").expect("SATNUM"), &[3; 7]);
    let porv = props.porv(false).expect("pore volume");
    assert!(porv.iter().all(|value| (value - 20.0).abs() < 1e-9));
}

#[test]
fn pinched_coarse_member_hands_its_group_to_the_next_member() {
    let deck = Deck::parse(
        "RUNSPEC\nDIMENS\n 2 1 2 /\nGRID\nDX\n 4*10 /\nDY\n 4*10 /\nDZ\n 0.00001 3*1 /\n\
         TOPS\n 2*1000 /\nCORSNUM\n 1 1 0 0 /\nPINCH\n 0.001 /\nPORO\n 0.2 0.2 0.3 0.4 /\n",
    )
    .expect("deck should parse");
    let mut state = EclipseState::new(&deck).expect("state");

    assert_eq!(state.deactivated().pinched, 1);
    assert_eq!(state.grid().num_active(), 3);
    assert_eq!(state.grid().global_index(0).expect("group index"), 1);
    let props = state.field_props_mut();
    assert_eq!(props.active_size(), 3);
    assert_eq!(props.get::<f64>("PORO").expect("PORO"), &[0.2, 0.3, 0.4]);
    let global = props.get_global::<f64>("PORO").expect("PORO");
    assert_eq!(global, vec![0.0, 0.2, 0.3, 0.4]);
}
