//! Owning context for one parsed deck: grid, field properties, saturation
//! tables and the activity changes derived from pore volumes and PINCH.

use crate::config::ProcessingConfig;
use crate::connections::AssembledConnections;
use crate::deck::{Deck, DeckError, DeckItem, DeckKeyword};
use crate::domain::errors::EclResult;
use crate::fieldprops::{FieldPropsError, FieldPropsManager};
use crate::grid::{EclipseGrid, MinpvMode, PinchSettings};
use crate::tables::{ColumnSchema, SimpleTable};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deactivation {
    ZeroPoreVolume,
    MinPoreVolume,
    Pinched,
}

/// Cells switched off while building the state, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeactivationSummary {
    pub zero_pore_volume: usize,
    pub min_pore_volume: usize,
    pub pinched: usize,
}

impl DeactivationSummary {
    pub fn total(&self) -> usize {
        self.zero_pore_volume + self.min_pore_volume + self.pinched
    }
}

#[derive(Debug, Clone)]
pub struct EclipseState {
    grid: EclipseGrid,
    field_props: FieldPropsManager,
    pinch_connections: AssembledConnections,
    deactivated: DeactivationSummary,
    swof: Vec<SimpleTable>,
    sgof: Vec<SimpleTable>,
}

impl EclipseState {
    pub fn new(deck: &Deck) -> EclResult<Self> {
        Self::with_config(deck, &ProcessingConfig::default())
    }

    pub fn with_config(deck: &Deck, config: &ProcessingConfig) -> EclResult<Self> {
        let mut grid = EclipseGrid::from_deck_with(deck, config.zcorn_fixup, config.zcorn_epsilon)?;
        let mut field_props = FieldPropsManager::new(deck, &grid)?;

        let mut minpv = grid.minpv().clone();
        if let Some(limit) = config.minpv_override {
            minpv.override_limit(limit);
        }

        let size = grid.cartesian_size();
        let porv = match field_props.porv(true) {
            Ok(porv) => Some(porv),
            Err(FieldPropsError::NotFound(_)) => {
                debug!("no porosity input, pore volume checks skipped");
                None
            }
            Err(error) => return Err(error.into()),
        };

        let mut reasons: Vec<Option<Deactivation>> = vec![None; size];
        for (global, reason) in reasons.iter_mut().enumerate() {
            if !grid.cell_active(global)? {
                continue;
            }
            if let Some(porv) = &porv {
                if config.deactivate_zero_pore_volume && porv[global] == 0.0 {
                    *reason = Some(Deactivation::ZeroPoreVolume);
                    continue;
                }
                if minpv.mode() == MinpvMode::Standard && porv[global] < minpv.values()[global] {
                    *reason = Some(Deactivation::MinPoreVolume);
                    continue;
                }
            }
            if let Some(pinch) = grid.pinch().filter(|_| config.deactivate_pinched_cells) {
                if grid.cell_thickness(global)? < pinch.threshold_thickness {
                    *reason = Some(Deactivation::Pinched);
                }
            }
        }

        let mut deactivated = DeactivationSummary::default();
        for reason in reasons.iter().flatten() {
            match reason {
                Deactivation::ZeroPoreVolume => deactivated.zero_pore_volume += 1,
                Deactivation::MinPoreVolume => deactivated.min_pore_volume += 1,
                Deactivation::Pinched => deactivated.pinched += 1,
            }
        }

        let input_actnum = grid.actnum().to_vec();
        if deactivated.total() > 0 {
            warn!(
                zero_pore_volume = deactivated.zero_pore_volume,
                min_pore_volume = deactivated.min_pore_volume,
                pinched = deactivated.pinched,
                "deactivated cells"
            );
            let actnum: Vec<i32> = input_actnum
                .iter()
                .zip(&reasons)
                .map(|(value, reason)| if reason.is_some() { 0 } else { *value })
                .collect();
            grid.reset_actnum(Some(&actnum))?;
            let matrix: Vec<i32> = (0..size)
                .map(|global| i32::from(grid.active_index(global).is_ok()))
                .collect();
            field_props.reset_actnum(&matrix)?;
        }

        let mut pinch_connections = AssembledConnections::new();
        if let Some(pinch) = grid.pinch() {
            add_pinch_connections(&grid, pinch, &input_actnum, &reasons, &mut pinch_connections)?;
        }
        pinch_connections.compress(grid.num_active())?;

        let swof = saturation_tables(deck, "SWOF", SimpleTable::swof_schema)?;
        let sgof = saturation_tables(deck, "SGOF", SimpleTable::sgof_schema)?;

        info!(
            active = grid.num_active(),
            pinch_connections = pinch_connections.num_connections(),
            swof = swof.len(),
            sgof = sgof.len(),
            "eclipse state ready"
        );
        Ok(Self {
            grid,
            field_props,
            pinch_connections,
            deactivated,
            swof,
            sgof,
        })
    }

    pub fn grid(&self) -> &EclipseGrid {
        &self.grid
    }

    pub fn field_props(&self) -> &FieldPropsManager {
        &self.field_props
    }

    pub fn field_props_mut(&mut self) -> &mut FieldPropsManager {
        &mut self.field_props
    }

    /// Vertical connections between active cells across pinched-out layers,
    /// in active indices.
    pub fn pinch_connections(&self) -> &AssembledConnections {
        &self.pinch_connections
    }

    pub fn deactivated(&self) -> DeactivationSummary {
        self.deactivated
    }

    pub fn swof_tables(&self) -> &[SimpleTable] {
        &self.swof
    }

    pub fn sgof_tables(&self) -> &[SimpleTable] {
        &self.sgof
    }
}

/// Connects vertically separated active cells when every cell between
/// them was removed by a thickness or pore volume limit. Cells inactive in
/// the input only bridge in GAP mode.
fn add_pinch_connections(
    grid: &EclipseGrid,
    pinch: &PinchSettings,
    input_actnum: &[i32],
    reasons: &[Option<Deactivation>],
    connections: &mut AssembledConnections,
) -> EclResult<()> {
    let dims = grid.dims();
    for j in 0..dims.ny() {
        for i in 0..dims.nx() {
            let mut above: Option<usize> = None;
            let mut gap_cells = 0;
            let mut gap_thickness = 0.0;
            let mut bridgeable = true;
            for k in 0..dims.nz() {
                let global = dims.global_index(i, j, k)?;
                if let Ok(active) = grid.active_index(global) {
                    if let Some(upper) = above.filter(|_| gap_cells > 0 && bridgeable) {
                        if gap_thickness <= pinch.max_empty_gap {
                            connections.add_connection(upper, active)?;
                        }
                    }
                    above = Some(active);
                    gap_cells = 0;
                    gap_thickness = 0.0;
                    bridgeable = true;
                    continue;
                }
                gap_cells += 1;
                gap_thickness += grid.cell_thickness(global)?;
                bridgeable &= match reasons[global] {
                    Some(Deactivation::Pinched | Deactivation::MinPoreVolume) => true,
                    Some(Deactivation::ZeroPoreVolume) => pinch.bridges_gaps(),
                    None => input_actnum[global] <= 0 && pinch.bridges_gaps(),
                };
            }
        }
    }
    Ok(())
}

fn saturation_tables(
    deck: &Deck,
    name: &str,
    schema: fn() -> Vec<ColumnSchema>,
) -> EclResult<Vec<SimpleTable>> {
    let Some(keyword) = deck.get_keyword(name) else {
        return Ok(Vec::new());
    };
    let mut tables = Vec::with_capacity(keyword.records().len());
    for record in keyword.records() {
        let values = table_values(keyword, record.items())?;
        tables.push(SimpleTable::from_flat(schema(), &values)?);
    }
    Ok(tables)
}

fn table_values(keyword: &DeckKeyword, items: &[DeckItem]) -> Result<Vec<Option<f64>>, DeckError> {
    items
        .iter()
        .enumerate()
        .map(|(index, item)| match item {
            DeckItem::Default => Ok(None),
            other => other.as_f64().map(Some).ok_or_else(|| DeckError::InvalidItem {
                keyword: keyword.name().to_string(),
                index,
                expected: "a number",
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::EclipseState;
    use crate::config::ProcessingConfig;
    use crate::deck::Deck;

    fn column_deck(extra: &str) -> Deck {
        let text = format!(
            "RUNSPEC\nDIMENS\n 1 1 4 /\nGRID\nDXV\n 10 /\nDYV\n 10 /\nDZV\n 1 0.0001 0.0001 1 /\n\
             DEPTHZ\n 4*100 /\nPORO\n 0.2 0.2 0.2 0.2 /\n{extra}"
        );
        Deck::parse(&text).expect("deck should parse")
    }

    #[test]
    fn thin_layers_are_pinched_out_and_bridged() {
        let deck = column_deck("PINCH\n 0.001 /\n");
        let state = EclipseState::new(&deck).expect("state should build");

        assert_eq!(state.grid().num_active(), 2);
        assert_eq!(state.deactivated().pinched, 2);
        let connections = state.pinch_connections();
        assert_eq!(connections.start_pointers(), &[0, 1, 1]);
        assert_eq!(connections.neighbourhood(), &[1]);
        assert_eq!(state.field_props().active_size(), 2);
    }

    #[test]
    fn small_pore_volumes_are_removed() {
        let deck = column_deck("MINPV\n 1.0 /\n");
        let state = EclipseState::new(&deck).expect("state should build");
        assert_eq!(state.deactivated().min_pore_volume, 2);
        assert_eq!(state.grid().num_active(), 2);
        assert_eq!(state.pinch_connections().num_connections(), 0);

        let config = ProcessingConfig {
            minpv_override: Some(0.0),
            ..ProcessingConfig::default()
        };
        let state = EclipseState::with_config(&deck, &config).expect("state should build");
        assert_eq!(state.deactivated().total(), 0);
        assert_eq!(state.grid().num_active(), 4);
    }

    #[test]
    fn zero_porosity_deactivates_unless_disabled() {
        let text = "RUNSPEC\nDIMENS\n 2 1 1 /\nGRID\nDX\n 2*1 /\nDY\n 2*1 /\nDZ\n 2*1 /\n\
                    TOPS\n 2*0 /\nPORO\n 0.3 0 /\n";
        let deck = Deck::parse(text).expect("deck should parse");
        let mut state = EclipseState::new(&deck).expect("state should build");
        assert_eq!(state.deactivated().zero_pore_volume, 1);
        assert_eq!(
            state.field_props_mut().get::<f64>("PORO").expect("compressed"),
            &[0.3]
        );

        let config = ProcessingConfig {
            deactivate_zero_pore_volume: false,
            ..ProcessingConfig::default()
        };
        let state = EclipseState::with_config(&deck, &config).expect("state should build");
        assert_eq!(state.grid().num_active(), 2);
    }

    #[test]
    fn saturation_tables_resolve_defaults() {
        let text = "RUNSPEC\nDIMENS\n 1 1 1 /\nTABDIMS\n 1 /\nGRID\nDXV\n 1 /\nDYV\n 1 /\n\
                    DZV\n 1 /\nDEPTHZ\n 4*0 /\nPROPS\nSWOF\n 0.2 0 1 0\n 0.6 1* 1* 0\n 1.0 1 0 0 /\n";
        let deck = Deck::parse(text).expect("deck should parse");
        let state = EclipseState::new(&deck).expect("state should build");
        let swof = &state.swof_tables()[0];
        assert_eq!(swof.num_rows(), 3);
        let krw = swof.evaluate("KRW", 0.6).expect("interpolated");
        assert!((krw - 0.5).abs() < 1e-12);
        assert!(state.sgof_tables().is_empty());
    }
}
