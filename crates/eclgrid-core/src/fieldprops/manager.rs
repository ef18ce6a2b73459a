use super::FieldPropsError;
use super::box_region::{CellIndex, GridBox};
use super::field_data::{FieldData, FieldValue, ValueStatus};
use super::keywords::{
    KeywordInfo, TRAN_KEYWORDS, double_keyword_info, int_keyword_info, is_double_keyword,
    is_int_keyword, is_tran_keyword, region_keyword_from_code,
};
use super::operations::ScalarOperation;
use super::tran::{self, TranCalculator};
use crate::deck::{Deck, DeckKeyword, DeckRecord, Section};
use crate::grid::{EclipseGrid, GridDims};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info};

const PROPERTY_SECTIONS: [Section; 5] = [
    Section::Grid,
    Section::Edit,
    Section::Regions,
    Section::Props,
    Section::Solution,
];

mod sealed {
    pub trait Sealed {}
    impl Sealed for f64 {}
    impl Sealed for i32 {}
}

/// Element types stored by [`FieldPropsManager`]: `f64` and `i32`.
pub trait FieldType: FieldValue + sealed::Sealed {
    fn keyword_info(name: &str) -> Option<KeywordInfo<Self>>;

    #[doc(hidden)]
    fn storage(manager: &FieldPropsManager) -> &HashMap<String, FieldData<Self>>;

    #[doc(hidden)]
    fn storage_mut(manager: &mut FieldPropsManager) -> &mut HashMap<String, FieldData<Self>>;

    /// Fields computed from other fields instead of a keyword default.
    #[doc(hidden)]
    fn derived(manager: &FieldPropsManager, name: &str) -> Option<FieldData<Self>>;
}

impl FieldType for f64 {
    fn keyword_info(name: &str) -> Option<KeywordInfo<Self>> {
        double_keyword_info(name)
    }

    fn storage(manager: &FieldPropsManager) -> &HashMap<String, FieldData<Self>> {
        &manager.double_fields
    }

    fn storage_mut(manager: &mut FieldPropsManager) -> &mut HashMap<String, FieldData<Self>> {
        &mut manager.double_fields
    }

    fn derived(manager: &FieldPropsManager, name: &str) -> Option<FieldData<Self>> {
        (name == "PORV").then(|| manager.derive_porv())
    }
}

impl FieldType for i32 {
    fn keyword_info(name: &str) -> Option<KeywordInfo<Self>> {
        int_keyword_info(name)
    }

    fn storage(manager: &FieldPropsManager) -> &HashMap<String, FieldData<Self>> {
        &manager.int_fields
    }

    fn storage_mut(manager: &mut FieldPropsManager) -> &mut HashMap<String, FieldData<Self>> {
        &mut manager.int_fields
    }

    fn derived(_manager: &FieldPropsManager, _name: &str) -> Option<FieldData<Self>> {
        None
    }
}

/// Property fields over the active cells of one grid.
///
/// Lookups come in two flavours. [`get`](Self::get) and
/// [`try_get`](Self::try_get) create a field from its keyword default on
/// first use and keep it, so [`has`](Self::has) turns true afterwards.
/// [`get_copy`](Self::get_copy) resolves the same values without storing
/// anything.
#[derive(Debug, Clone)]
pub struct FieldPropsManager {
    dims: GridDims,
    active_size: usize,
    global_to_active: Vec<Option<usize>>,
    active_to_global: Vec<usize>,
    cell_volume: Vec<f64>,
    cell_depth: Vec<f64>,
    default_region: &'static str,
    double_fields: HashMap<String, FieldData<f64>>,
    int_fields: HashMap<String, FieldData<i32>>,
    tran: BTreeMap<String, TranCalculator>,
}

impl FieldPropsManager {
    /// Processes the property sections of `deck` in order: GRID, EDIT,
    /// REGIONS, PROPS and SOLUTION. Each section starts with a box covering
    /// the whole grid.
    pub fn new(deck: &Deck, grid: &EclipseGrid) -> Result<Self, FieldPropsError> {
        let mut manager = Self::for_grid(grid)?;
        if deck
            .get_keyword("GRIDOPTS")
            .and_then(|keyword| keyword.record(0))
            .and_then(|record| record.int(1))
            .is_some_and(|nrmult| nrmult > 0)
        {
            manager.default_region = "MULTNUM";
        }

        for section in PROPERTY_SECTIONS {
            let mut grid_box = GridBox::new(manager.dims);
            for keyword in deck.section_keywords(section) {
                manager.handle_keyword(section, keyword, &mut grid_box)?;
            }
        }
        info!(
            active = manager.active_size,
            double_fields = manager.double_fields.len(),
            int_fields = manager.int_fields.len(),
            "field properties loaded"
        );
        Ok(manager)
    }

    /// Empty manager laid out on the active cells of `grid`.
    pub fn for_grid(grid: &EclipseGrid) -> Result<Self, FieldPropsError> {
        let size = grid.cartesian_size();
        let global_to_active = (0..size)
            .map(|global| grid.active_index(global).ok())
            .collect();
        let active_to_global = grid.active_map().to_vec();
        let cell_volume = active_to_global
            .iter()
            .map(|&global| grid.cell_volume(global))
            .collect::<Result<Vec<_>, _>>()?;
        let cell_depth = active_to_global
            .iter()
            .map(|&global| grid.cell_depth(global))
            .collect::<Result<Vec<_>, _>>()?;
        let tran = TRAN_KEYWORDS
            .iter()
            .map(|name| (name.to_string(), TranCalculator::new(*name)))
            .collect();

        Ok(Self {
            dims: grid.dims(),
            active_size: active_to_global.len(),
            global_to_active,
            active_to_global,
            cell_volume,
            cell_depth,
            default_region: "FLUXNUM",
            double_fields: HashMap::new(),
            int_fields: HashMap::new(),
            tran,
        })
    }

    pub fn dims(&self) -> GridDims {
        self.dims
    }

    pub fn active_size(&self) -> usize {
        self.active_size
    }

    pub fn global_size(&self) -> usize {
        self.dims.cartesian_size()
    }

    /// Region array used by region operations without an explicit code.
    pub fn default_region(&self) -> &str {
        self.default_region
    }

    /// Bulk volume per active cell.
    pub fn cell_volume(&self) -> &[f64] {
        &self.cell_volume
    }

    /// Centre depth per active cell.
    pub fn cell_depth(&self) -> &[f64] {
        &self.cell_depth
    }

    /// Present and assigned in every active cell. Never creates a field.
    pub fn has<T: FieldType>(&self, name: &str) -> bool {
        T::storage(self).get(name).is_some_and(FieldData::valid)
    }

    /// Fully assigned field, created from its keyword default when absent.
    pub fn try_get<T: FieldType>(&mut self, name: &str) -> Result<&FieldData<T>, FieldPropsError> {
        let info = T::keyword_info(name)
            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(name.to_string()))?;
        if !T::storage(self).contains_key(name) {
            let field = self.materialize(name, info);
            if !field.valid() {
                return Err(FieldPropsError::NotFound(name.to_string()));
            }
            T::storage_mut(self).insert(name.to_string(), field);
        }
        let field = T::storage(self)
            .get(name)
            .ok_or_else(|| FieldPropsError::NotFound(name.to_string()))?;
        if !field.valid() {
            return Err(FieldPropsError::Incomplete(name.to_string()));
        }
        Ok(field)
    }

    pub fn get<T: FieldType>(&mut self, name: &str) -> Result<&[T], FieldPropsError> {
        self.try_get(name).map(FieldData::data)
    }

    /// Same resolution as [`get`](Self::get) without storing a created field.
    pub fn get_copy<T: FieldType>(&self, name: &str) -> Result<Vec<T>, FieldPropsError> {
        let info = T::keyword_info(name)
            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(name.to_string()))?;
        match T::storage(self).get(name) {
            Some(field) if field.valid() => Ok(field.data().to_vec()),
            Some(_) => Err(FieldPropsError::Incomplete(name.to_string())),
            None => {
                let field = self.materialize(name, info);
                if field.valid() {
                    Ok(field.data().to_vec())
                } else {
                    Err(FieldPropsError::NotFound(name.to_string()))
                }
            }
        }
    }

    /// Field expanded to every cartesian cell; inactive cells hold the
    /// keyword default, or zero.
    pub fn get_global<T: FieldType>(&mut self, name: &str) -> Result<Vec<T>, FieldPropsError> {
        let fill = T::keyword_info(name)
            .and_then(|info| info.init_value)
            .unwrap_or_default();
        let data = self.get::<T>(name)?.to_vec();
        Ok(self
            .global_to_active
            .iter()
            .map(|active| active.map_or(fill, |index| data[index]))
            .collect())
    }

    /// Per cell flag telling whether the value came from a default.
    pub fn defaulted<T: FieldType>(&mut self, name: &str) -> Result<Vec<bool>, FieldPropsError> {
        self.try_get::<T>(name).map(FieldData::defaulted)
    }

    /// Names of the assigned fields of type `T`, sorted. Derived and
    /// internal fields are left out.
    pub fn keys<T: FieldType>(&self) -> Vec<String> {
        let mut keys: Vec<String> = T::storage(self)
            .iter()
            .filter(|(name, field)| {
                field.valid()
                    && !matches!(name.as_str(), "PORV" | "ACTNUM")
                    && !name.starts_with("TRAN")
            })
            .map(|(name, _)| name.clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn erase<T: FieldType>(&mut self, name: &str) -> bool {
        T::storage_mut(self).remove(name).is_some()
    }

    /// Pore volume per active cell, or per cartesian cell when `global`.
    pub fn porv(&mut self, global: bool) -> Result<Vec<f64>, FieldPropsError> {
        if global {
            self.get_global::<f64>("PORV")
        } else {
            self.get::<f64>("PORV").map(<[f64]>::to_vec)
        }
    }

    /// Cartesian activity: the deck ACTNUM on active cells, cleared where
    /// the pore volume is zero. Inactive cells are zero.
    pub fn actnum(&self) -> Vec<i32> {
        let porv = self
            .double_fields
            .get("PORV")
            .cloned()
            .unwrap_or_else(|| self.derive_porv());
        let deck_actnum = self.int_fields.get("ACTNUM");
        let mut actnum = vec![0; self.global_size()];
        for (active, &global) in self.active_to_global.iter().enumerate() {
            let value = deck_actnum
                .and_then(|field| field.value(active))
                .unwrap_or(1);
            actnum[global] = if porv.value(active) == Some(0.0) { 0 } else { value };
        }
        actnum
    }

    /// Drops cells deactivated by `actnum` from every field. Cells can only
    /// be removed.
    ///
    /// Cells sharing an active index form one coarse group. A group keeps
    /// its values while any member stays active, and its index moves to the
    /// first remaining member in global order.
    pub fn reset_actnum(&mut self, actnum: &[i32]) -> Result<(), FieldPropsError> {
        if actnum.len() != self.global_size() {
            return Err(FieldPropsError::ActnumSize {
                expected: self.global_size(),
                actual: actnum.len(),
            });
        }

        let mut global_to_active = vec![None; self.global_size()];
        let mut active_to_global = Vec::new();
        let mut source = Vec::new();
        let mut renumbered: Vec<Option<usize>> = vec![None; self.active_size];
        for (global, &value) in actnum.iter().enumerate() {
            if value <= 0 {
                continue;
            }
            let old = self.global_to_active[global].ok_or(FieldPropsError::CannotActivate(global))?;
            let index = match renumbered[old] {
                Some(index) => index,
                None => {
                    let index = active_to_global.len();
                    renumbered[old] = Some(index);
                    active_to_global.push(global);
                    source.push(old);
                    index
                }
            };
            global_to_active[global] = Some(index);
        }
        if active_to_global == self.active_to_global && global_to_active == self.global_to_active {
            return Ok(());
        }

        for field in self.double_fields.values_mut() {
            field.gather(&source);
        }
        for field in self.int_fields.values_mut() {
            field.gather(&source);
        }
        self.cell_volume = source.iter().map(|&old| self.cell_volume[old]).collect();
        self.cell_depth = source.iter().map(|&old| self.cell_depth[old]).collect();

        debug!(
            removed = self.active_size - active_to_global.len(),
            "compressed field properties"
        );
        self.active_size = active_to_global.len();
        self.active_to_global = active_to_global;
        self.global_to_active = global_to_active;
        Ok(())
    }

    /// Applies the deferred `TRANX`/`TRANY`/`TRANZ` modifiers to `values`,
    /// one entry per active cell.
    pub fn apply_tran(&self, keyword: &str, values: &mut [f64]) -> Result<(), FieldPropsError> {
        let calculator = self
            .tran
            .get(keyword)
            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(keyword.to_string()))?;
        tran::apply_tran(calculator, |name| self.double_fields.get(name), values)
    }

    pub fn tran_active(&self, keyword: &str) -> bool {
        self.tran
            .get(keyword)
            .is_some_and(|calculator| !calculator.is_empty())
    }

    fn handle_keyword(
        &mut self,
        section: Section,
        keyword: &DeckKeyword,
        grid_box: &mut GridBox,
    ) -> Result<(), FieldPropsError> {
        let name = keyword.name();
        match name {
            "BOX" => {
                let record = keyword.record(0).cloned().unwrap_or_default();
                grid_box.update(&record, 0)
            }
            "ENDBOX" => {
                grid_box.reset();
                Ok(())
            }
            "EQUALS" | "MULTIPLY" | "ADD" | "MINVALUE" | "MAXVALUE" => {
                self.handle_operation(keyword, *grid_box)
            }
            "EQUALREG" | "MULTIREG" | "ADDREG" => self.handle_region_operation(keyword),
            "COPY" => self.handle_copy(keyword, *grid_box),
            _ if is_tran_keyword(name) && section == Section::Edit => {
                self.handle_edit_tran(keyword, grid_box)
            }
            _ if is_double_keyword(name) => {
                let info = double_keyword_info(name)
                    .ok_or_else(|| FieldPropsError::UnsupportedKeyword(name.to_string()))?;
                self.handle_data::<f64>(section, name, info, keyword, grid_box)
            }
            _ if is_int_keyword(name) => {
                let info = int_keyword_info(name)
                    .ok_or_else(|| FieldPropsError::UnsupportedKeyword(name.to_string()))?;
                self.handle_data::<i32>(section, name, info, keyword, grid_box)
            }
            _ => {
                debug!(keyword = name, section = %section, "not a field property");
                Ok(())
            }
        }
    }

    /// Assigns explicit deck values inside the current box.
    fn handle_data<T: FieldType>(
        &mut self,
        section: Section,
        name: &str,
        info: KeywordInfo<T>,
        keyword: &DeckKeyword,
        grid_box: &GridBox,
    ) -> Result<(), FieldPropsError> {
        let mut deck_data = T::deck_data(keyword)?;
        let expected = grid_box.size();
        if info.top && deck_data.len() < expected {
            deck_data.resize(expected, None);
        }
        if deck_data.len() != expected {
            return Err(FieldPropsError::SizeMismatch {
                keyword: name.to_string(),
                expected,
                actual: deck_data.len(),
            });
        }

        let multiply = info.multiplier && matches!(section, Section::Edit | Section::Schedule);
        let mut field = self.take_field(name, info);
        for cell in grid_box.index_list(&self.global_to_active) {
            let Some(value) = deck_data[cell.data_index] else {
                continue;
            };
            if multiply {
                if field.has_value(cell.active_index) {
                    field.update(cell.active_index, |current| current * value);
                }
            } else {
                field.set(cell.active_index, value, ValueStatus::DeckValue);
            }
        }
        if section == Section::Grid && info.top && !field.valid() {
            self.distribute_top_layer(&mut field, &deck_data, grid_box);
        }
        T::storage_mut(self).insert(name.to_string(), field);
        Ok(())
    }

    /// Fills unassigned cells from the top layer value of their column.
    fn distribute_top_layer<T: FieldType>(
        &self,
        field: &mut FieldData<T>,
        deck_data: &[Option<T>],
        grid_box: &GridBox,
    ) {
        let layer_size = self.dims.layer_size();
        let mut top_layer = vec![None; layer_size];
        for (global, data_index) in grid_box.cells() {
            if global < layer_size {
                top_layer[global] = deck_data[data_index];
            }
        }
        for (active, &global) in self.active_to_global.iter().enumerate() {
            if field.has_value(active) {
                continue;
            }
            if let Some(value) = top_layer[global % layer_size] {
                field.set(active, value, ValueStatus::ValidDefault);
            }
        }
    }

    fn handle_operation(
        &mut self,
        keyword: &DeckKeyword,
        mut op_box: GridBox,
    ) -> Result<(), FieldPropsError> {
        let name = keyword.name();
        let op = ScalarOperation::from_keyword(name)
            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(name.to_string()))?;
        let mut tran_fields: HashMap<String, String> = HashMap::new();

        for record in keyword.records() {
            let target = record_target(name, record, 0)?;
            let value = record_value(name, record)?;
            op_box.update(record, 2)?;
            let cells = active_indices(&op_box.index_list(&self.global_to_active));

            if is_tran_keyword(&target) {
                let scratch = match tran_fields.get(&target) {
                    Some(scratch) => scratch.clone(),
                    None => {
                        let calculator = self
                            .tran
                            .get_mut(&target)
                            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(target.clone()))?;
                        let scratch = calculator.next_name();
                        calculator.add_action(op, scratch.clone());
                        tran_fields.insert(target.clone(), scratch.clone());
                        scratch
                    }
                };
                let info = TranCalculator::make_kw_info(op);
                self.apply_scalar::<f64>(op, &scratch, info, value, &cells);
            } else if let Some(info) = double_keyword_info(&target) {
                self.apply_scalar::<f64>(op, &target, info, value, &cells);
            } else if let Some(info) = int_keyword_info(&target) {
                self.apply_scalar::<i32>(op, &target, info, value, &cells);
            } else {
                return Err(FieldPropsError::UnsupportedKeyword(target));
            }
        }
        Ok(())
    }

    fn handle_region_operation(&mut self, keyword: &DeckKeyword) -> Result<(), FieldPropsError> {
        let name = keyword.name();
        let op = ScalarOperation::from_keyword(name)
            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(name.to_string()))?;

        for record in keyword.records() {
            let target = record_target(name, record, 0)?;
            let value = record_value(name, record)?;
            let region_value = record.int(2).ok_or_else(|| FieldPropsError::InvalidOperation {
                keyword: name.to_string(),
                reason: format!("no region number given for '{target}'"),
            })?;
            let region_name = match record.string(3) {
                Some(code) => region_keyword_from_code(&code.to_ascii_uppercase())
                    .ok_or_else(|| FieldPropsError::InvalidRegion(code.to_string()))?,
                None => self.default_region,
            };
            if is_tran_keyword(&target) {
                return Err(FieldPropsError::InvalidOperation {
                    keyword: name.to_string(),
                    reason: format!("'{target}' can not be modified by region"),
                });
            }

            // Region arrays the deck never assigned resolve to their default.
            let region = self.try_get::<i32>(region_name).map_err(|error| match error {
                FieldPropsError::NotFound(_) | FieldPropsError::UnsupportedKeyword(_) => {
                    FieldPropsError::InvalidRegion(region_name.to_string())
                }
                other => other,
            })?;
            let cells: Vec<usize> = region
                .data()
                .iter()
                .enumerate()
                .filter(|(_, number)| **number == region_value)
                .map(|(active, _)| active)
                .collect();

            if let Some(info) = double_keyword_info(&target) {
                self.apply_scalar::<f64>(op, &target, info, value, &cells);
            } else if let Some(info) = int_keyword_info(&target) {
                self.apply_scalar::<i32>(op, &target, info, value, &cells);
            } else {
                return Err(FieldPropsError::UnsupportedKeyword(target));
            }
        }
        Ok(())
    }

    fn handle_copy(&mut self, keyword: &DeckKeyword, mut op_box: GridBox) -> Result<(), FieldPropsError> {
        let name = keyword.name();
        for record in keyword.records() {
            let source = record_target(name, record, 0)?;
            let target = record_target(name, record, 1)?;
            op_box.update(record, 2)?;
            let cells = active_indices(&op_box.index_list(&self.global_to_active));
            if is_double_keyword(&source) {
                self.copy_field::<f64>(&source, &target, &cells)?;
            } else if is_int_keyword(&source) {
                self.copy_field::<i32>(&source, &target, &cells)?;
            } else {
                return Err(FieldPropsError::UnsupportedKeyword(source));
            }
        }
        Ok(())
    }

    fn copy_field<T: FieldType>(
        &mut self,
        source: &str,
        target: &str,
        cells: &[usize],
    ) -> Result<(), FieldPropsError> {
        let info = T::keyword_info(target)
            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(target.to_string()))?;
        let values = self.try_get::<T>(source)?.clone();
        let mut field = self.take_field(target, info);
        for &cell in cells {
            field.set(cell, values.data()[cell], values.status()[cell]);
        }
        T::storage_mut(self).insert(target.to_string(), field);
        Ok(())
    }

    /// `TRANX` style data in EDIT becomes an assignment applied later to
    /// the computed transmissibilities.
    fn handle_edit_tran(
        &mut self,
        keyword: &DeckKeyword,
        grid_box: &GridBox,
    ) -> Result<(), FieldPropsError> {
        let name = keyword.name();
        let scratch = self
            .tran
            .get(name)
            .map(TranCalculator::next_name)
            .ok_or_else(|| FieldPropsError::UnsupportedKeyword(name.to_string()))?;
        self.handle_data::<f64>(Section::Edit, &scratch, KeywordInfo::plain(), keyword, grid_box)?;
        if let Some(calculator) = self.tran.get_mut(name) {
            calculator.add_action(ScalarOperation::Equal, scratch);
        }
        Ok(())
    }

    fn apply_scalar<T: FieldType>(
        &mut self,
        op: ScalarOperation,
        name: &str,
        info: KeywordInfo<T>,
        value: f64,
        cells: &[usize],
    ) {
        let mut field = self.take_field(name, info);
        op.apply(&mut field, T::from_f64(value), cells);
        T::storage_mut(self).insert(name.to_string(), field);
    }

    /// Removes a stored field for modification, or creates it.
    fn take_field<T: FieldType>(&mut self, name: &str, info: KeywordInfo<T>) -> FieldData<T> {
        match T::storage_mut(self).remove(name) {
            Some(field) => field,
            None => self.materialize(name, info),
        }
    }

    fn materialize<T: FieldType>(&self, name: &str, info: KeywordInfo<T>) -> FieldData<T> {
        if let Some(field) = T::derived(self, name) {
            return field;
        }
        match info.init_value {
            Some(value) => FieldData::with_default(self.active_size, value),
            None => FieldData::new(self.active_size),
        }
    }

    /// `PORV = volume * PORO * NTG * MULTPV` where `PORO` is assigned.
    fn derive_porv(&self) -> FieldData<f64> {
        let mut porv = FieldData::new(self.active_size);
        let Some(poro) = self.double_fields.get("PORO") else {
            return porv;
        };
        for (active, volume) in self.cell_volume.iter().enumerate() {
            if let Some(porosity) = poro.value(active) {
                porv.set(active, volume * porosity, ValueStatus::ValidDefault);
            }
        }
        for factor in ["NTG", "MULTPV"] {
            let Some(field) = self.double_fields.get(factor).filter(|field| field.valid()) else {
                continue;
            };
            for (active, multiplier) in field.data().iter().enumerate() {
                if porv.has_value(active) {
                    porv.update(active, |value| value * multiplier);
                }
            }
        }
        porv
    }
}

fn record_target(keyword: &str, record: &DeckRecord, index: usize) -> Result<String, FieldPropsError> {
    record
        .string(index)
        .map(str::to_ascii_uppercase)
        .ok_or_else(|| FieldPropsError::InvalidOperation {
            keyword: keyword.to_string(),
            reason: format!("item {} must name a keyword", index + 1),
        })
}

fn record_value(keyword: &str, record: &DeckRecord) -> Result<f64, FieldPropsError> {
    record.double(1).ok_or_else(|| FieldPropsError::InvalidOperation {
        keyword: keyword.to_string(),
        reason: "item 2 must be a number".to_string(),
    })
}

fn active_indices(cells: &[CellIndex]) -> Vec<usize> {
    cells.iter().map(|cell| cell.active_index).collect()
}

#[cfg(test)]
mod tests {
    use super::FieldPropsManager;
    use crate::deck::Deck;
    use crate::fieldprops::FieldPropsError;
    use crate::grid::{EclipseGrid, GridDims};

    fn grid(nx: usize, ny: usize, nz: usize) -> EclipseGrid {
        let dims = GridDims::new(nx, ny, nz).expect("dims");
        EclipseGrid::uniform(dims, [1.0, 1.0, 1.0], 0.0).expect("uniform grid")
    }

    fn manager(grid: &EclipseGrid, text: &str) -> FieldPropsManager {
        let deck = Deck::parse(text).expect("deck should parse");
        FieldPropsManager::new(&deck, grid).expect("field properties should load")
    }

    #[test]
    fn satnum_is_created_on_first_get() {
        let grid = grid(2, 2, 1);
        let mut props = manager(&grid, "GRID\nPORO\n 4*0.2 /\n");

        assert!(!props.has::<i32>("SATNUM"));
        assert_eq!(props.get_copy::<i32>("SATNUM").expect("default"), vec![1; 4]);
        assert!(!props.has::<i32>("SATNUM"));

        assert_eq!(props.get::<i32>("SATNUM").expect("default"), &[1, 1, 1, 1]);
        assert!(props.has::<i32>("SATNUM"));
        assert_eq!(props.defaulted::<i32>("SATNUM").expect("stored"), vec![true; 4]);
    }

    #[test]
    fn lookup_failures_are_distinguished() {
        let grid = grid(2, 1, 1);
        let mut props = manager(&grid, "GRID\nPERMX\n 100 1* /\n");

        assert!(matches!(
            props.get::<f64>("NOSUCH"),
            Err(FieldPropsError::UnsupportedKeyword(_))
        ));
        assert!(matches!(
            props.get::<f64>("PORO"),
            Err(FieldPropsError::NotFound(_))
        ));
        assert!(!props.has::<f64>("PORO"));
        assert!(matches!(
            props.get::<f64>("PERMX"),
            Err(FieldPropsError::Incomplete(_))
        ));
        assert!(!props.has::<f64>("NOSUCH"));
    }

    #[test]
    fn box_and_operations_modify_selected_cells() {
        let grid = grid(3, 1, 1);
        let mut props = manager(
            &grid,
            "GRID\n\
             PERMX\n 3*100 /\n\
             BOX\n 2 3 1 1 1 1 /\n\
             PERMY\n 2*7 /\n\
             ENDBOX\n\
             MULTIPLY\n PERMX 2 1 1 /\n/\n\
             EQUALS\n PERMY 5 1 1 /\n PERMZ 1 /\n/\n\
             MAXVALUE\n PERMX 150 /\n/\n",
        );
        assert_eq!(props.get::<f64>("PERMX").expect("set"), &[150.0, 100.0, 100.0]);
        assert_eq!(props.get::<f64>("PERMY").expect("set"), &[5.0, 7.0, 7.0]);
        // the second record keeps the box of the first one
        assert!(matches!(
            props.get::<f64>("PERMZ"),
            Err(FieldPropsError::Incomplete(_))
        ));
    }

    #[test]
    fn top_layer_values_fill_columns() {
        let grid = grid(2, 1, 2);
        let mut props = manager(&grid, "GRID\nDZ\n 3 4 /\nTOPS\n 10 20 /\n");
        assert_eq!(props.get::<f64>("DZ").expect("filled"), &[3.0, 4.0, 3.0, 4.0]);
        assert_eq!(props.defaulted::<f64>("DZ").expect("filled"), vec![false, false, true, true]);
        assert!(props.has::<f64>("TOPS"));
    }

    #[test]
    fn edit_multipliers_scale_existing_values() {
        let grid = grid(2, 1, 1);
        let mut props = manager(&grid, "GRID\nMULTX\n 2 3 /\nEDIT\nMULTX\n 10 1* /\n");
        assert_eq!(props.get::<f64>("MULTX").expect("set"), &[20.0, 3.0]);
    }

    #[test]
    fn region_operations_select_by_region_number() {
        let grid = grid(4, 1, 1);
        let mut props = manager(
            &grid,
            "GRID\n\
             PERMX\n 4*10 /\n\
             MULTNUM\n 1 2 2 1 /\n\
             FLUXNUM\n 4*1 /\n\
             MULTIREG\n PERMX 3 2 M /\n/\n\
             EQUALREG\n PORO 0.25 1 /\n/\n",
        );
        assert_eq!(props.get::<f64>("PERMX").expect("set"), &[10.0, 30.0, 30.0, 10.0]);
        assert_eq!(props.get::<f64>("PORO").expect("set"), &[0.25; 4]);

        let mut props = manager(&grid, "GRID\nPERMX\n 4*10 /\nADDREG\n PERMX 1 1 O /\n/\n");
        assert_eq!(props.get::<f64>("PERMX").expect("set"), &[11.0; 4]);
        assert_eq!(props.get::<i32>("OPERNUM").expect("created"), &[1; 4]);

        let mut props = manager(&grid, "GRID\nEQUALREG\n PORO 0.25 1 /\n/\n");
        assert_eq!(props.get::<f64>("PORO").expect("set"), &[0.25; 4]);
        assert!(props.has::<i32>("FLUXNUM"));
    }

    #[test]
    fn gridopts_switches_the_default_region() {
        let grid = grid(2, 1, 1);
        let props = manager(&grid, "GRID\nGRIDOPTS\n 'YES' 2 /\nMULTNUM\n 1 2 /\n");
        assert_eq!(props.default_region(), "MULTNUM");
        let props = manager(&grid, "GRID\n");
        assert_eq!(props.default_region(), "FLUXNUM");
    }

    #[test]
    fn copy_moves_values_and_status() {
        let grid = grid(2, 1, 1);
        let mut props = manager(
            &grid,
            "GRID\nPERMX\n 5 6 /\nCOPY\n PERMX PERMY /\n PERMX PERMZ 2 2 /\n/\n",
        );
        assert_eq!(props.get::<f64>("PERMY").expect("copied"), &[5.0, 6.0]);
        assert!(matches!(
            props.get::<f64>("PERMZ"),
            Err(FieldPropsError::Incomplete(_))
        ));
    }

    #[test]
    fn porv_is_derived_from_pore_fields() {
        let grid = grid(2, 1, 1);
        let mut props = manager(&grid, "GRID\nPORO\n 0.5 0.0 /\nNTG\n 0.5 1 /\n");
        let porv = props.porv(false).expect("derived");
        assert!((porv[0] - 0.25).abs() < 1e-12);
        assert_eq!(porv[1], 0.0);
        assert_eq!(props.actnum(), vec![1, 0]);
        assert!(!props.keys::<f64>().contains(&"PORV".to_string()));
        assert_eq!(props.keys::<f64>(), vec!["NTG".to_string(), "PORO".to_string()]);
    }

    #[test]
    fn tran_modifiers_are_deferred() {
        let grid = grid(2, 1, 1);
        let props = manager(
            &grid,
            "GRID\nMULTIPLY\n TRANX 2 /\n/\nEDIT\nTRANY\n 1* 4 /\n",
        );
        assert!(props.tran_active("TRANX"));
        assert!(props.tran_active("TRANY"));
        assert!(!props.tran_active("TRANZ"));
        assert!(props.keys::<f64>().is_empty());

        let mut tranx = vec![1.0, 3.0];
        props.apply_tran("TRANX", &mut tranx).expect("sizes match");
        assert_eq!(tranx, vec![2.0, 6.0]);
        let mut trany = vec![1.0, 3.0];
        props.apply_tran("TRANY", &mut trany).expect("sizes match");
        assert_eq!(trany, vec![1.0, 4.0]);
    }

    #[test]
    fn reset_actnum_compresses_fields() {
        let grid = grid(3, 1, 1);
        let mut props = manager(&grid, "GRID\nPORO\n 0.1 0.2 0.3 /\n");
        props.reset_actnum(&[1, 0, 1]).expect("cells removed");
        assert_eq!(props.active_size(), 2);
        assert_eq!(props.get::<f64>("PORO").expect("kept"), &[0.1, 0.3]);
        assert_eq!(props.get_global::<f64>("PORO").expect("kept"), vec![0.1, 0.0, 0.3]);
        assert!(matches!(
            props.reset_actnum(&[1, 1, 1]),
            Err(FieldPropsError::CannotActivate(1))
        ));
        assert!(matches!(
            props.reset_actnum(&[1]),
            Err(FieldPropsError::ActnumSize { expected: 3, actual: 1 })
        ));
    }
}
