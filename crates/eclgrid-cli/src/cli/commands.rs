use super::CliError;
use anyhow::Context;
use eclgrid_core::config::{ProcessingConfig, load_processing_config};
use eclgrid_core::grid::PorosityMode;
use eclgrid_core::io::{ElementWidth, Endianness, RecordOptions, RecordStream};
use eclgrid_core::{Deck, EclipseGrid, EclipseState};
use serde_json::{Value, json};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(clap::Args)]
pub(super) struct InspectArgs {
    /// EGRID file to summarise
    egrid: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct DeckArgs {
    /// Text deck (.DATA)
    deck: PathBuf,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Args)]
pub(super) struct ConvertArgs {
    /// Text deck (.DATA)
    deck: PathBuf,

    /// EGRID output path
    output: PathBuf,
}

#[derive(clap::Args)]
pub(super) struct RecordsArgs {
    /// Fortran unformatted file
    file: PathBuf,

    /// Record markers are little-endian
    #[arg(long)]
    little_endian: bool,
}

pub(super) fn run_inspect_command(args: InspectArgs) -> Result<i32, CliError> {
    let grid = EclipseGrid::from_egrid(&args.egrid).map_err(CliError::compute)?;
    let summary = grid_summary(&grid);
    if args.json {
        print_json(&summary)?;
    } else {
        println!("EGRID: {}", args.egrid.display());
        print_grid_lines(&grid);
    }
    Ok(0)
}

pub(super) fn run_deck_command(args: DeckArgs, config: Option<&Path>) -> Result<i32, CliError> {
    let state = load_state(&args.deck, config)?;
    let grid = state.grid();
    let props = state.field_props();
    let double_keywords = props.keys::<f64>();
    let int_keywords = props.keys::<i32>();

    if args.json {
        let mut summary = grid_summary(grid);
        if let Value::Object(map) = &mut summary {
            map.insert("initPath".to_string(), json!(grid.init_path().as_str()));
            map.insert("deactivated".to_string(), json!(state.deactivated()));
            map.insert("doubleKeywords".to_string(), json!(double_keywords));
            map.insert("intKeywords".to_string(), json!(int_keywords));
            map.insert(
                "pinchConnections".to_string(),
                json!(state.pinch_connections().num_connections()),
            );
            map.insert("swofTables".to_string(), json!(state.swof_tables().len()));
            map.insert("sgofTables".to_string(), json!(state.sgof_tables().len()));
        }
        print_json(&summary)?;
    } else {
        println!("Deck: {}", args.deck.display());
        println!("Construction: {}", grid.init_path().as_str());
        print_grid_lines(grid);
        println!("Deactivated cells: {}", state.deactivated().total());
        println!("Double keywords: {}", double_keywords.join(" "));
        println!("Integer keywords: {}", int_keywords.join(" "));
        println!(
            "Pinch connections: {}",
            state.pinch_connections().num_connections()
        );
    }
    Ok(0)
}

pub(super) fn run_convert_command(
    args: ConvertArgs,
    config: Option<&Path>,
) -> Result<i32, CliError> {
    let state = load_state(&args.deck, config)?;
    state
        .grid()
        .save_egrid(&args.output)
        .map_err(CliError::compute)?;
    println!(
        "Wrote {} ({} active cells)",
        args.output.display(),
        state.grid().num_active()
    );
    Ok(0)
}

pub(super) fn run_records_command(args: RecordsArgs) -> Result<i32, CliError> {
    let file = File::open(&args.file)
        .with_context(|| format!("failed to open '{}'", args.file.display()))?;
    let mut options = RecordOptions::new(ElementWidth::One);
    if args.little_endian {
        options = options.with_endianness(Endianness::Little);
    }
    let mut stream = RecordStream::new(BufReader::new(file), options);

    let mut count = 0;
    while !stream.at_end().map_err(CliError::compute)? {
        let offset = stream.position().map_err(CliError::compute)?;
        let bytes = stream.skip_record().map_err(CliError::compute)?;
        println!("{offset:>10} {bytes:>10}");
        count += 1;
    }
    println!("{count} records");
    Ok(0)
}

fn load_state(deck_path: &Path, config: Option<&Path>) -> Result<EclipseState, CliError> {
    let config = match config {
        Some(path) => load_processing_config(path).map_err(CliError::compute)?,
        None => ProcessingConfig::default(),
    };
    let deck = Deck::read(deck_path).map_err(CliError::compute)?;
    Ok(EclipseState::with_config(&deck, &config)?)
}

fn grid_summary(grid: &EclipseGrid) -> Value {
    let map_axes = grid.map_axes().map(|axes| {
        json!({
            "input": axes.input(),
            "units": axes.map_units().map(|unit| unit.as_str()),
        })
    });
    json!({
        "dims": [grid.nx(), grid.ny(), grid.nz()],
        "cells": grid.cartesian_size(),
        "active": grid.num_active(),
        "activeFracture": grid.num_active_fracture(),
        "dualPorosity": grid.porosity_mode() == PorosityMode::Dual,
        "zcornFixed": grid.zcorn_fixed(),
        "coarseCells": grid.coarse_cells().len(),
        "mapAxes": map_axes,
    })
}

fn print_grid_lines(grid: &EclipseGrid) {
    println!("Dimensions: {} x {} x {}", grid.nx(), grid.ny(), grid.nz());
    println!(
        "Active cells: {} of {}",
        grid.num_active(),
        grid.cartesian_size()
    );
    println!("ZCORN fixes: {}", grid.zcorn_fixed());
    match grid.map_axes() {
        Some(axes) => {
            let [x, y] = axes.origin();
            println!("MAPAXES origin: ({x}, {y})");
        }
        None => println!("MAPAXES: none"),
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let text = serde_json::to_string_pretty(value).context("failed to render JSON summary")?;
    println!("{text}");
    Ok(())
}
