use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use compute::{NormalizationMode, TableStatsSource};
use foundation::NumberLocale;
use formats::FeatureTable;
use layers::MapConfig;
use panel::{PanelConfig, RefreshController, fetch_stats};
use tools::{render_display, split_mode_flag};

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        return Err(usage());
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "stats" => cmd_stats(args),
        "config" => cmd_config(args),
        "popup" => cmd_popup(args),
        _ => Err(usage()),
    }
}

fn load_table(path: &str) -> Result<FeatureTable, String> {
    let path = PathBuf::from(path);
    FeatureTable::from_path(&path).map_err(|e| e.to_string())
}

fn cmd_stats(args: Vec<String>) -> Result<(), String> {
    // popmap stats <data.geojson> [--mode MODE]
    let (mode, rest) = split_mode_flag(&args, NormalizationMode::Log)?;
    let [path] = rest.as_slice() else {
        return Err(usage());
    };

    let table = Arc::new(load_table(path)?);
    let map = MapConfig::population_2020();
    let config = PanelConfig {
        initial_mode: mode,
        bar_color: map.layer_color(),
        ..PanelConfig::default()
    };
    let mut controller =
        RefreshController::new(Arc::new(TableStatsSource::new(table)), config);

    let rt = tokio::runtime::Builder::new_current_thread()
        .build()
        .map_err(|e| format!("runtime: {e}"))?;
    let ticket = controller.begin();
    let outcome = rt.block_on(fetch_stats(&*controller.source(), &ticket.params));
    // The controller only logs failures; surface them here instead.
    if let Err(e) = outcome.clone().into_results() {
        return Err(e.to_string());
    }
    controller.complete(ticket, outcome);

    print!("{}", render_display(controller.display()));
    Ok(())
}

fn cmd_config(args: Vec<String>) -> Result<(), String> {
    // popmap config [--pretty]
    let pretty = match args.as_slice() {
        [] => false,
        [flag] if flag == "--pretty" => true,
        _ => return Err(usage()),
    };
    let cfg = MapConfig::population_2020();
    let payload = if pretty {
        serde_json::to_string_pretty(&cfg)
    } else {
        serde_json::to_string(&cfg)
    }
    .map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}

fn cmd_popup(args: Vec<String>) -> Result<(), String> {
    // popmap popup <data.geojson> <index>
    let [path, index] = args.as_slice() else {
        return Err(usage());
    };
    let index: usize = index
        .parse()
        .map_err(|_| format!("invalid feature index: {index}"))?;

    let table = load_table(path)?;
    let feature = table
        .get(index)
        .ok_or_else(|| format!("feature {index} out of range (0..{})", table.len()))?;
    let map = MapConfig::population_2020();
    let template = map
        .primary_layer()
        .and_then(|layer| layer.active_popup())
        .ok_or("population layer has no popup")?;

    let popup = template.render(feature, &NumberLocale::en_us());
    println!("{}\n{}", popup.title, popup.content);
    Ok(())
}

fn usage() -> String {
    let exe = env::args().next().unwrap_or_else(|| "popmap".to_string());
    let modes: Vec<&str> = NormalizationMode::ALL.iter().map(|m| m.as_str()).collect();
    format!(
        "Usage:\n  {exe} stats <data.geojson> [--mode MODE]\n  {exe} config [--pretty]\n  {exe} popup <data.geojson> <index>\n\nModes: {}\n",
        modes.join(", ")
    )
}
