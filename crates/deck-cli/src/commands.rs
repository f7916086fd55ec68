use anyhow::{bail, Context, Result};
use deck_core::{DeckConfig, Document, Presentation};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

pub fn load_config(path: Option<&Path>, seed: Option<u64>) -> Result<DeckConfig> {
    let mut config = match path {
        Some(path) => DeckConfig::load(path)
            .with_context(|| format!("Failed to load config: {}", path.display()))?,
        None => DeckConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = Some(seed);
    }
    Ok(config)
}

pub fn load_presentation(path: &Path, config: DeckConfig) -> Result<Presentation> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read SVG file: {}", path.display()))?;
    let document = Document::parse_svg(&text)
        .with_context(|| format!("Failed to parse SVG file: {}", path.display()))?;
    let pres = Presentation::init_with_config(document, config)
        .with_context(|| format!("Failed to build presentation for: {}", path.display()))?;
    info!(file = %path.display(), layers = pres.layers().len(), "presentation loaded");
    Ok(pres)
}

/// One line per layer: index, label, kind, owned node count, visibility.
pub fn layer_table(pres: &Presentation) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:>5}  {:<24} {:<6} {:>5}  {}", "INDEX", "LABEL", "KIND", "NODES", "VISIBLE");
    for (index, layer) in pres.layers().iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>5}  {:<24} {:<6} {:>5}  {}",
            index,
            layer.label(),
            if layer.is_auto() { "auto" } else { "group" },
            layer.nodes().len(),
            if layer.is_visible(pres.document()) { "yes" } else { "no" },
        );
    }
    out
}

pub fn write_document(pres: &Presentation, output: Option<&Path>) -> Result<()> {
    let xml = pres.document().to_xml_string();
    match output {
        Some(path) => {
            fs::write(path, xml)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
            info!(output = %path.display(), "partitioned document written");
        }
        None => println!("{xml}"),
    }
    Ok(())
}

/// Hides the labelled layers, adds `count` frames and serializes the model.
pub fn frames_json(pres: &mut Presentation, count: usize, hide: &[String], pretty: bool) -> Result<String> {
    for label in hide {
        let Some(layer) = pres.layer_by_label(label) else {
            bail!("unknown layer label: {label}");
        };
        let index = layer.index(pres)?;
        pres.set_layer_visible(index, false)?;
    }
    for _ in 0..count {
        pres.new_frame()?;
    }

    let summary = pres.summary();
    let json = if pretty {
        serde_json::to_string_pretty(&summary)?
    } else {
        serde_json::to_string(&summary)?
    };
    Ok(json)
}
