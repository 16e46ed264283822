use chrono::{SecondsFormat, Utc};

use super::{ReportOptions, RunInfo};
use crate::error::StatsError;
use crate::model::{NodeKind, StatsNode, StatsTree};
use crate::render::surface::html_escape;
use crate::render::{render, HtmlSurface, MemorySurface, Metric, Outcome, SlotId};

// ---------------------------------------------------------------------------
// JSON export
// ---------------------------------------------------------------------------

/// Export a tree as pretty-printed JSON in the artifact's wire format.
pub fn export_json(tree: &StatsTree) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(tree)
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Export a tree as CSV: one row per node in pre-order, one column per slot.
pub fn export_csv(tree: &StatsTree) -> Result<String, StatsError> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    let mut header = vec!["path_id".to_string(), "name".to_string(), "type".to_string()];
    header.extend(SlotId::all().map(|slot| slot.to_string()));
    wtr.write_record(&header)?;

    for node in tree.nodes() {
        let mut surface: MemorySurface = MemorySurface::new();
        render(&node.stats, &mut surface)?;
        let mut record = vec![node.path_id.clone(), node.name.clone(), node.kind.to_string()];
        record.extend(surface.iter().map(|(_, text)| text.clone()));
        wtr.write_record(&record)?;
    }

    let bytes = wtr.into_inner().map_err(|e| StatsError::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| StatsError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

// ---------------------------------------------------------------------------
// HTML export
// ---------------------------------------------------------------------------

/// Export a tree as a standalone HTML report with inline CSS.
///
/// The root node's figures are laid out in elements whose ids are the slot
/// ids, so existing page scripts addressing `#numberOfRequests` and friends
/// keep working. Every node, root included, also gets a row in the
/// statistics table, and optionally a response-time distribution table.
pub fn export_html(
    tree: &StatsTree,
    run: Option<&RunInfo>,
    options: &ReportOptions,
) -> Result<String, StatsError> {
    let root = tree.root();
    let title = options
        .title
        .clone()
        .or_else(|| run.map(|r| r.simulation.clone()))
        .unwrap_or_else(|| root.name.clone());

    let mut root_surface = HtmlSurface::new();
    render(&root.stats, &mut root_surface)?;
    let cards = summary_cards(&root_surface);

    let header_cells: String = Metric::ALL
        .iter()
        .map(|m| format!("<th colspan=\"3\">{}</th>", html_escape(m.label())))
        .collect();
    let sub_header_cells: String = Metric::ALL
        .iter()
        .map(|_| "<th>Total</th><th>OK</th><th>KO</th>")
        .collect();

    let mut rows = Vec::new();
    for node in tree.nodes() {
        rows.push(stats_row(node)?);
    }
    let rows = rows.join("\n");

    let distribution = if options.include_buckets {
        let tables: String = tree.nodes().map(bucket_table).collect::<Vec<_>>().join("\n");
        format!("<h2>Response Time Distribution</h2>\n{tables}")
    } else {
        String::new()
    };

    let meta = match run {
        Some(r) => format!(
            "<span>Simulation: {}</span><span>Started: {}</span>",
            html_escape(&r.simulation),
            r.started_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
        None => String::new(),
    };

    let generated = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);

    Ok(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>statsview Report — {title}</title>
<style>
  *, *::before, *::after {{ box-sizing: border-box; }}
  body {{
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    margin: 0; padding: 2rem;
    background: #0f172a; color: #e2e8f0;
    line-height: 1.5;
  }}
  h1 {{ font-size: 1.75rem; font-weight: 700; color: #f1f5f9; margin: 0 0 0.25rem; }}
  h2 {{ font-size: 1.125rem; font-weight: 600; color: #94a3b8;
        text-transform: uppercase; letter-spacing: 0.05em;
        margin: 2rem 0 0.75rem; border-bottom: 1px solid #1e293b; padding-bottom: 0.5rem; }}
  h3 {{ font-size: 0.9375rem; color: #cbd5e1; margin: 1.25rem 0 0.5rem; }}
  .meta {{ color: #64748b; font-size: 0.875rem; margin-bottom: 2rem; }}
  .meta span {{ margin-right: 1.5rem; }}
  .stats-grid {{
    display: grid;
    grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
    gap: 1rem; margin-bottom: 2rem;
  }}
  .stat-card {{
    background: #1e293b; border: 1px solid #334155;
    border-radius: 0.5rem; padding: 1rem 1.25rem;
  }}
  .stat-card .label {{
    font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em;
    color: #64748b; margin-bottom: 0.25rem;
  }}
  .stat-card .value {{ font-size: 1.5rem; font-weight: 700; color: #f1f5f9; }}
  .stat-card .split {{ font-size: 0.8125rem; color: #94a3b8; }}
  .stat-card .ok {{ color: #34d399; }}
  .stat-card .ko {{ color: #f87171; }}
  table {{
    width: 100%; border-collapse: collapse; font-size: 0.8125rem;
    background: #1e293b; border-radius: 0.5rem; overflow: hidden;
    margin-bottom: 2rem;
  }}
  thead {{ background: #0f172a; }}
  th {{
    padding: 0.5rem 0.625rem; text-align: left;
    font-weight: 600; color: #94a3b8;
    text-transform: uppercase; letter-spacing: 0.04em;
    font-size: 0.6875rem;
  }}
  td {{ padding: 0.5rem 0.625rem; border-top: 1px solid #334155; color: #cbd5e1; }}
  tr.group td {{ font-weight: 600; color: #f1f5f9; }}
  tr:hover td {{ background: #243352; }}
  footer {{
    margin-top: 3rem; padding-top: 1rem; border-top: 1px solid #1e293b;
    color: #475569; font-size: 0.8125rem;
  }}
</style>
</head>
<body>
<h1>{title}</h1>
<div class="meta">{meta}</div>

<h2>Global Information</h2>
<div class="stats-grid">
{cards}
</div>

<h2>Statistics</h2>
<table>
  <thead>
    <tr><th rowspan="2">Request</th>{header_cells}</tr>
    <tr>{sub_header_cells}</tr>
  </thead>
  <tbody>
{rows}
  </tbody>
</table>

{distribution}

<footer>Generated by statsview &bull; {generated}</footer>
</body>
</html>
"#,
        title = html_escape(&title),
    ))
}

/// One card per metric, with the slot ids as element ids.
fn summary_cards(surface: &HtmlSurface) -> String {
    Metric::ALL
        .iter()
        .map(|metric| {
            let cell = |outcome: Outcome| {
                let slot = SlotId::new(*metric, outcome);
                let text = surface.text(slot).unwrap_or_default();
                format!("<span id=\"{slot}\">{text}</span>")
            };
            format!(
                "  <div class=\"stat-card\">\n    <div class=\"label\">{}</div>\n    \
                 <div class=\"value\">{}</div>\n    \
                 <div class=\"split\"><span class=\"ok\">OK {}</span> · <span class=\"ko\">KO {}</span></div>\n  </div>",
                html_escape(metric.label()),
                cell(Outcome::Total),
                cell(Outcome::Ok),
                cell(Outcome::Ko),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn stats_row(node: &StatsNode) -> Result<String, StatsError> {
    let mut surface = HtmlSurface::new();
    render(&node.stats, &mut surface)?;
    let cells: String = surface
        .iter()
        .map(|(_, sink)| format!("<td>{}</td>", sink.as_html()))
        .collect();
    let row_class = match node.kind {
        NodeKind::Group => "group",
        NodeKind::Request => "request",
    };
    Ok(format!(
        "<tr class=\"{row_class}\" data-path=\"{}\"><td>{}</td>{cells}</tr>",
        html_escape(&node.path_id),
        html_escape(&node.name),
    ))
}

/// Bucket labels are producer markup (`t ≥ 800 ms <br> t < 1200 ms`); only
/// the line break is kept, the rest is escaped.
fn bucket_table(node: &StatsNode) -> String {
    let rows: String = node
        .stats
        .buckets()
        .iter()
        .map(|b| {
            let label = b
                .display_label
                .split("<br>")
                .map(|part| html_escape(part.trim()))
                .collect::<Vec<_>>()
                .join("<br>");
            format!(
                "<tr><td>{label}</td><td>{}</td><td>{}%</td></tr>",
                b.count, b.percentage
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "<h3>{}</h3>\n<table>\n  <thead><tr><th>Range</th><th>Count</th><th>Share</th></tr></thead>\n  <tbody>\n{rows}\n  </tbody>\n</table>",
        html_escape(&node.name)
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
