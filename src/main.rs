// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;

use tcoa_dashboard::config::DEFAULT_CONFIG_FILE;
use tcoa_dashboard::format;
use tcoa_dashboard::{init_tracing, ComparisonView, Dashboard, Metric, Settings, ViewRequest};

#[derive(Parser, Debug)]
#[command(name = "tcoa", version, about = "Compare university total cost of attendance")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive terminal dashboard (default)
    Tui,

    /// Print the comparison table
    Table(ViewArgs),

    /// Write the comparison table as CSV
    Export {
        #[command(flatten)]
        view: ViewArgs,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print year-over-year costs
    Trends {
        /// Institutions to include (all when omitted)
        #[arg(short, long = "school")]
        schools: Vec<String>,
    },
}

#[derive(clap::Args, Debug)]
struct ViewArgs {
    /// annual | projected
    #[arg(short, long, default_value = "annual")]
    metric: String,

    /// Academic year, e.g. 2024-25 (newest when omitted)
    #[arg(short, long)]
    year: Option<String>,

    /// Institutions to include (all when omitted)
    #[arg(short, long = "school")]
    schools: Vec<String>,
}

impl ViewArgs {
    fn request(&self, dashboard: &Dashboard) -> Result<ViewRequest> {
        let metric: Metric = self.metric.parse()?;
        let selection = if self.schools.is_empty() {
            dashboard.all_names()
        } else {
            self.schools.clone()
        };

        Ok(ViewRequest {
            metric,
            year: self.year.clone(),
            selection,
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(&cli.config)?;
    let command = cli.command.unwrap_or(Commands::Tui);

    // Keep the terminal clean while the dashboard owns it
    let level = match command {
        Commands::Tui => "warn",
        _ => settings.log_level.as_str(),
    };
    init_tracing(level);

    let dataset = settings.load_dataset()?;
    let dashboard = Dashboard::from_settings(dataset, &settings)?;

    match command {
        Commands::Tui => run_ui_mode(dashboard),
        Commands::Table(args) => {
            let view = dashboard.render_view(&args.request(&dashboard)?)?;
            print_table(&view);
            Ok(())
        }
        Commands::Export { view, output } => {
            let view = dashboard.render_view(&view.request(&dashboard)?)?;
            match output {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    write_csv(&view, file)?;
                    tracing::info!(path = %path.display(), rows = view.rows.len(), "Exported comparison");
                }
                None => write_csv(&view, io::stdout().lock())?,
            }
            Ok(())
        }
        Commands::Trends { schools } => {
            let selection = if schools.is_empty() {
                dashboard.all_names()
            } else {
                schools
            };
            print_trends(&dashboard, &selection);
            Ok(())
        }
    }
}

fn print_table(view: &ComparisonView) {
    println!("{} ({})", view.metric_label, view.year);
    println!("{}", "━".repeat(66));
    println!(
        "{:<32} {:>16} {:>16}",
        "Institution", "Value", view.difference_label
    );

    for row in &view.rows {
        let marker = if row.is_baseline(&view.baseline) { "*" } else { " " };
        println!(
            "{}{:<31} {:>16} {:>16}",
            marker,
            row.institution,
            format::usd(row.metric_value),
            format::signed_usd(row.difference_from_baseline)
        );
    }

    println!("{}", "━".repeat(66));
    println!("{}", view.baseline_summary());
}

fn write_csv<W: Write>(view: &ComparisonView, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record([
        "Institution",
        view.metric_label.as_str(),
        view.difference_label.as_str(),
    ])?;
    for row in &view.rows {
        let value = format!("{:.0}", row.metric_value);
        let delta = format!("{:.0}", row.difference_from_baseline);
        wtr.write_record([row.institution.as_str(), value.as_str(), delta.as_str()])?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

fn print_trends(dashboard: &Dashboard, selection: &[String]) {
    let series = dashboard.trends(selection);
    let years: Vec<&str> = series
        .first()
        .map(|s| s.points.iter().map(|p| p.year.as_str()).collect())
        .unwrap_or_default();

    print!("{:<32}", "Institution");
    for year in &years {
        print!(" {:>10}", year);
    }
    println!(" {:>8}", "Change");

    for s in &series {
        let marker = if s.institution == dashboard.baseline() { "*" } else { " " };
        print!("{}{:<31}", marker, s.institution);
        for point in &s.points {
            print!(" {:>10}", format::usd(point.cost));
        }
        println!(" {:>7.1}%", s.change_pct);
    }
}

#[cfg(feature = "tui")]
fn run_ui_mode(dashboard: Dashboard) -> Result<()> {
    let mut app = ui::App::new(dashboard);
    ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_dashboard: Dashboard) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use: tcoa table / tcoa-server --features server");
    std::process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tcoa_dashboard::{Dataset, ProjectionParams, DEFAULT_BASELINE};

    fn dashboard() -> Dashboard {
        Dashboard::new(Dataset::builtin(), DEFAULT_BASELINE, ProjectionParams::default()).unwrap()
    }

    #[test]
    fn test_view_args_default_to_all_schools() {
        let args = ViewArgs {
            metric: "projected".to_string(),
            year: None,
            schools: vec![],
        };

        let request = args.request(&dashboard()).unwrap();
        assert_eq!(request.metric, Metric::Projected);
        assert_eq!(request.selection.len(), 27);
    }

    #[test]
    fn test_view_args_reject_unknown_metric() {
        let args = ViewArgs {
            metric: "weekly".to_string(),
            year: None,
            schools: vec![],
        };

        assert!(args.request(&dashboard()).is_err());
    }

    #[test]
    fn test_write_csv() {
        let dashboard = dashboard();
        let view = dashboard
            .render_view(&ViewRequest {
                metric: Metric::Annual,
                year: None,
                selection: vec!["Fordham".to_string(), DEFAULT_BASELINE.to_string()],
            })
            .unwrap();

        let mut out = Vec::new();
        write_csv(&view, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Institution,Annual Cost,Difference from Univ. of San Francisco\n\
             Fordham,98331,5729\n\
             Univ. of San Francisco,92602,0\n"
        );
    }

    #[test]
    fn test_write_csv_headers_follow_settings() {
        let settings = Settings::from_toml(
            "[dashboard]\nbaseline = \"Fordham\"\n\n[projection]\nyears = 5\n",
        )
        .unwrap();
        let dashboard = Dashboard::from_settings(Dataset::builtin(), &settings).unwrap();
        let view = dashboard
            .render_view(&ViewRequest {
                metric: Metric::Projected,
                year: None,
                selection: vec!["Fordham".to_string()],
            })
            .unwrap();

        let mut out = Vec::new();
        write_csv(&view, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text.lines().next(),
            Some("Institution,Projected 5-Year Total,Difference from Fordham")
        );
        assert!(text.contains("Fordham,"));
        assert!(text.trim_end().ends_with(",0"));
    }

    #[test]
    fn test_cli_parses_export() {
        let cli = Cli::try_parse_from([
            "tcoa", "export", "--metric", "projected", "-s", "Fordham", "-o", "out.csv",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::Export { view, output }) => {
                assert_eq!(view.metric, "projected");
                assert_eq!(view.schools, vec!["Fordham".to_string()]);
                assert_eq!(output, Some(PathBuf::from("out.csv")));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
