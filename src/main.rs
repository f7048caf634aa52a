use clap::Parser;
use name_score::app::render::{self, OutputFormat};
use name_score::core::metrics::Ranked;
use name_score::utils::error::ErrorSeverity;
use name_score::utils::{logger, validation::Validate};
use name_score::{CliConfig, Command, LocalStorage, NamesError, NamesService, TomlConfig};

fn exit_with(e: &NamesError) -> ! {
    tracing::error!(
        "❌ {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code);
}

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(cli.log_format, cli.verbose);
    tracing::debug!("CLI config: {:?}", cli);

    let config = match cli.resolve() {
        Ok(config) => config,
        Err(e) => exit_with(&e),
    };

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        exit_with(&e);
    }

    // target range is checked before any data is read
    if let Command::Nearest { target, .. } = &cli.command {
        if let Err(e) = name_score::utils::validation::validate_target_score(*target) {
            exit_with(&e);
        }
    }

    let mut service = match NamesService::new(LocalStorage::default(), config) {
        Ok(service) => service,
        Err(e) => exit_with(&e),
    };

    match &cli.command {
        Command::Score { top } => {
            let top = top.unwrap_or(service.config().display.default_top);
            let report = service.score_report(top);
            print_lists(
                cli.format,
                &[
                    ("Top Masculine Names", report.masculine.as_slice()),
                    ("Top Feminine Names", report.feminine.as_slice()),
                    ("Most Gender-Neutral Names", report.neutral.as_slice()),
                ],
            )?;
        }
        Command::Popular { n } => {
            let n = n.unwrap_or(service.config().display.popular_size);
            let report = service.popular_report(n);
            print_lists(
                cli.format,
                &[
                    ("Top Boys Names", report.boys.as_slice()),
                    ("Top Girls Names", report.girls.as_slice()),
                ],
            )?;
        }
        Command::Nearest { target, n, top } => {
            let display = &service.config().display;
            let n = n.unwrap_or(display.nearest_size);
            let top = top.unwrap_or(display.default_top);
            let closest = match service.nearest(*target, n, top) {
                Ok(closest) => closest,
                Err(e) => exit_with(&e),
            };
            let title = format!("Names Closest to {:+.2}", target);
            print_lists(cli.format, &[(title.as_str(), closest.as_slice())])?;
        }
        Command::Lookup { name } => lookup(&mut service, name, cli.format)?,
    }

    Ok(())
}

fn print_lists(format: OutputFormat, lists: &[(&str, &[Ranked<'_>])]) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let mut value = serde_json::Map::new();
        for (title, entries) in lists {
            value.insert(title.to_string(), serde_json::to_value(render::rows(entries))?);
        }
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    for (i, (title, entries)) in lists.iter().enumerate() {
        if i > 0 {
            println!();
        }
        if format == OutputFormat::Csv {
            println!("# {}", title);
        }
        print!("{}", render::render_list(format, title, entries)?);
        if format == OutputFormat::Table {
            println!();
        }
    }
    Ok(())
}

fn lookup(
    service: &mut NamesService<LocalStorage, TomlConfig>,
    name: &str,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let (start, end) = service.config().year_span();

    let Some(report) = service.lookup(name) else {
        eprintln!("❌ Name '{}' not found in dataset.", name);
        std::process::exit(1);
    };
    let entries = vec![(report.entity, report.ranks)];

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }
        OutputFormat::Csv => {
            print!("{}", render::render_csv(&entries)?);
            return Ok(());
        }
        OutputFormat::Table => {}
    }

    let title = format!("Statistics for '{}'", report.entity.name);
    println!("{}", render::render_table(&title, &entries));
    println!();
    println!("Historical Trends ({}-{})", start, end);
    println!();

    if let Some(err) = &report.history_error {
        println!("Could not load historical data: {}", err);
        return Ok(());
    }
    if !report.entity.has_yearly_data() {
        println!("No historical data found for '{}'", report.entity.name);
        return Ok(());
    }

    if !report.combined.is_empty() {
        let title = format!("Popularity Trend: {}", report.entity.name);
        println!("{}", render::render_series(&title, &report.combined, false));
        println!();
    }
    if !report.yearly_scores.is_empty() {
        let title = format!("Gender Score Evolution: {}", report.entity.name);
        println!("{}", render::render_series(&title, &report.yearly_scores, true));
    }

    Ok(())
}
